//! UI session state
//!
//! Which link is being edited or is awaiting delete confirmation. This lives
//! next to the store rather than inside it; a session never mutates links.

use crate::models::LinkId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    editing_id: Option<LinkId>,
    deleting_id: Option<LinkId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing_id(&self) -> Option<&LinkId> {
        self.editing_id.as_ref()
    }

    pub fn set_editing_id(&mut self, id: Option<LinkId>) {
        self.editing_id = id;
    }

    pub fn deleting_id(&self) -> Option<&LinkId> {
        self.deleting_id.as_ref()
    }

    pub fn set_deleting_id(&mut self, id: Option<LinkId>) {
        self.deleting_id = id;
    }

    /// Take the pending delete, clearing it
    pub fn take_deleting_id(&mut self) -> Option<LinkId> {
        self.deleting_id.take()
    }

    pub fn clear(&mut self) {
        self.editing_id = None;
        self.deleting_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_independent() {
        let mut first = Session::new();
        let second = Session::new();

        first.set_editing_id(Some(LinkId::from("abc")));

        assert_eq!(first.editing_id(), Some(&LinkId::from("abc")));
        assert!(second.editing_id().is_none());
    }

    #[test]
    fn test_take_deleting_id_clears() {
        let mut session = Session::new();
        session.set_deleting_id(Some(LinkId::from("x")));

        assert_eq!(session.take_deleting_id(), Some(LinkId::from("x")));
        assert!(session.deleting_id().is_none());
    }

    #[test]
    fn test_clear() {
        let mut session = Session::new();
        session.set_editing_id(Some(LinkId::from("a")));
        session.set_deleting_id(Some(LinkId::from("b")));
        session.clear();
        assert_eq!(session, Session::default());
    }
}
