//! Link command handlers

use anyhow::{bail, Context, Result};

use linkshelf_core::{Link, LinkInput, LinkStore, Persistence, Session};

use crate::editor::{confirm, prompt_with_default};
use crate::metadata::fetch_metadata;
use crate::output::{short_id, Output, TablePresenter};

/// Add a new link
///
/// Without a title the page is fetched for one; the URL itself is the last
/// resort.
pub async fn add<P: Persistence>(
    store: &mut LinkStore<P>,
    url: String,
    title: Option<String>,
    description: Option<String>,
    version: Option<String>,
    output: &Output,
) -> Result<()> {
    let (title, description) = match title.filter(|t| !t.trim().is_empty()) {
        Some(title) => (title, description),
        None => {
            let metadata = fetch_metadata(&browser_url(&url)).await;
            (
                metadata.title.unwrap_or_else(|| url.clone()),
                description.or(metadata.description),
            )
        }
    };

    let mut input = LinkInput::new(title, url);
    input.description = description;
    input.version = version;

    let link = store.add(input).context("Failed to add link")?;

    output.success(&format!("Added link: {}", link.id));
    output.print_link(&link);

    Ok(())
}

/// List all links in order
pub fn list<P: Persistence>(store: &LinkStore<P>, output: &Output) -> Result<()> {
    output.print_links(&store.list());
    Ok(())
}

/// Show a single link
pub fn show<P: Persistence>(store: &LinkStore<P>, id: &str, output: &Output) -> Result<()> {
    let link = resolve_link(store, id)?;
    output.print_link(&link);
    Ok(())
}

/// Open a link in the system browser
pub fn open<P: Persistence>(store: &LinkStore<P>, id: &str, output: &Output) -> Result<()> {
    let link = resolve_link(store, id)?;
    let url = browser_url(&link.url);

    open::that(&url).with_context(|| format!("Failed to open {}", url))?;
    output.message(&format!("Opened {}", url));
    Ok(())
}

/// Fields given on the `edit` command line
#[derive(Debug, Default)]
pub struct EditFields {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl EditFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.version.is_none()
    }

    /// Merge onto the link's current values
    fn into_input(self, link: &Link) -> LinkInput {
        LinkInput {
            title: self.title.unwrap_or_else(|| link.title.clone()),
            url: self.url.unwrap_or_else(|| link.url.clone()),
            description: Some(self.description.unwrap_or_else(|| link.description.clone())),
            version: self.version,
        }
    }
}

/// Edit a link
pub fn edit<P: Persistence>(
    store: &mut LinkStore<P>,
    session: &mut Session,
    id: &str,
    fields: EditFields,
    output: &Output,
) -> Result<()> {
    let link = resolve_link(store, id)?;
    session.set_editing_id(Some(link.id.clone()));

    let fields = if !fields.is_empty() {
        fields
    } else if output.should_prompt() {
        prompt_edit(&link)?
    } else {
        session.clear();
        bail!("Nothing to change. Pass --title, --url, --description or --link-version.");
    };

    let result = store.update(&link.id, fields.into_input(&link));
    session.set_editing_id(None);

    let updated = result
        .context("Failed to update link")?
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

    output.success("Link updated");
    output.print_link(&updated);

    Ok(())
}

fn prompt_edit(link: &Link) -> Result<EditFields> {
    println!("Editing link: {}", link.id);
    println!("Press Enter to keep current value, or type new value.\n");

    Ok(EditFields {
        title: prompt_with_default("Title", &link.title)?,
        url: prompt_with_default("URL", &link.url)?,
        description: prompt_with_default("Description", &link.description)?,
        version: prompt_with_default("Version", &link.version)?,
    })
}

/// Delete a link
pub fn delete<P: Persistence>(
    store: &mut LinkStore<P>,
    session: &mut Session,
    id: &str,
    output: &Output,
) -> Result<()> {
    let link = resolve_link(store, id)?;
    session.set_deleting_id(Some(link.id.clone()));

    // Confirm deletion
    if output.should_prompt() {
        println!("Delete link: {} - {}", short_id(link.id.as_str()), link.title);
        if !confirm("Are you sure?")? {
            session.set_deleting_id(None);
            println!("Cancelled.");
            return Ok(());
        }
    }

    let Some(confirmed) = session.take_deleting_id() else {
        return Ok(());
    };
    if !store.delete(&confirmed) {
        bail!("Link not found: {}", id);
    }

    output.success(&format!("Deleted link: {}", confirmed));

    Ok(())
}

/// Move `dragged` into `target`'s position
pub fn move_link<P: Persistence>(
    store: &mut LinkStore<P>,
    dragged: &str,
    target: &str,
    output: &Output,
) -> Result<()> {
    let dragged = resolve_link(store, dragged)?;
    let target = resolve_link(store, target)?;

    if dragged.id == target.id {
        output.message("Link is already in that position.");
        return Ok(());
    }

    if output.should_prompt() {
        store.set_presenter(Box::new(TablePresenter::new()));
    }
    store.reorder(&dragged.id, &target.id);

    // Orders are renumbered by the move, so read the new slot back
    let moved = store
        .get(&dragged.id)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", dragged.id))?;
    output.success(&format!(
        "Moved '{}' to position {}",
        moved.title, moved.order
    ));

    Ok(())
}

/// Resolve a full ID or a unique prefix to a link
pub fn resolve_link<P: Persistence>(store: &LinkStore<P>, id: &str) -> Result<Link> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Link ID must not be empty");
    }

    if let Some(link) = store.get(&id.into()) {
        return Ok(link);
    }

    let mut matches = store.find_by_prefix(id);
    match matches.len() {
        0 => bail!("No link found matching: {}", id),
        1 => Ok(matches.remove(0)),
        _ => {
            eprintln!("Multiple links match '{}':", id);
            for link in &matches {
                eprintln!("  {} - {}", link.id, link.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// URL suitable for a browser: bare hosts get `https://`
pub fn browser_url(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") || url.starts_with("mailto:") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
