//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use linkshelf_core::{ImportOutcome, Link, Presenter};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single link
    pub fn print_link(&self, link: &Link) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", link.id);
                println!("Title:       {}", link.title);
                println!("URL:         {}", link.url);
                if !link.description.is_empty() {
                    println!("Description: {}", link.description);
                }
                println!("Version:     {}", link.version);
                println!("Position:    {}", link.order);
                println!("Created:     {}", link.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", link.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(link),
            OutputFormat::Quiet => {
                println!("{}", link.id);
            }
        }
    }

    /// Print a list of links
    pub fn print_links(&self, links: &[Link]) {
        match self.format {
            OutputFormat::Human => print_link_table(links),
            OutputFormat::Json => print_json(&links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print the result of an import
    pub fn print_import(&self, outcome: &ImportOutcome) {
        match self.format {
            OutputFormat::Human => match outcome {
                ImportOutcome::Success {
                    source,
                    total,
                    added,
                    updated,
                    ..
                } => {
                    println!(
                        "✓ Imported {} item(s) from {}: {} added, {} updated",
                        total, source, added, updated
                    );
                }
                ImportOutcome::Failure { source, error } => {
                    eprintln!("✗ Import from {} failed: {}", source, error);
                }
            },
            OutputFormat::Json => print_json(outcome),
            OutputFormat::Quiet => {
                if let ImportOutcome::Success { added, updated, .. } = outcome {
                    println!("{} {}", added, updated);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Redraws the link table whenever the store changes
///
/// The snapshot delivered when the presenter is attached is skipped, so a
/// command only prints the collection as it stands after its mutation.
#[derive(Default)]
pub struct TablePresenter {
    renders: usize,
}

impl TablePresenter {
    pub fn new() -> Self {
        Self { renders: 0 }
    }
}

impl Presenter for TablePresenter {
    fn render(&mut self, links: &[Link]) {
        self.renders += 1;
        if self.renders > 1 {
            println!();
            print_link_table(links);
        }
    }
}

fn print_link_table(links: &[Link]) {
    if links.is_empty() {
        println!("No links found.");
        return;
    }
    for link in links {
        println!(
            "{:>3}. {} | {} | {} | {}",
            link.order,
            short_id(link.id.as_str()),
            truncate(&link.title, 30),
            truncate(&link.url, 40),
            link.version
        );
    }
    println!("\n{} link(s)", links.len());
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// First 8 characters of an ID
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are never split
        assert_eq!(truncate("⭐⭐⭐⭐⭐⭐", 5), "⭐⭐...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_table_presenter_skips_attach_snapshot() {
        let mut presenter = TablePresenter::new();
        presenter.render(&[]);
        assert_eq!(presenter.renders, 1);
        presenter.render(&[]);
        assert_eq!(presenter.renders, 2);
    }
}
