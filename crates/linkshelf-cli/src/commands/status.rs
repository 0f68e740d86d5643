//! Status command handler

use anyhow::Result;

use linkshelf_core::{Config, JsonFilePersistence, LinkStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &LinkStore<JsonFilePersistence>, config: &Config, output: &Output) -> Result<()> {
    let persistence = store.persistence();
    let stats = persistence.stats();
    let backup = persistence.backup_path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage": {
                        "path": persistence.path(),
                        "exists": stats.exists,
                        "size": stats.size_bytes,
                        "corrupt_backup": backup.exists().then_some(&backup)
                    },
                    "counts": {
                        "links": store.len()
                    },
                    "import": {
                        "github_username": config.github_username,
                        "vercel_token_set": config.vercel_token.is_some()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("linkshelf Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", persistence.path().display());
            if stats.exists {
                println!("  Size:     {}", stats.size_human());
            } else {
                println!("  Size:     (no links saved yet)");
            }
            if backup.exists() {
                println!("  Backup:   {} (a corrupt collection was set aside)", backup.display());
            }
            println!();
            println!("Contents:");
            println!("  Links: {}", store.len());
            println!();
            println!("Import:");
            println!(
                "  GitHub: {}",
                config
                    .github_username
                    .as_deref()
                    .unwrap_or("(no default username)")
            );
            println!(
                "  Vercel: {}",
                if config.vercel_token.is_some() {
                    "token configured"
                } else {
                    "no token"
                }
            );
        }
    }

    Ok(())
}
