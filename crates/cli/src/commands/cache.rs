use anyhow::Result;
use colored::*;
use taskgraph_core::reader::TaskfileReader;

use crate::CacheCommands;

pub async fn execute(reader: &TaskfileReader, command: CacheCommands) -> Result<()> {
    let cache = reader.cache();

    match command {
        CacheCommands::List => {
            let cached = cache.list_cached()?;
            if cached.is_empty() {
                println!("No cached Taskfiles found.");
            } else {
                println!("{}", "Cached Taskfiles:".bold());
                for entry in cached {
                    println!("  {} -> {}", entry.file_name, entry.path.display());
                }
            }
        }
        CacheCommands::Clear => {
            cache.clear_cache().await?;
            println!(
                "Taskfile cache cleared: {}",
                cache.cache_dir().display().to_string().dimmed()
            );
        }
    }

    Ok(())
}
