//! Stats command implementation.

use loginsight_core::{CoreResult, LogStats, LogStore};

/// Runs the stats command.
pub fn run(store: &LogStore, format: &str) -> CoreResult<()> {
    let stats = store.stats()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Log directory: {}", store.config().log_dir.display());
        println!();
        print_table(&stats);
    }

    Ok(())
}

fn print_table(stats: &LogStats) {
    println!("{:<10} {:>10} {:>12}  Last modified", "Category", "Lines", "Bytes");
    for (category, stat) in stats {
        let modified = stat
            .last_modified
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
        println!(
            "{:<10} {:>10} {:>12}  {}",
            category.name(),
            stat.count,
            stat.size,
            modified
        );
    }
}
