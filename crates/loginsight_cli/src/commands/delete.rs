//! Delete command implementation.

use loginsight_core::{CoreResult, DeleteConditions, LogStore};
use tracing::{info, warn};

/// Runs the delete command.
///
/// The deletion is recorded in the `app` log.
pub fn run(
    store: &LogStore,
    category: &str,
    start: Option<&str>,
    end: Option<&str>,
    search: Option<&str>,
) -> CoreResult<()> {
    let conditions = DeleteConditions::from_params(start, end, search)?;
    if conditions.is_empty() {
        warn!("No --start, --end or --search given; nothing will be deleted");
    }

    let outcome = store.delete_audited(category, &conditions)?;
    info!(
        category,
        deleted = outcome.deleted_count,
        "Deleted records"
    );

    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
