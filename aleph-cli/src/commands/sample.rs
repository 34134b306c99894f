//! Sample command - insert the demo sessions into the store

use aleph_core::BuildOutcome;
use anyhow::{Context, Result};

use super::{create_spinner, StoreOptions};
use crate::output::{Output, OutputFormat, SuccessMessage};

/// Run the sample command
pub async fn run(store: &StoreOptions, format: OutputFormat) -> Result<()> {
    let loader = store.loader()?;

    let spinner = create_spinner("Inserting sample data...");
    let inserted = loader.load_sample_data().await;
    spinner.finish_and_clear();
    inserted.with_context(|| format!("Failed to insert sample data into {}", store.endpoint))?;

    let message = match store.load().await? {
        BuildOutcome::Ready(timeline) => format!(
            "Sample data inserted; timeline now has {} states over {} sessions",
            timeline.len(),
            timeline.session_count()
        ),
        BuildOutcome::Empty { reason, .. } => {
            format!("Sample data inserted, but the store is still empty: {}", reason)
        }
    };

    Output::new(SuccessMessage::new(message), format).render()
}
