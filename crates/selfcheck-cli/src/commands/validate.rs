//! The `selfcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use selfcheck_core::{validate_dataset, DiagnosticKind};

use super::Session;

pub async fn execute(dataset: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let session = Session::load(dataset, config_path).await?;
    let dataset = &session.dataset;

    println!(
        "Dataset: {} ({} questions)",
        session.location,
        dataset.len()
    );

    for d in &dataset.diagnostics {
        let label = match d.kind {
            DiagnosticKind::MalformedRow => "SKIPPED",
            DiagnosticKind::InvalidField => "WARNING",
        };
        println!("  [line {}] {label}: {}", d.line, d.message);
    }

    let warnings = validate_dataset(dataset);
    for w in &warnings {
        println!("  [line {}] WARNING: {}", w.line, w.message);
    }

    let total = dataset.diagnostics.len() + warnings.len();
    if total == 0 {
        println!("All questions valid.");
    } else {
        println!("\n{total} problem(s) found.");
    }

    Ok(())
}
