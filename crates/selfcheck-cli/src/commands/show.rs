//! The `selfcheck show` command.

use std::path::PathBuf;

use anyhow::Result;

use selfcheck_core::TaskId;

use super::{describe, Session};

pub async fn execute(
    dataset: Option<String>,
    config_path: Option<PathBuf>,
    week: u32,
    task: TaskId,
    bonus: bool,
) -> Result<()> {
    let session = Session::load(dataset, config_path).await?;
    let engine = session.engine_at(week, task, bonus)?;
    let Some(question) = engine.selected_question() else {
        anyhow::bail!("no question selected");
    };

    println!("{}", describe(week, task, bonus));
    println!();
    let prompt = engine.prompt_text(question);
    if prompt.is_empty() {
        println!("Question not available.");
    } else {
        for line in prompt.lines() {
            println!("  {line}");
        }
    }
    println!();

    let variants = engine.list_variants(question);
    if variants > 0 {
        println!("Variants: {variants} (choose one with --variant 1..={variants})");
    }

    println!("Inputs:");
    for (i, label) in engine.field_labels(question).iter().enumerate() {
        println!("  {}. {label}", i + 1);
    }

    Ok(())
}
