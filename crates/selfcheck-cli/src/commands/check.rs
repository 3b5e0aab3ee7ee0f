//! The `selfcheck check` command.

use std::path::PathBuf;

use anyhow::Result;

use selfcheck_core::{CheckResult, TaskId, Verdict};

use super::{describe, Session};

/// Exit code for a well-formed but incorrect answer.
const EXIT_INCORRECT: i32 = 2;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    dataset: Option<String>,
    config_path: Option<PathBuf>,
    week: u32,
    task: TaskId,
    bonus: bool,
    variant: Option<usize>,
    answers: Vec<String>,
    format: String,
) -> Result<()> {
    let session = Session::load(dataset, config_path).await?;
    let mut engine = session.engine_at(week, task, bonus)?;

    if let Some(number) = variant {
        anyhow::ensure!(number >= 1, "variants are numbered from 1");
        engine.select_variant(number - 1)?;
    }

    let inputs: Vec<&str> = answers.iter().map(String::as_str).collect();
    let result = engine.check_raw(&inputs)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&describe(week, task, bonus), variant, &result),
    }

    if !result.is_correct() {
        std::process::exit(EXIT_INCORRECT);
    }

    Ok(())
}

fn print_text(title: &str, variant: Option<usize>, result: &CheckResult) {
    match variant {
        Some(v) => println!("{title}, variant {v}"),
        None => println!("{title}"),
    }

    let overall = if result.is_correct() {
        "correct"
    } else {
        "incorrect"
    };
    println!("Result: {overall}");
    println!("{}", result.message);

    for field in &result.per_field {
        let mark = match field.verdict {
            Verdict::Match => "ok",
            Verdict::Mismatch => "wrong",
        };
        println!("  [{mark}] {}", field.label);
    }
}
