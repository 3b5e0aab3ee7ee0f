//! The `selfcheck list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::Session;

pub async fn execute(
    dataset: Option<String>,
    config_path: Option<PathBuf>,
    week: Option<u32>,
) -> Result<()> {
    let session = Session::load(dataset, config_path).await?;
    let engine = session.engine();

    let Some(week) = week else {
        let mut table = Table::new();
        table.set_header(vec!["Week", "Tasks", "Bonus"]);
        for week in engine.list_weeks() {
            let tasks = engine.list_tasks(week);
            let bonus = tasks.iter().filter(|t| t.is_bonus).count();
            table.add_row(vec![
                Cell::new(format!("Week {week}")),
                Cell::new(tasks.len() - bonus),
                Cell::new(bonus),
            ]);
        }
        println!("{table}");
        return Ok(());
    };

    let mut engine = engine;
    let tasks = engine.select_week(week)?;
    if tasks.is_empty() {
        println!("No tasks for week {week}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Task", "Bonus", "Variants", "Inputs", "Question"]);
    for entry in tasks {
        let question = engine.select_task(entry.task, entry.is_bonus)?;
        let first_line = question.prompt_lines().next().unwrap_or("").to_string();
        table.add_row(vec![
            Cell::new(format!("Task {}", entry.task)),
            Cell::new(if entry.is_bonus { "Bonus" } else { "" }),
            Cell::new(question.variant_count()),
            Cell::new(question.field_count),
            Cell::new(truncate(&first_line, 60)),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_long_prompts() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
