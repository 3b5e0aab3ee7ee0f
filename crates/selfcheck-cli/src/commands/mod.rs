//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list;
pub mod show;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};

use selfcheck_core::{Dataset, Engine, TaskId};
use selfcheck_source::config::load_config_from;
use selfcheck_source::{create_source, load_dataset, SelfcheckConfig};

/// A loaded dataset together with the configuration it was loaded with.
pub struct Session {
    pub config: SelfcheckConfig,
    pub location: String,
    pub dataset: Dataset,
}

impl Session {
    /// Resolve the dataset location, fetch it and parse it.
    pub async fn load(dataset: Option<String>, config_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        let location = dataset.unwrap_or_else(|| config.dataset.source.clone());

        let source = create_source(&location)?;
        tracing::debug!(source = %source.describe(), "loading dataset");
        let dataset = load_dataset(source.as_ref(), &config.dataset.format)
            .await
            .with_context(|| format!("failed to load dataset from {location}"))?;

        Ok(Self {
            config,
            location,
            dataset,
        })
    }

    pub fn engine(&self) -> Engine {
        Engine::with_questions(self.dataset.questions.clone(), self.config.grading.clone())
    }

    /// An engine with week and task already selected.
    pub fn engine_at(&self, week: u32, task: TaskId, bonus: bool) -> Result<Engine> {
        let mut engine = self.engine();
        engine.select_week(week)?;
        engine.select_task(task, bonus)?;
        Ok(engine)
    }
}

pub fn describe(week: u32, task: TaskId, bonus: bool) -> String {
    if bonus {
        format!("Week {week}, task {task} (bonus)")
    } else {
        format!("Week {week}, task {task}")
    }
}
