//! Composition root: config, dataset, journals and service are wired here
//! explicitly, once per process.

use anyhow::{Context, Result, ensure};
use qadesk_config::Config;
use qadesk_core::{DatasetFormat, QaDataset};
use qadesk_engine::QaService;
use qadesk_journal::Journals;
use tracing::info;

use crate::cli::Overrides;

pub fn apply_overrides(config: &mut Config, overrides: &Overrides) -> Result<()> {
    if let Some(path) = &overrides.dataset {
        config.dataset.path = path.clone();
        // An explicit --format wins; otherwise trust the extension
        config.dataset.format = DatasetFormat::from_path(path);
    }
    if let Some(format) = overrides.format {
        config.dataset.format = format;
    }
    if let Some(threshold) = overrides.threshold {
        config.threshold = threshold;
    }
    if let Some(dir) = &overrides.log_dir {
        config.logs.dir = dir.clone();
    }

    ensure!(
        (0.0..=1.0).contains(&config.threshold),
        "threshold must be between 0 and 1, got {}",
        config.threshold
    );
    Ok(())
}

pub async fn load_dataset(config: &Config) -> Result<QaDataset> {
    let source = config.dataset.format.source(&config.dataset.path);
    let dataset = source
        .load()
        .await
        .with_context(|| format!("Failed to load dataset from {}", source.describe()))?;

    info!(
        source = %source.describe(),
        entries = dataset.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

pub fn open_journals(config: &Config) -> Result<Journals> {
    let logs = &config.logs;
    Journals::open(&logs.dir, &logs.audit_file, &logs.error_file, &logs.feedback_file)
        .with_context(|| format!("Failed to open journals in {}", logs.dir.display()))
}

/// Load the dataset, open the journals and build the index
pub async fn build_service(config: &Config) -> Result<QaService> {
    let dataset = load_dataset(config).await?;
    let journals = open_journals(config)?;

    let service = QaService::new(dataset, journals)
        .context("Failed to build the question index")?
        .with_threshold(config.threshold);
    Ok(service)
}
