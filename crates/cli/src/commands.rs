//! Command implementations.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use chartlink_core::metrics::SEARCH_RESULTS;
use chartlink_core::{
    load_config, validate_config, write_default_config, ChartStore, Config, FilterCache,
    HardlinkMirror, HardlinkTarget, Indexer, SearchCondition, SqliteChartStore, SrtbParser,
};

use crate::filters::FilterArgs;

/// Outcome of a command, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failed,
}

fn load(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn open_store(config: &Config) -> Result<SqliteChartStore> {
    let store = SqliteChartStore::open(&config.database.path)
        .with_context(|| format!("Failed to open index {:?}", config.database.path))?;
    Ok(store.with_report_offset_hours(config.index.report_offset_hours))
}

/// Resolve the effective condition, optionally starting from and saving to the cache.
fn resolve_condition(config: &Config, filters: &FilterArgs, save: bool) -> Result<SearchCondition> {
    let cache = FilterCache::new(&config.cache.path);

    let base = if filters.saved {
        cache
            .load()
            .context("Failed to read saved filter")?
            .unwrap_or_default()
    } else {
        SearchCondition::default()
    };
    let condition = filters.apply(base);

    if save {
        cache.save(&condition).context("Failed to save filter")?;
        info!("Filter saved to {}", cache.path().display());
    }
    Ok(condition)
}

fn search(store: &SqliteChartStore, condition: &SearchCondition) -> Result<Vec<HardlinkTarget>> {
    let targets = store.search(condition).context("Search failed")?;
    SEARCH_RESULTS.observe(targets.len() as f64);
    Ok(targets)
}

pub fn init(config_path: &Path, charts_dir: Option<PathBuf>) -> Result<Status> {
    let config = write_default_config(config_path, charts_dir)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!("Wrote {}", config_path.display());
    println!("  custom charts: {}", config.paths.custom_charts_dir.display());
    println!("  mirror:        {}", config.paths.hardlink_dir.display());
    Ok(Status::Success)
}

pub fn index(config_path: &Path, rebuild: bool) -> Result<Status> {
    let config = load(config_path)?;
    let store = open_store(&config)?;
    let indexer =
        Indexer::new(SrtbParser::new()).with_clip_probe(config.index.probe_clip_duration);

    let charts_dir = &config.paths.custom_charts_dir;
    let progress = |record: &chartlink_core::ChartRecord, idx: usize, total: usize| {
        println!("[{}/{}] {}", idx + 1, total, record.track_title);
    };

    let summary = if rebuild {
        indexer.rebuild(&store, charts_dir, progress)
    } else {
        indexer.index_directory(&store, charts_dir, progress)
    }
    .context("Indexing failed")?;

    println!(
        "{} charts: {} indexed, {} unchanged, {} failed",
        summary.total, summary.indexed, summary.skipped, summary.failed
    );
    Ok(Status::Success)
}

pub fn status(config_path: &Path) -> Result<Status> {
    let config = load(config_path)?;
    let stats = open_store(&config)?.stats().context("Failed to read index")?;

    println!("Indexed charts: {}", stats.total_charts);
    println!(
        "Last indexed:   {}",
        stats.latest_index_timestamp.as_deref().unwrap_or("never")
    );
    Ok(Status::Success)
}

pub fn search_cmd(config_path: &Path, filters: &FilterArgs, save: bool) -> Result<Status> {
    let config = load(config_path)?;
    let store = open_store(&config)?;
    let condition = resolve_condition(&config, filters, save)?;

    let mut targets = search(&store, &condition)?;
    targets.sort_by(|a, b| a.file_reference.cmp(&b.file_reference));
    for target in &targets {
        println!("{}", target.file_reference);
    }
    println!("{} charts match", targets.len());
    Ok(Status::Success)
}

pub fn count(config_path: &Path, filters: &FilterArgs) -> Result<Status> {
    let config = load(config_path)?;
    let store = open_store(&config)?;
    let condition = resolve_condition(&config, filters, false)?;

    let count = store.count(&condition).context("Count failed")?;
    println!("{count}");
    Ok(Status::Success)
}

pub fn sync(config_path: &Path, filters: &FilterArgs, save: bool) -> Result<Status> {
    let config = load(config_path)?;
    let store = open_store(&config)?;
    let condition = resolve_condition(&config, filters, save)?;
    let targets = search(&store, &condition)?;

    let mirror = HardlinkMirror::new(&config.paths.custom_charts_dir, &config.paths.hardlink_dir);
    let outcome = mirror
        .reconcile(&targets, |idx, total| {
            println!("[{}/{}] {}", idx + 1, total, targets[idx].file_reference)
        })
        .context("Mirror sync failed")?;

    if outcome.has_error {
        let message = outcome.error_message.unwrap_or_default();
        warn!("Sync aborted: {}", message);
        eprintln!("{message}");
        println!(
            "Linked {}/{} charts before stopping",
            outcome.success_creation_count,
            targets.len()
        );
        return Ok(Status::Failed);
    }

    println!(
        "Linked {}/{} charts into {}",
        outcome.success_creation_count,
        targets.len(),
        config.paths.hardlink_dir.display()
    );
    Ok(Status::Success)
}

pub fn clear_mirror(config_path: &Path) -> Result<Status> {
    let config = load(config_path)?;
    let mirror = HardlinkMirror::new(&config.paths.custom_charts_dir, &config.paths.hardlink_dir);

    let removed = mirror.clear().context("Failed to clear mirror")?;
    println!(
        "Removed {} charts, {} album art and {} clips",
        removed.charts, removed.album_art, removed.clips
    );
    Ok(Status::Success)
}

pub fn truncate(config_path: &Path) -> Result<Status> {
    let config = load(config_path)?;
    open_store(&config)?
        .truncate()
        .context("Failed to truncate index")?;
    println!("Index cleared");
    Ok(Status::Success)
}
