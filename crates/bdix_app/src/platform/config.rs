use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use bdix_core::{Category, OpenTarget};
use bdix_engine::{
    EngineConfig, FetchSettings, ProbeSettings, DEFAULT_EXPORT_FILENAME, DEFAULT_SOURCE_URL,
};
use engine_logging::{engine_info, engine_warn, LogDestination};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::cli::Cli;

const CONFIG_FILENAME: &str = "bdix_tester.ron";

/// On-disk configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    pub source_url: String,
    pub probe_timeout_ms: u64,
    pub fetch_timeout_secs: u64,
    pub concurrency: usize,
    pub category: String,
    pub log_destination: String,
    pub export_path: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let probe = ProbeSettings::default();
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            probe_timeout_ms: probe.timeout.as_millis() as u64,
            fetch_timeout_secs: fetch.request_timeout.as_secs(),
            concurrency: probe.concurrency,
            category: Category::default().to_string(),
            log_destination: "file".to_string(),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILENAME),
        }
    }
}

/// Loads `explicit`, or `./bdix_tester.ron` when no path was given.
///
/// A missing default file yields defaults. A default file that fails to parse
/// is reported and replaced by defaults; an explicit one is an error.
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    let path = explicit.unwrap_or_else(|| Path::new(CONFIG_FILENAME));
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };

    match ron::from_str::<FileConfig>(&content) {
        Ok(config) => {
            engine_info!("Loaded configuration from {:?}", path);
            Ok(config)
        }
        Err(err) if explicit.is_none() => {
            engine_warn!("Failed to parse config {:?}: {}; using defaults", path, err);
            eprintln!("Warning: ignoring invalid {}: {err}", path.display());
            Ok(FileConfig::default())
        }
        Err(err) => Err(err).with_context(|| format!("failed to parse config {}", path.display())),
    }
}

/// Effective settings after command-line overrides.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub category: Category,
    pub engine: EngineConfig,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    pub export_path: PathBuf,
    pub save_after_run: bool,
    pub show_after_run: bool,
    pub open_after_run: Option<OpenTarget>,
}

impl Settings {
    pub(crate) fn resolve(file: FileConfig, cli: &Cli) -> anyhow::Result<Self> {
        let category = match cli.category {
            Some(category) => category,
            None => file
                .category
                .parse::<Category>()
                .context("invalid category in config file")?,
        };
        let log_destination = match cli.log {
            Some(destination) => destination,
            None => file
                .log_destination
                .parse::<LogDestination>()
                .map_err(anyhow::Error::msg)
                .context("invalid log_destination in config file")?,
        };

        let concurrency = cli.concurrency.unwrap_or(file.concurrency);
        if concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        let timeout_ms = cli.timeout_ms.unwrap_or(file.probe_timeout_ms);
        if timeout_ms == 0 {
            bail!("probe timeout must be at least 1 ms");
        }

        let engine = EngineConfig {
            fetch: FetchSettings {
                source_url: cli.source_url.clone().unwrap_or(file.source_url),
                request_timeout: Duration::from_secs(file.fetch_timeout_secs.max(1)),
                ..FetchSettings::default()
            },
            probe: ProbeSettings {
                timeout: Duration::from_millis(timeout_ms),
                concurrency,
            },
        };

        Ok(Self {
            category,
            engine,
            log_destination,
            log_level: if cli.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            export_path: cli.save.clone().unwrap_or(file.export_path),
            save_after_run: cli.save.is_some(),
            show_after_run: cli.show,
            open_after_run: cli.open,
        })
    }
}
