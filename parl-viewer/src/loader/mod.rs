//! Dataset loading: list index, detail documents and prefetch

pub mod fetch;
pub mod store;

use parl_common::config::ViewerConfig;
use parl_common::model::parse_list_index;
use parl_common::{Entity, Error, Result};
use reqwest::Url;
use tracing::info;

pub use fetch::{HttpSource, JsonSource};
pub use store::{DetailStore, PrefetchReport, MAX_PREFETCH_WORKERS};

/// Resolved URLs of the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLocation {
    pub data_root: Url,
    pub list_url: Url,
    pub details_root: Url,
}

impl DataLocation {
    /// Resolves the list file and details directory against the data root.
    pub fn new(data_root: &str, list_file: &str, details_dir: &str) -> Result<Self> {
        let data_root = Url::parse(data_root).map_err(|e| invalid("data root", e))?;
        let list_url = data_root.join(list_file).map_err(|e| invalid("list file", e))?;
        let details_root = data_root
            .join(details_dir)
            .map_err(|e| invalid("details directory", e))?;

        Ok(Self {
            data_root,
            list_url,
            details_root,
        })
    }

    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        Self::new(&config.data_root, &config.list_file, &config.details_dir)
    }

    pub fn is_local_file(&self) -> bool {
        self.data_root.scheme() == "file"
    }
}

fn invalid(what: &str, e: impl std::fmt::Display) -> Error {
    Error::Config(format!("Invalid {} URL: {}", what, e))
}

/// Fetches and reads the list index.
pub async fn load_list(source: &dyn JsonSource, location: &DataLocation) -> Result<Vec<Entity>> {
    let value = source.fetch_json(location.list_url.as_str()).await?;
    let entities = parse_list_index(value);
    info!(url = %location.list_url, count = entities.len(), "Loaded list index");
    Ok(entities)
}

/// Full-page error shown when the list index cannot be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLoadFailure {
    pub message: String,
    pub details: String,
}

impl ListLoadFailure {
    pub fn from_error(err: &Error, location: &DataLocation) -> Self {
        if matches!(err, Error::LocalFile(_)) || location.is_local_file() {
            return Self {
                message: "Impossible de charger la liste.".to_string(),
                details: format!(
                    "Servez {} depuis un serveur HTTP local puis indiquez son URL via --data-root ou PARL_DATA_ROOT.",
                    location.data_root
                ),
            };
        }

        Self {
            message: "Impossible de charger la liste des parlementaires.".to_string(),
            details: format!("URL: {} | {}", location.list_url, err),
        }
    }
}
