//! Asset table module
//!
//! Reads the prebuilt site once at startup into an immutable map from URL
//! path to content and MIME type.

mod error;
pub mod source;

pub use error::LoadError;
pub use source::{AssetSource, EmbeddedAssets};

use hyper::body::Bytes;
use std::collections::HashMap;

use crate::config::ContentConfig;
use crate::http::{mime, rewrite};
use crate::logger;

/// URL path of the application shell
pub const INDEX_PATH: &str = "/index.html";

/// URL path of the runtime configuration document
pub const CONFIG_PATH: &str = "/config.json";

/// One servable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content: Bytes,
    pub mime_type: String,
}

/// Immutable path → asset map with the index document always present
#[derive(Debug, Clone)]
pub struct AssetTable {
    assets: HashMap<String, Asset>,
    index: Asset,
}

impl AssetTable {
    /// Exact-path lookup
    pub fn get(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// The application shell
    pub const fn index(&self) -> &Asset {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Build the asset table from `source`
///
/// Any read failure aborts the whole load; a table without an index document
/// is rejected.
pub fn load(source: &impl AssetSource, content: &ContentConfig) -> Result<AssetTable, LoadError> {
    let mut assets = HashMap::new();

    for relative in source.paths() {
        let data = source.read(&relative).map_err(|e| LoadError::Read {
            path: relative.clone(),
            source: e,
        })?;

        let path = format!("/{}", relative.trim_start_matches('/'));
        let data = if path == INDEX_PATH {
            rewrite::rewrite_base_href(&data, &content.base_href)
        } else {
            data.into_owned()
        };

        let asset = Asset {
            content: Bytes::from(data),
            mime_type: mime::content_type_for(&path),
        };
        logger::log_asset_loaded(&path, asset.content.len(), &asset.mime_type);
        assets.insert(path, asset);
    }

    assets.insert(
        CONFIG_PATH.to_string(),
        Asset {
            content: Bytes::from(content.config_json.clone()),
            mime_type: mime::content_type_for(CONFIG_PATH),
        },
    );

    let index = assets
        .get(INDEX_PATH)
        .cloned()
        .ok_or(LoadError::MissingIndex(INDEX_PATH))?;

    Ok(AssetTable { assets, index })
}
