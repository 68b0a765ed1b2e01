// Application state module
// Everything a connection needs, built once and shared read-only

use super::types::Config;
use crate::assets::AssetTable;
use crate::http::csp::CspPolicy;

/// Application state
///
/// Constructed after the asset table has loaded and never mutated afterwards,
/// so connections share it through an `Arc` without locking.
pub struct AppState {
    pub config: Config,
    pub assets: AssetTable,
    pub csp: CspPolicy,
}

impl AppState {
    pub fn new(config: Config, assets: AssetTable) -> Self {
        let csp = CspPolicy::from_template(&config.content.csp_header);
        Self {
            config,
            assets,
            csp,
        }
    }
}
