use thiserror::Error;

/// Reasons the asset table could not be built
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read asset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("index document {0} not found in the asset tree")]
    MissingIndex(&'static str),
}
