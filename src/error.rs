use thiserror::Error;

/// Problems with the run inputs. Always raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid repoOwnerAndName: {0:?}")]
    InvalidRepository(String),

    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    /// Fatal: the run stops here instead of searching with an empty query.
    #[error("Must specify at least one search or milestone filter input.")]
    NoFilters,
}
