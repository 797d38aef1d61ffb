use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage write failed at {path}: {source}")]
    StorageWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("unknown datasource \"{0}\"")]
    UnknownDatasource(String),

    #[error("state serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
