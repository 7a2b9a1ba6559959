use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("voter entry {line} is missing a credential")]
    MissingCredential { line: usize },

    #[error("roster is empty")]
    Empty,

    #[error("disabled-voter store task failed: {0}")]
    Blocking(String),
}
