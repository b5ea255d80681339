use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single GitHub API call.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error requesting {path}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub rejected credentials for {path} (HTTP {status})")]
    Unauthorized { path: String, status: StatusCode },

    #[error("GitHub API returned HTTP {status} for {path}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse JSON from {path}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Unauthorized { status, .. } | FetchError::Status { status, .. } => {
                Some(*status)
            }
            FetchError::Transport { .. } | FetchError::Decode { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to read template {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template references unknown field `{0}`")]
    UnknownField(String),

    #[error("Failed to serialize stats for rendering")]
    Serialize(#[from] serde_json::Error),
}
