//! Error types for gesturewire

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown handler kind: {0}")]
    UnknownKind(String),

    #[error("handler tag {0} already registered")]
    DuplicateTag(i32),

    #[error("no handler with tag {0}")]
    UnknownTag(i32),

    #[error("bad config value for \"{key}\": expected {expected}, got {found}")]
    BadConfigValue {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid fling direction mask: {0}")]
    BadDirectionMask(i64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace error: {0}")]
    Trace(#[from] serde_json::Error),

    #[error("tuning file error: {0}")]
    Tuning(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn bad_config(key: &'static str, expected: &'static str, found: &'static str) -> Self {
        Error::BadConfigValue { key, expected, found }
    }
}
