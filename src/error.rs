//! Error type shared by every compiler stage.
//!
//! Each variant carries a stable code in the `AF-ERR-*` family so hosts can
//! match on failures without parsing messages.

use std::path::PathBuf;
use thiserror::Error;

pub const ERR_EMPTY_LABEL: &str = "AF-ERR-NAME-001";
pub const ERR_PARSE: &str = "AF-ERR-PARSE-001";
pub const ERR_DUPLICATE_SOCKET: &str = "AF-ERR-SOCKET-001";
pub const ERR_DUPLICATE_CHILD: &str = "AF-ERR-CHILD-001";
pub const ERR_CONFLICTING_VIEW: &str = "AF-ERR-CHILD-002";
pub const ERR_CONTROLLER_LOAD: &str = "AF-ERR-CTRL-001";
pub const ERR_INVALID_MODULE: &str = "AF-ERR-EMIT-001";
pub const ERR_IO: &str = "AF-ERR-IO-001";
pub const ERR_DISCOVERY: &str = "AF-ERR-DISCOVERY-001";
pub const ERR_CONFIG: &str = "AF-ERR-CONFIG-001";

pub type Result<T, E = ViewError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("label '{label}' does not contain any words")]
    EmptyLabel { label: String },

    #[error("failed to parse markup for '{view}': {source}")]
    Parse {
        view: String,
        #[source]
        source: std::io::Error,
    },

    #[error("socket '{socket}' is declared more than once in '{view}'")]
    DuplicateSocket { view: String, socket: String },

    /// Two children of one view share an element tag or a class name.
    #[error("child view '{name}' is declared more than once in '{view}'")]
    DuplicateChild { view: String, name: String },

    #[error("view class '{class_name}' has conflicting definitions in one tree")]
    ConflictingView { class_name: String },

    #[error("failed to load controller '{path}': {message}")]
    ControllerLoad { path: String, message: String },

    #[error("generated module for '{view}' is not valid JavaScript: {}", .errors.join("; "))]
    InvalidModule { view: String, errors: Vec<String> },

    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan '{}': {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid compile options: {0}")]
    Config(#[from] serde_json::Error),
}

impl ViewError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyLabel { .. } => ERR_EMPTY_LABEL,
            Self::Parse { .. } => ERR_PARSE,
            Self::DuplicateSocket { .. } => ERR_DUPLICATE_SOCKET,
            Self::DuplicateChild { .. } => ERR_DUPLICATE_CHILD,
            Self::ConflictingView { .. } => ERR_CONFLICTING_VIEW,
            Self::ControllerLoad { .. } => ERR_CONTROLLER_LOAD,
            Self::InvalidModule { .. } => ERR_INVALID_MODULE,
            Self::Io { .. } => ERR_IO,
            Self::Discovery { .. } => ERR_DISCOVERY,
            Self::Config(_) => ERR_CONFIG,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
