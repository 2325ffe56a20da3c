use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
};

#[derive(Debug)]
pub enum SearchError {
    CommandNotFound(String),
    /// The root is outside any git work tree.
    NotARepository(PathBuf),
    LaunchFailed {
        command: String,
        reason: String,
    },
    SearchFailed {
        command: String,
        reason: String,
    },
    OutputTooLarge {
        limit_bytes: usize,
    },
    InvalidPattern {
        pattern: String,
        reason: String,
    },
    InvalidRoot(PathBuf),
    Cancelled,
}

impl SearchError {
    /// Errors after which another backend may still succeed.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::CommandNotFound(_) | Self::NotARepository(_))
    }
}

impl Display for SearchError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::CommandNotFound(command) => write!(f, "{command} is not available"),
            Self::NotARepository(root) => write!(f, "{} is not inside a git work tree", root.display()),
            Self::LaunchFailed {
                command,
                reason,
            } => {
                write!(f, "failed to launch {command}: {reason}")
            },
            Self::SearchFailed {
                command,
                reason,
            } => {
                write!(f, "{command} failed: {reason}")
            },
            Self::OutputTooLarge {
                limit_bytes,
            } => {
                write!(f, "search output exceeded {limit_bytes} bytes")
            },
            Self::InvalidPattern {
                pattern,
                reason,
            } => {
                write!(f, "invalid search pattern '{pattern}': {reason}")
            },
            Self::InvalidRoot(root) => write!(f, "search root {} is not a directory", root.display()),
            Self::Cancelled => f.write_str("search cancelled"),
        }
    }
}

impl std::error::Error for SearchError {}
