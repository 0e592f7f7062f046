use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Classification of a failure, independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    NetworkFailure,
    HttpStatusFailure,
    FilesystemFailure,
    Timeout,
}

/// Code attached to a fetch that never received a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCode {
    Timeout,
    ConnectionRefused,
    TooManyRedirects,
    Body,
    Other,
}

impl NetworkCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkCode::Timeout => "ETIMEDOUT",
            NetworkCode::ConnectionRefused => "ECONNREFUSED",
            NetworkCode::TooManyRedirects => "ERR_TOO_MANY_REDIRECTS",
            NetworkCode::Body => "ERR_BODY",
            NetworkCode::Other => "ERR_NETWORK",
        }
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkCode::Timeout
        } else if err.is_connect() {
            NetworkCode::ConnectionRefused
        } else if err.is_redirect() {
            NetworkCode::TooManyRedirects
        } else if err.is_body() || err.is_decode() {
            NetworkCode::Body
        } else {
            NetworkCode::Other
        }
    }
}

impl fmt::Display for NetworkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OS-level code attached to a filesystem failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsCode {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    NotADirectory,
    Other(Option<i32>),
}

// POSIX errno for ENOTDIR; io::ErrorKind::NotADirectory is too recent to rely on.
const ENOTDIR: i32 = 20;

impl FsCode {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsCode::NotFound,
            io::ErrorKind::PermissionDenied => FsCode::PermissionDenied,
            io::ErrorKind::AlreadyExists => FsCode::AlreadyExists,
            _ if cfg!(unix) && err.raw_os_error() == Some(ENOTDIR) => FsCode::NotADirectory,
            _ => FsCode::Other(err.raw_os_error()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FsCode::NotFound => "ENOENT",
            FsCode::PermissionDenied => "EACCES",
            FsCode::AlreadyExists => "EEXIST",
            FsCode::NotADirectory => "ENOTDIR",
            FsCode::Other(_) => "EIO",
        }
    }
}

impl fmt::Display for FsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsCode::Other(Some(errno)) => write!(f, "{} (os error {})", self.as_str(), errno),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid URL {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("network failure [{code}] fetching {url}: {detail}")]
    Network {
        url: String,
        code: NetworkCode,
        detail: String,
    },

    #[error("HTTP status {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("filesystem failure [{code}] at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        code: FsCode,
        #[source]
        source: io::Error,
    },

    #[error("page load did not finish within {0:?}")]
    Timeout(Duration),

    #[error("{failed} of {total} assets failed, first: {first}")]
    AssetFailures {
        failed: usize,
        total: usize,
        first: Box<LoadError>,
    },
}

impl LoadError {
    pub fn invalid_url(input: &str, source: url::ParseError) -> Self {
        LoadError::InvalidUrl {
            input: input.to_string(),
            source,
        }
    }

    pub fn network(url: &str, err: reqwest::Error) -> Self {
        LoadError::Network {
            url: url.to_string(),
            code: NetworkCode::from_reqwest(&err),
            detail: err.to_string(),
        }
    }

    pub fn filesystem(path: &Path, source: io::Error) -> Self {
        LoadError::Filesystem {
            path: path.to_path_buf(),
            code: FsCode::from_io(&source),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            LoadError::Network { .. } => ErrorKind::NetworkFailure,
            LoadError::HttpStatus { .. } => ErrorKind::HttpStatusFailure,
            LoadError::Filesystem { .. } => ErrorKind::FilesystemFailure,
            LoadError::Timeout(_) => ErrorKind::Timeout,
            LoadError::AssetFailures { first, .. } => first.kind(),
        }
    }

    /// The HTTP status, network code or OS code carried by this error, if any.
    pub fn code(&self) -> Option<String> {
        match self {
            LoadError::Network { code, .. } => Some(code.as_str().to_string()),
            LoadError::HttpStatus { status, .. } => Some(status.to_string()),
            LoadError::Filesystem { code, .. } => Some(code.as_str().to_string()),
            LoadError::AssetFailures { first, .. } => first.code(),
            LoadError::InvalidUrl { .. } | LoadError::Timeout(_) => None,
        }
    }
}
