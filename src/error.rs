use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Environment variable '{key}' is required but not found"))]
    MissingEnvVar { key: String },

    #[snafu(display("Unsupported storage provider: {provider}"))]
    UnsupportedProvider { provider: String },

    #[snafu(display("{message}"))]
    InvalidQuery { message: String },

    #[snafu(display("Invalid file path: {path}"))]
    InvalidPath { path: String },

    #[snafu(display("Malformed upload: {message}"))]
    MalformedUpload { message: String },

    #[snafu(display("Malformed page token"))]
    MalformedPageToken,

    #[snafu(display("File not found: {path}"))]
    NotFound { path: String },

    #[snafu(display("Stored key '{key}' is not a valid file path"))]
    InvalidStoredKey { key: String },

    #[snafu(display("Failed to list files under '{prefix}': {source}"))]
    ListFailed { prefix: String, source: Box<Error> },

    #[snafu(display("Failed to upload '{path}': {source}"))]
    UploadFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to fetch '{path}': {source}"))]
    FetchFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to delete '{path}': {source}"))]
    DeleteFailed { path: String, source: Box<Error> },

    #[snafu(display("Storage backend unavailable: {source}"))]
    BackendUnavailable { source: opendal::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

/// Coarse classification of an [`Error`], used by the HTTP layer to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed or contradictory.
    Validation,
    /// The addressed key does not exist.
    NotFound,
    /// Anything else: the backend failed or returned something unusable.
    BackendUnavailable,
}

impl Error {
    /// Classify the root cause, looking through operation wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidQuery { .. }
            | Error::InvalidPath { .. }
            | Error::MalformedUpload { .. }
            | Error::MalformedPageToken => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::ListFailed { source, .. }
            | Error::UploadFailed { source, .. }
            | Error::FetchFailed { source, .. }
            | Error::DeleteFailed { source, .. } => source.kind(),
            Error::MissingEnvVar { .. }
            | Error::UnsupportedProvider { .. }
            | Error::InvalidStoredKey { .. }
            | Error::BackendUnavailable { .. }
            | Error::Io { .. } => ErrorKind::BackendUnavailable,
        }
    }
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::BackendUnavailable { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}
