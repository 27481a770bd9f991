use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    NoFileSelected,
    RequestFailed,
    TransportError,
    SubmissionInFlight,
}

#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("upload rejected with HTTP status {status}")]
    RequestFailed {
        status: u16,
        /// Message from the backend's error body; logged, never shown to the user.
        detail: Option<String>,
    },
    #[error("upload transport error: {0}")]
    Transport(String),
    #[error("an upload is already in progress")]
    SubmissionInFlight,
}

impl UploadError {
    pub fn kind(&self) -> UploadErrorKind {
        match self {
            Self::NoFileSelected => UploadErrorKind::NoFileSelected,
            Self::RequestFailed { .. } => UploadErrorKind::RequestFailed,
            Self::Transport(_) => UploadErrorKind::TransportError,
            Self::SubmissionInFlight => UploadErrorKind::SubmissionInFlight,
        }
    }

    /// Fixed alert text for the user. Server details never leak into it.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            UploadErrorKind::NoFileSelected => "Please select an image first.",
            UploadErrorKind::RequestFailed => "Upload failed",
            UploadErrorKind::TransportError => "An error occurred",
            UploadErrorKind::SubmissionInFlight => "An upload is already in progress",
        }
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to connect live feed websocket {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid server url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server url must start with http:// or https://, got {0:?}")]
    UnsupportedScheme(String),
    #[error("failed to parse settings file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
