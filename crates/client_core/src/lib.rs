//! Client core for the vision dashboard: the upload workflow controller,
//! the pure view-model renderer, and the live feed listener.

use shared::domain::SubmissionId;

pub mod controller;
pub mod error;
pub mod feed;
pub mod settings;
pub mod transport;
pub mod view;

pub use controller::{UploadController, UploadPhase};
pub use error::{FeedError, SettingsError, UploadError, UploadErrorKind};
pub use feed::{FeedConnectionState, FeedEntry, LiveFeed, LiveFeedListener};
pub use settings::{load_settings, ClientSettings};
pub use transport::{HttpUploadTransport, SelectedFile, TransportResponse, UploadTransport};
pub use view::{DashboardView, GalleryView, ResultDetails, ResultRow, Visibility};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A blocking notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAlert {
    pub kind: UploadErrorKind,
    pub message: String,
}

impl From<&UploadError> for UserAlert {
    fn from(err: &UploadError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    UploadPhaseChanged {
        submission_id: Option<SubmissionId>,
        phase: UploadPhase,
    },
    ResultsRendered {
        submission_id: SubmissionId,
        view: Box<DashboardView>,
    },
    Alert(UserAlert),
    FeedEntryAdded(FeedEntry),
    FeedConnection(FeedConnectionState),
    Error(String),
}
