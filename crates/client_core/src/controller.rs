use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{domain::SubmissionId, error::ApiErrorBody, protocol::UploadResult};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::{SettingsError, UploadError},
    settings::ClientSettings,
    transport::{HttpUploadTransport, SelectedFile, UploadTransport},
    view::{render_upload_result, DashboardView},
    ClientEvent, UserAlert, EVENT_CHANNEL_CAPACITY,
};

/// `Idle -> Submitting -> {Rendered | Failed} -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Submitting,
    Rendered,
    Failed,
}

struct ControllerState {
    phase: UploadPhase,
    in_flight: Option<SubmissionId>,
    view: Option<DashboardView>,
    last_result: Option<UploadResult>,
}

pub struct UploadController {
    transport: Arc<dyn UploadTransport>,
    base_url: Url,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ClientEvent>,
}

impl UploadController {
    pub fn new(settings: &ClientSettings) -> Result<Arc<Self>, SettingsError> {
        let transport = HttpUploadTransport::new(settings.upload_url()?);
        Ok(Self::with_transport(
            settings.base_url()?,
            Arc::new(transport),
        ))
    }

    pub fn with_transport(base_url: Url, transport: Arc<dyn UploadTransport>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            transport,
            base_url,
            inner: Mutex::new(ControllerState {
                phase: UploadPhase::Idle,
                in_flight: None,
                view: None,
                last_result: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn phase(&self) -> UploadPhase {
        self.state().phase
    }

    /// The last successfully rendered view. Failures never replace it.
    pub fn current_view(&self) -> Option<DashboardView> {
        self.state().view.clone()
    }

    pub fn last_result(&self) -> Option<UploadResult> {
        self.state().last_result.clone()
    }

    /// Runs one upload. `None` means the user submitted without choosing a
    /// file; that fails before any request is made.
    ///
    /// Every failure is also published as a `ClientEvent::Alert` before this
    /// returns, and the controller is back in `Idle` either way. Dropping the
    /// returned future abandons the request and also returns to `Idle`.
    pub async fn submit(&self, file: Option<SelectedFile>) -> Result<DashboardView, UploadError> {
        let Some(file) = file else {
            return Err(self.reject(UploadError::NoFileSelected));
        };

        let claimed = {
            let mut state = self.state();
            match state.in_flight {
                Some(in_flight) => Err(in_flight),
                None => {
                    let submission_id = SubmissionId::new();
                    state.in_flight = Some(submission_id);
                    state.phase = UploadPhase::Submitting;
                    Ok(submission_id)
                }
            }
        };
        let submission_id = match claimed {
            Ok(submission_id) => submission_id,
            Err(in_flight) => {
                warn!(%in_flight, "rejecting upload while another is in flight");
                return Err(self.reject(UploadError::SubmissionInFlight));
            }
        };
        let _release = InFlightRelease {
            controller: self,
            submission_id,
        };
        self.publish_phase(Some(submission_id), UploadPhase::Submitting);
        info!(
            %submission_id,
            file_name = %file.file_name,
            size_bytes = file.bytes.len(),
            "submitting image"
        );

        let outcome = self.perform(submission_id, file).await;

        let mut state = self.state();
        match outcome {
            Ok((result, view)) => {
                state.phase = UploadPhase::Rendered;
                state.view = Some(view.clone());
                state.last_result = Some(result);
                drop(state);
                self.publish_phase(Some(submission_id), UploadPhase::Rendered);
                let _ = self.events.send(ClientEvent::ResultsRendered {
                    submission_id,
                    view: Box::new(view.clone()),
                });
                info!(%submission_id, "upload rendered");
                Ok(view)
            }
            Err(err) => {
                state.phase = UploadPhase::Failed;
                drop(state);
                self.publish_phase(Some(submission_id), UploadPhase::Failed);
                Err(self.reject(err))
            }
        }
    }

    async fn perform(
        &self,
        submission_id: SubmissionId,
        file: SelectedFile,
    ) -> Result<(UploadResult, DashboardView), UploadError> {
        let response = self.transport.post_image(file).await.map_err(|err| {
            error!(%submission_id, error = %format!("{err:#}"), "upload request failed");
            UploadError::Transport(format!("{err:#}"))
        })?;

        if !response.is_success() {
            let detail = ApiErrorBody::parse_detail(&response.body);
            warn!(
                %submission_id,
                status = response.status,
                detail = detail.as_deref().unwrap_or(""),
                "upload rejected by server"
            );
            return Err(UploadError::RequestFailed {
                status: response.status,
                detail,
            });
        }

        let raw: serde_json::Value = serde_json::from_str(&response.body).map_err(|err| {
            error!(%submission_id, %err, "upload response is not json");
            UploadError::Transport(format!("invalid upload response: {err}"))
        })?;
        let result: UploadResult = serde_json::from_value(raw.clone()).map_err(|err| {
            error!(%submission_id, %err, "upload response has unexpected shape");
            UploadError::Transport(format!("invalid upload response: {err}"))
        })?;

        let view = render_upload_result(&result, &raw, &self.base_url);
        Ok((result, view))
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reject(&self, err: UploadError) -> UploadError {
        let _ = self.events.send(ClientEvent::Alert(UserAlert::from(&err)));
        err
    }

    fn publish_phase(&self, submission_id: Option<SubmissionId>, phase: UploadPhase) {
        let _ = self.events.send(ClientEvent::UploadPhaseChanged {
            submission_id,
            phase,
        });
    }
}

/// Clears the in-flight claim when a submission ends, including when the
/// `submit` future is dropped before the request completes.
struct InFlightRelease<'a> {
    controller: &'a UploadController,
    submission_id: SubmissionId,
}

impl Drop for InFlightRelease<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.state();
        if state.phase == UploadPhase::Submitting {
            debug!(submission_id = %self.submission_id, "upload abandoned before completion");
        }
        state.phase = UploadPhase::Idle;
        state.in_flight = None;
        drop(state);
        self.controller
            .publish_phase(Some(self.submission_id), UploadPhase::Idle);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
