/// Operation controller.
///
/// Drives one file operation at a time through its lifecycle:
/// 1. Validate credentials and file selection
/// 2. Send the multipart request through the transport
/// 3. Classify the response (artifact, server detail, or generic error)
/// 4. Install any artifact with the download manager
/// 5. Publish a single terminal status
///
/// All user-visible state lives in [`ControllerState`] and changes only
/// through [`ControllerState::apply`].
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::classify::{
    classify_response, classify_transport_failure, Classification, MSG_TRANSPORT_FAILURE,
};
use crate::dispatch::{self, MSG_PROCESSING};
use crate::download::{ArtifactStore, DownloadArtifact, DownloadManager};
use crate::error::Result;
use crate::input::{InputCollector, SelectedFile};
use crate::operation::OperationKind;
use crate::sensitive::SensitiveString;
use crate::status::{DispatchPhase, StatusMessage};
use crate::transport::FileTransport;

/// Something that happened to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    FileSelected { name: String },
    OperationSelected(OperationKind),
    DispatchRequested(OperationKind),
    Rejected(String),
    RequestSent,
    ResponseReceived { ok: bool },
    TransportFailed,
    Classified(StatusMessage),
}

/// User-visible controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    pub status: StatusMessage,
    pub phase: DispatchPhase,
    /// Operation currently chosen by the user.
    pub active_operation: OperationKind,
    /// Operation of the latest dispatch, if any.
    pub last_dispatch: Option<OperationKind>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            status: StatusMessage::None,
            phase: DispatchPhase::Idle,
            active_operation: OperationKind::Encrypt,
            last_dispatch: None,
        }
    }
}

impl ControllerState {
    /// The single entry point for state transitions.
    pub fn apply(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::FileSelected { name } => {
                self.status = StatusMessage::info(dispatch::file_selected_message(&name));
            }
            ControllerEvent::OperationSelected(kind) => {
                self.active_operation = kind;
            }
            ControllerEvent::DispatchRequested(kind) => {
                self.phase = DispatchPhase::Validating;
                self.last_dispatch = Some(kind);
            }
            ControllerEvent::Rejected(message) => {
                self.phase = DispatchPhase::Rejected;
                self.status = StatusMessage::Error(message);
            }
            ControllerEvent::RequestSent => {
                self.phase = DispatchPhase::Dispatching;
                self.status = StatusMessage::info(MSG_PROCESSING);
            }
            ControllerEvent::ResponseReceived { ok: true } => {
                self.phase = DispatchPhase::ClassifyingSuccess;
            }
            ControllerEvent::ResponseReceived { ok: false } | ControllerEvent::TransportFailed => {
                self.phase = DispatchPhase::ClassifyingFailure;
            }
            ControllerEvent::Classified(status) => {
                self.phase = if status.is_success() {
                    DispatchPhase::Success
                } else {
                    DispatchPhase::Error
                };
                self.status = status;
            }
        }
    }

    /// A request is out and its outcome is not yet known.
    pub fn is_busy(&self) -> bool {
        self.phase.is_in_flight()
    }
}

/// Summary of one finished dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub operation: OperationKind,
    /// Terminal phase: `Success`, `Error` or `Rejected`.
    pub phase: DispatchPhase,
    pub status: StatusMessage,
    /// Artifact installed by this dispatch.
    pub artifact: Option<DownloadArtifact>,
    /// Verification verdict text from the server.
    pub server_message: Option<String>,
    /// Whether a request was sent at all.
    pub request_sent: bool,
}

/// Owns the inputs, status and download artifact of one session.
pub struct OperationController<T: FileTransport, S: ArtifactStore> {
    transport: T,
    input: InputCollector,
    state: ControllerState,
    downloads: DownloadManager<S>,
}

impl<T: FileTransport, S: ArtifactStore> OperationController<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        Self {
            transport,
            input: InputCollector::new(),
            state: ControllerState::default(),
            downloads: DownloadManager::new(store),
        }
    }

    // ─── Inputs ──────────────────────────────────────────────

    /// Replace the selected file and announce it.
    pub fn set_file(&mut self, file: SelectedFile) {
        let name = file.name.clone();
        self.input.set_file(file);
        self.state.apply(ControllerEvent::FileSelected { name });
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.input.set_identity(identity);
    }

    pub fn set_keyword(&mut self, keyword: impl Into<SensitiveString>) {
        self.input.set_keyword(keyword);
    }

    /// Switch the chosen operation. Any current artifact is released.
    pub fn select_operation(&mut self, kind: OperationKind) {
        self.state.apply(ControllerEvent::OperationSelected(kind));
        self.downloads.clear();
    }

    // ─── Dispatch ────────────────────────────────────────────

    /// Run one operation to a terminal status.
    ///
    /// Never fails: every outcome, including a missing response, ends up
    /// as the returned report's status. Inputs and any earlier artifact are
    /// left as they were when the operation fails.
    pub async fn dispatch(&mut self, kind: OperationKind) -> DispatchReport {
        self.state.apply(ControllerEvent::DispatchRequested(kind));

        let form = match dispatch::prepare(&self.input) {
            Ok(form) => form,
            Err(rejection) => {
                warn!(operation = %kind, reason = %rejection, "Dispatch rejected");
                self.state
                    .apply(ControllerEvent::Rejected(rejection.message().to_string()));
                return self.report(kind, None, None, false);
            }
        };

        info!(
            operation = %kind,
            file_name = %form.file.name,
            size = form.file.size(),
            transport = self.transport.name(),
            "Dispatching file operation"
        );
        self.state.apply(ControllerEvent::RequestSent);

        let classification = match self.transport.send(kind, form).await {
            Ok(response) => {
                info!(operation = %kind, status = response.status, "Response received");
                self.state.apply(ControllerEvent::ResponseReceived {
                    ok: response.is_ok(),
                });
                classify_response(kind, response)
            }
            Err(e) => {
                warn!(operation = %kind, error = %e, "No response from file API");
                self.state.apply(ControllerEvent::TransportFailed);
                classify_transport_failure(&e)
            }
        };

        self.finish(kind, classification)
    }

    fn finish(&mut self, kind: OperationKind, classification: Classification) -> DispatchReport {
        let Classification {
            mut status,
            artifact,
            server_message,
        } = classification;

        let mut installed = None;
        if let Some(pending) = artifact {
            match self.downloads.install_pending(&pending) {
                Ok(artifact) => installed = Some(artifact.clone()),
                Err(e) => {
                    error!(operation = %kind, error = %e, "Failed to hold download artifact");
                    status = StatusMessage::error(MSG_TRANSPORT_FAILURE);
                }
            }
        }

        match &status {
            StatusMessage::Error(text) => {
                warn!(operation = %kind, message = %text, "File operation failed")
            }
            _ => info!(
                operation = %kind,
                artifact = installed.as_ref().map(|a| a.filename.as_str()),
                "File operation complete"
            ),
        }

        self.state.apply(ControllerEvent::Classified(status));
        self.report(kind, installed, server_message, true)
    }

    fn report(
        &self,
        operation: OperationKind,
        artifact: Option<DownloadArtifact>,
        server_message: Option<String>,
        request_sent: bool,
    ) -> DispatchReport {
        DispatchReport {
            operation,
            phase: self.state.phase,
            status: self.state.status.clone(),
            artifact,
            server_message,
            request_sent,
        }
    }

    // ─── Downloads ───────────────────────────────────────────

    /// Save the current artifact into `dir` under its suggested name.
    pub async fn save_artifact(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.downloads.save_to(dir).await
    }

    /// End the session, releasing any live artifact handle.
    pub fn close(mut self) {
        self.downloads.clear();
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn status(&self) -> &StatusMessage {
        &self.state.status
    }

    pub fn phase(&self) -> DispatchPhase {
        self.state.phase
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn active_operation(&self) -> OperationKind {
        self.state.active_operation
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        self.downloads.active()
    }

    pub fn downloads(&self) -> &DownloadManager<S> {
        &self.downloads
    }

    pub fn input(&self) -> &InputCollector {
        &self.input
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
