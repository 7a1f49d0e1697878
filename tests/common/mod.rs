// tests/common/mod.rs

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use filecrypt_client::download::MemoryArtifactStore;
use filecrypt_client::error::TransportError;
use filecrypt_client::input::SelectedFile;
use filecrypt_client::transport::{FileTransport, OperationForm, RawResponse};
use filecrypt_client::{OperationController, OperationKind};

/// What the scripted transport answers with next.
pub enum Reply {
    Response(RawResponse),
    NoResponse,
}

/// One request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: OperationKind,
    pub file_name: String,
    pub file_data: Vec<u8>,
    pub username: String,
    pub keyword: String,
}

/// Transport that replays queued replies and records every call.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_response(&self, response: RawResponse) {
        self.push(Reply::Response(response));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FileTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(
        &self,
        kind: OperationKind,
        form: OperationForm<'_>,
    ) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            file_name: form.file.name.clone(),
            file_data: form.file.data.clone(),
            username: form.credentials.identity.clone(),
            keyword: form.credentials.keyword.expose().to_string(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply queued");

        match reply {
            Reply::Response(response) => Ok(response),
            Reply::NoResponse => Err(TransportError::Request("connection refused".into())),
        }
    }
}

pub type TestController = OperationController<ScriptedTransport, MemoryArtifactStore>;

pub struct TestEnv {
    pub transport: ScriptedTransport,
    pub store: MemoryArtifactStore,
    pub controller: TestController,
}

impl TestEnv {
    /// Controller with no inputs set.
    pub fn empty() -> Self {
        let transport = ScriptedTransport::new();
        let store = MemoryArtifactStore::new();
        let controller = OperationController::new(transport.clone(), store.clone());
        Self {
            transport,
            store,
            controller,
        }
    }

    /// Controller with credentials and a file selected.
    pub fn ready() -> Self {
        let mut env = Self::empty();
        env.controller.set_identity("alice");
        env.controller.set_keyword("correct horse");
        env.controller
            .set_file(SelectedFile::new("report", b"quarterly numbers".to_vec()));
        env
    }
}

pub fn binary_ok(filename: &str, body: &[u8]) -> RawResponse {
    RawResponse::new(200, body.to_vec())
        .with_content_type("application/octet-stream")
        .with_content_disposition(format!("attachment; filename=\"{filename}\""))
}

pub fn json_response(status: u16, body: &str) -> RawResponse {
    RawResponse::new(status, body.as_bytes().to_vec()).with_content_type("application/json")
}
