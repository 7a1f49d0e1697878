mod common;

use common::{binary_ok, json_response, Reply, TestEnv};

use filecrypt_client::classify::{
    FALLBACK_FILENAME, MSG_GENERIC_ERROR, MSG_TRANSPORT_FAILURE, MSG_UNRECOGNIZED_FORMAT,
};
use filecrypt_client::dispatch::{MSG_MISSING_CREDENTIALS, MSG_MISSING_FILE};
use filecrypt_client::input::SelectedFile;
use filecrypt_client::transport::RawResponse;
use filecrypt_client::{DispatchPhase, OperationKind, StatusMessage};

// ─── Preconditions ───────────────────────────────────────

#[tokio::test]
async fn test_missing_credentials_never_dispatch() {
    let cases: [(&str, &str); 3] = [("", ""), ("alice", ""), ("", "secret")];

    for kind in OperationKind::ALL {
        for (identity, keyword) in cases {
            let mut env = TestEnv::empty();
            env.controller.set_identity(identity);
            env.controller.set_keyword(keyword);
            env.controller.set_file(SelectedFile::new("a.txt", b"x".to_vec()));

            let report = env.controller.dispatch(kind).await;

            assert_eq!(env.transport.call_count(), 0);
            assert!(!report.request_sent);
            assert_eq!(report.phase, DispatchPhase::Rejected);
            assert_eq!(report.status, StatusMessage::error(MSG_MISSING_CREDENTIALS));
            assert_eq!(env.controller.status(), &report.status);
        }
    }
}

#[tokio::test]
async fn test_missing_file_never_dispatches() {
    for kind in OperationKind::ALL {
        let mut env = TestEnv::empty();
        env.controller.set_identity("alice");
        env.controller.set_keyword("secret");

        let report = env.controller.dispatch(kind).await;

        assert_eq!(env.transport.call_count(), 0);
        assert_eq!(report.phase, DispatchPhase::Rejected);
        assert_eq!(report.status, StatusMessage::error(MSG_MISSING_FILE));
    }
}

#[tokio::test]
async fn test_set_file_announces_selection() {
    let mut env = TestEnv::empty();
    env.controller
        .set_file(SelectedFile::new("holiday.jpg", b"jpeg".to_vec()));
    assert_eq!(
        env.controller.status(),
        &StatusMessage::info("File selected: holiday.jpg")
    );
}

// ─── Success path ────────────────────────────────────────

#[tokio::test]
async fn test_encrypt_success_installs_artifact() {
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("report.enc", b"ciphertext"));

    let report = env.controller.dispatch(OperationKind::Encrypt).await;

    assert_eq!(report.phase, DispatchPhase::Success);
    assert_eq!(report.status, StatusMessage::success("File encrypted successfully"));
    let artifact = report.artifact.unwrap();
    assert_eq!(artifact.filename, "report.enc");
    assert_eq!(artifact.size, 10);
    assert_eq!(env.controller.artifact(), Some(&artifact));
    assert_eq!(env.controller.downloads().read_active().unwrap(), b"ciphertext");
    assert_eq!(env.store.live_count(), 1);
    assert!(!env.controller.is_busy());

    let calls = env.transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, OperationKind::Encrypt);
    assert_eq!(calls[0].file_name, "report");
    assert_eq!(calls[0].file_data, b"quarterly numbers");
    assert_eq!(calls[0].username, "alice");
    assert_eq!(calls[0].keyword, "correct horse");
}

#[tokio::test]
async fn test_missing_disposition_uses_fallback_name() {
    let mut env = TestEnv::ready();
    env.transport
        .push_response(RawResponse::new(200, b"plain".to_vec()));

    let report = env.controller.dispatch(OperationKind::Decrypt).await;

    assert_eq!(report.status, StatusMessage::success("File decrypted successfully"));
    assert_eq!(report.artifact.unwrap().filename, FALLBACK_FILENAME);
}

#[tokio::test]
async fn test_second_artifact_releases_first() {
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("one.enc", b"1"));
    env.transport.push_response(binary_ok("two.enc", b"2"));

    let first = env.controller.dispatch(OperationKind::Encrypt).await.artifact.unwrap();
    let second = env.controller.dispatch(OperationKind::Encrypt).await.artifact.unwrap();

    assert!(!env.store.is_live(&first.handle));
    assert!(env.store.is_live(&second.handle));
    assert_eq!(env.store.live_count(), 1);
    assert_eq!(env.store.created_count(), 2);
    assert_eq!(env.store.released_count(), 1);
}

#[tokio::test]
async fn test_verify_never_produces_artifact() {
    let responses = [
        json_response(200, r#"{"message":"File integrity verified"}"#),
        binary_ok("sneaky.bin", b"bytes"),
        RawResponse::new(200, Vec::new()),
    ];

    for response in responses {
        let mut env = TestEnv::ready();
        env.transport.push_response(response);

        let report = env.controller.dispatch(OperationKind::Verify).await;

        assert_eq!(report.status, StatusMessage::success("File verified successfully"));
        assert!(report.artifact.is_none());
        assert!(env.controller.artifact().is_none());
        assert_eq!(env.store.created_count(), 0);
    }
}

#[tokio::test]
async fn test_verify_reports_server_verdict() {
    let mut env = TestEnv::ready();
    env.transport
        .push_response(json_response(200, r#"{"message":"File integrity check failed"}"#));

    let report = env.controller.dispatch(OperationKind::Verify).await;

    assert!(report.status.is_success());
    assert_eq!(
        report.server_message.as_deref(),
        Some("File integrity check failed")
    );
}

#[tokio::test]
async fn test_inputs_survive_success_for_retry() {
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("a.enc", b"a"));
    env.transport.push_response(json_response(200, r#"{"message":"ok"}"#));

    env.controller.dispatch(OperationKind::Encrypt).await;
    let report = env.controller.dispatch(OperationKind::Verify).await;

    assert!(report.request_sent);
    assert_eq!(env.transport.call_count(), 2);
    assert_eq!(env.controller.input().credentials().identity, "alice");
    assert!(env.controller.input().file().is_some());
}

// ─── Failure paths ───────────────────────────────────────

#[tokio::test]
async fn test_json_failure_reports_detail() {
    let mut env = TestEnv::ready();
    env.transport
        .push_response(json_response(500, r#"{"detail":"bad keyword"}"#));

    let report = env.controller.dispatch(OperationKind::Decrypt).await;

    assert_eq!(report.phase, DispatchPhase::Error);
    assert_eq!(report.status, StatusMessage::error("bad keyword"));
    assert!(report.artifact.is_none());
}

#[tokio::test]
async fn test_detail_at_200_is_error() {
    let mut env = TestEnv::ready();
    env.transport
        .push_response(json_response(200, r#"{"detail":"Hash file not found"}"#));

    let report = env.controller.dispatch(OperationKind::Verify).await;

    assert_eq!(report.phase, DispatchPhase::Error);
    assert_eq!(report.status, StatusMessage::error("Hash file not found"));
}

#[tokio::test]
async fn test_created_status_without_result_is_generic_error() {
    let mut env = TestEnv::ready();
    env.transport.push_response(
        RawResponse::new(201, b"bin".to_vec()).with_content_type("application/octet-stream"),
    );

    let report = env.controller.dispatch(OperationKind::Encrypt).await;

    assert_eq!(report.phase, DispatchPhase::Error);
    assert_eq!(report.status, StatusMessage::error(MSG_GENERIC_ERROR));
    assert!(report.artifact.is_none());
    assert_eq!(env.store.created_count(), 0);
}

#[tokio::test]
async fn test_plain_text_failure_is_unrecognized() {
    let mut env = TestEnv::ready();
    env.transport.push_response(
        RawResponse::new(502, br#"{"detail":"not read"}"#.to_vec()).with_content_type("text/plain"),
    );

    let report = env.controller.dispatch(OperationKind::Encrypt).await;

    assert_eq!(report.status, StatusMessage::error(MSG_UNRECOGNIZED_FORMAT));
}

#[tokio::test]
async fn test_no_response_is_transport_failure() {
    let mut env = TestEnv::ready();
    env.transport.push(Reply::NoResponse);

    let report = env.controller.dispatch(OperationKind::Encrypt).await;

    assert!(report.request_sent);
    assert_eq!(report.phase, DispatchPhase::Error);
    assert_eq!(report.status, StatusMessage::error(MSG_TRANSPORT_FAILURE));
}

#[tokio::test]
async fn test_failure_leaves_prior_artifact_and_inputs() {
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("keep.enc", b"keep"));
    env.transport
        .push_response(json_response(500, r#"{"detail":"Decryption failed"}"#));
    env.transport.push(Reply::NoResponse);

    let kept = env.controller.dispatch(OperationKind::Encrypt).await.artifact.unwrap();
    env.controller.dispatch(OperationKind::Encrypt).await;
    env.controller.dispatch(OperationKind::Encrypt).await;

    assert_eq!(env.controller.artifact(), Some(&kept));
    assert!(env.store.is_live(&kept.handle));
    assert_eq!(env.store.live_count(), 1);
    assert_eq!(env.controller.input().credentials().keyword.expose(), "correct horse");
    assert_eq!(env.controller.input().file().unwrap().name, "report");
}

// ─── Handle lifetime ─────────────────────────────────────

#[tokio::test]
async fn test_switching_operation_releases_once() {
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("x.enc", b"x"));
    env.controller.dispatch(OperationKind::Encrypt).await;

    env.controller.select_operation(OperationKind::Decrypt);
    env.controller.select_operation(OperationKind::Verify);

    assert_eq!(env.controller.active_operation(), OperationKind::Verify);
    assert!(env.controller.artifact().is_none());
    assert_eq!(env.store.live_count(), 0);
    assert_eq!(env.store.released_count(), 1);
}

#[tokio::test]
async fn test_close_releases_once() {
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("x.enc", b"x"));
    env.controller.dispatch(OperationKind::Encrypt).await;

    let TestEnv {
        store, controller, ..
    } = env;
    controller.close();

    assert_eq!(store.live_count(), 0);
    assert_eq!(store.released_count(), 1);
}

#[tokio::test]
async fn test_drop_releases_once() {
    let store;
    {
        let mut env = TestEnv::ready();
        env.transport.push_response(binary_ok("x.enc", b"x"));
        env.controller.dispatch(OperationKind::Encrypt).await;
        store = env.store.clone();
        assert_eq!(store.live_count(), 1);
    }
    assert_eq!(store.live_count(), 0);
    assert_eq!(store.released_count(), 1);
}

#[tokio::test]
async fn test_save_artifact_to_directory() {
    let out = tempfile::tempdir().unwrap();
    let mut env = TestEnv::ready();
    env.transport.push_response(binary_ok("report.enc", b"ciphertext"));
    env.controller.dispatch(OperationKind::Encrypt).await;

    let path = env.controller.save_artifact(out.path()).await.unwrap();

    assert_eq!(path, out.path().join("report.enc"));
    assert_eq!(std::fs::read(path).unwrap(), b"ciphertext");
}
