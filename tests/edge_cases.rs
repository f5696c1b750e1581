//! Boundary-condition tests for frame limits and malformed input.
//!
//! Sessions run over in-memory duplex pipes so each case can observe the
//! exact terminal state and error.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use vecsum::config::LimitsConfig;
use vecsum::directory::ClientDirectory;
use vecsum::protocol::auth::{derive_proof, SaltToken};
use vecsum::utils::TracingSink;
use vecsum::{ConnectionSession, ServerError, SessionState};

fn spawn_session(
    limits: LimitsConfig,
) -> (
    DuplexStream,
    tokio::task::JoinHandle<(SessionState, Result<(), ServerError>)>,
) {
    let directory = Arc::new(ClientDirectory::from_entries([("alice", &b"s3cret"[..])]));
    let (client, server) = tokio::io::duplex(4096);
    let handle = tokio::spawn(async move {
        let mut session = ConnectionSession::new(server, directory, Arc::new(TracingSink), limits);
        let outcome = session.run().await;
        (session.state(), outcome)
    });
    (client, handle)
}

async fn authenticate(client: &mut DuplexStream) {
    client.write_all(&5u32.to_le_bytes()).await.unwrap();
    client.write_all(b"alice").await.unwrap();

    let mut salt = [0u8; 16];
    client.read_exact(&mut salt).await.unwrap();
    let token = SaltToken::from_value(
        u64::from_str_radix(std::str::from_utf8(&salt).unwrap(), 16).unwrap(),
    );
    client
        .write_all(&derive_proof(&token, b"s3cret"))
        .await
        .unwrap();

    let mut ok = [0u8; 2];
    client.read_exact(&mut ok).await.unwrap();
    assert_eq!(&ok, b"OK");
}

#[tokio::test]
async fn oversized_client_id_frame_is_rejected() {
    let (mut client, handle) = spawn_session(LimitsConfig::default());

    client.write_all(&1024u32.to_le_bytes()).await.unwrap();
    // The session fails on the length prefix alone; no body needed.

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Failed);
    assert!(matches!(outcome, Err(ServerError::OversizedFrame(1024, 256))));
    drop(client);
}

#[tokio::test]
async fn non_utf8_client_id_is_a_framing_error() {
    let (mut client, handle) = spawn_session(LimitsConfig::default());

    client.write_all(&2u32.to_le_bytes()).await.unwrap();
    client.write_all(&[0xC3, 0x28]).await.unwrap();

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Failed);
    assert!(matches!(outcome, Err(ServerError::Framing(_))));
    drop(client);
}

#[tokio::test]
async fn disconnect_during_proof_terminates_session() {
    let (mut client, handle) = spawn_session(LimitsConfig::default());

    client.write_all(&5u32.to_le_bytes()).await.unwrap();
    client.write_all(b"alice").await.unwrap();
    let mut salt = [0u8; 16];
    client.read_exact(&mut salt).await.unwrap();
    // Hang up instead of sending the 32-byte proof.
    drop(client);

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Failed);
    assert!(matches!(outcome, Err(ServerError::ConnectionClosed)));
}

#[tokio::test]
async fn batch_count_above_limit_is_rejected() {
    let limits = LimitsConfig {
        max_vectors: 4,
        ..LimitsConfig::default()
    };
    let (mut client, handle) = spawn_session(limits);

    authenticate(&mut client).await;
    client.write_all(&5u32.to_le_bytes()).await.unwrap();

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Failed);
    assert!(matches!(outcome, Err(ServerError::OversizedFrame(5, 4))));
    drop(client);
}

#[tokio::test]
async fn vector_length_above_limit_is_rejected() {
    let limits = LimitsConfig {
        max_vector_len: 8,
        ..LimitsConfig::default()
    };
    let (mut client, handle) = spawn_session(limits);

    authenticate(&mut client).await;
    client.write_all(&1u32.to_le_bytes()).await.unwrap();
    client.write_all(&9u32.to_le_bytes()).await.unwrap();

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Failed);
    assert!(matches!(outcome, Err(ServerError::OversizedFrame(9, 8))));
    drop(client);
}

#[tokio::test]
async fn oversized_batch_sends_no_results() {
    let limits = LimitsConfig {
        max_vectors: 1,
        ..LimitsConfig::default()
    };
    let (mut client, handle) = spawn_session(limits);

    authenticate(&mut client).await;
    client.write_all(&2u32.to_le_bytes()).await.unwrap();

    // Connection closes without a single result byte.
    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());

    let (state, _) = handle.await.unwrap();
    assert_eq!(state, SessionState::Failed);
}

#[tokio::test]
async fn vector_at_exact_limit_is_accepted() {
    let limits = LimitsConfig {
        max_vector_len: 4,
        ..LimitsConfig::default()
    };
    let (mut client, handle) = spawn_session(limits);

    authenticate(&mut client).await;
    client.write_all(&1u32.to_le_bytes()).await.unwrap();
    client.write_all(&4u32.to_le_bytes()).await.unwrap();
    for v in [1i16, 2, 3, 4] {
        client.write_all(&v.to_le_bytes()).await.unwrap();
    }

    let mut result = [0u8; 2];
    client.read_exact(&mut result).await.unwrap();
    assert_eq!(i16::from_le_bytes(result), 10);

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Done);
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn trailing_garbage_after_batch_is_ignored() {
    // The session is done after the last vector; whatever else the client
    // sends never reaches a read.
    let (mut client, handle) = spawn_session(LimitsConfig::default());

    authenticate(&mut client).await;
    client.write_all(&1u32.to_le_bytes()).await.unwrap();
    client.write_all(&1u32.to_le_bytes()).await.unwrap();
    client.write_all(&5i16.to_le_bytes()).await.unwrap();
    let _ = client.write_all(b"garbage").await;

    let mut result = [0u8; 2];
    client.read_exact(&mut result).await.unwrap();
    assert_eq!(i16::from_le_bytes(result), 5);

    let (state, outcome) = handle.await.unwrap();
    assert_eq!(state, SessionState::Done);
    assert!(outcome.is_ok());
}
