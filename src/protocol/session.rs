//! Per-connection protocol session.
//!
//! A [`ConnectionSession`] owns one accepted socket and drives the two
//! sub-protocols over it in order: salted challenge-response authentication,
//! then the vector-batch exchange. It is generic over the stream type so
//! tests can drive it over in-memory duplex pipes.
//!
//! State machine:
//!
//! ```text
//! Init -> AwaitProof -> Authenticated -> ReadingBatch -> Done
//!   \___________\____________\_______________\--> Failed
//! ```
//!
//! Every read and write is bounded by the configured timeout, in both
//! phases. Any framing violation, timeout, or authentication failure is
//! terminal for the connection; there is no retry and no recovery point. The
//! socket is shut down on every exit path.

use crate::config::LimitsConfig;
use crate::directory::ClientDirectory;
use crate::error::{Result, ServerError};
use crate::protocol::auth::{verify_proof, SaltToken};
use crate::protocol::batch::saturating_sum;
use crate::protocol::wire;
use crate::utils::logging::{EventSink, Severity};
use crate::utils::timeout::with_timeout;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Where a session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the client identifier frame.
    Init,
    /// Salt sent, waiting for the proof.
    AwaitProof,
    /// Proof accepted, waiting for the batch header.
    Authenticated,
    /// Streaming vectors and results.
    ReadingBatch,
    /// Batch completed, connection closed.
    Done,
    /// Terminated by any error; connection closed.
    Failed,
}

/// One client session over one socket.
pub struct ConnectionSession<S> {
    stream: S,
    directory: Arc<ClientDirectory>,
    sink: Arc<dyn EventSink>,
    limits: LimitsConfig,
    state: SessionState,
    client_id: Option<String>,
}

impl<S> ConnectionSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an accepted stream. The directory and sink are shared with all
    /// other sessions; everything else is per-connection.
    pub fn new(
        stream: S,
        directory: Arc<ClientDirectory>,
        sink: Arc<dyn EventSink>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            stream,
            directory,
            sink,
            limits,
            state: SessionState::Init,
            client_id: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The identifier the client presented, once read.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Drive the session to completion.
    ///
    /// Runs authentication, then the batch exchange. On any error the
    /// session moves to [`SessionState::Failed`] and the error is reported
    /// to the event sink; either way the stream is shut down before
    /// returning.
    pub async fn run(&mut self) -> Result<()> {
        let outcome = self.drive().await;

        // Release the socket on every exit path, including early failure.
        let _ = self.stream.shutdown().await;

        match &outcome {
            Ok(()) => {
                self.state = SessionState::Done;
                debug!(client = self.client_id.as_deref(), "Session completed");
            }
            Err(e) => {
                self.state = SessionState::Failed;
                warn!(client = self.client_id.as_deref(), error = %e, "Session failed");
                self.sink.log_event(
                    Severity::Warning,
                    "Session failed",
                    &[
                        (
                            "client",
                            self.client_id.clone().unwrap_or_else(|| "-".to_string()),
                        ),
                        ("error", e.to_string()),
                    ],
                );
            }
        }

        outcome
    }

    async fn drive(&mut self) -> Result<()> {
        self.authenticate().await?;
        self.process_batch().await?;
        Ok(())
    }

    /// Authentication phase: identifier, salt challenge, proof check.
    ///
    /// Unknown identifier, wrong proof length, and proof mismatch all emit
    /// the same `ERR` token and the same [`ServerError::AuthenticationFailed`],
    /// so a probing client cannot tell which identifiers exist.
    async fn authenticate(&mut self) -> Result<()> {
        let timeout = self.limits.read_timeout();

        let client_id = with_timeout(
            timeout,
            wire::read_client_id(&mut self.stream, self.limits.max_client_id_len),
        )
        .await?;
        debug!(client = %client_id, "Received client identifier");

        let directory = Arc::clone(&self.directory);
        let secret = directory.secret_for(&client_id);
        self.client_id = Some(client_id.clone());

        let Some(secret) = secret else {
            // Same rejection token as a wrong proof; the cause is only
            // visible in the log.
            with_timeout(timeout, wire::write_token(&mut self.stream, wire::TOKEN_ERR)).await?;
            self.sink.log_event(
                Severity::Warning,
                "Unknown client identifier",
                &[("client", client_id)],
            );
            return Err(ServerError::AuthenticationFailed);
        };

        self.state = SessionState::AwaitProof;
        let salt = SaltToken::generate();
        with_timeout(timeout, wire::write_token(&mut self.stream, salt.as_bytes())).await?;
        debug!(salt = %salt.as_str(), "Salt challenge sent");

        let proof = with_timeout(timeout, wire::read_proof(&mut self.stream)).await?;

        if verify_proof(secret, &salt, &proof) {
            with_timeout(timeout, wire::write_token(&mut self.stream, wire::TOKEN_OK)).await?;
            self.state = SessionState::Authenticated;
            debug!(client = %client_id, "Authentication succeeded");
            Ok(())
        } else {
            with_timeout(timeout, wire::write_token(&mut self.stream, wire::TOKEN_ERR)).await?;
            self.sink.log_event(
                Severity::Warning,
                "Proof mismatch",
                &[("client", client_id)],
            );
            Err(ServerError::AuthenticationFailed)
        }
    }

    /// Batch phase: stream one result per vector.
    ///
    /// Vectors are read and answered one at a time, so per-session memory is
    /// bounded by one vector and the client gets incremental feedback.
    async fn process_batch(&mut self) -> Result<()> {
        let timeout = self.limits.read_timeout();

        let num_vectors = with_timeout(timeout, wire::read_u32(&mut self.stream)).await?;
        if num_vectors > self.limits.max_vectors {
            return Err(ServerError::OversizedFrame(
                num_vectors as usize,
                self.limits.max_vectors as usize,
            ));
        }

        self.state = SessionState::ReadingBatch;
        debug!(vectors = num_vectors, "Batch header received");

        for index in 0..num_vectors {
            let len = with_timeout(timeout, wire::read_u32(&mut self.stream)).await?;
            if len > self.limits.max_vector_len {
                return Err(ServerError::OversizedFrame(
                    len as usize,
                    self.limits.max_vector_len as usize,
                ));
            }

            let elements =
                with_timeout(timeout, wire::read_elements(&mut self.stream, len)).await?;
            let sum = saturating_sum(&elements);

            with_timeout(timeout, wire::write_result(&mut self.stream, sum)).await?;
            debug!(vector = index + 1, length = len, sum, "Vector processed");
            self.sink.log_event(
                Severity::Info,
                "Vector processed",
                &[
                    ("vector", (index + 1).to_string()),
                    ("sum", sum.to_string()),
                ],
            );
        }

        Ok(())
    }
}
