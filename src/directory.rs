//! # Client Directory
//!
//! Read-only credential store mapping client identifiers to shared secrets.
//!
//! The directory is loaded once at startup and shared by every session behind
//! an `Arc`; no locking is needed because nothing writes after load. The only
//! operation sessions use is [`ClientDirectory::secret_for`].
//!
//! ## Storage contract
//! The stored value is the client's plaintext secret. The per-session proof
//! is derived fresh from it as `SHA-256(salt || secret)`; the directory never
//! holds pre-hashed material.
//!
//! ## File format
//! One `client_id:secret` per line. Blank lines are skipped. A non-blank line
//! without a `:` separator aborts the load; a malformed credentials file is
//! a startup failure, not something to skip silently.

use crate::error::{constants, Result, ServerError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Immutable client-id to secret mapping.
pub struct ClientDirectory {
    clients: HashMap<String, Vec<u8>>,
}

/// Secrets stay out of debug output; only the client count is shown.
impl std::fmt::Debug for ClientDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientDirectory")
            .field("clients", &self.clients.len())
            .finish()
    }
}

impl ClientDirectory {
    /// Load the directory from a credentials file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path).map_err(|e| {
            ServerError::DirectoryError(format!(
                "{}: {}: {e}",
                constants::ERR_DIRECTORY_OPEN,
                path.as_ref().display()
            ))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse `id:secret` lines from any reader.
    pub fn from_reader<R: Read>(reader: BufReader<R>) -> Result<Self> {
        let mut clients = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                ServerError::DirectoryError(format!("Read failed at line {}: {e}", idx + 1))
            })?;
            if line.is_empty() {
                continue;
            }

            let (id, secret) = line.split_once(':').ok_or_else(|| {
                ServerError::DirectoryError(format!(
                    "{} at line {}",
                    constants::ERR_DIRECTORY_LINE,
                    idx + 1
                ))
            })?;

            clients.insert(id.to_string(), secret.as_bytes().to_vec());
        }

        Ok(Self { clients })
    }

    /// Build a directory from in-memory entries (tests, embedding).
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            clients: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up the shared secret for a client identifier.
    pub fn secret_for(&self, client_id: &str) -> Option<&[u8]> {
        self.clients.get(client_id).map(Vec::as_slice)
    }

    /// Number of known clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the directory holds no clients at all.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
