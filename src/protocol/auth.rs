//! Salted challenge-response authentication.
//!
//! The server proves nothing; the client proves knowledge of its shared
//! secret by hashing it together with a per-session salt:
//!
//! ```text
//! proof = SHA-256(salt_ascii || secret)
//! ```
//!
//! The salt is a fresh 64-bit value from the OS CSPRNG, rendered as a
//! 16-character zero-padded uppercase hex string. The ASCII rendering, not
//! the raw value, is what gets hashed and what travels on the wire. Proof
//! verification uses a constant-time comparison so a probing client cannot
//! learn prefix matches from response timing.

use crate::config::{PROOF_LEN, SALT_LEN};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// A per-session salt, held in its 16-byte ASCII wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltToken([u8; SALT_LEN]);

impl SaltToken {
    /// Draw a fresh salt from the OS CSPRNG.
    ///
    /// Each invocation is independent; no session ever reuses another
    /// session's salt.
    pub fn generate() -> Self {
        let value = OsRng.next_u64();
        Self::from_value(value)
    }

    /// Render a specific 64-bit value as a salt (test fixtures).
    pub fn from_value(value: u64) -> Self {
        let rendered = format!("{value:016X}");
        let mut bytes = [0u8; SALT_LEN];
        bytes.copy_from_slice(rendered.as_bytes());
        Self(bytes)
    }

    /// The 16 ASCII bytes sent to the client.
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// The salt as a hex string.
    pub fn as_str(&self) -> &str {
        // Always ASCII by construction.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

/// Compute the proof expected from a client holding `secret`.
pub fn derive_proof(salt: &SaltToken, secret: &[u8]) -> [u8; PROOF_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret);
    hasher.finalize().into()
}

/// Check a submitted proof against the expected one in constant time.
///
/// A proof of the wrong length fails outright; it cannot be the digest.
pub fn verify_proof(secret: &[u8], salt: &SaltToken, proof: &[u8]) -> bool {
    if proof.len() != PROOF_LEN {
        return false;
    }
    let expected = derive_proof(salt, secret);
    expected.ct_eq(proof).into()
}
