//! Refresh secret generation and digesting.
//!
//! The plaintext is 32 bytes from the OS RNG encoded as URL-safe base64
//! without padding (43 characters). Only its SHA-256 digest, as 64 lowercase
//! hex characters, is ever persisted.

use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use tokenhub_core::error::{AppError, ErrorKind};
use tokenhub_core::result::AppResult;

/// Number of random bytes in a refresh secret.
const SECRET_BYTES: usize = 32;

/// A freshly minted secret and its digest.
///
/// `Debug` prints only the digest.
#[derive(Clone)]
pub struct MintedSecret {
    /// The value handed to the client exactly once.
    pub plaintext: String,
    /// What the store keeps.
    pub digest: String,
}

impl std::fmt::Debug for MintedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintedSecret")
            .field("plaintext", &"<redacted>")
            .field("digest", &self.digest)
            .finish()
    }
}

/// Mint a new refresh secret.
pub fn mint() -> AppResult<MintedSecret> {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to generate refresh token", e)
        })?;
    let plaintext = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
    let digest = digest(&plaintext);
    Ok(MintedSecret { plaintext, digest })
}

/// Hex SHA-256 digest of a presented plaintext.
pub fn digest(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}
