//! Signer identities and signer-set normalization.
//!
//! # Security
//! - Secret seeds are never logged or serialized
//! - `Debug` output shows only the public key

use ed25519_dalek::{Signer as _, SigningKey};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::ledger::types::{LedgerError, LedgerResult, Pubkey, Signature};

/// Length of a signer's secret seed.
pub const SEED_LEN: usize = 32;

/// Anything that exposes a fixed-length secret seed.
pub trait Seeded {
    /// The 32-byte secret seed identifying this signer.
    fn seed(&self) -> [u8; SEED_LEN];
}

impl Seeded for [u8; SEED_LEN] {
    fn seed(&self) -> [u8; SEED_LEN] {
        *self
    }
}

/// An ed25519 signing identity derived from a secret seed.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Derive a keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Derive a keypair from secret key bytes.
    ///
    /// Accepts a bare 32-byte seed or a 64-byte secret (seed followed by public key);
    /// only the first 32 bytes are used.
    pub fn from_secret_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        if bytes.len() != SEED_LEN && bytes.len() != 2 * SEED_LEN {
            return Err(LedgerError::Signing(format!(
                "secret key must be {} or {} bytes, got {}",
                SEED_LEN,
                2 * SEED_LEN,
                bytes.len()
            )));
        }
        let mut seed = [0u8; SEED_LEN];
        seed.copy_from_slice(&bytes[..SEED_LEN]);
        Ok(Self::from_seed(&seed))
    }

    /// Decode a base58 secret key string.
    pub fn from_base58_string(encoded: &str) -> LedgerResult<Self> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| LedgerError::Signing(format!("Invalid base58 secret key: {}", e)))?;
        Self::from_secret_bytes(&bytes)
    }

    /// Public key of this signer.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::from(self.signing_key.sign(message))
    }
}

impl Seeded for Keypair {
    fn seed(&self) -> [u8; SEED_LEN] {
        self.signing_key.to_bytes()
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.seed() == other.seed()
    }
}

impl Eq for Keypair {}

impl Hash for Keypair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seed().hash(state);
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish()
    }
}

/// Collapse a sequence of signers into one keypair per distinct seed.
///
/// The returned order is unspecified.
pub fn normalize_signers<'a, S, I>(signers: I) -> Vec<Keypair>
where
    S: Seeded + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let seeds: HashSet<[u8; SEED_LEN]> = signers.into_iter().map(|s| s.seed()).collect();
    seeds.iter().map(Keypair::from_seed).collect()
}
