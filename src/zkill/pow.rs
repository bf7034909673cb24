//! Proof-of-work token generation for the zKill proxy.
//!
//! The proxy admits a request when the SHA-256 digest of
//! `"{id}|{nonce}|{ts}"` starts with `difficulty / 4` zero hex
//! characters. The nonce search is bounded; exhausting it means the
//! difficulty or inputs are wrong, not that more compute would help.

use sha2::{Digest, Sha256};

use crate::error::zkill::ZkillError;

/// Upper bound on the nonce search.
pub const MAX_ITERATIONS: u64 = 1_000_000;

/// A proof-of-work token: the inputs plus the qualifying digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowToken {
    pub nonce: u64,
    pub ts: i64,
    pub hash: String,
}

/// Finds the smallest nonce whose digest satisfies `difficulty` leading
/// zero bits (in whole hex characters) for the given id and timestamp.
pub fn solve(id: i64, ts: i64, difficulty: u32) -> Result<PowToken, ZkillError> {
    let zero_chars = (difficulty / 4) as usize;

    for nonce in 0..MAX_ITERATIONS {
        let digest = Sha256::digest(format!("{id}|{nonce}|{ts}").as_bytes());
        let hash = hex::encode(digest);

        if hash.as_bytes().iter().take(zero_chars).all(|&b| b == b'0') {
            return Ok(PowToken { nonce, ts, hash });
        }
    }

    Err(ZkillError::PowExhausted(MAX_ITERATIONS))
}
