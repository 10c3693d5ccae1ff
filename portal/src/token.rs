//! Capability token minting.
//!
//! Tokens bind a tokenized link to exactly one (request, role) pair. They
//! are drawn from a 256-bit space; possession of the link is the only
//! credential the portal requires.

use base64::Engine;
use rand::RngCore;

/// Mint a fresh capability token.
///
/// Returns a 256-bit random value encoded as base64url without padding
/// (43 characters).
#[must_use]
pub fn mint() -> String {
    let mut rng = rand::thread_rng();
    let mut random_bytes = [0u8; 32];
    rng.fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Compare a presented token against a stored one in constant time.
///
/// Resolution itself is an indexed map lookup; this is the comparison to use
/// wherever a stored token value is checked against user input, so the check
/// does not leak a prefix-length timing signal.
#[must_use]
pub fn matches(presented: &str, stored: &str) -> bool {
    constant_time_eq::constant_time_eq(presented.as_bytes(), stored.as_bytes())
}
