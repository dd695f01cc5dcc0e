//! Identity assignment for resources the caller left unnamed.

use uuid::Uuid;

pub const DEFAULT_IDENTITY_PREFIX: &str = "EKS-";
pub const DEFAULT_SUFFIX_LEN: usize = 8;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// Largest multiple of 36 that fits in a byte; bytes at or above it are rejected so the
// modulo below stays uniform.
const ACCEPT_BELOW: u8 = 252;

/// Returns `candidate` when it is present and non-empty, otherwise a fresh
/// `EKS-XXXXXXXX` identity.
pub fn generate_identity(candidate: Option<&str>) -> String {
    generate_identity_with(candidate, DEFAULT_IDENTITY_PREFIX, DEFAULT_SUFFIX_LEN)
}

/// Like [`generate_identity`] with an explicit prefix and suffix length.
pub fn generate_identity_with(candidate: Option<&str>, prefix: &str, suffix_len: usize) -> String {
    if let Some(existing) = candidate.filter(|c| !c.is_empty()) {
        return existing.to_string();
    }
    let mut identity = String::with_capacity(prefix.len() + suffix_len);
    identity.push_str(prefix);
    identity.extend(random_symbols().take(suffix_len));
    identity
}

/// Endless stream of uniformly drawn alphabet symbols.
///
/// v4 UUIDs come from the OS generator; bytes 6 and 8 carry the version and variant bits
/// and are skipped.
fn random_symbols() -> impl Iterator<Item = char> {
    std::iter::repeat_with(|| *Uuid::new_v4().as_bytes())
        .flat_map(|bytes| {
            bytes
                .into_iter()
                .enumerate()
                .filter(|(index, _)| *index != 6 && *index != 8)
                .map(|(_, byte)| byte)
        })
        .filter(|byte| *byte < ACCEPT_BELOW)
        .map(|byte| ALPHABET[usize::from(byte % 36)] as char)
}
