//! Canonical album identifier derivation.

use sha2::{Digest, Sha256};

const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derives the canonical album identifier from its name and primary artist.
///
/// Equal (name, artist) pairs always produce the same identifier; that is
/// what makes duplicate entries collide and merge during migration. The hash
/// is SHA-256 truncated to 64 bits so identifiers are stable across runs,
/// platforms, and implementations, rendered as lowercase base-36 with no
/// sign character.
pub fn album_id(name: &str, artist: &str) -> String {
    let combined = format!("{}|{}", normalize(name), normalize(artist));
    let digest = Sha256::digest(combined.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    to_base36(u64::from_be_bytes(prefix))
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        // Keeps the identifier syntactically valid for the degenerate hash.
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}
