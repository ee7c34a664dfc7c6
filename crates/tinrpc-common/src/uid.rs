//! Transaction-id generation.
//!
//! Every wire request carries a random hexadecimal transaction id used for
//! request tracing. The generator is pluggable per configuration; the
//! default produces lowercase hex of the requested length.

use rand::Rng;
use std::sync::Arc;

/// Default transaction-id length.
pub const DEFAULT_UID_LENGTH: usize = 40;

/// A zero-argument-style generator: given a length, produce an id string.
pub type UidGenerator = Arc<dyn Fn(usize) -> String + Send + Sync>;

const HEX_CHARS: &[u8] = b"0123456789abcdef";

/// Generates a random lowercase-hex string of `length` characters.
pub fn generate_uid(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| HEX_CHARS[rng.gen_range(0..HEX_CHARS.len())] as char)
        .collect()
}

/// The default generator, wrapped for storage in a configuration.
pub fn default_uid_generator() -> UidGenerator {
    Arc::new(generate_uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_length() {
        assert_eq!(generate_uid(40).len(), 40);
        assert_eq!(generate_uid(8).len(), 8);
        assert_eq!(generate_uid(0).len(), 0);
    }

    #[test]
    fn test_output_is_lowercase_hex() {
        let uid = generate_uid(64);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_successive_uids_differ() {
        // 40 hex chars of collision space; two draws matching means the RNG
        // is broken.
        assert_ne!(generate_uid(DEFAULT_UID_LENGTH), generate_uid(DEFAULT_UID_LENGTH));
    }
}
