// Public code generation for share links.
//
// Codes are short random base62 strings from the OS CSPRNG. Uniqueness is
// probabilistic (62^11 ~ 5.2e19 values); the unique index on
// share_links.public_code is the actual guarantee, and the share link
// service retries on insert collision.

use rand::rngs::OsRng;
use rand::Rng;

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of generated public codes
pub const PUBLIC_CODE_LENGTH: usize = 11;

/// Maximum insert attempts before surfacing a creation failure
pub const MAX_CODE_ATTEMPTS: usize = 3;

/// Generate a URL-safe public code.
pub fn generate_public_code() -> String {
    let mut rng = OsRng;
    (0..PUBLIC_CODE_LENGTH)
        .map(|_| BASE62_ALPHABET[rng.gen_range(0..BASE62_ALPHABET.len())] as char)
        .collect()
}
