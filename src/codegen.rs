use rand::Rng;

/// Length of a generated short code.
pub const GENERATED_CODE_LEN: usize = 6;

/// Bounds for caller-supplied custom codes.
pub const MIN_CODE_LEN: usize = 6;
pub const MAX_CODE_LEN: usize = 8;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random 6-character alphanumeric short code.
///
/// `thread_rng` is a ChaCha-based CSPRNG reseeded from the OS, so codes are
/// not predictable. Uniqueness is not checked here; the registry enforces it.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns `true` if `code` matches `^[A-Za-z0-9]{6,8}$`.
pub fn is_valid_code(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
