use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Unreserved characters allowed in a PKCE code verifier (RFC 7636).
pub const PKCE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub const CODE_VERIFIER_LENGTH: usize = 128;
pub const STATE_LENGTH: usize = 32;

/// Generates a uniformly distributed random string over [`PKCE_ALPHABET`].
///
/// Bytes at or above the largest multiple of the alphabet size below 256 are
/// rejected and redrawn, so every character is equally likely.
pub fn generate_random_string(length: usize) -> String {
    let alphabet_len = PKCE_ALPHABET.len();
    let limit = 256 - (256 % alphabet_len);
    let mut rng = rand::rng();
    let mut result = String::with_capacity(length);

    while result.len() < length {
        let value = rng.random::<u8>() as usize;
        if value >= limit {
            continue;
        }
        result.push(PKCE_ALPHABET[value % alphabet_len] as char);
    }

    result
}

pub fn generate_code_verifier() -> String {
    generate_random_string(CODE_VERIFIER_LENGTH)
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Anti-CSRF `state` value for the authorization request.
pub fn generate_state() -> String {
    generate_random_string(STATE_LENGTH)
}

/// Compares two strings without short-circuiting on the first difference.
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    let left_bytes = left.as_bytes();
    let right_bytes = right.as_bytes();
    let max_len = left_bytes.len().max(right_bytes.len());
    let mut diff = left_bytes.len() ^ right_bytes.len();

    for i in 0..max_len {
        let l = left_bytes.get(i).copied().unwrap_or(0);
        let r = right_bytes.get(i).copied().unwrap_or(0);
        diff |= (l ^ r) as usize;
    }

    diff == 0
}

const SENSITIVE_WORDS: [(&str, &str); 4] = [
    ("token", "auth"),
    ("key", "credential"),
    ("secret", "credential"),
    ("password", "credential"),
];

fn replace_ignore_ascii_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut result = String::with_capacity(haystack.len());
    let mut last = 0;

    for (start, _) in lower.match_indices(needle) {
        result.push_str(&haystack[last..start]);
        result.push_str(replacement);
        last = start + needle.len();
    }
    result.push_str(&haystack[last..]);
    result
}

/// Rewrites an error message for display to the end user.
///
/// Sensitive words are replaced case-insensitively, then every character
/// outside `[A-Za-z0-9 .,!?-]` is dropped. Only for user-facing text; logs
/// keep the raw message.
pub fn sanitize_error_message(error: &str) -> String {
    let replaced = SENSITIVE_WORDS
        .iter()
        .fold(error.to_string(), |acc, (word, replacement)| {
            replace_ignore_ascii_case(&acc, word, replacement)
        });

    replaced
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | ',' | '!' | '?' | '-'))
        .collect()
}
