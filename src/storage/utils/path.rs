// Path helper utilities shared across storage operations
use regex::Regex;
use std::sync::LazyLock;

use crate::storage::constants::MAX_PATH_LENGTH;

static VALID_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+(/[A-Za-z0-9_.-]+)*$").expect("path pattern is valid")
});

/// Check whether `path` is acceptable as a client-facing file path.
///
/// A valid path is 1 to 1024 bytes long and made of segments drawn from
/// `[A-Za-z0-9_.-]`, separated by single `/` characters.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.len() <= MAX_PATH_LENGTH && VALID_PATH.is_match(path)
}

/// Directory to hand to the backend lister so that every key starting with
/// `prefix` is reachable: everything up to and including the last `/`, or the
/// root when the prefix has no separator.
pub fn scan_root(prefix: &str) -> &str {
    match prefix.rfind('/') {
        Some(idx) => &prefix[..=idx],
        None => "/",
    }
}
