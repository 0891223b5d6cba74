//! URI helpers shared by validators and configuration generators.

use std::path::{Path, PathBuf};

/// Split a URI into its lower-cased scheme and the remainder after `:`.
///
/// Returns an empty scheme when the text has no valid scheme prefix.
pub fn split_scheme(uri: &str) -> (String, &str) {
    if let Some((scheme, rest)) = uri.split_once(':') {
        let mut chars = scheme.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            return (scheme.to_ascii_lowercase(), rest);
        }
    }
    (String::new(), uri)
}

/// Local path named by a `file:` URI.
///
/// Any authority component is skipped without checking it; the path is
/// percent-decoded and query/fragment are dropped.
pub fn file_uri_path(uri: &str) -> PathBuf {
    let (_, rest) = split_scheme(uri);
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map_or("", |idx| &authority_and_path[idx..]),
        None => rest,
    };
    let path = path.split(['?', '#']).next().unwrap_or("");
    PathBuf::from(percent_decode(path))
}

/// `file://` URL for a local path.
///
/// Relative paths are made absolute against the working directory. Bytes
/// outside the unreserved set and `/` are percent-encoded, so
/// [`file_uri_path`] returns the same path.
pub fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let encoded = percent_encode_path(absolute.as_os_str().as_encoded_bytes());
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

fn percent_encode_path(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len());
    for &byte in bytes {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'/' | b'-' | b'.' | b'_' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Decode `%XX` escapes; malformed escapes are kept verbatim.
pub fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' && idx + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[idx + 1..idx + 3]).ok();
            if let Some(value) = hex.and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                decoded.push(value);
                idx += 3;
                continue;
            }
        }
        decoded.push(bytes[idx]);
        idx += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
