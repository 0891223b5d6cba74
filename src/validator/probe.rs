//! Accessibility probing of unstructured data URIs.
//!
//! The result is an advisory diagnostic string, never an error.

use std::fs::File;

use tracing::debug;

use crate::constants::access;
use crate::constants::targets::VALIDATOR;
use crate::types::Diagnostic;
use crate::utils::{file_uri_path, split_scheme};

/// Diagnose whether the data behind `uri` can be read.
///
/// - `file:` URIs: `OK`, `file missing`, `not a file`, or the OS error text.
/// - `http:`/`https:` URIs: reason phrase of a HEAD request.
/// - anything else: `Unknown URL scheme <scheme>`.
pub fn probe_uri(uri: &str) -> Diagnostic {
    let (scheme, _) = split_scheme(uri);
    let diagnostic = match scheme.as_str() {
        "file" => probe_file(uri),
        "http" | "https" => probe_http(uri),
        other => format!("Unknown URL scheme {other}"),
    };
    debug!(target: VALIDATOR, uri, diagnostic = diagnostic.as_str(), "probed data uri");
    diagnostic
}

fn probe_file(uri: &str) -> Diagnostic {
    let path = file_uri_path(uri);
    if !path.exists() {
        return access::FILE_MISSING.to_string();
    }
    if !path.is_file() {
        return access::NOT_A_FILE.to_string();
    }
    match File::open(&path) {
        Ok(_) => access::OK.to_string(),
        Err(err) => err.to_string(),
    }
}

#[cfg(feature = "http")]
fn probe_http(uri: &str) -> Diagnostic {
    use std::sync::OnceLock;

    static CLIENT: OnceLock<reqwest::blocking::Client> = OnceLock::new();
    head_reason(CLIENT.get_or_init(reqwest::blocking::Client::new), uri)
}

/// Reason phrase the server sent for a HEAD request, or the transport error.
#[cfg(feature = "http")]
fn head_reason(client: &reqwest::blocking::Client, uri: &str) -> Diagnostic {
    let response = match client.head(uri).send() {
        Ok(response) => response,
        Err(err) => return err.to_string(),
    };
    // hyper only keeps the phrase when it differs from the canonical one.
    if let Some(reason) = response.extensions().get::<hyper::ext::ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }
    let status = response.status();
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

#[cfg(not(feature = "http"))]
fn probe_http(_uri: &str) -> Diagnostic {
    access::HTTP_NOT_PROBED.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::file_url;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_uris_report_state() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("listing.txt");
        fs::write(&file, b"3 bed 2 bath").unwrap();

        assert_eq!(probe_uri(&file_url(&file)), "OK");
        assert_eq!(probe_uri(&file_url(&file)), "OK");
        assert_eq!(probe_uri(&file_url(temp.path())), "not a file");
        assert_eq!(
            probe_uri(&file_url(&temp.path().join("gone.txt"))),
            "file missing"
        );
    }

    #[cfg(feature = "http")]
    fn serve_once(response: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut buf).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            assert!(request.starts_with(b"HEAD /listing.jpg "));
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/listing.jpg")
    }

    #[cfg(feature = "http")]
    fn local_client() -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder().no_proxy().build().unwrap()
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_uris_record_the_sent_reason_phrase() {
        let client = local_client();
        let uri = serve_once("HTTP/1.1 404 Nothing Here\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        assert_eq!(head_reason(&client, &uri), "Nothing Here");

        let uri = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        assert_eq!(head_reason(&client, &uri), "OK");
    }

    #[cfg(feature = "http")]
    #[test]
    fn unreachable_http_hosts_record_the_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let diagnostic = head_reason(&local_client(), &format!("http://{addr}/gone.jpg"));
        assert!(!diagnostic.is_empty());
        assert_ne!(diagnostic, "OK");
    }

    #[test]
    fn unknown_schemes_are_named() {
        assert_eq!(probe_uri("ftp://example.com/a.png"), "Unknown URL scheme ftp");
        assert_eq!(probe_uri("/no/scheme.png"), "Unknown URL scheme ");
    }
}
