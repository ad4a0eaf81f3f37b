//! HTTP response handlers.

use super::path::Target;
use crate::{log, utils::mime};
use anyhow::{Result, anyhow};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, StatusCode};

/// Headers attached to every served file. The preview server is never a CDN,
/// so browsers must always refetch.
const FILE_HEADERS: [(&str, &str); 6] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Cache-Control", "no-cache, no-store, must-revalidate"),
    ("Pragma", "no-cache"),
    ("Expires", "0"),
];

/// A fully decided response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Attach CORS and cache-busting headers.
    pub file_headers: bool,
}

impl Reply {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: mime::types::PLAIN,
            body: body.as_bytes().to_vec(),
            file_headers: false,
        }
    }

    fn file(path: &Path, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: mime::from_path(path),
            body,
            file_headers: true,
        }
    }
}

/// Decide the response for a resolved target.
pub fn reply_for(target: &Target) -> Reply {
    match target {
        Target::File(path) => read_file(path),
        Target::Forbidden => Reply::text(403, "Forbidden"),
        Target::NotFound => Reply::text(404, "Not Found"),
    }
}

fn read_file(path: &Path) -> Reply {
    match fs::read(path) {
        Ok(body) => Reply::file(path, body),
        Err(e) => {
            log!("error"; "error serving file {}: {}", path.display(), e);
            internal_error()
        }
    }
}

/// Generic 500 reply; details stay in the server log.
pub fn internal_error() -> Reply {
    Reply::text(500, "Internal Server Error")
}

/// Write a reply to the client.
///
/// tiny_http drops the body for HEAD requests on its own.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(make_header("Content-Type", reply.content_type)?);

    if reply.file_headers {
        for (key, value) in FILE_HEADERS {
            response = response.with_header(make_header(key, value)?);
        }
    }

    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reply_for_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("style.css");
        fs::write(&path, "body{}").unwrap();

        let reply = reply_for(&Target::File(path));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "text/css");
        assert_eq!(reply.body, b"body{}");
        assert!(reply.file_headers);
    }

    #[test]
    fn test_reply_for_errors() {
        let reply = reply_for(&Target::Forbidden);
        assert_eq!((reply.status, reply.body.as_slice()), (403, &b"Forbidden"[..]));
        assert!(!reply.file_headers);

        let reply = reply_for(&Target::NotFound);
        assert_eq!((reply.status, reply.body.as_slice()), (404, &b"Not Found"[..]));
    }

    #[test]
    fn test_unreadable_file_is_500() {
        let dir = TempDir::new().unwrap();
        // Resolved earlier, then removed before the read
        let reply = reply_for(&Target::File(dir.path().join("gone.html")));
        assert_eq!(reply, internal_error());
        assert_eq!(reply.content_type, "text/plain");
    }

    #[test]
    fn test_file_headers_are_valid() {
        for (key, value) in FILE_HEADERS {
            assert!(make_header(key, value).is_ok());
        }
    }
}
