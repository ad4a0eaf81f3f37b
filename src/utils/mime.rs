//! MIME type detection for served assets.
//!
//! The table is deliberately small: it covers what a bundled single-page
//! site emits. Anything else is served as an opaque byte stream.

use std::path::Path;

/// MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html";
    pub const PLAIN: &str = "text/plain";
    pub const CSS: &str = "text/css";
    pub const JAVASCRIPT: &str = "application/javascript";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";

    // Documents / archives
    pub const PDF: &str = "application/pdf";
    pub const ZIP: &str = "application/zip";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    // Fonts
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
    pub const EOT: &str = "application/vnd.ms-fontobject";
}

/// Guess MIME type from a file path.
pub fn from_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => from_extension(&format!(".{}", ext.to_ascii_lowercase())),
        None => types::OCTET_STREAM,
    }
}

/// Look up a lowercased extension, including the leading dot.
pub fn from_extension(ext: &str) -> &'static str {
    match ext {
        ".html" => types::HTML,
        ".js" => types::JAVASCRIPT,
        ".css" => types::CSS,
        ".json" => types::JSON,
        ".png" => types::PNG,
        ".jpg" | ".jpeg" => types::JPEG,
        ".gif" => types::GIF,
        ".svg" => types::SVG,
        ".ico" => types::ICO,
        ".woff" => types::WOFF,
        ".woff2" => types::WOFF2,
        ".ttf" => types::TTF,
        ".eot" => types::EOT,
        ".otf" => types::OTF,
        ".webp" => types::WEBP,
        ".pdf" => types::PDF,
        ".txt" => types::PLAIN,
        ".xml" => types::XML,
        ".zip" => types::ZIP,
        _ => types::OCTET_STREAM,
    }
}
