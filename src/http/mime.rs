//! MIME type detection module
//!
//! Maps a storage key's extension to the Content-Type served for it.

/// Content-Type used when the extension is absent or unrecognized
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type based on a lowercase file extension
///
/// # Examples
/// ```
/// use spa_origin::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html");
/// assert_eq!(get_content_type(Some("woff2")), "font/woff2");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Documents and scripts
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("eot") => "application/vnd.ms-fontobject",

        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Extract the lowercase extension of a key's last path segment
///
/// Dots in directory names are ignored, so `assets.v2/readme` has no extension.
pub fn extension_of(key: &str) -> Option<String> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content-Type for a storage key
pub fn content_type_for_key(key: &str) -> &'static str {
    get_content_type(extension_of(key).as_deref())
}
