//! Attachment classification by file extension

/// Extensions the attachment listing marks as viewable in a browser
const VIEWABLE_EXTENSIONS: &[&str] = &["html", "htm", "xml", "txt", "pdf", "csv", "json"];

/// Extensions the view endpoint decodes to text before sending
const INLINE_TEXT_EXTENSIONS: &[&str] = &["html", "htm", "xml", "txt", "csv", "json"];

pub const OCTET_STREAM: &str = "application/octet-stream";

fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Media type for a filename; unknown extensions are `application/octet-stream`
pub fn content_type(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        Some("xls") | Some("xlsx") => "application/vnd.ms-excel",
        Some("doc") | Some("docx") => "application/msword",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        _ => OCTET_STREAM,
    }
}

pub fn is_viewable(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| VIEWABLE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_inline_text(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| INLINE_TEXT_EXTENSIONS.contains(&ext.as_str()))
}

/// Decode UTF-8, dropping invalid byte sequences instead of replacing them
pub fn decode_text_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
