//! Page rendering
//!
//! Stateless HTML rendering functions: each page is produced from its inputs
//! alone, with no process-wide view state.

/// Shared page chrome and styling.
const PAGE_STYLE: &str = r#"
    body { background-color: #f9f7e9; font-family: sans-serif; margin: 0; }
    .title { text-align: center; color: #f4a300; font-size: 2.5em; margin-top: 1em; }
    .container { display: flex; justify-content: center; align-items: flex-start; flex-wrap: wrap; }
    .image-container, .text-container { flex: 1; max-width: 50%; margin: 1em; }
    .image-container img { display: block; margin: 0 auto; max-width: 100%; height: auto; }
    .data { font-size: 1.2em; color: #333; margin: 1em 0; white-space: pre-line; }
    .upload { text-align: center; margin-top: 2em; }
    .error { text-align: center; color: #b00020; font-size: 1.2em; margin-top: 2em; }
"#;

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>QR Code Decoder</title>\n<style>{PAGE_STYLE}</style>\n</head>\n\
         <body>\n<div class=\"title\">QR Code Decoder</div>\n{body}\n</body>\n</html>\n"
    )
}

/// The landing page with the upload form.
pub fn upload_page() -> String {
    page(
        "<div class=\"upload\">\n\
         <form action=\"/scan\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"image\" accept=\"image/jpeg,image/png\" required>\n\
         <button type=\"submit\">Decode</button>\n\
         </form>\n</div>",
    )
}

/// The result page: annotated image next to the decoded text block.
///
/// `image_base64` is a base64-encoded PNG; `text` holds one decoded payload
/// per line (may be empty when nothing was found).
pub fn result_page(image_base64: &str, text: &str) -> String {
    let text_block = if text.is_empty() {
        "<em>No QR codes found.</em>".to_string()
    } else {
        escape_html(text)
    };

    page(&format!(
        "<div class=\"container\">\n\
         <div class=\"image-container\">\
         <img src=\"data:image/png;base64,{image_base64}\" alt=\"Processed Image\">\
         </div>\n\
         <div class=\"text-container\"><div class=\"data\">{text_block}</div></div>\n\
         </div>\n\
         <div class=\"upload\"><a href=\"/\">Scan another image</a></div>"
    ))
}

/// An error page with a user-readable message.
pub fn error_page(message: &str) -> String {
    page(&format!(
        "<div class=\"error\">{}</div>\n\
         <div class=\"upload\"><a href=\"/\">Back</a></div>",
        escape_html(message)
    ))
}

/// Minimal HTML escaping for decoded payloads and error messages.
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
