//! HTML text helpers.

/// Escape text for use in element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode each segment of a relative URL, keeping the `/` separators.
///
/// `posts/First Steps.html` → `posts/First%20Steps.html`
pub fn encode_href(url: &str) -> String {
    url.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Content between the first `<body>` and the first `</body>`.
///
/// Returns the whole input when either marker is missing or the markers are
/// out of order.
pub fn extract_body(html: &str) -> &str {
    const OPEN: &str = "<body>";
    const CLOSE: &str = "</body>";

    match (html.find(OPEN), html.find(CLOSE)) {
        (Some(start), Some(end)) if end >= start + OPEN.len() => &html[start + OPEN.len()..end],
        _ => html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape(r#"<a href="x">'q'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;q&#39;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_encode_href() {
        assert_eq!(encode_href("posts/First Steps.html"), "posts/First%20Steps.html");
        assert_eq!(encode_href("pages/about.html"), "pages/about.html");
        assert_eq!(encode_href("posts/café.html"), "posts/caf%C3%A9.html");
    }

    #[test]
    fn test_extract_body() {
        let html = "<html><head><title>x</title></head><body>\n<h1>Hi</h1>\n</body></html>";
        assert_eq!(extract_body(html), "\n<h1>Hi</h1>\n");
    }

    #[test]
    fn test_extract_body_without_markers() {
        assert_eq!(extract_body("<h1>Fragment</h1>"), "<h1>Fragment</h1>");
        assert_eq!(extract_body("<body>unterminated"), "<body>unterminated");
        // body tags with attributes are not recognised
        let attr = r#"<body class="x">text</body>"#;
        assert_eq!(extract_body(attr), attr);
    }

    #[test]
    fn test_extract_body_markers_out_of_order() {
        let html = "</body>oops<body>";
        assert_eq!(extract_body(html), html);
    }
}
