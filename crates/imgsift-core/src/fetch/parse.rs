//! Pull the declared content-type out of collected response header lines.

/// Content-Type of the final response. Header blocks of earlier responses
/// (redirects, `100 Continue`) are discarded when a new status line starts.
pub(crate) fn content_type(lines: &[String]) -> Option<String> {
    let mut found = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            found = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                found = Some(value.trim().to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_content_type() {
        let l = lines(&["HTTP/1.1 200 OK", "Content-Length: 5", "content-type: image/png"]);
        assert_eq!(content_type(&l).as_deref(), Some("image/png"));
    }

    #[test]
    fn missing_content_type() {
        let l = lines(&["HTTP/1.1 200 OK", "Content-Length: 5"]);
        assert!(content_type(&l).is_none());
    }

    #[test]
    fn redirect_block_is_discarded() {
        let l = lines(&[
            "HTTP/1.1 302 Found",
            "Content-Type: text/html",
            "Location: /img/42.jpg",
            "",
            "HTTP/1.1 200 OK",
            "Content-Type: image/jpeg",
        ]);
        assert_eq!(content_type(&l).as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn redirect_to_response_without_type() {
        let l = lines(&[
            "HTTP/1.1 302 Found",
            "Content-Type: text/html",
            "",
            "HTTP/1.1 200 OK",
        ]);
        assert!(content_type(&l).is_none());
    }
}
