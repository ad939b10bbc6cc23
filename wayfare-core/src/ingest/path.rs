/// Result of normalizing a caller-supplied image path or URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedPath {
    /// Usable reference: a rooted site path or an absolute http(s) URL.
    Reference(String),
    /// The value names nothing (`/`, `null`, `undefined`).
    Placeholder,
}

const PLACEHOLDERS: [&str; 3] = ["/", "/null", "/undefined"];

/// Normalize a non-inline image value.
///
/// The query string is dropped. Absolute `http(s)` URLs are otherwise kept as
/// given; everything else is rooted with a leading `/`. Existence is not
/// checked.
pub fn normalize_path(raw: &str) -> NormalizedPath {
    let trimmed = raw.trim();
    let without_query = trimmed.split('?').next().unwrap_or_default();

    if is_absolute_url(without_query) {
        return NormalizedPath::Reference(without_query.to_string());
    }

    let rooted = if without_query.starts_with('/') {
        without_query.to_string()
    } else {
        format!("/{without_query}")
    };

    if PLACEHOLDERS.contains(&rooted.as_str()) {
        NormalizedPath::Placeholder
    } else {
        NormalizedPath::Reference(rooted)
    }
}

fn is_absolute_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(raw: &str) -> String {
        match normalize_path(raw) {
            NormalizedPath::Reference(path) => path,
            NormalizedPath::Placeholder => panic!("{raw} normalized to a placeholder"),
        }
    }

    #[test]
    fn rooted_paths_are_unchanged() {
        assert_eq!(reference("/images/bali/beach.jpg"), "/images/bali/beach.jpg");
    }

    #[test]
    fn relative_paths_gain_leading_slash() {
        assert_eq!(reference("img/a.jpg"), "/img/a.jpg");
    }

    #[test]
    fn query_strings_are_stripped() {
        assert_eq!(reference("/img/a.jpg?v=2"), "/img/a.jpg");
        assert_eq!(reference("img/a.jpg?v=2&w=10"), "/img/a.jpg");
    }

    #[test]
    fn placeholders_are_detected() {
        for raw in ["/", "null", "/null", "undefined", "/undefined", "?x=1"] {
            assert_eq!(normalize_path(raw), NormalizedPath::Placeholder, "{raw}");
        }
    }

    #[test]
    fn absolute_urls_keep_host_and_lose_query() {
        assert_eq!(
            reference("https://cdn.example.com/bali.jpg?w=800"),
            "https://cdn.example.com/bali.jpg"
        );
        assert_eq!(reference("HTTP://example.com/a.png"), "HTTP://example.com/a.png");
    }
}
