use base64::{Engine as _, engine::general_purpose::STANDARD};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Marker every inline payload starts with.
pub const INLINE_PREFIX: &str = "data:image";

// `(?s)` lets line-wrapped base64 payloads match.
static INLINE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:image/([A-Za-z0-9.+-]+);base64,(.+)$")
        .expect("inline image pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InlineImageError {
    #[error("value is not a data:image/<subtype>;base64 payload")]
    NotInline,

    #[error("base64 payload could not be decoded: {0}")]
    InvalidBase64(String),
}

/// A decoded `data:image/<subtype>;base64,<payload>` value.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    subtype: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("subtype", &self.subtype)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl InlineImage {
    pub fn looks_inline(raw: &str) -> bool {
        raw.starts_with(INLINE_PREFIX)
    }

    pub fn parse(raw: &str) -> Result<Self, InlineImageError> {
        let captures = INLINE_IMAGE
            .captures(raw)
            .ok_or(InlineImageError::NotInline)?;
        let subtype = captures[1].to_ascii_lowercase();

        let payload: String = captures[2]
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| InlineImageError::InvalidBase64(e.to_string()))?;

        Ok(Self { subtype, bytes })
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn content_type(&self) -> String {
        format!("image/{}", self.subtype)
    }

    /// File extension used in generated names.
    pub fn extension(&self) -> &str {
        match self.subtype.as_str() {
            "jpeg" | "pjpeg" => "jpg",
            "svg+xml" => "svg",
            "x-icon" | "vnd.microsoft.icon" => "ico",
            other => other,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_payload() {
        let raw = format!("data:image/png;base64,{}", STANDARD.encode([1u8, 2, 3, 4]));
        let image = InlineImage::parse(&raw).unwrap();
        assert_eq!(image.subtype(), "png");
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(image.extension(), "png");
        assert_eq!(image.into_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn tolerates_wrapped_base64() {
        let encoded = STANDARD.encode(vec![7u8; 120]);
        let (head, tail) = encoded.split_at(40);
        let raw = format!("data:image/jpeg;base64,{head}\n{tail}\r\n");
        let image = InlineImage::parse(&raw).unwrap();
        assert_eq!(image.len(), 120);
        assert_eq!(image.extension(), "jpg");
    }

    #[test]
    fn maps_svg_extension() {
        let raw = format!("data:image/svg+xml;base64,{}", STANDARD.encode(b"<svg/>"));
        let image = InlineImage::parse(&raw).unwrap();
        assert_eq!(image.content_type(), "image/svg+xml");
        assert_eq!(image.extension(), "svg");
    }

    #[test]
    fn rejects_missing_base64_marker() {
        assert_eq!(
            InlineImage::parse("data:image/png,abcd"),
            Err(InlineImageError::NotInline)
        );
        assert_eq!(
            InlineImage::parse("data:image/png;base64,"),
            Err(InlineImageError::NotInline)
        );
    }

    #[test]
    fn rejects_bad_alphabet() {
        let err = InlineImage::parse("data:image/png;base64,@@@@").unwrap_err();
        assert!(matches!(err, InlineImageError::InvalidBase64(_)));
    }

    #[test]
    fn reports_decoded_length() {
        let raw = format!("data:image/gif;base64,{}", STANDARD.encode(vec![0u8; 2047]));
        let image = InlineImage::parse(&raw).unwrap();
        assert_eq!(image.len(), 2047);
        assert!(!image.is_empty());
    }
}
