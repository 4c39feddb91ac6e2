//! Image URL normalization.
//!
//! Upstream lookup responses and client payloads describe product images
//! inconsistently: a single URL string, a list of URLs, `null`, or nothing at
//! all. Every shape funnels through [`normalize_images`] so a stored product
//! always carries an ordered sequence.
//!
//! | Input                    | Result               |
//! |--------------------------|----------------------|
//! | absent / `null`          | `[]`                 |
//! | `"http://x/1.jpg"`       | `["http://x/1.jpg"]` |
//! | `["a", "b"]`             | `["a", "b"]`         |
//! | `""` or `["", "a"]`      | `[]` / `["a"]`       |

use serde::{Deserialize, Deserializer, Serialize};

/// Raw image description before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// No image information was supplied.
    #[default]
    Absent,
    /// A single URL.
    One(String),
    /// An ordered list of URLs.
    Many(Vec<String>),
}

/// Normalize any image description into an ordered list of URLs.
///
/// Order is preserved. Blank entries are dropped, so an empty scalar yields
/// an empty list rather than `[""]`.
#[must_use]
pub fn normalize_images(source: ImageSource) -> Vec<String> {
    let urls = match source {
        ImageSource::Absent => return Vec::new(),
        ImageSource::One(url) => vec![url],
        ImageSource::Many(urls) => urls,
    };

    urls.into_iter()
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Wire shape accepted for images: a string or a list that may contain nulls.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawImages {
    One(String),
    Many(Vec<Option<String>>),
}

impl From<Option<RawImages>> for ImageSource {
    fn from(raw: Option<RawImages>) -> Self {
        match raw {
            None => Self::Absent,
            Some(RawImages::One(url)) => Self::One(url),
            Some(RawImages::Many(urls)) => Self::Many(urls.into_iter().flatten().collect()),
        }
    }
}

/// Normalized, ordered product image URLs.
///
/// Serializes as a plain JSON array. Deserializes from a string, an array or
/// `null`, applying [`normalize_images`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Images(Vec<String>);

impl Images {
    /// Build from any image description.
    #[must_use]
    pub fn normalize(source: ImageSource) -> Self {
        Self(normalize_images(source))
    }

    /// Image URLs in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Images {
    fn from(urls: Vec<String>) -> Self {
        Self::normalize(ImageSource::Many(urls))
    }
}

impl<'de> Deserialize<'de> for Images {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawImages>::deserialize(deserializer)?;
        Ok(Self::normalize(raw.into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_empty() {
        assert!(normalize_images(ImageSource::Absent).is_empty());
    }

    #[test]
    fn test_scalar_becomes_single_element() {
        let urls = normalize_images(ImageSource::One("http://x/1.jpg".to_string()));
        assert_eq!(urls, vec!["http://x/1.jpg".to_string()]);
    }

    #[test]
    fn test_sequence_keeps_order() {
        let urls = normalize_images(ImageSource::Many(vec![
            "http://x/2.jpg".to_string(),
            "http://x/1.jpg".to_string(),
        ]));
        assert_eq!(urls, vec!["http://x/2.jpg", "http://x/1.jpg"]);
    }

    #[test]
    fn test_blank_scalar_is_empty() {
        assert!(normalize_images(ImageSource::One("  ".to_string())).is_empty());
    }

    #[test]
    fn test_deserialize_scalar_array_and_null() {
        let one: Images = serde_json::from_str(r#""http://x/1.jpg""#).unwrap();
        assert_eq!(one.as_slice(), ["http://x/1.jpg"]);

        let many: Images = serde_json::from_str(r#"["a", null, "", "b"]"#).unwrap();
        assert_eq!(many.as_slice(), ["a", "b"]);

        let none: Images = serde_json::from_str("null").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_serializes_as_array() {
        let images = Images::normalize(ImageSource::One("http://x/1.jpg".to_string()));
        assert_eq!(
            serde_json::to_string(&images).unwrap(),
            r#"["http://x/1.jpg"]"#
        );
    }

    #[test]
    fn test_rejects_non_string_scalar() {
        assert!(serde_json::from_str::<Images>("42").is_err());
    }
}
