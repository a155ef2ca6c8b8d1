//! Screenshot filename correlation
//!
//! Extracted screenshots follow the `{Category}_image_{N}.{ext}` convention,
//! where the category is the worksheet name the image was anchored on. The
//! parser is deliberately forgiving: a filename that does not follow the
//! convention still yields a usable record with `Unknown` / `0` placeholders
//! instead of failing the batch.

use serde::{Deserialize, Serialize};

/// Category a filename falls into when it does not follow the convention
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Marker separating the category from the sequence number
const SEQUENCE_MARKER: &str = "_image_";

/// Parsed `{Category}_image_{N}.{ext}` filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageName {
    /// Worksheet name the screenshot belongs to, or `Unknown`
    pub category: String,
    /// 1-based sequence within the category, or 0 when unparseable
    pub sequence: usize,
}

impl ImageName {
    /// Parse a screenshot filename.
    ///
    /// The category is everything before the first `_image_`; the sequence
    /// is the run of digits that follows it, up to the extension dot. A
    /// filename without the marker maps to `Unknown` / 0, and a marker with
    /// no digits behind it keeps the category but reports sequence 0.
    #[must_use]
    pub fn parse(filename: &str) -> Self {
        let Some((category, rest)) = filename.split_once(SEQUENCE_MARKER) else {
            return Self {
                category: UNKNOWN_CATEGORY.to_string(),
                sequence: 0,
            };
        };

        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        Self {
            category: category.to_string(),
            sequence: digits.parse().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conventional_name() {
        let name = ImageName::parse("Registration.Login_image_3.png");
        assert_eq!(name.category, "Registration.Login");
        assert_eq!(name.sequence, 3);
    }

    #[test]
    fn test_parse_category_with_underscores() {
        // Split on the first marker only
        let name = ImageName::parse("My_Sheet_image_12.jpg");
        assert_eq!(name.category, "My_Sheet");
        assert_eq!(name.sequence, 12);
    }

    #[test]
    fn test_parse_without_marker() {
        let name = ImageName::parse("weird.png");
        assert_eq!(name.category, UNKNOWN_CATEGORY);
        assert_eq!(name.sequence, 0);
    }

    #[test]
    fn test_parse_non_numeric_sequence() {
        let name = ImageName::parse("Sheet_image_x.png");
        assert_eq!(name.category, "Sheet");
        assert_eq!(name.sequence, 0);
    }

}
