//! Cell markers and support classification

use serde::{Deserialize, Serialize};

use crate::constants::table;

/// Support level shown by a single comparison cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Supported,
    Upcoming,
    Partial,
    Missing,
    Unsupported,
    Blank,
    /// Free text such as "Coming Soon"
    Other,
}

/// Marker vocabulary used inside comparison cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub supported: String,
    pub unsupported: String,
    pub partial: String,
    pub upcoming_word: String,
    pub missing_word: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            supported: table::SUPPORTED_MARKER.to_string(),
            unsupported: table::UNSUPPORTED_MARKER.to_string(),
            partial: table::PARTIAL_MARKER.to_string(),
            upcoming_word: table::UPCOMING_WORD.to_string(),
            missing_word: table::MISSING_WORD.to_string(),
        }
    }
}

impl Markers {
    pub fn is_supported(&self, cell: &str) -> bool {
        cell.contains(self.supported.as_str())
    }

    pub fn is_unsupported(&self, cell: &str) -> bool {
        cell.contains(self.unsupported.as_str())
    }

    /// Non-blank and free of the unsupported marker
    ///
    /// Stricter than `classify`: a mixed cell such as "✅ ❌" classifies as
    /// supported but carries no data.
    pub fn has_data(&self, cell: &str) -> bool {
        !cell.trim().is_empty() && !self.is_unsupported(cell)
    }

    pub fn classify(&self, cell: &str) -> SupportLevel {
        if cell.trim().is_empty() {
            SupportLevel::Blank
        } else if self.is_supported(cell) {
            if cell.contains(self.upcoming_word.as_str()) {
                SupportLevel::Upcoming
            } else {
                SupportLevel::Supported
            }
        } else if self.is_unsupported(cell) {
            if cell.contains(self.missing_word.as_str()) {
                SupportLevel::Missing
            } else {
                SupportLevel::Unsupported
            }
        } else if cell.contains(self.partial.as_str()) {
            SupportLevel::Partial
        } else {
            SupportLevel::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let markers = Markers::default();
        assert_eq!(markers.classify("✅"), SupportLevel::Supported);
        assert_eq!(markers.classify("✅ Upcoming"), SupportLevel::Upcoming);
        assert_eq!(markers.classify("🟡 Via addon"), SupportLevel::Partial);
        assert_eq!(markers.classify("❌ Missing"), SupportLevel::Missing);
        assert_eq!(markers.classify("❌"), SupportLevel::Unsupported);
        assert_eq!(markers.classify("   "), SupportLevel::Blank);
        assert_eq!(markers.classify("Coming Soon"), SupportLevel::Other);
    }

    #[test]
    fn test_has_data() {
        let markers = Markers::default();
        assert!(markers.has_data("✅"));
        assert!(markers.has_data("🟡 Via addon"));
        assert!(markers.has_data("Coming Soon"));
        assert!(!markers.has_data("❌ Missing"));
        assert!(!markers.has_data("❌"));
        assert!(!markers.has_data(" \t"));
        assert!(!markers.has_data("✅ ❌"));
        assert_eq!(markers.classify("✅ ❌"), SupportLevel::Supported);
    }
}
