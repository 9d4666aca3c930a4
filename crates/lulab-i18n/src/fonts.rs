use crate::Language;
use serde::{Deserialize, Serialize};

/// Sans-serif families known to ship Cyrillic glyphs, most preferred first.
pub const CYRILLIC_FONT_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Arial",
    "Liberation Sans",
    "Noto Sans",
    "Noto Sans Display",
    "Roboto",
];

/// Font configuration that plotting code should apply for the active language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSettings {
    /// Generic family name, e.g. `sans-serif`.
    pub family: String,
    /// Preferred concrete families, tried in order. Empty means renderer defaults.
    pub sans_serif: Vec<String>,
    /// Whether the renderer may draw U+2212 for negative numbers.
    pub unicode_minus: bool,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            sans_serif: Vec::new(),
            unicode_minus: true,
        }
    }
}

impl FontSettings {
    /// Settings for Cyrillic text. `preferred` defaults to [`CYRILLIC_FONT_FAMILIES`].
    /// Negative numbers are drawn with an ASCII hyphen-minus.
    pub fn cyrillic(preferred: Option<&[&str]>) -> Self {
        let families = preferred.unwrap_or(CYRILLIC_FONT_FAMILIES);
        Self {
            family: "sans-serif".to_string(),
            sans_serif: families.iter().map(|f| f.to_string()).collect(),
            unicode_minus: false,
        }
    }

    pub fn for_language(language: Language) -> Self {
        if language.requires_font_support() {
            Self::cyrillic(None)
        } else {
            Self::default()
        }
    }
}

/// Caller-supplied side effect run when a language needing special fonts is selected.
///
/// Failures are reported but never abort the language switch; renderers fall
/// back to their own defaults when a family is missing.
pub trait FontHook: std::fmt::Debug {
    fn configure(&self, settings: &FontSettings) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyrillic_defaults() {
        let settings = FontSettings::cyrillic(None);
        assert_eq!(settings.sans_serif.first().map(String::as_str), Some("DejaVu Sans"));
        assert_eq!(settings.sans_serif.len(), CYRILLIC_FONT_FAMILIES.len());
        assert!(!settings.unicode_minus);
    }

    #[test]
    fn test_custom_preference_order() {
        let settings = FontSettings::cyrillic(Some(&["PT Sans", "Roboto"][..]));
        assert_eq!(settings.sans_serif, vec!["PT Sans", "Roboto"]);
    }

    #[test]
    fn test_for_language() {
        assert_eq!(FontSettings::for_language(Language::En), FontSettings::default());
        assert_eq!(
            FontSettings::for_language(Language::Ru),
            FontSettings::cyrillic(None)
        );
    }
}
