use crate::I18nError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported display language.
///
/// The set is closed: [`Language::En`] is the baseline every lookup falls back
/// to, [`Language::Ru`] is the alternate language that needs Cyrillic-capable
/// fonts in plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (baseline).
    En,
    /// Russian.
    Ru,
}

impl Language {
    /// The language used when the active one has no entry.
    pub const BASELINE: Language = Language::En;

    /// All supported languages, baseline first.
    pub const ALL: [Language; 2] = [Language::En, Language::Ru];

    /// Parses a language code, ignoring surrounding whitespace and case.
    pub fn parse(code: &str) -> Result<Self, I18nError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            _ => Err(I18nError::InvalidLanguage(code.to_string())),
        }
    }

    /// Matches an exact dictionary key (`en`, `ru`). Dictionary keys are not trimmed.
    pub(crate) fn from_key(key: &str) -> Option<Self> {
        match key {
            "en" => Some(Language::En),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    /// Whether plots in this language need fonts beyond the default set.
    pub fn requires_font_support(self) -> bool {
        matches!(self, Language::Ru)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!(Language::parse(" RU ").unwrap(), Language::Ru);
        assert_eq!(Language::parse("en").unwrap(), Language::En);
        assert_eq!("Ru".parse::<Language>().unwrap(), Language::Ru);
    }

    #[test]
    fn test_parse_rejects_unknown_codes() {
        let err = Language::parse("de").unwrap_err();
        assert!(matches!(err, I18nError::InvalidLanguage(ref code) if code == "de"));
        assert!(Language::parse("").is_err());
    }

    #[test]
    fn test_font_support_only_for_alternate() {
        assert!(!Language::En.requires_font_support());
        assert!(Language::Ru.requires_font_support());
        assert_eq!(Language::default(), Language::BASELINE);
    }

    #[test]
    fn test_dictionary_keys_are_exact() {
        assert_eq!(Language::from_key("ru"), Some(Language::Ru));
        assert_eq!(Language::from_key("RU"), None);
        assert_eq!(Language::from_key(" en"), None);
    }
}
