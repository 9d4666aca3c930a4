use crate::Language;
use crate::error::DecodeError;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Section name holding entries shared by every notebook.
pub const COMMON_SECTION: &str = "common";

/// The translations of one language in a per-language dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Nested sections: notebook namespaces and [`COMMON_SECTION`].
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
    /// Flat entries directly under the language key.
    pub entries: BTreeMap<String, String>,
}

impl Bundle {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.entries.is_empty()
    }

    /// Namespace section, then `common`, then the flat entry. Blank strings never match.
    pub fn lookup(&self, key: &str, namespace: Option<&str>) -> Option<&str> {
        let section_value = |name: &str| {
            self.sections
                .get(name)
                .and_then(|section| section.get(key))
                .map(String::as_str)
                .filter(|v| is_present(v))
        };

        if let Some(v) = namespace.and_then(section_value) {
            return Some(v);
        }
        if let Some(v) = section_value(COMMON_SECTION) {
            return Some(v);
        }
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| is_present(v))
    }

    fn decode(mapping: &Mapping) -> Self {
        let mut bundle = Bundle::default();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else { continue };
            match value {
                Value::String(s) => {
                    bundle.entries.insert(key.to_string(), s.clone());
                }
                Value::Mapping(section) => {
                    bundle
                        .sections
                        .insert(key.to_string(), string_entries(section));
                }
                _ => {}
            }
        }
        bundle
    }
}

/// A value in the legacy `key -> {en, ru}` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Already localized; returned for every language.
    Universal(String),
    Localized(BTreeMap<Language, String>),
}

/// A labels or titles dictionary, decoded once into one of the supported layouts.
///
/// ```yaml
/// # PerLanguage
/// en:
///   common:
///     age_gyr: "Age (Gyr)"
///   ACAP_001:
///     legend_host_stars: "host stars"
///   mass: "Mass"
///
/// # LegacyPerKey
/// age_gyr:
///   en: "Age (Gyr)"
///   ru: "Возраст (млрд лет)"
///
/// # Flat
/// age_gyr: "Age (Gyr)"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dictionary {
    Flat(BTreeMap<String, String>),
    PerLanguage(BTreeMap<Language, Bundle>),
    LegacyPerKey(BTreeMap<String, Entry>),
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::Flat(BTreeMap::new())
    }
}

impl Dictionary {
    /// Parses and decodes a YAML document. An empty document is an empty dictionary.
    pub fn from_yaml_str(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_yaml_value(value)
    }

    pub fn from_yaml_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(Dictionary::default()),
            Value::Mapping(mapping) => Ok(Self::decode(&mapping)),
            other => Err(DecodeError::NotAMapping {
                found: value_kind(&other),
            }),
        }
    }

    fn decode(mapping: &Mapping) -> Self {
        let has_language_keys = mapping
            .keys()
            .filter_map(Value::as_str)
            .any(|k| Language::from_key(k).is_some());

        if has_language_keys {
            // Missing, null and empty sections defer to the baseline. Any other
            // value claims the language, even when it holds nothing usable.
            let bundles = Language::ALL
                .iter()
                .filter_map(|lang| {
                    let section = mapping.get(lang.as_str()).filter(|v| is_truthy(v))?;
                    let bundle = section.as_mapping().map(Bundle::decode).unwrap_or_default();
                    Some((*lang, bundle))
                })
                .collect();
            return Dictionary::PerLanguage(bundles);
        }

        let mut entries = BTreeMap::new();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else { continue };
            let entry = match value {
                Value::String(s) => Entry::Universal(s.clone()),
                Value::Mapping(per_lang) => Entry::Localized(
                    per_lang
                        .iter()
                        .filter_map(|(k, v)| {
                            Some((Language::from_key(k.as_str()?)?, v.as_str()?.to_string()))
                        })
                        .collect(),
                ),
                _ => continue,
            };
            entries.insert(key.to_string(), entry);
        }

        if entries.values().all(|e| matches!(e, Entry::Universal(_))) {
            Dictionary::Flat(
                entries
                    .into_iter()
                    .filter_map(|(k, e)| match e {
                        Entry::Universal(s) => Some((k, s)),
                        Entry::Localized(_) => None,
                    })
                    .collect(),
            )
        } else {
            Dictionary::LegacyPerKey(entries)
        }
    }

    /// Returns the best match for `key`, or `None` when nothing usable is defined.
    ///
    /// Per-language dictionaries use the bundle of `language`, or the baseline
    /// bundle when that one is missing. Legacy entries fall back to the baseline
    /// translation; universal strings are returned verbatim.
    pub fn resolve(&self, key: &str, language: Language, namespace: Option<&str>) -> Option<&str> {
        match self {
            Dictionary::Flat(entries) => entries.get(key).map(String::as_str),
            Dictionary::PerLanguage(bundles) => bundles
                .get(&language)
                .or_else(|| bundles.get(&Language::BASELINE))?
                .lookup(key, namespace),
            Dictionary::LegacyPerKey(entries) => match entries.get(key)? {
                Entry::Universal(s) => Some(s.as_str()),
                Entry::Localized(per_lang) => per_lang
                    .get(&language)
                    .filter(|s| !s.is_empty())
                    .or_else(|| per_lang.get(&Language::BASELINE))
                    .map(String::as_str),
            },
        }
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        match self {
            Dictionary::Flat(entries) => entries.len(),
            Dictionary::PerLanguage(bundles) => bundles.len(),
            Dictionary::LegacyPerKey(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Dictionary::Flat(_) => "flat",
            Dictionary::PerLanguage(_) => "per-language",
            Dictionary::LegacyPerKey(_) => "legacy",
        }
    }
}

fn is_present(s: &str) -> bool {
    !s.trim().is_empty()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(m) => !m.is_empty(),
        Value::Tagged(_) => true,
    }
}

fn string_entries(mapping: &Mapping) -> BTreeMap<String, String> {
    mapping
        .iter()
        .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.as_str()?.to_string())))
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"
en:
  common:
    age_gyr: "Age (Gyr)"
    host: "common host"
  ACAP_001:
    host: "notebook host"
    blank: "   "
  host: "flat host"
  blank: "flat blank"
  mass: "Mass"
ru:
  common:
    age_gyr: "Возраст (млрд лет)"
"#;

    #[test]
    fn test_namespace_beats_common_beats_flat() {
        let dict = Dictionary::from_yaml_str(NAMESPACED).unwrap();
        assert_eq!(dict.shape(), "per-language");
        assert_eq!(dict.resolve("host", Language::En, Some("ACAP_001")), Some("notebook host"));
        assert_eq!(dict.resolve("host", Language::En, None), Some("common host"));
        assert_eq!(dict.resolve("host", Language::En, Some("OTHER")), Some("common host"));
        assert_eq!(dict.resolve("mass", Language::En, Some("ACAP_001")), Some("Mass"));
    }

    #[test]
    fn test_blank_namespace_value_does_not_win() {
        let dict = Dictionary::from_yaml_str(NAMESPACED).unwrap();
        assert_eq!(dict.resolve("blank", Language::En, Some("ACAP_001")), Some("flat blank"));
    }

    #[test]
    fn test_active_language_bundle_does_not_mix_with_baseline() {
        let dict = Dictionary::from_yaml_str(NAMESPACED).unwrap();
        assert_eq!(dict.resolve("age_gyr", Language::Ru, None), Some("Возраст (млрд лет)"));
        // `ru` exists, so `en` is not consulted for keys it lacks.
        assert_eq!(dict.resolve("mass", Language::Ru, None), None);
    }

    #[test]
    fn test_missing_language_falls_back_to_baseline() {
        let dict = Dictionary::from_yaml_str("en:\n  mass: Mass\n").unwrap();
        assert_eq!(dict.resolve("mass", Language::Ru, None), Some("Mass"));

        let null = Dictionary::from_yaml_str("en:\n  mass: Mass\nru: ~\n").unwrap();
        assert_eq!(null.resolve("mass", Language::Ru, None), Some("Mass"));
    }

    #[test]
    fn test_unusable_language_section_blocks_baseline() {
        for ru in ["oops", "{mass: 5}", "{common: ~}", "[a]"] {
            let text = format!("en:\n  mass: Mass\n  common:\n    mass: Mass\nru: {}\n", ru);
            let dict = Dictionary::from_yaml_str(&text).unwrap();
            assert_eq!(dict.resolve("mass", Language::Ru, None), None, "ru: {}", ru);
            assert_eq!(dict.resolve("mass", Language::En, None), Some("Mass"));
        }
    }

    #[test]
    fn test_empty_language_section_falls_back_to_baseline() {
        let dict = Dictionary::from_yaml_str("en:\n  mass: Mass\nru: {}\n").unwrap();
        assert_eq!(dict.resolve("mass", Language::Ru, None), Some("Mass"));
    }

    #[test]
    fn test_legacy_layout() {
        let dict = Dictionary::from_yaml_str(
            "age_gyr:\n  en: Age (Gyr)\n  ru: Возраст\nunit: km/s\nonly_en:\n  en: Only\nempty_ru:\n  en: Fallback\n  ru: ''\n",
        )
        .unwrap();
        assert_eq!(dict.shape(), "legacy");
        assert_eq!(dict.resolve("age_gyr", Language::Ru, None), Some("Возраст"));
        assert_eq!(dict.resolve("unit", Language::Ru, None), Some("km/s"));
        assert_eq!(dict.resolve("only_en", Language::Ru, None), Some("Only"));
        assert_eq!(dict.resolve("empty_ru", Language::Ru, None), Some("Fallback"));
        assert_eq!(dict.resolve("missing", Language::En, None), None);
    }

    #[test]
    fn test_flat_layout_is_language_independent() {
        let dict = Dictionary::from_yaml_str("unit: km/s\nnumber: 3\n").unwrap();
        assert_eq!(dict.shape(), "flat");
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.resolve("unit", Language::Ru, Some("ACAP_001")), Some("km/s"));
        assert_eq!(dict.resolve("number", Language::En, None), None);
    }

    #[test]
    fn test_empty_document_is_empty_dictionary() {
        let dict = Dictionary::from_yaml_str("").unwrap();
        assert!(dict.is_empty());
        assert_eq!(dict, Dictionary::default());
    }

    #[test]
    fn test_non_mapping_top_level_is_rejected() {
        let err = Dictionary::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, DecodeError::NotAMapping { found: "a sequence" }));
        assert!(matches!(
            Dictionary::from_yaml_str("en: [unclosed").unwrap_err(),
            DecodeError::Yaml(_)
        ));
    }
}
