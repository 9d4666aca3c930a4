use crate::dictionary::Dictionary;
use crate::fonts::{FontHook, FontSettings};
use crate::{I18nError, Language};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory under a topic root holding the dictionaries.
pub const I18N_DIR: &str = "i18n";
pub const LABELS_FILE: &str = "labels.yaml";
pub const TITLES_FILE: &str = "titles.yaml";

/// Localization state for one document-build session.
///
/// Holds the active language and notebook namespace together with the loaded
/// labels and titles. Every lookup reads this state at call time, so switching
/// the language between two plots changes only the later one.
#[derive(Debug, Default)]
pub struct I18n {
    language: Language,
    namespace: Option<String>,
    labels: Dictionary,
    titles: Dictionary,
    loaded_from: Option<PathBuf>,
    fonts: FontSettings,
    font_hook: Option<Box<dyn FontHook>>,
}

impl I18n {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a hook run whenever a language needing special fonts is selected.
    pub fn with_font_hook(mut self, hook: Box<dyn FontHook>) -> Self {
        self.font_hook = Some(hook);
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switches the active language.
    ///
    /// Selecting a language that needs special fonts also updates
    /// [`font_settings`](Self::font_settings) and runs the font hook. A failing
    /// hook is logged and otherwise ignored.
    pub fn set_language(&mut self, code: &str) -> Result<(), I18nError> {
        let language = Language::parse(code)?;
        self.language = language;
        self.fonts = FontSettings::for_language(language);

        if language.requires_font_support() {
            if let Some(hook) = &self.font_hook {
                if let Err(e) = hook.configure(&self.fonts) {
                    log::warn!("Font configuration for '{}' failed: {}", language, e);
                }
            }
        }
        log::debug!("i18n language set to {}", language);
        Ok(())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Sets the notebook namespace, e.g. `ACAP_001`. Blank input clears it.
    pub fn set_namespace(&mut self, namespace: Option<&str>) {
        self.namespace = namespace
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
    }

    pub fn font_settings(&self) -> &FontSettings {
        &self.fonts
    }

    pub fn labels(&self) -> &Dictionary {
        &self.labels
    }

    pub fn titles(&self) -> &Dictionary {
        &self.titles
    }

    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Loads `labels.yaml` and `titles.yaml` from `<root>/i18n/`.
    ///
    /// A missing file yields an empty dictionary, or [`I18nError::NotFound`]
    /// when `strict` is set. Both dictionaries are replaced only when both
    /// files were read successfully.
    pub fn load_dictionaries(&mut self, root: &Path, strict: bool) -> Result<(), I18nError> {
        let dir = root.join(I18N_DIR);
        let labels = read_dictionary(&dir.join(LABELS_FILE), "labels", strict)?;
        let titles = read_dictionary(&dir.join(TITLES_FILE), "titles", strict)?;

        log::info!(
            "Loaded i18n from {:?} ({} label keys, {} title keys)",
            dir,
            labels.len(),
            titles.len()
        );
        self.labels = labels;
        self.titles = titles;
        self.loaded_from = Some(dir);
        Ok(())
    }

    /// Replaces both dictionaries with in-memory ones.
    pub fn set_dictionaries(&mut self, labels: Dictionary, titles: Dictionary) {
        self.labels = labels;
        self.titles = titles;
        self.loaded_from = None;
    }

    /// Localized label for `key`, or `key` itself when none is defined.
    pub fn label(&self, key: &str) -> String {
        self.label_in(key, self.language)
    }

    /// Localized title for `key`, or `key` itself when none is defined.
    pub fn title(&self, key: &str) -> String {
        self.title_in(key, self.language)
    }

    /// Like [`label`](Self::label) with an explicit language; the context is unchanged.
    pub fn label_in(&self, key: &str, language: Language) -> String {
        self.text_or_key(&self.labels, key, language)
    }

    pub fn title_in(&self, key: &str, language: Language) -> String {
        self.text_or_key(&self.titles, key, language)
    }

    fn text_or_key(&self, dictionary: &Dictionary, key: &str, language: Language) -> String {
        match dictionary.resolve(key, language, self.namespace()) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => key.to_string(),
        }
    }

    pub fn summary(&self) -> I18nSummary {
        I18nSummary {
            language: self.language,
            namespace: self.namespace.clone(),
            loaded_from: self.loaded_from.clone(),
            label_keys: self.labels.len(),
            labels_shape: self.labels.shape(),
            title_keys: self.titles.len(),
            titles_shape: self.titles.shape(),
        }
    }
}

fn read_dictionary(path: &Path, kind: &'static str, strict: bool) -> Result<Dictionary, I18nError> {
    if !path.exists() {
        if strict {
            return Err(I18nError::NotFound {
                kind,
                path: path.to_path_buf(),
            });
        }
        log::debug!("No {} file at {:?}, using an empty dictionary", kind, path);
        return Ok(Dictionary::default());
    }

    let text = std::fs::read_to_string(path).map_err(|source| I18nError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Dictionary::from_yaml_str(&text).map_err(|source| I18nError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Snapshot of an [`I18n`] context for debugging notebook refactors.
#[derive(Debug, Clone, Serialize)]
pub struct I18nSummary {
    pub language: Language,
    pub namespace: Option<String>,
    pub loaded_from: Option<PathBuf>,
    pub label_keys: usize,
    pub labels_shape: &'static str,
    pub title_keys: usize,
    pub titles_shape: &'static str,
}

impl fmt::Display for I18nSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "lang: {}", self.language)?;
        writeln!(f, "notebook: {}", self.namespace.as_deref().unwrap_or("None"))?;
        match &self.loaded_from {
            Some(path) => writeln!(f, "loaded_from: {}", path.display())?,
            None => writeln!(f, "loaded_from: None")?,
        }
        writeln!(f, "labels(top-level keys): {} [{}]", self.label_keys, self.labels_shape)?;
        write!(f, "titles(top-level keys): {} [{}]", self.title_keys, self.titles_shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct CountingHook {
        calls: Rc<Cell<u32>>,
        fail: bool,
    }

    impl FontHook for CountingHook {
        fn configure(&self, settings: &FontSettings) -> Result<(), String> {
            assert!(!settings.sans_serif.is_empty());
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err("no Cyrillic fonts installed".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_set_language_validates() {
        let mut i18n = I18n::new();
        assert!(i18n.set_language("fr").is_err());
        assert_eq!(i18n.language(), Language::En);
        i18n.set_language("RU").unwrap();
        assert_eq!(i18n.language(), Language::Ru);
    }

    #[test]
    fn test_font_hook_runs_only_for_alternate_language() {
        let calls = Rc::new(Cell::new(0));
        let mut i18n = I18n::new().with_font_hook(Box::new(CountingHook {
            calls: calls.clone(),
            fail: false,
        }));

        i18n.set_language("en").unwrap();
        assert_eq!(calls.get(), 0);
        i18n.set_language("ru").unwrap();
        assert_eq!(calls.get(), 1);
        assert!(!i18n.font_settings().unicode_minus);

        i18n.set_language("en").unwrap();
        assert_eq!(i18n.font_settings(), &FontSettings::default());
    }

    #[test]
    fn test_failing_font_hook_is_not_fatal() {
        let calls = Rc::new(Cell::new(0));
        let mut i18n = I18n::new().with_font_hook(Box::new(CountingHook {
            calls: calls.clone(),
            fail: true,
        }));
        assert!(i18n.set_language("ru").is_ok());
        assert_eq!(calls.get(), 1);
        assert_eq!(i18n.language(), Language::Ru);
    }

    #[test]
    fn test_set_namespace_normalizes_blank() {
        let mut i18n = I18n::new();
        i18n.set_namespace(Some("  ACAP_001 "));
        assert_eq!(i18n.namespace(), Some("ACAP_001"));
        i18n.set_namespace(Some("   "));
        assert_eq!(i18n.namespace(), None);
        i18n.set_namespace(Some("X"));
        i18n.set_namespace(None);
        assert_eq!(i18n.namespace(), None);
    }

    #[test]
    fn test_label_and_title_fall_back_to_key() {
        let mut i18n = I18n::new();
        i18n.set_dictionaries(
            Dictionary::from_yaml_str("en:\n  mass: Mass\n").unwrap(),
            Dictionary::from_yaml_str("blank: '  '\n").unwrap(),
        );
        assert_eq!(i18n.label("mass"), "Mass");
        assert_eq!(i18n.label("radius"), "radius");
        assert_eq!(i18n.title("mass"), "mass");
        assert_eq!(i18n.title("blank"), "blank");
    }

    #[test]
    fn test_explicit_language_does_not_change_context() {
        let mut i18n = I18n::new();
        i18n.set_dictionaries(
            Dictionary::from_yaml_str("mass:\n  en: Mass\n  ru: Масса\n").unwrap(),
            Dictionary::default(),
        );
        assert_eq!(i18n.label_in("mass", Language::Ru), "Масса");
        assert_eq!(i18n.language(), Language::En);
        assert_eq!(i18n.label("mass"), "Mass");
    }

    #[test]
    fn test_summary_display() {
        let mut i18n = I18n::new();
        i18n.set_namespace(Some("ACAP_001"));
        let text = i18n.summary().to_string();
        assert!(text.contains("lang: en"));
        assert!(text.contains("notebook: ACAP_001"));
        assert!(text.contains("loaded_from: None"));
        assert!(text.contains("labels(top-level keys): 0 [flat]"));
    }
}
