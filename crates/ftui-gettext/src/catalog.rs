//! Message catalogs: the lookup contract consumed by the registry, plus the
//! bundled JSON-backed implementation.
//!
//! # Invariants
//!
//! 1. **Lookups are total**: every [`Catalog`] lookup returns a string. A
//!    miss returns the plural key formatted with the arguments, which is
//!    exactly what the registry returns for an unregistered domain.
//!
//! 2. **Loading is total**: [`CatalogLoader::load`] always yields a catalog.
//!    Errors are reported through `tracing` and produce an empty catalog.
//!
//! 3. **Thread safety**: catalogs are `Send + Sync` and immutable once
//!    loaded.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing file | Domain has no file for this language | Empty catalog, `debug!` |
//! | Unreadable file | Permissions, I/O error, bad UTF-8 | Empty catalog, `warn!` |
//! | Malformed file | Invalid JSON or schema mismatch | Empty catalog, `warn!` |
//! | Missing key | Key not in catalog | Formatted plural key |
//! | Untranslated entry | Empty `str` and no `forms`, or every form empty | Skipped at load, treated as missing |
//! | Empty plural form | Selected form and `other` both empty | Formatted plural key |
//!
//! # File format
//!
//! ```json
//! {
//!   "plural_rule": "french",
//!   "messages": [
//!     { "id": "Hello", "str": "Bonjour" },
//!     { "id": "%d file", "plural": "%d files",
//!       "forms": { "one": "%d fichier", "other": "%d fichiers" } },
//!     { "context": "month", "id": "May", "str": "Mai" }
//!   ]
//! }
//! ```
//!
//! `plural_rule` defaults to `english`. The `plural` field names the source
//! plural string for translators and is not used for lookup.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::format::{FormatArg, sprintf};
use crate::plural::{PluralForms, PluralRule};

/// Errors from loading a catalog file.
#[derive(Debug, Clone)]
pub enum I18nError {
    /// The file could not be read.
    Io {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },
    /// The file was read but is not a valid catalog.
    ParseError { path: PathBuf, message: String },
}

impl I18nError {
    /// Whether the error only means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Io {
                kind: io::ErrorKind::NotFound,
                ..
            }
        )
    }
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message, .. } => {
                write!(f, "cannot read catalog '{}': {message}", path.display())
            }
            Self::ParseError { path, message } => {
                write!(f, "malformed catalog '{}': {message}", path.display())
            }
        }
    }
}

impl std::error::Error for I18nError {}

/// One parsed translation domain.
///
/// Implementations must never fail observably: a miss returns
/// `sprintf(plural_key, args)`.
pub trait Catalog: Send + Sync {
    /// Plural-aware lookup of `key`.
    fn lookup_plural(
        &self,
        key: &str,
        plural_key: &str,
        count: i64,
        args: &[FormatArg],
    ) -> String;

    /// Plural-aware lookup of `key` within `context`.
    fn lookup_plural_context(
        &self,
        key: &str,
        plural_key: &str,
        count: i64,
        context: &str,
        args: &[FormatArg],
    ) -> String;
}

/// Turns a catalog file path into a [`Catalog`].
pub trait CatalogLoader: Send + Sync {
    /// File extension (without the dot) of the catalogs this loader reads.
    fn extension(&self) -> &str;

    /// Load the catalog at `path`. Absent or invalid files yield an empty catalog.
    fn load(&self, path: &Path) -> Arc<dyn Catalog>;
}

/// A single translation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringEntry {
    /// A non-pluralized translation.
    Simple(String),
    /// Plural translations keyed by category.
    Plural(PluralForms),
}

/// In-memory message table for one domain.
///
/// # Example
///
/// ```
/// use ftui_gettext::catalog::{Catalog, MessageCatalog};
/// use ftui_gettext::plural::{PluralForms, PluralRule};
///
/// let mut catalog = MessageCatalog::new().with_plural_rule(PluralRule::French);
/// catalog.insert("Hello", "Bonjour");
/// catalog.insert_plural("%d file", PluralForms {
///     one: "%d fichier".into(),
///     other: "%d fichiers".into(),
///     ..Default::default()
/// });
///
/// assert_eq!(catalog.lookup_plural("Hello", "Hello", 0, &[]), "Bonjour");
/// assert_eq!(
///     catalog.lookup_plural("%d file", "%d files", 3, &[3_i64.into()]),
///     "3 fichiers"
/// );
/// assert_eq!(catalog.lookup_plural("Bye", "Bye", 0, &[]), "Bye");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    entries: HashMap<String, StringEntry>,
    /// Context-qualified entries, keyed by context then id.
    contextual: HashMap<String, HashMap<String, StringEntry>>,
    plural_rule: PluralRule,
}

impl MessageCatalog {
    /// Create an empty catalog using the English plural rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plural rule used for plural entries.
    #[must_use]
    pub fn with_plural_rule(mut self, rule: PluralRule) -> Self {
        self.plural_rule = rule;
        self
    }

    /// The plural rule used for plural entries.
    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// Insert a simple translation.
    pub fn insert(&mut self, id: impl Into<String>, translation: impl Into<String>) {
        self.entries
            .insert(id.into(), StringEntry::Simple(translation.into()));
    }

    /// Insert plural translations.
    pub fn insert_plural(&mut self, id: impl Into<String>, forms: PluralForms) {
        self.entries.insert(id.into(), StringEntry::Plural(forms));
    }

    /// Insert a simple translation under `context`.
    pub fn insert_with_context(
        &mut self,
        context: &str,
        id: &str,
        translation: impl Into<String>,
    ) {
        self.insert_entry(
            Some(context),
            id.to_owned(),
            StringEntry::Simple(translation.into()),
        );
    }

    /// Insert plural translations under `context`.
    pub fn insert_plural_with_context(&mut self, context: &str, id: &str, forms: PluralForms) {
        self.insert_entry(Some(context), id.to_owned(), StringEntry::Plural(forms));
    }

    fn insert_entry(&mut self, context: Option<&str>, id: String, entry: StringEntry) {
        let table = match context {
            Some(ctx) => self.contextual.entry(ctx.to_owned()).or_default(),
            None => &mut self.entries,
        };
        table.insert(id, entry);
    }

    /// Look up a context-free entry.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StringEntry> {
        self.entries.get(id)
    }

    /// Look up an entry under `context`.
    #[must_use]
    pub fn get_with_context(&self, context: &str, id: &str) -> Option<&StringEntry> {
        self.contextual.get(context)?.get(id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() + self.contextual.values().map(HashMap::len).sum::<usize>()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(context, id)` for every entry.
    pub fn keys(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        let plain = self.entries.keys().map(|id| (None, id.as_str()));
        let qualified = self.contextual.iter().flat_map(|(ctx, table)| {
            table.keys().map(move |id| (Some(ctx.as_str()), id.as_str()))
        });
        plain.chain(qualified)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawCatalog = serde_json::from_str(text)?;
        let mut catalog = Self::new().with_plural_rule(raw.plural_rule);

        for message in raw.messages {
            let entry = match (message.forms, message.translation) {
                (Some(forms), _) if !forms.is_untranslated() => {
                    StringEntry::Plural(forms.without_empty_forms())
                }
                (None, Some(s)) if !s.is_empty() => StringEntry::Simple(s),
                _ => {
                    tracing::trace!(id = %message.id, "skipping untranslated message");
                    continue;
                }
            };
            catalog.insert_entry(message.context.as_deref(), message.id, entry);
        }

        Ok(catalog)
    }

    /// Read and parse a JSON catalog file.
    pub fn from_path(path: &Path) -> Result<Self, I18nError> {
        let text = std::fs::read_to_string(path).map_err(|err| I18nError::Io {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&text).map_err(|err| I18nError::ParseError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn render(
        &self,
        entry: Option<&StringEntry>,
        plural_key: &str,
        count: i64,
        args: &[FormatArg],
    ) -> String {
        let template = match entry {
            Some(StringEntry::Simple(s)) => s.as_str(),
            Some(StringEntry::Plural(forms)) => forms.select(self.plural_rule.categorize(count)),
            None => plural_key,
        };
        if template.is_empty() {
            return sprintf(plural_key, args);
        }
        sprintf(template, args)
    }
}

impl Catalog for MessageCatalog {
    fn lookup_plural(
        &self,
        key: &str,
        plural_key: &str,
        count: i64,
        args: &[FormatArg],
    ) -> String {
        self.render(self.get(key), plural_key, count, args)
    }

    fn lookup_plural_context(
        &self,
        key: &str,
        plural_key: &str,
        count: i64,
        context: &str,
        args: &[FormatArg],
    ) -> String {
        self.render(self.get_with_context(context, key), plural_key, count, args)
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    plural_rule: PluralRule,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    context: Option<String>,
    id: String,
    #[serde(default, rename = "str")]
    translation: Option<String>,
    #[serde(default)]
    forms: Option<PluralForms>,
}

/// Loads `.json` catalogs into [`MessageCatalog`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCatalogLoader;

impl CatalogLoader for JsonCatalogLoader {
    fn extension(&self) -> &str {
        "json"
    }

    fn load(&self, path: &Path) -> Arc<dyn Catalog> {
        match MessageCatalog::from_path(path) {
            Ok(catalog) => {
                tracing::debug!(path = %path.display(), entries = catalog.len(), "catalog loaded");
                Arc::new(catalog)
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(path = %path.display(), "catalog file not found, using empty catalog");
                Arc::new(MessageCatalog::new())
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog unusable, using empty catalog");
                Arc::new(MessageCatalog::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const FRENCH: &str = r#"{
        "plural_rule": "french",
        "messages": [
            { "id": "Hello", "str": "Bonjour" },
            { "id": "Welcome, %s!", "str": "Bienvenue, %s !" },
            { "id": "%d file", "plural": "%d files",
              "forms": { "one": "%d fichier", "other": "%d fichiers" } },
            { "context": "month", "id": "May", "str": "Mai" },
            { "context": "verb", "id": "May", "str": "Peut" },
            { "id": "Untranslated", "str": "" },
            { "id": "Pending" }
        ]
    }"#;

    fn french() -> MessageCatalog {
        MessageCatalog::from_json_str(FRENCH).unwrap()
    }

    #[test]
    fn parses_entries_and_rule() {
        let catalog = french();
        assert_eq!(catalog.plural_rule(), PluralRule::French);
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.get("Hello"),
            Some(&StringEntry::Simple("Bonjour".into()))
        );
    }

    #[test]
    fn untranslated_entries_are_skipped() {
        let catalog = french();
        assert!(catalog.get("Untranslated").is_none());
        assert!(catalog.get("Pending").is_none());
        assert_eq!(
            catalog.lookup_plural("Untranslated", "Untranslated", 0, &[]),
            "Untranslated"
        );
    }

    #[test]
    fn empty_plural_forms_fall_back_to_plural_key() {
        let catalog = MessageCatalog::from_json_str(
            r#"{"messages": [
                { "id": "%d file", "forms": { "one": "", "other": "" } },
                { "id": "%d dir", "forms": { "one": "%d dossier", "other": "" } },
                { "id": "%d row", "forms": { "one": "%d rangée", "few": "", "other": "%d rangées" } },
                { "id": "Hello", "str": "" }
            ]}"#,
        )
        .unwrap();

        assert!(catalog.get("%d file").is_none());
        assert_eq!(
            catalog.lookup_plural("%d file", "%d files", 3, &[3_i64.into()]),
            "3 files"
        );
        assert_eq!(catalog.lookup_plural("Hello", "Hello", 0, &[]), "Hello");

        assert_eq!(
            catalog.lookup_plural("%d dir", "%d dirs", 1, &[1_i64.into()]),
            "1 dossier"
        );
        assert_eq!(
            catalog.lookup_plural("%d dir", "%d dirs", 4, &[4_i64.into()]),
            "4 dirs"
        );

        match catalog.get("%d row") {
            Some(StringEntry::Plural(forms)) => assert_eq!(forms.few, None),
            other => panic!("expected plural entry, got {other:?}"),
        }
    }

    #[test]
    fn empty_programmatic_translation_falls_back() {
        let mut catalog = MessageCatalog::new();
        catalog.insert("Save", "");
        assert_eq!(catalog.lookup_plural("Save", "Save", 0, &[]), "Save");
    }

    #[test]
    fn simple_lookup_formats_args() {
        let catalog = french();
        assert_eq!(
            catalog.lookup_plural("Welcome, %s!", "Welcome, %s!", 0, &["Alice".into()]),
            "Bienvenue, Alice !"
        );
    }

    #[test]
    fn plural_lookup_selects_form() {
        let catalog = french();
        let one = catalog.lookup_plural("%d file", "%d files", 1, &[1_i64.into()]);
        let many = catalog.lookup_plural("%d file", "%d files", 3, &[3_i64.into()]);
        assert_eq!(one, "1 fichier");
        assert_eq!(many, "3 fichiers");
        // French treats zero as singular.
        assert_eq!(
            catalog.lookup_plural("%d file", "%d files", 0, &[0_i64.into()]),
            "0 fichier"
        );
    }

    #[test]
    fn simple_entry_ignores_count() {
        let catalog = french();
        assert_eq!(catalog.lookup_plural("Hello", "Hellos", 7, &[]), "Bonjour");
    }

    #[test]
    fn miss_returns_formatted_plural_key() {
        let catalog = french();
        assert_eq!(
            catalog.lookup_plural("%d dog", "%d dogs", 2, &[2_i64.into()]),
            "2 dogs"
        );
        assert_eq!(catalog.lookup_plural("Goodbye", "Goodbye", 0, &[]), "Goodbye");
    }

    #[test]
    fn context_lookup() {
        let catalog = french();
        assert_eq!(
            catalog.lookup_plural_context("May", "May", 0, "month", &[]),
            "Mai"
        );
        assert_eq!(
            catalog.lookup_plural_context("May", "May", 0, "verb", &[]),
            "Peut"
        );
        assert_eq!(
            catalog.lookup_plural_context("May", "May", 0, "name", &[]),
            "May"
        );
    }

    #[test]
    fn context_entries_are_not_visible_without_context() {
        let catalog = french();
        assert_eq!(catalog.lookup_plural("May", "May", 0, &[]), "May");
        assert_eq!(
            catalog.lookup_plural_context("Hello", "Hello", 0, "greeting", &[]),
            "Hello"
        );
    }

    #[test]
    fn control_characters_in_ids_do_not_reach_context_entries() {
        let mut catalog = MessageCatalog::new();
        catalog.insert("menu\u{4}File", "leaked");
        assert_eq!(
            catalog.lookup_plural_context("File", "File", 0, "menu", &[]),
            "File"
        );
        catalog.insert_with_context("menu", "File", "Fichier");
        assert_eq!(
            catalog.lookup_plural("menu\u{4}File", "menu\u{4}File", 0, &[]),
            "leaked"
        );
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn keys_split_context() {
        let mut catalog = MessageCatalog::new();
        catalog.insert("plain", "p");
        catalog.insert_with_context("ctx", "id", "v");
        let mut keys: Vec<_> = catalog.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![(None, "plain"), (Some("ctx"), "id")]);
    }

    #[test]
    fn plural_with_context() {
        let mut catalog = MessageCatalog::new();
        catalog.insert_plural_with_context(
            "inbox",
            "%d message",
            PluralForms {
                one: "%d letter".into(),
                other: "%d letters".into(),
                ..Default::default()
            },
        );
        assert_eq!(
            catalog.lookup_plural_context("%d message", "%d messages", 2, "inbox", &[2_i64.into()]),
            "2 letters"
        );
    }

    #[test]
    fn duplicate_ids_last_wins() {
        let catalog = MessageCatalog::from_json_str(
            r#"{"messages": [{"id": "a", "str": "1"}, {"id": "a", "str": "2"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.lookup_plural("a", "a", 0, &[]), "2");
    }

    #[test]
    fn empty_document_is_empty_catalog() {
        let catalog = MessageCatalog::from_json_str("{}").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.plural_rule(), PluralRule::English);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(MessageCatalog::from_json_str("{ not json").is_err());
        assert!(MessageCatalog::from_json_str(r#"{"messages": [{"str": "x"}]}"#).is_err());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MessageCatalog::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    #[traced_test]
    fn loader_missing_file_yields_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonCatalogLoader.load(&dir.path().join("absent.json"));
        assert_eq!(catalog.lookup_plural("Hello", "Hello", 0, &[]), "Hello");
        assert!(logs_contain("catalog file not found"));
    }

    #[test]
    #[traced_test]
    fn loader_malformed_file_yields_empty_catalog_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"messages\": [").unwrap();

        let catalog = JsonCatalogLoader.load(&path);
        assert_eq!(
            catalog.lookup_plural("%d file", "%d files", 2, &[2_i64.into()]),
            "2 files"
        );
        assert!(logs_contain("catalog unusable"));
        assert!(logs_contain("malformed catalog"));
    }

    #[test]
    fn loader_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.json");
        std::fs::write(&path, FRENCH).unwrap();

        let catalog = JsonCatalogLoader.load(&path);
        assert_eq!(catalog.lookup_plural("Hello", "Hello", 0, &[]), "Bonjour");
        assert_eq!(JsonCatalogLoader.extension(), "json");
    }
}
