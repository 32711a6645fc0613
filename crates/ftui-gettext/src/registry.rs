//! Per-language domain registry.
//!
//! A [`Registry`] owns the catalogs of one language, keyed by domain name,
//! and resolves every lookup shape (domain × plural × context) down to two
//! canonical operations, [`Registry::resolve_nd`] and
//! [`Registry::resolve_ndc`].
//!
//! # Invariants
//!
//! 1. **No partial entries**: a domain maps to a fully loaded catalog or is
//!    absent. Catalogs are loaded before the write lock is taken, and the
//!    map only changes through a single `insert`.
//!
//! 2. **Atomic replacement**: re-registering a domain swaps the whole
//!    catalog; readers see the old or the new one.
//!
//! 3. **Total lookups**: every `resolve*` returns a usable string. An
//!    unregistered domain yields the plural key formatted with the
//!    arguments, the same result a catalog gives for a missing key.
//!
//! # File layout
//!
//! ```text
//! <root>/<language>/<domain>.<ext>
//! <root>/<language[..2]>/<domain>.<ext>   (when the first path is absent)
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crate::catalog::{Catalog, CatalogLoader, JsonCatalogLoader};
use crate::format::{FormatArg, sprintf};

/// Domain used by the lookup shapes that take no domain argument.
pub const DEFAULT_DOMAIN: &str = "default";

/// Construction parameters for a [`Registry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Directory holding one subdirectory per language.
    pub root: PathBuf,
    /// Language tag, e.g. `"en_US"`.
    pub language: String,
    /// Domain used when a lookup names none.
    pub default_domain: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            language: String::new(),
            default_domain: DEFAULT_DOMAIN.to_owned(),
        }
    }
}

impl RegistryConfig {
    /// Config for `language` under `root` with the default domain name.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    /// Set the domain used by lookups that name none.
    #[must_use]
    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = domain.into();
        self
    }
}

/// Translation domains of a single language.
///
/// # Example
///
/// ```no_run
/// use ftui_gettext::Registry;
///
/// let registry = Registry::new("/usr/share/myapp/locales", "fr_CA");
/// // Loads fr_CA/default.json, or fr/default.json if that is absent.
/// registry.register_domain("default");
///
/// let hello = registry.resolve("Hello", &[]);
/// let files = registry.resolve_n("%d file", "%d files", 3, &[3_i64.into()]);
/// let month = registry.resolve_c("May", "month", &[]);
/// # let _ = (hello, files, month);
/// ```
pub struct Registry {
    root: PathBuf,
    language: String,
    default_domain: String,
    loader: Arc<dyn CatalogLoader>,
    domains: RwLock<HashMap<String, Arc<dyn Catalog>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_config(RegistryConfig::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("root", &self.root)
            .field("language", &self.language)
            .field("default_domain", &self.default_domain)
            .field("extension", &self.loader.extension())
            .field("domains", &self.domains())
            .finish()
    }
}

impl Registry {
    /// Registry for `language` under `root`, reading JSON catalogs.
    ///
    /// Performs no I/O.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self::with_config(RegistryConfig::new(root, language))
    }

    /// Registry from an explicit config, reading JSON catalogs.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_loader(config, Arc::new(JsonCatalogLoader))
    }

    /// Registry from an explicit config and catalog loader.
    #[must_use]
    pub fn with_loader(config: RegistryConfig, loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            root: config.root,
            language: config.language,
            default_domain: config.default_domain,
            loader,
            domains: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory of the per-language subdirectories.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Language tag this registry serves.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Domain used by lookups that name none.
    #[must_use]
    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    /// Registered domain names, sorted.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_domains().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Whether `domain` has a registered catalog.
    #[must_use]
    pub fn has_domain(&self, domain: &str) -> bool {
        self.read_domains().contains_key(domain)
    }

    /// File that [`register_domain`](Self::register_domain) would load for `domain`.
    ///
    /// The full language tag is tried first; if that file does not exist and
    /// the tag is longer than two characters, the two-character primary
    /// subtag is used instead. The result may not exist.
    #[must_use]
    pub fn catalog_path(&self, domain: &str) -> PathBuf {
        self.locate(domain).0
    }

    fn locate(&self, domain: &str) -> (PathBuf, bool) {
        let candidate = self.candidate_path(&self.language, domain);
        if candidate.exists() || self.language.len() <= 2 {
            return (candidate, false);
        }
        match self.language.get(..2) {
            Some(primary) => (self.candidate_path(primary, domain), true),
            None => (candidate, false),
        }
    }

    fn candidate_path(&self, language: &str, domain: &str) -> PathBuf {
        let mut raw = OsString::from(self.root.as_os_str());
        if !raw.is_empty() {
            raw.push(MAIN_SEPARATOR_STR);
        }
        raw.push(language);
        raw.push(MAIN_SEPARATOR_STR);
        raw.push(domain);
        raw.push(".");
        raw.push(self.loader.extension());
        clean_path(Path::new(&raw))
    }

    /// Load `domain` from disk and publish it, replacing any previous catalog.
    ///
    /// Never fails: a missing or invalid file registers an empty catalog.
    /// The file is read before the write lock is taken.
    ///
    /// With an empty root the catalog path is relative to the working
    /// directory (`de/extras.json`), never anchored at the filesystem root
    /// (`/de/extras.json`). Pass `/` as the root to read from there.
    pub fn register_domain(&self, domain: &str) {
        let (path, fallback) = self.locate(domain);
        let catalog = self.loader.load(&path);
        tracing::debug!(
            domain,
            path = %path.display(),
            fallback,
            language = %self.language,
            "domain registered"
        );
        self.publish(domain, catalog);
    }

    /// Publish an already built catalog under `domain`, replacing any previous one.
    pub fn register_catalog(&self, domain: &str, catalog: Arc<dyn Catalog>) {
        self.publish(domain, catalog);
    }

    fn publish(&self, domain: &str, catalog: Arc<dyn Catalog>) {
        let mut domains = self.domains.write().unwrap_or_else(PoisonError::into_inner);
        domains.insert(domain.to_owned(), catalog);
    }

    fn read_domains(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Catalog>>> {
        self.domains.read().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------
    // Canonical lookups
    // -----------------------------------------------------------------

    /// Plural lookup of `key` in `domain`.
    ///
    /// Returns `plural_key` formatted with `args` if `domain` is not registered.
    #[must_use]
    pub fn resolve_nd(
        &self,
        domain: &str,
        key: &str,
        plural_key: &str,
        count: i64,
        args: &[FormatArg],
    ) -> String {
        let domains = self.read_domains();
        match domains.get(domain) {
            Some(catalog) => catalog.lookup_plural(key, plural_key, count, args),
            None => sprintf(plural_key, args),
        }
    }

    /// Plural lookup of `key` under `context` in `domain`.
    ///
    /// Returns `plural_key` formatted with `args` if `domain` is not registered.
    #[must_use]
    pub fn resolve_ndc(
        &self,
        domain: &str,
        key: &str,
        plural_key: &str,
        count: i64,
        context: &str,
        args: &[FormatArg],
    ) -> String {
        let domains = self.read_domains();
        match domains.get(domain) {
            Some(catalog) => catalog.lookup_plural_context(key, plural_key, count, context, args),
            None => sprintf(plural_key, args),
        }
    }

    // -----------------------------------------------------------------
    // Convenience shapes
    // -----------------------------------------------------------------

    /// Lookup of `key` in the default domain.
    #[must_use]
    pub fn resolve(&self, key: &str, args: &[FormatArg]) -> String {
        self.resolve_d(&self.default_domain, key, args)
    }

    /// Plural lookup in the default domain.
    #[must_use]
    pub fn resolve_n(
        &self,
        key: &str,
        plural_key: &str,
        count: i64,
        args: &[FormatArg],
    ) -> String {
        self.resolve_nd(&self.default_domain, key, plural_key, count, args)
    }

    /// Lookup of `key` in `domain`.
    #[must_use]
    pub fn resolve_d(&self, domain: &str, key: &str, args: &[FormatArg]) -> String {
        self.resolve_nd(domain, key, key, 0, args)
    }

    /// Lookup of `key` under `context` in the default domain.
    #[must_use]
    pub fn resolve_c(&self, key: &str, context: &str, args: &[FormatArg]) -> String {
        self.resolve_dc(&self.default_domain, key, context, args)
    }

    /// Plural lookup under `context` in the default domain.
    #[must_use]
    pub fn resolve_nc(
        &self,
        key: &str,
        plural_key: &str,
        count: i64,
        context: &str,
        args: &[FormatArg],
    ) -> String {
        self.resolve_ndc(&self.default_domain, key, plural_key, count, context, args)
    }

    /// Lookup of `key` under `context` in `domain`.
    #[must_use]
    pub fn resolve_dc(
        &self,
        domain: &str,
        key: &str,
        context: &str,
        args: &[FormatArg],
    ) -> String {
        self.resolve_ndc(domain, key, key, 0, context, args)
    }
}

/// Lexically normalize `path`: drop `.` segments and resolve `..` against
/// preceding normal segments. Leading `..` of relative paths is kept; `..`
/// at the root is dropped. An empty result becomes `.`.
fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
