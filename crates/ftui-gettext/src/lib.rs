#![forbid(unsafe_code)]

//! Multi-domain translation registry for FrankenTUI.
//!
//! Resolves gettext-style lookups (domain, message, plural count, context)
//! for one language against catalogs loaded from
//! `<root>/<language>/<domain>.json`, with a two-letter locale fallback and
//! printf-style argument formatting. Lookups never fail: anything that
//! cannot be translated is returned as the formatted source string.

pub mod catalog;
pub mod format;
pub mod plural;
pub mod registry;

pub use catalog::{
    Catalog, CatalogLoader, I18nError, JsonCatalogLoader, MessageCatalog, StringEntry,
};
pub use format::{FormatArg, sprintf};
pub use plural::{PluralCategory, PluralForms, PluralRule};
pub use registry::{DEFAULT_DOMAIN, Registry, RegistryConfig};
