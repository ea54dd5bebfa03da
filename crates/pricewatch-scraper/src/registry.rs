//! Maps a product URL to the adapter that knows its storefront.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Url;

use crate::adapters::{adidas, nike, Extractor, SelectorAdapter, SiteSelectors};
use crate::error::ScrapeError;

const BUILTIN_SITES: &[SiteSelectors] = &[nike::SELECTORS, adidas::SELECTORS];

/// Canonical strategy identifier derived from a URL's host: the label
/// immediately preceding the top-level domain, lower-cased
/// (`www.Nike.com` → `nike`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey(String);

impl SourceKey {
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidUrl`] if `url` does not parse, is not
    /// http(s), has an IP-literal host, or has fewer than two host labels.
    pub fn from_url(url: &str) -> Result<Self, ScrapeError> {
        let invalid = |reason: &str| ScrapeError::InvalidUrl {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };

        let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        let domain = parsed
            .domain()
            .ok_or_else(|| invalid("host is not a domain name"))?;

        let labels: Vec<&str> = domain
            .trim_end_matches('.')
            .split('.')
            .filter(|label| !label.is_empty())
            .collect();
        if labels.len() < 2 {
            return Err(invalid("host needs at least two labels"));
        }

        Ok(Self(labels[labels.len() - 2].to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of looking a URL up in the registry.
#[derive(Clone)]
pub enum Resolution {
    Adapter(Arc<dyn Extractor>),
    NotFound(SourceKey),
}

impl Resolution {
    #[must_use]
    pub fn source_key(&self) -> &str {
        match self {
            Resolution::Adapter(adapter) => adapter.source_key(),
            Resolution::NotFound(key) => key.as_str(),
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Adapter(_))
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Adapter(adapter) => f
                .debug_tuple("Adapter")
                .field(&adapter.source_key())
                .finish(),
            Resolution::NotFound(key) => f.debug_tuple("NotFound").field(key).finish(),
        }
    }
}

impl PartialEq for Resolution {
    fn eq(&self, other: &Self) -> bool {
        self.is_found() == other.is_found() && self.source_key() == other.source_key()
    }
}

/// Static source-key → adapter table.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Extractor>>,
}

impl AdapterRegistry {
    /// Registry holding every storefront this crate ships an adapter for.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidSelector`] if a built-in table fails to
    /// compile.
    pub fn builtin() -> Result<Self, ScrapeError> {
        let mut registry = Self::default();
        for table in BUILTIN_SITES {
            registry.register(Arc::new(SelectorAdapter::compile(table)?));
        }
        Ok(registry)
    }

    /// Adds `adapter` under its lower-cased source key, replacing any
    /// previous adapter for that key.
    pub fn register(&mut self, adapter: Arc<dyn Extractor>) {
        let key = adapter.source_key().to_ascii_lowercase();
        self.adapters.insert(key, adapter);
    }

    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidUrl`] if no source key can be derived
    /// from `url`. An unknown key is not an error.
    pub fn resolve(&self, url: &str) -> Result<Resolution, ScrapeError> {
        let key = SourceKey::from_url(url)?;
        Ok(match self.adapters.get(key.as_str()) {
            Some(adapter) => Resolution::Adapter(Arc::clone(adapter)),
            None => Resolution::NotFound(key),
        })
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn source_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
