//! Translator registry
//!
//! Hosts discover translators by identifier or by index. Each entry maps a
//! signature to a constructor producing a fresh boxed [`Translator`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::Translator;

/// Builds a new translator instance
pub type Constructor = fn() -> Box<dyn Translator>;

/// Registration failure
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// Identifier is empty or whitespace
    EmptyId,
    /// Identifier already registered
    Duplicate(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "translator id is empty"),
            Self::Duplicate(id) => write!(f, "translator already registered: {id}"),
        }
    }
}

impl core::error::Error for RegistryError {}

/// Ordered mapping from translator identifier to constructor
#[derive(Debug, Default, Clone)]
pub struct TranslatorRegistry {
    entries: Vec<(&'static str, Constructor)>,
}

impl TranslatorRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every translator compiled into this crate.
    ///
    /// Empty unless the `libheif` feature is enabled.
    #[must_use]
    pub fn builtin() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "libheif")]
        {
            let id = crate::config::TRANSLATOR_SIGNATURE;
            if let Err(e) = registry.register(id, libheif_translator) {
                log::warn!("registry: {e}");
            }
        }
        registry
    }

    /// Add a translator under `id`. Registration order is discovery order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyId`] for a blank id, [`RegistryError::Duplicate`]
    /// if `id` is already present.
    pub fn register(
        &mut self,
        id: &'static str,
        constructor: Constructor,
    ) -> core::result::Result<(), RegistryError> {
        if id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.get(id).is_some() {
            return Err(RegistryError::Duplicate(id));
        }
        log::debug!("registry: registered {id}");
        self.entries.push((id, constructor));
        Ok(())
    }

    /// Constructor registered under `id`
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Constructor> {
        self.entries
            .iter()
            .find(|(key, _)| *key == id)
            .map(|&(_, ctor)| ctor)
    }

    /// New translator registered under `id`
    #[must_use]
    pub fn create(&self, id: &str) -> Option<Box<dyn Translator>> {
        self.get(id).map(|ctor| ctor())
    }

    /// New instance of the `n`th registered translator
    #[must_use]
    pub fn nth(&self, n: usize) -> Option<Box<dyn Translator>> {
        self.entries.get(n).map(|&(_, ctor)| ctor())
    }

    /// Registered identifiers, in registration order
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|&(id, _)| id)
    }

    /// Number of registered translators
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(feature = "libheif")]
fn libheif_translator() -> Box<dyn Translator> {
    Box::new(crate::HeicTranslator::new(
        crate::decoder::LibHeifDecoder::new(),
    ))
}
