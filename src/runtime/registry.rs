//! Name-based lookup of contexts

use std::collections::BTreeMap;

use super::{CgContext, CpuContext};
use crate::abft::ProtectionMode;
use crate::error::{Error, Result};
use crate::sparse::SparseFormat;

/// Builds a fresh context
pub type ContextFactory = Box<dyn Fn() -> Box<dyn CgContext> + Send + Sync>;

/// Map from `(target, mode)` to a context factory
///
/// The registry is an ordinary value: nothing is registered until
/// [`with_defaults`](Self::with_defaults) or [`register`](Self::register)
/// is called.
#[derive(Default)]
pub struct ContextRegistry {
    factories: BTreeMap<(String, ProtectionMode), ContextFactory>,
}

impl ContextRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in CPU contexts for every mode
    ///
    /// - `cpu`: CSR storage
    /// - `cpu-coo`: COO storage
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for mode in ProtectionMode::ALL {
            registry.register("cpu", mode, move || -> Box<dyn CgContext> {
                Box::new(CpuContext::new(SparseFormat::Csr, mode))
            });
            registry.register("cpu-coo", mode, move || -> Box<dyn CgContext> {
                Box::new(CpuContext::new(SparseFormat::Coo, mode))
            });
        }
        registry
    }

    /// Register a factory, replacing any previous one for the same pair
    pub fn register<F>(&mut self, target: impl Into<String>, mode: ProtectionMode, factory: F)
    where
        F: Fn() -> Box<dyn CgContext> + Send + Sync + 'static,
    {
        self.factories.insert((target.into(), mode), Box::new(factory));
    }

    /// Create the context registered for `target` and the mode named `mode`
    ///
    /// # Errors
    ///
    /// - `UnknownMode` if `mode` names no protection mode
    /// - `UnknownContext` if nothing is registered for the pair
    pub fn create(&self, target: &str, mode: &str) -> Result<Box<dyn CgContext>> {
        let parsed: ProtectionMode = mode.parse()?;
        self.factories
            .get(&(target.to_string(), parsed))
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownContext {
                target: target.to_string(),
                mode: mode.to_string(),
            })
    }

    /// Registered pairs, sorted by target then mode
    pub fn list(&self) -> impl Iterator<Item = (&str, ProtectionMode)> + '_ {
        self.factories
            .keys()
            .map(|(target, mode)| (target.as_str(), *mode))
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.list().map(|(target, mode)| format!("{target}-{mode}")))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_mode() {
        let registry = ContextRegistry::with_defaults();
        assert_eq!(registry.len(), 12);
        for mode in ProtectionMode::ALL {
            let csr = registry.create("cpu", mode.name()).unwrap();
            assert_eq!(csr.format(), SparseFormat::Csr);
            assert_eq!(csr.mode(), mode);
            let coo = registry.create("cpu-coo", mode.name()).unwrap();
            assert_eq!(coo.format(), SparseFormat::Coo);
        }
    }

    #[test]
    fn test_unknown_pairs() {
        let registry = ContextRegistry::with_defaults();
        assert!(matches!(
            registry.create("cuda", "sed"),
            Err(Error::UnknownContext { .. })
        ));
        assert!(matches!(
            registry.create("cpu", "tmr"),
            Err(Error::UnknownMode(_))
        ));
        assert!(ContextRegistry::new().create("cpu", "none").is_err());
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = ContextRegistry::with_defaults();
        let pairs: Vec<_> = registry.list().collect();
        assert_eq!(pairs[0], ("cpu", ProtectionMode::None));
        assert_eq!(pairs[6], ("cpu-coo", ProtectionMode::None));
        assert_eq!(pairs[11], ("cpu-coo", ProtectionMode::Secded));
    }

    #[test]
    fn test_register_custom_target() {
        let mut registry = ContextRegistry::new();
        registry.register("host", ProtectionMode::Sed, || -> Box<dyn CgContext> {
            Box::new(CpuContext::new(SparseFormat::Coo, ProtectionMode::Sed))
        });
        let ctx = registry.create("host", "SED").unwrap();
        assert_eq!(ctx.mode(), ProtectionMode::Sed);
    }
}
