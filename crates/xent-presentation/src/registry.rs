//! A name-to-function lookup resolved once at benchmark configuration time,
//! mirroring how `xent-players`' player registry resolves player types.

use std::collections::HashMap;

use xent_core::XentError;

use crate::builtins;
use crate::context::PresentationContext;

pub type PresentationFn = fn(&PresentationContext) -> String;

pub struct PresentationRegistry {
    functions: HashMap<&'static str, PresentationFn>,
}

impl PresentationRegistry {
    /// A registry pre-populated with the built-in presentation functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        registry.register("single", builtins::single).expect("builtin registration cannot collide");
        registry.register("multi", builtins::multi).expect("builtin registration cannot collide");
        registry.register("dex", builtins::dex).expect("builtin registration cannot collide");
        registry
            .register("likely_sequence_unlikely_result", builtins::likely_sequence_unlikely_result)
            .expect("builtin registration cannot collide");
        registry
    }

    pub fn register(&mut self, name: &'static str, function: PresentationFn) -> Result<(), XentError> {
        if self.functions.contains_key(name) {
            return Err(XentError::Configuration(format!("presentation function '{name}' is already registered")));
        }
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<PresentationFn, XentError> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| XentError::Configuration(format!("unknown presentation function '{name}'")))
    }
}

impl Default for PresentationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_builtin_by_name() {
        let registry = PresentationRegistry::with_builtins();
        for name in ["single", "multi", "dex", "likely_sequence_unlikely_result"] {
            assert!(registry.resolve(name).is_ok());
        }
    }

    #[test]
    fn unknown_name_is_a_configuration_error() {
        let registry = PresentationRegistry::with_builtins();
        assert!(matches!(registry.resolve("nope").unwrap_err(), XentError::Configuration(_)));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = PresentationRegistry::with_builtins();
        let err = registry.register("single", builtins::single).unwrap_err();
        assert!(matches!(err, XentError::Configuration(_)));
    }
}
