//! Looks up a [Backend] by name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::{AsmBackend, Backend, CBackend, InterpreterBackend};
use crate::config::Config;

/// Makes a fresh backend every time it's called.
pub type Constructor = Arc<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

/// Every backend that ships with bfcc.
const BUILTINS: &[(&str, fn(Config) -> Box<dyn Backend>)] = &[
    ("asm", build_asm),
    ("c", build_c),
    ("interpreter", build_interpreter),
];

/// Name to constructor map. Safe to share between threads.
#[derive(Default)]
pub struct Registry {
    constructors: RwLock<HashMap<String, Constructor>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in backend, each configured with `config`.
    pub fn with_builtins(config: &Config) -> Self {
        let registry = Registry::new();
        for &(name, build) in BUILTINS {
            let config = config.clone();
            registry.register(name, Arc::new(move || build(config.clone())));
        }
        registry
    }

    /// Adds a backend. Registering the same name twice replaces the first one.
    pub fn register(&self, name: &str, constructor: Constructor) {
        self.constructors
            .write()
            .insert(name.to_string(), constructor);
    }

    /// Constructs the backend called `name`, if there is one.
    pub fn get(&self, name: &str) -> Option<Box<dyn Backend>> {
        let constructor = self.constructors.read().get(name).cloned();
        constructor.map(|build| build())
    }

    /// Names of all registered backends, sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn build_asm(config: Config) -> Box<dyn Backend> {
    Box::new(AsmBackend::new(config))
}

fn build_c(config: Config) -> Box<dyn Backend> {
    Box::new(CBackend::new(config))
}

fn build_interpreter(config: Config) -> Box<dyn Backend> {
    Box::new(InterpreterBackend::new(config))
}
