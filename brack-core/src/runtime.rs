//! Immediate execution of programs through an [`Interpreter`].
//!
//! Each call builds a fresh [`Namespace`] holding the whole standard library
//! and the interpreter's token table, then hands the wrapped program to the
//! interpreter. Errors are logged and returned; nothing is swallowed here.

use std::collections::BTreeMap;

use crate::balance::ensure_balanced;
use crate::error::CoreError;
use crate::frontend::Interpreter;
use crate::registry::{LibraryEntry, LibraryRegistry};
use crate::source::{strip_noise, wrap_in_body};

/// Reserved slot receiving the token table.
pub const TOKENS_SLOT: &str = ";;tokens";

/// Flat key/value environment with nothing inherited.
///
/// Lookups only see what was inserted, so library or program names can never
/// resolve to shared base-object state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for Namespace<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> Namespace<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<V> FromIterator<(String, V)> for Namespace<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Values stored in an execution environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Library(LibraryEntry),
    Tokens(Namespace<String>),
}

pub struct Runner<'a, I: Interpreter + ?Sized> {
    interpreter: &'a I,
    registry: &'a LibraryRegistry,
}

impl<'a, I: Interpreter + ?Sized> Runner<'a, I> {
    pub fn new(interpreter: &'a I, registry: &'a LibraryRegistry) -> Self {
        Self {
            interpreter,
            registry,
        }
    }

    /// Checks brackets, then evaluates.
    pub fn run(&self, source: &str) -> Result<I::Value, CoreError> {
        let source = strip_noise(source.trim());
        ensure_balanced(&source).inspect_err(|err| tracing::error!(%err, "rejected program"))?;
        self.exe(&source)
    }

    /// Like [`Runner::run`] for raw, commented text.
    pub fn run_from_text(&self, source: &str) -> Result<I::Value, CoreError> {
        self.run(&strip_noise(source))
    }

    /// Evaluates `source` without any structural check.
    pub fn exe(&self, source: &str) -> Result<I::Value, CoreError> {
        let mut env = self.environment();
        self.interpreter
            .evaluate(&mut env, &wrap_in_body(source))
            .inspect_err(|err| tracing::error!(%err, "program failed"))
    }

    /// Fresh environment: every registry entry plus the token table.
    pub fn environment(&self) -> Namespace<EnvValue> {
        let mut env: Namespace<EnvValue> = self
            .registry
            .iter()
            .map(|(name, entry)| (name.to_string(), EnvValue::Library(entry.clone())))
            .collect();
        let tokens = self.interpreter.tokens().into_iter().collect();
        env.insert(TOKENS_SLOT, EnvValue::Tokens(tokens));
        env
    }
}
