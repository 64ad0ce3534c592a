//! Standard library registry as supplied by the stdlib collaborator.
//!
//! The registry is a small nested map: `module -> member -> entry`, where an
//! entry is either the JavaScript source of a callable or another module.
//! Nothing in this crate mutates a registry once it is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved bookkeeping key holding a module's (or the registry's) name.
pub const NAME_KEY: &str = "NAME";

/// A single registry value.
///
/// In JSON a string becomes [`LibraryEntry::Leaf`] and an object becomes
/// [`LibraryEntry::Nested`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LibraryEntry {
    /// Source text of a callable, emitted verbatim when linked.
    Leaf(String),
    /// A sub-module.
    Nested(LibraryModule),
}

impl LibraryEntry {
    pub fn leaf(source: impl Into<String>) -> Self {
        LibraryEntry::Leaf(source.into())
    }

    pub fn as_module(&self) -> Option<&LibraryModule> {
        match self {
            LibraryEntry::Nested(module) => Some(module),
            LibraryEntry::Leaf(_) => None,
        }
    }
}

pub type LibraryModule = BTreeMap<String, LibraryEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryRegistry {
    modules: LibraryModule,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: LibraryEntry) {
        self.modules.insert(name.into(), entry);
    }

    /// Registers `name` as a module built from `(member, source)` pairs.
    pub fn insert_module<'a>(
        &mut self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let module = members
            .into_iter()
            .map(|(member, source)| (member.to_string(), LibraryEntry::leaf(source)))
            .collect();
        self.insert(name, LibraryEntry::Nested(module));
    }

    pub fn get(&self, name: &str) -> Option<&LibraryEntry> {
        self.modules.get(name)
    }

    /// Looks up `name` only if it is a module (not a leaf such as `NAME`).
    pub fn module(&self, name: &str) -> Option<&LibraryModule> {
        self.get(name).and_then(LibraryEntry::as_module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LibraryEntry)> {
        self.modules.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn as_module(&self) -> &LibraryModule {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
