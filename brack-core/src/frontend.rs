//! Seams to the language front end.
//!
//! Tokenizing, parsing, code generation and statement evaluation live outside
//! this crate. They are reached through the [`Compiler`] and [`Interpreter`]
//! traits so that the linker can be driven by any implementation, including
//! the stubs used in tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::runtime::{EnvValue, Namespace};
use crate::shake::UsageManifest;

/// Output of the compiler: target-language text plus the library surface it uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    pub body: String,
    #[serde(default)]
    pub modules: UsageManifest,
}

impl CompiledProgram {
    pub fn new(body: impl Into<String>, modules: UsageManifest) -> Self {
        Self {
            body: body.into(),
            modules,
        }
    }

    /// Reads a unit compiled out of process, `{"body": "...", "modules": {...}}`.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(|err| CoreError::InvalidUnit(err.to_string()))
    }
}

/// Token table exposed to evaluated programs (`operator -> meaning`).
pub type TokenTable = BTreeMap<String, String>;

pub trait Compiler {
    /// Parses and compiles a wrapped, noise-free program.
    ///
    /// Failures should be reported as [`CoreError::CompileError`]; they are
    /// passed through to the caller unchanged.
    fn compile(&self, source: &str) -> Result<CompiledProgram, CoreError>;
}

pub trait Interpreter {
    type Value;

    fn tokens(&self) -> TokenTable;

    /// Evaluates a wrapped program inside `env`.
    fn evaluate(
        &self,
        env: &mut Namespace<EnvValue>,
        source: &str,
    ) -> Result<Self::Value, CoreError>;
}
