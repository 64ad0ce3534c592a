use std::cell::Cell;

use brack_core::stdlib::{default_stdlib_root, load_registry};
use brack_core::{CompiledProgram, Compiler, CoreError, LibraryRegistry, UsageManifest};

/// Bundled stdlib registry.
pub fn stdlib() -> LibraryRegistry {
    load_registry(default_stdlib_root()).expect("bundled stdlib")
}

/// Tiny stand-in for the real compiler.
///
/// Understands `..[[<call>; <call>; ...]]` where a call is `<member> <args>`
/// and every member is taken from the `core` module.
#[derive(Default)]
pub struct StubCompiler {
    pub calls: Cell<usize>,
    pub fail: Option<&'static str>,
}

impl Compiler for StubCompiler {
    fn compile(&self, source: &str) -> Result<CompiledProgram, CoreError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(message) = self.fail {
            return Err(CoreError::CompileError(message.to_string()));
        }
        let inner = source
            .strip_prefix("..[[")
            .and_then(|rest| rest.strip_suffix("]]"))
            .ok_or_else(|| CoreError::CompileError(format!("unexpected shape: {source}")))?;

        let mut body = String::new();
        let mut used = Vec::new();
        for statement in inner.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (member, args) = statement.split_once(' ').unwrap_or((statement, ""));
            body.push_str(&format!("LIBRARY[\"core\"][\"{member}\"]({args});"));
            if !used.iter().any(|m: &String| m == member) {
                used.push(member.to_string());
            }
        }
        let mut modules = UsageManifest::new();
        modules.insert("core".to_string(), used);
        Ok(CompiledProgram::new(body, modules))
    }
}
