//! Fixed runtime support emitted ahead of every linked program.
//!
//! * `_tco` — trampoline; keeps calling while the result is a thunk.
//! * `_pipe` — left-to-right composition.
//! * `_spread` — concatenates arrays, or shallow-merges objects, depending on
//!   the first item.
//! * `protolessModule` — copies members into an `Object.create(null)` record.

/// Binding for the language's unit value.
pub const VOID_SENTINEL: &str = "const VOID = null;";

pub const RUNTIME_PREAMBLE: &str = concat!(
    "const _tco = func => (...args) => { let result = func(...args); ",
    "while (typeof result === 'function') { result = result(); }; return result };\n",
    "const _pipe = (...fns) => x => fns.reduce((v, f) => f(v), x);\n",
    "const _spread = (items) => Array.isArray(items[0]) ",
    "? items.reduce((acc, item) => [...acc, ...item], []) ",
    ": items.reduce((acc, item) => ({ ...acc, ...item }), {});\n",
    "const protolessModule = methods => { const env = Object.create(null); ",
    "for (const method in methods) env[method] = methods[method]; return env;};",
);
