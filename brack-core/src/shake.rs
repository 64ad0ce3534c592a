//! Manifest-driven tree shaking of the standard library.
//!
//! The compiler reports which library members a program touches; this module
//! copies exactly those members out of the registry and renders them as a
//! single `const LIBRARY = {...};` declaration that is placed ahead of the
//! compiled body. No reachability analysis happens here: the manifest is
//! trusted as-is.
//!
//! Manifest entries the registry does not define are dropped from the output.
//! That is the defined behavior, not an error; a warning is logged so the
//! omission is still visible.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::registry::{LibraryEntry, LibraryModule, LibraryRegistry};

/// `module -> members used`, as emitted by the compiler.
pub type UsageManifest = BTreeMap<String, Vec<String>>;

/// Bookkeeping key in the manifest that never names a real module.
pub const MANIFEST_ROOT_KEY: &str = "LIBRARY";

/// Name of the declaration produced by [`shake`].
pub const LIBRARY_BINDING: &str = "LIBRARY";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberRef {
    pub module: String,
    pub member: String,
}

impl MemberRef {
    pub fn new(module: &str, member: &str) -> Self {
        Self {
            module: module.to_string(),
            member: member.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShakeReport {
    pub text: String,
    /// Leaf members copied into `text`, in output order.
    pub linked: Vec<MemberRef>,
    /// Manifest entries with no registry counterpart.
    pub dropped: Vec<MemberRef>,
}

pub fn shake(manifest: &UsageManifest, registry: &LibraryRegistry) -> String {
    shake_report(manifest, registry).text
}

pub fn shake_report(manifest: &UsageManifest, registry: &LibraryRegistry) -> ShakeReport {
    let mut report = ShakeReport::default();
    let mut body = String::new();
    let modules = manifest
        .keys()
        .map(String::as_str)
        .filter(|key| *key != MANIFEST_ROOT_KEY);
    shake_scope(manifest, modules, registry.as_module(), &mut body, &mut report);

    // a nested module's own manifest key has no top-level registry entry,
    // so its misses can be recorded by both the nested and the top-level pass
    let mut seen = HashSet::new();
    let linked = report.linked.clone();
    report
        .dropped
        .retain(|entry| !linked.contains(entry) && seen.insert(entry.clone()));
    for entry in &report.dropped {
        tracing::warn!(
            module = entry.module.as_str(),
            member = entry.member.as_str(),
            "manifest entry missing from registry, dropped"
        );
    }

    report.text = format!("const {LIBRARY_BINDING} = {{{body}}};");
    tracing::debug!(
        linked = report.linked.len(),
        dropped = report.dropped.len(),
        "tree-shook standard library"
    );
    report
}

/// Emits one `"module":{...},` block per name in `modules` that `scope`
/// defines as a sub-module.
fn shake_scope<'m>(
    manifest: &'m UsageManifest,
    modules: impl Iterator<Item = &'m str>,
    scope: &LibraryModule,
    out: &mut String,
    report: &mut ShakeReport,
) {
    for module_name in modules {
        let members = manifest.get(module_name).map(Vec::as_slice).unwrap_or_default();
        let Some(module) = scope.get(module_name).and_then(LibraryEntry::as_module) else {
            report
                .dropped
                .extend(members.iter().map(|member| MemberRef::new(module_name, member)));
            continue;
        };

        out.push_str(&quote_key(module_name));
        out.push_str(":{");
        for member in members {
            match module.get(member) {
                Some(LibraryEntry::Leaf(source)) => {
                    out.push_str(&quote_key(member));
                    out.push(':');
                    out.push_str(source);
                    out.push(',');
                    report.linked.push(MemberRef::new(module_name, member));
                }
                Some(LibraryEntry::Nested(_)) => {
                    // 入れ子のモジュールは manifest 側の同名エントリで中身を決める
                    if manifest.contains_key(member.as_str()) {
                        shake_scope(manifest, std::iter::once(member.as_str()), module, out, report);
                    } else {
                        tracing::debug!(
                            module = module_name,
                            member = member.as_str(),
                            "nested module listed without members"
                        );
                    }
                }
                None => {
                    report.dropped.push(MemberRef::new(module_name, member));
                }
            }
        }
        out.push_str("},");
    }
}

fn quote_key(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}
