//! Packaging of linked programs.
//!
//! Every deliverable is first described as an [`ArtifactPlan`], an ordered list
//! of named text blocks. The three shapes are renderings of the same plan:
//!
//!   source
//!     -> strip noise, bracket check, wrap in top-level block
//!     -> Compiler (external)        => body + usage manifest
//!     -> shake                      => LIBRARY declaration
//!     -> plan [Void, Preamble, Library, Body]
//!     -> render (module script | standalone HTML)
//!
//! [`Linker`] covers everything after compilation; [`Assembler`] adds the
//! compiler in front of it. The interpreted page skips compilation entirely
//! and plans a single [`BlockKind::Source`] block that is evaluated in the
//! browser on load.

use std::fmt;

use serde::Serialize;

use crate::balance::ensure_balanced;
use crate::error::CoreError;
use crate::frontend::{CompiledProgram, Compiler};
use crate::preamble::{RUNTIME_PREAMBLE, VOID_SENTINEL};
use crate::registry::LibraryRegistry;
use crate::shake::{ShakeReport, shake_report};
use crate::source::{strip_noise, wrap_in_body};

/// Module path the interpreted page imports `exe` from.
pub const DEFAULT_RUNTIME_MODULE: &str = "../language/misc/utils.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactShape {
    Module,
    StandaloneHtml,
    InterpretedHtml,
}

impl fmt::Display for ArtifactShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactShape::Module => "module",
            ArtifactShape::StandaloneHtml => "html",
            ArtifactShape::InterpretedHtml => "interpreted-html",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Void,
    Preamble,
    Library,
    Body,
    /// Noise-stripped, wrapped program text for load-time evaluation.
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactPlan {
    blocks: Vec<Block>,
}

impl ArtifactPlan {
    pub fn push(&mut self, kind: BlockKind, text: impl Into<String>) {
        self.blocks.push(Block {
            kind,
            text: text.into(),
        });
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Text of the first block of `kind`, or `""` when the plan has none.
    pub fn text(&self, kind: BlockKind) -> &str {
        self.blocks
            .iter()
            .find(|block| block.kind == kind)
            .map(|block| block.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub shape: ArtifactShape,
    pub text: String,
}

/// Page-level settings for the two HTML shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// CSS value for the page background.
    pub background: String,
    /// Extra markup inserted before the generated scripts.
    pub scripts: String,
    pub runtime_module: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            background: "black".to_string(),
            scripts: String::new(),
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
        }
    }
}

/// Packages compiled units against one registry. Needs no compiler.
pub struct Linker<'a> {
    registry: &'a LibraryRegistry,
    options: HtmlOptions,
}

impl<'a> Linker<'a> {
    pub fn new(registry: &'a LibraryRegistry) -> Self {
        Self {
            registry,
            options: HtmlOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HtmlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &HtmlOptions {
        &self.options
    }

    /// Packages an already compiled unit.
    pub fn link(
        &self,
        program: &CompiledProgram,
        shape: ArtifactShape,
    ) -> Result<Artifact, CoreError> {
        self.link_with_report(program, shape)
            .map(|(artifact, _)| artifact)
    }

    /// Like [`Linker::link`], also returning what the shake kept and dropped.
    pub fn link_with_report(
        &self,
        program: &CompiledProgram,
        shape: ArtifactShape,
    ) -> Result<(Artifact, ShakeReport), CoreError> {
        if shape == ArtifactShape::InterpretedHtml {
            return Err(CoreError::UnsupportedShape(format!(
                "{shape} needs program source, not a compiled unit"
            )));
        }
        let (plan, report) = self.plan_with_report(program);
        Ok((render(&plan, shape, &self.options), report))
    }

    pub fn plan_program(&self, program: &CompiledProgram) -> ArtifactPlan {
        self.plan_with_report(program).0
    }

    fn plan_with_report(&self, program: &CompiledProgram) -> (ArtifactPlan, ShakeReport) {
        let report = shake_report(&program.modules, self.registry);
        let mut plan = ArtifactPlan::default();
        plan.push(BlockKind::Void, VOID_SENTINEL);
        plan.push(BlockKind::Preamble, RUNTIME_PREAMBLE);
        plan.push(BlockKind::Library, report.text.as_str());
        plan.push(BlockKind::Body, program.body.as_str());
        (plan, report)
    }

    /// Builds a page that evaluates `source` when loaded. Nothing is compiled.
    pub fn interpreted_html(&self, source: &str) -> Result<Artifact, CoreError> {
        let mut plan = ArtifactPlan::default();
        plan.push(BlockKind::Source, prepare(source)?);
        Ok(render(&plan, ArtifactShape::InterpretedHtml, &self.options))
    }
}

/// [`Linker`] plus a compiler, for building straight from source.
pub struct Assembler<'a, C: Compiler + ?Sized> {
    compiler: &'a C,
    linker: Linker<'a>,
}

impl<'a, C: Compiler + ?Sized> Assembler<'a, C> {
    pub fn new(compiler: &'a C, registry: &'a LibraryRegistry) -> Self {
        Self {
            compiler,
            linker: Linker::new(registry),
        }
    }

    pub fn with_options(mut self, options: HtmlOptions) -> Self {
        self.linker = self.linker.with_options(options);
        self
    }

    pub fn linker(&self) -> &Linker<'a> {
        &self.linker
    }

    /// Compiles `source` into an importable script.
    pub fn compile_module(&self, source: &str) -> Result<Artifact, CoreError> {
        let program = self.compile(source)?;
        self.linker.link(&program, ArtifactShape::Module)
    }

    /// Compiles `source` into a self-contained page.
    pub fn compile_html(&self, source: &str) -> Result<Artifact, CoreError> {
        let program = self.compile(source)?;
        self.linker.link(&program, ArtifactShape::StandaloneHtml)
    }

    pub fn interpreted_html(&self, source: &str) -> Result<Artifact, CoreError> {
        self.linker.interpreted_html(source)
    }

    pub fn link(
        &self,
        program: &CompiledProgram,
        shape: ArtifactShape,
    ) -> Result<Artifact, CoreError> {
        self.linker.link(program, shape)
    }

    fn compile(&self, source: &str) -> Result<CompiledProgram, CoreError> {
        let wrapped = prepare(source)?;
        tracing::debug!(bytes = wrapped.len(), "compiling program");
        self.compiler.compile(&wrapped)
    }
}

/// Strip noise, reject unbalanced brackets, wrap in the top-level block.
fn prepare(source: &str) -> Result<String, CoreError> {
    let stripped = strip_noise(source);
    ensure_balanced(&stripped)?;
    Ok(wrap_in_body(&stripped))
}

pub fn render(plan: &ArtifactPlan, shape: ArtifactShape, options: &HtmlOptions) -> Artifact {
    let text = match shape {
        ArtifactShape::Module => render_module(plan),
        ArtifactShape::StandaloneHtml => render_standalone_html(plan, options),
        ArtifactShape::InterpretedHtml => render_interpreted_html(plan, options),
    };
    Artifact { shape, text }
}

fn render_module(plan: &ArtifactPlan) -> String {
    plan.blocks()
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_standalone_html(plan: &ArtifactPlan, options: &HtmlOptions) -> String {
    let mut out = page_head(options);
    out.push_str("<script>\n");
    out.push_str(plan.text(BlockKind::Void));
    out.push('\n');
    out.push_str(plan.text(BlockKind::Preamble));
    out.push_str("\n</script>\n");
    out.push_str("<script>");
    out.push_str(plan.text(BlockKind::Library));
    out.push_str("</script>\n");
    out.push_str("<script> (() => { ");
    out.push_str(plan.text(BlockKind::Body));
    out.push_str(" })()</script>\n");
    out.push_str("</body>\n");
    out
}

fn render_interpreted_html(plan: &ArtifactPlan, options: &HtmlOptions) -> String {
    let mut out = page_head(options);
    out.push_str("<script type=\"module\">\n");
    out.push_str(&format!(
        "import {{ exe }} from {};\n",
        js_string_literal(&options.runtime_module)
    ));
    out.push_str("try {\n");
    out.push_str(&format!(
        "  exe({})\n",
        js_string_literal(plan.text(BlockKind::Source))
    ));
    out.push_str("} catch (err) {\n");
    out.push_str("  console.error(err.message)\n");
    out.push_str("}\n");
    out.push_str("</script>\n");
    out.push_str("</body>\n");
    out
}

fn page_head(options: &HtmlOptions) -> String {
    let mut out = format!(
        "<style>body {{ background: {} }} </style><body>\n",
        options.background
    );
    if !options.scripts.is_empty() {
        out.push_str(&options.scripts);
        out.push('\n');
    }
    out
}

/// Quotes `text` as a JavaScript string that is also safe inside `<script>`.
fn js_string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::shake::{MemberRef, UsageManifest};

    struct EchoCompiler {
        calls: Cell<usize>,
    }

    impl EchoCompiler {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Compiler for EchoCompiler {
        fn compile(&self, source: &str) -> Result<CompiledProgram, CoreError> {
            self.calls.set(self.calls.get() + 1);
            let mut modules = UsageManifest::new();
            modules.insert("core".to_string(), vec!["write".to_string()]);
            Ok(CompiledProgram::new(format!("/* {source} */ LIBRARY.core.write(3);"), modules))
        }
    }

    fn registry() -> LibraryRegistry {
        let mut registry = LibraryRegistry::new();
        registry.insert_module(
            "core",
            [("write", "(x) => console.log(x)"), ("read", "() => 0")],
        );
        registry
    }

    #[test]
    fn plan_orders_blocks() {
        let compiler = EchoCompiler::new();
        let registry = registry();
        let assembler = Assembler::new(&compiler, &registry);
        let plan = assembler.linker().plan_program(&CompiledProgram::new("body();", UsageManifest::new()));
        let kinds: Vec<_> = plan.blocks().iter().map(|block| block.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Void, BlockKind::Preamble, BlockKind::Library, BlockKind::Body]
        );
        assert_eq!(plan.text(BlockKind::Source), "");
    }

    #[test]
    fn module_artifact_is_preamble_library_body() {
        let compiler = EchoCompiler::new();
        let registry = registry();
        let artifact = Assembler::new(&compiler, &registry)
            .compile_module("[write 3;]")
            .expect("module");
        assert_eq!(artifact.shape, ArtifactShape::Module);
        assert!(artifact.text.starts_with(VOID_SENTINEL));
        let preamble = artifact.text.find(RUNTIME_PREAMBLE).expect("preamble");
        let library = artifact.text.find("\"write\":").expect("library");
        let body = artifact.text.find("LIBRARY.core.write(3);").expect("body");
        assert!(preamble < library && library < body);
        assert!(!artifact.text.contains("\"read\""));
        assert!(artifact.text.contains("/* ..[[write 3;]] */"));
    }

    #[test]
    fn standalone_html_uses_three_scripts() {
        let compiler = EchoCompiler::new();
        let registry = registry();
        let options = HtmlOptions {
            background: "navy".to_string(),
            scripts: "<script src=\"two.js\"></script>".to_string(),
            ..HtmlOptions::default()
        };
        let artifact = Assembler::new(&compiler, &registry)
            .with_options(options)
            .compile_html("[write 3;]")
            .expect("html");
        let text = &artifact.text;
        assert!(text.starts_with("<style>body { background: navy } </style><body>\n"));
        assert_eq!(text.matches("<script>").count(), 3);
        let extra = text.find("two.js").expect("extra scripts");
        let preamble = text.find("const _tco").expect("preamble");
        let library = text.find("<script>const LIBRARY").expect("library");
        let body = text.find("<script> (() => { ").expect("body");
        assert!(extra < preamble && preamble < library && library < body);
        assert!(text.trim_end().ends_with("</body>"));
    }

    #[test]
    fn interpreted_html_embeds_source_without_compiling() {
        let compiler = EchoCompiler::new();
        let registry = registry();
        let artifact = Assembler::new(&compiler, &registry)
            .interpreted_html("[write \"it's </script>\";] ;; demo")
            .expect("page");
        assert_eq!(compiler.calls.get(), 0);
        assert_eq!(artifact.shape, ArtifactShape::InterpretedHtml);
        let text = &artifact.text;
        assert!(text.contains("import { exe } from \"../language/misc/utils.js\";"));
        assert!(text.contains(r#"exe("..[[write \"it's <\/script>\";]]")"#), "{text}");
        assert!(text.contains("console.error(err.message)"));
        assert!(!text.contains("demo"));
    }

    #[test]
    fn unbalanced_source_never_reaches_compiler() {
        let compiler = EchoCompiler::new();
        let registry = registry();
        let err = Assembler::new(&compiler, &registry)
            .compile_module("[write 1;]]")
            .unwrap_err();
        assert!(matches!(err, CoreError::Unbalanced { diff: 1 }));
        assert_eq!(compiler.calls.get(), 0);
    }

    #[test]
    fn link_report_matches_linked_library() {
        let registry = registry();
        let mut modules = UsageManifest::new();
        modules.insert("core".to_string(), vec!["write".to_string(), "teleport".to_string()]);
        let program = CompiledProgram::new("LIBRARY.core.write(3);", modules);
        let linker = Linker::new(&registry);
        let (artifact, report) = linker
            .link_with_report(&program, ArtifactShape::Module)
            .expect("link");
        assert_eq!(artifact, linker.link(&program, ArtifactShape::Module).expect("link"));
        assert!(artifact.text.contains(&report.text));
        assert_eq!(report.linked, vec![MemberRef::new("core", "write")]);
        assert_eq!(report.dropped, vec![MemberRef::new("core", "teleport")]);
    }

    #[test]
    fn interpreted_html_rejects_unbalanced_source() {
        let compiler = EchoCompiler::new();
        let registry = registry();
        let assembler = Assembler::new(&compiler, &registry);
        let excess = assembler.interpreted_html("[write 1;]]").unwrap_err();
        assert!(matches!(excess, CoreError::Unbalanced { diff: 1 }));
        let missing = assembler.interpreted_html("[[write 1;]").unwrap_err();
        assert!(matches!(missing, CoreError::Unbalanced { diff: -1 }));
        // quoted brackets do not count
        assert!(assembler.interpreted_html("[write \"]\";]").is_ok());
        assert_eq!(compiler.calls.get(), 0);
    }

    #[test]
    fn compiled_units_cannot_be_interpreted() {
        let registry = registry();
        let err = Linker::new(&registry)
            .link(&CompiledProgram::default(), ArtifactShape::InterpretedHtml)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedShape(_)));
    }
}
