//! Core utilities for the Brack language toolchain.
//!
//! This crate links compiled Brack programs against the JavaScript standard
//! library and packages the result. The pipeline is roughly:
//!
//!   source .brk
//!     -> source     (comments and layout removed)
//!     -> balance    (`[` / `]` check, before any parsing)
//!     -> Compiler   (external: body + usage manifest)
//!     -> shake      (only the library members the manifest lists)
//!     -> artifact   (module script, standalone or interpreted HTML)
//!
//! Parsing, code generation and evaluation are supplied by the caller
//! through the traits in [`frontend`]. Higher-level tools (CLI, REPL, etc.)
//! should depend on this crate rather than reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Source handling and structural checks
// ---------------------------------------------------------------------

pub mod source;
pub mod balance;

// ---------------------------------------------------------------------
// Standard library: registry, loading, shaking, name compression
// ---------------------------------------------------------------------

pub mod registry;
pub mod stdlib;
pub mod shake;
pub mod compress;

// ---------------------------------------------------------------------
// Front-end seams, runtime support and packaging
// ---------------------------------------------------------------------

pub mod frontend;
pub mod preamble;
pub mod artifact;
pub mod runtime;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use artifact::{Artifact, ArtifactShape, Assembler, HtmlOptions, Linker};
pub use balance::{DelimiterScan, ensure_balanced, scan_delimiters};
pub use error::CoreError;
pub use frontend::{CompiledProgram, Compiler, Interpreter};
pub use registry::{LibraryEntry, LibraryRegistry};
pub use runtime::Runner;
pub use shake::{UsageManifest, shake};
