use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use brack_core::artifact::DEFAULT_RUNTIME_MODULE;
use brack_core::compress::{self, DEFAULT_ALPHABET};
use brack_core::source::{prettify, strip_noise};
use brack_core::stdlib::{default_stdlib_root, load_registry};
use brack_core::{
    ArtifactShape, CompiledProgram, HtmlOptions, LibraryRegistry, Linker, ensure_balanced,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// コマンドライン引数を定義するための構造体
#[derive(Parser, Debug)]
#[command(name = "brack", version, about = "Brack linker and packager", long_about = None)]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that `[` and `]` balance (string literals are ignored)
    Check {
        #[arg(short, long, help = "Source file (reads stdin when omitted)")]
        input: Option<String>,
    },

    /// Link a compiled unit against the standard library
    Link {
        #[arg(short, long, value_name = "PATH", help = "Compiled unit: {\"body\": ..., \"modules\": ...}")]
        unit: String,

        #[arg(short, long)]
        output: String,

        #[arg(
            long,
            value_name = "PATH",
            help = "Path to the standard library root (defaults to bundled stdlib)"
        )]
        stdlib: Option<String>,

        #[arg(long, value_enum, default_value_t = EmitFormat::Module)]
        emit: EmitFormat,

        #[command(flatten)]
        page: PageArgs,

        #[arg(long, help = "Print linked and dropped library members as JSON")]
        report: bool,
    },

    /// Build a page that interprets the source when loaded
    Interpret {
        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long)]
        output: String,

        #[arg(long, value_name = "PATH", default_value = DEFAULT_RUNTIME_MODULE)]
        runtime_module: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Plan short aliases for long library member names
    Compress {
        #[arg(long, value_name = "PATH")]
        stdlib: Option<String>,

        #[arg(long, help = "Letters to build codes from (defaults to a-z)")]
        alphabet: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Print source in display layout
    Pretty {
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EmitFormat {
    Module,
    Html,
}

impl From<EmitFormat> for ArtifactShape {
    fn from(format: EmitFormat) -> Self {
        match format {
            EmitFormat::Module => ArtifactShape::Module,
            EmitFormat::Html => ArtifactShape::StandaloneHtml,
        }
    }
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, value_name = "FILE", help = "Markup inserted before the generated scripts")]
    scripts: Option<String>,

    #[arg(long, default_value = "black")]
    background: String,
}

impl PageArgs {
    fn html_options(&self, runtime_module: Option<&str>) -> Result<HtmlOptions> {
        let scripts = match &self.scripts {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read scripts file {path}"))?,
            None => String::new(),
        };
        let mut options = HtmlOptions {
            background: self.background.clone(),
            scripts,
            ..HtmlOptions::default()
        };
        if let Some(module) = runtime_module {
            options.runtime_module = module.to_string();
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .try_init();
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Check { input } => {
            let source = read_source(input.as_deref())?;
            ensure_balanced(&strip_noise(&source))?;
            println!("balanced");
        }
        Command::Link {
            unit,
            output,
            stdlib,
            emit,
            page,
            report,
        } => {
            let text = fs::read_to_string(&unit)
                .with_context(|| format!("failed to read compiled unit {unit}"))?;
            let program = CompiledProgram::from_json(&text)?;
            let registry = load_stdlib(stdlib.as_deref())?;
            let linker = Linker::new(&registry).with_options(page.html_options(None)?);
            let (artifact, shaken) = linker.link_with_report(&program, emit.into())?;
            write_output(&output, artifact.text.as_bytes())?;
            tracing::info!(shape = %artifact.shape, output = output.as_str(), "linked");
            if report {
                let json = serde_json::json!({
                    "linked": shaken.linked,
                    "dropped": shaken.dropped,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Command::Interpret {
            input,
            output,
            runtime_module,
            page,
        } => {
            let source = read_source(input.as_deref())?;
            let registry = LibraryRegistry::new();
            let linker =
                Linker::new(&registry).with_options(page.html_options(Some(&runtime_module))?);
            let artifact = linker.interpreted_html(&source)?;
            write_output(&output, artifact.text.as_bytes())?;
        }
        Command::Compress {
            stdlib,
            alphabet,
            json,
        } => {
            let registry = load_stdlib(stdlib.as_deref())?;
            let letters: Vec<char> = match alphabet {
                Some(letters) => letters.chars().collect(),
                None => DEFAULT_ALPHABET.to_vec(),
            };
            let entries = compress::plan(&registry, &letters)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    println!("{}\t{}", entry.short, entry.full);
                }
            }
        }
        Command::Pretty { input } => {
            let source = read_source(input.as_deref())?;
            print!("{}", prettify(&strip_noise(&source)));
        }
    }

    Ok(())
}

fn read_source(input: Option<&str>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read input file {path}"))
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn load_stdlib(path: Option<&str>) -> Result<LibraryRegistry> {
    let root = path.map(PathBuf::from).unwrap_or_else(default_stdlib_root);
    Ok(load_registry(&root)?)
}

fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = PathBuf::from(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("failed to write output file {path}"))?;
    Ok(())
}
