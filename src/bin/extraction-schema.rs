//! Extraction Schema CLI
//!
//! Command-line interface for inspecting, fingerprinting and linting
//! extraction schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use extraction_schema::{
    canonicalize, compute_version, derive_extraction_hint_map_with, derive_required_fields_with,
    lint, load_schema_auto, normalize_json_schema, order_properties, resolve_field_semantic_with,
    FileStatus, LoadError, SchemaSnapshot, SchemaVersion, Severity, WalkOptions,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "extraction-schema")]
#[command(about = "Inspect, fingerprint and lint extraction schemas")]
#[command(version)]
struct Cli {
    /// Log library decisions (ref resolution, relocations) to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WalkArgs {
    /// Classify nodes as written, without following $ref pointers
    #[arg(long)]
    no_refs: bool,

    /// Deepest nesting level to descend to
    #[arg(long, default_value_t = WalkOptions::default().max_depth)]
    max_depth: usize,
}

impl WalkArgs {
    fn options(&self) -> WalkOptions {
        WalkOptions::new()
            .resolve_refs(!self.no_refs)
            .max_depth(self.max_depth)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical serialization of a schema
    Canonicalize {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the content version (SHA-256 of the canonical form)
    Version {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Fail with exit code 1 unless the schema has this version
        #[arg(long)]
        expect: Option<String>,
    },

    /// List required field paths
    Required {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output as a JSON array
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        walk: WalkArgs,
    },

    /// List x-extraction-hint annotations by field path
    Hints {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output as a JSON object
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        walk: WalkArgs,
    },

    /// Resolve the value type of one field
    Semantic {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Field path (e.g. contract.contract_number or lines[].sku)
        #[arg(long, short)]
        path: String,

        #[command(flatten)]
        walk: WalkArgs,
    },

    /// Move misplaced top-level field definitions into properties
    Normalize {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Order properties by their x-ui-order annotation
        #[arg(long)]
        ui_order: bool,
    },

    /// Print the normalized schema with all derived metadata
    Inspect {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        walk: WalkArgs,
    },

    /// Lint schema files for errors (syntax, broken refs, malformed hints)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Canonicalize { schema, output } => run_canonicalize(&schema, output),
        Commands::Version { schema, expect } => run_version(&schema, expect),
        Commands::Required { schema, json, walk } => run_required(&schema, json, &walk),
        Commands::Hints { schema, json, walk } => run_hints(&schema, json, &walk),
        Commands::Semantic { schema, path, walk } => run_semantic(&schema, &path, &walk),
        Commands::Normalize {
            schema,
            output,
            pretty,
            ui_order,
        } => run_normalize(&schema, output, pretty, ui_order),
        Commands::Inspect {
            schema,
            pretty,
            walk,
        } => run_inspect(&schema, pretty, &walk),
        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Logs go to stderr so stdout stays clean for piping.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("extraction_schema=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &str) -> Result<Value, u8> {
    load_schema_auto(source).map_err(|e: LoadError| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn emit(text: &str, output: Option<PathBuf>) -> Result<(), u8> {
    match output {
        Some(path) => std::fs::write(&path, text).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        }),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn run_canonicalize(schema_source: &str, output: Option<PathBuf>) -> Result<(), u8> {
    let schema = load(schema_source)?;
    emit(&canonicalize(&schema), output)
}

fn run_version(schema_source: &str, expect: Option<String>) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let version = compute_version(&schema);
    println!("{}", version);

    match expect.map(SchemaVersion::from) {
        Some(expected) if expected != version => {
            eprintln!("Version mismatch: expected {}, got {}", expected, version);
            Err(1)
        }
        _ => Ok(()),
    }
}

fn run_required(schema_source: &str, json: bool, walk: &WalkArgs) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let fields = derive_required_fields_with(&schema, &walk.options());

    if json {
        println!("{}", to_json(&fields, false)?);
    } else {
        for field in &fields {
            println!("{}", field);
        }
    }
    Ok(())
}

fn run_hints(schema_source: &str, json: bool, walk: &WalkArgs) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let hints = derive_extraction_hint_map_with(&schema, &walk.options());

    if json {
        println!("{}", to_json(&hints, false)?);
    } else {
        for (path, hint) in &hints {
            println!("{}\t{}", path, hint);
        }
    }
    Ok(())
}

fn run_semantic(schema_source: &str, field_path: &str, walk: &WalkArgs) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let semantic = resolve_field_semantic_with(&schema, field_path, &walk.options());
    println!("{}", semantic);
    Ok(())
}

fn run_normalize(
    schema_source: &str,
    output: Option<PathBuf>,
    pretty: bool,
    ui_order: bool,
) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let normalized = normalize_json_schema(&schema);
    eprintln!("changed: {}", normalized.changed);

    let result = if ui_order {
        order_properties(&normalized.schema)
    } else {
        normalized.into_owned()
    };
    emit(&to_json(&result, pretty)?, output)
}

fn run_inspect(schema_source: &str, pretty: bool, walk: &WalkArgs) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let snapshot = SchemaSnapshot::build_with(&schema, &walk.options());
    println!("{}", to_json(&snapshot, pretty)?);
    Ok(())
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(3);
    }

    let result = lint(path, strict);

    if format == "json" {
        println!("{}", to_json(&result, true)?);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err(1)
    }
}
