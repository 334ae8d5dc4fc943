// Sald Binding Generator CLI
// Usage: sald-bindgen <MANIFEST> [-o FILE] [--check] [--list]

use clap::Parser;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sald_bind::binding::{emit_unit, load_manifest, DescriptorRegistry, EmitOptions};
use sald_bind::error::{format_error, ErrorKind};

/// sald-bindgen - generate native method trampolines from a binding manifest
#[derive(Parser)]
#[command(name = "sald-bindgen")]
#[command(author = "starssxhfdmh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate native method bindings for Sald", long_about = None)]
struct Cli {
    /// Binding manifest (.json)
    manifest: PathBuf,

    /// Write the generated unit here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Fail if the output file is not up to date (requires -o)
    #[arg(long = "check")]
    check: bool,

    /// Print generated trampoline names in registration order
    #[arg(long = "list")]
    list: bool,

    /// Module the generated code imports runtime items from
    #[arg(long = "runtime-path", default_value = "crate::vm")]
    runtime_path: String,

    /// Module the generated code imports native receiver types from
    #[arg(long = "types-path")]
    types_path: Option<String>,
}

fn main() -> ExitCode {
    // SALD_LOG=debug shows collision resolution and emit summaries
    if let Ok(filter) = EnvFilter::try_from_env("SALD_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprint!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let registry = load_manifest(&cli.manifest).map_err(|e| {
        format_error(
            ErrorKind::LoadError,
            &e.to_string(),
            Some("see bindings.json for the expected format"),
        )
    })?;

    if cli.list {
        handle_list(&registry);
        return Ok(());
    }

    let options = EmitOptions {
        runtime_path: cli.runtime_path.clone(),
        types_path: cli.types_path.clone(),
        source: cli
            .manifest
            .file_name()
            .map(|name| name.to_string_lossy().to_string()),
    };
    let unit = emit_unit(&registry, &options);

    match (&cli.output, cli.check) {
        (Some(path), true) => handle_check(path, &unit),
        (None, true) => Err(format_error(
            ErrorKind::ArgumentError,
            "--check needs the file to compare against",
            Some("pass it with -o <FILE>"),
        )),
        (Some(path), false) => handle_write(path, &unit, registry.len()),
        (None, false) => {
            print!("{}", unit);
            Ok(())
        }
    }
}

fn handle_list(registry: &DescriptorRegistry) {
    for binding in registry.descriptors() {
        println!("{}  {}", binding.symbol.cyan(), binding.descriptor);
    }
}

fn handle_write(path: &Path, unit: &str, count: usize) -> Result<(), String> {
    fs::write(path, unit).map_err(|e| {
        format_error(
            ErrorKind::RuntimeError,
            &format!("Error writing '{}': {}", path.display(), e),
            None,
        )
    })?;
    eprintln!(
        "{} Generated {} binding{} into {}",
        "✓".green(),
        count,
        if count == 1 { "" } else { "s" },
        path.display()
    );
    Ok(())
}

fn handle_check(path: &Path, unit: &str) -> Result<(), String> {
    let existing = fs::read_to_string(path).map_err(|e| {
        format_error(
            ErrorKind::RuntimeError,
            &format!("Error reading '{}': {}", path.display(), e),
            None,
        )
    })?;
    if existing == unit {
        eprintln!("{} {} is up to date", "✓".green(), path.display());
        Ok(())
    } else {
        Err(format_error(
            ErrorKind::RuntimeError,
            &format!("{} is out of date", path.display()),
            Some("regenerate it by running the same command without --check"),
        ))
    }
}
