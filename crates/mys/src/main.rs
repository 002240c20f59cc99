//! Command line driver for the Mys transpiler.
//!
//! Invoked per package with paths to sources and an output directory.
//! Exits zero on success and nonzero on any diagnostic, which is printed
//! to stderr exactly as the core renders it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mys_core::{transpile_with_options, Source, TranspileOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mys", version, about = "Transpile Mys sources to C++")]
struct Args {
    /// Mys source files to transpile.
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Package name; module names are derived as <package>.<file stem>.
    #[arg(short, long, default_value = "foo")]
    package: String,

    /// Output directory for the generated .hpp/.cpp artifacts.
    #[arg(short, long, default_value = "build/transpiled")]
    outdir: PathBuf,

    /// Drop test functions instead of emitting them under MYS_TEST.
    #[arg(long)]
    skip_tests: bool,

    /// Dump each module's extracted definitions as JSON to stdout.
    #[arg(long)]
    dump_definitions: bool,
}

fn module_name(package: &str, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lib".to_string());

    format!("{package}.{stem}")
}

fn read_sources(args: &Args) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for path in &args.sources {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        sources.push(
            Source::new(contents)
                .with_module(module_name(&args.package, path))
                .with_path(path.display().to_string()),
        );
    }

    Ok(sources)
}

fn dump_definitions(sources: &[Source]) -> Result<()> {
    for source in sources {
        let module = mys_core::ast::parse_module(&source.contents, &source.mys_path)
            .map_err(|err| anyhow::anyhow!("{err}"))?;
        let index = mys_core::ast::LineIndex::new(&source.contents);
        let defs = mys_core::definitions::extract_definitions(&module, &index)
            .map_err(|err| anyhow::anyhow!("{err}"))?;

        println!(
            "{}",
            serde_json::json!({
                "module": source.module,
                "definitions": defs.summary(),
            })
        );
    }

    Ok(())
}

fn run(args: &Args) -> Result<bool> {
    let sources = read_sources(args)?;

    if args.dump_definitions {
        dump_definitions(&sources)?;
    }

    let options = TranspileOptions {
        skip_tests: args.skip_tests,
    };

    let outputs = match transpile_with_options(&sources, options) {
        Ok(outputs) => outputs,
        Err(diagnostic) => {
            eprint!("{diagnostic}");
            return Ok(false);
        }
    };

    for output in &outputs {
        let header_path = args.outdir.join(output.header_path());
        let source_path = args.outdir.join(output.source_path());

        if let Some(parent) = header_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        fs::write(&header_path, &output.header)
            .with_context(|| format!("failed to write {}", header_path.display()))?;
        fs::write(&source_path, &output.source)
            .with_context(|| format!("failed to write {}", source_path.display()))?;

        info!(module = %output.module, "wrote artifacts");
    }

    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
