//! Command-line driver: reads a declaration snapshot, runs one generation
//! pass, and writes the two generated source units to disk.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use metrics_gen::diagnostics::DiagnosticBag;
use metrics_gen::symbols::Compilation;
use metrics_gen::{CancellationToken, GenerationOutcome, generate};
use std::fs;
use std::process::ExitCode;

const LOG_TARGET: &str = "cli";

const INSTRUMENTS_FILE: &str = "Metrics.g.cs";
const FACTORIES_FILE: &str = "MetricFactories.g.cs";

#[derive(Debug, Parser)]
#[command(name = "metrics-gen", version)]
#[command(about = "Generates strongly-typed metric recording code from a declaration snapshot", long_about = None)]
struct Cli {
    /// Path to the declaration snapshot JSON produced by the host compiler
    #[arg(value_name = "SNAPSHOT")]
    input: Utf8PathBuf,

    /// Directory the generated source files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: Utf8PathBuf,

    /// Validate and report diagnostics without writing any files
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(&Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading declaration snapshot '{}'", cli.input))?;
    let compilation: Compilation = serde_json::from_str(&text)
        .with_context(|| format!("parsing declaration snapshot '{}'", cli.input))?;
    log::debug!(target: LOG_TARGET, "snapshot holds {} type declarations", compilation.types.len());

    let mut bag = DiagnosticBag::new();
    let cancel = CancellationToken::new();
    let outcome = generate(&compilation, &cancel, &mut bag);

    for diagnostic in bag.iter() {
        eprintln!("{diagnostic}");
    }

    let source = match outcome {
        GenerationOutcome::Complete(source) => source,
        GenerationOutcome::MeterApiUnavailable => {
            log::debug!(target: LOG_TARGET, "metrics API not referenced, nothing to generate");
            return Ok(ExitCode::SUCCESS);
        }
        GenerationOutcome::Cancelled => anyhow::bail!("generation was cancelled"),
    };

    if !cli.check {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("creating output directory '{}'", cli.out_dir))?;
        let instruments_path = cli.out_dir.join(INSTRUMENTS_FILE);
        fs::write(&instruments_path, &source.instruments)
            .with_context(|| format!("writing '{instruments_path}'"))?;
        let factories_path = cli.out_dir.join(FACTORIES_FILE);
        fs::write(&factories_path, &source.factories)
            .with_context(|| format!("writing '{factories_path}'"))?;
    }

    if bag.error_count() > 0 { Ok(ExitCode::FAILURE) } else { Ok(ExitCode::SUCCESS) }
}
