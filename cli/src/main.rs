//! `cbwg`: context-based wordlist generator.
//!
//! Applies hashcat-style rules to every word of a seed corpus and writes
//! the filtered, deduplicated candidates one per line. With
//! `--ai-response`, a saved LLM wordlist response is emitted through the
//! same filter and dedup instead.

mod logging;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cbwg_generator::{
    load_yaml, parse_wordlist_response, CandidateFilter, CandidateSink, EngineConfig, FileSource,
    FilterConfig, GenerationStats, Generator, LineSink, RuleSet, SourceConfig,
};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "cbwg",
    version,
    about = "Generate a wordlist by applying hashcat-style rules to a seed corpus",
    after_help = "Command-line values override values from the YAML config files."
)]
struct Cli {
    /// Seed corpus files.
    #[arg(
        short = 'p',
        long = "input",
        value_name = "FILE",
        num_args = 1..,
        required_unless_present = "ai_response"
    )]
    inputs: Vec<PathBuf>,

    /// Rule file, or directory of `*.rule` files.
    #[arg(short, long, value_name = "PATH", env = "HASHCAT_RULES_PATH")]
    rules: Option<PathBuf>,

    /// Inline rule, applied after file rules. Repeatable.
    #[arg(long = "rule", value_name = "RULE")]
    inline_rules: Vec<String>,

    /// Word source settings (YAML).
    #[arg(long, value_name = "YAML")]
    source_config: Option<PathBuf>,

    /// Candidate filter settings (YAML).
    #[arg(long, value_name = "YAML", alias = "parser-config")]
    filter_config: Option<PathBuf>,

    /// Rule engine settings (YAML).
    #[arg(long, value_name = "YAML", alias = "trans-engine-config")]
    engine_config: Option<PathBuf>,

    /// Emit the wordlist from a saved LLM response instead of running rules.
    #[arg(long, value_name = "FILE")]
    ai_response: Option<PathBuf>,

    /// Output file. Standard output when omitted or `-`.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Worker threads.
    #[arg(short = 'j', long, value_name = "N")]
    workers: Option<usize>,

    /// Verbose diagnostics on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let engine = engine_config(&cli)?;
    logging::init(engine.verbose_logging);

    let filter_config: FilterConfig = load_optional(cli.filter_config.as_deref())?;
    let filter = CandidateFilter::new(&filter_config).context("invalid filter config")?;

    if let Some(response) = &cli.ai_response {
        let text = fs::read_to_string(response)
            .with_context(|| format!("cannot read AI response {}", response.display()))?;
        let words = parse_wordlist_response(&text)
            .with_context(|| format!("cannot parse AI response {}", response.display()))?;
        let generator = Generator::new(RuleSet::default(), filter, &engine)?;
        let stats = with_sink(cli.output.as_deref(), |sink| {
            Ok(generator.emit_direct(words, sink)?)
        })?;
        report(&stats);
        return Ok(());
    }

    // Rules and seed paths are checked before the output file exists.
    let rules = RuleSet::load(&engine)?;
    let generator = Generator::new(rules, filter, &engine)?;

    let source_config: SourceConfig = load_optional(cli.source_config.as_deref())?;
    let source = FileSource::new(cli.inputs.clone(), source_config)?;
    info!(
        seeds = cli.inputs.len(),
        workers = generator.workers(),
        "inputs checked"
    );

    let stats = with_sink(cli.output.as_deref(), |sink| {
        Ok(generator.run(&source, sink)?)
    })?;
    report(&stats);
    Ok(())
}

/// The engine config file, overridden by command-line flags.
fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut engine: EngineConfig = load_optional(cli.engine_config.as_deref())?;
    if let Some(path) = &cli.rules {
        engine.rules_path = Some(path.clone());
    }
    engine.rules.extend(cli.inline_rules.iter().cloned());
    if cli.workers.is_some() {
        engine.workers = cli.workers;
    }
    engine.verbose_logging |= cli.verbose;
    engine.validate()?;
    Ok(engine)
}

fn load_optional<T>(path: Option<&Path>) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    path.map_or_else(|| Ok(T::default()), |path| Ok(load_yaml(path)?))
}

/// Run `f` against stdout or a freshly created output file.
fn with_sink<F>(output: Option<&Path>, f: F) -> Result<GenerationStats>
where
    F: FnOnce(&mut dyn CandidateSink) -> Result<GenerationStats>,
{
    match output {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)
                .with_context(|| format!("cannot create output {}", path.display()))?;
            let mut sink = LineSink::new(file);
            let stats = f(&mut sink)?;
            sink.into_inner()
                .with_context(|| format!("cannot write output {}", path.display()))?;
            Ok(stats)
        }
        _ => {
            let mut sink = LineSink::new(io::stdout());
            f(&mut sink)
        }
    }
}

fn report(stats: &GenerationStats) {
    info!(
        words = stats.words,
        emitted = stats.emitted,
        rejected = stats.rejected,
        filtered = stats.filtered,
        duplicates = stats.duplicates,
        "done"
    );
}
