use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gag", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a command and write the recorded canvas calls as JSON.
    Run(RunArgs),
    /// List the commands a document defines.
    List(DocArgs),
    /// Load a document and check that every name resolves.
    Check(DocArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input command document (JSON).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Command to execute.
    #[arg(long)]
    command: String,

    /// Interpreter configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Strict grammar and abort on the first failed canvas call.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Output path for the recorded calls; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DocArgs {
    /// Input command document (JSON).
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::List(args) => cmd_list(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => gag::InterpreterConfig::from_path(path)?,
        None => gag::InterpreterConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.strict {
        config.grammar = gag::GrammarMode::Strict;
        config.dispatch = gag::DispatchPolicy::Strict;
    }

    let table = gag::CommandTable::from_path(&args.in_path, &config)?;
    let mut interp = gag::Interpreter::with_config(table, config);
    let mut canvas = gag::RecordingCanvas::new();
    let report = interp.execute(&args.command, &mut canvas)?;

    let json = serde_json::to_string_pretty(canvas.calls()).context("serialize canvas calls")?;
    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json + "\n")
                .with_context(|| format!("write calls '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write calls to stdout")?;
        }
    }

    eprintln!(
        "{}: {} effects dispatched, {} failed",
        args.command,
        report.dispatched,
        report.failures.len()
    );
    Ok(())
}

fn cmd_list(args: DocArgs) -> anyhow::Result<()> {
    let table = gag::CommandTable::from_path(&args.in_path, &gag::InterpreterConfig::default())?;
    let mut stdout = std::io::stdout().lock();
    for name in table.names() {
        writeln!(stdout, "{name}").context("write command list")?;
    }
    Ok(())
}

fn cmd_check(args: DocArgs) -> anyhow::Result<()> {
    let table = gag::CommandTable::from_path(&args.in_path, &gag::InterpreterConfig::default())?;
    table
        .validate()
        .with_context(|| format!("validate '{}'", args.in_path.display()))?;
    eprintln!("ok: {} commands", table.len());
    Ok(())
}
