use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use strand_errors::Renderer;
use strand_replay::{ReplayedModel, Script};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Options {
    /// Log builder activity: `-v` for debug, `-vv` for trace.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replays SCRIPT over SOURCE and prints the node model.
    Dump {
        source: Utf8PathBuf,
        script: Utf8PathBuf,
        /// Include hidden leaves.
        #[arg(long)]
        hidden: bool,
    },
    /// Replays SCRIPT over SOURCE and reports its syntax errors.
    Check { source: Utf8PathBuf, script: Utf8PathBuf },
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();
    init_logging(options.verbose);

    match options.command {
        Command::Dump { source, script, hidden } => {
            let (_, model) = load(&source, &script)?;
            print!("{}", model.root().compact_dump(hidden));
            Ok(())
        }
        Command::Check { source, script } => {
            let (text, model) = load(&source, &script)?;
            let renderer = Renderer::styled();

            let diagnostics = model.diagnostics();
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic.render(&renderer, source.as_str(), &text));
            }
            if !diagnostics.is_empty() {
                anyhow::bail!("`{source}` has {} syntax error(s)", diagnostics.len());
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &Utf8Path, script: &Utf8Path) -> anyhow::Result<(String, ReplayedModel)> {
    let text =
        std::fs::read_to_string(source).with_context(|| format!("failed to read `{source}`"))?;
    let json =
        std::fs::read_to_string(script).with_context(|| format!("failed to read `{script}`"))?;

    let model = Script::from_json(&json)
        .and_then(|calls| calls.replay(&text))
        .with_context(|| format!("failed to replay `{script}` over `{source}`"))?;
    model.check_invariants().context("replayed node model is inconsistent")?;
    Ok((text, model))
}
