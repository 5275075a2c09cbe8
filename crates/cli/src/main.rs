use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use flowlane_process::{layout_snapshot, Direction, LayoutConfig, ProcessSnapshot};
use tracing::{debug, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Lay out a process graph into swimlanes
///
/// Reads a JSON snapshot with `nodes`, `edges` and `lanes`, writes the laid
/// out graph as JSON to stdout.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Snapshot file, or `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Flow direction, LR or TB
    #[arg(short, long, default_value = "LR")]
    direction: Direction,

    /// Layout settings in RON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

fn read_input(path: &Path) -> Result<String> {
    let mut source = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading snapshot from stdin")?;
    } else {
        source = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
    }
    Ok(source)
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    LayoutConfig::from_ron(&source).with_context(|| format!("parsing config {}", path.display()))
}

fn run(args: &Args) -> Result<String> {
    let config = load_config(args.config.as_deref())?;
    let source = read_input(&args.input)?;
    let snapshot: ProcessSnapshot =
        serde_json::from_str(&source).context("parsing snapshot JSON")?;
    debug!(
        "Snapshot has {} nodes, {} edges, {} lanes",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        snapshot.lanes.len()
    );

    let result = layout_snapshot(&snapshot, args.direction, &config);
    if let Some(err) = &result.fallback {
        warn!("Layout failed, emitting input positions: {err}");
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let output = run(&args)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
