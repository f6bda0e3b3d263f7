mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::new::NewArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "story",
    about = "Scaffold story documents, keep their index tables in sync, and lint them",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .story/ or .git/)
    #[arg(long, global = true, env = "STORY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new story from the template and update the story indexes
    New(NewArgs),

    /// Lint a story file (exit 0 clean, 1 errors, 2 warnings only)
    Lint {
        /// Path to the story markdown file
        path: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::New(args) => cmd::new::run(&root, args, cli.json).map(|()| 0),
        Commands::Lint { path, strict } => cmd::lint::run(&root, &path, strict, cli.json),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
