use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "slidewright")]
#[command(about = "Slidewright CLI - compose Google Slides decks the way an agent would", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Use an in-memory document service instead of Google Slides
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print progress events on stdout while commands run
    #[arg(long, global = true)]
    pub progress: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration directory (defaults to ~/.config/slidewright)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a complete deck for a company
    Build {
        /// Company name
        company: String,
    },
    /// Append one slide to an existing deck
    AddSlide {
        #[arg(long)]
        document_id: String,
        #[arg(long)]
        title: String,
        /// Body text; use \n between bullet lines
        #[arg(long)]
        content: String,
        /// Paragraph or Bullet
        #[arg(long, default_value = "Paragraph")]
        style: String,
    },
    /// Look up a row in a CSV file
    Extract {
        #[arg(long, value_name = "PATH")]
        csv: PathBuf,
        /// Column to match against (defaults to the first column)
        #[arg(long)]
        key_column: Option<String>,
        key: String,
    },
    /// Print the tool definitions offered to an agent
    Tools,
    /// Call a tool with JSON arguments, as an agent would
    Call {
        tool: String,
        /// Arguments as a JSON object
        args: String,
        /// CSV file backing extract_record
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Tools = cli.command {
        return commands::tools::list();
    }

    let runtime = commands::runtime::Runtime::start(&cli.global)?;

    let outcome = match cli.command {
        Commands::Build { company } => commands::build::run(&runtime, &company).await,
        Commands::AddSlide {
            document_id,
            title,
            content,
            style,
        } => commands::add_slide::run(&runtime, &document_id, &title, &content, &style).await,
        Commands::Extract {
            csv,
            key_column,
            key,
        } => commands::extract::run(csv, key_column, &key).await,
        Commands::Call { tool, args, csv } => {
            commands::tools::call(&runtime, &tool, &args, csv).await
        }
        Commands::Tools => Ok(()),
    };

    runtime.finish().await?;
    outcome
}
