use crate::report::{run_import, run_list, run_score, ImportArgs, ListArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use surf_log::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Surf Log",
    about = "Score, import, list, and serve surf-session observations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the score card for a set of factor scores and suitability judgments
    Score(ScoreArgs),
    /// Normalize a (possibly legacy) CSV export and report rows that fail validation
    Import(ImportArgs),
    /// List records from the configured store, best sessions first unless sorted otherwise
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => {
            run_score(args);
            Ok(())
        }
        Command::Import(args) => run_import(args),
        Command::List(args) => run_list(args),
    }
}
