use crate::demo::{run_demo, run_refresh, run_report, DemoArgs, RefreshArgs, ReportArgs};
use crate::server;
use batch_quality::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Batch Quality Service",
    about = "Score, grade, and track the lifecycle status of pharmaceutical batches",
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
    /// Import a batch CSV export and print the quality dashboard
    Report(ReportArgs),
    /// Import a batch CSV export and re-derive statuses as of a later date
    Refresh(RefreshArgs),
    /// Run an end-to-end demo over a built-in sample dataset
    Demo(DemoArgs),
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
        Command::Report(args) => run_report(args),
        Command::Refresh(args) => run_refresh(args),
        Command::Demo(args) => run_demo(args),
    }
}
