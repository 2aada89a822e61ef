use clap::{Args, Parser, Subcommand};

use crate::demo::{run_analyze, run_demo, AnalyzeCommand, DemoArgs};
use crate::error::AppError;
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "CurbCheck",
    about = "Score used vehicles for longevity, reliability, and price from the command line",
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
    /// Analyze a single vehicle and print the report
    Analyze {
        #[command(subcommand)]
        command: AnalyzeCommand,
    },
    /// Run a canned end-to-end demo over the bundled sample vehicles
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
        Command::Analyze { command } => run_analyze(command).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
