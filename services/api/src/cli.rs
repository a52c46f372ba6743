use crate::demo::{run_commission_quote, run_demo, CommissionQuoteArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hireflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Hireflow",
    about = "Run and demonstrate the recruitment placement service from the command line",
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
    /// Inspect commission splits without touching any listing
    Commission {
        #[command(subcommand)]
        command: CommissionCommand,
    },
    /// Walk a candidate from submission to hire, including a blocked duplicate
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CommissionCommand {
    /// Quote the recruiter and platform split for a set of terms
    Quote(CommissionQuoteArgs),
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
        Command::Commission {
            command: CommissionCommand::Quote(args),
        } => run_commission_quote(args),
        Command::Demo(args) => run_demo(args),
    }
}
