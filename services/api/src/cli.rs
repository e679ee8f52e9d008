use crate::demo::{run_demo, run_grades, DemoArgs, GradesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use siakad::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "siakad",
    about = "Run the course enrollment service or explore its rules from the command line",
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
    /// Walk through enrollment, drop, and credit-limit checks against seeded data
    Demo(DemoArgs),
    /// Compute GPA, academic status, and credit ceiling for a transcript
    Grades(GradesArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::Grades(args) => run_grades(args),
    }
}
