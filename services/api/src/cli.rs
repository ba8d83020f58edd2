use crate::demo::{run_book, run_vet_listing, BookArgs, VetListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use petclinic::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Pet Clinic",
    about = "Run the pet clinic booking service or exercise it from the command line",
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
    /// Inspect the vet directory
    Vets {
        #[command(subcommand)]
        command: VetsCommand,
    },
    /// Book a visit against the sample clinic and print the outcome
    Book(BookArgs),
}

#[derive(Subcommand, Debug)]
enum VetsCommand {
    /// List vets with their specialties
    List(VetListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Start with empty stores instead of the sample clinic
    #[arg(long)]
    pub(crate) no_seed: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Vets {
            command: VetsCommand::List(args),
        } => run_vet_listing(args),
        Command::Book(args) => run_book(args),
    }
}
