pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use commands::{quote::QuoteArgs, seed::SeedArgs, CommandResult};

#[derive(Debug, Parser)]
#[command(
    name = "jesprec",
    about = "Jesprec studio operator CLI",
    long_about = "Inspect configuration, check gateway readiness, load the starter catalog, and run the quote wizard from the terminal.",
    after_help = "Examples:\n  jesprec doctor --json\n  jesprec config\n  jesprec seed --email studio@jesprec.com --password ****\n  jesprec quote --route digital --set tech=\"Custom React Web\" --budget standard --timeline asap --name \"Ada Obi\" --email ada@example.com"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, the fast-track link and gateway reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Load the studio's starter catalog into the gateway (idempotent)")]
    Seed {
        #[arg(long, help = "Admin email used to sign in before writing")]
        email: Option<String>,
        #[arg(long, requires = "email", help = "Admin password used to sign in before writing")]
        password: Option<String>,
    },
    #[command(about = "Submit a quote request non-interactively and print the fast-track link")]
    Quote(QuoteCommand),
}

#[derive(Debug, Args)]
struct QuoteCommand {
    #[arg(long, help = "media | digital | social | art")]
    route: String,
    #[arg(long = "set", value_name = "KEY=VALUE", help = "Answer a deep-dive field (repeatable)")]
    specifics: Vec<String>,
    #[arg(long, default_value = "", help = "entry | standard | premium | flagship, or the exact label")]
    budget: String,
    #[arg(long, default_value = "", help = "asap | month | later, or the exact label")]
    timeline: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, help = "Also store the request in the leads table")]
    persist: bool,
}

impl From<QuoteCommand> for QuoteArgs {
    fn from(command: QuoteCommand) -> Self {
        Self {
            route: command.route,
            specifics: command.specifics,
            budget: command.budget,
            timeline: command.timeline,
            name: command.name,
            email: command.email,
            persist: command.persist,
        }
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(tracing::Level::WARN)
        .compact()
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Config => CommandResult { exit_code: 0, output: commands::config::run() },
        Command::Doctor { json } => {
            CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Seed { email, password } => commands::seed::run(&SeedArgs { email, password }),
        Command::Quote(command) => commands::quote::run(&command.into()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
