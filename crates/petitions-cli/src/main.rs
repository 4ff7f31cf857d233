#![forbid(unsafe_code)]

mod client;
mod cmd;
mod context;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use context::Context;
use output::OutputMode;
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pt: citizen petition tracker client",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Service base URL (overrides config.toml and PETITIONS_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Session",
        about = "Sign in and store the session",
        long_about = "Exchange email and password for a session token and store it under the petitions home directory.",
        after_help = "EXAMPLES:\n    # Read the password from a file\n    pt login --email casey@example.org --password-stdin < pw.txt\n\n    # Password from the environment\n    PETITIONS_PASSWORD=secret pt login --email ari@city.gov"
    )]
    Login(cmd::login::LoginArgs),

    #[command(
        next_help_heading = "Session",
        about = "Remove the stored session",
        after_help = "EXAMPLES:\n    pt logout"
    )]
    Logout,

    #[command(
        next_help_heading = "Session",
        about = "Show the signed-in user",
        after_help = "EXAMPLES:\n    pt whoami\n\n    # Emit machine-readable output\n    pt whoami --json"
    )]
    Whoami,

    #[command(
        next_help_heading = "Views",
        about = "Show role-specific statistics",
        long_about = "Show the dashboard for the signed-in role: own petitions for citizens, totals and department distribution for admins, department workload for officers.",
        after_help = "EXAMPLES:\n    pt dashboard\n\n    # Tab-separated counts for scripts\n    pt dashboard --format text"
    )]
    Dashboard,

    #[command(
        next_help_heading = "Views",
        about = "List petitions",
        long_about = "List petitions, optionally filtered by status, department, and free-text search. Only the filters given are sent to the service.",
        after_help = "EXAMPLES:\n    # Everything visible to you\n    pt list\n\n    # Open transport petitions mentioning potholes\n    pt list --status assigned --department transport --search pothole"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Views",
        about = "Show one petition with its history",
        after_help = "EXAMPLES:\n    pt show 64f1c2\n\n    pt show 64f1c2 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Workflow",
        about = "File a new petition (citizens)",
        long_about = "File a new petition. Only citizens may file. With --follow, the petition list is shown after the configured redirect delay.",
        after_help = "EXAMPLES:\n    pt create --title \"Pothole on Main St\" --description \"Large pothole causing damage\"\n\n    # Show the list afterwards\n    pt create -t \"Streetlight out\" -d \"Corner of 5th and Elm\" --follow"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Workflow",
        about = "Update a petition's status (officers)",
        long_about = "Update the status of a petition assigned to your department and record remarks in its history.",
        after_help = "EXAMPLES:\n    pt status 64f1c2 under_review --remarks \"Inspection scheduled\"\n\n    pt status 64f1c2 resolved -r \"Repaired\""
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Workflow",
        about = "Assign a petition to a department (admins)",
        long_about = "Assign a petition to a department. The service sets its status to assigned, so petitions already under review or resolved are refused.",
        after_help = "EXAMPLES:\n    pt assign 64f1c2 health"
    )]
    Assign(cmd::assign::AssignArgs),

    #[command(
        next_help_heading = "Reference",
        about = "Show the route table and guard decisions",
        after_help = "EXAMPLES:\n    pt routes\n\n    # Would the current session reach the create form?\n    pt routes /petitions/create"
    )]
    Routes(cmd::routes::RoutesArgs),

    #[command(
        next_help_heading = "Reference",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    pt completions bash > ~/.local/share/bash-completion/completions/pt"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PETITIONS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "petitions=debug,info"
        } else {
            "petitions=info,warn"
        })
    });

    let format = env::var("PETITIONS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(api_url = ?cli.api_url, verbose = cli.verbose, "starting");

    let output = cli.output_mode();

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = Context::load(cli.api_url.as_deref(), output)?;
    match &cli.command {
        Commands::Login(args) => cmd::login::run_login(args, &ctx),
        Commands::Logout => cmd::logout::run_logout(&ctx),
        Commands::Whoami => cmd::whoami::run_whoami(&ctx),
        Commands::Dashboard => cmd::dashboard::run_dashboard(&ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Create(args) => cmd::create::run_create(args, &ctx),
        Commands::Status(args) => cmd::status::run_status(args, &ctx),
        Commands::Assign(args) => cmd::assign::run_assign(args, &ctx),
        Commands::Routes(args) => cmd::routes::run_routes(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
