use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use groundwork::{app, AppError, CommandOptions, ProjectResult};

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(version)]
#[command(
    about = "Run terraform plan/apply for a pull request, with project locking",
    long_about = None
)]
struct Cli {
    /// Path to the server config file.
    #[arg(short, long, default_value = "groundwork.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
    /// Repository full name, e.g. octo/infra
    #[arg(short, long)]
    repo: String,
    /// Pull request number
    #[arg(short, long)]
    pull: u64,
    /// Branch the pull request wants merged
    #[arg(long)]
    head_branch: String,
    /// Branch the pull request merges into
    #[arg(long, default_value = "main")]
    base_branch: String,
    /// Project directory relative to the repo root
    #[arg(short, long, default_value = ".")]
    dir: String,
    /// Terraform workspace
    #[arg(short, long, default_value = "default")]
    workspace: String,
    /// User requesting the command
    #[arg(short, long, default_value = "")]
    user: String,
    /// Named workflow from the server config
    #[arg(long)]
    workflow: Option<String>,
    /// Require pull-request approval before apply
    #[arg(long)]
    require_approval: bool,
    /// Merge the latest base branch into the checkout first
    #[arg(long)]
    rebase: bool,
}

impl ProjectArgs {
    fn into_options(self) -> CommandOptions {
        CommandOptions {
            repo: self.repo,
            pull: self.pull,
            head_branch: self.head_branch,
            base_branch: self.base_branch,
            dir: self.dir,
            workspace: self.workspace,
            user: self.user,
            workflow: self.workflow,
            require_approval: self.require_approval,
            rebase: self.rebase,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run terraform plan for a project and hold its lock
    Plan(ProjectArgs),
    /// Run terraform apply for a previously planned project
    Apply(ProjectArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result: Result<ProjectResult, AppError> = match cli.command {
        Commands::Plan(args) => groundwork::plan(&cli.config, &args.into_options()),
        Commands::Apply(args) => groundwork::apply(&cli.config, &args.into_options()),
    };

    match result {
        Ok(project_result) => {
            println!("{}", app::render(&project_result));
            if project_result.is_error() || project_result.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
