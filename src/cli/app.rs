//! Main CLI application structure

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{project_cmd, query, settings, task};
use crate::domain::{calendar, Portfolio, Scale, Workdays};
use crate::storage::{Config, Workspace};

#[derive(Parser)]
#[command(name = "gantt")]
#[command(author, version, about = "Local-first Gantt planning from the command line")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Date to treat as today (YYYY-MM-DD)
    #[arg(long, global = true, env = "GANTT_TODAY", hide = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new gantt workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Seed with the demo portfolio
        #[arg(long)]
        sample: bool,

        /// Name of the first project
        #[arg(long, default_value = "My Project", conflicts_with = "sample")]
        name: String,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(project_cmd::ProjectCommands),

    /// Manage tasks and groups in the active project
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// List the visible rows of the active project
    List,

    /// Draw the timeline of the active project
    Gantt {
        /// Column width: day or week
        #[arg(long, short, default_value = "day")]
        scale: Scale,

        /// Start the chart at the first bar
        #[arg(long)]
        export: bool,
    },

    /// Show dependency arrows between visible rows
    Deps,

    /// Summarize the active project
    Dashboard,

    /// Export the visible rows as a table
    Export,

    /// Show or change the working week
    #[command(subcommand)]
    Workdays(settings::WorkdaysCommands),

    /// Manage users
    #[command(subcommand)]
    User(settings::UserCommands),
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()
            .map(|config| config.global.default_format.into())
            .unwrap_or_default(),
    };
    let output = Output::new(format);
    let today = cli.today.unwrap_or_else(calendar::today);

    tracing::debug!(%today, "gantt starting");

    match cli.command {
        Commands::Init { path, sample, name } => {
            tracing::debug!(%path, sample, "initializing workspace");
            let seed = if sample {
                Portfolio::sample(today)
            } else {
                Portfolio::with_project(&name, Workdays::default())?
            };
            let workspace = Workspace::init(&path, seed)?;
            output.success(&format!(
                "Initialized gantt workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Project(cmd) => project_cmd::run(cmd, &output)?,
        Commands::Task(cmd) => task::run(cmd, &output, today)?,

        Commands::List => query::list(&output)?,
        Commands::Gantt { scale, export } => query::gantt(&output, scale, today, export)?,
        Commands::Deps => query::deps(&output)?,
        Commands::Dashboard => query::dashboard(&output, today)?,
        Commands::Export => query::export(&output)?,

        Commands::Workdays(cmd) => settings::run_workdays(cmd, &output)?,
        Commands::User(cmd) => settings::run_user(cmd, &output)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scale_and_today() {
        let cli = Cli::try_parse_from([
            "gantt", "--today", "2024-06-03", "gantt", "--scale", "week",
        ])
        .unwrap();

        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 6, 3));
        assert!(matches!(
            cli.command,
            Commands::Gantt {
                scale: Scale::Week,
                export: false
            }
        ));
    }

    #[test]
    fn rejects_unknown_scale() {
        assert!(Cli::try_parse_from(["gantt", "gantt", "--scale", "month"]).is_err());
    }
}
