use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use lea_lib::commands::{self, Notification, Workspace};
use lea_lib::config::{ConfigLoader, ConfigMerger, PartialConfig};
use lea_lib::file_storage::FileStorage;
use lea_lib::{AnswerStatus, Catalog, DiscoveryMethod, MetadataPatch};

/// LEA - discovery coaching assistant
#[derive(Parser, Debug)]
#[command(name = "lea")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the engagement (overrides the config file)
    #[arg(long, global = true, env = "LEA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.lea/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a JSON export or Markdown notes file
    Import { file: PathBuf },
    /// Export the session as JSON
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the discovery summary
    Summary {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit the summary as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
    /// Show coverage by phase
    Coverage,
    /// Record findings for a question
    Answer {
        question: String,
        findings: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set a question's status (open or answered)
    Status { question: String, status: String },
    /// Toggle a discovery method on a question
    Method { question: String, method: String },
    /// Update engagement details
    Info {
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        coach: Option<String>,
        /// Engagement date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Manage saved versions
    #[command(subcommand)]
    Versions(VersionsCommand),
    /// Discard the current session (versions are kept)
    Reset,
}

#[derive(Subcommand, Debug)]
enum VersionsCommand {
    Save {
        #[arg(short, long)]
        label: Option<String>,
    },
    List,
    Load { number: u32 },
}

fn open_workspace(cli: &Cli) -> Result<Workspace> {
    let loader = match cli.config {
        Some(ref path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let file_config = loader.load().context("Failed to load configuration")?;

    let config = ConfigMerger::new()
        .with_file(file_config)
        .with_cli(Some(PartialConfig {
            data_dir: cli.data_dir.clone(),
            ..Default::default()
        }))
        .merge();

    let data_dir = config.resolved_data_dir();
    log::debug!("Using data directory: {}", data_dir.display());

    let storage = FileStorage::open(&data_dir)
        .with_context(|| format!("Failed to open data directory '{}'", data_dir.display()))?;

    Workspace::open(Catalog::standard(), Box::new(storage), config)
        .context("Failed to open engagement")
}

fn report(notification: Notification) -> Result<()> {
    if notification.is_success() {
        println!("{}", notification);
        Ok(())
    } else {
        bail!("{}", notification)
    }
}

fn write_output(output: Option<PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(&path, content)
            .with_context(|| format!("Failed to write '{}'", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut workspace = open_workspace(&cli)?;

    match cli.command {
        Command::Import { file } => {
            let bytes = fs::read(&file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            let name = file.to_string_lossy();
            report(commands::import_document(&mut workspace, &name, &bytes))
        }
        Command::Export { output } => {
            let (notification, text) = commands::export_document(&workspace);
            match text {
                Some(text) => {
                    write_output(output, &text)?;
                    eprintln!("{}", notification);
                    Ok(())
                }
                None => report(notification),
            }
        }
        Command::Summary { output, json } => {
            let (notification, summary) = commands::summarize(&workspace);
            let content = if json {
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            } else {
                summary.to_markdown()
            };
            write_output(output, &content)?;
            eprintln!("{}", notification);
            Ok(())
        }
        Command::Coverage => {
            let coverage = commands::coverage(&workspace);
            let catalog = workspace.store().catalog();
            println!(
                "{} of {} questions answered ({}%)",
                coverage.answered_questions, coverage.total_questions, coverage.coverage_percentage
            );
            for (phase, percent) in &coverage.phase_completion {
                println!("  Phase {} {:<24} {:>6}%", phase, catalog.phase_title(*phase), percent);
            }
            Ok(())
        }
        Command::Answer {
            question,
            findings,
            notes,
        } => report(commands::record_answer(
            &mut workspace,
            &question.to_lowercase(),
            &findings,
            notes.as_deref(),
        )),
        Command::Status { question, status } => {
            let status: AnswerStatus = status.parse().map_err(anyhow::Error::msg)?;
            report(commands::update_status(
                &mut workspace,
                &question.to_lowercase(),
                status,
            ))
        }
        Command::Method { question, method } => {
            let method: DiscoveryMethod = method.parse().map_err(anyhow::Error::msg)?;
            report(commands::toggle_method(
                &mut workspace,
                &question.to_lowercase(),
                method,
            ))
        }
        Command::Info {
            client,
            coach,
            date,
        } => {
            let engagement_date = date
                .map(|d| {
                    NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", d))
                })
                .transpose()?;
            let patch = MetadataPatch {
                client_name: client,
                coach_name: coach,
                engagement_date,
                last_modified: None,
            };
            report(commands::update_metadata(&mut workspace, patch))
        }
        Command::Versions(VersionsCommand::Save { label }) => {
            report(commands::save_version(&mut workspace, label.as_deref()))
        }
        Command::Versions(VersionsCommand::List) => {
            let versions = commands::list_versions(&workspace);
            if versions.is_empty() {
                println!("No saved versions");
            }
            for v in versions {
                println!(
                    "{:>3}  {}  {:>2} answered  {}{}",
                    v.version_number,
                    v.timestamp.format("%Y-%m-%d %H:%M"),
                    v.answered_count,
                    v.label.as_deref().unwrap_or("-"),
                    if v.client_name.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", v.client_name)
                    }
                );
            }
            Ok(())
        }
        Command::Versions(VersionsCommand::Load { number }) => {
            report(commands::load_version(&mut workspace, number))
        }
        Command::Reset => report(commands::reset_session(&mut workspace)),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
