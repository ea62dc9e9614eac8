mod analytics;
mod assistant;
mod auth;
mod config;
mod display;
mod filter;
mod metrics;
mod models;
mod store;
mod tracker;
mod tui;

use anyhow::{Context, Result};
use auth::{Gate, IdentityProvider, LocalIdentity};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use display::{format_change, relative_time, truncate};
use models::{ApplicationInput, ApplicationRecord, Status, StatusFilter};
use std::path::{Path, PathBuf};
use store::KvStore;
use tracing_subscriber::EnvFilter;
use tracker::Tracker;

#[derive(Parser)]
#[command(name = "jobtrack", version)]
#[command(about = "Job application tracker - record applications and watch your progress")]
struct Cli {
    /// Custom data directory (default: platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the application store
    Init,

    /// Record a new application
    Add {
        /// Company name
        company: String,

        /// Position title
        position: String,

        /// Status (applied, interviewing, offer, rejected, saved)
        #[arg(short, long, default_value = "applied")]
        status: Status,

        /// Link to the job posting
        #[arg(short, long)]
        link: Option<String>,
    },

    /// Edit an application (resets its application date to now)
    Edit {
        /// Application ID
        id: String,

        /// New company name
        #[arg(long)]
        company: Option<String>,

        /// New position title
        #[arg(long)]
        position: Option<String>,

        /// New status
        #[arg(short, long)]
        status: Option<Status>,

        /// New link (pass an empty string to clear it)
        #[arg(short, long)]
        link: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },

    /// List applications
    List {
        /// Filter by status (all, applied, interviewing, offer, rejected, saved)
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,

        /// Search company and position
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show application details
    Show {
        /// Application ID
        id: String,
    },

    /// Show headline stats, recent applications and upcoming interviews
    Dashboard {
        /// Search company, position or status
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stats with applications per month and per status
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load sample applications into an empty store
    Seed,

    /// Browse applications interactively
    Browse {
        /// Initial status filter
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },

    /// Resume assistant
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },
}

#[derive(Subcommand)]
enum ResumeCommands {
    /// Analyze a resume against a job description
    Analyze {
        /// Resume file (pdf, doc, docx, txt, md)
        resume: PathBuf,

        /// Job description file
        job: PathBuf,
    },

    /// Draft a cover letter for a job description
    CoverLetter {
        /// Resume file (pdf, doc, docx, txt, md)
        resume: PathBuf,

        /// Job description file
        job: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "info" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match LocalIdentity.session().gate() {
        Gate::Allow => {}
        Gate::Pending => {
            eprintln!("Still checking your session, try again in a moment.");
            std::process::exit(1);
        }
        Gate::Redirect => {
            eprintln!("Authentication required. Please sign in to continue.");
            std::process::exit(1);
        }
    }

    let store_path = config::store_path(cli.data_dir.as_ref());
    tracing::debug!(path = %store_path.display(), "opening store");
    let store = KvStore::open(&store_path)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?;

    let mut tracker = Tracker::load(store);

    match cli.command {
        Commands::Init => {
            println!("Store initialized at {}", store_path.display());
        }

        Commands::Add {
            company,
            position,
            status,
            link,
        } => {
            let input = ApplicationInput::new(&company, &position, status, link.as_deref())?;
            let added = tracker.add(input, &Local::now())?;
            println!("Added application {} ({} at {})", added.id, added.position, added.company);
        }

        Commands::Edit {
            id,
            company,
            position,
            status,
            link,
        } => {
            let existing = tracker
                .get(&id)
                .with_context(|| format!("Application {} not found", id))?;
            let input = ApplicationInput::new(
                company.as_deref().unwrap_or(&existing.company),
                position.as_deref().unwrap_or(&existing.position),
                status.unwrap_or(existing.status),
                link.as_deref().or(existing.link.as_deref()),
            )?;
            let updated = tracker.update(&id, input, &Local::now())?;
            println!("Updated application {} ({})", updated.id, updated.status.label());
        }

        Commands::Delete { id } => {
            let removed = tracker.remove(&id)?;
            println!("Deleted application {} ({} at {})", removed.id, removed.position, removed.company);
        }

        Commands::List { status, search, json } => {
            let view = tracker.applications(status, &search);
            if json {
                println!("{}", serde_json::to_string_pretty(&view.records)?);
            } else {
                let chips: Vec<String> = std::iter::once(StatusFilter::All)
                    .chain(Status::ALL.into_iter().map(StatusFilter::Only))
                    .map(|f| format!("{} ({})", f.label(), view.counts.get(f)))
                    .collect();
                println!("{}\n", chips.join("  "));

                if view.records.is_empty() {
                    if search.is_empty() && status == StatusFilter::All {
                        println!("No applications found. Add your first job application to get started.");
                    } else {
                        println!("No applications found. Try changing your search or filter criteria.");
                    }
                } else {
                    print_table(&view.records);
                }
            }
        }

        Commands::Show { id } => match tracker.get(&id) {
            Some(app) => {
                println!("Application {}", app.id);
                println!("Position: {}", app.position);
                println!("Company: {}", app.company);
                println!("Status: {}", app.status.label());
                println!(
                    "Applied: {} ({})",
                    app.date_applied.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    relative_time(app.date_applied, Utc::now())
                );
                if let Some(link) = &app.link {
                    println!("Link: {}", link);
                }
                if let Some(logo) = &app.logo {
                    println!("Logo: {}", logo);
                }
            }
            None => {
                println!("Application {} not found.", id);
            }
        },

        Commands::Dashboard { search, json } => {
            let view = tracker.dashboard(&search, &Local::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_stats(&view.metrics);

                println!("\nRecent Applications");
                println!("{}", "-".repeat(19));
                if view.recent.is_empty() {
                    println!("No applications found. Start tracking your job applications!");
                } else {
                    print_table(&view.recent);
                }

                println!("\nApplications by Status");
                println!("{}", "-".repeat(22));
                for (status, count) in &view.breakdown {
                    println!("  {:<14} {:>4}", status.label(), count);
                }

                println!("\nUpcoming Interviews");
                println!("{}", "-".repeat(19));
                if view.interviews.is_empty() {
                    println!("No upcoming interviews");
                } else {
                    for activity in &view.interviews {
                        println!(
                            "  {} - {} ({})",
                            activity.title,
                            activity.company,
                            activity.date.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                        );
                        println!("    {}", activity.description);
                    }
                }
            }
        }

        Commands::Analytics { json } => {
            let view = tracker.analytics(&Local::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_stats(&view.metrics);

                println!("\nApplications Over Time");
                println!("{}", "-".repeat(22));
                if view.monthly.is_empty() {
                    println!("No applications yet.");
                } else {
                    println!("  {:<10} {:>12} {:>11}", "MONTH", "APPLICATIONS", "INTERVIEWS");
                    for month in &view.monthly {
                        println!("  {:<10} {:>12} {:>11}", month.label(), month.applications, month.interviews);
                    }
                }

                println!("\nApplication Status");
                println!("{}", "-".repeat(18));
                let max = view.breakdown.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
                for (status, count) in &view.breakdown {
                    let bar = "#".repeat(count * 30 / max);
                    println!("  {:<14} {:>4} {}", status.label(), count, bar);
                }
            }
        }

        Commands::Seed => {
            let count = tracker.seed_demo(&Local::now())?;
            println!("Seeded {} sample applications.", count);
        }

        Commands::Browse { status } => {
            tui::run_browse(&mut tracker, status)?;
        }

        Commands::Resume { command } => match command {
            ResumeCommands::Analyze { resume, job } => {
                let (resume, job) = read_assistant_inputs(&resume, &job)?;
                println!("{}", assistant::analyze_resume(&resume, &job)?);
            }

            ResumeCommands::CoverLetter { resume, job, output } => {
                let (resume, job) = read_assistant_inputs(&resume, &job)?;
                let letter = assistant::generate_cover_letter(&resume, &job)?;
                if let Some(out_path) = output {
                    std::fs::write(&out_path, &letter)
                        .with_context(|| format!("Failed to write to {}", out_path.display()))?;
                    println!("Cover letter saved to: {}", out_path.display());
                } else {
                    println!("{}", letter);
                }
            }
        },
    }

    Ok(())
}

fn read_assistant_inputs(resume: &Path, job: &Path) -> Result<(String, String)> {
    let resume = assistant::read_resume(resume)?;
    let job = std::fs::read_to_string(job)
        .with_context(|| format!("Failed to read job description: {}", job.display()))?;
    Ok((resume, job))
}

fn print_table(records: &[ApplicationRecord]) {
    let now = Utc::now();
    println!(
        "{:<15} {:<13} {:<28} {:<20} {:<16}",
        "ID", "STATUS", "POSITION", "COMPANY", "APPLIED"
    );
    println!("{}", "-".repeat(94));
    for app in records {
        println!(
            "{:<15} {:<13} {:<28} {:<20} {:<16}",
            truncate(&app.id, 15),
            app.status.label(),
            truncate(&app.position, 26),
            truncate(&app.company, 18),
            relative_time(app.date_applied, now)
        );
    }
}

fn print_stats(metrics: &metrics::MetricsSnapshot) {
    let current = &metrics.current;
    let changes = metrics.changes();
    let rows = [
        ("Total Applications", current.total_applications.to_string(), changes.total_applications),
        ("In Progress", current.in_progress.to_string(), changes.in_progress),
        ("Success Rate", format!("{:.1}%", current.success_rate), changes.success_rate),
        ("Rejection Rate", format!("{:.1}%", current.rejection_rate), changes.rejection_rate),
    ];
    for (title, value, change) in rows {
        println!("{:<20} {:>8}   {}", title, value, format_change(change));
    }
}
