//! Command line front-end for Scriptorium libraries
//!
//! Commands:
//! - `list`: projects in the library
//! - `create` / `delete`: project lifecycle
//! - `outline` / `export`: manuscript structure and HTML
//! - `migrate`: upgrade an outdated project descriptor
//! - `history`: commits of a project

use anyhow::{anyhow, bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scriptorium_project::{Library, Project, ProjectStatus, ScriptoriumConfig};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Build the command definition
#[must_use]
pub fn cli() -> Command {
    let project_arg = || {
        Arg::new("project")
            .required(true)
            .help("Project identifier (its directory name)")
    };
    let json_arg = || {
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output as JSON")
    };

    Command::new("scriptorium")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage Scriptorium manuscript projects")
        .subcommand_required(true)
        .arg(
            Arg::new("library")
                .long("library")
                .short('l')
                .global(true)
                .default_value("library")
                .value_parser(value_parser!(PathBuf))
                .help("Library folder holding one project per subdirectory"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(Command::new("list").about("List projects").arg(json_arg()))
        .subcommand(
            Command::new("create")
                .about("Create a project with its root manuscript")
                .arg(Arg::new("title").required(true).help("Project title"))
                .arg(
                    Arg::new("synopsis")
                        .long("synopsis")
                        .default_value("")
                        .help("Manuscript synopsis"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a project and its directory")
                .arg(project_arg()),
        )
        .subcommand(
            Command::new("outline")
                .about("Show the manuscript tree")
                .arg(project_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Render the manuscript as HTML")
                .arg(project_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("migrate")
                .about("Upgrade a project to the current descriptor format")
                .arg(project_arg()),
        )
        .subcommand(
            Command::new("history")
                .about("Show the commit history of a project")
                .arg(project_arg()),
        )
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins; otherwise `info`, or `debug` when verbose.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a subscriber may already be installed by an embedding test
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read configuration from a TOML file, or use defaults
///
/// # Errors
/// Unreadable or invalid files
pub fn load_config(path: Option<&Path>) -> Result<ScriptoriumConfig> {
    let Some(path) = path else {
        return Ok(ScriptoriumConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

#[derive(Serialize)]
struct ProjectSummary {
    identifier: String,
    title: String,
    status: String,
    resources: usize,
}

fn status_label(status: ProjectStatus) -> String {
    match status {
        ProjectStatus::Ready => "ready".to_string(),
        ProjectStatus::NeedsMigration { found } => format!("needs migration (format {found})"),
        ProjectStatus::Unsupported { found } => format!("unsupported (format {found})"),
    }
}

fn project_mut<'a>(library: &'a mut Library, args: &ArgMatches) -> Result<&'a mut Project> {
    let identifier = args
        .get_one::<String>("project")
        .ok_or_else(|| anyhow!("missing project"))?;
    library
        .get_project_mut(identifier)
        .ok_or_else(|| anyhow!("no project named {identifier}"))
}

/// Execute parsed arguments, writing results to `out`
///
/// # Errors
/// Any library, project or I/O failure
pub fn run(matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let root = matches
        .get_one::<PathBuf>("library")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("library"));
    let mut library = Library::open(&root, config)
        .with_context(|| format!("opening library {}", root.display()))?;
    tracing::debug!("Library {} holds {} project(s)", root.display(), library.len());

    match matches.subcommand() {
        Some(("list", args)) => {
            let summaries: Vec<_> = library
                .projects()
                .iter()
                .map(|p| ProjectSummary {
                    identifier: p.identifier(),
                    title: p.title().to_string(),
                    status: status_label(p.status()),
                    resources: p.len(),
                })
                .collect();
            if args.get_flag("json") {
                writeln!(out, "{}", serde_json::to_string_pretty(&summaries)?)?;
            } else {
                for s in summaries {
                    writeln!(out, "{}\t{}\t{}", s.identifier, s.title, s.status)?;
                }
            }
        }
        Some(("create", args)) => {
            let title = args
                .get_one::<String>("title")
                .ok_or_else(|| anyhow!("missing title"))?;
            let synopsis = args.get_one::<String>("synopsis").map_or("", String::as_str);
            let project = library.create_project(title, synopsis)?;
            writeln!(out, "{}", project.identifier())?;
        }
        Some(("delete", args)) => {
            let identifier = args
                .get_one::<String>("project")
                .ok_or_else(|| anyhow!("missing project"))?;
            library.delete_project(identifier)?;
            writeln!(out, "Deleted {identifier}")?;
        }
        Some(("outline", args)) => {
            let project = project_mut(&mut library, args)?;
            let outline = project.outline();
            if args.get_flag("json") {
                writeln!(out, "{}", serde_json::to_string_pretty(&outline)?)?;
            } else {
                for entry in outline {
                    let indent = "  ".repeat(entry.depth);
                    writeln!(out, "{indent}{}: {}", entry.kind, entry.title)?;
                }
            }
        }
        Some(("export", args)) => {
            let project = project_mut(&mut library, args)?;
            let Some(manuscript) = project.manuscript().map(|m| m.identifier().clone()) else {
                bail!("project {} has no manuscript", project.identifier());
            };
            let html = project.to_html(&manuscript)?;
            match args.get_one::<PathBuf>("output") {
                Some(path) => {
                    std::fs::write(path, &html)
                        .with_context(|| format!("writing {}", path.display()))?;
                    writeln!(out, "Wrote {}", path.display())?;
                }
                None => writeln!(out, "{html}")?,
            }
        }
        Some(("migrate", args)) => {
            let project = project_mut(&mut library, args)?;
            let was_ready = project.status().is_ready();
            project.try_migrate()?;
            if was_ready {
                writeln!(out, "{} is up to date", project.identifier())?;
            } else {
                writeln!(out, "Migrated {}", project.identifier())?;
            }
        }
        Some(("history", args)) => {
            let project = project_mut(&mut library, args)?;
            for entry in project.project_history()? {
                writeln!(out, "{}  {}", entry.datetime, entry.message)?;
            }
        }
        Some((other, _)) => bail!("unknown command {other}"),
        None => bail!("no command given"),
    }
    Ok(())
}
