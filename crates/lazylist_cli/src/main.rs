//! `lazylist` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and map them onto core operations.
//! - Render results as text (or JSON for `find --json`).
//!
//! # Invariants
//! - No domain rule lives here; every check happens in `lazylist_core`.
//! - Failures print the message on stderr, a one-line diagnostic on stdout,
//!   and exit with status 1. `health` exits 0/1/2 by grade.

mod render;

use clap::{Parser, Subcommand};
use lazylist_core::export::{self, ExportFormat};
use lazylist_core::{
    default_log_level, init_logging, time, ItemFilter, ItemId, ItemStatus, ItemUpdate, ListsError,
    NewItem, NewList, Priority, PromoteOutcome, Workspace, WriteMode,
};
use log::{error, info};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// File-backed lists with automatic classification and merge analysis.
#[derive(Parser)]
#[command(name = "lazylist", version, about)]
struct Cli {
    /// Workspace root holding `lists/` and `knowledge/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file. Defaults to `<root>/lazylist.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log directory. Defaults to `<root>/.lazylist/logs`.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new list.
    Create {
        slug: String,
        title: String,
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },

    /// Add an item. Without `--list` the classifier picks the list.
    Add {
        title: String,
        #[arg(long)]
        list: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, default_value = "open")]
        status: ItemStatus,
        #[arg(long)]
        project: Option<String>,
        /// YYYY-MM-DD or RFC 3339 timestamp.
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },

    /// Split free text (argument or stdin) into items and file each one.
    Ingest {
        text: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },

    /// Move an item between lists.
    Move {
        source: String,
        id: ItemId,
        target: String,
        #[arg(long)]
        dry_run: bool,
    },

    Pin {
        list: String,
        id: ItemId,
        #[arg(long)]
        dry_run: bool,
    },

    Unpin {
        list: String,
        id: ItemId,
        #[arg(long)]
        dry_run: bool,
    },

    /// Replace fields of an item.
    Set {
        list: String,
        id: ItemId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// Replaces all tags; pass no values to clear them.
        #[arg(long, num_args = 0..)]
        tags: Option<Vec<String>>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<ItemStatus>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },

    /// Query items in a list.
    Find {
        list: String,
        #[arg(long)]
        status: Option<ItemStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Items must carry every listed tag.
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        title_contains: Option<String>,
        #[arg(long, conflicts_with = "count")]
        json: bool,
        #[arg(long)]
        count: bool,
    },

    /// Write a list as markdown or CSV.
    Export {
        list: String,
        /// md|csv
        format: ExportFormat,
        /// Defaults to `<lists_dir>/<list>.<format>`.
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },

    /// Promote a list; requires `--approve`.
    Promote {
        list: String,
        #[arg(long)]
        approve: bool,
        #[arg(long)]
        dry_run: bool,
    },

    /// Report list pairs that look mergeable.
    Scan {
        #[arg(long)]
        threshold: Option<f64>,
        /// Show component scores.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Grade registry health; exit 0 ok, 1 warning, 2 action recommended.
    Health {
        /// Do not record the consolidation alert item.
        #[arg(long)]
        no_alert: bool,
        #[arg(long)]
        dry_run: bool,
    },

    /// Sort every list newest first, keeping backups of changed files.
    Reorder {
        #[arg(long)]
        dry_run: bool,
    },

    /// Retire markdown mirrors of the configured lists.
    Consolidate {
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify that every list parses and every record validates.
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let root = absolute(&cli.root);

    let log_dir = cli
        .log_dir
        .as_deref()
        .map(absolute)
        .unwrap_or_else(|| root.join(".lazylist").join("logs"));
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(message) = init_logging(level, &log_dir) {
        eprintln!("warning: logging disabled: {message}");
    }

    match run(&root, cli.config.as_deref(), cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!(
                "event=command_failed module=cli status=error error_code={}",
                err.code()
            );
            eprintln!("error: {err}");
            println!("error_code={}", err.code());
            ExitCode::from(1)
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn run(root: &Path, config: Option<&Path>, command: Command) -> Result<ExitCode, ListsError> {
    let workspace = Workspace::open(root, config)?;

    match command {
        Command::Create {
            slug,
            title,
            tags,
            dry_run,
        } => {
            let mode = WriteMode::from_dry_run(dry_run);
            let entry = workspace
                .registry_service()
                .create(&NewList { slug, title, tags }, mode)?;
            render::created_list(&entry, &workspace, mode);
        }
        Command::Add {
            title,
            list,
            body,
            tags,
            priority,
            status,
            project,
            due,
            notes,
            dry_run,
        } => {
            let mode = WriteMode::from_dry_run(dry_run);
            let request = NewItem {
                id: None,
                title,
                body,
                tags,
                status,
                priority,
                project,
                due,
                notes,
            };
            let added = workspace
                .item_service()?
                .add(list.as_deref(), request, mode)?;
            render::added(&[added], mode);
        }
        Command::Ingest { text, dry_run } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let mode = WriteMode::from_dry_run(dry_run);
            let added = workspace.item_service()?.ingest(&text, mode)?;
            render::added(&added, mode);
        }
        Command::Move {
            source,
            id,
            target,
            dry_run,
        } => {
            let mode = WriteMode::from_dry_run(dry_run);
            let moved = workspace
                .item_service()?
                .move_item(&source, id, &target, mode)?;
            render::moved(&moved, mode);
        }
        Command::Pin { list, id, dry_run } => {
            let mode = WriteMode::from_dry_run(dry_run);
            let outcome = workspace.item_service()?.pin(&list, id, mode)?;
            render::updated(&list, &outcome, mode);
        }
        Command::Unpin { list, id, dry_run } => {
            let mode = WriteMode::from_dry_run(dry_run);
            let outcome = workspace.item_service()?.unpin(&list, id, mode)?;
            render::updated(&list, &outcome, mode);
        }
        Command::Set {
            list,
            id,
            title,
            body,
            tags,
            priority,
            status,
            project,
            due,
            notes,
            dry_run,
        } => {
            let mode = WriteMode::from_dry_run(dry_run);
            let update = ItemUpdate {
                title,
                body,
                tags,
                status,
                priority,
                project,
                due,
                notes,
            };
            let outcome = workspace.item_service()?.set(&list, id, &update, mode)?;
            render::updated(&list, &outcome, mode);
        }
        Command::Find {
            list,
            status,
            priority,
            tags,
            project,
            title_contains,
            json,
            count,
        } => {
            let filter = ItemFilter {
                status,
                priority,
                project,
                title_contains,
                tags,
            };
            let items = workspace.item_service()?.find(&list, &filter)?;
            if count {
                println!("{}", items.len());
            } else if json {
                let rendered = render::items_json(&items).map_err(|err| {
                    ListsError::Store(lazylist_core::StoreError::Serialize {
                        path: PathBuf::from("<stdout>"),
                        message: err.to_string(),
                    })
                })?;
                println!("{rendered}");
            } else {
                render::items(&items);
            }
        }
        Command::Export {
            list,
            format,
            output,
            dry_run,
        } => {
            let service = workspace.item_service()?;
            let items = service.list_items(&list)?;
            let title = service
                .registry()
                .find(list.trim())
                .map(|entry| entry.title.clone())
                .unwrap_or_else(|| list.clone());
            let extension = match format {
                ExportFormat::Markdown => "md",
                ExportFormat::Csv => "csv",
            };
            let output = output.map(|path| absolute(&path)).unwrap_or_else(|| {
                workspace
                    .paths()
                    .lists_dir
                    .join(format!("{}.{extension}", list.trim()))
            });
            if dry_run {
                println!("[dry run] Would export '{}' to {}", list.trim(), output.display());
            } else {
                export::export_to(format, &title, &items, &output)?;
                println!("Exported '{}' to {}", list.trim(), output.display());
            }
        }
        Command::Promote {
            list,
            approve,
            dry_run,
        } => {
            if !approve {
                eprintln!("Promotion requires explicit approval. Use --approve to proceed.");
                println!("error_code=approval_required");
                return Ok(ExitCode::from(1));
            }
            let mode = WriteMode::from_dry_run(dry_run);
            match workspace.registry_service().promote(&list, mode)? {
                PromoteOutcome::Promoted(entry) => {
                    let prefix = if mode.is_live() { "" } else { "[dry run] " };
                    println!("{prefix}Promoted list '{}'", entry.slug);
                }
                PromoteOutcome::AlreadyPromoted(entry) => {
                    println!("List '{}' is already promoted.", entry.slug);
                }
            }
        }
        Command::Scan { threshold, verbose } => {
            let report = workspace.scan(threshold)?;
            let threshold = threshold.unwrap_or(workspace.config().similarity.threshold);
            render::scan(&report, threshold, verbose);
        }
        Command::Health { no_alert, dry_run } => {
            let report = workspace.health()?;
            render::health(&report);
            if !no_alert {
                let mode = WriteMode::from_dry_run(dry_run);
                let outcome = workspace.record_health_alert(&report, time::today(), mode)?;
                render::alert(outcome, &workspace.config().health.alert_list, mode);
            }
            info!(
                "event=health_check module=cli status=ok grade={} list_count={}",
                report.status.as_str(),
                report.list_count
            );
            return Ok(ExitCode::from(report.status.exit_code() as u8));
        }
        Command::Reorder { dry_run } => {
            let report = workspace.reorder(WriteMode::from_dry_run(dry_run))?;
            render::reorder(&report);
            if !report.is_success() {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Consolidate { dry_run } => {
            let report = workspace.consolidate(WriteMode::from_dry_run(dry_run))?;
            render::consolidation(&report);
            if !report.is_success() {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Check => {
            let report = workspace.check();
            render::integrity(&report);
            if !report.is_clean() {
                return Ok(ExitCode::from(1));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_stdin() -> Result<String, ListsError> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| ListsError::Store(lazylist_core::StoreError::Io {
            path: PathBuf::from("<stdin>"),
            source: err,
        }))?;
    Ok(text)
}
