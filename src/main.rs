use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use entertainment_passport::config::{self, AppConfig, CliConfig};
use entertainment_passport::{AddOutcome, CollectionItem, Library, MediaType, SortOrder};

mod cli_style;
use cli_style::get_styles;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(name = "passport", styles = get_styles(), version)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite collection database.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Directory export files are written to.
    #[clap(long, value_parser = parse_path)]
    pub export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Searches the provider of a category (movie, tv, game, album, book).
    Search { media_type: MediaType, query: String },

    /// Searches, then adds one of the results to the collection.
    Add {
        media_type: MediaType,
        query: String,

        /// Which search result to add, starting from 1.
        #[clap(long, default_value_t = 1)]
        pick: usize,
    },

    /// Removes an item from the collection.
    Remove { id: String },

    /// Lists the collected items of a category.
    List {
        media_type: MediaType,

        /// One of: added, title, year.
        #[clap(long, default_value = "year")]
        sort: SortOrder,
    },

    /// Shows a category and keeps it up to date while reading commands from
    /// stdin: `find <query>`, `add <n>`, `rm <id>`, `note <id> <text>`, `quit`.
    Watch {
        media_type: MediaType,

        #[clap(long, default_value = "year")]
        sort: SortOrder,
    },

    /// Replaces the notes of an item.
    Notes { id: String, text: String },

    /// Writes the whole collection to a dated JSON file.
    Export,

    /// Merges a previously exported JSON file into the collection.
    Import {
        #[clap(value_parser = parse_path)]
        path: PathBuf,
    },
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_path: args.db.clone(),
            export_dir: args.export_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config: CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;
    info!("  db_path: {:?}", app_config.db_path);
    info!("  sources: {:?}", app_config.sources);

    let library = Library::open(&app_config)?;

    match cli_args.command {
        Command::Search { media_type, query } => {
            let results = library.search(&query, media_type).await?;
            if results.is_empty() {
                cli_style::print_warning("No results found.");
            } else {
                cli_style::print_items("Results", media_type, &results, true);
            }
        }
        Command::Add {
            media_type,
            query,
            pick,
        } => {
            let results = library.search(&query, media_type).await?;
            let Some(item) = pick.checked_sub(1).and_then(|i| results.get(i)) else {
                bail!("No result number {} among {} results", pick, results.len());
            };
            report_add(&library, item)?;
        }
        Command::Remove { id } => {
            if library.remove(&id)? {
                cli_style::print_success(&format!("Removed {}", id));
            } else {
                cli_style::print_warning(&format!("No item with id {}", id));
            }
        }
        Command::List { media_type, sort } => {
            let items = library.list(media_type, sort)?;
            cli_style::print_items("Collection", media_type, &items, false);
        }
        Command::Watch { media_type, sort } => watch(&library, media_type, sort).await?,
        Command::Notes { id, text } => {
            if library.set_notes(&id, &text)? {
                cli_style::print_success(&format!("Updated notes of {}", id));
            } else {
                cli_style::print_warning(&format!("No item with id {}", id));
            }
        }
        Command::Export => {
            let path = library.export_to_dir(&app_config.export_dir)?;
            cli_style::print_success(&format!("Exported to {}", path.display()));
        }
        Command::Import { path } => {
            let report = library.import_file(&path)?;
            cli_style::print_import_report(&report);
        }
    }

    Ok(())
}

fn report_add(library: &Library, item: &CollectionItem) -> Result<()> {
    match library.add(item)? {
        AddOutcome::Added => {
            cli_style::print_success(&format!("Added {} ({})", item.title, item.year))
        }
        AddOutcome::AlreadyCollected => cli_style::print_warning("Item already exists."),
    }
    Ok(())
}

async fn watch(library: &Library, media_type: MediaType, sort: SortOrder) -> Result<()> {
    let mut query = library.watch(media_type, sort)?;
    cli_style::print_items("Collection", media_type, &query.current(), false);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut results: Vec<CollectionItem> = Vec::new();

    loop {
        tokio::select! {
            snapshot = query.changed() => match snapshot {
                Some(items) => cli_style::print_items("Collection", media_type, &items, false),
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let (command, rest) = line
                    .trim()
                    .split_once(' ')
                    .unwrap_or((line.trim(), ""));
                let rest = rest.trim();
                let outcome: Result<()> = match command {
                    "" => Ok(()),
                    "quit" | "exit" => break,
                    "find" => match library.search(rest, media_type).await {
                        Ok(found) => {
                            results = found;
                            cli_style::print_items("Results", media_type, &results, true);
                            Ok(())
                        }
                        Err(e) => Err(e.into()),
                    },
                    "add" => match rest.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                        Some(index) if index < results.len() => {
                            report_add(library, &results[index])
                        }
                        _ => Err(anyhow::anyhow!("Pick a result number from the last search")),
                    },
                    "rm" => library.remove(rest).map(|_| ()).map_err(Into::into),
                    "note" => {
                        let (id, text) = rest.split_once(' ').unwrap_or((rest, ""));
                        library.set_notes(id, text.trim()).map(|_| ()).map_err(Into::into)
                    }
                    other => Err(anyhow::anyhow!("Unknown command: {}", other)),
                };
                if let Err(e) = outcome {
                    cli_style::print_error(&e.to_string());
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
