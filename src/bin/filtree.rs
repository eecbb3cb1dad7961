use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use filtree::config::Config;
use filtree::{ConditionType, DataView, DataViewMetadata, FilterAction, FilterEditorSession, FilterPath, WireFilter};

/// Edit a query-filter list with scripted filter tree actions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Log file (defaults to ./filtree.log)
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Data view JSON: { "id", "title", "fields": [{ "name", "type" }] }
    #[arg(long = "data-view", value_name = "PATH")]
    data_view: PathBuf,
    /// Wire-format filter list to open (starts from one empty row when omitted)
    #[arg(long = "filters", value_name = "PATH")]
    filters: Option<PathBuf>,
    /// JSON list of actions to dispatch in order
    #[arg(long = "actions", value_name = "PATH")]
    actions: Option<PathBuf>,
    /// Write committed filters here instead of stdout
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
    /// Print each editable row with its path and disabled buttons
    #[arg(long = "rows")]
    rows: bool,
    /// Cancel the edit instead of committing it
    #[arg(long = "discard")]
    discard: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).wrap_err_with(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    filtree::logging::init_with(args.log_file.clone(), args.logging.map(tracing::Level::from))?;

    let config = Config::from_path(args.config.as_ref())?;
    let data_view: DataView = read_json(&args.data_view)?;
    let filters: Vec<WireFilter> = match &args.filters {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let mut session = FilterEditorSession::open(&filters, data_view, DataViewMetadata, config.editor);
    if session.tree().is_empty() {
        session.add_empty_filter(&FilterPath::root(), ConditionType::And);
    }

    if let Some(path) = &args.actions {
        let actions: Vec<FilterAction> = read_json(path)?;
        let total = actions.len();
        let mut rejected = 0;
        for action in actions {
            if !session.dispatch(action) {
                rejected += 1;
            }
        }
        if rejected > 0 {
            warn!("{rejected} of {total} actions were rejected");
        }
        info!("Dispatched {} actions", total - rejected);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", session.tree())?;
    if args.rows {
        for row in session.rows() {
            let caps = row.capabilities;
            let disabled: Vec<&str> = [
                (caps.or_disabled, "or"),
                (caps.and_disabled, "and"),
                (caps.remove_disabled, "remove"),
            ]
            .into_iter()
            .filter_map(|(off, name)| off.then_some(name))
            .collect();
            writeln!(
                out,
                "{:indent$}{} [{}] {} disabled: {}",
                "",
                row.path,
                row.condition_type,
                row.label,
                if disabled.is_empty() { "-".to_string() } else { disabled.join(",") },
                indent = (row.depth - 1) * 2
            )?;
        }
    }

    if args.discard {
        session.cancel();
        return Ok(());
    }

    let committed = session.commit();
    match &args.output {
        Some(path) => {
            let file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &committed)?;
        }
        None => {
            serde_json::to_writer_pretty(&mut out, &committed)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
