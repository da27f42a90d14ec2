//! CLI entry point for `mboxsearch`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};

use mboxsearch::browse::{render_message, ResultBrowser};
use mboxsearch::config::Config;
use mboxsearch::error::MboxError;
use mboxsearch::locate::MessageLocator;
use mboxsearch::model::record::ResultsIndex;
use mboxsearch::parser::decoder::MailDecoder;
use mboxsearch::parser::header::parse_date;
use mboxsearch::scan::{DirLister, FileLister};
use mboxsearch::search::{MatchLog, SearchCoordinator, SearchField, SearchTermSet};

/// Search and view mbox email files.
#[derive(Parser)]
#[command(name = "mboxsearch", version)]
struct Cli {
    /// Directory containing mbox files (searched recursively)
    #[arg(value_name = "MBOX_DIR", required_unless_present_any = ["completions", "manpage"])]
    mbox_dir: Option<PathBuf>,

    /// Search terms with optional field prefixes (e.g. 'subject:term' or just 'term')
    #[arg(value_name = "SEARCH_TERMS")]
    search_terms: Vec<String>,

    /// Field to search in when a single bare term is given
    #[arg(long, value_enum, default_value_t = SearchField::All)]
    field: SearchField,

    /// Match whole words only
    #[arg(long)]
    exact: bool,

    /// Append a line for every match to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// View the message at this index and exit
    #[arg(long, value_name = "INDEX")]
    view: Option<u64>,

    /// Archive the --view index refers to (defaults to the first archive that has it)
    #[arg(long, value_name = "FILE", requires = "view")]
    archive: Option<PathBuf>,

    /// Print matches as JSON instead of browsing them
    #[arg(long, conflicts_with = "view")]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL", exclusive = true)]
    completions: Option<clap_complete::Shell>,

    /// Generate a man page and exit
    #[arg(long, exclusive = true)]
    manpage: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        return cmd_completions(shell);
    }
    if cli.manpage {
        return cmd_manpage();
    }

    let config = mboxsearch::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let Some(root) = cli.mbox_dir.as_deref() else {
        anyhow::bail!("No mailbox directory given");
    };

    if let Some(ordinal) = cli.view {
        return cmd_view(root, cli.archive.as_deref(), ordinal, &config);
    }

    cmd_search(&cli, root, &config)
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mboxsearch::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mboxsearch.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxsearch", &mut io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    io::stdout().write_all(&buf)?;
    Ok(())
}

/// List the archives under `root`, turning a bad root into a user-facing error.
fn list_archives(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let lister = DirLister::new(config.search.extension.as_str())
        .follow_symlinks(config.search.follow_symlinks);
    match lister.list(root) {
        Ok(archives) => Ok(archives),
        Err(MboxError::InvalidRoot(path)) => {
            anyhow::bail!("Mailbox directory not found: {}", path.display())
        }
        Err(e) => Err(e.into()),
    }
}

/// Search every archive under `root` and browse (or print) the matches.
fn cmd_search(cli: &Cli, root: &Path, config: &Config) -> anyhow::Result<()> {
    let terms = SearchTermSet::from_args(&cli.search_terms, cli.field);

    tracing::info!(path = %root.display(), "Starting search");
    tracing::info!(terms = ?cli.search_terms, field = %cli.field, exact = cli.exact, "Search parameters");

    let archives = list_archives(root, config)?;
    if archives.is_empty() {
        eprintln!(
            "  No .{} files found under {}",
            config.search.extension,
            root.display()
        );
        return Ok(());
    }

    let match_log = cli.log.as_deref().map(MatchLog::open).transpose()?;

    let mut coordinator = SearchCoordinator::new(MailDecoder)
        .with_split_options(config.performance.split_options());
    if let Some(log) = &match_log {
        coordinator = coordinator.with_match_log(log);
    }

    let pb = ProgressBar::new(archives.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Searching [{bar:40.cyan/blue}] {pos}/{len} files")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let (results, summary) = coordinator.search_with_progress(
        &archives,
        &terms,
        cli.exact,
        Some(&|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
            true
        }),
    )?;
    pb.finish_and_clear();

    eprintln!(
        "  Found {} matching emails in total ({} messages in {} files, {} read, {:.2?}).",
        results.len(),
        summary.messages_scanned,
        summary.archives_scanned,
        format_size(summary.bytes_read, BINARY),
        start.elapsed()
    );
    if summary.archives_failed > 0 || summary.decode_failures > 0 {
        eprintln!(
            "  {} file(s) could not be read, {} message(s) could not be decoded.",
            summary.archives_failed, summary.decode_failures
        );
    }

    if cli.json {
        return print_results_json(&results);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    ResultBrowser::new(&results)
        .with_subject_width(config.display.subject_width)
        .run(&mut stdin.lock(), &mut stdout.lock())?;

    Ok(())
}

/// Show one message by ordinal and exit.
fn cmd_view(
    root: &Path,
    archive: Option<&Path>,
    ordinal: u64,
    config: &Config,
) -> anyhow::Result<()> {
    let locator =
        MessageLocator::new(MailDecoder).with_split_options(config.performance.split_options());
    let mut stdout = io::stdout().lock();

    if let Some(archive) = archive {
        let path = if archive.exists() {
            archive.to_path_buf()
        } else {
            root.join(archive)
        };
        match locator.locate_in(&path, ordinal)? {
            Some(message) => render_message(&mut stdout, &message)?,
            None => writeln!(
                stdout,
                "Message with index {ordinal} not found in {}",
                path.display()
            )?,
        }
        return Ok(());
    }

    let archives = list_archives(root, config)?;
    match locator.locate(&archives, ordinal) {
        Ok(found) => {
            writeln!(
                stdout,
                "Viewing email from {}, message index {}\n",
                found.archive.display(),
                found.ordinal
            )?;
            render_message(&mut stdout, &found.message)?;
        }
        Err(MboxError::MessageNotFound { .. }) => writeln!(
            stdout,
            "Message with index {ordinal} not found in any mbox file in directory {}",
            root.display()
        )?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Print the results as a JSON array.
fn print_results_json(results: &ResultsIndex) -> anyhow::Result<()> {
    let json: Vec<serde_json::Value> = results
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let message = &record.message;
            serde_json::json!({
                "index": i + 1,
                "archive": record.archive.to_string_lossy(),
                "ordinal": record.ordinal,
                "subject": message.subject(),
                "from": message.from(),
                "to": message.to(),
                "date": message.date(),
                "date_utc": message.date().and_then(parse_date).map(|d| d.to_rfc3339()),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
