use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use client::{ApiError, ClientConfig, HttpApi, PageView, TablePage, TablesApi};
use tables::dice::Roll;
use tables::{DiceError, ExportFormat, Formula, StoreError, TableStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Page(String),
    #[error("invalid formula: {0}")]
    Dice(#[from] DiceError),
    #[error("table store error: {0}")]
    Store(#[from] StoreError),
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot rewrite {path}: {source}")]
    Rewrite { path: PathBuf, source: std::io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "tables-cli", about = "Roll table service CLI and offline table tools")]
struct Cli {
    #[arg(long, env = "TABLES_BASE_URL", default_value = client::net::config::DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Page(PageCommand),
    /// Roll a dice formula locally.
    Roll {
        formula: String,
        #[arg(long, default_value_t = 1)]
        times: usize,
    },
    /// Convert every table in a directory.
    Export(ExportArgs),
    /// Replace `@UUID[...]{label}` references with their labels, in place.
    StripRefs {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Actions the page offers, run against the server.
#[derive(Subcommand, Debug)]
enum PageCommand {
    /// Check that the server is up.
    Ping,
    /// List table names.
    Tables,
    /// Draw on a table.
    Draw { table: String },
    /// Draw on a table, formatted as `<roll> : <result>`.
    FormattedDraw { table: String },
    /// List a table's entries.
    Entries { table: String },
    /// Add a table from a JSON definition.
    Add(AddArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct AddArgs {
    /// Table JSON text.
    #[arg(long)]
    data: Option<String>,
    /// Path to a table JSON file.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    from: PathBuf,
    #[arg(long)]
    to: PathBuf,
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Json,
    Tsv,
    Markdown,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => Self::Json,
            FormatArg::Tsv => Self::Tsv,
            FormatArg::Markdown => Self::Markdown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Roll { formula, times } => run_roll(&formula, times),
        Command::Export(args) => run_export(args),
        Command::StripRefs { files } => run_strip_refs(&files),
        Command::Page(command) => {
            let config = ClientConfig { base_url: cli.base_url, ..ClientConfig::from_env() };
            let page = TablePage::new(HttpApi::new(&config)?);
            run_page(&page, command).await
        }
    }
}

// =============================================================================
// PAGE ACTIONS
// =============================================================================

async fn run_page<A: TablesApi>(page: &TablePage<A>, command: PageCommand) -> Result<(), CliError> {
    match command {
        PageCommand::Ping => {
            page.api().health().await?;
            println!("ok");
        }
        PageCommand::Tables => {
            page.refresh_tables().await;
            let view = checked(page.view())?;
            for name in &view.table_names {
                println!("{name}");
            }
        }
        PageCommand::Draw { table } => {
            page.select(&table);
            page.draw().await;
            println!("{}", checked(page.view())?.result);
        }
        PageCommand::FormattedDraw { table } => {
            page.select(&table);
            page.formatted_draw().await;
            println!("{}", checked(page.view())?.result);
        }
        PageCommand::Entries { table } => {
            page.select_table(&table).await;
            let view = checked(page.view())?;
            for row in &view.entries {
                println!("{}\t{}", row.range, row.target);
            }
        }
        PageCommand::Add(args) => {
            page.set_table_json(read_table_source(args)?);
            page.submit_table().await;
            let view = checked(page.view())?;
            println!("{}", view.result);
            println!("tables: {}", view.table_names.join(", "));
        }
    }
    Ok(())
}

/// The page reports failures as text in the result line; surface them as
/// a failing exit status.
fn checked(view: PageView) -> Result<PageView, CliError> {
    if view.result_is_failure() { Err(CliError::Page(view.result)) } else { Ok(view) }
}

fn read_table_source(args: AddArgs) -> Result<String, CliError> {
    match (args.data, args.file) {
        (Some(data), _) => Ok(data),
        (None, Some(path)) => std::fs::read_to_string(&path).map_err(|source| CliError::Read { path, source }),
        (None, None) => Ok(String::new()),
    }
}

// =============================================================================
// OFFLINE TOOLS
// =============================================================================

fn run_roll(formula: &str, times: usize) -> Result<(), CliError> {
    let formula = Formula::parse(formula)?;
    let mut rng = rand::rng();
    for _ in 0..times {
        let roll = formula.roll(&mut rng)?;
        println!("{}", render_roll(&roll));
    }
    Ok(())
}

/// `total (2d6: 3 5, 1d4: 2)`.
fn render_roll(roll: &Roll) -> String {
    if roll.rolls.is_empty() {
        return roll.total.to_string();
    }
    let groups = roll
        .rolls
        .iter()
        .map(|group| {
            let faces = group.faces.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
            format!("{}: {faces}", group.label())
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} ({groups})", roll.total)
}

fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let store = TableStore::open(&args.from);
    let written = store.export(&args.to, args.format.into())?;
    println!("exported {written} tables to {}", args.to.display());
    Ok(())
}

fn run_strip_refs(files: &[PathBuf]) -> Result<(), CliError> {
    for path in files {
        let count = strip_file(path)?;
        println!("{}: {count} references", path.display());
    }
    Ok(())
}

fn strip_file(path: &Path) -> Result<usize, CliError> {
    tables::refs::strip_references_in_file(path).map_err(|source| CliError::Rewrite { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
