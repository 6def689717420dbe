use clap::{Parser, Subcommand};
use docmerge::cli;
use docmerge::config::{
    DEFAULT_LOG_FILTER, DEFAULT_PREFIX, DEFAULT_SHEET_NAME, ENV_PREFIX, ENV_SHEET,
    VERBOSE_LOG_FILTER,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docmerge")]
#[command(about = "Generate one Word document per spreadsheet row by filling template bookmarks.")]
#[command(long_about = "docmerge - Batch Word documents from spreadsheet rows

The first row of the worksheet holds field names. Every following row
becomes one document: each field is written into the template bookmark
of the same name. Output files are named <n>_<prefix>.docx.

COMMANDS:
  run        - Generate documents from a spreadsheet and a template
  wizard     - Interactive step-by-step form
  preview    - Show the records read from a worksheet
  bookmarks  - List template bookmarks and compare them with the fields
  init       - Write a sample workbook and template

EXAMPLES:
  docmerge init demo
  docmerge run --data demo/sample.xlsx --template demo/template.docx --out demo/out
  docmerge preview --data people.xlsx --sheet Staff --json
  docmerge bookmarks letter.dotx --data people.xlsx

ENVIRONMENT:
  DOCMERGE_SHEET   default worksheet name
  DOCMERGE_PREFIX  default output file prefix
  RUST_LOG         tracing filter (default: docmerge=warn)")]
#[command(version)]
struct Cli {
    /// Show debug logging and list generated files
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one document per data row
    Run {
        /// Spreadsheet file (.xlsx, .xlsm, .xls, .ods)
        #[arg(short, long)]
        data: PathBuf,

        /// Worksheet holding the records
        #[arg(short, long, default_value = DEFAULT_SHEET_NAME, env = ENV_SHEET)]
        sheet: String,

        /// Word template (.docx or .dotx) with one bookmark per field
        #[arg(short, long)]
        template: PathBuf,

        /// Output folder (created if missing)
        #[arg(short, long)]
        out: PathBuf,

        /// Output file name prefix
        #[arg(short, long, default_value = DEFAULT_PREFIX, env = ENV_PREFIX)]
        prefix: String,
    },

    #[command(long_about = "Interactive form.

Asks for the spreadsheet first. The template is only asked for once a
spreadsheet is chosen, and the output folder only once a template is
chosen. An empty answer to a file question asks again.")]
    /// Interactive step-by-step form
    Wizard,

    /// Show the records read from a worksheet
    Preview {
        /// Spreadsheet file
        #[arg(short, long)]
        data: PathBuf,

        /// Worksheet holding the records
        #[arg(short, long, default_value = DEFAULT_SHEET_NAME, env = ENV_SHEET)]
        sheet: String,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List template bookmarks, optionally checked against a worksheet
    Bookmarks {
        /// Word template
        template: PathBuf,

        /// Spreadsheet whose header row is compared with the bookmarks
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Worksheet holding the records
        #[arg(short, long, default_value = DEFAULT_SHEET_NAME, env = ENV_SHEET)]
        sheet: String,
    },

    /// Write sample.xlsx and template.docx into a folder
    Init {
        /// Target folder
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing sample files
        #[arg(short, long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Run {
            data,
            sheet,
            template,
            out,
            prefix,
        } => cli::run(data, sheet, template, out, prefix, cli.verbose)?,

        Commands::Wizard => cli::wizard(cli.verbose)?,

        Commands::Preview { data, sheet, json } => {
            cli::preview(data, sheet, json)?;
            return Ok(ExitCode::SUCCESS);
        }

        Commands::Bookmarks {
            template,
            data,
            sheet,
        } => {
            cli::bookmarks(template, data, sheet)?;
            return Ok(ExitCode::SUCCESS);
        }

        Commands::Init { dir, force } => {
            cli::init(dir, force)?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
