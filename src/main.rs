use clap::Parser;
use index_sheets::config::{self, Overrides};
use index_sheets::index::{self, IndexError, RunReport};
use index_sheets::output;
use index_sheets::types::OutputFormat;
use log::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status when the run finished but at least one index image could not be written.
const EXIT_PAGES_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "index-sheets")]
#[command(about = "Per-month contact sheets for a date-structured photo archive")]
#[command(long_about = "\
Per-month contact sheets for a date-structured photo archive

Every month of the archive gets a grid of captioned thumbnails, written next
to the month directories. Months with more images than --max-thumbnails are
split into numbered pages.

Archive structure:

  archive/
  ├── index-sheets.toml            # Config (optional)
  ├── 2024/                        # Year
  │   ├── 2024-01/                 # Month → 2024/index_2024-01.jpg
  │   │   ├── 2024-01-01/          # Day
  │   │   │   ├── IMG_0001.jpg
  │   │   │   └── IMG_0002.NEF     # Camera raw is decoded too
  │   │   └── 2024-01-02/
  │   └── 2024-02/
  └── notes/                       # Anything else is ignored

Files that cannot be decoded are skipped with a warning. Exit status is 0
when the run completes, 1 on a fatal error, 2 when some index images could
not be written.

Run 'index-sheets --gen-config' to print a documented index-sheets.toml.")]
#[command(version)]
struct Cli {
    /// Archive root containing YYYY/YYYY-MM/YYYY-MM-DD directories
    #[arg(required_unless_present = "gen_config")]
    root: Option<PathBuf>,

    /// Thumbnails per grid row [default: 10]
    #[arg(long, value_name = "N")]
    thumbnails_per_row: Option<u32>,

    /// Thumbnail box width in pixels [default: 150]
    #[arg(long, value_name = "PX")]
    thumbnail_width: Option<u32>,

    /// Thumbnail box height in pixels [default: 150]
    #[arg(long, value_name = "PX")]
    thumbnail_height: Option<u32>,

    /// Maximum thumbnails per index image; larger months are paginated [default: 200]
    #[arg(long, value_name = "N")]
    max_thumbnails: Option<usize>,

    /// Write all index images into this directory instead of the year directories
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output image format: jpg, png or webp [default: jpg]
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Config file [default: <ROOT>/index-sheets.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// TrueType/OpenType font for captions [default: first system font found]
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// List the index images that would be written, without rendering
    #[arg(long)]
    dry_run: bool,

    /// Also write the run report as JSON to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Print a stock index-sheets.toml with all options documented
    #[arg(long)]
    gen_config: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-page detail
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            thumbnails_per_row: self.thumbnails_per_row,
            thumbnail_width: self.thumbnail_width,
            thumbnail_height: self.thumbnail_height,
            max_thumbnails: self.max_thumbnails,
            format: self.format,
            output_dir: self.output_dir.clone(),
            font: self.font.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    let Some(root) = cli.root.as_deref() else {
        error!("No archive root given");
        return ExitCode::FAILURE;
    };

    match run(&cli, root) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: &Cli, root: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = config::load_config(root, cli.config.as_deref()).map_err(IndexError::from)?;
    config.apply(cli.overrides());
    config.validate().map_err(IndexError::from)?;
    let spec = config.thumbnail_spec();

    if cli.dry_run {
        let planned = index::plan(root, &spec)?;
        output::print_plan(&planned, root);
        return Ok(ExitCode::SUCCESS);
    }

    let report = index::build_indexes(root, &spec, config.caption.font.as_deref())?;
    output::print_run_summary(&report, root);

    // A report that cannot be written does not change the exit status
    if let Some(path) = &cli.report {
        if let Err(e) = write_report(&report, path) {
            error!("Cannot write report {}: {e}", path.display());
        }
    }

    if report.has_errors() {
        Ok(ExitCode::from(EXIT_PAGES_FAILED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn write_report(report: &RunReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
