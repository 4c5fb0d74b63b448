//! coursemd - courseware EPUB to lab-manual Markdown converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use coursemd::chapter;
use coursemd::pipeline::{ConvertOptions, convert_epub};

#[derive(Parser)]
#[command(name = "coursemd")]
#[command(version, about = "Convert courseware EPUB archives into hosted lab-manual Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    coursemd PBI101.epub                     Convert with the default encoding fallback
    coursemd PBI101.epub --encodings utf-8   Require UTF-8 chapter files")]
struct Cli {
    /// Courseware archive (.epub)
    #[arg(value_name = "EPUB")]
    epub: PathBuf,

    /// Ordered encoding fallback for reading chapter files
    #[arg(
        long,
        value_delimiter = ',',
        default_value = chapter::DEFAULT_ENCODINGS.join(",").leak() as &str
    )]
    encodings: Vec<String>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> coursemd::Result<()> {
    let labels: Vec<&str> = cli.encodings.iter().map(String::as_str).collect();
    let options = ConvertOptions {
        encodings: chapter::resolve_encodings(&labels)?,
    };

    let output = convert_epub(&cli.epub, &options)?;
    if !cli.quiet {
        println!("Markdown file created: {}", output.markdown_path.display());
    }
    Ok(())
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
