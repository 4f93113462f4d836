//! xmlcmp command line tool
//!
//! Compares XML documents ignoring element order, and converts XML
//! documents to JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xmlcmp::{CompareOptions, MatchingPolicy, ResourceLoader, XmlComparer, XmlParser};

/// Exit code when the documents differ.
const EXIT_DIFFERENT: u8 = 1;
/// Exit code when a document could not be loaded or parsed.
const EXIT_BROKEN: u8 = 2;

/// Unordered XML comparison
#[derive(Parser)]
#[command(name = "xmlcmp")]
#[command(version)]
#[command(about = "Compare XML documents ignoring element order", long_about = None)]
struct Cli {
    /// Directory document paths are resolved against
    #[arg(short, long, global = true, env = "XMLCMP_ROOT", default_value = ".")]
    root: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a control document with a test document
    #[command(visible_alias = "c")]
    Compare {
        /// Control (expected) document
        control: String,
        /// Test (actual) document
        test: String,

        /// Pair elements by name only and report attribute changes per attribute
        #[arg(long)]
        by_name: bool,

        /// Report same-name elements with different attributes as missing and extra
        #[arg(long)]
        no_near: bool,
    },

    /// Convert an XML document to pretty-printed JSON
    #[command(visible_alias = "j")]
    Json {
        /// XML document
        path: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare {
            control,
            test,
            by_name,
            no_near,
        } => {
            let options = CompareOptions::default()
                .with_resource_root(cli.root)
                .with_matching(if by_name {
                    MatchingPolicy::ByName
                } else {
                    MatchingPolicy::Strict
                })
                .with_near_matches(!no_near);
            run_compare(&control, &test, options)
        }
        Commands::Json { path, output } => {
            run_json(&cli.root, &path, output.as_deref()).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_BROKEN)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Compares two documents and prints the report.
fn run_compare(
    control: &str,
    test: &str,
    options: CompareOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    debug!(?options, "comparing {} with {}", control, test);
    let comparer = XmlComparer::with_options(options);
    let result = comparer.compare_resources(control, test)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(result.report().as_bytes())?;
    stdout.flush()?;

    if result.is_equivalent() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_DIFFERENT))
    }
}

/// Converts a document to JSON.
fn run_json(
    root: &std::path::Path,
    path: &str,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = ResourceLoader::new(root).load(path)?;
    let tree = XmlParser::new().parse(&document)?;

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };

    writeln!(output, "{}", xmlcmp::to_json_string(&tree))?;
    output.flush()?;
    Ok(())
}
