use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use folio::record::DEFAULT_SEPARATOR;
use folio::{FolioError, OutputFormat, Payload, RenderOptions};

/// A complete grouped sample report.
const EXAMPLE_PAYLOAD: &str = include_str!("../demos/district_report.json");

#[derive(Parser)]
#[command(name = "folio", version, about = "Render a banded report payload to PDF or HTML")]
struct Cli {
    /// Payload JSON file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output file [default: output.pdf or output.html]
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Character separating the values of a row
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    separator: char,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Print a sample payload and exit
    #[arg(long)]
    example: bool,

    /// Print the payload's layout schema as JSON instead of rendering
    #[arg(long)]
    export_schema: bool,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Html,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => OutputFormat::Pdf,
            Format::Html => OutputFormat::Html,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FolioError> {
    if cli.example {
        println!("{}", EXAMPLE_PAYLOAD.trim_end());
        return Ok(());
    }

    let json = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let payload = Payload::from_json(&json)?;

    if cli.export_schema {
        let (_, _, schema) = payload.into_parts()?;
        println!("{}", schema.to_json_pretty()?);
        return Ok(());
    }

    let options = RenderOptions {
        format: cli.format.into(),
        separator: cli.separator,
        title: cli.title,
    };
    let bytes = folio::render_payload(payload, &options)?;

    let output = cli.output.unwrap_or_else(|| match options.format {
        OutputFormat::Pdf => PathBuf::from("output.pdf"),
        OutputFormat::Html => PathBuf::from("output.html"),
    });
    std::fs::write(&output, &bytes)?;
    log::info!("Wrote {}", output.display());

    Ok(())
}
