use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use chest_xray_setup::app::{App, SetupRequest};
use chest_xray_setup::domain::{DEFAULT_FILE_ID, FileId};
use chest_xray_setup::drive::DriveHttpClient;
use chest_xray_setup::output::{ConsoleOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "cxr-setup")]
#[command(about = "Download and prepare the chest X-ray dataset (train/val/test, NORMAL/PNEUMONIA)")]
#[command(version, author)]
struct Cli {
    /// Output dataset directory.
    #[arg(long, default_value = "data/chest_xray_small")]
    output_dir: Utf8PathBuf,

    /// Path to store the downloaded zip; reused when already present.
    #[arg(long, default_value = "data/chest_xray_small.zip")]
    zip_path: Utf8PathBuf,

    /// Google Drive file id of the archive.
    #[arg(long, default_value = DEFAULT_FILE_ID)]
    file_id: FileId,

    /// Overwrite existing train/val/test folders in output-dir.
    #[arg(long)]
    force: bool,

    /// Print the run summary as JSON instead of the console table.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let drive = DriveHttpClient::new().into_diagnostic()?;
    let app = App::new(drive);
    let request = SetupRequest {
        file_id: cli.file_id,
        zip_path: cli.zip_path,
        output_dir: cli.output_dir,
        force: cli.force,
    };

    match output_mode {
        OutputMode::Console => {
            let result = app.setup(&request, &ConsoleOutput).into_diagnostic()?;
            ConsoleOutput::print_setup(&result).into_diagnostic()?;
        }
        OutputMode::Json => {
            let result = app.setup(&request, &JsonOutput).into_diagnostic()?;
            JsonOutput::print_setup(&result).into_diagnostic()?;
        }
    }
    Ok(())
}
