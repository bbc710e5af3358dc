use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, SetupResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_setup(result: &SetupResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout)?;
        writeln!(stdout, "Dataset prepared at: {}", result.output_dir)?;
        for leaf in &result.leaves {
            writeln!(
                stdout,
                "  {:>5} / {:<9}: {}",
                leaf.split, leaf.label, leaf.images
            )?;
        }
        writeln!(stdout, "  {:>5} / {:<9}: {}", "TOTAL", "ALL", result.total_images)?;
        Ok(())
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        eprintln!("{}", event.message);
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_setup(result: &SetupResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
