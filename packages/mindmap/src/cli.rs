//! Command-line interface for the transcoder.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::{default_converter, default_mindmap, read_file, write_file, write_string};
use crate::error::{Result, TranscodeError};

/// Mind-map transcoder - Read, check and rewrite Freeplane mind maps.
#[derive(Parser)]
#[command(name = "mindmap-transcoder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a mind map and report conversion diagnostics.
    Check {
        /// Mind map file (.mm)
        file: PathBuf,

        /// Exit with an error when any problem is reported
        #[arg(long)]
        strict: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Decode a mind map and encode it again.
    Roundtrip {
        /// Mind map file to read
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a new mind map with the default styles.
    New {
        /// Output file
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Yaml,
}

/// Machine-readable result of `check`.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    file: String,
    nodes: usize,
    diagnostics: &'a Diagnostics,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            strict,
            format,
        } => check_command(&file, strict, format),
        Commands::Roundtrip { input, output } => roundtrip_command(&input, output.as_deref()),
        Commands::New { output } => new_command(&output),
    }
}

/// Execute the check command.
fn check_command(file: &Path, strict: bool, format: Format) -> Result<()> {
    let converter = default_converter()?;
    let decoded = read_file(&converter, file)?;

    match format {
        Format::Yaml => {
            let report = CheckReport {
                file: file.display().to_string(),
                nodes: decoded.tree.len(),
                diagnostics: &decoded.diagnostics,
            };
            print!("{}", serde_yaml_ng::to_string(&report)?);
        }
        Format::Text => {
            println!(
                "{} {} ({} elements)",
                style("Checked").bold(),
                style(file.display()).cyan(),
                decoded.tree.len()
            );
            print_diagnostics(&decoded.diagnostics);
        }
    }

    if strict && !decoded.diagnostics.is_empty() {
        return Err(TranscodeError::CheckFailed {
            problems: decoded.diagnostics.len(),
        });
    }
    Ok(())
}

/// Execute the roundtrip command.
fn roundtrip_command(input: &Path, output: Option<&Path>) -> Result<()> {
    let converter = default_converter()?;
    let decoded = read_file(&converter, input)?;

    let mut diagnostics = decoded.diagnostics;
    match output {
        Some(path) => {
            for diagnostic in write_file(&converter, &decoded.tree, path)? {
                diagnostics.push(diagnostic);
            }
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => {
            let written = write_string(&converter, &decoded.tree)?;
            print!("{}", written.tree);
            for diagnostic in written.diagnostics {
                diagnostics.push(diagnostic);
            }
        }
    }

    if !diagnostics.is_empty() {
        eprintln!(
            "  Diagnostics: {}",
            style(diagnostics.len()).yellow().bold()
        );
    }
    Ok(())
}

/// Execute the new command.
fn new_command(output: &Path) -> Result<()> {
    let converter = default_converter()?;
    let decoded = default_mindmap(&converter)?;
    write_file(&converter, &decoded.tree, output)?;
    println!("{} {}", style("Created").green().bold(), output.display());
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        println!("  {}", style("No problems found").green());
        return;
    }
    println!("  Diagnostics: {}", style(diagnostics.len()).yellow().bold());
    for diagnostic in diagnostics.iter() {
        let kind = match diagnostic {
            Diagnostic::ApiMisuse { .. } => style(diagnostic.kind()).red(),
            _ => style(diagnostic.kind()).yellow(),
        };
        println!("  - {kind}: {diagnostic}");
    }
}
