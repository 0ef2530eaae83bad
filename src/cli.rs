//! Command-line interface implementation for scaffolder.
//! Provides argument parsing and help text formatting using clap.

use crate::error::{Error, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::{Path, PathBuf};

/// Command-line arguments structure for scaffolder.
#[derive(Parser, Debug)]
#[command(author, version, about = "scaffolder: generate and merge project trees from templates", long_about = None)]
pub struct Args {
    /// Path to the template directory
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory where the project will be generated
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// JSON or YAML file holding the template context
    #[arg(short, long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Read the template context from stdin
    #[arg(short, long, conflicts_with = "context")]
    pub stdin: bool,

    /// Merge rendered files into existing ones instead of overwriting them
    #[arg(short, long)]
    pub merge: bool,

    /// Generate into an existing output directory, overwriting files
    #[arg(short, long)]
    pub force: bool,

    /// Template subdirectory the walk starts from
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Suffix marking template files, stripped from output names
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Command to run inside the output directory after generation (repeatable)
    #[arg(long = "run", value_name = "COMMAND")]
    pub run: Vec<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                if let Err(err) = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                {
                    eprintln!("Failed to print help: {err}");
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExists` if the directory exists and `allow_existing` is false
pub fn get_output_dir<P: AsRef<Path>>(output_dir: P, allow_existing: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !allow_existing {
        return Err(Error::OutputDirectoryExists {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}
