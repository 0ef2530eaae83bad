//! Error handling for the scaffolder.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by template engines and merge functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Filesystem operation that failed on the destination side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    CreateDir,
    ListDir,
    RemoveDir,
    Write,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            FileOperation::CreateDir => "creating directory",
            FileOperation::ListDir => "listing directory",
            FileOperation::RemoveDir => "removing directory",
            FileOperation::Write => "writing file",
        };
        f.write_str(op)
    }
}

/// Custom error types for scaffolder operations.
///
/// Every variant raised while building carries the path that was being processed,
/// so a stopped-partway build can be diagnosed from the error alone.
#[derive(Error, Debug)]
pub enum Error {
    /// Listing or reading the template tree failed.
    #[error("Failed to read template source '{path}': {source}.")]
    SourceRead {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A template expression could not be parsed.
    #[error("Failed to parse template '{path}': {source}.")]
    TemplateParse {
        path: String,
        #[source]
        source: BoxError,
    },

    /// A template failed while rendering against the context.
    #[error("Failed to render template '{path}': {source}.")]
    TemplateRender {
        path: String,
        #[source]
        source: BoxError,
    },

    /// Create, list, remove or write on the output filesystem failed.
    #[error("IO error while {operation} '{}': {source}.", path.display())]
    DestinationIo {
        operation: FileOperation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A registered merge function failed or panicked.
    #[error("Merge function failed for '{}': {message}.", path.display())]
    MergeFunction { path: PathBuf, message: String },

    /// A version listing endpoint answered with an empty body.
    #[error("Empty response from '{url}'.")]
    EmptyResponse { url: String },

    /// No valid semantic version could be found for a package.
    #[error("No version found for package '{package}'.")]
    NoVersionFound { package: String },

    /// HTTP transport failure or unexpected status while fetching versions.
    #[error("HTTP error for '{url}': {message}.")]
    Http { url: String, message: String },

    /// A shell command exited unsuccessfully.
    #[error("Command '{command}' failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The project manifest could not be read.
    #[error("Cannot read manifest '{}': {source}.", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The project manifest has no declaration line.
    #[error("Empty manifest '{}'.", path.display())]
    EmptyManifest { path: PathBuf },

    /// Configuration or context could not be loaded or parsed.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// An ignore pattern is not a valid glob.
    #[error("Ignore pattern error: {0}.")]
    IgnorePattern(String),

    /// The output directory already exists and neither force nor merge was requested.
    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it or --merge to merge into it.")]
    OutputDirectoryExists { output_dir: String },

    /// Represents other file system errors.
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn destination(
        operation: FileOperation,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Error::DestinationIo {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Default error handler that prints the error and exits the program.
///
/// Only the binary calls this; library code always returns the error.
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
