//! Unified error types for the launcher workspace.
//!
//! Every composition failure is fatal to the attempt: callers surface the
//! message unchanged and never retry, since configuration errors are not
//! transient.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// A referenced root document or template file does not exist.
    #[error("template file does not exist: {}", path.display())]
    TemplateNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A layer document could not be parsed.
    #[error("YAML syntax error in {}: {source}", path.display())]
    MalformedDocument {
        /// Document that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },

    /// The inclusion graph revisits a reference already being expanded.
    #[error("cyclic template include: {cycle}")]
    CyclicInclude {
        /// The offending path, rendered as `a -> b -> a`.
        cycle: String,
    },

    /// A splice operation names a step key absent at application time.
    #[error("hook `{hook}` has no step with key `{target}`")]
    HookTargetNotFound {
        /// Hook identifier the operation applies to.
        hook: String,
        /// Step key the operation tried to splice around.
        target: String,
    },

    /// A parameter token has no bound value.
    #[error("undefined param `{param}` referenced in {field}")]
    UndefinedParam {
        /// Name inside the token.
        param: String,
        /// Field the token was found in.
        field: String,
    },

    /// No layer supplied a base image.
    #[error("no base image specified in config! set base image with `base_image: {{imagename}}`")]
    MissingBaseImage,

    /// An I/O operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Rendering a document to YAML failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },

    /// An external process could not be spawned or driven.
    #[error("failed to run {program}: {message}")]
    Process {
        /// Executable that failed.
        program: String,
        /// Description of the failure.
        message: String,
    },

    /// An external process exited unsuccessfully.
    #[error("command `{command}` failed with exit code {code}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit code, or -1 when terminated by a signal.
        code: i32,
    },
}

impl LauncherError {
    /// Returns the exit code of a failed external command, if any.
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, LauncherError>;
