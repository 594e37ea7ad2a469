//! Error types for warden with contextual messages and exit codes
//!
//! Every fatal condition the tool can hit is categorized here so that `main` can print a
//! single message (plus an optional hint) and pick the right process exit code.
//! Recoverable policy findings are NOT errors while a run is in progress; they are
//! collected as data and only turned into a [`PolicyError`] once the report is printed.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for warden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, repository state)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Compliance violations were found
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for warden
#[derive(Debug)]
pub enum WardenError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Hosting platform (transport or API) errors
  Hosting(HostingError),

  /// Release window resolution errors
  Release(ReleaseError),

  /// Compliance findings surfaced at the end of a run
  Policy(PolicyError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl WardenError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    WardenError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    WardenError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      WardenError::Message { message, context, help } => WardenError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      WardenError::Io(err) => WardenError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      WardenError::Config(_) => ExitCode::User,
      WardenError::Git(_) => ExitCode::System,
      WardenError::Hosting(_) => ExitCode::System,
      WardenError::Release(_) => ExitCode::User,
      WardenError::Policy(_) => ExitCode::Validation,
      WardenError::Io(_) => ExitCode::System,
      WardenError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      WardenError::Config(e) => e.help_message(),
      WardenError::Git(e) => e.help_message(),
      WardenError::Hosting(e) => e.help_message(),
      WardenError::Release(e) => e.help_message(),
      WardenError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for WardenError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WardenError::Config(e) => write!(f, "{}", e),
      WardenError::Git(e) => write!(f, "{}", e),
      WardenError::Hosting(e) => write!(f, "{}", e),
      WardenError::Release(e) => write!(f, "{}", e),
      WardenError::Policy(e) => write!(f, "{}", e),
      WardenError::Io(e) => write!(f, "I/O error: {}", e),
      WardenError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for WardenError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      WardenError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for WardenError {
  fn from(err: io::Error) -> Self {
    WardenError::Io(err)
  }
}

impl From<String> for WardenError {
  fn from(msg: String) -> Self {
    WardenError::message(msg)
  }
}

impl From<&str> for WardenError {
  fn from(msg: &str) -> Self {
    WardenError::message(msg)
  }
}

impl From<toml_edit::de::Error> for WardenError {
  fn from(err: toml_edit::de::Error) -> Self {
    WardenError::Config(ConfigError::Malformed {
      location: None,
      reason: err.to_string(),
    })
  }
}

impl From<serde_yaml::Error> for WardenError {
  fn from(err: serde_yaml::Error) -> Self {
    WardenError::Config(ConfigError::Malformed {
      location: None,
      reason: err.to_string(),
    })
  }
}

impl From<serde_json::Error> for WardenError {
  fn from(err: serde_json::Error) -> Self {
    WardenError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for WardenError {
  fn from(err: reqwest::Error) -> Self {
    WardenError::Hosting(HostingError::Transport {
      reason: err.to_string(),
    })
  }
}

impl From<std::string::FromUtf8Error> for WardenError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    WardenError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// None of the candidate locations held the document
  NotFound { document: String, tried: Vec<String> },

  /// Document exists but could not be deserialized
  Malformed { location: Option<String>, reason: String },

  /// The same label is declared twice in the catalog
  DuplicateLabel { name: String },

  /// Repository identity could not be determined
  UnknownIdentity { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "Create the file locally or publish it in the organization's shared `meta` repository.".to_string(),
      ),
      ConfigError::UnknownIdentity { .. } => {
        Some("Pass --org and --repo, or run inside a clone with an `origin` remote.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { document, tried } => {
        write!(f, "Unable to load {} from any location", document)?;
        for location in tried {
          write!(f, "\n  tried: {}", location)?;
        }
        Ok(())
      }
      ConfigError::Malformed { location, reason } => match location {
        Some(location) => write!(f, "Malformed configuration in {}: {}", location, reason),
        None => write!(f, "Malformed configuration: {}", reason),
      },
      ConfigError::DuplicateLabel { name } => {
        write!(f, "Label '{}' is declared more than once in the label catalog", name)
      }
      ConfigError::UnknownIdentity { reason } => {
        write!(f, "Could not determine repository organization/name: {}", reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Remote not configured
  RemoteNotFound { name: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run warden inside a git clone or point --root at one (got {})",
        path.display()
      )),
      GitError::RemoteNotFound { name } => Some(format!("Add the remote with `git remote add {} <url>`", name)),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::RemoteNotFound { name } => {
        write!(f, "Git remote '{}' is not configured", name)
      }
    }
  }
}

/// Hosting platform errors
///
/// Never retried; a failed call aborts the current command.
#[derive(Debug)]
pub enum HostingError {
  /// The request did not complete (DNS, TLS, timeout, body decoding)
  Transport { reason: String },

  /// The platform answered with a non-success status
  Api { status: u16, endpoint: String, message: String },
}

impl HostingError {
  fn help_message(&self) -> Option<String> {
    match self {
      HostingError::Api { status: 401, .. } | HostingError::Api { status: 403, .. } => {
        Some("Export a token with repository scope in GITHUB_TOKEN (or the variable named by github.token_env).".to_string())
      }
      HostingError::Api { status: 404, .. } => {
        Some("Check the organization/repository names; private repositories also require a token.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for HostingError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HostingError::Transport { reason } => write!(f, "Hosting platform request failed: {}", reason),
      HostingError::Api {
        status,
        endpoint,
        message,
      } => write!(f, "Hosting platform returned {} for {}: {}", status, endpoint, message),
    }
  }
}

/// Release window errors
#[derive(Debug)]
pub enum ReleaseError {
  /// No tag qualifies as the start of the unreleased window
  NoReleaseBoundary { tags_inspected: usize },
}

impl ReleaseError {
  fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::NoReleaseBoundary { .. } => Some(
        "Tag the last stable release (e.g. `git tag v1.0.0 <sha>`); pre-release tags never start a window.".to_string(),
      ),
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::NoReleaseBoundary { tags_inspected } => write!(
        f,
        "No release boundary: none of the {} tag(s) is a non-prerelease version",
        tags_inspected
      ),
    }
  }
}

/// Compliance findings turned into a non-zero exit
#[derive(Debug)]
pub enum PolicyError {
  /// Violations were collected during a complete run
  ViolationsFound { count: usize, subject: &'static str },

  /// The pull-request audit stopped early
  AuditLimitExceeded { limit: usize },
}

impl fmt::Display for PolicyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PolicyError::ViolationsFound { count, subject } => {
        write!(f, "{} {} violation(s) found", count, subject)
      }
      PolicyError::AuditLimitExceeded { limit } => write!(
        f,
        "Pull-request audit aborted after more than {} non-compliant pull requests",
        limit
      ),
    }
  }
}

/// Result type alias for warden
pub type WardenResult<T> = Result<T, WardenError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> WardenResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> WardenResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<WardenError>,
{
  fn context(self, ctx: impl Into<String>) -> WardenResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> WardenResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with help text
pub fn print_error(error: &WardenError) {
  eprintln!("\nerror: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("help: {}\n", help);
  }
}
