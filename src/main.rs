mod catalog;
mod commands;
mod core;
mod hosting;
mod reconcile;
mod release;
#[cfg(test)]
mod testing;
mod ui;
mod utils;
mod version;

use clap::{ArgAction, Parser, Subcommand};
use commands::RunOptions;
use crate::core::context::{IdentityArgs, RepoContext};
use crate::core::error::{WardenError, print_error};
use std::path::PathBuf;

/// Keep a repository's labels and release notes draft in sync with GitHub
#[derive(Parser)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,

  /// Apply changes on the hosting platform (default: dry-run)
  #[arg(short, long, global = true)]
  fix: bool,

  /// GitHub organization (default: inferred from the origin remote)
  #[arg(short, long, global = true)]
  org: Option<String>,

  /// GitHub repository name (default: inferred from the origin remote)
  #[arg(short, long, global = true)]
  repo: Option<String>,

  /// Repository root
  #[arg(short = 'C', long, global = true, default_value = ".")]
  root: PathBuf,

  /// Debug logging
  #[arg(short, long, global = true)]
  debug: bool,

  /// More logging (repeatable)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Output reports in JSON format
  #[arg(long, global = true)]
  json: bool,

  /// Fetch tags from origin with pruning before resolving the release window
  #[arg(long, global = true)]
  prune_tags: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
  /// Generate release notes and sync the draft release (default)
  Draft,

  /// Audit pull requests for required category labels
  Pulls,

  /// Check that the label catalog is defined in the repository
  Labels,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Route logs to stderr; `RUST_LOG` directives are combined with the flag level
fn setup_logging(debug: bool, verbosity: u8) {
  use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

  let level = match (debug, verbosity) {
    (_, 2..) => tracing::Level::TRACE,
    (true, _) | (false, 1) => tracing::Level::DEBUG,
    (false, _) => tracing::Level::INFO,
  };

  let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

  let fmt_layer = tracing_subscriber::fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time();

  tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

fn main() {
  let cli = Cli::parse();
  setup_logging(cli.debug, cli.verbose);

  let identity = IdentityArgs {
    org: cli.org.clone(),
    repo: cli.repo.clone(),
  };
  let ctx = match RepoContext::build(&cli.root, &identity) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let opts = RunOptions {
    fix: cli.fix,
    json: cli.json,
    prune_tags: cli.prune_tags,
  };

  let result = match cli.command.unwrap_or(Commands::Draft) {
    Commands::Draft => commands::run_draft(&ctx, opts),
    Commands::Pulls => commands::run_pulls(&ctx, opts),
    Commands::Labels => commands::run_labels(&ctx, opts),
  };

  if let Err(e) = result {
    handle_error(e);
  }
}

fn handle_error(error: WardenError) -> ! {
  print_error(&error);
  std::process::exit(error.exit_code().as_i32());
}
