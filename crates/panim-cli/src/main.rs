//! `panim`: command-line front end for the 70 Panim workbench.
//!
//! # Usage
//!
//! ```text
//! panim gematria בראשית
//! panim cipher --scheme albam שלום
//! panim analyze -m gematria -m notarikon "מה פירוש השם?"
//! panim analyze --from <ID> --context <ID>:2 -m sod-letters "ומה הסוד?"
//! panim history tree
//! panim history export backup.json
//! ```
//!
//! Settings come from `~/.config/panim/config.toml` (or `--config`) and
//! `PANIM_*` environment variables.

mod client;
mod commands;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "panim", version, about = "Multi-layered Hebrew text analysis")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "~/.config/panim/config.toml")]
  config: PathBuf,

  /// History database, overriding the configured `store_path`.
  #[arg(long, value_name = "FILE", global = true)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sum the standard letter values of TEXT.
  Gematria { text: Vec<String> },

  /// Apply a letter-substitution cipher.
  Cipher {
    /// atbash, albam, or atbah (aliases accepted).
    #[arg(short, long, default_value = "atbash")]
    scheme: String,

    /// Print the scheme's letter pairs instead of transforming text.
    #[arg(long)]
    legend: bool,

    text: Vec<String>,
  },

  /// First letter of each word.
  Acronym { text: Vec<String> },

  /// Remove vowel points and cantillation marks.
  Strip { text: Vec<String> },

  /// Character, word, line, and sentence counts.
  Stats { text: Vec<String> },

  /// List the analysis methods by level.
  Methods,

  /// Run an analysis and record it in the history.
  Analyze {
    /// Method id; repeat for several.
    #[arg(short, long = "method", value_name = "ID", required = true)]
    methods: Vec<String>,

    /// Continue from this history item.
    #[arg(long, value_name = "ID")]
    from: Option<String>,

    /// Seed with segment N (1-based) of a history item; repeatable.
    #[arg(long, value_name = "ID:N")]
    context: Vec<String>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    query: Vec<String>,
  },

  /// Browse and move the analysis history.
  #[command(subcommand)]
  History(HistoryCommand),
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
  /// Items, newest first.
  List,
  /// Print one item in full.
  Show {
    id:   String,
    #[arg(long)]
    json: bool,
  },
  /// Items as a forest of continuations.
  Tree,
  /// Write the history as JSON to FILE, or stdout.
  Export { file: Option<PathBuf> },
  /// Add the items of an exported file (`-` reads stdin).
  Import { file: PathBuf },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(store) = cli.store {
    settings.store_path = store;
  }

  match cli.command {
    Command::Gematria { text } => commands::gematria(&text),
    Command::Cipher { scheme, legend, text } => commands::cipher(&scheme, legend, &text),
    Command::Acronym { text } => commands::acronym(&text),
    Command::Strip { text } => commands::strip(&text),
    Command::Stats { text } => commands::stats(&text),
    Command::Methods => commands::methods(&settings),
    Command::Analyze {
      methods,
      from,
      context,
      json,
      query,
    } => {
      let request = commands::AnalyzeArgs {
        query: query.join(" "),
        methods,
        from,
        context,
        json,
      };
      commands::analyze(&settings, request).await
    }
    Command::History(cmd) => match cmd {
      HistoryCommand::List => commands::history_list(&settings).await,
      HistoryCommand::Show { id, json } => commands::history_show(&settings, &id, json).await,
      HistoryCommand::Tree => commands::history_tree(&settings).await,
      HistoryCommand::Export { file } => commands::history_export(&settings, file.as_deref()).await,
      HistoryCommand::Import { file } => commands::history_import(&settings, &file).await,
    },
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn cli_definition_is_consistent() { Cli::command().debug_assert(); }

  #[test]
  fn analyze_collects_repeated_flags() {
    let cli = Cli::parse_from([
      "panim", "analyze", "-m", "gematria", "--method", "atbash", "--context", "abc:2",
      "מה", "זה",
    ]);
    let Command::Analyze { methods, context, query, from, .. } = cli.command else {
      panic!("expected analyze");
    };
    assert_eq!(methods, ["gematria", "atbash"]);
    assert_eq!(context, ["abc:2"]);
    assert_eq!(query, ["מה", "זה"]);
    assert_eq!(from, None);
  }
}
