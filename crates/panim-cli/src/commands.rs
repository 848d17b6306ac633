//! Subcommand handlers.

use std::{io::Read as _, path::Path, sync::Arc};

use anyhow::{Context as _, Result, anyhow, bail};
use panim_core::{
  AnalysisBuilder, BuildOutcome, HistoryStore, MethodCatalog, NewHistoryItem,
};
use panim_letters::{CipherScheme, TextStats, cipher, gematria, text};
use panim_store_sqlite::SqliteStore;
use tracing::{info, warn};

use crate::{
  client::GeminiClient,
  render,
  settings::{Settings, expand_tilde},
};

/// Words from the command line, or stdin when none were given.
fn input(words: &[String]) -> Result<String> {
  if !words.is_empty() {
    return Ok(words.join(" "));
  }
  let mut buf = String::new();
  std::io::stdin()
    .read_to_string(&mut buf)
    .context("reading stdin")?;
  Ok(buf)
}

// ─── Letter tools ────────────────────────────────────────────────────────────

pub fn gematria(words: &[String]) -> Result<()> {
  println!("{}", gematria::score(&input(words)?));
  Ok(())
}

pub fn cipher(scheme: &str, legend: bool, words: &[String]) -> Result<()> {
  let scheme = CipherScheme::parse(scheme)?;
  if legend {
    for (a, b) in scheme.table().pairs() {
      println!("{a} ↔ {b}");
    }
    return Ok(());
  }
  println!("{}", cipher::apply(scheme, &input(words)?));
  Ok(())
}

pub fn acronym(words: &[String]) -> Result<()> {
  println!("{}", text::acronym(&input(words)?));
  Ok(())
}

pub fn strip(words: &[String]) -> Result<()> {
  println!("{}", text::strip_diacritics(&input(words)?));
  Ok(())
}

pub fn stats(words: &[String]) -> Result<()> {
  let stats = TextStats::of(&input(words)?);
  println!("chars:          {}", stats.chars);
  println!("chars (no ws):  {}", stats.chars_no_spaces);
  println!("words:          {}", stats.words);
  println!("lines:          {}", stats.lines);
  println!("sentences:      {}", stats.sentences);
  Ok(())
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

fn load_catalog(settings: &Settings) -> Result<MethodCatalog> {
  let Some(path) = &settings.catalog_path else {
    return Ok(MethodCatalog::builtin());
  };
  let path = expand_tilde(path);
  let raw = std::fs::read_to_string(&path)
    .with_context(|| format!("reading method catalog {}", path.display()))?;
  MethodCatalog::from_json(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn methods(settings: &Settings) -> Result<()> {
  let catalog = load_catalog(settings)?;
  for level in catalog.levels() {
    println!("{}. {}", level.level, level.title);
    if let Some(desc) = &level.description {
      println!("   {desc}");
    }
    for m in &level.methods {
      println!("   {:<16} {}: {}", m.id, m.name, m.details());
    }
    println!();
  }
  Ok(())
}

// ─── Analysis ────────────────────────────────────────────────────────────────

async fn open_history(settings: &Settings) -> Result<HistoryStore<SqliteStore>> {
  let path = expand_tilde(&settings.store_path);
  if let Some(dir) = path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating {}", dir.display()))?;
  }
  let store = SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))?;
  Ok(
    HistoryStore::open(store)
      .await
      .with_import_policy(settings.import_policy),
  )
}

/// `ID:N` with N counted from 1.
fn parse_context_ref(reference: &str) -> Result<(&str, usize)> {
  let (id, n) = reference
    .rsplit_once(':')
    .ok_or_else(|| anyhow!("context must be ITEM_ID:SEGMENT, got {reference:?}"))?;
  let n: usize = n
    .parse()
    .with_context(|| format!("segment number in {reference:?}"))?;
  if n == 0 || id.is_empty() {
    bail!("context must be ITEM_ID:SEGMENT with SEGMENT from 1, got {reference:?}");
  }
  Ok((id, n))
}

pub struct AnalyzeArgs {
  pub query:   String,
  pub methods: Vec<String>,
  pub from:    Option<String>,
  pub context: Vec<String>,
  pub json:    bool,
}

pub async fn analyze(settings: &Settings, args: AnalyzeArgs) -> Result<()> {
  let mut history = open_history(settings).await?;

  if let Some(id) = &args.from {
    history.select(id)?;
  }
  for reference in &args.context {
    let (id, n) = parse_context_ref(reference)?;
    let segment = history
      .get(id)?
      .analysis
      .get(n - 1)
      .cloned()
      .ok_or_else(|| anyhow!("item {id} has no segment {n}"))?;
    if !history.pending().iter().any(|s| s.same_as(&segment)) {
      history.toggle(segment);
    }
  }

  let builder = AnalysisBuilder::new(
    Arc::new(load_catalog(settings)?),
    GeminiClient::new(settings)?,
  );

  let outcome = tokio::select! {
    outcome = builder.build(&args.query, &args.methods, history.pending()) => outcome?,
    _ = tokio::signal::ctrl_c() => {
      warn!("analysis cancelled; nothing recorded");
      return Ok(());
    }
  };

  match outcome {
    BuildOutcome::Analyzed(record) => {
      let json = args.json;
      let item = history
        .commit(NewHistoryItem::new(args.query, args.methods, record))
        .await;
      if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
      } else {
        print!("{}", render::item(&item));
      }
      info!(id = %item.id, "analysis recorded");
      Ok(())
    }
    BuildOutcome::Fallback { record, reason } => {
      print!("{}", render::analysis(&record));
      bail!("analysis failed, nothing recorded: {reason}")
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

pub async fn history_list(settings: &Settings) -> Result<()> {
  let history = open_history(settings).await?;
  if history.is_empty() {
    eprintln!("history is empty");
  }
  for item in history.items() {
    println!("{}", render::summary_line(item));
  }
  Ok(())
}

pub async fn history_show(settings: &Settings, id: &str, json: bool) -> Result<()> {
  let history = open_history(settings).await?;
  let item = history.get(id)?;
  if json {
    println!("{}", serde_json::to_string_pretty(item)?);
    return Ok(());
  }
  print!("{}", render::item(item));

  let chain = history.ancestors(id)?;
  if !chain.is_empty() {
    let ids: Vec<_> = chain.iter().map(|i| i.id.as_str()).collect();
    println!("thread: {}", ids.join(" ← "));
  }
  Ok(())
}

pub async fn history_tree(settings: &Settings) -> Result<()> {
  let history = open_history(settings).await?;
  print!("{}", render::tree(&history));
  Ok(())
}

pub async fn history_export(settings: &Settings, file: Option<&Path>) -> Result<()> {
  let history = open_history(settings).await?;
  let doc = history.export()?;
  match file {
    Some(path) => {
      std::fs::write(path, doc).with_context(|| format!("writing {}", path.display()))?;
      eprintln!("exported {} items to {}", history.len(), path.display());
    }
    None => println!("{doc}"),
  }
  Ok(())
}

pub async fn history_import(settings: &Settings, file: &Path) -> Result<()> {
  let doc = if file == Path::new("-") {
    input(&[])?
  } else {
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
  };

  let mut history = open_history(settings).await?;
  let added = history.import(&doc).await?;
  println!("imported {added} items");
  Ok(())
}
