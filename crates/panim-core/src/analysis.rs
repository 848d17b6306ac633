//! The analysis record builder.
//!
//! Turns a query, a method selection, and optional context segments into a
//! request for the external analysis service, and validates what comes back.
//! The builder never touches the history; callers append the record after a
//! successful build. Dropping a pending build discards its result.

use std::{future::Future, sync::Arc};

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  catalog::{MethodCatalog, MethodDescriptor},
  model::{AnalysisRecord, AnalysisSegment, EssenceCard},
};

/// Number of summary cards requested from the service.
pub const CARD_COUNT: usize = 9;

/// Sentences requested per card.
pub const CARD_SENTENCES: usize = 4;

// ─── Collaborator ────────────────────────────────────────────────────────────

/// Everything the external service is sent for one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CollaboratorRequest {
  pub system_instruction: String,
  /// The user's query, verbatim.
  pub contents:           String,
  /// Schema of the structured output the service must produce.
  pub response_schema:    Value,
}

/// The external analysis service. Returns the raw response text.
pub trait Collaborator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    request: &'a CollaboratorRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
  /// A validated result, ready to be recorded.
  Analyzed(AnalysisRecord),
  /// The service failed; `record` carries a single diagnostic segment and
  /// should be shown but not recorded.
  Fallback {
    record: AnalysisRecord,
    reason: String,
  },
}

impl BuildOutcome {
  pub fn record(&self) -> &AnalysisRecord {
    match self {
      Self::Analyzed(record) | Self::Fallback { record, .. } => record,
    }
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

pub struct AnalysisBuilder<C> {
  catalog:      Arc<MethodCatalog>,
  collaborator: C,
}

impl<C: Collaborator> AnalysisBuilder<C> {
  pub fn new(catalog: Arc<MethodCatalog>, collaborator: C) -> Self {
    Self { catalog, collaborator }
  }

  pub fn catalog(&self) -> &MethodCatalog { &self.catalog }

  pub fn collaborator(&self) -> &C { &self.collaborator }

  /// Assemble the request without sending it.
  pub fn request(
    &self,
    query: &str,
    method_ids: &[String],
    context: &[AnalysisSegment],
  ) -> Result<CollaboratorRequest> {
    if query.trim().is_empty() {
      return Err(Error::EmptyInput("the query is blank"));
    }
    if method_ids.is_empty() {
      return Err(Error::EmptyInput("no analysis method selected"));
    }
    let methods = self.catalog.resolve(method_ids);
    if methods.is_empty() {
      return Err(Error::EmptyInput("none of the selected methods are known"));
    }

    Ok(CollaboratorRequest {
      system_instruction: system_instruction(query, &methods, context),
      contents:           query.to_owned(),
      response_schema:    response_schema(),
    })
  }

  /// Run one analysis and return the validated record, or the error that
  /// prevented it.
  pub async fn try_build(
    &self,
    query: &str,
    method_ids: &[String],
    context: &[AnalysisSegment],
  ) -> Result<AnalysisRecord> {
    let request = self.request(query, method_ids, context)?;
    debug!(
      methods = method_ids.len(),
      context = context.len(),
      "sending analysis request"
    );

    let text = self
      .collaborator
      .generate(&request)
      .await
      .map_err(|e| Error::Collaborator(Box::new(e)))?;

    parse_response(&text)
  }

  /// Like [`try_build`](Self::try_build), but a failing service yields a
  /// diagnostic record instead of an error. Only empty input is an error.
  pub async fn build(
    &self,
    query: &str,
    method_ids: &[String],
    context: &[AnalysisSegment],
  ) -> Result<BuildOutcome> {
    match self.try_build(query, method_ids, context).await {
      Ok(record) => Ok(BuildOutcome::Analyzed(record)),
      Err(e) if e.is_collaborator() => {
        warn!(error = %e, "analysis failed; showing diagnostic");
        let reason = e.to_string();
        Ok(BuildOutcome::Fallback {
          record: AnalysisRecord::fallback(&reason),
          reason,
        })
      }
      Err(e) => Err(e),
    }
  }
}

// ─── Prompt ──────────────────────────────────────────────────────────────────

/// Context segments as `[Title: t]` blocks separated by `---` lines.
pub fn context_block(segments: &[AnalysisSegment]) -> String {
  segments
    .iter()
    .map(|s| format!("[Title: {}]\n{}", s.title, s.content))
    .collect::<Vec<_>>()
    .join("\n---\n")
}

fn system_instruction(
  query: &str,
  methods: &[&MethodDescriptor],
  context: &[AnalysisSegment],
) -> String {
  let mut out =
    String::from("Analyze the user input using the following selected methods:\n");
  for m in methods {
    out.push_str(&format!("- {}: {}\n", m.name, m.details()));
  }

  if !context.is_empty() {
    out.push_str("\nCONTEXT FROM PREVIOUS ANALYSIS:\n");
    out.push_str("The user is continuing a conversation based on the following segments:\n");
    out.push_str(&context_block(context));
    out.push_str(&format!(
      "\n\nPlease answer the new query: \"{query}\" taking into account the context above.\n"
    ));
  }

  out.push_str(&format!(
    "\nReturn JSON with \"analysis\" (array of {{title, level, content, tags: string[]}}) \
     and \"cards\" (exactly {CARD_COUNT} {{title, element, energy, score, \
     sentences:[{CARD_SENTENCES}], tags: string[]}}) keys.\n\
     Use Nikud in cards sentences. Format content with markdown.\n\
     \"tags\" should be a short list of keywords (1-3) related to the specific \
     content of the segment/card.\n"
  ));
  out
}

/// Structured-output schema sent with every request.
pub fn response_schema() -> Value {
  let tags = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
  json!({
    "type": "OBJECT",
    "properties": {
      "analysis": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "title":   { "type": "STRING" },
            "level":   { "type": "NUMBER" },
            "content": { "type": "STRING" },
            "tags":    tags.clone(),
          },
          "required": ["title", "level", "content"],
        },
      },
      "cards": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "title":     { "type": "STRING" },
            "element":   { "type": "STRING" },
            "energy":    { "type": "STRING" },
            "score":     { "type": "NUMBER" },
            "sentences": { "type": "ARRAY", "items": { "type": "STRING" } },
            "tags":      tags,
          },
          "required": ["title", "element", "energy", "score", "sentences"],
        },
      },
    },
    "required": ["analysis", "cards"],
  })
}

// ─── Response ────────────────────────────────────────────────────────────────

/// Validate the service's response text.
///
/// Blank text is an empty result and missing keys are empty sequences, but
/// anything that is not a JSON object, or any element of the wrong shape,
/// rejects the whole response.
pub fn parse_response(text: &str) -> Result<AnalysisRecord> {
  let text = text.trim();
  if text.is_empty() {
    return Ok(AnalysisRecord::default());
  }

  let value: Value = serde_json::from_str(text)
    .map_err(|e| Error::MalformedResponse(format!("not valid JSON: {e}")))?;
  let Value::Object(mut doc) = value else {
    return Err(Error::MalformedResponse("expected a JSON object".into()));
  };

  let segments: Vec<AnalysisSegment> = take_sequence(&mut doc, "analysis")?;
  let cards: Vec<EssenceCard> = take_sequence(&mut doc, "cards")?;

  if cards.len() != CARD_COUNT {
    warn!(cards = cards.len(), expected = CARD_COUNT, "unexpected card count");
  }

  Ok(AnalysisRecord { segments, cards })
}

fn take_sequence<T>(doc: &mut Map<String, Value>, key: &str) -> Result<Vec<T>>
where
  T: serde::de::DeserializeOwned,
{
  match doc.remove(key) {
    None | Some(Value::Null) => Ok(Vec::new()),
    Some(value) => serde_json::from_value(value)
      .map_err(|e| Error::MalformedResponse(format!("{key}: {e}"))),
  }
}
