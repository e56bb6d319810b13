//! Sample utterance parsing.
//!
//! Utterances mark slots with braces: `"weather in {city}"`. Alexa keeps the
//! markers as-is; Dialogflow needs the text split into plain and entity parts.

use crate::content::Intent;

use super::types::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  Text(&'a str),
  Slot(&'a str),
}

/// Split an utterance into text and slot segments.
///
/// Returns `None` for unbalanced braces or empty slot names.
pub fn parse(utterance: &str) -> Option<Vec<Segment<'_>>> {
  let mut segments = Vec::new();
  let mut rest = utterance;

  while let Some(open) = rest.find(['{', '}']) {
    if rest.as_bytes()[open] == b'}' {
      return None;
    }
    if open > 0 {
      segments.push(Segment::Text(&rest[..open]));
    }
    let after = &rest[open + 1..];
    let close = after.find('}')?;
    let name = after[..close].trim();
    if name.is_empty() || name.contains('{') {
      return None;
    }
    segments.push(Segment::Slot(name));
    rest = &after[close + 1..];
  }

  if !rest.is_empty() {
    segments.push(Segment::Text(rest));
  }

  Some(segments)
}

/// Parse an utterance of `intent` and check every slot it uses is declared.
pub fn parse_for_intent<'u>(intent: &Intent, utterance: &'u str) -> Result<Vec<Segment<'u>>, BuildError> {
  let segments = parse(utterance).ok_or_else(|| BuildError::MalformedUtterance {
    intent: intent.name.clone(),
    utterance: utterance.to_string(),
  })?;

  for segment in &segments {
    if let Segment::Slot(name) = segment
      && intent.slot(name).is_none()
    {
      return Err(BuildError::UndeclaredSlot {
        intent: intent.name.clone(),
        slot: name.to_string(),
        utterance: utterance.to_string(),
      });
    }
  }

  Ok(segments)
}
