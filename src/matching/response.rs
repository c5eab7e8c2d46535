// src/matching/response.rs
//! Best-effort extraction of the scoring reply.
//!
//! The model's prose is not trusted: the reply must contain exactly one
//! well-formed top-level JSON object between its first `{` and last `}`.
//! Anything else fails closed.

use super::{JobAnalysis, MatchError, Scores};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Strip a ```json ... ``` or ``` ... ``` wrapper
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(inner) => inner.strip_suffix("```").unwrap_or(inner).trim(),
        None => text,
    }
}

/// Slice from the first `{` to the last `}`
pub fn extract_json_object(text: &str) -> Result<&str, MatchError> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(MatchError::NoJsonObject),
    }
}

#[derive(Debug, Deserialize)]
struct ScoresReply {
    #[serde(default)]
    scores: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct AnalysisReply {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    scores: BTreeMap<String, f64>,
    #[serde(default)]
    suggested_items: Vec<String>,
}

/// Clamp into [0, 100], dropping non-finite values
fn sanitize(scores: BTreeMap<String, f64>) -> Scores {
    scores
        .into_iter()
        .filter(|(_, score)| score.is_finite())
        .map(|(id, score)| (id, score.clamp(0.0, 100.0)))
        .collect()
}

pub fn parse_scores(content: &str) -> Result<Scores, MatchError> {
    let json = extract_json_object(strip_code_fences(content))?;
    let reply: ScoresReply = serde_json::from_str(json)?;
    Ok(sanitize(reply.scores))
}

/// Parse the rich reply, dropping every identifier the resume does not contain
pub fn parse_analysis(content: &str, known_ids: &BTreeSet<String>) -> Result<JobAnalysis, MatchError> {
    let json = extract_json_object(strip_code_fences(content))?;
    let reply: AnalysisReply = serde_json::from_str(json)?;

    let total_scores = reply.scores.len();
    let scores: Scores = sanitize(reply.scores)
        .into_iter()
        .filter(|(id, _)| known_ids.contains(id))
        .collect();

    let total_suggested = reply.suggested_items.len();
    let suggested_items: Vec<String> = reply
        .suggested_items
        .into_iter()
        .filter(|id| known_ids.contains(id))
        .collect();

    if scores.len() < total_scores || suggested_items.len() < total_suggested {
        debug!(
            "Dropped {} unknown scored ids and {} unknown suggestions",
            total_scores - scores.len(),
            total_suggested - suggested_items.len()
        );
    }

    Ok(JobAnalysis {
        keywords: reply.keywords,
        scores,
        suggested_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_reply_parses_like_bare_json() {
        let bare = r#"{"scores": {"b1": 95, "b2": 40.5}}"#;
        let fenced = format!("```json\n{}\n```", bare);

        let expected = parse_scores(bare).unwrap();
        assert_eq!(parse_scores(&fenced).unwrap(), expected);
        assert_eq!(expected.get("b2"), Some(&40.5));

        let analysis = r#"{"keywords": ["go"], "scores": {"b1": 90}, "suggested_items": ["b1"]}"#;
        let ids = known(&["b1"]);
        assert_eq!(
            parse_analysis(&format!("```json\n{}\n```", analysis), &ids).unwrap(),
            parse_analysis(analysis, &ids).unwrap()
        );
    }

    #[test]
    fn test_prose_around_object_is_ignored() {
        let reply = "Sure! Here are the scores:\n{\"scores\": {\"b1\": 70}}\nLet me know if you need more.";
        let scores = parse_scores(reply).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["b1"], 70.0);
    }

    #[test]
    fn test_unbalanced_braces_fail_without_panic() {
        assert!(matches!(
            parse_scores("{\"scores\": {\"b1\": 70}"),
            Err(MatchError::Parse(_))
        ));
        assert!(matches!(parse_scores("} nothing {"), Err(MatchError::NoJsonObject)));
        assert!(matches!(parse_scores("no json at all"), Err(MatchError::NoJsonObject)));
        assert!(matches!(
            parse_analysis("{", &BTreeSet::new()),
            Err(MatchError::NoJsonObject)
        ));
    }

    #[test]
    fn test_scores_are_clamped() {
        let scores = parse_scores(r#"{"scores": {"hi": 140, "lo": -3, "ok": 55}}"#).unwrap();
        assert_eq!(scores["hi"], 100.0);
        assert_eq!(scores["lo"], 0.0);
        assert_eq!(scores["ok"], 55.0);
    }

    #[test]
    fn test_fabricated_ids_are_dropped() {
        let reply = r#"{
            "keywords": ["rust", "aws"],
            "scores": {"b1": 92, "made-up": 99, "skill-go": 80},
            "suggested_items": ["made-up", "b1", "also-fake"]
        }"#;
        let analysis = parse_analysis(reply, &known(&["b1", "skill-go", "lead"])).unwrap();

        assert_eq!(analysis.keywords, vec!["rust", "aws"]);
        assert_eq!(analysis.scores.keys().collect::<Vec<_>>(), vec!["b1", "skill-go"]);
        assert_eq!(analysis.suggested_items, vec!["b1"]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let analysis = parse_analysis(r#"{"keywords": ["x"]}"#, &known(&["b1"])).unwrap();
        assert!(analysis.scores.is_empty());
        assert!(analysis.suggested_items.is_empty());
    }
}
