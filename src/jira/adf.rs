//! Conversion between plain text and Atlassian Document Format (ADF).
//!
//! Jira REST API v3 represents issue descriptions and comment bodies as ADF
//! documents. This module offers a deliberately small mapping: blank lines
//! delimit paragraphs, single newlines become hard breaks, and everything
//! else (marks, lists, tables) is flattened to its text content on the way
//! back. The conversion is lossy by design; byte-for-byte round-trips are
//! only guaranteed for single-line text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ADF document as produced by [`text_to_adf`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub version: u32,
    pub content: Vec<AdfNode>,
}

/// A node in an ADF document.
///
/// Only the node kinds this crate emits are modelled; richer documents
/// coming back from the server are handled as raw JSON by [`adf_to_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdfNode {
    #[serde(rename = "paragraph")]
    Paragraph { content: Vec<AdfNode> },
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "hardBreak")]
    HardBreak,
}

/// Convert plain text to an ADF document.
///
/// Blank lines delimit paragraphs; single newlines become hard breaks.
/// Paragraphs that end up with no text nodes are dropped. The result always
/// contains at least one paragraph: if nothing survives (empty or
/// all-whitespace input), a single paragraph holding the raw input is
/// emitted, because Jira rejects documents with no content.
pub fn text_to_adf(text: &str) -> AdfDoc {
    let mut paragraphs = Vec::new();

    for block in text.split("\n\n") {
        let lines: Vec<&str> = block.trim().split('\n').collect();
        let mut content = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if !line.is_empty() {
                content.push(AdfNode::Text {
                    text: (*line).to_string(),
                });
                if i < lines.len() - 1 {
                    content.push(AdfNode::HardBreak);
                }
            }
        }
        if !content.is_empty() {
            paragraphs.push(AdfNode::Paragraph { content });
        }
    }

    if paragraphs.is_empty() {
        paragraphs.push(AdfNode::Paragraph {
            content: vec![AdfNode::Text {
                text: text.to_string(),
            }],
        });
    }

    AdfDoc {
        doc_type: "doc".to_string(),
        version: 1,
        content: paragraphs,
    }
}

/// Extract plain text from an ADF document.
///
/// Accepts the raw JSON value of a description/body field, which may be an
/// ADF document, a plain string (older API shapes), or null. Returns `None`
/// when there is no text to extract, never `Some("")`.
pub fn adf_to_text(adf: &Value) -> Option<String> {
    match adf {
        Value::Null => None,
        Value::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Object(_) => {
            let mut out = String::new();
            traverse(adf, &mut out);
            let trimmed = out.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

fn traverse(node: &Value, out: &mut String) {
    let node_type = node.get("type").and_then(Value::as_str);
    match node_type {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("hardBreak") => out.push('\n'),
        _ => {}
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            traverse(child, out);
        }
    }
    // Separate paragraphs with a single newline, without doubling one that a
    // trailing hard break already emitted.
    if node_type == Some("paragraph") && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
