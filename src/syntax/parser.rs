//! Position-tracking YAML loader.
//!
//! Builds [`SourceNode`] trees directly from the `yaml-rust2` event stream so
//! that each node keeps the marker of the event that opened it. Plain scalars
//! are typed with the YAML core schema; quoted and block scalars stay strings.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::ast::{Position, Scalar, SourceNode, Value};
use crate::syntax::error::YamlError;

static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").unwrap());
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?$").unwrap());

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses every document of a YAML stream.
pub fn parse_documents(source: &str, file: Option<&str>) -> Result<Vec<SourceNode>, YamlError> {
    let mut builder = TreeBuilder::new(file);
    let mut parser = Parser::new(source.chars());
    parser.load(&mut builder, true).map_err(|e| {
        let marker = e.marker();
        YamlError::new(e.to_string(), file).at(marker.line(), marker.col() + 1)
    })?;
    builder.finish()
}

/// Parses the first document of a YAML stream. An empty stream yields a
/// null node.
///
/// # Examples
///
/// ```rust
/// use mplcheck::syntax::parse_document;
/// let node = parse_document("Name: Instance\n", Some("Instance.yaml")).unwrap();
/// let name = node.get("Name").unwrap();
/// assert_eq!(name.as_str(), Some("Instance"));
/// assert_eq!(name.position.as_ref().map(|p| (p.line, p.column)), Some((1, 7)));
/// ```
pub fn parse_document(source: &str, file: Option<&str>) -> Result<SourceNode, YamlError> {
    let documents = parse_documents(source, file)?;
    Ok(documents.into_iter().next().unwrap_or_else(SourceNode::null))
}

// ============================================================================
// TREE BUILDER
// ============================================================================

enum Frame {
    Sequence {
        items: Vec<SourceNode>,
        position: Position,
        anchor: usize,
    },
    Mapping {
        entries: Vec<(SourceNode, SourceNode)>,
        pending_key: Option<SourceNode>,
        position: Position,
        anchor: usize,
    },
}

struct TreeBuilder {
    file: Option<Arc<str>>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, SourceNode>,
    documents: Vec<SourceNode>,
    error: Option<YamlError>,
}

impl TreeBuilder {
    fn new(file: Option<&str>) -> Self {
        Self {
            file: file.map(Arc::from),
            stack: Vec::new(),
            anchors: HashMap::new(),
            documents: Vec::new(),
            error: None,
        }
    }

    fn finish(self) -> Result<Vec<SourceNode>, YamlError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.documents)
    }

    fn position(&self, mark: &Marker) -> Position {
        Position {
            line: mark.line(),
            column: mark.col() + 1,
            file: self.file.clone(),
        }
    }

    fn push_node(&mut self, node: SourceNode, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }

        let Some(frame) = self.stack.last_mut() else {
            self.documents.push(node);
            return;
        };

        match frame {
            Frame::Sequence { items, .. } => items.push(node),
            Frame::Mapping {
                entries,
                pending_key,
                ..
            } => match pending_key.take() {
                None => *pending_key = Some(node),
                Some(key) => {
                    if let Some(slot) = entries.iter_mut().find(|(k, _)| k.value == key.value) {
                        tracing::debug!(key = %key, "duplicate mapping key, last value wins");
                        slot.1 = node;
                    } else {
                        entries.push((key, node));
                    }
                }
            },
        }
    }

    fn close_sequence(&mut self) {
        if let Some(Frame::Sequence {
            items,
            position,
            anchor,
        }) = self.stack.pop()
        {
            let node = SourceNode::sequence(items).with_position(position);
            self.push_node(node, anchor);
        }
    }

    fn close_mapping(&mut self) {
        if let Some(Frame::Mapping {
            entries,
            pending_key,
            position,
            anchor,
        }) = self.stack.pop()
        {
            let mut entries = entries;
            // a dangling key can only come from a truncated stream
            if let Some(key) = pending_key {
                entries.push((key, SourceNode::null()));
            }
            let node = SourceNode::mapping(entries).with_position(position);
            self.push_node(node, anchor);
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }

        match event {
            Event::Scalar(text, style, anchor, ..) => {
                let scalar = if matches!(style, TScalarStyle::Plain) {
                    resolve_plain(&text)
                } else {
                    Scalar::Str(text)
                };
                let node = SourceNode::new(Value::Scalar(scalar)).with_position(self.position(&mark));
                self.push_node(node, anchor);
            }
            Event::SequenceStart(anchor, ..) => {
                let position = self.position(&mark);
                self.stack.push(Frame::Sequence {
                    items: Vec::new(),
                    position,
                    anchor,
                });
            }
            Event::SequenceEnd => self.close_sequence(),
            Event::MappingStart(anchor, ..) => {
                let position = self.position(&mark);
                self.stack.push(Frame::Mapping {
                    entries: Vec::new(),
                    pending_key: None,
                    position,
                    anchor,
                });
            }
            Event::MappingEnd => self.close_mapping(),
            Event::Alias(id) => match self.anchors.get(&id).cloned() {
                Some(node) => self.push_node(node, 0),
                None => {
                    let position = self.position(&mark);
                    self.error = Some(
                        YamlError::new(format!("unknown anchor id {}", id), self.file.as_deref())
                            .at(position.line, position.column),
                    );
                }
            },
            _ => {}
        }
    }
}

// ============================================================================
// SCALAR RESOLUTION
// ============================================================================

/// Types an unquoted scalar following the YAML 1.2 core schema.
fn resolve_plain(text: &str) -> Scalar {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Scalar::Null,
        "true" | "True" | "TRUE" => return Scalar::Bool(true),
        "false" | "False" | "FALSE" => return Scalar::Bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Scalar::Float(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Scalar::Float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Scalar::Float(f64::NAN),
        _ => {}
    }

    if INT_RE.is_match(text) {
        if let Ok(value) = text.parse::<i64>() {
            return Scalar::Int(value);
        }
    }

    if FLOAT_RE.is_match(text) {
        if let Ok(value) = text.parse::<f64>() {
            return Scalar::Float(value);
        }
    }

    Scalar::Str(text.to_string())
}
