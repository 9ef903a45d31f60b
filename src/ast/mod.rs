//! Source tree for parsed YAML documents.
//!
//! Every node produced by the YAML front end carries the position of the
//! event that opened it, so that any finding about the node can be reported
//! at its exact line and column.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A 1-based line/column position inside a named source file.
///
/// # Examples
///
/// ```rust
/// use mplcheck::ast::Position;
/// let pos = Position::new(3, 7, Some("manifest.yaml"));
/// assert_eq!(pos.line, 3);
/// assert_eq!(pos.file.as_deref(), Some("manifest.yaml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub file: Option<Arc<str>>,
}

impl Position {
    pub fn new(line: usize, column: usize, file: Option<&str>) -> Self {
        Self {
            line,
            column,
            file: file.map(Arc::from),
        }
    }
}

/// Leaf values of a YAML document after core-schema typing.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Shape of a node: scalar, ordered sequence or ordered mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<SourceNode>),
    /// Entries keep document order; keys are unique.
    Mapping(Vec<(SourceNode, SourceNode)>),
}

/// A parsed YAML value annotated with where it came from.
///
/// Nodes are immutable once the front end has built them; validators only
/// ever borrow them.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub value: Value,
    pub position: Option<Position>,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl SourceNode {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            position: None,
        }
    }

    pub fn null() -> Self {
        Self::new(Value::Scalar(Scalar::Null))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(Value::Scalar(Scalar::Bool(value)))
    }

    pub fn int(value: i64) -> Self {
        Self::new(Value::Scalar(Scalar::Int(value)))
    }

    pub fn float(value: f64) -> Self {
        Self::new(Value::Scalar(Scalar::Float(value)))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Value::Scalar(Scalar::Str(value.into())))
    }

    pub fn sequence(items: Vec<SourceNode>) -> Self {
        Self::new(Value::Sequence(items))
    }

    /// Builds a mapping from ordered entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mplcheck::ast::SourceNode;
    /// let node = SourceNode::mapping(vec![
    ///     (SourceNode::string("While"), SourceNode::string("$.ready()")),
    /// ]);
    /// assert_eq!(node.get("While").and_then(|v| v.as_str()), Some("$.ready()"));
    /// ```
    pub fn mapping(entries: Vec<(SourceNode, SourceNode)>) -> Self {
        Self::new(Value::Mapping(entries))
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl From<&str> for SourceNode {
    fn from(value: &str) -> Self {
        SourceNode::string(value)
    }
}

// ============================================================================
// ACCESSORS
// ============================================================================

impl SourceNode {
    /// Returns the text of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[SourceNode]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(SourceNode, SourceNode)]> {
        match &self.value {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Scalar(Scalar::Null))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.value, Value::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.value, Value::Sequence(_))
    }

    /// True for null, the empty string and empty collections.
    ///
    /// Booleans and numbers always count as a payload, `false` and `0`
    /// included.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Scalar(Scalar::Null) => true,
            Value::Scalar(Scalar::Str(s)) => s.is_empty(),
            Value::Scalar(_) => false,
            Value::Sequence(items) => items.is_empty(),
            Value::Mapping(entries) => entries.is_empty(),
        }
    }

    /// Looks up a mapping value by string key.
    pub fn get(&self, key: &str) -> Option<&SourceNode> {
        self.entry(key).map(|(_, value)| value)
    }

    /// Looks up a mapping entry (key node and value node) by string key.
    pub fn entry(&self, key: &str) -> Option<(&SourceNode, &SourceNode)> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(k, v)| (k, v))
    }

    /// Text form of a scalar, as used for keys and for comparisons against
    /// textual enumerations. Collections have no key text.
    pub fn key_text(&self) -> Option<String> {
        match &self.value {
            Value::Scalar(_) => Some(self.to_string()),
            _ => None,
        }
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            // `{:?}` keeps the decimal point: 1.0 stays "1.0"
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for SourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Scalar(scalar) => write!(f, "{}", scalar),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Mapping(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
