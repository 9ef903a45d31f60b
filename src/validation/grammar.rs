//! Keyword grammar of control constructs in method bodies.

// =====================
// Core Data Structures
// =====================

/// How the value under a keyword is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// A nested body: string, list of statements or a construct mapping.
    CodeBlock,
    Expression,
    Predicate,
    /// Must be textual.
    String,
    /// Must carry no payload.
    Empty,
    Number,
    /// A mapping whose keys get the left check and values the right check.
    PairedMap(&'static CheckKind, &'static CheckKind),
}

/// A keyword allowed next to a construct keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildRule {
    pub keyword: &'static str,
    pub check: CheckKind,
    pub required: bool,
}

/// A control construct: its keyword, the check for its own value and the
/// keywords allowed alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarRule {
    pub keyword: &'static str,
    pub check: CheckKind,
    pub children: &'static [ChildRule],
}

const fn required(keyword: &'static str, check: CheckKind) -> ChildRule {
    ChildRule {
        keyword,
        check,
        required: true,
    }
}

const fn optional(keyword: &'static str, check: CheckKind) -> ChildRule {
    ChildRule {
        keyword,
        check,
        required: false,
    }
}

// =====================
// Grammar Table
// =====================

/// Every control construct, in priority order.
///
/// When a mapping names more than one construct keyword, the first entry of
/// this table that is present wins; the others are reported as unknown
/// keywords of the winner.
pub static GRAMMAR: &[GrammarRule] = &[
    GrammarRule {
        keyword: "Try",
        check: CheckKind::CodeBlock,
        children: &[
            required("Catch", CheckKind::Empty),
            required("With", CheckKind::String),
            required("As", CheckKind::String),
            required("Do", CheckKind::CodeBlock),
            optional("Else", CheckKind::CodeBlock),
            optional("Finally", CheckKind::CodeBlock),
        ],
    },
    GrammarRule {
        keyword: "Parallel",
        check: CheckKind::CodeBlock,
        children: &[optional("Limit", CheckKind::CodeBlock)],
    },
    GrammarRule {
        keyword: "Repeat",
        check: CheckKind::Number,
        children: &[required("Do", CheckKind::CodeBlock)],
    },
    GrammarRule {
        keyword: "If",
        check: CheckKind::Predicate,
        children: &[
            required("Then", CheckKind::CodeBlock),
            optional("Else", CheckKind::CodeBlock),
        ],
    },
    GrammarRule {
        keyword: "Break",
        check: CheckKind::Empty,
        children: &[],
    },
    GrammarRule {
        keyword: "Return",
        check: CheckKind::Expression,
        children: &[],
    },
    GrammarRule {
        keyword: "While",
        check: CheckKind::Predicate,
        children: &[required("Do", CheckKind::CodeBlock)],
    },
    GrammarRule {
        keyword: "For",
        check: CheckKind::String,
        children: &[
            required("In", CheckKind::Expression),
            required("Do", CheckKind::CodeBlock),
        ],
    },
    GrammarRule {
        keyword: "Match",
        check: CheckKind::PairedMap(&CheckKind::Expression, &CheckKind::CodeBlock),
        children: &[
            optional("Value", CheckKind::Expression),
            required("Default", CheckKind::CodeBlock),
        ],
    },
    GrammarRule {
        keyword: "Switch",
        check: CheckKind::PairedMap(&CheckKind::Predicate, &CheckKind::CodeBlock),
        children: &[required("Default", CheckKind::CodeBlock)],
    },
];

// =====================
// Lookup
// =====================

impl GrammarRule {
    pub fn child(&self, keyword: &str) -> Option<&'static ChildRule> {
        self.children.iter().find(|rule| rule.keyword == keyword)
    }

    /// Check kind for a keyword of this construct, its own keyword included.
    pub fn check_for(&self, keyword: &str) -> Option<CheckKind> {
        if keyword == self.keyword {
            return Some(self.check);
        }
        self.child(keyword).map(|rule| rule.check)
    }

    pub fn allows(&self, keyword: &str) -> bool {
        self.check_for(keyword).is_some()
    }

    pub fn required_children(&self) -> impl Iterator<Item = &'static ChildRule> {
        self.children.iter().filter(|rule| rule.required)
    }
}

/// Finds the construct with this exact keyword.
pub fn lookup(keyword: &str) -> Option<&'static GrammarRule> {
    GRAMMAR.iter().find(|rule| rule.keyword == keyword)
}

/// Resolves which construct a set of mapping keys denotes.
///
/// Returns the highest-priority construct whose keyword is among `keys`,
/// or `None` if no construct keyword is present.
///
/// # Examples
///
/// ```rust
/// use mplcheck::validation::grammar::resolve_construct;
/// let rule = resolve_construct(&["While", "If", "Then"]).unwrap();
/// assert_eq!(rule.keyword, "If");
/// assert!(resolve_construct(&["$result"]).is_none());
/// ```
pub fn resolve_construct(keys: &[&str]) -> Option<&'static GrammarRule> {
    GRAMMAR.iter().find(|rule| keys.contains(&rule.keyword))
}
