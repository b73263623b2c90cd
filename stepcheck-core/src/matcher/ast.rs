// Matcher Expression AST
// Predicate tree for assertion expressions: AnyOf(StartsWith(val), EndsWith(lue))

use std::fmt;

/// Node of a parsed matcher expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateNode {
    /// Terminal check with literal arguments: EqualTo('value')
    Leaf { kind: LeafKind, args: Vec<String> },

    /// Logical combination of nested predicates: AnyOf(A(..), B(..))
    Combinator {
        kind: CombinatorKind,
        children: Vec<PredicateNode>,
    },
}

impl PredicateNode {
    pub fn leaf(kind: LeafKind, args: Vec<String>) -> Self {
        PredicateNode::Leaf { kind, args }
    }

    pub fn combinator(kind: CombinatorKind, children: Vec<PredicateNode>) -> Self {
        PredicateNode::Combinator { kind, children }
    }

    /// Matcher name as written in expressions
    pub fn name(&self) -> &'static str {
        match self {
            PredicateNode::Leaf { kind, .. } => kind.name(),
            PredicateNode::Combinator { kind, .. } => kind.name(),
        }
    }

    /// Nesting depth (a single leaf has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            PredicateNode::Leaf { .. } => 1,
            PredicateNode::Combinator { children, .. } => {
                1 + children.iter().map(PredicateNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// How many arguments a matcher accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(0) => write!(f, "no arguments"),
            Arity::Exactly(1) => write!(f, "exactly 1 argument"),
            Arity::Exactly(n) => write!(f, "exactly {} arguments", n),
            Arity::AtLeast(1) => write!(f, "at least 1 argument"),
            Arity::AtLeast(n) => write!(f, "at least {} arguments", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    Not,
    AnyOf,
    AllOf,
}

impl CombinatorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Not" => Some(CombinatorKind::Not),
            "AnyOf" => Some(CombinatorKind::AnyOf),
            "AllOf" => Some(CombinatorKind::AllOf),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CombinatorKind::Not => "Not",
            CombinatorKind::AnyOf => "AnyOf",
            CombinatorKind::AllOf => "AllOf",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            CombinatorKind::Not => Arity::Exactly(1),
            CombinatorKind::AnyOf | CombinatorKind::AllOf => Arity::AtLeast(1),
        }
    }
}

/// Terminal checks (names are case-sensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    EqualTo,
    EqualToIgnoringCase,
    EqualToIgnoringWhiteSpace,
    ContainsString,
    ContainsStringIgnoringCase,
    StartsWith,
    StartsWithIgnoringCase,
    EndsWith,
    EndsWithIgnoringCase,
    MatchesPattern,
    IsOneOf,
    IsIn,
    NullValue,
    NotNullValue,
    IsEmptyString,
    IsEmptyOrNullString,
    BlankString,
    BlankOrNullString,
    Empty,
}

impl LeafKind {
    pub const ALL: [LeafKind; 19] = [
        LeafKind::EqualTo,
        LeafKind::EqualToIgnoringCase,
        LeafKind::EqualToIgnoringWhiteSpace,
        LeafKind::ContainsString,
        LeafKind::ContainsStringIgnoringCase,
        LeafKind::StartsWith,
        LeafKind::StartsWithIgnoringCase,
        LeafKind::EndsWith,
        LeafKind::EndsWithIgnoringCase,
        LeafKind::MatchesPattern,
        LeafKind::IsOneOf,
        LeafKind::IsIn,
        LeafKind::NullValue,
        LeafKind::NotNullValue,
        LeafKind::IsEmptyString,
        LeafKind::IsEmptyOrNullString,
        LeafKind::BlankString,
        LeafKind::BlankOrNullString,
        LeafKind::Empty,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LeafKind::EqualTo => "EqualTo",
            LeafKind::EqualToIgnoringCase => "EqualToIgnoringCase",
            LeafKind::EqualToIgnoringWhiteSpace => "EqualToIgnoringWhiteSpace",
            LeafKind::ContainsString => "ContainsString",
            LeafKind::ContainsStringIgnoringCase => "ContainsStringIgnoringCase",
            LeafKind::StartsWith => "StartsWith",
            LeafKind::StartsWithIgnoringCase => "StartsWithIgnoringCase",
            LeafKind::EndsWith => "EndsWith",
            LeafKind::EndsWithIgnoringCase => "EndsWithIgnoringCase",
            LeafKind::MatchesPattern => "MatchesPattern",
            LeafKind::IsOneOf => "IsOneOf",
            LeafKind::IsIn => "IsIn",
            LeafKind::NullValue => "NullValue",
            LeafKind::NotNullValue => "NotNullValue",
            LeafKind::IsEmptyString => "IsEmptyString",
            LeafKind::IsEmptyOrNullString => "IsEmptyOrNullString",
            LeafKind::BlankString => "BlankString",
            LeafKind::BlankOrNullString => "BlankOrNullString",
            LeafKind::Empty => "Empty",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            LeafKind::IsOneOf | LeafKind::IsIn => Arity::AtLeast(1),
            LeafKind::NullValue
            | LeafKind::NotNullValue
            | LeafKind::IsEmptyString
            | LeafKind::IsEmptyOrNullString
            | LeafKind::BlankString
            | LeafKind::BlankOrNullString
            | LeafKind::Empty => Arity::Exactly(0),
            _ => Arity::Exactly(1),
        }
    }

    /// Whether the check looks at the raw value, before null becomes ""
    pub fn inspects_null(&self) -> bool {
        matches!(
            self,
            LeafKind::NullValue
                | LeafKind::NotNullValue
                | LeafKind::IsEmptyOrNullString
                | LeafKind::BlankOrNullString
        )
    }
}

/// Whether `name` is any recognized matcher identifier
pub fn is_matcher_name(name: &str) -> bool {
    CombinatorKind::from_name(name).is_some() || LeafKind::from_name(name).is_some()
}

/// Renders the canonical form: every leaf argument quoted, with `\` and `'` escaped.
impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        match self {
            PredicateNode::Leaf { args, .. } => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}'", arg.replace('\\', "\\\\").replace('\'', "\\'"))?;
                }
            }
            PredicateNode::Combinator { children, .. } => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
            }
        }
        write!(f, ")")
    }
}
