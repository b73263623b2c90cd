// Matcher Expression Evaluator
// Walks a PredicateNode tree against an actual value and returns pass/fail

use crate::context::{replace_placeholders, VariableScope};
use crate::matcher::ast::{CombinatorKind, LeafKind, PredicateNode};
use crate::matcher::parser::full_match_regex;

/// Matcher evaluator bound to a variable scope
pub struct Evaluator<'a> {
    scope: &'a dyn VariableScope,
}

impl<'a> Evaluator<'a> {
    pub fn new(scope: &'a dyn VariableScope) -> Self {
        Self { scope }
    }

    /// Evaluate a node. `None` is the raw null value.
    pub fn eval(&self, node: &PredicateNode, actual: Option<&str>) -> bool {
        match node {
            PredicateNode::Leaf { kind, args } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|arg| replace_placeholders(arg, self.scope))
                    .collect();
                self.eval_leaf(*kind, &args, actual)
            }
            PredicateNode::Combinator { kind, children } => match kind {
                CombinatorKind::Not => !children.iter().all(|child| self.eval(child, actual)),
                CombinatorKind::AnyOf => children.iter().any(|child| self.eval(child, actual)),
                CombinatorKind::AllOf => children.iter().all(|child| self.eval(child, actual)),
            },
        }
    }

    /// Null-sensitive checks see `raw`; every other check sees null as ""
    fn eval_leaf(&self, kind: LeafKind, args: &[String], raw: Option<&str>) -> bool {
        let actual = raw.unwrap_or("");
        let expected = args.first().map(String::as_str).unwrap_or("");

        match kind {
            LeafKind::NullValue => raw.is_none(),
            LeafKind::NotNullValue => raw.is_some(),
            LeafKind::IsEmptyOrNullString => raw.map_or(true, str::is_empty),
            LeafKind::BlankOrNullString => raw.map_or(true, is_blank),

            LeafKind::EqualTo => actual == expected,
            LeafKind::EqualToIgnoringCase => actual.to_lowercase() == expected.to_lowercase(),
            LeafKind::EqualToIgnoringWhiteSpace => {
                collapse_whitespace(actual) == collapse_whitespace(expected)
            }
            LeafKind::ContainsString => actual.contains(expected),
            LeafKind::ContainsStringIgnoringCase => {
                actual.to_lowercase().contains(&expected.to_lowercase())
            }
            LeafKind::StartsWith => actual.starts_with(expected),
            LeafKind::StartsWithIgnoringCase => {
                actual.to_lowercase().starts_with(&expected.to_lowercase())
            }
            LeafKind::EndsWith => actual.ends_with(expected),
            LeafKind::EndsWithIgnoringCase => {
                actual.to_lowercase().ends_with(&expected.to_lowercase())
            }
            LeafKind::MatchesPattern => match full_match_regex(expected) {
                Ok(regex) => regex.is_match(actual),
                Err(e) => {
                    tracing::warn!(pattern = expected, error = %e, "invalid pattern never matches");
                    false
                }
            },
            LeafKind::IsOneOf | LeafKind::IsIn => {
                args.iter().any(|candidate| values_equal(actual, candidate))
            }
            LeafKind::IsEmptyString => actual.is_empty(),
            LeafKind::BlankString => is_blank(actual),
            LeafKind::Empty => is_empty_value(actual),
        }
    }
}

/// Evaluate `node` against `actual` with placeholders resolved from `scope`
pub fn evaluate(node: &PredicateNode, actual: Option<&str>, scope: &dyn VariableScope) -> bool {
    let passed = Evaluator::new(scope).eval(node, actual);
    tracing::debug!(matcher = %node, actual = ?actual, passed, "evaluated matcher");
    passed
}

/// Numeric-aware equality: "9" equals "9.0". Identical text always matches.
fn values_equal(actual: &str, expected: &str) -> bool {
    let (a, b) = (actual.trim(), expected.trim());
    if a == b {
        return true;
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Empty string or empty list literal `[]`
fn is_empty_value(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|inner| inner.trim().is_empty())
}
