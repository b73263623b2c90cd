// Matcher Expression Module
// Assertion expressions: AnyOf(StartsWith(val), EndsWith(lue)) parsed once, evaluated many times

pub mod ast;
pub mod evaluator;
pub mod parser;

pub use ast::{Arity, CombinatorKind, LeafKind, PredicateNode};
pub use evaluator::{evaluate, Evaluator};
pub use parser::{MatcherParser, ParseError, ParseErrorKind};

use crate::context::VariableScope;

use std::fmt;
use std::str::FromStr;

/// A parsed matcher expression together with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    source: String,
    root: PredicateNode,
}

impl Matcher {
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let root = MatcherParser::parse_str(expression)?;
        Ok(Self {
            source: expression.to_string(),
            root,
        })
    }

    /// Check `actual` (None = null) against the expression
    pub fn matches(&self, actual: Option<&str>, scope: &dyn VariableScope) -> bool {
        evaluate(&self.root, actual, scope)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &PredicateNode {
        &self.root
    }
}

impl FromStr for Matcher {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Matcher::parse(s)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_matcher_parse_and_match() {
        let matcher: Matcher = "AnyOf(StartsWith(val), EndsWith(lue))".parse().unwrap();
        let ctx = TestContext::new();

        assert!(matcher.matches(Some("value"), &ctx));
        assert!(matcher.matches(Some("glue"), &ctx));
        assert!(!matcher.matches(Some("other"), &ctx));
        assert!(!matcher.matches(None, &ctx));
    }

    #[test]
    fn test_matcher_keeps_source() {
        let matcher = Matcher::parse("EqualTo( value )").unwrap();
        assert_eq!(matcher.source(), "EqualTo( value )");
        assert_eq!(matcher.to_string(), "EqualTo('value')");
        assert_eq!(matcher.root().name(), "EqualTo");
    }

    #[test]
    fn test_matcher_parse_error() {
        let err = Matcher::parse("AnyOf(EqualTo(a)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedParentheses);
    }
}
