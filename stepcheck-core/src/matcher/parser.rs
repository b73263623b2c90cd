// Matcher Expression Parser
// Recursive descent over nested, quoted matcher calls into a PredicateNode tree
//
// Grammar:
//   Call    := Identifier '(' ArgList? ')'
//   ArgList := Arg (',' Arg)*
//   Arg     := Call | QuotedLiteral | BareLiteral
//
// Combinator arguments are always calls; leaf arguments are always literals.

use crate::matcher::ast::{is_matcher_name, Arity, CombinatorKind, LeafKind, PredicateNode};

use regex::Regex;
use thiserror::Error;

const QUOTE: char = '\'';
const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnbalancedParentheses,
    UnterminatedQuote,
    NestedCallInLeaf,
    UnknownMatcher,
    InvalidArity,
    InvalidPattern,
    UnexpectedInput,
}

/// Authoring mistake in a matcher expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("matcher parse error at position {position}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(kind: ParseErrorKind, message: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }
}

enum Callee {
    Combinator(CombinatorKind),
    Leaf(LeafKind),
}

/// Recursive descent parser for matcher expressions
pub struct MatcherParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> MatcherParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Parse a complete matcher expression
    pub fn parse_str(input: &str) -> Result<PredicateNode, ParseError> {
        MatcherParser::new(input).parse()
    }

    pub fn parse(&mut self) -> Result<PredicateNode, ParseError> {
        self.skip_whitespace();
        let node = self.parse_call()?;
        self.skip_whitespace();

        if let Some(ch) = self.peek() {
            let kind = if ch == ')' {
                ParseErrorKind::UnbalancedParentheses
            } else {
                ParseErrorKind::UnexpectedInput
            };
            return Err(self.error(kind, format!("unexpected '{}' after expression", ch)));
        }

        tracing::debug!(expression = self.input, depth = node.depth(), "parsed matcher");
        Ok(node)
    }

    fn parse_call(&mut self) -> Result<PredicateNode, ParseError> {
        let start = self.position;
        let name = self.read_identifier();

        if name.is_empty() {
            return Err(match self.peek() {
                Some(QUOTE) | None => self.error(
                    ParseErrorKind::UnexpectedInput,
                    "expected a matcher call, found a literal",
                ),
                Some(ch) => self.error(
                    ParseErrorKind::UnexpectedInput,
                    format!("expected matcher name, found '{}'", ch),
                ),
            });
        }

        let callee = match (CombinatorKind::from_name(name), LeafKind::from_name(name)) {
            (Some(kind), _) => Callee::Combinator(kind),
            (None, Some(kind)) => Callee::Leaf(kind),
            (None, None) => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownMatcher,
                    format!("unknown matcher '{}'", name),
                    start,
                ))
            }
        };

        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Err(self.error(
                ParseErrorKind::UnexpectedInput,
                format!("expected '(' after '{}'", name),
            ));
        }
        self.advance();

        match callee {
            Callee::Combinator(kind) => {
                let children = self.parse_call_list()?;
                check_arity(name, kind.arity(), children.len(), start)?;
                Ok(PredicateNode::combinator(kind, children))
            }
            Callee::Leaf(kind) => {
                let args = self.parse_literal_list()?;
                check_arity(name, kind.arity(), args.len(), start)?;
                if kind == LeafKind::MatchesPattern {
                    validate_pattern(&args[0], start)?;
                }
                Ok(PredicateNode::leaf(kind, args))
            }
        }
    }

    /// Comma-separated calls up to and including the closing ')'
    fn parse_call_list(&mut self) -> Result<Vec<PredicateNode>, ParseError> {
        let mut children = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(children);
        }

        loop {
            self.skip_whitespace();
            children.push(self.parse_call()?);
            if self.finish_argument()? {
                return Ok(children);
            }
        }
    }

    /// Comma-separated literals up to and including the closing ')'
    fn parse_literal_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_literal()?);
            if self.finish_argument()? {
                return Ok(args);
            }
        }
    }

    /// Consume the separator after an argument; true when the list closed
    fn finish_argument(&mut self) -> Result<bool, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(',') => {
                self.advance();
                Ok(false)
            }
            Some(')') => {
                self.advance();
                Ok(true)
            }
            None => Err(self.error(
                ParseErrorKind::UnbalancedParentheses,
                "missing ')' at end of expression",
            )),
            Some(ch) => Err(self.error(
                ParseErrorKind::UnexpectedInput,
                format!("expected ',' or ')', found '{}'", ch),
            )),
        }
    }

    fn parse_literal(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        let start = self.position;

        if self.peek() == Some(QUOTE) {
            let value = self.parse_quoted()?;
            self.skip_whitespace();
            if matches!(self.peek(), Some(',') | Some(')') | None) {
                return Ok(value);
            }
            // Text after the closing quote: reread the whole argument as bare
            self.position = start;
        } else if self.nested_call_ahead() {
            return Err(self.error(
                ParseErrorKind::NestedCallInLeaf,
                "leaf matchers take literal arguments, not nested matchers",
            ));
        }

        Ok(self.parse_bare())
    }

    /// Quoted literal; `\'` becomes `'` and `\\` becomes `\`, other backslashes are kept
    fn parse_quoted(&mut self) -> Result<String, ParseError> {
        let start = self.position;
        self.advance();

        let mut value = String::new();
        loop {
            match self.advance() {
                Some(ESCAPE) if matches!(self.peek(), Some(QUOTE) | Some(ESCAPE)) => {
                    if let Some(escaped) = self.advance() {
                        value.push(escaped);
                    }
                }
                Some(QUOTE) => return Ok(value),
                Some(ch) => value.push(ch),
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedQuote,
                        "unterminated quoted literal",
                        start,
                    ))
                }
            }
        }
    }

    /// Bare literal up to the next ',' or ')' at depth 0, trimmed.
    ///
    /// Parentheses inside the literal nest; a surrounding pair of quotes
    /// left over from a quoted-literal fallback is stripped.
    fn parse_bare(&mut self) -> String {
        let start = self.position;
        let mut depth = 0usize;

        while let Some(ch) = self.peek() {
            match ch {
                '(' => depth += 1,
                ')' if depth == 0 => break,
                ')' => depth -= 1,
                ',' if depth == 0 => break,
                _ => {}
            }
            self.advance();
        }

        let text = self.input[start..self.position].trim();
        strip_quotes(text).to_string()
    }

    /// A recognized matcher name immediately followed by '('
    fn nested_call_ahead(&self) -> bool {
        let rest = &self.input[self.position..];
        let end = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        let name = &rest[..end];

        !name.is_empty() && is_matcher_name(name) && rest[end..].trim_start().starts_with('(')
    }

    fn read_identifier(&mut self) -> &'a str {
        let input = self.input;
        let start = self.position;
        while self.peek().is_some_and(is_identifier_char) {
            self.advance();
        }
        &input[start..self.position]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message, self.position)
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn strip_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with(QUOTE) && text.ends_with(QUOTE) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn check_arity(name: &str, arity: Arity, count: usize, position: usize) -> Result<(), ParseError> {
    if arity.accepts(count) {
        Ok(())
    } else {
        Err(ParseError::new(
            ParseErrorKind::InvalidArity,
            format!("{}() takes {}, got {}", name, arity, count),
            position,
        ))
    }
}

/// Compile-check a pattern; placeholders are only known at evaluation time
fn validate_pattern(pattern: &str, position: usize) -> Result<(), ParseError> {
    if pattern.contains("${") {
        return Ok(());
    }
    full_match_regex(pattern).map(|_| ()).map_err(|e| {
        ParseError::new(
            ParseErrorKind::InvalidPattern,
            format!("invalid pattern '{}': {}", pattern, e),
            position,
        )
    })
}

/// Regex anchored to match the whole input
pub(crate) fn full_match_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: LeafKind, args: &[&str]) -> PredicateNode {
        PredicateNode::leaf(kind, args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_simple_leaf() {
        assert_eq!(
            MatcherParser::parse_str("EqualTo(value)").unwrap(),
            leaf(LeafKind::EqualTo, &["value"])
        );
    }

    #[test]
    fn test_quoted_and_bare_equivalent() {
        assert_eq!(
            MatcherParser::parse_str("EqualTo('value')").unwrap(),
            MatcherParser::parse_str("EqualTo( value )").unwrap()
        );
    }

    #[test]
    fn test_parse_nested_combinators() {
        let node = MatcherParser::parse_str("AnyOf(StartsWith(val), Not(EndsWith(lue)))").unwrap();
        assert_eq!(
            node,
            PredicateNode::combinator(
                CombinatorKind::AnyOf,
                vec![
                    leaf(LeafKind::StartsWith, &["val"]),
                    PredicateNode::combinator(
                        CombinatorKind::Not,
                        vec![leaf(LeafKind::EndsWith, &["lue"])]
                    ),
                ]
            )
        );
    }

    #[test]
    fn test_escaped_quote_in_quoted_literal() {
        assert_eq!(
            MatcherParser::parse_str(r"EqualTo('value with \' quote')").unwrap(),
            leaf(LeafKind::EqualTo, &["value with ' quote"])
        );
    }

    #[test]
    fn test_quoted_literal_protects_separators() {
        assert_eq!(
            MatcherParser::parse_str("ContainsString('a, b (c')").unwrap(),
            leaf(LeafKind::ContainsString, &["a, b (c"])
        );
    }

    #[test]
    fn test_bare_literal_keeps_escaped_quote() {
        assert_eq!(
            MatcherParser::parse_str(r"EqualTo(it\'s)").unwrap(),
            leaf(LeafKind::EqualTo, &[r"it\'s"])
        );
    }

    #[test]
    fn test_pattern_with_group() {
        assert_eq!(
            MatcherParser::parse_str("MatchesPattern(^(a|b)+$)").unwrap(),
            leaf(LeafKind::MatchesPattern, &["^(a|b)+$"])
        );
    }

    #[test]
    fn test_quoted_fallback_to_bare() {
        assert_eq!(
            MatcherParser::parse_str("EqualTo('a'b')").unwrap(),
            leaf(LeafKind::EqualTo, &["a'b"])
        );
    }

    #[test]
    fn test_multiple_arguments() {
        assert_eq!(
            MatcherParser::parse_str("IsOneOf(9, '9.0', x y )").unwrap(),
            leaf(LeafKind::IsOneOf, &["9", "9.0", "x y"])
        );
    }

    #[test]
    fn test_zero_argument_leaf() {
        assert_eq!(
            MatcherParser::parse_str("Not( NullValue( ) )").unwrap(),
            PredicateNode::combinator(CombinatorKind::Not, vec![leaf(LeafKind::NullValue, &[])])
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        for input in ["EqualTo(value", "AnyOf(EqualTo(a), EqualTo(b)", "EqualTo(a))"] {
            let err = MatcherParser::parse_str(input).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::UnbalancedParentheses, "{}", input);
        }
    }

    #[test]
    fn test_unterminated_quote() {
        let err = MatcherParser::parse_str("EqualTo('value)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedQuote);
        assert_eq!(err.position, 8);
    }

    #[test]
    fn test_nested_call_in_leaf() {
        let err = MatcherParser::parse_str("EqualTo(StartsWith(a))").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestedCallInLeaf);
    }

    #[test]
    fn test_combinator_requires_calls() {
        let err = MatcherParser::parse_str("AnyOf(value)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownMatcher);

        let err = MatcherParser::parse_str("AnyOf('value')").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedInput);
    }

    #[test]
    fn test_unknown_matcher() {
        let err = MatcherParser::parse_str("equalTo(x)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownMatcher);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_invalid_arity() {
        for input in ["EqualTo()", "EqualTo(a, b)", "Not(NullValue(), NullValue())", "AllOf()", "Empty(x)"] {
            let err = MatcherParser::parse_str(input).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::InvalidArity, "{}", input);
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let err = MatcherParser::parse_str("MatchesPattern('[unclosed')").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPattern);
    }

    #[test]
    fn test_trailing_input() {
        let err = MatcherParser::parse_str("EqualTo(a) EqualTo(b)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedInput);
    }

    #[test]
    fn test_display_reparses_to_same_tree() {
        let node =
            MatcherParser::parse_str(r"AllOf(ContainsString('it\'s, fine'), IsIn(1, 2), Empty())")
                .unwrap();
        assert_eq!(MatcherParser::parse_str(&node.to_string()).unwrap(), node);
    }

    #[test]
    fn test_quoted_backslash_escapes() {
        assert_eq!(
            MatcherParser::parse_str(r"EqualTo('C:\\')").unwrap(),
            leaf(LeafKind::EqualTo, &[r"C:\"])
        );
        assert_eq!(
            MatcherParser::parse_str(r"MatchesPattern('\d+')").unwrap(),
            leaf(LeafKind::MatchesPattern, &[r"\d+"])
        );
        assert_eq!(
            MatcherParser::parse_str(r"EqualTo('a\\\'b')").unwrap(),
            leaf(LeafKind::EqualTo, &[r"a\'b"])
        );
    }

    #[test]
    fn test_display_reparses_backslash_arguments() {
        for arg in [r"C:\", r"\", r"a\'b", r"\d+\.", r"it\\'s"] {
            let node = PredicateNode::leaf(LeafKind::EqualTo, vec![arg.to_string()]);
            let rendered = node.to_string();
            assert_eq!(MatcherParser::parse_str(&rendered).unwrap(), node, "{}", rendered);
        }
    }

    #[test]
    fn test_error_display() {
        let err = MatcherParser::parse_str("Bogus(x)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "matcher parse error at position 0: unknown matcher 'Bogus'"
        );
    }
}
