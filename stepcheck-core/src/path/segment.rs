// Path Segment Tokenizer
// Splits compound variable expressions (var.prop[1].jsonPath($.a)) into segments

use std::fmt;

/// Index value meaning "no array index was written"
pub const NO_INDEX: i64 = -1;

/// Delimiter between ordinary segments
const DELIMITER: char = '.';

/// Embedded sub-languages whose call content is captured verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeFunction {
    JsonPath,
    XPath,
}

impl EscapeFunction {
    pub const ALL: [EscapeFunction; 2] = [EscapeFunction::JsonPath, EscapeFunction::XPath];

    /// Function name as written in expressions (case-sensitive)
    pub fn name(&self) -> &'static str {
        match self {
            EscapeFunction::JsonPath => "jsonPath",
            EscapeFunction::XPath => "xpath",
        }
    }

    /// Recognize an escape call starting exactly at the beginning of `text`
    pub fn recognize(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| {
            text.strip_prefix(function.name())
                .is_some_and(|rest| rest.starts_with('('))
        })
    }
}

impl fmt::Display for EscapeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One addressable step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Property name, or the verbatim call content for escape segments
    pub name: String,
    /// Array index written as `[n]` after the name, or `NO_INDEX`
    pub index: i64,
    /// Set when the segment came from a `jsonPath(...)`/`xpath(...)` call
    pub escape: Option<EscapeFunction>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: NO_INDEX,
            escape: None,
        }
    }

    pub fn with_index(mut self, index: i64) -> Self {
        self.index = index;
        self
    }

    pub fn escaped(content: impl Into<String>, function: EscapeFunction) -> Self {
        Self {
            name: content.into(),
            index: NO_INDEX,
            escape: Some(function),
        }
    }

    /// The index as a usable array position
    pub fn array_index(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }

    pub fn is_escaped(&self) -> bool {
        self.escape.is_some()
    }

    /// Build an ordinary segment, splitting off a trailing `[<digits>]`
    fn from_text(text: &str) -> Self {
        match split_index_suffix(text) {
            Some((name, index)) => Segment::new(name).with_index(index),
            None => Segment::new(text),
        }
    }
}

/// Rejoins the segment as it appears in an expression. The index is written
/// in canonical form, so `a[007]` displays as `a[7]`.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.escape {
            Some(function) => write!(f, "{}({})", function, self.name),
            None if self.index >= 0 => write!(f, "{}[{}]", self.name, self.index),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Split `name[123]` into `("name", 123)`.
///
/// Anything else (no brackets, non-digit content, empty name, overflow)
/// is not an index suffix.
fn split_index_suffix(text: &str) -> Option<(&str, i64)> {
    let inner = text.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (name, digits) = (&inner[..open], &inner[open + 1..]);

    if name.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<i64>().ok().map(|index| (name, index))
}

/// Produce the segment starting at `cursor`, and the cursor after it.
///
/// Returns `None` once the source is exhausted. Empty segments (leading,
/// trailing or doubled delimiters) are skipped. An escape call consumes
/// the rest of the source: its content runs from the `(` after the function
/// name up to the last `)` in the source, without balance checks.
pub fn next_segment(source: &str, cursor: usize) -> Option<(Segment, usize)> {
    let mut cursor = cursor;

    loop {
        let rest = source.get(cursor..)?;
        if rest.is_empty() {
            return None;
        }

        if let Some(function) = EscapeFunction::recognize(rest) {
            let body = &rest[function.name().len() + 1..];
            let content = match body.rfind(')') {
                Some(end) => &body[..end],
                None => body,
            };
            return Some((Segment::escaped(content, function), source.len()));
        }

        let (text, next) = match rest.find(DELIMITER) {
            Some(end) => (&rest[..end], cursor + end + DELIMITER.len_utf8()),
            None => (rest, source.len()),
        };

        if text.is_empty() {
            cursor = next;
            continue;
        }

        return Some((Segment::from_text(text), next));
    }
}
