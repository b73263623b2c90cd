// Path Segment Resolver
// Forward-only cursor over the segments of a compound variable expression

use crate::path::segment::{next_segment, Segment, NO_INDEX};

/// Lazily resolves the segments of an expression, one per advance.
///
/// The resolver only holds a cursor into the source; segment production is
/// delegated to [`next_segment`]. Once exhausted it stays exhausted.
#[derive(Debug, Clone)]
pub struct SegmentResolver<'a> {
    source: &'a str,
    cursor: usize,
    current: Option<Segment>,
}

impl<'a> SegmentResolver<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            current: None,
        }
    }

    /// Move to the next segment. Returns false once the source is exhausted.
    pub fn advance_to_next_segment(&mut self) -> bool {
        match next_segment(self.source, self.cursor) {
            Some((segment, next)) => {
                tracing::debug!(
                    name = %segment.name,
                    index = segment.index,
                    escaped = segment.is_escaped(),
                    "resolved path segment"
                );
                self.cursor = next;
                self.current = Some(segment);
                true
            }
            None => {
                self.cursor = self.source.len();
                self.current = None;
                false
            }
        }
    }

    /// Name of the current segment ("" before the first advance or after exhaustion)
    pub fn current_segment_name(&self) -> &str {
        self.current.as_ref().map_or("", |s| s.name.as_str())
    }

    /// Index of the current segment, `NO_INDEX` if it has none
    pub fn current_segment_index(&self) -> i64 {
        self.current.as_ref().map_or(NO_INDEX, |s| s.index)
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.current.as_ref()
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}

impl Iterator for SegmentResolver<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.advance_to_next_segment() {
            self.current.clone()
        } else {
            None
        }
    }
}

/// Resolve every segment of an expression
pub fn segments(expression: &str) -> Vec<Segment> {
    SegmentResolver::new(expression).collect()
}
