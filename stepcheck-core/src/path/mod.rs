// Path Segment Module
// Compound variable expressions: tokenizer, resolver and JSON navigation

pub mod navigate;
pub mod resolver;
pub mod segment;

pub use navigate::{navigate, EmbeddedPathEvaluator, PathError};
pub use resolver::{segments, SegmentResolver};
pub use segment::{next_segment, EscapeFunction, Segment, NO_INDEX};
