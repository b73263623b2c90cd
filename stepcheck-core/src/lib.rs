// Stepcheck Core Library
// Expression interpreters of the stepcheck integration-test DSL

pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod matcher;
pub mod path;

// Re-export commonly used types
pub use error::{StepcheckError, StepcheckResult};

pub use config::{ConfigError, CorrelationConfig, StepcheckConfig};
pub use context::{replace_placeholders, TestContext, UnknownVariableError, VariableScope};

// Re-export path types
pub use path::{
    navigate, next_segment, segments, EmbeddedPathEvaluator, EscapeFunction, PathError, Segment,
    SegmentResolver, NO_INDEX,
};

// Re-export matcher types
pub use matcher::{
    evaluate, CombinatorKind, LeafKind, Matcher, MatcherParser, ParseError, ParseErrorKind,
    PredicateNode,
};

// Re-export correlation types
pub use correlation::{
    correlation_key_name, CorrelationEntry, CorrelationError, CorrelationManager,
    InMemoryObjectStore, ObjectStore,
};
