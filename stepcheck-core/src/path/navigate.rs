// Path Navigation
// Walks a JSON document along resolved segments, delegating jsonPath/xpath calls

use crate::path::resolver::SegmentResolver;
use crate::path::segment::{EscapeFunction, Segment};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while walking a value along a path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("Empty path expression")]
    EmptyExpression,

    #[error("No property '{property}' at '{path}'")]
    NoSuchProperty { property: String, path: String },

    #[error("Value at '{path}' is not an array")]
    NotAnArray { path: String },

    #[error("Index {index} out of bounds at '{path}' (length {len})")]
    IndexOutOfBounds { index: i64, path: String, len: usize },

    #[error("No evaluator configured for {0}() segments")]
    NoEmbeddedEvaluator(EscapeFunction),

    #[error("{function}({expression}) failed: {message}")]
    EmbeddedEvaluation {
        function: EscapeFunction,
        expression: String,
        message: String,
    },
}

/// External engine for embedded sub-languages (JSONPath, XPath).
///
/// The path lane only delimits the call content; evaluating it is the
/// collaborator's job.
pub trait EmbeddedPathEvaluator {
    fn evaluate(
        &self,
        function: EscapeFunction,
        expression: &str,
        target: &Value,
    ) -> Result<Value, String>;
}

/// Resolve `expression` against `root`.
///
/// The first segment names a property of `root` (usually a variable); each
/// following segment descends by property name and optional array index.
pub fn navigate(
    root: &Value,
    expression: &str,
    evaluator: Option<&dyn EmbeddedPathEvaluator>,
) -> Result<Value, PathError> {
    let mut current = root;
    let mut walked = String::new();
    let mut any = false;

    for segment in SegmentResolver::new(expression) {
        any = true;

        if let Some(function) = segment.escape {
            let evaluator = evaluator.ok_or(PathError::NoEmbeddedEvaluator(function))?;
            return evaluator
                .evaluate(function, &segment.name, current)
                .map_err(|message| PathError::EmbeddedEvaluation {
                    function,
                    expression: segment.name.clone(),
                    message,
                });
        }

        current = step(current, &segment, &walked)?;

        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(&segment.to_string());
    }

    if !any {
        return Err(PathError::EmptyExpression);
    }

    Ok(current.clone())
}

fn step<'v>(value: &'v Value, segment: &Segment, walked: &str) -> Result<&'v Value, PathError> {
    let path = if walked.is_empty() { "$" } else { walked };

    let property = value
        .as_object()
        .and_then(|map| map.get(&segment.name))
        .ok_or_else(|| PathError::NoSuchProperty {
            property: segment.name.clone(),
            path: path.to_string(),
        })?;

    let Some(index) = segment.array_index() else {
        return Ok(property);
    };

    let here = if walked.is_empty() {
        segment.name.clone()
    } else {
        format!("{}.{}", walked, segment.name)
    };

    let items = property
        .as_array()
        .ok_or_else(|| PathError::NotAnArray { path: here.clone() })?;

    items.get(index).ok_or(PathError::IndexOutOfBounds {
        index: segment.index,
        path: here,
        len: items.len(),
    })
}
