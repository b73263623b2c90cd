// Test Variable Scope
// Named test variables shared between DSL steps, plus ${name} placeholder replacement

use std::collections::HashMap;

use thiserror::Error;

/// Raised when a variable lookup misses the scope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown variable '{name}'")]
pub struct UnknownVariableError {
    pub name: String,
}

impl UnknownVariableError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Variable scope owned by the caller (usually one per test case)
pub trait VariableScope {
    /// Look up a variable by name
    fn get_variable(&self, name: &str) -> Result<String, UnknownVariableError>;

    /// Set a variable, overwriting any previous value
    fn set_variable(&mut self, name: &str, value: String);

    /// Whether the variable is defined
    fn has_variable(&self, name: &str) -> bool {
        self.get_variable(name).is_ok()
    }
}

/// In-memory variable scope for a single test case
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    variables: HashMap<String, String>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variable definition
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Remove a variable, returning its previous value
    pub fn remove_variable(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }
}

impl VariableScope for TestContext {
    fn get_variable(&self, name: &str) -> Result<String, UnknownVariableError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownVariableError::new(name))
    }

    fn set_variable(&mut self, name: &str, value: String) {
        self.variables.insert(name.to_string(), value);
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

/// Replace `${name}` placeholders with values from the scope.
///
/// Unknown variables are left in place verbatim. An unterminated `${` is
/// copied through unchanged.
pub fn replace_placeholders(text: &str, scope: &dyn VariableScope) -> String {
    if !text.contains("${") {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let name = after[..end].trim();
        match scope.get_variable(name) {
            Ok(value) => result.push_str(&value),
            Err(_) => {
                tracing::warn!(variable = name, "unresolved placeholder left verbatim");
                result.push_str(&rest[start..start + 2 + end + 1]);
            }
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_variable() {
        let mut ctx = TestContext::new();
        ctx.set_variable("greeting", "hello".to_string());

        assert_eq!(ctx.get_variable("greeting").unwrap(), "hello");
        assert!(ctx.has_variable("greeting"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut ctx = TestContext::new().with_variable("a", "1");
        ctx.set_variable("a", "2".to_string());
        assert_eq!(ctx.get_variable("a").unwrap(), "2");
    }

    #[test]
    fn test_unknown_variable() {
        let ctx = TestContext::new();
        let err = ctx.get_variable("missing").unwrap_err();
        assert_eq!(err.name, "missing");
        assert_eq!(err.to_string(), "Unknown variable 'missing'");
    }

    #[test]
    fn test_replace_placeholders() {
        let ctx = TestContext::new()
            .with_variable("user", "alice")
            .with_variable("id", "42");

        assert_eq!(
            replace_placeholders("user=${user}, id=${ id }", &ctx),
            "user=alice, id=42"
        );
    }

    #[test]
    fn test_replace_placeholders_unknown_kept() {
        let ctx = TestContext::new();
        assert_eq!(replace_placeholders("x${nope}y", &ctx), "x${nope}y");
        assert_eq!(replace_placeholders("open ${brace", &ctx), "open ${brace");
        assert_eq!(replace_placeholders("plain", &ctx), "plain");
    }
}
