use color_eyre::Result;

use clap::Args;

use stepcheck_core::{Matcher, TestContext, VariableScope};

use crate::output;

/// Evaluate a matcher expression against a value
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Matcher expression, e.g. "AnyOf(StartsWith(val), EndsWith(lue))"
    pub expression: String,

    /// Actual value to check
    #[arg(conflicts_with = "null")]
    pub value: Option<String>,

    /// Check against a null value instead
    #[arg(long)]
    pub null: bool,

    /// Test variable for ${name} placeholders (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))
}

pub fn execute(args: MatchArgs) -> Result<()> {
    let matcher = match Matcher::parse(&args.expression) {
        Ok(m) => m,
        Err(e) => {
            output::error(&e.to_string());
            output::caret(&args.expression, e.position);
            std::process::exit(2);
        }
    };

    output::status("Parsed", &matcher.to_string());

    let mut scope = TestContext::new();
    for (name, value) in args.variables {
        scope.set_variable(&name, value);
    }

    let actual = if args.null {
        None
    } else {
        Some(args.value.unwrap_or_default())
    };

    let shown = output::describe_actual(actual.as_deref());
    let passed = matcher.matches(actual.as_deref(), &scope);

    if passed {
        output::verdict(true, &format!("{} matches {}", shown, matcher.source()));
        Ok(())
    } else {
        output::verdict(false, &format!("{} does not match {}", shown, matcher.source()));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            parse_variable("user=alice=admin").unwrap(),
            ("user".to_string(), "alice=admin".to_string())
        );
        assert!(parse_variable("novalue").is_err());
        assert!(parse_variable("=x").is_err());
    }
}
