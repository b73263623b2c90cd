// Terminal output for stepcheck commands
// Progress lines go to stderr, results (segments) to stdout

use stepcheck_core::Segment;

/// Right-aligned action label, e.g. "   Resolving var.items[1]"
pub fn status(action: &str, message: &str) {
    eprintln!("\x1b[1;36m{:>12}\x1b[0m {}", action, message);
}

/// Verdict line for a check: green tick or red cross
pub fn verdict(passed: bool, message: &str) {
    if passed {
        eprintln!("\x1b[1;32m  \u{2713}\x1b[0m {}", message);
    } else {
        eprintln!("\x1b[1;31m  \u{2717}\x1b[0m {}", message);
    }
}

pub fn error(message: &str) {
    eprintln!("\x1b[1;31merror:\x1b[0m {}", message);
}

pub fn info(message: &str) {
    eprintln!("\x1b[36m  i\x1b[0m {}", message);
}

/// Echo `source` with a caret under byte `position`
pub fn caret(source: &str, position: usize) {
    let column = source
        .get(..position.min(source.len()))
        .map_or(position, |prefix| prefix.chars().count());
    eprintln!("    {}", source);
    eprintln!("    {}\x1b[1;31m^\x1b[0m", " ".repeat(column));
}

/// One row of `stepcheck segments`
pub fn segment_row(number: usize, segment: &Segment) {
    match segment.escape {
        Some(function) => println!("{:>3}  {}({})", number, function, segment.name),
        None => match segment.array_index() {
            Some(index) => println!("{:>3}  {:<24} [{}]", number, segment.name, index),
            None => println!("{:>3}  {}", number, segment.name),
        },
    }
}

/// Actual value as shown in verdicts: quoted, or `null`
pub fn describe_actual(actual: Option<&str>) -> String {
    actual.map_or_else(|| "null".to_string(), |value| format!("'{}'", value))
}
