// CLI subcommands

pub mod correlate;
pub mod matcher;
pub mod segments;
