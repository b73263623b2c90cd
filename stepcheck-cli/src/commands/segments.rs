use color_eyre::Result;

use clap::Args;

use stepcheck_core::SegmentResolver;

use crate::output;

/// Split a path expression into segments
#[derive(Args, Debug)]
pub struct SegmentsArgs {
    /// Path expression, e.g. var.items[1].jsonPath($.name)
    pub expression: String,
}

pub fn execute(args: SegmentsArgs) -> Result<()> {
    output::status("Resolving", &args.expression);

    let mut resolver = SegmentResolver::new(&args.expression);
    let mut count = 0usize;

    while resolver.advance_to_next_segment() {
        count += 1;
        let Some(segment) = resolver.current_segment() else {
            break;
        };

        output::segment_row(count, segment);
    }

    if count == 0 {
        output::info("expression has no segments");
    }

    Ok(())
}
