//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and the binary prints the lines. Format functions are pure.
//!
//! ## Resize plan
//!
//! ```text
//! 300x400 → 200x100 (outbound-from-top)
//!     Resize: 200x267
//!     Crop: 200x100 at 0,0
//!     Result: 200x100
//! ```
//!
//! ## Watermark plan
//!
//! ```text
//! Watermark 20x20 on 50x50 (repeat)
//!     001 at 0,0
//!     002 at 20,0
//!     003 at 40,0 clipped to 10x20
//! ```

use crate::imaging::{BackendKind, PastePlan, ResizePlan, ResizeStep};
use crate::types::Size;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_index(pos: usize) -> String {
    format!("{:03}", pos)
}

/// Lines describing a resize plan.
pub fn format_resize_plan(plan: &ResizePlan) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {} ({})",
        plan.source, plan.target, plan.policy
    )];

    let verb = match plan.step {
        ResizeStep::PassThrough => {
            lines.push(format!("{}Unchanged: already fits", indent(1)));
            return lines;
        }
        ResizeStep::Inset => "Thumbnail (inset)",
        ResizeStep::Outbound => "Thumbnail (outbound)",
        ResizeStep::TopCrop => "Resize",
    };
    lines.push(format!("{}{}: {}", indent(1), verb, plan.scaled_size));
    if let (Some(origin), Some(size)) = (plan.crop_origin, plan.crop_size) {
        lines.push(format!("{}Crop: {} at {}", indent(1), size, origin));
    }
    lines.push(format!("{}Result: {}", indent(1), plan.final_size));
    lines
}

/// Lines describing a watermark paste plan.
pub fn format_paste_plan(plan: &PastePlan, source: Size) -> Vec<String> {
    let mut lines = vec![format!(
        "Watermark {} on {} ({})",
        plan.watermark_size, source, plan.anchor
    )];

    if let Some(shrink) = plan.shrink.as_ref().filter(|s| !s.no_op) {
        lines.push(format!(
            "{}Shrunk from {} to fit {}",
            indent(1),
            shrink.source,
            shrink.target
        ));
    }

    if plan.is_empty() {
        lines.push(format!("{}Skipped: watermark does not fit", indent(1)));
        return lines;
    }

    for (i, paste) in plan.pastes.iter().enumerate() {
        let mut line = format!("{}{} at {}", indent(1), format_index(i + 1), paste.origin);
        if paste.clipped {
            line.push_str(&format!(" clipped to {}", paste.clip));
        }
        lines.push(line);
    }
    lines
}

/// Line for the `backend` command.
pub fn format_backend(kind: BackendKind) -> String {
    format!("Backend: {}", kind)
}

/// Line reporting one executed thumbnail.
pub fn format_thumbnail_result(source: &Path, output: &Path, plan: &ResizePlan) -> String {
    let status = if plan.no_op { "copied" } else { "resized" };
    format!(
        "{} → {} ({}, {})",
        source.display(),
        output.display(),
        plan.final_size,
        status
    )
}
