//! Extracted-text assembly
//!
//! Fragments arrive in reading order from the engine's text stream. A line
//! break is inserted whenever the baseline moves; fragments sharing a
//! baseline are concatenated directly.

use super::types::TextFragment;

/// Assemble text fragments into a single display string
#[must_use]
pub fn assemble_fragments(fragments: &[TextFragment]) -> String {
    let mut out = String::new();
    let mut last_y: Option<f32> = None;

    for fragment in fragments {
        if let Some(y) = last_y {
            if (fragment.y - y).abs() > f32::EPSILON {
                out.push('\n');
            }
        }
        out.push_str(&fragment.text);
        last_y = Some(fragment.y);
    }

    out
}
