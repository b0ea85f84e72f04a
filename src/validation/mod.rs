/*!
 * Validation of compiled subtitle cues.
 *
 * Hard issues break the cue invariants (timing range, overlap, numbering,
 * empty text, line width) and make the compiler reject its own output.
 * Soft issues (duration bounds, reading speed) are display targets that may
 * legitimately be missed and are only reported.
 *
 * - `cues`: Per-cue and whole-track checks
 */

pub mod cues;

// Re-export main types
pub use cues::{CueIssue, CueReport, CueValidationResult, CueValidator};
