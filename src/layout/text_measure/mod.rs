//! Text measurement for terminal cells.
//!
//! - **Width**: Unicode East Asian Width plus emoji sequence handling
//! - **Wrapping**: word-break wrapping that also lays out unbreakable inline
//!   atoms (affordance labels, suffix strings) after the text
//!
//! Uses `unicode-width` for character widths and `unicode-segmentation`
//! (UAX #29) for grapheme and word boundaries.

mod width;
mod wrap;

pub use width::{char_width, grapheme_boundaries, grapheme_width, string_width};
pub use wrap::{layout_runs, measure_text_height, wrap_text_word, Run};
