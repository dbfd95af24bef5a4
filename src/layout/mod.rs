//! Layout Module
//!
//! Cell-grid text layout used by the measurement surface and the renderer.
//!
//! Every width is expressed in terminal cells. Lines are produced by Unicode
//! word-boundary wrapping with grapheme-safe force breaks for words wider
//! than the line.

pub mod text_measure;

pub use text_measure::{
    grapheme_width, layout_runs, measure_text_height, string_width, wrap_text_word, Run,
};
