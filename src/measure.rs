//! Measurement-based truncation.
//!
//! Finds the longest grapheme prefix of a text that, followed by the
//! ellipsis marker and the trailing decorations, fits in a line budget at a
//! given container width.
//!
//! # Algorithm
//!
//! 1. Render the full text plus decorations. If it fits, nothing is truncated.
//! 2. Binary search the prefix length `k` in `1..n` where
//!    `prefix(k) + marker + decorations` fits.
//! 3. Spot-check the result: `prefix(k - 1)` must fit too. Word wrapping can
//!    make fit non-monotonic in rare cases; when the check fails, fall back
//!    to a linear scan from the longest prefix down.
//! 4. No fitting non-empty prefix yields an empty display.
//!
//! The prefix is assembled in a scratch buffer owned by the measurer and
//! reused across calls, so repeated measurement allocates nothing new.

use tracing::{debug, warn};

use crate::error::Result;
use crate::layout::text_measure::grapheme_boundaries;
use crate::layout::Run;
use crate::surface::{Constraints, RenderSurface};
use crate::types::{TruncationResult, ELLIPSIS_MARKER};

/// Measures text against a [`RenderSurface`].
pub struct Measurer {
    surface: Box<dyn RenderSurface>,
    marker: String,
    scratch: String,
    renders: usize,
}

impl Measurer {
    pub fn new(surface: Box<dyn RenderSurface>) -> Self {
        Self::with_marker(surface, ELLIPSIS_MARKER)
    }

    /// Measurer using a custom ellipsis marker.
    pub fn with_marker(surface: Box<dyn RenderSurface>, marker: &str) -> Self {
        Self {
            surface,
            marker: marker.to_string(),
            scratch: String::new(),
            renders: 0,
        }
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    /// Offscreen renders performed by the last [`Measurer::measure`] call.
    pub fn last_render_count(&self) -> usize {
        self.renders
    }

    /// Truncate `full_text` to `row_limit` lines of `container_width` cells,
    /// reserving room for `decorations` after it.
    ///
    /// Returns [`TypographyError::MeasurementUnavailable`](crate::error::TypographyError::MeasurementUnavailable)
    /// when the surface cannot lay out content.
    pub fn measure(
        &mut self,
        full_text: &str,
        row_limit: usize,
        decorations: &[String],
        container_width: usize,
    ) -> Result<TruncationResult> {
        self.renders = 0;
        let constraints = Constraints {
            max_width: container_width,
            max_rows: row_limit.max(1),
        };

        if self.fits(full_text, false, decorations, constraints)? {
            return Ok(TruncationResult::full(full_text));
        }

        let bounds = grapheme_boundaries(full_text);
        let total = bounds.len();
        if total == 0 {
            // Only the decorations overflow; there is no text to cut.
            return Ok(TruncationResult::full(full_text));
        }

        let mut keep = self.binary_search(full_text, &bounds, decorations, constraints)?;

        if !self.is_monotonic_at(full_text, &bounds, keep, decorations, constraints)? {
            warn!(keep, total, "non-monotonic fit, falling back to linear scan");
            keep = self.linear_scan(full_text, &bounds, decorations, constraints)?;
        }

        let display_text = if keep == 0 {
            String::new()
        } else {
            let mut display = full_text[..bounds[keep - 1]].to_string();
            display.push_str(&self.marker);
            display
        };

        debug!(
            keep,
            total,
            rows = constraints.max_rows,
            width = constraints.max_width,
            renders = self.renders,
            "measured truncation"
        );

        Ok(TruncationResult {
            display_text,
            is_truncated: true,
            visible_graphemes: keep,
        })
    }

    /// Largest `k` in `1..total` whose prefix fits, or 0.
    fn binary_search(
        &mut self,
        text: &str,
        bounds: &[usize],
        decorations: &[String],
        constraints: Constraints,
    ) -> Result<usize> {
        let mut lo = 0;
        let mut hi = bounds.len().saturating_sub(1);

        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if self.fits_prefix(text, bounds, mid, decorations, constraints)? {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        Ok(lo)
    }

    /// Spot-check the search result against its shorter neighbour.
    ///
    /// A fitting `keep` whose one-shorter prefix does not fit, or a `keep` of
    /// 0 while the single-grapheme prefix does fit, means fit is not monotonic
    /// in prefix length for this text.
    fn is_monotonic_at(
        &mut self,
        text: &str,
        bounds: &[usize],
        keep: usize,
        decorations: &[String],
        constraints: Constraints,
    ) -> Result<bool> {
        match keep {
            0 if bounds.len() > 1 => {
                Ok(!self.fits_prefix(text, bounds, 1, decorations, constraints)?)
            }
            0 | 1 => Ok(true),
            _ => self.fits_prefix(text, bounds, keep - 1, decorations, constraints),
        }
    }

    fn linear_scan(
        &mut self,
        text: &str,
        bounds: &[usize],
        decorations: &[String],
        constraints: Constraints,
    ) -> Result<usize> {
        for k in (1..bounds.len()).rev() {
            if self.fits_prefix(text, bounds, k, decorations, constraints)? {
                return Ok(k);
            }
        }
        Ok(0)
    }

    fn fits_prefix(
        &mut self,
        text: &str,
        bounds: &[usize],
        k: usize,
        decorations: &[String],
        constraints: Constraints,
    ) -> Result<bool> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.push_str(&text[..bounds[k - 1]]);
        let fits = self.fits(&scratch, true, decorations, constraints);
        self.scratch = scratch;
        fits
    }

    fn fits(
        &mut self,
        text: &str,
        with_marker: bool,
        decorations: &[String],
        constraints: Constraints,
    ) -> Result<bool> {
        let mut runs = Vec::with_capacity(decorations.len() + 2);
        runs.push(Run::Text(text));
        if with_marker {
            runs.push(Run::Text(&self.marker));
        }
        runs.extend(decorations.iter().map(|d| Run::Atom(d.as_str())));

        self.renders += 1;
        Ok(self.surface.render_offscreen(&runs, constraints)?.fits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypographyError;
    use crate::layout::{layout_runs, string_width};
    use crate::surface::{CellSurface, Fit, HeadlessSurface};
    use crate::types::Size;

    const FOX: &str = "The quick brown fox jumps";

    fn measurer() -> Measurer {
        Measurer::new(Box::new(CellSurface::new()))
    }

    #[test]
    fn test_fits_untruncated() {
        let result = measurer().measure(FOX, 1, &[], 40).unwrap();
        assert!(!result.is_truncated);
        assert_eq!(result.display_text, FOX);
    }

    #[test]
    fn test_quick_fox_scenario() {
        let result = measurer().measure(FOX, 1, &[], 12).unwrap();
        assert!(result.is_truncated);
        assert_eq!(result.display_text, "The quick...");
        assert_eq!(result.visible_graphemes, 9);
    }

    #[test]
    fn test_maximal_prefix_with_decorations() {
        let decorations = vec![" Expand".to_string()];
        let width = 20;
        let mut m = measurer();
        let result = m.measure(FOX, 1, &decorations, width).unwrap();
        assert!(result.is_truncated);

        let lines = layout_runs(&[Run::Text(&result.display_text), Run::Atom(" Expand")], width);
        assert_eq!(lines.len(), 1);

        // One grapheme longer does not fit.
        let longer = format!("{}...", &FOX[..result.visible_graphemes + 1]);
        let lines = layout_runs(&[Run::Text(&longer), Run::Atom(" Expand")], width);
        assert!(lines.len() > 1 || string_width(&lines[0]) > width);
    }

    #[test]
    fn test_multi_row_budget() {
        let text = "one two three four five six seven";
        let result = measurer().measure(text, 2, &[], 10).unwrap();
        assert!(result.is_truncated);
        let lines = layout_runs(&[Run::Text(&result.display_text)], 10);
        assert!(lines.len() <= 2);
    }

    #[test]
    fn test_deterministic() {
        let mut m = measurer();
        let decorations = vec![" ✎".to_string(), " ⧉".to_string()];
        let first = m.measure(FOX, 1, &decorations, 15).unwrap();
        let second = m.measure(FOX, 1, &decorations, 15).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nothing_fits() {
        let decorations = vec![" Expand".to_string()];
        let result = measurer().measure(FOX, 1, &decorations, 8).unwrap();
        assert!(result.is_truncated);
        assert_eq!(result.display_text, "");
        assert_eq!(result.visible_graphemes, 0);
    }

    #[test]
    fn test_grapheme_safe_prefix() {
        let text = "cafe\u{0301} au lait";
        let result = measurer().measure(text, 1, &[], 7).unwrap();
        assert_eq!(result.display_text, "cafe\u{0301}...");
    }

    #[test]
    fn test_unavailable_surface() {
        let mut m = Measurer::new(Box::new(HeadlessSurface));
        let err = m.measure(FOX, 1, &[], 12).unwrap_err();
        assert_eq!(err, TypographyError::MeasurementUnavailable);
    }

    /// Surface where exactly the prefixes of length 5 and 8 fit (plus marker).
    struct Jagged;

    impl RenderSurface for Jagged {
        fn render_offscreen(&mut self, content: &[Run<'_>], _c: Constraints) -> Result<Fit> {
            let len = match content.first() {
                Some(Run::Text(t)) => t.chars().count(),
                _ => 0,
            };
            let has_marker = content.len() > 1;
            let fits = has_marker && (len == 5 || len == 8);
            Ok(Fit {
                fits,
                measured: Size::new(len, 1),
            })
        }
    }

    #[test]
    fn test_linear_fallback_on_non_monotonic_fit() {
        let mut m = Measurer::new(Box::new(Jagged));
        let result = m.measure("abcdefghij", 1, &[], 10).unwrap();
        assert_eq!(result.display_text, "abcdefgh...");
        assert_eq!(result.visible_graphemes, 8);
    }
}
