//! Word-break line layout.
//!
//! Text runs break at word boundaries (UAX #29), falling back to grapheme
//! breaks for words wider than the line. Atom runs are never broken: an atom
//! that does not fit on the current line moves to the next one as a whole.
//! Explicit `\n` in text runs is a hard break.

use unicode_segmentation::UnicodeSegmentation;

use super::width::grapheme_width;

/// One inline piece of content to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run<'a> {
    /// Breakable text.
    Text(&'a str),
    /// Unbreakable inline element (affordance label, suffix).
    Atom(&'a str),
}

/// Accumulates wrapped lines.
struct LineBuilder {
    max_width: usize,
    lines: Vec<String>,
    current: String,
    current_width: usize,
}

impl LineBuilder {
    fn new(max_width: usize) -> Self {
        Self {
            max_width,
            lines: Vec::new(),
            current: String::new(),
            current_width: 0,
        }
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line.trim_end().to_string());
        self.current_width = 0;
    }

    fn hard_break(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.current_width = 0;
    }

    fn push(&mut self, s: &str, width: usize) {
        self.current.push_str(s);
        self.current_width += width;
    }

    fn overflows(&self, width: usize) -> bool {
        self.current_width + width > self.max_width
    }

    fn text(&mut self, text: &str) {
        for (i, raw_line) in text.split('\n').enumerate() {
            if i > 0 {
                self.hard_break();
            }
            for segment in raw_line.split_word_bounds() {
                self.segment(segment);
            }
        }
    }

    fn segment(&mut self, segment: &str) {
        let seg_width: usize = segment.graphemes(true).map(grapheme_width).sum();

        if !self.overflows(seg_width) {
            self.push(segment, seg_width);
            return;
        }

        if self.current_width > 0 {
            self.break_line();
        }

        if is_whitespace(segment) {
            return;
        }

        if seg_width > self.max_width {
            for grapheme in segment.graphemes(true) {
                let gw = grapheme_width(grapheme);
                if self.overflows(gw) && self.current_width > 0 {
                    self.break_line();
                }
                self.push(grapheme, gw);
            }
            return;
        }

        self.push(segment, seg_width);
    }

    fn atom(&mut self, atom: &str) {
        let width: usize = atom.graphemes(true).map(grapheme_width).sum();
        if self.overflows(width) && self.current_width > 0 {
            self.break_line();
        }
        self.push(atom, width);
    }

    fn finish(mut self) -> Vec<String> {
        self.lines.push(self.current);
        self.lines
    }
}

fn is_whitespace(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Lay out a sequence of runs into lines no wider than `max_width` cells.
///
/// Returns an empty `Vec` when every run is empty. A zero `max_width` is
/// degenerate and yields the concatenated runs split only at hard breaks.
pub fn layout_runs(runs: &[Run<'_>], max_width: usize) -> Vec<String> {
    let is_empty = runs.iter().all(|run| match run {
        Run::Text(s) | Run::Atom(s) => s.is_empty(),
    });
    if is_empty {
        return Vec::new();
    }

    if max_width == 0 {
        let joined: String = runs
            .iter()
            .map(|run| match run {
                Run::Text(s) | Run::Atom(s) => *s,
            })
            .collect();
        return joined.split('\n').map(str::to_string).collect();
    }

    let mut builder = LineBuilder::new(max_width);
    for run in runs {
        match run {
            Run::Text(s) => builder.text(s),
            Run::Atom(s) => builder.atom(s),
        }
    }
    builder.finish()
}

/// Wrap text at word boundaries.
pub fn wrap_text_word(text: &str, max_width: usize) -> Vec<String> {
    layout_runs(&[Run::Text(text)], max_width)
}

/// Number of lines `text` occupies when word-wrapped to `max_width`.
///
/// Returns 0 for empty text.
pub fn measure_text_height(text: &str, max_width: usize) -> usize {
    wrap_text_word(text, max_width).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_fits() {
        assert_eq!(wrap_text_word("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_at_word() {
        assert_eq!(wrap_text_word("hello world", 8), vec!["hello", "world"]);
        assert_eq!(
            wrap_text_word("one two three four", 9),
            vec!["one two", "three", "four"]
        );
    }

    #[test]
    fn test_wrap_long_word_force_breaks() {
        assert_eq!(wrap_text_word("abcdefghij", 5), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_wrap_newlines() {
        assert_eq!(wrap_text_word("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn test_wrap_empty_and_zero_width() {
        assert!(wrap_text_word("", 10).is_empty());
        assert_eq!(wrap_text_word("a\nb", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_atom_moves_whole() {
        let lines = layout_runs(&[Run::Text("hello"), Run::Atom(" Expand")], 10);
        assert_eq!(lines, vec!["hello", " Expand"]);
    }

    #[test]
    fn test_atom_fits_inline() {
        let lines = layout_runs(&[Run::Text("hi"), Run::Atom(" ✎")], 10);
        assert_eq!(lines, vec!["hi ✎"]);
    }

    #[test]
    fn test_height() {
        assert_eq!(measure_text_height("", 10), 0);
        assert_eq!(measure_text_height("hello", 10), 1);
        assert_eq!(measure_text_height("abcdef\nghi", 4), 3);
        assert_eq!(measure_text_height("你好世界", 5), 2);
    }
}
