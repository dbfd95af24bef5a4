//! Cell width of characters, grapheme clusters and strings.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Display width of a single codepoint in terminal cells.
///
/// Control characters and combining marks are zero width; CJK ideographs,
/// fullwidth forms and pictographic emoji are two cells wide.
#[inline]
pub fn char_width(c: char) -> usize {
    match c as u32 {
        0x2600..=0x27BF
        | 0x1F300..=0x1F64F
        | 0x1F680..=0x1F6FF
        | 0x1F900..=0x1F9FF
        | 0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Display width of a grapheme cluster in terminal cells.
///
/// Flags, ZWJ sequences, skin-tone modified emoji, VS16 presentation and
/// keycaps all occupy two cells. A base character followed by combining
/// marks takes the width of the base.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return 0;
    };

    if grapheme.len() == first.len_utf8() {
        return char_width(first);
    }

    if (0x1F1E6..=0x1F1FF).contains(&(first as u32)) {
        return 2;
    }

    let is_emoji_sequence = chars.any(|c| {
        matches!(c as u32, 0x200D | 0xFE0F | 0x1F3FB..=0x1F3FF | 0x20E3)
    });
    if is_emoji_sequence {
        return 2;
    }

    char_width(first)
}

/// Display width of a string in terminal cells.
pub fn string_width(s: &str) -> usize {
    if s.is_ascii() {
        return s.bytes().filter(|&b| (0x20..0x7F).contains(&b)).count();
    }
    s.graphemes(true).map(grapheme_width).sum()
}

/// Byte offsets of every grapheme cluster end, in order.
///
/// `grapheme_boundaries(s)[k - 1]` is the byte length of the prefix made of
/// the first `k` clusters, so slicing at these offsets never splits a cluster.
pub fn grapheme_boundaries(s: &str) -> Vec<usize> {
    s.grapheme_indices(true)
        .map(|(start, g)| start + g.len())
        .collect()
}
