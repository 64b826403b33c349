//! Sliding-window chunking.
//!
//! Offsets are in characters, not bytes, so a window never splits a
//! multi-byte code point.

/// A contiguous slice of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Character offset of the first character
    pub start: usize,
    /// Character offset one past the last character
    pub end: usize,
    pub text: String,
}

/// Split `text` into windows of at most `chunk_size` characters, each
/// starting `overlap` characters before the previous one ended.
///
/// Requires `overlap < chunk_size`; an overlap that would stall is clamped to
/// `chunk_size - 1` so the window always advances.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);

    // byte offset of every char boundary, including the end of the text
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let total = boundaries.len() - 1;

    if total == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(total.div_ceil(chunk_size - overlap));
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(total);
        chunks.push(TextChunk {
            start,
            end,
            text: text[boundaries[start]..boundaries[end]].to_string(),
        });
        if end == total {
            break;
        }
        start = end.saturating_sub(overlap);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(text: &str, chunks: &[TextChunk], chunk_size: usize) {
        let total = text.chars().count();
        assert_eq!(chunks.first().map(|c| c.start), Some(0));
        assert_eq!(chunks.last().map(|c| c.end), Some(total));
        for pair in chunks.windows(2) {
            // no gap, strictly forward
            assert!(pair[1].start <= pair[0].end);
            assert!(pair[1].start > pair[0].start);
        }
        for chunk in chunks {
            let width = chunk.end - chunk.start;
            assert!(width <= chunk_size);
            assert_eq!(chunk.text.chars().count(), width);
        }
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split("", 1600, 150).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split("hello world", 1600, 150);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
    }

    #[test]
    fn exact_fit_is_one_chunk() {
        let text = "x".repeat(1600);
        assert_eq!(split(&text, 1600, 150).len(), 1);
    }

    #[test]
    fn four_thousand_chars_make_three_chunks() {
        let text = "a".repeat(4000);
        let chunks = split(&text, 1600, 150);
        let spans: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(spans, vec![(0, 1600), (1450, 3050), (2900, 4000)]);
        assert_covers(&text, &chunks, 1600);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = split(&text, 100, 10);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 10);
            let tail: String = pair[0].text.chars().skip(90).collect();
            let head: String = pair[1].text.chars().take(10).collect();
            assert_eq!(tail, head);
        }
        assert_covers(&text, &chunks, 100);
    }

    #[test]
    fn coverage_across_configurations() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(37);
        for (size, overlap) in [(1, 0), (7, 3), (50, 49), (64, 0), (200, 150), (5000, 10)] {
            let chunks = split(&text, size, overlap);
            assert_covers(&text, &chunks, size);
            assert!(chunks.len() <= text.len().div_ceil(size - overlap));
        }
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "héllo wörld — ünïcode ✓ ".repeat(20);
        let chunks = split(&text, 33, 5);
        assert_covers(&text, &chunks, 33);
    }

    #[test]
    fn deterministic_boundaries() {
        let text = "lorem ipsum dolor sit amet ".repeat(150);
        assert_eq!(split(&text, 1600, 150), split(&text, 1600, 150));
    }

    #[test]
    fn stalled_overlap_is_clamped() {
        let chunks = split("abcdefghij", 4, 9);
        assert_covers("abcdefghij", &chunks, 4);
    }
}
