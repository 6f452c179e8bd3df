//! Character-bounded chunking with a fixed overlap.
//!
//! Chunk boundaries are chosen per window: the cut lands right after the latest separator found
//! inside the window, trying paragraph breaks first, then line breaks, sentence ends, and finally
//! spaces. When no separator leaves room for new text past the overlap, the window is cut at exactly
//! `chunk_size` characters. Every chunk after the first starts with the last `overlap` characters
//! of its predecessor, so dropping that prefix and concatenating rebuilds the input byte for byte.
//!
//! Lengths are counted in `char`s, never bytes, and cuts always land on character boundaries.

use crate::config::ConfigError;

const SEPARATOR_LEVELS: [&[&str]; 4] = [&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Validate the parameters; `overlap` must be strictly smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if overlap >= chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by adjacent chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text` into overlapping chunks.
    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks::new(text, self.chunk_size, self.overlap)
    }
}

/// Validate the parameters and split `text` in one step.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Chunks<'_>, ConfigError> {
    Ok(TextChunker::new(chunk_size, overlap)?.split(text))
}

/// Iterator over the chunks of one text. Consumed once; it cannot be restarted.
#[derive(Debug)]
pub struct Chunks<'a> {
    text: &'a str,
    // Byte offset of every char start, plus `text.len()` as the final entry.
    boundaries: Vec<usize>,
    chunk_size: usize,
    overlap: usize,
    start: usize,
    finished: bool,
}

impl<'a> Chunks<'a> {
    fn new(text: &'a str, chunk_size: usize, overlap: usize) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        boundaries.push(text.len());
        Self {
            text,
            boundaries,
            chunk_size,
            overlap,
            start: 0,
            finished: false,
        }
    }

    fn char_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    fn char_index(&self, byte_offset: usize) -> usize {
        self.boundaries
            .binary_search(&byte_offset)
            .unwrap_or_else(|insert_at| insert_at)
    }

    /// Pick the end (exclusive, in chars) of the chunk starting at `self.start`.
    fn find_cut(&self, limit: usize) -> usize {
        // The cut must leave at least one new char after the overlap so the iterator advances.
        let min_cut = self.start + self.overlap + 1;
        let window_offset = self.boundaries[self.start];
        let window = &self.text[window_offset..self.boundaries[limit]];

        for separators in SEPARATOR_LEVELS {
            let latest = separators
                .iter()
                .filter_map(|separator| {
                    window
                        .rfind(separator)
                        .map(|index| window_offset + index + separator.len())
                })
                .max();
            if let Some(byte_cut) = latest {
                let cut = self.char_index(byte_cut);
                if cut >= min_cut {
                    return cut;
                }
            }
        }

        limit
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let limit = self.start + self.chunk_size;
        if limit >= self.char_count() {
            self.finished = true;
            return Some(&self.text[self.boundaries[self.start]..]);
        }

        let end = self.find_cut(limit);
        let chunk = &self.text[self.boundaries[self.start]..self.boundaries[end]];
        self.start = end - self.overlap;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(chunks: &[&str], overlap: usize) -> String {
        let mut rebuilt = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            if index == 0 {
                rebuilt.push_str(chunk);
            } else {
                rebuilt.extend(chunk.chars().skip(overlap));
            }
        }
        rebuilt
    }

    fn tail(text: &str, count: usize) -> String {
        let len = text.chars().count();
        text.chars().skip(len - count).collect()
    }

    fn head(text: &str, count: usize) -> String {
        text.chars().take(count).collect()
    }

    fn assert_chunk_invariants(text: &str, chunk_size: usize, overlap: usize) {
        let chunks: Vec<&str> = split_text(text, chunk_size, overlap).unwrap().collect();
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= chunk_size,
                "chunk longer than {chunk_size}: {chunk:?}"
            );
        }
        for pair in chunks.windows(2) {
            assert_eq!(tail(pair[0], overlap), head(pair[1], overlap));
        }
        assert_eq!(rebuild(&chunks, overlap), text);
    }

    fn words(char_len: usize) -> String {
        let vocabulary = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur"];
        let mut text = String::new();
        let mut index = 0;
        while text.len() < char_len {
            text.push_str(vocabulary[index % vocabulary.len()]);
            text.push(' ');
            index += 1;
        }
        text.truncate(char_len);
        text
    }

    #[test]
    fn short_text_yields_single_identical_chunk() {
        let text = "A short document.";
        let chunks: Vec<&str> = split_text(text, 3000, 200).unwrap().collect();
        assert_eq!(chunks, vec![text]);

        let exact = "x".repeat(3000);
        let chunks: Vec<&str> = split_text(&exact, 3000, 200).unwrap().collect();
        assert_eq!(chunks, vec![exact.as_str()]);
    }

    #[test]
    fn empty_text_yields_one_empty_chunk() {
        let chunks: Vec<&str> = split_text("", 10, 2).unwrap().collect();
        assert_eq!(chunks, vec![""]);
    }

    #[test]
    fn overlap_not_smaller_than_size_is_rejected() {
        for (size, overlap) in [(10, 10), (10, 11), (0, 0)] {
            let error = split_text("anything at all", size, overlap).unwrap_err();
            assert!(matches!(error, ConfigError::InvalidChunking { .. }));
        }
        assert!(TextChunker::new(10, 9).is_ok());
    }

    #[test]
    fn hard_cuts_overlap_by_exact_amount() {
        let text = "a".repeat(7000);
        let chunks: Vec<&str> = split_text(&text, 3000, 200).unwrap().collect();
        let lengths: Vec<usize> = chunks.iter().map(|chunk| chunk.len()).collect();
        assert_eq!(lengths, vec![3000, 3000, 1400]);
        assert_eq!(rebuild(&chunks, 200), text);
    }

    #[test]
    fn seven_thousand_chars_of_prose_make_three_chunks() {
        let text = words(7000);
        let chunks: Vec<&str> = split_text(&text, 3000, 200).unwrap().collect();
        assert_eq!(chunks.len(), 3);
        assert_chunk_invariants(&text, 3000, 200);
    }

    #[test]
    fn prefers_paragraph_breaks_over_spaces() {
        let text = "first paragraph here\n\nsecond paragraph that is long";
        let chunks: Vec<&str> = split_text(text, 30, 4).unwrap().collect();
        assert_eq!(chunks[0], "first paragraph here\n\n");
        assert_chunk_invariants(text, 30, 4);
    }

    #[test]
    fn prefers_sentence_ends_over_plain_spaces() {
        let text = "One sentence ends. Then another one follows without stopping";
        let chunks: Vec<&str> = split_text(text, 30, 3).unwrap().collect();
        assert_eq!(chunks[0], "One sentence ends. ");
        assert_chunk_invariants(text, 30, 3);
    }

    #[test]
    fn separators_inside_overlap_are_ignored() {
        // The only space sits inside the overlap region, so the window must be hard cut.
        let text = "ab cdefghijklmnopqrstuvwxyz";
        let chunks: Vec<&str> = split_text(text, 10, 4).unwrap().collect();
        assert_eq!(chunks[0], "ab cdefghi");
        assert_chunk_invariants(text, 10, 4);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let text = "é ação ü 漢字 ".repeat(40);
        assert_chunk_invariants(&text, 25, 6);
        assert_chunk_invariants(&text, 7, 1);
    }

    #[test]
    fn invariants_hold_across_parameter_grid() {
        let samples = [
            words(1234),
            "line one\nline two\nline three\n\nnext para. More text! Ok? yes".repeat(20),
            "no-separators-at-all".repeat(50),
        ];
        for text in &samples {
            for (size, overlap) in [(50, 0), (50, 10), (64, 63), (200, 20), (997, 100)] {
                assert_chunk_invariants(text, size, overlap);
            }
        }
    }

    #[test]
    fn iterator_is_fused_after_last_chunk() {
        let chunker = TextChunker::new(5, 1).unwrap();
        let mut chunks = chunker.split("abcdefgh");
        assert_eq!(chunks.next(), Some("abcde"));
        assert_eq!(chunks.next(), Some("efgh"));
        assert_eq!(chunks.next(), None);
        assert_eq!(chunks.next(), None);
    }
}
