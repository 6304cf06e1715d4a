//! # Text Chunker
//!
//! Pure, deterministic splitting of article text into ordered synthesis
//! units. No I/O.
//!
//! The first chunk is capped at a small word count so the first network
//! round trip carries as little text as possible, bounding time-to-first-
//! sound. Subsequent chunks grow to a target length and close on sentence
//! terminators so each clip ends at a natural pause; a hard cap keeps
//! chunks bounded even on text with no punctuation at all.

use crate::config::ChunkerConfig;

/// One unit of text sent to the synthesis endpoint and played back as one
/// contiguous audio clip.
///
/// Chunks are ordered and immutable once produced for a given input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk within its sequence.
    pub index: usize,
    /// Normalized text to synthesize.
    pub text: String,
}

/// Sentence terminators that allow a chunk to close at its target length.
const TERMINATORS: [char; 5] = ['.', '!', '?', ';', ':'];

/// Characters stripped during normalization (markdown noise).
const STRIP_CHARS: [char; 5] = ['#', '*', '`', '[', ']'];

/// Normalize raw article text for synthesis and cache keying.
///
/// Strips markdown-noise characters, collapses whitespace runs (including
/// blank lines) to single spaces, trims, and truncates to
/// `max_chars` on a character boundary.
pub fn normalize(text: &str, max_chars: usize) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !STRIP_CHARS.contains(c))
        .collect();

    let collapsed: String = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > max_chars {
        collapsed.chars().take(max_chars).collect()
    } else {
        collapsed
    }
}

/// Returns `true` if the word ends in a sentence terminator.
fn ends_sentence(word: &str) -> bool {
    word.chars().last().is_some_and(|c| TERMINATORS.contains(&c))
}

/// Split text into an ordered sequence of playable chunks.
///
/// Returns an empty Vec for empty or whitespace-only input (no playback is
/// attempted for such text). Words are split on literal whitespace only;
/// there is no language-aware tokenization.
pub fn chunk(text: &str, config: &ChunkerConfig) -> Vec<TextChunk> {
    let normalized = normalize(text, config.max_text_chars);
    if normalized.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = normalized.split(' ').collect();
    if words.len() <= config.first_chunk_words {
        return vec![TextChunk {
            index: 0,
            text: normalized,
        }];
    }

    let mut chunks = Vec::new();
    chunks.push(TextChunk {
        index: 0,
        text: words[..config.first_chunk_words].join(" "),
    });

    let hard_cap = config.target_words + config.overflow_words;
    let mut current: Vec<&str> = Vec::new();

    for word in &words[config.first_chunk_words..] {
        current.push(word);

        let reached_target = current.len() >= config.target_words && ends_sentence(word);
        let reached_cap = current.len() >= hard_cap;

        if reached_target || reached_cap {
            chunks.push(TextChunk {
                index: chunks.len(),
                text: current.join(" "),
            });
            current.clear();
        }
    }

    // Trailing accumulation becomes the last chunk even without a terminator.
    if !current.is_empty() {
        chunks.push(TextChunk {
            index: chunks.len(),
            text: current.join(" "),
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChunkerConfig {
        ChunkerConfig::default()
    }

    fn words(n: usize, terminator: bool) -> String {
        let mut text = vec!["word"; n].join(" ");
        if terminator {
            text.push('.');
        }
        text
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(chunk("", &config()).is_empty());
        assert!(chunk("   \n\n\t  ", &config()).is_empty());
        // Markdown noise alone normalizes to nothing.
        assert!(chunk("### ***", &config()).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk("Hello world.", &config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "Hello world.");
    }

    #[test]
    fn threshold_text_is_one_chunk() {
        let chunks = chunk(&words(15, true), &config());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn first_chunk_is_capped() {
        let chunks = chunk(&words(40, true), &config());
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].text.split(' ').count(), 15);
    }

    #[test]
    fn normalization_strips_markdown() {
        let chunks = chunk("# Title\n\nSome **bold** and `code` [link] text.", &config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Title Some bold and code link text.");
    }

    #[test]
    fn whitespace_runs_collapse() {
        let chunks = chunk("one\n\n\ntwo    three\t\tfour", &config());
        assert_eq!(chunks[0].text, "one two three four");
    }

    #[test]
    fn truncates_to_max_chars() {
        let long = "a".repeat(10_000);
        let chunks = chunk(&long, &config());
        assert_eq!(chunks[0].text.chars().count(), 5000);
    }

    #[test]
    fn chunks_close_on_terminators_after_target() {
        // 15 first-chunk words, then sentences of 20 words: the accumulator
        // reaches 80 words at the end of the fourth sentence and must close
        // exactly there.
        let sentence = words(20, true);
        let body: Vec<String> = (0..10).map(|_| sentence.clone()).collect();
        let text = format!("{} {}", words(15, false), body.join(" "));

        let chunks = chunk(&text, &config());
        for c in &chunks[1..chunks.len() - 1] {
            assert_eq!(c.text.split(' ').count(), 80, "chunk {}", c.index);
            assert!(c.text.ends_with('.'), "chunk {} should end a sentence", c.index);
        }
    }

    #[test]
    fn hard_cap_on_terminator_free_text() {
        // No punctuation anywhere: every non-final chunk after the first
        // closes purely on the 100-word hard cap.
        let text = words(15 + 350, false);
        let chunks = chunk(&text, &config());
        assert!(chunks.len() > 2);
        for c in &chunks[1..chunks.len() - 1] {
            assert_eq!(c.text.split(' ').count(), 100, "chunk {}", c.index);
        }
    }

    #[test]
    fn trailing_partial_becomes_last_chunk() {
        let text = format!("{} {}", words(15, false), words(7, false));
        let chunks = chunk(&text, &config());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text.split(' ').count(), 7);
    }

    #[test]
    fn indices_are_strictly_increasing() {
        let chunks = chunk(&words(500, true), &config());
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    #[test]
    fn deterministic() {
        let text = words(300, true);
        assert_eq!(chunk(&text, &config()), chunk(&text, &config()));
    }
}
