//! Paragraph-line tokenization with a swappable word-boundary strategy.

use unicode_segmentation::UnicodeSegmentation;

/// Atomic unit produced by the segmenter.
///
/// Tokens never contain embedded newlines; the engine splits the input on
/// hard line breaks before segmentation runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A run of whitespace collapsed to one canonical space.
    Space,
    /// A non-whitespace run: a word, or a single grapheme cluster when no
    /// word boundary is known for the script in use.
    Word(String),
}

/// Strategy seam for locale-aware word-boundary segmentation.
///
/// A provider may decline a line by returning `None`, in which case the
/// engine falls back to whitespace-run partitioning (or grapheme clusters
/// for lines without any whitespace). Correctness never depends on a
/// particular provider being installed.
pub trait SegmentationProvider: Send + Sync {
    /// Split `line` into boundary segments covering the whole line in order.
    fn word_segments<'a>(&self, line: &'a str) -> Option<Vec<&'a str>>;
}

/// Default provider backed by UAX#29 word boundaries.
///
/// Scripts without inter-word spaces segment into per-cluster pieces, so no
/// illegal mid-word break is introduced downstream.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeWordProvider;

impl SegmentationProvider for UnicodeWordProvider {
    fn word_segments<'a>(&self, line: &'a str) -> Option<Vec<&'a str>> {
        Some(line.split_word_bounds().collect())
    }
}

/// Split one paragraph line into tokens.
///
/// Whitespace segments collapse to a single [`Token::Space`]; consecutive
/// space tokens are merged so a run of mixed whitespace yields one marker.
/// An empty line yields no tokens.
pub fn segment_line(line: &str, provider: Option<&dyn SegmentationProvider>) -> Vec<Token> {
    if line.is_empty() {
        return Vec::new();
    }
    if let Some(provider) = provider {
        if let Some(segments) = provider.word_segments(line) {
            return collapse_segments(&segments);
        }
    }
    fallback_partition(line)
}

fn collapse_segments(segments: &[&str]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        if segment.chars().all(char::is_whitespace) {
            push_space(&mut tokens);
        } else {
            tokens.push(Token::Word((*segment).to_string()));
        }
    }
    tokens
}

/// Whitespace-run partition; lines with no whitespace at all split into
/// grapheme clusters so the downstream splitter can still break them safely.
fn fallback_partition(line: &str) -> Vec<Token> {
    if !line.chars().any(char::is_whitespace) {
        return line
            .graphemes(true)
            .map(|cluster| Token::Word(cluster.to_string()))
            .collect();
    }

    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in line.chars() {
        if ch.is_whitespace() {
            if !word.is_empty() {
                tokens.push(Token::Word(core::mem::take(&mut word)));
            }
            push_space(&mut tokens);
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

fn push_space(tokens: &mut Vec<Token>) {
    if !matches!(tokens.last(), Some(Token::Space)) {
        tokens.push(Token::Space);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| match t {
                Token::Space => " ".to_string(),
                Token::Word(w) => w.clone(),
            })
            .collect()
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        assert!(segment_line("", Some(&UnicodeWordProvider)).is_empty());
        assert!(segment_line("", None).is_empty());
    }

    #[test]
    fn provider_splits_words_and_collapses_whitespace() {
        let tokens = segment_line("hello   world", Some(&UnicodeWordProvider));
        assert_eq!(words(&tokens), vec!["hello", " ", "world"]);
    }

    #[test]
    fn mixed_whitespace_collapses_to_one_space() {
        let tokens = segment_line("a \t  b", Some(&UnicodeWordProvider));
        assert_eq!(words(&tokens), vec!["a", " ", "b"]);
    }

    #[test]
    fn fallback_partitions_on_whitespace_runs() {
        let tokens = segment_line("one  two", None);
        assert_eq!(words(&tokens), vec!["one", " ", "two"]);
    }

    #[test]
    fn fallback_without_whitespace_splits_grapheme_clusters() {
        let tokens = segment_line("héllo", None);
        assert_eq!(words(&tokens), vec!["h", "é", "l", "l", "o"]);
    }

    #[test]
    fn fallback_keeps_emoji_clusters_whole() {
        let tokens = segment_line("a👩‍🚀b", None);
        assert_eq!(words(&tokens), vec!["a", "👩‍🚀", "b"]);
    }

    #[test]
    fn provider_passes_spaceless_scripts_through_per_cluster() {
        let tokens = segment_line("日本語", Some(&UnicodeWordProvider));
        assert!(tokens.iter().all(|t| matches!(t, Token::Word(_))));
        assert!(tokens.len() > 1);
    }

    #[test]
    fn leading_and_trailing_whitespace_become_space_markers() {
        let tokens = segment_line("  word  ", None);
        assert_eq!(words(&tokens), vec![" ", "word", " "]);
    }
}
