//! Overlapping text chunking for embedding and retrieval.
//!
//! Two caller-selected strategies:
//!
//! - [`chunk_text`] — the canonical sliding character window with
//!   sentence-boundary backoff and configurable overlap.
//! - [`chunk_by_paragraphs`] — groups blank-line-delimited paragraphs up
//!   to a size bound, splitting oversized paragraphs with the sliding
//!   window.
//!
//! # Sliding-window algorithm
//!
//! 1. Normalize all whitespace runs (including newlines) to single
//!    spaces and trim.
//! 2. If the normalized text fits in one window, return it whole.
//! 3. Otherwise slide a window of `chunk_size` characters. When the
//!    window does not reach the end of the text, cut at the last
//!    sentence terminator (`. `, `! `, `? `) past the window midpoint —
//!    cutting earlier would produce a degenerate tiny chunk — and fall
//!    back to the last space when no such terminator exists.
//! 4. Advance the window start to `cut - overlap`. If that would not
//!    move past the previous start, advance to `cut` instead, so the
//!    loop always makes forward progress.
//!
//! All indexing is in characters, never bytes, so multi-byte text is
//! split safely.

/// Overlap used when an oversized paragraph is split in paragraph mode.
const PARAGRAPH_SPLIT_OVERLAP: usize = 100;

/// Collapse every whitespace run (spaces, tabs, newlines) to a single
/// space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Returns an empty vector for empty or whitespace-only input. Every
/// returned chunk is non-empty and trimmed; consecutive chunks share up
/// to `overlap` characters of context. The output is deterministic for
/// identical inputs.
///
/// Callers are expected to validate `chunk_size > overlap` (see
/// [`ChunkParams`](crate::models::ChunkParams)); if the precondition is
/// violated the function still terminates, degrading to zero overlap.
///
/// A single token longer than `chunk_size` cannot be cut at a space and
/// is emitted as one oversized chunk rather than being truncated.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= chunk_size {
        return vec![normalized];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let window_end = (start + chunk_size).min(chars.len());
        let mut end = window_end;

        if window_end < chars.len() {
            match last_sentence_end(&chars, start, window_end) {
                // Only cut at a sentence end past the midpoint; a cut in
                // the first half would leave a degenerate chunk.
                Some(p) if p > start + chunk_size / 2 => end = p + 1,
                _ => {
                    if let Some(space) = last_space(&chars, start, window_end) {
                        if space > start {
                            end = space;
                        }
                    }
                }
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end == chars.len() {
            break;
        }

        // Overlap must not swallow the whole step.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

/// Position of the last sentence terminator followed by a space within
/// `[start, end)`, matching the two-character sequences `. `, `! `, `? `.
fn last_sentence_end(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let limit = end.saturating_sub(1);
    (start..limit)
        .rev()
        .find(|&i| matches!(chars[i], '.' | '!' | '?') && chars[i + 1] == ' ')
}

/// Position of the last space within `[start, end)`.
fn last_space(chars: &[char], start: usize, end: usize) -> Option<usize> {
    (start..end).rev().find(|&i| chars[i] == ' ')
}

/// Group paragraphs into chunks of at most `max_chunk_size` characters.
///
/// Paragraphs are delimited by blank lines. Small paragraphs accumulate
/// into a shared chunk; a paragraph that alone exceeds the bound is
/// split with [`chunk_text`]. This mode is selected explicitly by the
/// caller — the sliding window above is the default strategy.
pub fn chunk_by_paragraphs(text: &str, max_chunk_size: usize) -> Vec<String> {
    if max_chunk_size == 0 {
        return Vec::new();
    }
    let overlap = PARAGRAPH_SPLIT_OVERLAP.min(max_chunk_size / 2);

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in split_paragraphs(text) {
        let paragraph = normalize_whitespace(&paragraph);
        if paragraph.is_empty() {
            continue;
        }

        let paragraph_len = paragraph.chars().count();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + paragraph_len > max_chunk_size {
            chunks.push(std::mem::take(&mut current));
        }

        if paragraph_len > max_chunk_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(chunk_text(&paragraph, max_chunk_size, overlap));
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&paragraph);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split text into paragraphs on blank-line boundaries.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}
