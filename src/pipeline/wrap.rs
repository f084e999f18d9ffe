//! Greedy word wrapping.
//!
//! Two measures are supported: a fixed column count (the quote template wraps
//! every field at 100 characters regardless of glyph widths) and a width in
//! points (reflowed paragraphs must fit between page margins).
//!
//! Both split on whitespace, collapse runs of whitespace into single spaces and
//! never break a word unless the word alone exceeds the limit; such a word is
//! cut into limit-sized chunks. Empty or whitespace-only input yields no lines.

use super::metrics::{text_width, FontFace};

/// Wrap `text` so that no line is longer than `columns` characters.
pub fn wrap_columns(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    wrap_with(text, |candidate| candidate.chars().count() <= columns)
}

/// Wrap `text` so that no line is wider than `max_width` points.
pub fn wrap_to_width(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    wrap_with(text, |candidate| text_width(candidate, face, size) <= max_width)
}

fn wrap_with(text: &str, fits: impl Fn(&str) -> bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            push_word(&mut lines, &mut current, word, &fits);
            continue;
        }

        let candidate = format!("{current} {word}");
        if fits(&candidate) {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            push_word(&mut lines, &mut current, word, &fits);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Start a new line with `word`, cutting it when it does not fit on its own.
fn push_word(lines: &mut Vec<String>, current: &mut String, word: &str, fits: &impl Fn(&str) -> bool) {
    if fits(word) {
        current.push_str(word);
        return;
    }

    let mut chunk = String::new();
    for c in word.chars() {
        chunk.push(c);
        if !fits(&chunk) && chunk.chars().count() > 1 {
            chunk.pop();
            lines.push(std::mem::take(&mut chunk));
            chunk.push(c);
        }
    }
    *current = chunk;
}
