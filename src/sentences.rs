// src/sentences.rs
//! Sentence splitting for scoring and training. Splits on `.`, `!`, `?`
//! followed by whitespace, keeps closing quotes/brackets with the finished
//! sentence, and suppresses breaks after common abbreviations. Never fails:
//! text without a terminator comes back as a single sentence.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "st.", "gen.", "sen.", "gov.",
    "rep.", "vs.", "etc.", "e.g.", "i.e.", "inc.", "ltd.", "co.", "corp.",
    "jr.", "sr.", "no.", "fig.", "eq.", "approx.", "a.m.", "p.m.", "u.s.",
    "u.k.", "e.u.",
];

static ABBREV_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ABBREVIATIONS.iter().copied().collect());

/// Lazy iterator over the sentences of `text`, in order of appearance.
/// Clone it to restart from the beginning.
pub fn split_sentences(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Collecting convenience for callers that want the whole list at once.
pub fn sentences(text: &str) -> Vec<&str> {
    split_sentences(text).collect()
}

#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let chunk = self.rest.trim_start();
            if chunk.is_empty() {
                self.rest = "";
                return None;
            }
            match find_break(chunk) {
                Some(cut) => {
                    let (sent, tail) = chunk.split_at(cut);
                    self.rest = tail;
                    let sent = sent.trim_end();
                    if !sent.is_empty() {
                        return Some(sent);
                    }
                }
                None => {
                    self.rest = "";
                    return Some(chunk.trim_end());
                }
            }
        }
    }
}

/// Byte index where the first sentence of `s` ends (exclusive), i.e. the
/// position of the whitespace after a valid terminator. None when `s` has no
/// internal sentence boundary.
fn find_break(s: &str) -> Option<usize> {
    let mut from = 0usize;
    while let Some(off) = s[from..].find(['.', '!', '?']) {
        let i = from + off;
        let term = s[i..].chars().next()?;
        let mut j = i + term.len_utf8();
        // closing quotes/brackets belong to the sentence they finish
        while let Some(c) = s[j..].chars().next() {
            if matches!(c, '"' | '\'' | ')' | ']' | '\u{2019}' | '\u{201d}') {
                j += c.len_utf8();
            } else {
                break;
            }
        }
        let followed_by_ws = s[j..]
            .chars()
            .next()
            .map(char::is_whitespace)
            .unwrap_or(false);
        if followed_by_ws && !(term == '.' && ends_with_abbreviation(s, i)) {
            return Some(j);
        }
        from = i + term.len_utf8();
    }
    None
}

/// Does the token ending at the period at `dot_idx` look like an abbreviation?
fn ends_with_abbreviation(s: &str, dot_idx: usize) -> bool {
    let head = &s[..=dot_idx];
    let start = head
        .rfind(char::is_whitespace)
        .map(|w| w + 1)
        .unwrap_or(0);
    let token = head[start..]
        .trim_start_matches(['"', '\'', '(', '[', '\u{2018}', '\u{201c}']);
    if token.is_empty() {
        return false;
    }
    ABBREV_SET.contains(token.to_ascii_lowercase().as_str())
}
