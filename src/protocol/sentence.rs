// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Sentence framing and reply projection

use std::collections::HashMap;

use super::length::encode_length;

/// Flattened attribute view of one `!re` reply row
pub type Record = HashMap<String, String>;

/// One protocol message: an ordered list of words.
///
/// On the wire a sentence is the concatenation of length-prefixed words
/// followed by a zero-length terminator word. Replies carry their tag
/// (`!re`, `!done`, `!trap`, `!fatal`) as the first word; requests carry
/// the command path there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    pub words: Vec<String>,
}

impl Sentence {
    #[must_use]
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// First word of the sentence, if any
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// True when the first word equals `tag`
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// Value of the first `=key=value` word matching `key`
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.words.iter().find_map(|w| {
            let stripped = w.strip_prefix('=')?;
            match stripped.split_once('=') {
                Some((k, v)) if k == key => Some(v),
                None if stripped == key => Some(""),
                _ => None,
            }
        })
    }

    /// All `=key=value` words as a map; a repeated key keeps its last value.
    ///
    /// Values keep everything after the second `=` verbatim, so payloads
    /// containing `=` survive. Words without the attribute prefix are
    /// skipped.
    #[must_use]
    pub fn attributes(&self) -> Record {
        let mut record = Record::new();
        for word in &self.words {
            if let Some(stripped) = word.strip_prefix('=') {
                match stripped.split_once('=') {
                    Some((k, v)) => record.insert(k.to_string(), v.to_string()),
                    None => record.insert(stripped.to_string(), String::new()),
                };
            }
        }
        record
    }
}

impl From<Vec<String>> for Sentence {
    fn from(words: Vec<String>) -> Self {
        Self::new(words)
    }
}

/// Appends one length-prefixed word to `out`
pub fn encode_word(out: &mut Vec<u8>, word: &str) {
    let bytes = word.as_bytes();
    out.extend_from_slice(&encode_length(bytes.len()));
    out.extend_from_slice(bytes);
}

/// Frames a full request sentence, including the zero-length terminator
#[must_use]
pub fn encode_sentence<I, S>(words: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for word in words {
        encode_word(&mut out, word.as_ref());
    }
    out.push(0);
    out
}

/// Projects collected reply sentences into records, one per `!re` row.
///
/// Sentences with any other tag (including the terminating `!done`) are
/// dropped from the projection.
#[must_use]
pub fn project_records(sentences: &[Sentence]) -> Vec<Record> {
    sentences
        .iter()
        .filter(|s| s.is("!re"))
        .map(Sentence::attributes)
        .collect()
}
