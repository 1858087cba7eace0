// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Resumable sentence stream parser
//!
//! TCP delivers the reply stream in arbitrary fragments. The parser owns a
//! growing buffer: each transport read is appended, every complete sentence
//! is drained off the front, and an unfinished trailing word stays buffered
//! until the next read completes it.

use bytes::{Buf, BytesMut};

use super::ProtocolError;
use super::length::decode_length;
use super::sentence::Sentence;

/// Incremental parser turning byte chunks into complete sentences
#[derive(Debug, Default)]
pub struct SentenceParser {
    buf: BytesMut,
}

impl SentenceParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Appends `chunk` and drains every sentence completed by it.
    ///
    /// A zero-length word closes a sentence. A terminator with no preceding
    /// words is consumed silently. Word bodies decode as lossy UTF-8; the
    /// protocol carries ASCII keys and operator-supplied values.
    ///
    /// # Errors
    ///
    /// Propagates [`ProtocolError`] when a length prefix is malformed. The
    /// buffer is left untouched in that case; the stream is unusable beyond
    /// the faulty byte.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Sentence>, ProtocolError> {
        self.buf.extend_from_slice(chunk);
        let mut sentences = Vec::new();
        while let Some((words, consumed)) = Self::next_sentence(&self.buf)? {
            self.buf.advance(consumed);
            if !words.is_empty() {
                sentences.push(Sentence::new(words));
            }
        }
        Ok(sentences)
    }

    /// Bytes retained after the last fully parsed sentence
    #[must_use]
    pub fn residual(&self) -> &[u8] {
        &self.buf
    }

    /// Attempts one sentence from the front of `buf`.
    ///
    /// `None` means the buffer ends inside a length prefix or word body;
    /// nothing is consumed so the partial word is re-parsed next time.
    fn next_sentence(buf: &[u8]) -> Result<Option<(Vec<String>, usize)>, ProtocolError> {
        let mut offset = 0;
        let mut words = Vec::new();
        loop {
            let Some((len, width)) = decode_length(&buf[offset..])? else {
                return Ok(None);
            };
            if len == 0 {
                return Ok(Some((words, offset + width)));
            }
            let end = offset + width + len;
            if buf.len() < end {
                return Ok(None);
            }
            words.push(String::from_utf8_lossy(&buf[offset + width..end]).into_owned());
            offset = end;
        }
    }
}
