// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS wire protocol: length codec, sentence framing, stream parsing

mod length;
mod parser;
mod sentence;

pub use length::{decode_length, encode_length};
pub use parser::SentenceParser;
pub use sentence::{Record, Sentence, encode_sentence, encode_word, project_records};

use thiserror::Error;

/// Wire-format violation raised by the codec layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The leading byte of a length prefix matches no encoded form
    #[error("invalid length prefix byte {0:#04x}")]
    InvalidLengthPrefix(u8),
}
