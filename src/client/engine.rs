// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Command execution over an established transport
//!
//! One command at a time: serialize the request sentence, write it in a
//! single shot, then collect reply sentences until a terminal tag
//! (`!done`, `!trap`, `!fatal`) or transport loss resolves the call.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ApiError, Result};
use crate::protocol::{Record, Sentence, SentenceParser, encode_sentence, project_records};

/// Completed reply to one command
#[derive(Debug, Clone, Default)]
pub struct CommandReply {
    /// One record per `!re` row, in arrival order
    pub records: Vec<Record>,
    /// Attributes carried by the terminating `!done` sentence
    pub done: Record,
}

pub(crate) async fn run_command<S>(
    stream: &mut S,
    path: &str,
    params: &[(&str, &str)],
) -> Result<CommandReply>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = build_request(path, params);
    stream
        .write_all(&request)
        .await
        .map_err(ApiError::Transport)?;
    stream.flush().await.map_err(ApiError::Transport)?;
    tracing::trace!("Sent {} with {} parameter(s)", path, params.len());

    collect_reply(stream).await
}

/// Serializes the request sentence: the path word, then one word per
/// parameter.
///
/// Attribute keys take the `=key=value` shape. Keys already carrying the
/// `?` query prefix go out as `key=value` (bare `key` for an empty value)
/// so server-side filter words keep their wire shape.
fn build_request(path: &str, params: &[(&str, &str)]) -> Vec<u8> {
    let mut words = Vec::with_capacity(1 + params.len());
    words.push(path.to_string());
    for (key, value) in params {
        if key.starts_with('?') {
            if value.is_empty() {
                words.push((*key).to_string());
            } else {
                words.push(format!("{key}={value}"));
            }
        } else {
            words.push(format!("={key}={value}"));
        }
    }
    encode_sentence(&words)
}

async fn collect_reply<S>(stream: &mut S) -> Result<CommandReply>
where
    S: AsyncRead + Unpin,
{
    let mut parser = SentenceParser::new();
    let mut collected: Vec<Sentence> = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.map_err(map_read_error)?;
        if n == 0 {
            tracing::trace!("Transport closed mid-command");
            return Err(ApiError::ConnectionClosed);
        }
        for sentence in parser.feed(&chunk[..n])? {
            tracing::trace!("Received sentence: {:?}", sentence.words);
            if sentence.is("!trap") {
                let message = sentence
                    .attribute("message")
                    .unwrap_or("Trap error")
                    .to_string();
                return Err(ApiError::Trap(message));
            }
            if sentence.is("!fatal") {
                return Err(ApiError::Fatal(sentence.words[1..].join(" ")));
            }
            if sentence.is("!done") {
                let done = sentence.attributes();
                collected.push(sentence);
                tracing::trace!("Command complete, {} sentence(s) collected", collected.len());
                return Ok(CommandReply {
                    records: project_records(&collected),
                    done,
                });
            }
            collected.push(sentence);
        }
    }
}

fn map_read_error(e: std::io::Error) -> ApiError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ApiError::ConnectionEnded
    } else {
        ApiError::Transport(e)
    }
}
