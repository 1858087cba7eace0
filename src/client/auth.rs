// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS authentication
//!
//! Post-6.43 routers accept name/password on the first `/login` call;
//! older releases answer it with a `ret` hex challenge that must be folded
//! into an MD5 response on a second call.

use md5::compute as md5_compute;
use tokio::io::{AsyncRead, AsyncWrite};

use super::engine::{CommandReply, run_command};
use crate::error::{ApiError, Result};

pub(crate) async fn login<S>(stream: &mut S, username: &str, password: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::trace!("Attempting login for user: {}", username);
    // a failure on the first round trip (bad credentials included) is the
    // command's own outcome and passes through untouched
    let reply = run_command(
        stream,
        "/login",
        &[("name", username), ("password", password)],
    )
    .await?;

    let Some(challenge) = challenge_from(&reply) else {
        tracing::debug!("Login successful (post-6.43 method)");
        return Ok(());
    };

    tracing::trace!("Challenge received, length: {}", challenge.len());
    let response = challenge_response(password, challenge).map_err(wrap)?;
    run_command(
        stream,
        "/login",
        &[("name", username), ("response", &response)],
    )
    .await
    .map_err(wrap)?;
    tracing::debug!("Login successful (legacy method)");
    Ok(())
}

fn wrap(e: ApiError) -> ApiError {
    ApiError::LoginFailed(Box::new(e))
}

/// The `ret` challenge, searched across the `!re` records first and the
/// `!done` attributes second (live routers carry it on `!done`).
fn challenge_from(reply: &CommandReply) -> Option<&str> {
    reply
        .records
        .iter()
        .find_map(|r| r.get("ret"))
        .or_else(|| reply.done.get("ret"))
        .map(String::as_str)
}

/// Builds the legacy response word: `"00"` followed by the lowercase hex
/// MD5 of `0x00 || password || challenge`.
///
/// The challenge must be valid hex of even length; mixed case is accepted.
fn challenge_response(password: &str, challenge_hex: &str) -> Result<String> {
    let challenge = hex::decode(challenge_hex)?;
    let mut data = Vec::with_capacity(1 + password.len() + challenge.len());
    data.push(0u8);
    data.extend_from_slice(password.as_bytes());
    data.extend_from_slice(&challenge);
    let digest = md5_compute(&data);
    let mut response = String::from("00");
    response.push_str(&hex::encode(digest.0));
    Ok(response)
}
