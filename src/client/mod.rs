//! High-level RouterOS client

mod auth;
mod engine;

pub use engine::CommandReply;

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::config::{ClientOptions, Credentials};
use crate::emitter::{Emitter, Event, Listener};
use crate::error::{ApiError, Result};
use crate::protocol::Record;
use crate::transport::Transport;

/// RouterOS API client bound to a single router
///
/// Commands run strictly one at a time: the protocol does not tag
/// requests, so there is no in-flight multiplexing. After a transport
/// failure the client stays unusable; construct a fresh one to reconnect.
pub struct RouterOsClient {
    options: ClientOptions,
    transport: Option<Transport>,
    emitter: Arc<Emitter>,
}

impl RouterOsClient {
    /// Creates a disconnected client for `options`
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            transport: None,
            emitter: Arc::new(Emitter::new()),
        }
    }

    /// Options this client was created with
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// True while a transport is attached
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Opens the transport (TCP, or TLS when `ssl` is set) and emits
    /// [`Event::Connect`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Connect`] when the dial or handshake fails or
    /// the connect timeout fires.
    pub async fn connect(&mut self) -> Result<()> {
        let transport = Transport::connect(&self.options).await?;
        self.transport = Some(transport);
        tracing::debug!(
            "Connected to {}:{}",
            self.options.host,
            self.options.effective_port()
        );
        self.emitter.emit(Event::Connect, None);
        Ok(())
    }

    /// Authenticates against the router.
    ///
    /// Handles both the post-6.43 flow (success on the first `/login`) and
    /// the legacy MD5 challenge-response flow.
    ///
    /// # Errors
    ///
    /// A failure on the first `/login` round trip (a trap for bad
    /// credentials, transport loss, [`ApiError::NotConnected`]) passes
    /// through verbatim; failures past that point surface as
    /// [`ApiError::LoginFailed`] wrapping the underlying cause.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let result = match self.transport.as_mut() {
            Some(transport) => auth::login(transport, username, password).await,
            None => Err(ApiError::NotConnected),
        };
        result.map_err(|e| self.observe_failure(e))
    }

    /// [`login`](Self::login) with credentials held behind [`secrecy`]
    pub async fn login_with(&mut self, credentials: &Credentials) -> Result<()> {
        self.login(
            &credentials.username,
            credentials.password.expose_secret(),
        )
        .await
    }

    /// Runs one command and returns the projected records.
    ///
    /// `params` are `(key, value)` pairs serialized as `=key=value`
    /// attribute words; keys prefixed with `?` are forwarded as query
    /// words.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotConnected`] before [`connect`](Self::connect);
    /// otherwise whichever terminal condition the reply stream hit first
    /// (trap, fatal, transport loss).
    pub async fn run_command(
        &mut self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Record>> {
        Ok(self.run_raw(path, params).await?.records)
    }

    /// Runs one command and returns the full reply, `!done` attributes
    /// included
    pub async fn run_raw(&mut self, path: &str, params: &[(&str, &str)]) -> Result<CommandReply> {
        let result = match self.transport.as_mut() {
            Some(transport) => engine::run_command(transport, path, params).await,
            None => Err(ApiError::NotConnected),
        };
        result.map_err(|e| self.observe_failure(e))
    }

    /// Shorthand for `/system/identity/print`
    pub async fn get_system_identity(&mut self) -> Result<Vec<Record>> {
        self.run_command("/system/identity/print", &[]).await
    }

    /// Synchronously destroys the transport and emits [`Event::Close`].
    ///
    /// Safe to call repeatedly; closing a never-connected client only
    /// emits the event.
    pub fn close(&mut self) -> Result<()> {
        if let Some(transport) = self.transport.take() {
            drop(transport);
            tracing::debug!("Connection to {} closed", self.options.host);
        }
        self.emitter.emit(Event::Close, None);
        Ok(())
    }

    /// Registers `listener` for every future `event`
    pub fn on(&self, event: Event, listener: Listener) -> &Self {
        self.emitter.on(event, listener);
        self
    }

    /// Registers `listener` for the next `event` only
    pub fn once(&self, event: Event, listener: Listener) -> &Self {
        self.emitter.once(event, listener);
        self
    }

    /// Removes a previously registered `listener`
    pub fn off(&self, event: Event, listener: &Listener) -> &Self {
        self.emitter.off(event, listener);
        self
    }

    /// Forwards the observed transport condition onto the emitter before
    /// the error reaches the caller.
    fn observe_failure(&self, error: ApiError) -> ApiError {
        let observed = match &error {
            ApiError::LoginFailed(inner) => inner.as_ref(),
            other => other,
        };
        match observed {
            ApiError::Transport(_) => {
                self.emitter.emit(Event::Error, Some(observed));
            }
            ApiError::ConnectionClosed => {
                self.emitter.emit(Event::End, None);
                self.emitter.emit(Event::Close, None);
            }
            ApiError::ConnectionEnded => {
                self.emitter.emit(Event::End, None);
            }
            _ => {}
        }
        error
    }
}
