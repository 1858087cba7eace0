// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Byte-duplex transport over plain TCP or TLS
//!
//! The rest of the client only needs `AsyncRead + AsyncWrite`; this module
//! owns socket construction, the connect timeout, and the TLS handshake.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{self, DigitallySignedStruct, SignatureScheme};
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};

use crate::config::ClientOptions;
use crate::error::{ApiError, Result};

/// Established connection to a single router
#[derive(Debug)]
pub enum Transport {
    Tcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Transport {
    /// Opens the transport described by `options`.
    ///
    /// The connect timeout covers the TCP dial and, separately, the TLS
    /// handshake. Port defaults follow the scheme: 8728 plain, 8729 TLS.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Connect`] when the dial is refused, times out,
    /// or the handshake fails.
    pub async fn connect(options: &ClientOptions) -> Result<Self> {
        let host = options.host.as_str();
        let port = options.effective_port();
        tracing::trace!("Attempting TCP connection to {}:{}", host, port);

        let stream = match timeout(options.timeout(), TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(connect_error(host, port, &e.to_string())),
            Err(_) => return Err(connect_error(host, port, "connect timed out")),
        };
        tracing::trace!("TCP connection established to {}:{}", host, port);

        if !options.ssl {
            return Ok(Self::Tcp(stream));
        }

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| connect_error(host, port, &e.to_string()))?;
        let connector = TlsConnector::from(tls_client_config());
        let tls = match timeout(options.timeout(), connector.connect(server_name, stream)).await {
            Ok(Ok(tls)) => tls,
            Ok(Err(e)) => return Err(connect_error(host, port, &e.to_string())),
            Err(_) => return Err(connect_error(host, port, "TLS handshake timed out")),
        };
        tracing::trace!("TLS session established to {}:{}", host, port);
        Ok(Self::Tls(Box::new(tls)))
    }
}

fn connect_error(host: &str, port: u16, reason: &str) -> ApiError {
    ApiError::Connect {
        host: host.to_string(),
        port,
        reason: reason.to_string(),
    }
}

/// Client TLS configuration that accepts any server certificate.
///
/// RouterOS serves a self-signed certificate on the API-SSL port; chain
/// validation is disabled deliberately.
fn tls_client_config() -> Arc<rustls::ClientConfig> {
    let config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
        .with_no_client_auth();
    Arc::new(config)
}

#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_flush(cx),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}
