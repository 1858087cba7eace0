// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! End-to-end client scenarios against a scripted RouterOS peer

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use routeros_client::prelude::*;
use routeros_client::protocol::encode_sentence;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Binds a loopback listener and serves exactly one connection with `handler`.
///
/// The returned handle propagates assertion failures from the peer side;
/// await it once the scripted exchange should have completed.
async fn spawn_router<F, Fut>(handler: F) -> (SocketAddr, tokio::task::JoinHandle<()>)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        handler(stream).await;
    });
    (addr, handle)
}

async fn connected_client(addr: SocketAddr) -> RouterOsClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut options = ClientOptions::new("127.0.0.1");
    options.port = Some(addr.port());
    let mut client = create_client(options);
    client.connect().await.unwrap();
    client
}

/// Reads one request sentence off the wire
async fn read_request(stream: &mut TcpStream) -> Sentence {
    let mut parser = SentenceParser::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "client closed while a request was expected");
        let mut sentences = parser.feed(&buf[..n]).unwrap();
        if let Some(sentence) = sentences.pop() {
            return sentence;
        }
    }
}

fn legacy_response(password: &str, challenge: &[u8]) -> String {
    let mut data = vec![0u8];
    data.extend_from_slice(password.as_bytes());
    data.extend_from_slice(challenge);
    format!("00{}", hex::encode(md5::compute(&data).0))
}

fn interface_print_reply() -> Vec<u8> {
    let mut reply = encode_sentence(["!re", "=name=ether1"]);
    reply.extend(encode_sentence(["!re", "=name=ether2"]));
    reply.extend(encode_sentence(["!done"]));
    reply
}

#[tokio::test]
async fn test_simple_print() {
    let (addr, router) = spawn_router(|mut stream| async move {
        let request = read_request(&mut stream).await;
        assert_eq!(request.tag(), Some("/interface/print"));
        stream.write_all(&interface_print_reply()).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    let records = client.run_command("/interface/print", &[]).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "ether1");
    assert_eq!(records[1]["name"], "ether2");
    router.await.unwrap();
}

#[tokio::test]
async fn test_fragmented_print_single_byte_chunks() {
    let (addr, router) = spawn_router(|mut stream| async move {
        read_request(&mut stream).await;
        for byte in interface_print_reply() {
            stream.write_all(&[byte]).await.unwrap();
            stream.flush().await.unwrap();
        }
    })
    .await;

    let mut client = connected_client(addr).await;
    let records = client.run_command("/interface/print", &[]).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "ether1");
    assert_eq!(records[1]["name"], "ether2");
    router.await.unwrap();
}

#[tokio::test]
async fn test_trap_reply_surfaces_message() {
    let (addr, router) = spawn_router(|mut stream| async move {
        read_request(&mut stream).await;
        let mut reply = encode_sentence(["!trap", "=message=invalid user name or password"]);
        reply.extend(encode_sentence(["!done"]));
        stream.write_all(&reply).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    let err = client
        .run_command("/login", &[("name", "admin"), ("password", "bad")])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid user name or password");
    assert!(err.is_trap());
    router.await.unwrap();
}

#[tokio::test]
async fn test_modern_login_single_round_trip() {
    let (addr, router) = spawn_router(|mut stream| async move {
        let request = read_request(&mut stream).await;
        assert_eq!(request.tag(), Some("/login"));
        assert_eq!(request.attribute("name"), Some("admin"));
        assert_eq!(request.attribute("password"), Some("secret"));
        stream.write_all(&encode_sentence(["!done"])).await.unwrap();
        // no further request may arrive
        let mut buf = [0u8; 1];
        let n = stream.read(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0, "unexpected second login round trip");
    })
    .await;

    let mut client = connected_client(addr).await;
    client.login("admin", "secret").await.unwrap();
    client.close().unwrap();
    router.await.unwrap();
}

#[tokio::test]
async fn test_legacy_login_challenge_response() {
    let challenge_hex = "0123456789abcdef0123456789abcdef";
    let (addr, router) = spawn_router(move |mut stream| async move {
        let first = read_request(&mut stream).await;
        assert_eq!(first.tag(), Some("/login"));
        let ret_word = format!("=ret={challenge_hex}");
        stream
            .write_all(&encode_sentence(["!done", ret_word.as_str()]))
            .await
            .unwrap();

        let second = read_request(&mut stream).await;
        assert_eq!(second.tag(), Some("/login"));
        assert_eq!(second.attribute("name"), Some("admin"));
        assert_eq!(second.attribute("password"), None);
        let challenge = hex::decode(challenge_hex).unwrap();
        assert_eq!(
            second.attribute("response"),
            Some(legacy_response("secret", &challenge).as_str())
        );
        stream.write_all(&encode_sentence(["!done"])).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    client.login("admin", "secret").await.unwrap();
    router.await.unwrap();
}

#[tokio::test]
async fn test_login_with_credentials() {
    let (addr, router) = spawn_router(|mut stream| async move {
        let request = read_request(&mut stream).await;
        assert_eq!(request.attribute("name"), Some("admin"));
        assert_eq!(request.attribute("password"), Some("hunter2"));
        stream.write_all(&encode_sentence(["!done"])).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    let credentials = Credentials::new("admin", "hunter2");
    client.login_with(&credentials).await.unwrap();
    router.await.unwrap();
}

#[tokio::test]
async fn test_connection_closed_mid_command() {
    let (addr, router) = spawn_router(|mut stream| async move {
        read_request(&mut stream).await;
        stream
            .write_all(&encode_sentence(["!re", "=name=ether1"]))
            .await
            .unwrap();
        // drop the socket with the reply unfinished
    })
    .await;

    let mut client = connected_client(addr).await;
    let err = client.run_command("/interface/print", &[]).await.unwrap_err();

    assert_eq!(err.to_string(), "Connection closed");
    router.await.unwrap();
}

#[tokio::test]
async fn test_connection_closed_emits_end_and_close() {
    let (addr, router) = spawn_router(|mut stream| async move {
        read_request(&mut stream).await;
    })
    .await;

    let mut client = connected_client(addr).await;
    let ends = Arc::new(AtomicUsize::new(0));
    let closes = Arc::new(AtomicUsize::new(0));
    {
        let ends = ends.clone();
        client.on(
            Event::End,
            Arc::new(move |_| {
                ends.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let closes = closes.clone();
        client.on(
            Event::Close,
            Arc::new(move |_| {
                closes.fetch_add(1, Ordering::SeqCst);
            }),
        );
    }

    let err = client.run_command("/interface/print", &[]).await.unwrap_err();

    assert_eq!(err.to_string(), "Connection closed");
    assert_eq!(ends.load(Ordering::SeqCst), 1);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    router.await.unwrap();
}

#[tokio::test]
async fn test_get_system_identity() {
    let (addr, router) = spawn_router(|mut stream| async move {
        let request = read_request(&mut stream).await;
        assert_eq!(request.tag(), Some("/system/identity/print"));
        let mut reply = encode_sentence(["!re", "=name=MikroTik"]);
        reply.extend(encode_sentence(["!done"]));
        stream.write_all(&reply).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    let records = client.get_system_identity().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "MikroTik");
    router.await.unwrap();
}

#[tokio::test]
async fn test_query_words_reach_the_router_unchanged() {
    let (addr, router) = spawn_router(|mut stream| async move {
        let request = read_request(&mut stream).await;
        assert_eq!(
            request.words,
            vec!["/interface/print", "?type=ether", "=stats="]
        );
        stream.write_all(&encode_sentence(["!done"])).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    client
        .run_command("/interface/print", &[("?type", "ether"), ("stats", "")])
        .await
        .unwrap();
    router.await.unwrap();
}

#[tokio::test]
async fn test_connect_failure_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut options = ClientOptions::new("127.0.0.1");
    options.port = Some(addr.port());
    let mut client = create_client(options);

    let err = client.connect().await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with(&format!("Failed to connect to 127.0.0.1:{}: ", addr.port())));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_two_commands_on_one_connection() {
    let (addr, router) = spawn_router(|mut stream| async move {
        let first = read_request(&mut stream).await;
        assert_eq!(first.tag(), Some("/login"));
        stream.write_all(&encode_sentence(["!done"])).await.unwrap();

        let second = read_request(&mut stream).await;
        assert_eq!(second.tag(), Some("/interface/print"));
        stream.write_all(&interface_print_reply()).await.unwrap();
    })
    .await;

    let mut client = connected_client(addr).await;
    client.login("admin", "secret").await.unwrap();
    let records = client.run_command("/interface/print", &[]).await.unwrap();
    assert_eq!(records.len(), 2);
    router.await.unwrap();
}
