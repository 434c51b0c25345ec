//! End-to-end tests for the redirect handshake and accept loop

use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use usher::config::Config;
use usher::endpoint;
use usher::redirect::{UpstreamTarget, handshake};
use usher::server::Listener;

#[tokio::test]
async fn test_handshake_sends_two_messages_then_closes() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let target = UpstreamTarget::new(endpoint::parse("chat.example.org").unwrap());

    handshake::run(&mut server, &target).await.unwrap();

    // The stream was shut down, so the client side reads to EOF.
    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();

    assert_eq!(
        out,
        "010 * chat.example.org +6697 :Please connect to server chat.example.org:+6697\r\n\
         ERROR :Please connect to server chat.example.org:+6697\r\n"
    );
}

#[tokio::test]
async fn test_handshake_insecure_target_has_no_marker() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let target = UpstreamTarget::new(endpoint::parse("irc+insecure://example.com:6667").unwrap());

    handshake::run(&mut server, &target).await.unwrap();

    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();

    assert_eq!(
        out,
        "010 * example.com 6667 :Please connect to server example.com:6667\r\n\
         ERROR :Please connect to server example.com:6667\r\n"
    );
}

async fn connect_and_read(addr: SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_listener_redirects_round_robin() {
    let cfg = Config::from_yaml(
        "listen: \"127.0.0.1:0\"\n\
         upstreams:\n\
           - \"chat.example.org\"\n\
           - \"irc://chat2.example.org\"\n",
    )
    .unwrap();

    let listener = Listener::bind(&cfg).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run());

    // Dispatch order follows accept order, so sequential connections see
    // the targets rotate and wrap.
    let first = connect_and_read(addr).await;
    assert_eq!(
        first,
        "010 * chat.example.org +6697 :Please connect to server chat.example.org:+6697\r\n\
         ERROR :Please connect to server chat.example.org:+6697\r\n"
    );

    let second = connect_and_read(addr).await;
    assert!(second.starts_with("010 * chat2.example.org +6697 "));

    let third = connect_and_read(addr).await;
    assert!(third.starts_with("010 * chat.example.org +6697 "));
}

#[tokio::test]
async fn test_bind_fails_without_upstreams() {
    let cfg = Config::from_yaml("listen: \"127.0.0.1:0\"\n").unwrap();

    let err = Listener::bind(&cfg).await.unwrap_err();
    assert!(err.to_string().contains("at least one upstream"));
}

#[tokio::test]
async fn test_bind_fails_on_bad_upstream_spec() {
    let cfg = Config::from_yaml(
        "listen: \"127.0.0.1:0\"\n\
         upstreams:\n\
           - \"https://example.com\"\n",
    )
    .unwrap();

    let err = Listener::bind(&cfg).await.unwrap_err();
    assert!(err.to_string().contains("failed parsing upstream"));
}

#[tokio::test]
async fn test_bind_fails_for_secure_listen_without_tls_material() {
    let cfg = Config::from_yaml(
        "listen: \"127.0.0.1:+0\"\n\
         upstreams:\n\
           - \"chat.example.org\"\n",
    )
    .unwrap();

    let err = Listener::bind(&cfg).await.unwrap_err();
    assert!(err.to_string().contains("no certificate is configured"));
}
