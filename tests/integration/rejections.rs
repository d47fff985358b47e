use crate::*;
use asp_core::wire::AspHeader;
use zerocopy::AsBytes;

// ══════════════════════════════════════════════════════════════════════════════
//  Framing and header rejections — always plaintext
// ══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_short_packet_rejected() {
    let server = TestServer::start().await.unwrap();

    let raw = server.send_raw(b"hello").await.unwrap();
    assert_eq!(raw, b"ASPERR: Invalid packet size.");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_oversize_packet_rejected() {
    let server = TestServer::start().await.unwrap();

    let mut packet = encode_request(2, Key::new(3).unwrap(), Method::Vers, "").unwrap();
    packet.resize(33, b'A');
    let raw = server.send_raw(&packet).await.unwrap();
    assert_eq!(raw, b"ASPERR: Invalid packet size.");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_version_1_rejected() {
    let server = TestServer::start().await.unwrap();

    let packet = encode_request(1, Key::new(3).unwrap(), Method::Vers, "").unwrap();
    let raw = server.send_raw(&packet).await.unwrap();
    assert_eq!(raw, b"ASPERR: Unsupported version '1'.");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_key_rejected() {
    let server = TestServer::start().await.unwrap();

    let raw = server
        .send_raw(AspHeader::new(3, 0, *b"VERS").as_bytes())
        .await
        .unwrap();
    assert_eq!(raw, b"ASPERR: Invalid key '0'.");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unknown_method_rejected() {
    let server = TestServer::start().await.unwrap();

    // "QJOH" with key 1 decrypts to "PING".
    let raw = server
        .send_raw(AspHeader::new(2, 1, *b"QJOH").as_bytes())
        .await
        .unwrap();
    assert_eq!(raw, b"ASPERR: Unsupported method 'PING'");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_survives_garbage() {
    let server = TestServer::start().await.unwrap();

    for junk in [&b""[..], &[0xff; 12][..], &[0u8; 32][..]] {
        let raw = server.send_raw(junk).await.unwrap();
        assert!(raw.starts_with(b"ASPERR:"), "got {raw:?}");
    }

    let text = server.request(2, 3, Method::Vers, "").await.unwrap();
    assert_eq!(text, "Server supports ASP versions 2, 3.");

    server.stop().await.unwrap();
}
