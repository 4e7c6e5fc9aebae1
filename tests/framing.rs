//! End-to-end framing behavior over a real duplex stream, independent of
//! the session/message layers above it.

mod support;

use netconf_mamont::framing::{FramingError, FramingVersion, StreamReader};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn eom_round_trip_over_duplex_stream() {
    support::init_tracing();
    let (mut client, server) = support::new_pair();
    let mut reader = StreamReader::new(server);

    support::write_framed(&mut client, FramingVersion::V10, b"<hello/>").await;
    let received = reader.receive(FramingVersion::V10).await.unwrap();
    assert_eq!(received, b"<hello/>");
}

#[tokio::test]
async fn chunked_round_trip_over_duplex_stream() {
    support::init_tracing();
    let (mut client, server) = support::new_pair();
    let mut reader = StreamReader::new(server);

    let payload = b"<rpc-reply message-id=\"1\"><ok/></rpc-reply>";
    support::write_framed(&mut client, FramingVersion::V11, payload).await;
    let received = reader.receive(FramingVersion::V11).await.unwrap();
    assert_eq!(received, payload);
}

#[tokio::test]
async fn two_messages_back_to_back_are_both_recovered() {
    support::init_tracing();
    let (mut client, server) = support::new_pair();
    let mut reader = StreamReader::new(server);

    support::write_framed(&mut client, FramingVersion::V11, b"first").await;
    support::write_framed(&mut client, FramingVersion::V11, b"second").await;

    assert_eq!(reader.receive(FramingVersion::V11).await.unwrap(), b"first");
    assert_eq!(reader.receive(FramingVersion::V11).await.unwrap(), b"second");
}

#[tokio::test]
async fn closing_the_writer_mid_message_is_an_unexpected_eof() {
    support::init_tracing();
    let (client, server) = support::new_pair();
    let mut reader = StreamReader::new(server);

    let mut client = client;
    client.write_all(b"<partial").await.unwrap();
    client.shutdown().await.unwrap();

    assert!(matches!(
        reader.receive(FramingVersion::V10).await,
        Err(FramingError::UnexpectedEof)
    ));
}
