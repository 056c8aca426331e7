//! End-to-end discovery walk against a scripted UDP stub standing in for a Mailbox
//! Gateway: the "discovery happy path" scenario, where OD-List reports `[0x1000]`, its
//! Object-Description reports `MaxSubindex=0`, and its sole entry's Entry-Description
//! reports `BitLength=32, Data="Device type"`.

use std::net::{IpAddr, Ipv4Addr};

use etg1510::Client;
use tokio::net::UdpSocket;

/// Build a reply frame: 10 placeholder bytes standing in for the EtherCAT/Mailbox/CoE
/// headers (this client never inspects them on a response, only the SDO/SDO-Info
/// opening word and body that follow), then the 4-byte SDO Information Service opening
/// word, then the body.
fn frame(info_header: [u8; 4], body: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 10];
    frame.extend_from_slice(&info_header);
    frame.extend_from_slice(body);
    frame
}

#[tokio::test]
async fn discovery_happy_path() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let server_addr = server.local_addr().unwrap();

    let mut entry_description_body = 32u16.to_le_bytes().to_vec();
    entry_description_body.extend_from_slice(b"Device type");

    let replies = vec![
        // GET_OBJECT_DESCRIPTION_LIST_RSP: ListType=1, ObjectIndex=[0x1000].
        frame([0x02, 0x00, 0x00, 0x00], &[0x01, 0x00, 0x00, 0x10]),
        // GET_OBJECT_DESCRIPTION_RSP for 0x1000: MaxSubindex=0.
        frame([0x04, 0x00, 0x00, 0x00], &[0x00]),
        // GET_ENTRY_DESCRIPTION_RSP for 0x1000:0: BitLength=32, Data="Device type".
        frame([0x06, 0x00, 0x00, 0x00], &entry_description_body),
    ];

    let server_task = tokio::spawn(async move {
        let mut buf = [0u8; 1500];

        for reply in replies {
            let (_len, from) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&reply, from).await.unwrap();
        }
    });

    let mut client = Client::with_port(IpAddr::V4(Ipv4Addr::LOCALHOST), server_addr.port());

    client.discover().await.unwrap();

    server_task.await.unwrap();

    let registry = client.registry();
    let indices: Vec<u16> = registry.indices().collect();

    assert_eq!(indices, vec![0x1000]);

    let container = registry.get(0x1000).unwrap();
    assert_eq!(container.entries.len(), 1);

    let entry = &container.entries[0];
    assert_eq!(entry.name, "Device type");
    assert_eq!(entry.size, 4);
    assert!(entry.enable);
    assert_eq!(entry.value.as_u32(), Some(0));

    let metadata = registry.metadata(0x1000).unwrap();
    assert_eq!(metadata.max_sub_index, 0);

    assert_eq!(client.requests_sent(), 3);
}
