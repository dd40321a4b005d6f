//! Wire-format check for the device-side unicast search reply: `ssdp::search::respond` sends
//! a raw UDP datagram, so this binds a throwaway loopback socket to stand in for the control
//! point that originated the `M-SEARCH` and asserts the reply parses back into the expected
//! `ST`/`USN`/`LOCATION` headers.

use std::collections::HashMap;
use std::net::UdpSocket;
use upnp::ssdp::search::respond;
use upnp::SpecVersion;

fn parse_headers(message: &str) -> (String, HashMap<String, String>) {
    let mut lines = message.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
        }
    }
    (status_line, headers)
}

#[test]
fn a_search_reply_carries_the_requested_search_target_and_location() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(std::time::Duration::from_secs(2)))
        .unwrap();
    let peer = receiver.local_addr().unwrap();

    respond(
        peer,
        "upnp:rootdevice",
        "uuid:abc-123::upnp:rootdevice",
        "http://192.168.1.5:8080/description",
        1800,
        SpecVersion::V10,
        &None,
    )
    .unwrap();

    let mut buf = [0u8; 2048];
    let (received, _) = receiver.recv_from(&mut buf).unwrap();
    let message = std::str::from_utf8(&buf[..received]).unwrap();
    let (status_line, headers) = parse_headers(message);

    assert!(status_line.starts_with("HTTP/1.1 200"));
    assert_eq!(headers.get("ST").unwrap(), "upnp:rootdevice");
    assert_eq!(headers.get("USN").unwrap(), "uuid:abc-123::upnp:rootdevice");
    assert_eq!(
        headers.get("LOCATION").unwrap(),
        "http://192.168.1.5:8080/description"
    );
    assert_eq!(headers.get("CACHE-CONTROL").unwrap(), "max-age=1800");
    assert_eq!(headers.get("NTS").unwrap(), "ssdp:alive");
    assert_eq!(headers.get("CONTENT-LENGTH").unwrap(), "0");
}
