//! End-to-end check of the HTTP host: binds a real `TcpListener` on loopback, fetches the
//! rendered description document, then posts a SOAP action to the control URL and reads back
//! the dispatched response, the same round trip a control point performs.

use std::io::{Read, Write};
use std::net::{SocketAddrV4, TcpStream};
use upnp::http::Host;
use upnp::model::device::Device;
use upnp::model::service::{Direction, ParameterSpec, ServiceSpec};
use upnp::soap::envelope;

fn start_host() -> (Host, String) {
    let device = Device::new_root("BinaryLight", "HTTP Test Light");
    {
        let mut d = device.write().unwrap();
        d.manufacturer = "M".to_string();
        d.model_name = "X".to_string();
    }
    let spec = ServiceSpec::new().action(
        "GetStatus",
        vec![ParameterSpec {
            direction: Direction::RetVal,
            name: "ResultStatus".to_string(),
            related_state_variable: "Status".to_string(),
        }],
        Box::new(|_args| Ok(vec!["1".to_string()])),
    );
    let service = Device::add_service(&device, "SwitchPower", spec);
    let control_url = service.read().unwrap().control_url().unwrap();

    let bind = "127.0.0.1:0".parse::<SocketAddrV4>().unwrap();
    let host = Host::start(bind, device, "test-server/1.0".to_string()).unwrap();
    (host, control_url)
}

fn http_round_trip(address: SocketAddrV4, request: &str) -> (String, Vec<u8>) {
    let mut stream = TcpStream::connect(address).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    let text = String::from_utf8_lossy(&response).to_string();
    let split = text.find("\r\n\r\n").unwrap() + 4;
    (text[..split].to_string(), response[split..].to_vec())
}

#[test]
fn description_is_served_over_http() {
    let (host, _) = start_host();
    let address = host.local_address;

    let request = format!(
        "GET /description HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        address
    );
    let (head, body) = http_round_trip(address, &request);
    let body = String::from_utf8(body).unwrap();

    assert!(head.starts_with("HTTP/1.1 200"));
    assert!(body.contains("<friendlyName>HTTP Test Light</friendlyName>"));
    host.stop();
}

#[test]
fn a_soap_action_posted_to_the_control_url_is_dispatched_and_answered() {
    let (host, control_url) = start_host();
    let address = host.local_address;

    let soap_body = envelope::build_request(
        "urn:schemas-upnp-org:service:SwitchPower:1",
        "GetStatus",
        &[],
    );
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n{body}",
        path = control_url,
        addr = address,
        len = soap_body.len(),
        body = soap_body,
    );
    let (head, body) = http_round_trip(address, &request);
    let body = String::from_utf8(body).unwrap();

    assert!(head.starts_with("HTTP/1.1 200"));
    assert!(body.contains("GetStatusResponse"));
    assert!(body.contains("ResultStatus"));
    host.stop();
}

#[test]
fn an_unknown_path_is_answered_with_not_found() {
    let (host, _) = start_host();
    let address = host.local_address;

    let request = format!(
        "GET /nope HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        address
    );
    let (head, _) = http_round_trip(address, &request);
    assert!(head.starts_with("HTTP/1.1 404"));
    host.stop();
}
