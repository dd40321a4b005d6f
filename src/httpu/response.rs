use crate::error;
use crate::httpu::protocol;
use crate::Error;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::net::SocketAddrV4;
use std::str::from_utf8;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ResponseStatus {
    pub protocol: String,
    pub version: String,
    pub code: u16,
    pub reason: String,
}

/// A parsed HTTPU/HTTPMU datagram. `peer_address` is filled in by the caller once the
/// originating socket address is known; the wire bytes themselves carry no source address.
#[derive(Clone, Debug)]
pub struct Response {
    pub peer_address: Option<SocketAddrV4>,
    pub status: ResponseStatus,
    pub headers: HashMap<String, String>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Response {
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn with_peer(mut self, peer: SocketAddrV4) -> Self {
        self.peer_address = Some(peer);
        self
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let message = from_utf8(bytes).map_err(|e| Error::MessageFormat(e.into()))?;
        let mut lines = message.split(protocol::LINE_SEP);

        let status_line = lines.next().unwrap_or("");
        let status = parse_status_line(status_line)?;

        let mut headers = HashMap::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match line.splitn(2, protocol::HEADER_SEP).collect::<Vec<&str>>()[..] {
                [name, value] => {
                    headers.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
                }
                _ => {
                    return Err(Error::MessageFormat(error::invalid_socket_value(
                        "header-line",
                        line,
                    )));
                }
            }
        }

        Ok(Response {
            peer_address: None,
            status,
            headers,
        })
    }
}

fn parse_status_line(line: &str) -> Result<ResponseStatus, Error> {
    // "HTTP/1.1 200 OK" style, but SSDP search responses begin the same way.
    let parts: Vec<&str> = line.splitn(3, ' ').collect();
    if parts.len() < 2 {
        return Err(Error::MessageFormat(error::invalid_socket_value(
            "status-line",
            line,
        )));
    }
    let proto_version: Vec<&str> = parts[0].splitn(2, '/').collect();
    let (protocol, version) = match proto_version[..] {
        [p, v] => (p.to_string(), v.to_string()),
        _ => (parts[0].to_string(), String::new()),
    };
    let code = parts[1]
        .parse::<u16>()
        .map_err(|_| Error::MessageFormat(error::invalid_socket_value("status-code", parts[1])))?;
    let reason = parts.get(2).unwrap_or(&"").to_string();
    Ok(ResponseStatus {
        protocol,
        version,
        code,
        reason,
    })
}
