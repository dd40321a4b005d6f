/*!
Outbound HTTP/1.1 responses. Every response this host sends carries `SERVER` and `EXT`, per
§4.E, regardless of route.
*/
use std::io::{Result as IoResult, Write};
use std::net::TcpStream;

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub server: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(content_type: &'static str, server: &str, body: Vec<u8>) -> Self {
        Response {
            status: 200,
            reason: "OK",
            content_type,
            server: server.to_string(),
            body,
        }
    }

    pub fn not_found(server: &str) -> Self {
        Response {
            status: 404,
            reason: "Not Found",
            content_type: "text/plain",
            server: server.to_string(),
            body: b"Not Found".to_vec(),
        }
    }

    pub fn bad_request(server: &str) -> Self {
        Response {
            status: 400,
            reason: "Bad Request",
            content_type: "text/plain",
            server: server.to_string(),
            body: b"Bad Request".to_vec(),
        }
    }

    pub fn server_error(status: u16, server: &str, content_type: &'static str, body: Vec<u8>) -> Self {
        let reason = match status {
            500 => "Internal Server Error",
            _ => "Error",
        };
        Response {
            status,
            reason,
            content_type,
            server: server.to_string(),
            body,
        }
    }

    pub fn write_to(&self, stream: &mut TcpStream) -> IoResult<()> {
        write!(stream, "HTTP/1.1 {} {}\r\n", self.status, self.reason)?;
        write!(stream, "SERVER: {}\r\n", self.server)?;
        write!(stream, "EXT:\r\n")?;
        write!(stream, "CONTENT-TYPE: {}\r\n", self.content_type)?;
        write!(stream, "CONTENT-LENGTH: {}\r\n", self.body.len())?;
        write!(stream, "CONNECTION: close\r\n")?;
        write!(stream, "\r\n")?;
        stream.write_all(&self.body)?;
        stream.flush()
    }
}
