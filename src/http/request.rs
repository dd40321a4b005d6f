/*!
A hand-rolled HTTP/1.1 request parser, reading directly off a `TcpStream` the same way
[`crate::httpu`] reads a datagram: a request line, case-insensitive header lines, then an
optional body sized by `Content-Length`.
*/
use crate::error;
use crate::Error;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::net::TcpStream;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_ascii_uppercase())
    }

    pub fn body_as_str(&self) -> Result<&str, Error> {
        std::str::from_utf8(&self.body).map_err(|e| Error::MessageFormat(e.into()))
    }
}

pub fn read(stream: &TcpStream) -> Result<Request, Error> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .map_err(Error::NetworkTransport)?;
    let (method, path) = parse_request_line(request_line.trim_end())?;

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).map_err(Error::NetworkTransport)?;
        let line = line.trim_end_matches(['\r', '\n'].as_ref());
        if line.is_empty() {
            break;
        }
        match line.splitn(2, ':').collect::<Vec<&str>>()[..] {
            [name, value] => {
                headers.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
            }
            _ => return Err(Error::MessageFormat(error::invalid_socket_value("header-line", line))),
        }
    }

    let content_length = headers
        .get("CONTENT-LENGTH")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).map_err(Error::NetworkTransport)?;
    }

    Ok(Request {
        method,
        path,
        headers,
        body,
    })
}

fn parse_request_line(line: &str) -> Result<(Method, String), Error> {
    match line.split(' ').collect::<Vec<&str>>()[..] {
        [method, path, _version] => Ok((parse_method(method), path.to_string())),
        _ => Err(Error::MessageFormat(error::invalid_socket_value(
            "request-line",
            line,
        ))),
    }
}

fn parse_method(s: &str) -> Method {
    match s {
        "GET" => Method::Get,
        "POST" => Method::Post,
        other => Method::Other(other.to_string()),
    }
}
