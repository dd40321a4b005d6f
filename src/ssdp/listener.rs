/*!
Background thread that receives `M-SEARCH` and `NOTIFY` datagrams off the SSDP multicast
group and hands them to the runtime for dispatch, per the concurrency model's "one thread
per responsibility" rule.

Unlike [`crate::ssdp::search`]'s unicast-response parsing (an HTTP status line), datagrams
arriving here are HTTP *requests* (`NOTIFY * HTTP/1.1`, `M-SEARCH * HTTP/1.1`) multicast by
other participants, so this module parses the request-line form directly rather than reusing
[`crate::httpu::Response`].
*/
use crate::httpu::{create_multicast_socket, Options as MulticastOptions};
use crate::ssdp::protocol;
use crate::Error;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::from_utf8;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const BUFFER_SIZE: usize = 1500;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// The two request methods multicast on the SSDP group; any other first line is dropped as
/// unparseable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatagramKind {
    SearchRequest,
    Notify,
}

#[derive(Clone, Debug)]
pub struct Datagram {
    pub kind: DatagramKind,
    pub headers: HashMap<String, String>,
}

impl Datagram {
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }
}

/// A datagram received off the multicast group, tagged with the peer that sent it.
#[derive(Clone, Debug)]
pub struct Incoming {
    pub peer: SocketAddr,
    pub datagram: Datagram,
}

/// A running listener thread. Dropping this does not stop the thread; call [`Listener::stop`]
/// explicitly so the background thread has a chance to unwind cleanly.
#[derive(Debug)]
pub struct Listener {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    receiver: Receiver<Incoming>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Listener {
    /// Bind to the SSDP multicast group on `network_interface` (or the default route if
    /// `None`) and begin receiving datagrams on a dedicated thread.
    pub fn start(network_interface: Option<String>) -> Result<Self, Error> {
        let multicast_options = MulticastOptions {
            network_interface,
            local_port: protocol::MULTICAST_ADDRESS
                .parse::<std::net::SocketAddrV4>()
                .unwrap()
                .port(),
            timeout: 1,
            local_network_only: false,
            loop_back_also: false,
        };
        let socket = create_multicast_socket(
            &protocol::MULTICAST_ADDRESS.parse().unwrap(),
            &multicast_options,
        )?;

        let (sender, receiver) = channel();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop_flag = Arc::clone(&stop_flag);

        let handle = thread::Builder::new()
            .name("ssdp-listener".to_string())
            .spawn(move || {
                let mut buf = [0u8; BUFFER_SIZE];
                while !thread_stop_flag.load(Ordering::SeqCst) {
                    match socket.recv_from(&mut buf) {
                        Ok((received, peer)) => match parse_datagram(&buf[..received]) {
                            Some(datagram) => {
                                if sender.send(Incoming { peer, datagram }).is_err() {
                                    break;
                                }
                            }
                            None => trace!("ssdp-listener - ignored non-SSDP datagram from {}", peer),
                        },
                        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                        Err(e) => {
                            error!("ssdp-listener - socket error: {:?}", e);
                            break;
                        }
                    }
                }
                debug!("ssdp-listener - thread exiting");
            })
            .expect("failed to spawn ssdp-listener thread");

        Ok(Listener {
            stop_flag,
            handle: Some(handle),
            receiver,
        })
    }

    /// Non-blocking drain of whatever datagrams have arrived since the last call.
    pub fn try_recv_all(&self) -> Vec<Incoming> {
        let mut out = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(incoming) => out.push(incoming),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Signal the background thread to stop and wait for it to exit.
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Sleep helper used by the runtime's periodic-notify loop so it lives alongside the
/// listener it runs next to.
pub fn sleep_between_notifies(interval: Duration) {
    thread::sleep(interval);
}

fn parse_datagram(bytes: &[u8]) -> Option<Datagram> {
    let message = from_utf8(bytes).ok()?;
    let mut lines = message.split("\r\n");
    let request_line = lines.next()?;
    let method = request_line.split(' ').next()?;
    let kind = match method {
        m if m == protocol::METHOD_SEARCH => DatagramKind::SearchRequest,
        m if m == protocol::METHOD_NOTIFY => DatagramKind::Notify,
        _ => return None,
    };

    let mut headers = HashMap::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match line.splitn(2, ':').collect::<Vec<&str>>()[..] {
            [name, value] => {
                headers.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
            }
            _ => continue,
        }
    }
    Some(Datagram { kind, headers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notify_message(nts: &str) -> String {
        format!(
            "NOTIFY * HTTP/1.1\r\n\
             HOST: 239.255.255.250:1900\r\n\
             CACHE-CONTROL: max-age=1800\r\n\
             LOCATION: http://192.168.1.5:8080/description\r\n\
             NT: urn:schemas-upnp-org:device:BinaryLight:1\r\n\
             NTS: {}\r\n\
             SERVER: Linux/1.0 UPnP/1.0 upnp-host/0.1\r\n\
             USN: uuid:abc-123::urn:schemas-upnp-org:device:BinaryLight:1\r\n\
             BOOTID.UPNP.ORG: 1\r\n\
             \r\n",
            nts
        )
    }

    #[test]
    fn notify_alive_parses_as_a_notify_datagram_with_its_headers() {
        let datagram = parse_datagram(notify_message(protocol::NTS_ALIVE).as_bytes()).unwrap();
        assert_eq!(datagram.kind, DatagramKind::Notify);
        assert_eq!(datagram.header("NTS").unwrap(), protocol::NTS_ALIVE);
        assert_eq!(
            datagram.header("NT").unwrap(),
            "urn:schemas-upnp-org:device:BinaryLight:1"
        );
        assert_eq!(
            datagram.header("USN").unwrap(),
            "uuid:abc-123::urn:schemas-upnp-org:device:BinaryLight:1"
        );
    }

    #[test]
    fn notify_byebye_parses_with_its_nts_header_intact() {
        let datagram = parse_datagram(notify_message(protocol::NTS_BYE).as_bytes()).unwrap();
        assert_eq!(datagram.kind, DatagramKind::Notify);
        assert_eq!(datagram.header("NTS").unwrap(), protocol::NTS_BYE);
    }

    #[test]
    fn a_search_request_datagram_is_tagged_as_a_search_request() {
        let message = "M-SEARCH * HTTP/1.1\r\n\
             HOST: 239.255.255.250:1900\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: 2\r\n\
             ST: ssdp:all\r\n\
             \r\n";
        let datagram = parse_datagram(message.as_bytes()).unwrap();
        assert_eq!(datagram.kind, DatagramKind::SearchRequest);
        assert_eq!(datagram.header("ST").unwrap(), "ssdp:all");
    }

    #[test]
    fn a_non_ssdp_datagram_is_ignored() {
        assert!(parse_datagram(b"GET / HTTP/1.1\r\n\r\n").is_none());
    }
}
