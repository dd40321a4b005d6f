/*!
The HTTP host thread: one `TcpListener`, accepting connections and handing each off to a
short-lived worker thread, matching the "accept thread that may itself spawn per-connection
workers" shape from the concurrency model.
*/
use crate::http::request::{self, Method};
use crate::http::response::Response;
use crate::model::device::DeviceRef;
use crate::model::service::ServiceRef;
use crate::soap::{self, DispatchOutcome};
use crate::{description, Error};
use std::net::{SocketAddrV4, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A running HTTP host. Dropping this does not stop the thread; call [`Host::stop`].
#[derive(Debug)]
pub struct Host {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    pub local_address: SocketAddrV4,
    pub device: DeviceRef,
}

impl Host {
    /// Bind to `bind_address` (port 0 requests an ephemeral port) and begin serving `device`
    /// and its sub-tree on a dedicated accept thread.
    pub fn start(bind_address: SocketAddrV4, device: DeviceRef, server_info: String) -> Result<Self, Error> {
        let listener = TcpListener::bind(bind_address).map_err(Error::NetworkTransport)?;
        listener.set_nonblocking(true).map_err(Error::NetworkTransport)?;
        let local_address = match listener.local_addr().map_err(Error::NetworkTransport)? {
            std::net::SocketAddr::V4(addr) => addr,
            std::net::SocketAddr::V6(_) => bind_address,
        };

        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop_flag = Arc::clone(&stop_flag);
        let thread_device = Arc::clone(&device);

        let handle = thread::Builder::new()
            .name("http-host".to_string())
            .spawn(move || {
                while !thread_stop_flag.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, peer)) => {
                            debug!("http-host - accepted connection from {}", peer);
                            if let Err(e) = serve_one(stream, &thread_device, &server_info, local_address) {
                                warn!("http-host - error serving {}: {}", peer, e);
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(std::time::Duration::from_millis(50));
                        }
                        Err(e) => {
                            error!("http-host - accept error: {:?}", e);
                            break;
                        }
                    }
                }
                debug!("http-host - thread exiting");
            })
            .expect("failed to spawn http-host thread");

        Ok(Host {
            stop_flag,
            handle: Some(handle),
            local_address,
            device,
        })
    }

    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve_one(
    mut stream: TcpStream,
    device: &DeviceRef,
    server_info: &str,
    local_address: SocketAddrV4,
) -> Result<(), Error> {
    let request = match request::read(&stream) {
        Ok(request) => request,
        Err(_) => {
            Response::bad_request(server_info).write_to(&mut stream).map_err(Error::NetworkTransport)?;
            return Ok(());
        }
    };

    let response = route(&request.method, &request.path, &request.body, device, server_info, local_address);
    response.write_to(&mut stream).map_err(Error::NetworkTransport)
}

fn route(
    method: &Method,
    path: &str,
    body: &[u8],
    device: &DeviceRef,
    server_info: &str,
    local_address: SocketAddrV4,
) -> Response {
    match (method, path) {
        (Method::Get, "/") => Response::ok("text/html", server_info, render_index(device).into_bytes()),
        (Method::Get, "/description") => match render_description(device, local_address) {
            Ok(body) => Response::ok("text/xml", server_info, body.into_bytes()),
            Err(_) => Response::server_error(500, server_info, "text/plain", b"description error".to_vec()),
        },
        (Method::Post, path) if path.ends_with("/control") => {
            let service_path = &path[..path.len() - "/control".len()];
            match find_service(device, service_path) {
                Some(service) => dispatch_soap(&service, body, server_info),
                None => Response::not_found(server_info),
            }
        }
        (Method::Get, path) => match find_service(device, path) {
            Some(service) => match description::scpd::to_string(&service.read().unwrap().spec.to_scpd()) {
                Ok(xml) => Response::ok("text/xml", server_info, xml.into_bytes()),
                Err(_) => Response::server_error(500, server_info, "text/plain", b"scpd error".to_vec()),
            },
            None => Response::not_found(server_info),
        },
        _ => Response::not_found(server_info),
    }
}

fn dispatch_soap(service: &ServiceRef, body: &[u8], server_info: &str) -> Response {
    let body_xml = match std::str::from_utf8(body) {
        Ok(s) => s,
        Err(_) => return Response::bad_request(server_info),
    };
    match soap::dispatch(service, body_xml) {
        DispatchOutcome::Success(xml) => Response::ok("text/xml", server_info, xml.into_bytes()),
        DispatchOutcome::Fault { http_status, body } => {
            Response::server_error(http_status, server_info, "text/xml", body.into_bytes())
        }
    }
}

fn render_description(device: &DeviceRef, local_address: SocketAddrV4) -> Result<String, Error> {
    let url_base = format!("http://{}/", local_address);
    description::device::to_string(&device.read().unwrap().to_description_root(&url_base))
}

fn render_index(device: &DeviceRef) -> String {
    let mut out = String::from("<html><head><title>UPnP Device</title></head><body>");
    render_index_node(device, &mut out);
    out.push_str("</body></html>");
    out
}

fn render_index_node(device: &DeviceRef, out: &mut String) {
    let device = device.read().unwrap();
    out.push_str(&format!("<h2>{}</h2><ul>", escape(&device.friendly_name)));
    for service in &device.sub_services {
        out.push_str(&format!(
            "<li>Service: {}</li>",
            escape(&service.read().unwrap().service_type)
        ));
    }
    out.push_str("</ul>");
    for child in &device.sub_devices {
        render_index_node(child, out);
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn find_service(device: &DeviceRef, path: &str) -> Option<ServiceRef> {
    let borrowed = device.read().unwrap();
    for service in &borrowed.sub_services {
        if service
            .read()
            .unwrap()
            .path()
            .map(|p| p == path)
            .unwrap_or(false)
        {
            return Some(Arc::clone(service));
        }
    }
    for child in &borrowed.sub_devices {
        if let Some(found) = find_service(child, path) {
            return Some(found);
        }
    }
    None
}
