/*!
Wires the HTTP host and the SSDP discovery engine to a device tree, implementing § 3's
lifecycle: construct the tree, call [`run`], serve until a shutdown signal, then advertise
`ssdp:byebye` and stop.
*/
use crate::http;
use crate::model::device::DeviceRef;
use crate::ssdp::listener::{DatagramKind, Listener};
use crate::ssdp::protocol as ssdp_protocol;
use crate::ssdp::{notify, search, ProductVersion};
use crate::utils::{interface, user_agent};
use crate::Error;
use crate::SpecVersion;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Options {
    pub network_interface: Option<String>,
    /// `0` requests an ephemeral port, per § 4.E.
    pub http_port: u16,
    pub spec_version: SpecVersion,
    pub product_and_version: Option<ProductVersion>,
    /// Seconds advertised in `CACHE-CONTROL: max-age=`; also controls how long a control
    /// point should consider the advertisement valid.
    pub max_age: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            network_interface: None,
            http_port: 0,
            spec_version: SpecVersion::V10,
            product_and_version: None,
            max_age: 1800,
        }
    }
}

/// A running device: the HTTP host and the background thread driving SSDP notify/search-reply.
/// Dropping this does not perform a clean shutdown; call [`Running::shutdown`] so `ssdp:byebye`
/// is sent before the sockets close.
#[derive(Debug)]
pub struct Running {
    http: http::Host,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    advertisements: Vec<notify::Advertisement>,
    notify_options: notify::Options,
    pub location: String,
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Validate `device`, bind the HTTP host, advertise `ssdp:alive`, and start the background
/// thread that re-advertises every [`notify::NOTIFY_INTERVAL`] and answers inbound `M-SEARCH`.
pub fn run(device: DeviceRef, options: Options) -> Result<Running, Error> {
    device.read().unwrap().validate()?;

    let bind_ip = resolve_ip(&options.network_interface);
    let server_info = user_agent::make(&options.spec_version, &options.product_and_version);
    let host = http::Host::start(
        SocketAddrV4::new(bind_ip, options.http_port),
        Arc::clone(&device),
        server_info,
    )?;
    let location = format!("http://{}/description", host.local_address);

    notify::bump_boot_id();
    let advertisements = build_advertisements(&device, &location);
    let notify_options = notify::Options {
        spec_version: options.spec_version,
        network_interface: options.network_interface.clone(),
        max_age: options.max_age,
        product_and_version: options.product_and_version.clone(),
    };
    for advertisement in &advertisements {
        notify::notify_alive(advertisement, &notify_options)?;
    }

    let listener = Listener::start(options.network_interface.clone())?;
    let stop_flag = Arc::new(AtomicBool::new(false));
    let thread_stop_flag = Arc::clone(&stop_flag);
    let thread_advertisements = advertisements.clone();
    let thread_notify_options = notify_options.clone();
    let thread_spec_version = options.spec_version;
    let thread_product = options.product_and_version.clone();

    let handle = thread::Builder::new()
        .name("ssdp-notify".to_string())
        .spawn(move || {
            let poll_interval = Duration::from_millis(200);
            let mut elapsed = Duration::from_secs(0);
            while !thread_stop_flag.load(Ordering::SeqCst) {
                for incoming in listener.try_recv_all() {
                    if incoming.datagram.kind == DatagramKind::SearchRequest {
                        spawn_search_reply(
                            incoming.peer,
                            incoming.datagram.header(ssdp_protocol::HEAD_ST).cloned(),
                            thread_advertisements.clone(),
                            thread_spec_version,
                            thread_product.clone(),
                            thread_notify_options.max_age,
                        );
                    }
                }
                thread::sleep(poll_interval);
                elapsed += poll_interval;
                if elapsed >= notify::NOTIFY_INTERVAL {
                    elapsed = Duration::from_secs(0);
                    for advertisement in &thread_advertisements {
                        if let Err(e) = notify::notify_alive(advertisement, &thread_notify_options) {
                            warn!("ssdp-notify - failed to re-announce: {}", e);
                        }
                    }
                }
            }
            listener.stop();
            debug!("ssdp-notify - thread exiting");
        })
        .expect("failed to spawn ssdp-notify thread");

    Ok(Running {
        http: host,
        stop_flag,
        handle: Some(handle),
        advertisements,
        notify_options,
        location,
    })
}

impl Running {
    pub fn local_address(&self) -> SocketAddrV4 {
        self.http.local_address
    }

    /// Graceful shutdown per § 5's ordering: stop the advertise/search thread, emit
    /// `ssdp:byebye` for every advertisement (byebye order mirrors alive order), then stop
    /// the HTTP host.
    pub fn shutdown(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        for advertisement in &self.advertisements {
            if let Err(e) = notify::notify_byebye(advertisement, &self.notify_options) {
                warn!("runtime::shutdown - failed to send byebye: {}", e);
            }
        }
        self.http.stop();
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn resolve_ip(network_interface: &Option<String>) -> Ipv4Addr {
    match interface::ip_address_for_interface(network_interface, &None) {
        Some(std::net::IpAddr::V4(ip)) => ip,
        _ => Ipv4Addr::new(0, 0, 0, 0),
    }
}

/// Build the NOTIFY sequence for the whole device tree, in the order § 5 specifies:
/// `upnp:rootdevice` first, then each device's UUID and type NTs, then each service's type NT.
fn build_advertisements(device: &DeviceRef, location: &str) -> Vec<notify::Advertisement> {
    let mut advertisements = Vec::new();

    let root_udn = device.read().unwrap().udn.clone();
    advertisements.push(notify::Advertisement {
        notification_type: "upnp:rootdevice".to_string(),
        unique_service_name: format!("{}::upnp:rootdevice", root_udn),
        location: location.to_string(),
    });

    let devices = collect_devices(device);
    for d in &devices {
        let d = d.read().unwrap();
        advertisements.push(notify::Advertisement {
            notification_type: d.udn.clone(),
            unique_service_name: d.udn.clone(),
            location: location.to_string(),
        });
        advertisements.push(notify::Advertisement {
            notification_type: d.type_urn().to_string(),
            unique_service_name: format!("{}::{}", d.udn, d.type_urn()),
            location: location.to_string(),
        });
    }

    for d in &devices {
        let d = d.read().unwrap();
        for service in &d.sub_services {
            let service = service.read().unwrap();
            advertisements.push(notify::Advertisement {
                notification_type: service.type_urn().to_string(),
                unique_service_name: format!("{}::{}", d.udn, service.type_urn()),
                location: location.to_string(),
            });
        }
    }

    advertisements
}

fn collect_devices(device: &DeviceRef) -> Vec<DeviceRef> {
    let mut out = vec![Arc::clone(device)];
    for child in &device.read().unwrap().sub_devices {
        out.extend(collect_devices(child));
    }
    out
}

fn spawn_search_reply(
    peer: std::net::SocketAddr,
    search_target: Option<String>,
    advertisements: Vec<notify::Advertisement>,
    spec_version: SpecVersion,
    product_and_version: Option<ProductVersion>,
    max_age: u32,
) {
    thread::spawn(move || {
        let target = match search_target {
            Some(target) => target,
            None => return,
        };
        for advertisement in matching_advertisements(&advertisements, &target) {
            if let Err(e) = search::respond(
                peer,
                &advertisement.notification_type,
                &advertisement.unique_service_name,
                &advertisement.location,
                max_age,
                spec_version,
                &product_and_version,
            ) {
                warn!("ssdp-responder - failed to reply to {}: {}", peer, e);
            }
        }
    });
}

fn matching_advertisements<'a>(
    advertisements: &'a [notify::Advertisement],
    search_target: &str,
) -> Vec<&'a notify::Advertisement> {
    if search_target == "ssdp:all" {
        return advertisements.iter().collect();
    }
    advertisements
        .iter()
        .filter(|a| a.notification_type == search_target)
        .collect()
}
