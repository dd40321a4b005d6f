/*!
Device side of discovery: periodic `NOTIFY ssdp:alive` / `ssdp:byebye` / `ssdp:update`
advertisements for a single root device, embedded device, or service.
*/
use crate::httpu::{multicast_once, Options as MulticastOptions, RequestBuilder};
use crate::ssdp::{protocol, ProductVersion};
use crate::utils::user_agent;
use crate::{Error, SpecVersion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// A single `(NT, USN)` pair to advertise: one call site is needed per root device, per
/// embedded device, and per service, per § 1.1 of the UPnP Device Architecture.
#[derive(Clone, Debug)]
pub struct Advertisement {
    pub notification_type: String,
    pub unique_service_name: String,
    pub location: String,
}

#[derive(Clone, Debug)]
pub struct Options {
    pub spec_version: SpecVersion,
    pub network_interface: Option<String>,
    pub max_age: u32,
    pub product_and_version: Option<ProductVersion>,
}

/// Process-wide `BOOTID.UPNP.ORG` counter. Bumped every time the device (re)announces
/// itself after being unreachable; held flat across repeated `ssdp:alive` notifications.
static BOOT_ID: AtomicU64 = AtomicU64::new(0);

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

pub fn current_boot_id() -> u64 {
    BOOT_ID.load(Ordering::SeqCst)
}

pub fn bump_boot_id() -> u64 {
    BOOT_ID.fetch_add(1, Ordering::SeqCst) + 1
}

pub fn notify_alive(advertisement: &Advertisement, options: &Options) -> Result<(), Error> {
    send(protocol::NTS_ALIVE, advertisement, options)
}

pub fn notify_update(advertisement: &Advertisement, options: &Options) -> Result<(), Error> {
    send(protocol::NTS_UPDATE, advertisement, options)
}

pub fn notify_byebye(advertisement: &Advertisement, options: &Options) -> Result<(), Error> {
    send(protocol::NTS_BYE, advertisement, options)
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn send(nts: &str, advertisement: &Advertisement, options: &Options) -> Result<(), Error> {
    trace!(
        "notify::send - nts: {}, advertisement: {:?}",
        nts,
        advertisement
    );
    let mut message_builder = RequestBuilder::new(protocol::METHOD_NOTIFY);
    message_builder
        .add_header(protocol::HEAD_HOST, protocol::MULTICAST_ADDRESS)
        .add_header(protocol::HEAD_NT, &advertisement.notification_type)
        .add_header(protocol::HEAD_NTS, nts)
        .add_header(protocol::HEAD_USN, &advertisement.unique_service_name)
        .add_header(protocol::HEAD_BOOTID, &current_boot_id().to_string());
    // byebye carries none of LOCATION/CACHE-CONTROL/SERVER: the device is going away, so
    // there is nothing left to point at or cache.
    if nts != protocol::NTS_BYE {
        message_builder
            .add_header(protocol::HEAD_LOCATION, &advertisement.location)
            .add_header(
                protocol::HEAD_CACHE_CONTROL,
                &format!("max-age={}", options.max_age),
            )
            .add_header(
                protocol::HEAD_SERVER,
                &user_agent::make(&options.spec_version, &options.product_and_version),
            );
    }

    multicast_once(
        &(&mut message_builder).into(),
        &protocol::MULTICAST_ADDRESS.parse().unwrap(),
        &options.clone().into(),
    )
}

impl From<Options> for MulticastOptions {
    fn from(options: Options) -> Self {
        MulticastOptions {
            network_interface: options.network_interface,
            ..MulticastOptions::default()
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            spec_version: SpecVersion::V10,
            network_interface: None,
            max_age: 1800,
            product_and_version: None,
        }
    }
}

/// Duration between automatic `ssdp:alive` re-announcements, per the concurrency model this
/// crate's runtime uses for device advertisement.
pub const NOTIFY_INTERVAL: Duration = Duration::from_secs(60);
