/*!
A Universal Plug and Play (UPnP 1.0) device and control-point runtime.

More Information:

* [UPnP Device Architecture 1.0](http://www.upnp.org/specs/arch/UPnP-arch-DeviceArchitecture-v1.0.pdf)

This crate hosts three cooperating subsystems: an SSDP multicast discovery engine
([`ssdp`]), a hierarchical device/service model with an XML description codec
([`description`], [`model`]), and an HTTP host that dispatches SOAP actions
([`http`], [`soap`]). [`runtime`] wires the three together into a single running device.
*/

#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_extern_crates,
    rust_2018_idioms
)]
#![allow(missing_docs)]

#[macro_use]
extern crate tracing;

use std::fmt::{Display, Error as FmtError, Formatter};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// The domain used for UPnP-standard device and service types, and the XML namespace prefix.
pub const UPNP_DOMAIN: &str = "schemas-upnp-org";

/// The product token used for the `UPnP/<version>` component of `SERVER`/`USER-AGENT` headers.
pub const UPNP_STRING: &str = "UPnP";

///
/// The version of the UPnP Device Architecture a message or document conforms to. This crate
/// implements the 1.0 wire format and schema; later versions are recognized where the wire
/// format calls for tolerance (see `ssdp::protocol`) but are not fully implemented.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecVersion {
    /// UPnP Device Architecture 1.0.
    V10,
    /// UPnP Device Architecture 1.1.
    V11,
    /// UPnP Device Architecture 2.0.
    V20,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Default for SpecVersion {
    fn default() -> Self {
        SpecVersion::V10
    }
}

impl Display for SpecVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "{}",
            match self {
                SpecVersion::V10 => "1.0",
                SpecVersion::V11 => "1.1",
                SpecVersion::V20 => "2.0",
            }
        )
    }
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

pub mod error;
pub use error::Error;

pub mod utils;

pub mod uuid_gen;

pub mod types;

pub mod description;

pub mod model;

mod httpu;

pub mod ssdp;

pub mod soap;

pub mod http;

pub mod runtime;
