/*!
This module implements the UPnP device and service descriptions using the UPnP template
language (the XML vocabulary defined by the UPnP Device Architecture).

[`device`] emits/parses the root device description document; [`scpd`] emits/parses a
service's Service Control Protocol Definition document. Both share the [`SpecVersion`] and
[`TypeID`] types defined here.
*/

use crate::ssdp::SearchTarget;
use crate::utils::xml::{start_element, text_element, Writable};
use crate::{Error, SpecVersion as ProtocolVersion, UPNP_DOMAIN};
use quick_xml::Writer;
use std::fmt::{Display, Error as FmtError, Formatter};
use std::io::Write;
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// The `<specVersion>` element common to both the device and SCPD documents. This crate only
/// ever emits `1.0`, but a parsed document may carry a different value.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecVersion {
    pub major: u8,
    pub minor: u8,
}

///
/// The fully-qualified identifier for a device or service type, e.g.
/// `urn:schemas-upnp-org:device:MediaServer:1`. [`Display`] renders the `urn:...` form used
/// both in description documents and in SSDP `NT`/`ST` headers.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeID {
    Device {
        domain: String,
        name: String,
        version: String,
    },
    Service {
        domain: String,
        name: String,
        version: String,
    },
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl From<ProtocolVersion> for SpecVersion {
    fn from(v: ProtocolVersion) -> Self {
        match v {
            ProtocolVersion::V10 => SpecVersion { major: 1, minor: 0 },
            ProtocolVersion::V11 => SpecVersion { major: 1, minor: 1 },
            ProtocolVersion::V20 => SpecVersion { major: 2, minor: 0 },
        }
    }
}

impl Default for SpecVersion {
    fn default() -> Self {
        ProtocolVersion::V10.into()
    }
}

impl<T: Write> Writable<T> for SpecVersion {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let element = start_element(writer, b"specVersion")?;
        text_element(writer, b"major", self.major.to_string().as_bytes())?;
        text_element(writer, b"minor", self.minor.to_string().as_bytes())?;
        element.end(writer)
    }
}

// ------------------------------------------------------------------------------------------------

impl TypeID {
    pub fn new_device<S1: Into<String>, S2: Into<String>>(name: S1, version: S2) -> Self {
        TypeID::Device {
            domain: UPNP_DOMAIN.to_string(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn new_device_with_domain<S1: Into<String>, S2: Into<String>, S3: Into<String>>(
        domain: S1,
        name: S2,
        version: S3,
    ) -> Self {
        TypeID::Device {
            domain: domain.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn new_service<S1: Into<String>, S2: Into<String>>(name: S1, version: S2) -> Self {
        TypeID::Service {
            domain: UPNP_DOMAIN.to_string(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn new_service_with_domain<S1: Into<String>, S2: Into<String>, S3: Into<String>>(
        domain: S1,
        name: S2,
        version: S3,
    ) -> Self {
        TypeID::Service {
            domain: domain.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// The short token this type was named with, e.g. `MediaServer`, without domain or version.
    pub fn short_name(&self) -> &str {
        match self {
            TypeID::Device { name, .. } => name,
            TypeID::Service { name, .. } => name,
        }
    }

    pub fn device_from(st: &SearchTarget) -> Result<Self, Error> {
        match st {
            SearchTarget::DeviceType(type_name) => {
                let (name, version) = split_type_and_version(type_name)?;
                Ok(TypeID::new_device(name, version))
            }
            SearchTarget::DomainDeviceType(domain, type_name) => {
                let (name, version) = split_type_and_version(type_name)?;
                Ok(TypeID::new_device_with_domain(domain.clone(), name, version))
            }
            _ => Err(Error::UnknownType {
                type_token: st.to_string(),
            }),
        }
    }

    pub fn service_from(st: &SearchTarget) -> Result<Self, Error> {
        match st {
            SearchTarget::ServiceType(name) => {
                let (name, version) = split_type_and_version(name)?;
                Ok(TypeID::new_service(name, version))
            }
            SearchTarget::DomainServiceType(domain, name) => {
                let (name, version) = split_type_and_version(name)?;
                Ok(TypeID::new_service_with_domain(domain.clone(), name, version))
            }
            _ => Err(Error::UnknownType {
                type_token: st.to_string(),
            }),
        }
    }

    /// The default `serviceId`/`deviceId` URN used when a device or service does not declare
    /// one of its own, per the UPnP-standard `urn:upnp-org:<kind>Id:<name>` convention.
    pub fn default_id(&self) -> String {
        match self {
            TypeID::Device { name, .. } => format!("urn:upnp-org:deviceId:{}", name),
            TypeID::Service { name, .. } => format!("urn:upnp-org:serviceId:{}", name),
        }
    }
}

impl Display for TypeID {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            TypeID::Device {
                domain,
                name,
                version,
            } => write!(f, "urn:{}:device:{}:{}", domain, name, version),
            TypeID::Service {
                domain,
                name,
                version,
            } => write!(f, "urn:{}:service:{}:{}", domain, name, version),
        }
    }
}

impl FromStr for TypeID {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let st = SearchTarget::from_str(s).map_err(|_| Error::UnknownType {
            type_token: s.to_string(),
        })?;
        TypeID::device_from(&st).or_else(|_| TypeID::service_from(&st))
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn split_type_and_version(type_name: &str) -> Result<(String, String), Error> {
    match type_name.rfind(':') {
        None => Err(Error::UnknownType {
            type_token: type_name.to_string(),
        }),
        Some(sep) => {
            let (name, ver) = type_name.split_at(sep);
            Ok((name.to_string(), ver[1..].to_string()))
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

pub mod device;

pub mod scpd;
