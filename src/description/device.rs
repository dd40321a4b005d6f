/*!
The UPnP device description document: a `<root>` element, under the namespace
`urn:schemas-upnp-org:device-1-0`, wrapping a single `<device>` and optionally nested
sub-devices.
*/

use crate::description::{SpecVersion, TypeID};
use crate::error::xml_error;
use crate::utils::xml::{
    start_element, start_ns_element, text_element, RootWritable, Writable,
};
use crate::Error;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Write};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Icon {
    pub mime_type: String,
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Service {
    pub service_type: TypeID,
    pub service_id: String,
    pub scpd_url: String,
    pub control_url: String,
    pub event_sub_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Device {
    pub device_type: TypeID,
    pub udn: String,
    pub friendly_name: String,
    pub manufacturer: String,
    pub manufacturer_url: Option<String>,
    pub model_description: Option<String>,
    pub model_name: String,
    pub model_number: Option<String>,
    pub model_url: Option<String>,
    pub serial_number: Option<String>,
    pub upc: Option<String>,
    pub icon_list: Vec<Icon>,
    pub service_list: Vec<Service>,
    pub device_list: Vec<Device>,
    pub presentation_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceRoot {
    pub spec_version: SpecVersion,
    pub url_base: String,
    pub device: Device,
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

pub const XML_NS_DEVICE: &str = "urn:schemas-upnp-org:device-1-0";

pub fn to_writer<T: Write>(root: &DeviceRoot, writer: T) -> Result<T, Error> {
    root.write_root(writer).map_err(xml_error)
}

pub fn to_string(root: &DeviceRoot) -> Result<String, Error> {
    let buffer = to_writer(root, Cursor::new(Vec::new()))?;
    String::from_utf8(buffer.into_inner()).map_err(|e| xml_error(e.utf8_error().into()))
}

pub fn from_str(xml: &str) -> Result<DeviceRoot, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut spec_version = SpecVersion::default();
    let mut url_base = String::new();
    let mut device: Option<Device> = None;

    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"specVersion" => {
                spec_version = read_spec_version(&mut reader)?;
            }
            Event::Start(ref e) if e.local_name() == b"URLBase" => {
                url_base = read_text(&mut reader, b"URLBase")?;
            }
            Event::Start(ref e) if e.local_name() == b"device" => {
                device = Some(read_device(&mut reader)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let device = device.ok_or_else(|| {
        xml_error(quick_xml::Error::UnexpectedToken(
            "missing <device> element".to_string(),
        ))
    })?;

    Ok(DeviceRoot {
        spec_version,
        url_base,
        device,
    })
}

// ------------------------------------------------------------------------------------------------
// Writer Implementations
// ------------------------------------------------------------------------------------------------

impl<T: Write> RootWritable<T> for DeviceRoot {}

impl<T: Write> Writable<T> for DeviceRoot {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let root = start_ns_element(writer, b"root", XML_NS_DEVICE, None)?;

        self.spec_version.write(writer)?;

        text_element(writer, b"URLBase", self.url_base.as_bytes())?;

        self.device.write(writer)?;

        root.end(writer)
    }
}

impl<T: Write> Writable<T> for Device {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let top = start_element(writer, b"device")?;

        text_element(writer, b"deviceType", self.device_type.to_string().as_bytes())?;

        text_element(writer, b"UDN", self.udn.as_bytes())?;

        text_element(writer, b"friendlyName", self.friendly_name.as_bytes())?;

        text_element(writer, b"manufacturer", self.manufacturer.as_bytes())?;

        if let Some(s) = &self.manufacturer_url {
            text_element(writer, b"manufacturerURL", s.as_bytes())?;
        }

        if let Some(s) = &self.model_description {
            text_element(writer, b"modelDescription", s.as_bytes())?;
        }

        text_element(writer, b"modelName", self.model_name.as_bytes())?;

        if let Some(s) = &self.model_number {
            text_element(writer, b"modelNumber", s.as_bytes())?;
        }

        if let Some(s) = &self.model_url {
            text_element(writer, b"modelURL", s.as_bytes())?;
        }

        if let Some(s) = &self.serial_number {
            text_element(writer, b"serialNumber", s.as_bytes())?;
        }

        if let Some(s) = &self.upc {
            text_element(writer, b"UPC", s.as_bytes())?;
        }

        if !self.icon_list.is_empty() {
            let list = start_element(writer, b"iconList")?;
            for icon in &self.icon_list {
                icon.write(writer)?;
            }
            list.end(writer)?;
        }

        if !self.service_list.is_empty() {
            let list = start_element(writer, b"serviceList")?;
            for service in &self.service_list {
                service.write(writer)?;
            }
            list.end(writer)?;
        }

        if !self.device_list.is_empty() {
            let list = start_element(writer, b"deviceList")?;
            for device in &self.device_list {
                device.write(writer)?;
            }
            list.end(writer)?;
        }

        if let Some(s) = &self.presentation_url {
            text_element(writer, b"presentationURL", s.as_bytes())?;
        }

        top.end(writer)
    }
}

impl<T: Write> Writable<T> for Icon {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let element = start_element(writer, b"icon")?;

        text_element(writer, b"mimetype", self.mime_type.as_bytes())?;
        text_element(writer, b"width", self.width.to_string().as_bytes())?;
        text_element(writer, b"height", self.height.to_string().as_bytes())?;
        text_element(writer, b"depth", self.depth.to_string().as_bytes())?;
        text_element(writer, b"url", self.url.as_bytes())?;

        element.end(writer)
    }
}

impl<T: Write> Writable<T> for Service {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let element = start_element(writer, b"service")?;

        text_element(writer, b"serviceType", self.service_type.to_string().as_bytes())?;
        text_element(writer, b"serviceId", self.service_id.as_bytes())?;
        text_element(writer, b"SCPDURL", self.scpd_url.as_bytes())?;
        text_element(writer, b"controlURL", self.control_url.as_bytes())?;
        text_element(writer, b"eventSubURL", self.event_sub_url.as_bytes())?;

        element.end(writer)
    }
}

// ------------------------------------------------------------------------------------------------
// Reader (parser)
// ------------------------------------------------------------------------------------------------

fn read_spec_version(reader: &mut Reader<&[u8]>) -> Result<SpecVersion, Error> {
    let mut buf = Vec::new();
    let mut major = 1u8;
    let mut minor = 0u8;
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"major" => {
                major = read_text(reader, b"major")?.trim().parse().unwrap_or(1);
            }
            Event::Start(ref e) if e.local_name() == b"minor" => {
                minor = read_text(reader, b"minor")?.trim().parse().unwrap_or(0);
            }
            Event::End(ref e) if e.local_name() == b"specVersion" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(SpecVersion { major, minor })
}

fn read_device(reader: &mut Reader<&[u8]>) -> Result<Device, Error> {
    let mut buf = Vec::new();
    let mut device_type = None;
    let mut udn = String::new();
    let mut friendly_name = String::new();
    let mut manufacturer = String::new();
    let mut manufacturer_url = None;
    let mut model_description = None;
    let mut model_name = String::new();
    let mut model_number = None;
    let mut model_url = None;
    let mut serial_number = None;
    let mut upc = None;
    let mut icon_list = Vec::new();
    let mut service_list = Vec::new();
    let mut device_list = Vec::new();
    let mut presentation_url = None;

    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => match e.local_name() {
                b"deviceType" => {
                    device_type = Some(read_text(reader, b"deviceType")?.parse()?);
                }
                b"UDN" => udn = read_text(reader, b"UDN")?,
                b"friendlyName" => friendly_name = read_text(reader, b"friendlyName")?,
                b"manufacturer" => manufacturer = read_text(reader, b"manufacturer")?,
                b"manufacturerURL" => {
                    manufacturer_url = Some(read_text(reader, b"manufacturerURL")?)
                }
                b"modelDescription" => {
                    model_description = Some(read_text(reader, b"modelDescription")?)
                }
                b"modelName" => model_name = read_text(reader, b"modelName")?,
                b"modelNumber" => model_number = Some(read_text(reader, b"modelNumber")?),
                b"modelURL" => model_url = Some(read_text(reader, b"modelURL")?),
                b"serialNumber" => serial_number = Some(read_text(reader, b"serialNumber")?),
                b"UPC" => upc = Some(read_text(reader, b"UPC")?),
                b"presentationURL" => {
                    presentation_url = Some(read_text(reader, b"presentationURL")?)
                }
                b"iconList" => icon_list = read_icon_list(reader)?,
                b"serviceList" => service_list = read_service_list(reader)?,
                b"deviceList" => {
                    let mut list_buf = Vec::new();
                    loop {
                        match reader.read_event(&mut list_buf).map_err(xml_error)? {
                            Event::Start(ref e) if e.local_name() == b"device" => {
                                device_list.push(read_device(reader)?);
                            }
                            Event::End(ref e) if e.local_name() == b"deviceList" => break,
                            Event::Eof => break,
                            _ => {}
                        }
                        list_buf.clear();
                    }
                }
                _ => {}
            },
            Event::End(ref e) if e.local_name() == b"device" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let device_type = device_type.ok_or_else(|| Error::Validation {
        device: friendly_name.clone(),
        reason: "missing deviceType".to_string(),
    })?;

    Ok(Device {
        device_type,
        udn,
        friendly_name,
        manufacturer,
        manufacturer_url,
        model_description,
        model_name,
        model_number,
        model_url,
        serial_number,
        upc,
        icon_list,
        service_list,
        device_list,
        presentation_url,
    })
}

fn read_icon_list(reader: &mut Reader<&[u8]>) -> Result<Vec<Icon>, Error> {
    let mut buf = Vec::new();
    let mut icons = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"icon" => {
                icons.push(read_icon(reader)?);
            }
            Event::End(ref e) if e.local_name() == b"iconList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(icons)
}

fn read_icon(reader: &mut Reader<&[u8]>) -> Result<Icon, Error> {
    let mut buf = Vec::new();
    let mut mime_type = String::new();
    let mut width = 0u16;
    let mut height = 0u16;
    let mut depth = 0u16;
    let mut url = String::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => match e.local_name() {
                b"mimetype" => mime_type = read_text(reader, b"mimetype")?,
                b"width" => width = read_text(reader, b"width")?.trim().parse().unwrap_or(0),
                b"height" => height = read_text(reader, b"height")?.trim().parse().unwrap_or(0),
                b"depth" => depth = read_text(reader, b"depth")?.trim().parse().unwrap_or(0),
                b"url" => url = read_text(reader, b"url")?,
                _ => {}
            },
            Event::End(ref e) if e.local_name() == b"icon" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(Icon {
        mime_type,
        width,
        height,
        depth,
        url,
    })
}

fn read_service_list(reader: &mut Reader<&[u8]>) -> Result<Vec<Service>, Error> {
    let mut buf = Vec::new();
    let mut services = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"service" => {
                services.push(read_service(reader)?);
            }
            Event::End(ref e) if e.local_name() == b"serviceList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(services)
}

fn read_service(reader: &mut Reader<&[u8]>) -> Result<Service, Error> {
    let mut buf = Vec::new();
    let mut service_type = None;
    let mut service_id = String::new();
    let mut scpd_url = String::new();
    let mut control_url = String::new();
    let mut event_sub_url = String::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => match e.local_name() {
                b"serviceType" => service_type = Some(read_text(reader, b"serviceType")?.parse()?),
                b"serviceId" => service_id = read_text(reader, b"serviceId")?,
                b"SCPDURL" => scpd_url = read_text(reader, b"SCPDURL")?,
                b"controlURL" => control_url = read_text(reader, b"controlURL")?,
                b"eventSubURL" => event_sub_url = read_text(reader, b"eventSubURL")?,
                _ => {}
            },
            Event::End(ref e) if e.local_name() == b"service" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let service_type = service_type.ok_or_else(|| Error::Validation {
        device: service_id.clone(),
        reason: "missing serviceType".to_string(),
    })?;

    Ok(Service {
        service_type,
        service_id,
        scpd_url,
        control_url,
        event_sub_url,
    })
}

fn read_text(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Text(e) => {
                text = e
                    .unescape_and_decode(reader)
                    .map_err(xml_error)?
                    .trim()
                    .to_string();
            }
            Event::End(ref e) if e.local_name() == end_tag => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn axis_camera() -> DeviceRoot {
        DeviceRoot {
            spec_version: SpecVersion { major: 1, minor: 0 },
            url_base: "http://10.59.104.28:49152/".to_string(),
            device: Device {
                device_type: TypeID::new_device("Basic", "1"),
                udn: "uuid:Upnp-BasicDevice-1_0-00408CA45086".to_string(),
                friendly_name: "AXIS P3301 - 00408CA45086".to_string(),
                manufacturer: "AXIS".to_string(),
                manufacturer_url: Some("http://www.axis.com/".to_string()),
                model_description: Some("AXIS P3301 Network Fixed Dome Camera".to_string()),
                model_name: "AXIS P3301".to_string(),
                model_number: Some("P3301".to_string()),
                model_url: Some("http://www.axis.com/".to_string()),
                serial_number: Some("00408CA45086".to_string()),
                upc: None,
                icon_list: vec![],
                service_list: vec![Service {
                    service_type: TypeID::new_service_with_domain(
                        "axis-com",
                        "BasicService",
                        "1",
                    ),
                    service_id: "urn:axis-com:serviceId:BasicServiceId".to_string(),
                    scpd_url: "/scpd_basic.xml".to_string(),
                    control_url: "/upnp/control/BasicServiceId".to_string(),
                    event_sub_url: "/upnp/event/BasicServiceId".to_string(),
                }],
                device_list: vec![],
                presentation_url: Some("http://10.59.104.28:80/".to_string()),
            },
        }
    }

    #[test]
    fn test_xml_serialize() {
        let device = axis_camera();
        let xml = to_string(&device).unwrap();
        assert!(xml.contains("<deviceType>urn:schemas-upnp-org:device:Basic:1</deviceType>"));
        assert!(xml.contains("<friendlyName>AXIS P3301 - 00408CA45086</friendlyName>"));
        assert!(xml.contains("<presentationURL>http://10.59.104.28:80/</presentationURL>"));
    }

    #[test]
    fn test_xml_round_trip() {
        let device = axis_camera();
        let xml = to_string(&device).unwrap();
        let parsed = from_str(&xml).unwrap();
        assert_eq!(parsed, device);
    }

    #[test]
    fn test_xml_round_trip_determinism() {
        let device = axis_camera();
        assert_eq!(to_string(&device).unwrap(), to_string(&device).unwrap());
    }
}
