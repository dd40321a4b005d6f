/*!
SOAP 1.1 envelope parsing and serialization, built directly on `quick_xml` in the same style
as the device description codec rather than introducing a second XML library.
*/
use crate::error::xml_error;
use crate::soap::protocol;
use crate::Error;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// A parsed inbound action request: the qualified action name split into its owning
/// service-type URN and action name, plus its in-arguments in document order.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionRequest {
    pub service_type_urn: String,
    pub action_name: String,
    pub arguments: Vec<(String, String)>,
}

/// A fault carried inside a `<s:Fault>` body, per § 4.F's UPnP fault format.
#[derive(Clone, Debug, PartialEq)]
pub struct Fault {
    pub code: u16,
    pub description: String,
}

// ------------------------------------------------------------------------------------------------
// Public Functions — parsing
// ------------------------------------------------------------------------------------------------

/// Parse an inbound SOAP request envelope. Malformed envelopes (no `<s:Body>`, no action
/// child, no `xmlns` namespace attribute) are reported as a single opaque parse error; the
/// HTTP layer turns that into a 400 response.
pub fn parse_request(xml: &str) -> Result<ActionRequest, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if local_name(e.name()) == b"Body" => {
                return parse_action(&mut reader);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Err(malformed("missing <s:Body>"))
}

fn parse_action<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<ActionRequest, Error> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => {
                let action_name = String::from_utf8_lossy(local_name(e.name())).to_string();
                let service_type_urn = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.starts_with(b"xmlns"))
                    .map(|a| String::from_utf8_lossy(a.value.as_ref()).to_string())
                    .ok_or_else(|| malformed("action element has no xmlns namespace"))?;
                let arguments = read_arguments(reader, e.name())?;
                return Ok(ActionRequest {
                    service_type_urn,
                    action_name,
                    arguments,
                });
            }
            Event::End(ref e) if local_name(e.name()) == b"Body" => {
                return Err(malformed("empty <s:Body>"));
            }
            Event::Eof => return Err(malformed("unexpected end of document in <s:Body>")),
            _ => {}
        }
        buf.clear();
    }
}

fn read_arguments<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    action_tag: &[u8],
) -> Result<Vec<(String, String)>, Error> {
    let mut buf = Vec::new();
    let mut arguments = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(local_name(e.name())).to_string();
                let value = read_text(reader, e.name())?;
                arguments.push((name, value));
            }
            Event::End(ref e) if e.name() == action_tag => break,
            Event::Eof => return Err(malformed("unexpected end of document in action body")),
            _ => {}
        }
        buf.clear();
    }
    Ok(arguments)
}

fn read_text<R: std::io::BufRead>(reader: &mut Reader<R>, end_tag: &[u8]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Text(ref e) => {
                text.push_str(&e.unescape_and_decode(reader).map_err(xml_error)?);
            }
            Event::End(ref e) if e.name() == end_tag => break,
            Event::Eof => return Err(malformed("unexpected end of document reading text")),
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

/// Parse a response envelope, either a successful action response (out-parameters in
/// declared order) or a `<s:Fault>`. `<s:Fault>` is a child of `<s:Body>`, not a sibling of
/// it, so the two cases can only be told apart once `<s:Body>`'s first child is in hand.
pub fn parse_response(xml: &str) -> Result<Result<Vec<(String, String)>, Fault>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if local_name(e.name()) == b"Body" => {
                return parse_body_response(&mut reader);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Err(malformed("missing <s:Body>"))
}

fn parse_body_response<R: std::io::BufRead>(
    reader: &mut Reader<R>,
) -> Result<Result<Vec<(String, String)>, Fault>, Error> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if local_name(e.name()) == b"Fault" => {
                return Ok(Err(parse_fault(reader)?));
            }
            Event::Start(ref e) => {
                let arguments = read_arguments(reader, e.name())?;
                return Ok(Ok(arguments));
            }
            Event::End(ref e) if local_name(e.name()) == b"Body" => {
                return Err(malformed("empty <s:Body>"));
            }
            Event::Eof => return Err(malformed("unexpected end of document in <s:Body>")),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_fault<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<Fault, Error> {
    let mut buf = Vec::new();
    let mut code = 0u16;
    let mut description = String::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if local_name(e.name()) == b"errorCode" => {
                let text = read_text(reader, e.name())?;
                code = text.parse().unwrap_or(0);
            }
            Event::Start(ref e) if local_name(e.name()) == b"errorDescription" => {
                description = read_text(reader, e.name())?;
            }
            Event::End(ref e) if local_name(e.name()) == b"Fault" => break,
            Event::Eof => return Err(malformed("unexpected end of document in <s:Fault>")),
            _ => {}
        }
        buf.clear();
    }
    Ok(Fault { code, description })
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn malformed(reason: &str) -> Error {
    Error::MessageFormat(crate::error::invalid_field_value("soap-envelope", reason))
}

// ------------------------------------------------------------------------------------------------
// Public Functions — serialization
// ------------------------------------------------------------------------------------------------

/// Build an outbound action request (control-point side).
pub fn build_request(
    service_type_urn: &str,
    action_name: &str,
    arguments: &[(String, String)],
) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_envelope(&mut writer, |writer| {
        write_action_element(writer, service_type_urn, action_name, arguments)
    });
    String::from_utf8(writer.into_inner().into_inner()).unwrap()
}

/// Build a successful action response (device side): body child is
/// `<u:<ActionName>Response xmlns:u="...">`.
pub fn build_response(
    service_type_urn: &str,
    action_name: &str,
    out_arguments: &[(String, String)],
) -> String {
    let response_name = format!("{}Response", action_name);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_envelope(&mut writer, |writer| {
        write_action_element(writer, service_type_urn, &response_name, out_arguments)
    });
    String::from_utf8(writer.into_inner().into_inner()).unwrap()
}

/// Build a `<s:Fault>` body per § 4.F's fixed UPnP fault shape.
pub fn build_fault(code: u16, description: &str) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_envelope(&mut writer, |writer| {
        let fault = el(writer, b"s:Fault");
        text(writer, b"faultcode", protocol::FAULT_CODE_CLIENT.as_bytes());
        text(writer, b"faultstring", protocol::FAULT_STRING_UPNP_ERROR.as_bytes());
        let detail = el(writer, b"detail");
        let upnp_error = el_ns(writer, b"UPnPError", protocol::NS_CONTROL);
        text(writer, b"errorCode", code.to_string().as_bytes());
        text(writer, b"errorDescription", description.as_bytes());
        end(writer, upnp_error);
        end(writer, detail);
        end(writer, fault);
    });
    String::from_utf8(writer.into_inner().into_inner()).unwrap()
}

fn write_envelope<F>(writer: &mut Writer<Cursor<Vec<u8>>>, body: F)
where
    F: FnOnce(&mut Writer<Cursor<Vec<u8>>>),
{
    let mut envelope = BytesStart::borrowed_name(b"s:Envelope");
    envelope.push_attribute(("xmlns:s", protocol::NS_ENVELOPE));
    envelope.push_attribute(("s:encodingStyle", protocol::NS_ENCODING));
    writer.write_event(Event::Start(envelope)).unwrap();

    let body_tag = el(writer, b"s:Body");
    body(writer);
    end(writer, body_tag);

    writer
        .write_event(Event::End(BytesEnd::borrowed(b"s:Envelope")))
        .unwrap();
}

fn write_action_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    service_type_urn: &str,
    tag_name: &str,
    arguments: &[(String, String)],
) {
    let qualified = format!("u:{}", tag_name);
    let mut start = BytesStart::owned_name(qualified.as_bytes());
    start.push_attribute(("xmlns:u", service_type_urn));
    writer.write_event(Event::Start(start)).unwrap();
    for (name, value) in arguments {
        text(writer, name.as_bytes(), value.as_bytes());
    }
    writer
        .write_event(Event::End(BytesEnd::owned(qualified.into_bytes())))
        .unwrap();
}

fn el<'a>(writer: &mut Writer<Cursor<Vec<u8>>>, name: &'a [u8]) -> &'a [u8] {
    writer
        .write_event(Event::Start(BytesStart::borrowed_name(name)))
        .unwrap();
    name
}

fn el_ns<'a>(writer: &mut Writer<Cursor<Vec<u8>>>, name: &'a [u8], namespace: &str) -> &'a [u8] {
    let mut start = BytesStart::borrowed_name(name);
    start.push_attribute(("xmlns", namespace));
    writer.write_event(Event::Start(start)).unwrap();
    name
}

fn end(writer: &mut Writer<Cursor<Vec<u8>>>, name: &[u8]) {
    writer
        .write_event(Event::End(BytesEnd::borrowed(name)))
        .unwrap();
}

fn text(writer: &mut Writer<Cursor<Vec<u8>>>, name: &[u8], content: &[u8]) {
    let tag = el(writer, name);
    writer
        .write_event(Event::Text(BytesText::from_plain(content)))
        .unwrap();
    end(writer, tag);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_request() {
        let xml = build_request(
            "urn:schemas-upnp-org:service:TestService:1",
            "TestAction",
            &[("TestInput".to_string(), "hello".to_string())],
        );
        let parsed = parse_request(&xml).unwrap();
        assert_eq!(parsed.action_name, "TestAction");
        assert_eq!(parsed.service_type_urn, "urn:schemas-upnp-org:service:TestService:1");
        assert_eq!(parsed.arguments, vec![("TestInput".to_string(), "hello".to_string())]);
    }

    #[test]
    fn test_fault_round_trip() {
        let xml = build_fault(401, "Invalid Action");
        let parsed = parse_response(&xml).unwrap();
        match parsed {
            Err(fault) => {
                assert_eq!(fault.code, 401);
                assert_eq!(fault.description, "Invalid Action");
            }
            Ok(_) => panic!("expected a fault"),
        }
    }

    #[test]
    fn test_response_round_trip() {
        let xml = build_response(
            "urn:schemas-upnp-org:service:TestService:1",
            "TestAction",
            &[("TestOutput".to_string(), "42".to_string())],
        );
        let parsed = parse_response(&xml).unwrap().unwrap();
        assert_eq!(parsed, vec![("TestOutput".to_string(), "42".to_string())]);
    }
}
