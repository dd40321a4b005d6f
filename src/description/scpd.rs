/*!
The Service Control Protocol Definition (SCPD) document: a service's action list and state
table, under the namespace `urn:schemas-upnp-org:service-1-0`.
*/

use crate::description::SpecVersion;
use crate::error::{self, xml_error};
use crate::utils::xml::{start_element, start_element_with, text_element, RootWritable, Writable};
use crate::Error;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use regex::Regex;
use std::io::{Cursor, Write};

lazy_static::lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^\w*$").unwrap();
}

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

pub const XML_NS_SERVICE: &str = "urn:schemas-upnp-org:service-1-0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    /// Not part of the UDA vocabulary directly; an `out` argument flagged with `<retval/>`.
    ReturnValue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: String,
    pub direction: Direction,
    pub related_state_variable: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub name: String,
    pub argument_list: Vec<Argument>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AllowedValue {
    List {
        values: Vec<String>,
    },
    Range {
        minimum: String,
        maximum: String,
        step: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateVariable {
    pub send_events: bool,
    pub name: String,
    pub data_type: String,
    pub default_value: Option<String>,
    pub allowed_values: Option<AllowedValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scpd {
    pub spec_version: SpecVersion,
    pub action_list: Vec<Action>,
    pub service_state_table: Vec<StateVariable>,
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

pub fn to_writer<T: Write>(root: &Scpd, writer: T) -> Result<T, Error> {
    root.write_root(writer).map_err(xml_error)
}

pub fn to_string(root: &Scpd) -> Result<String, Error> {
    let buffer = to_writer(root, Cursor::new(Vec::new()))?;
    String::from_utf8(buffer.into_inner()).map_err(|e| xml_error(e.utf8_error().into()))
}

pub fn from_str(xml: &str) -> Result<Scpd, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut spec_version = SpecVersion::default();
    let mut action_list = Vec::new();
    let mut service_state_table = Vec::new();

    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"specVersion" => {
                spec_version = read_spec_version(&mut reader)?;
            }
            Event::Start(ref e) if e.local_name() == b"actionList" => {
                action_list = read_action_list(&mut reader)?;
            }
            Event::Start(ref e) if e.local_name() == b"serviceStateTable" => {
                service_state_table = read_state_table(&mut reader)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Scpd {
        spec_version,
        action_list,
        service_state_table,
    })
}

fn check_identifier(value: &str) -> Result<String, Error> {
    if IDENTIFIER.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(error::invalid_field_value("identifier", value).into())
    }
}

// ------------------------------------------------------------------------------------------------
// Writer Implementations
// ------------------------------------------------------------------------------------------------

impl<T: Write> Writable<T> for Argument {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let argument = start_element(writer, b"argument")?;

        text_element(writer, b"name", self.name.as_bytes())?;

        text_element(
            writer,
            b"direction",
            match &self.direction {
                Direction::In => b"in".as_ref(),
                Direction::Out | Direction::ReturnValue => b"out".as_ref(),
            },
        )?;

        if self.direction == Direction::ReturnValue {
            crate::utils::xml::element(writer, b"retval")?;
        }

        text_element(
            writer,
            b"relatedStateVariable",
            self.related_state_variable.as_bytes(),
        )?;

        argument.end(writer)
    }
}

impl<T: Write> Writable<T> for Action {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let action = start_element(writer, b"action")?;

        text_element(writer, b"name", self.name.as_bytes())?;

        if !self.argument_list.is_empty() {
            let list = start_element(writer, b"argumentList")?;
            for argument in &self.argument_list {
                argument.write(writer)?;
            }
            list.end(writer)?;
        }

        action.end(writer)
    }
}

impl<T: Write> Writable<T> for AllowedValue {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        match self {
            AllowedValue::List { values } => {
                let list = start_element(writer, b"allowedValueList")?;
                for value in values {
                    text_element(writer, b"allowedValue", value.as_bytes())?;
                }
                list.end(writer)
            }
            AllowedValue::Range {
                minimum,
                maximum,
                step,
            } => {
                let range = start_element(writer, b"allowedValueRange")?;
                text_element(writer, b"minimum", minimum.as_bytes())?;
                text_element(writer, b"maximum", maximum.as_bytes())?;
                if let Some(step) = step {
                    text_element(writer, b"step", step.as_bytes())?;
                }
                range.end(writer)
            }
        }
    }
}

impl<T: Write> Writable<T> for StateVariable {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let variable = start_element_with(
            writer,
            b"stateVariable",
            vec![(
                "sendEvents",
                if self.send_events { "yes" } else { "no" },
            )],
        )?;

        text_element(writer, b"name", self.name.as_bytes())?;

        text_element(writer, b"dataType", self.data_type.as_bytes())?;

        if let Some(default_value) = &self.default_value {
            text_element(writer, b"defaultValue", default_value.as_bytes())?;
        }

        if let Some(allowed) = &self.allowed_values {
            allowed.write(writer)?;
        }

        variable.end(writer)
    }
}

impl<T: Write> RootWritable<T> for Scpd {}

impl<T: Write> Writable<T> for Scpd {
    fn write(&self, writer: &mut Writer<T>) -> Result<(), quick_xml::Error> {
        let root = crate::utils::xml::start_ns_element(writer, b"scpd", XML_NS_SERVICE, None)?;

        self.spec_version.write(writer)?;

        let mut sorted_actions = self.action_list.clone();
        sorted_actions.sort_by(|a, b| a.name.cmp(&b.name));

        if !sorted_actions.is_empty() {
            let list = start_element(writer, b"actionList")?;
            for action in &sorted_actions {
                action.write(writer)?;
            }
            list.end(writer)?;
        }

        let list = start_element(writer, b"serviceStateTable")?;
        for variable in &self.service_state_table {
            variable.write(writer)?;
        }
        list.end(writer)?;

        root.end(writer)
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

fn read_action_list(reader: &mut Reader<&[u8]>) -> Result<Vec<Action>, Error> {
    let mut buf = Vec::new();
    let mut actions = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"action" => {
                actions.push(read_action(reader)?);
            }
            Event::End(ref e) if e.local_name() == b"actionList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(actions)
}

fn read_action(reader: &mut Reader<&[u8]>) -> Result<Action, Error> {
    let mut buf = Vec::new();
    let mut name = String::new();
    let mut argument_list = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"name" => {
                name = check_identifier(&read_text(reader, b"name")?)?;
            }
            Event::Start(ref e) if e.local_name() == b"argumentList" => {
                argument_list = read_argument_list(reader)?;
            }
            Event::End(ref e) if e.local_name() == b"action" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(Action { name, argument_list })
}

fn read_argument_list(reader: &mut Reader<&[u8]>) -> Result<Vec<Argument>, Error> {
    let mut buf = Vec::new();
    let mut arguments = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"argument" => {
                arguments.push(read_argument(reader)?);
            }
            Event::End(ref e) if e.local_name() == b"argumentList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(arguments)
}

fn read_argument(reader: &mut Reader<&[u8]>) -> Result<Argument, Error> {
    let mut buf = Vec::new();
    let mut name = String::new();
    let mut direction = Direction::In;
    let mut has_retval = false;
    let mut related_state_variable = String::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => match e.local_name() {
                b"name" => name = read_text(reader, b"name")?,
                b"direction" => {
                    direction = match read_text(reader, b"direction")?.as_str() {
                        "out" => Direction::Out,
                        _ => Direction::In,
                    };
                }
                b"relatedStateVariable" => {
                    related_state_variable = read_text(reader, b"relatedStateVariable")?
                }
                _ => {}
            },
            Event::Empty(ref e) if e.local_name() == b"retval" => {
                has_retval = true;
            }
            Event::End(ref e) if e.local_name() == b"argument" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if has_retval && direction == Direction::Out {
        direction = Direction::ReturnValue;
    }
    Ok(Argument {
        name,
        direction,
        related_state_variable,
    })
}

fn read_state_table(reader: &mut Reader<&[u8]>) -> Result<Vec<StateVariable>, Error> {
    let mut buf = Vec::new();
    let mut variables = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"stateVariable" => {
                let send_events = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key == &b"sendEvents"[..])
                    .map(|a| a.value.as_ref() == &b"yes"[..])
                    .unwrap_or(false);
                variables.push(read_state_variable(reader, send_events)?);
            }
            Event::End(ref e) if e.local_name() == b"serviceStateTable" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(variables)
}

fn read_state_variable(
    reader: &mut Reader<&[u8]>,
    send_events: bool,
) -> Result<StateVariable, Error> {
    let mut buf = Vec::new();
    let mut name = String::new();
    let mut data_type = String::new();
    let mut default_value = None;
    let mut allowed_values = None;
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => match e.local_name() {
                b"name" => name = read_text(reader, b"name")?,
                b"dataType" => data_type = read_text(reader, b"dataType")?,
                b"defaultValue" => {
                    default_value = Some(check_identifier(&read_text(reader, b"defaultValue")?)?)
                }
                b"allowedValueList" => allowed_values = Some(read_allowed_list(reader)?),
                b"allowedValueRange" => allowed_values = Some(read_allowed_range(reader)?),
                _ => {}
            },
            Event::End(ref e) if e.local_name() == b"stateVariable" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(StateVariable {
        send_events,
        name,
        data_type,
        default_value,
        allowed_values,
    })
}

fn read_allowed_list(reader: &mut Reader<&[u8]>) -> Result<AllowedValue, Error> {
    let mut buf = Vec::new();
    let mut values = Vec::new();
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) if e.local_name() == b"allowedValue" => {
                values.push(check_identifier(&read_text(reader, b"allowedValue")?)?);
            }
            Event::End(ref e) if e.local_name() == b"allowedValueList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(AllowedValue::List { values })
}

fn read_allowed_range(reader: &mut Reader<&[u8]>) -> Result<AllowedValue, Error> {
    let mut buf = Vec::new();
    let mut minimum = String::new();
    let mut maximum = String::new();
    let mut step = None;
    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(ref e) => match e.local_name() {
                b"minimum" => minimum = read_text(reader, b"minimum")?,
                b"maximum" => maximum = read_text(reader, b"maximum")?,
                b"step" => step = Some(read_text(reader, b"step")?),
                _ => {}
            },
            Event::End(ref e) if e.local_name() == b"allowedValueRange" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(AllowedValue::Range {
        minimum,
        maximum,
        step,
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

    fn sample() -> Scpd {
        Scpd {
            spec_version: SpecVersion { major: 1, minor: 0 },
            action_list: vec![Action {
                name: "TestAction".to_string(),
                argument_list: vec![
                    Argument {
                        name: "TestInput".to_string(),
                        direction: Direction::In,
                        related_state_variable: "TestInVar".to_string(),
                    },
                    Argument {
                        name: "TestOutput".to_string(),
                        direction: Direction::Out,
                        related_state_variable: "TestOutVar".to_string(),
                    },
                ],
            }],
            service_state_table: vec![
                StateVariable {
                    send_events: false,
                    name: "TestInVar".to_string(),
                    data_type: "string".to_string(),
                    default_value: None,
                    allowed_values: None,
                },
                StateVariable {
                    send_events: false,
                    name: "TestOutVar".to_string(),
                    data_type: "string".to_string(),
                    default_value: None,
                    allowed_values: None,
                },
            ],
        }
    }

    #[test]
    fn test_xml_round_trip() {
        let scpd = sample();
        let xml = to_string(&scpd).unwrap();
        let parsed = from_str(&xml).unwrap();
        assert_eq!(parsed, scpd);
    }

    #[test]
    fn test_actions_sorted_lexicographically() {
        let mut scpd = sample();
        scpd.action_list.push(Action {
            name: "AnEarlierAction".to_string(),
            argument_list: vec![],
        });
        let xml = to_string(&scpd).unwrap();
        let earlier = xml.find("AnEarlierAction").unwrap();
        let later = xml.find("TestAction").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_rejects_non_identifier_default_value() {
        let xml = r#"<?xml version="1.0"?><scpd xmlns="urn:schemas-upnp-org:service-1-0"><specVersion><major>1</major><minor>0</minor></specVersion><serviceStateTable><stateVariable sendEvents="no"><name>V</name><dataType>string</dataType><defaultValue>not valid!</defaultValue></stateVariable></serviceStateTable></scpd>"#;
        assert!(from_str(xml).is_err());
    }
}
