/*!
Helpers for extracting and validating values out of a parsed header map, shared by the
SSDP datagram parser and the HTTP request/response parser.
*/

use crate::error::{self, MessageFormatError};
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

pub fn check_required(
    headers: &HashMap<String, String>,
    required: &[&str],
) -> Result<(), MessageFormatError> {
    for name in required {
        if !headers.contains_key(*name) {
            return Err(error::missing_required_header(*name));
        }
    }
    Ok(())
}

pub fn check_empty(value: &str, name: &str) -> Result<(), MessageFormatError> {
    if value.trim().is_empty() {
        Ok(())
    } else {
        Err(error::invalid_header_value(name, value))
    }
}

pub fn check_not_empty(value: &str, name: &str) -> Result<String, MessageFormatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error::missing_required_header(name))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn check_regex(value: &str, name: &str, pattern: &Regex) -> Result<String, MessageFormatError> {
    match pattern.captures(value) {
        Some(captures) => Ok(captures.get(1).map(|m| m.as_str()).unwrap_or("").to_string()),
        None => Err(error::invalid_header_value(name, value)),
    }
}

pub fn check_parsed_value<T>(value: &str, name: &str) -> Result<T, MessageFormatError>
where
    T: FromStr,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|_| error::invalid_header_value(name, value))
}
