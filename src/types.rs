/*!
The UPnP data-type registry: maps the type tokens used in `<dataType>` elements
(`ui4`, `string`, `boolean`, `uuid`, ...) to validation/coercion rules for SOAP argument
encoding. UPnP action arguments travel the wire as plain text; this module is where that
text is checked against, and coerced to, the type declared by a state variable.
*/
use crate::error::{self, MessageFormatError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// One of the UPnP data-type tokens named in the UDA `<dataType>` element vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Ui1,
    Ui2,
    Ui4,
    I1,
    I2,
    I4,
    Int,
    R4,
    R8,
    Number,
    Float,
    Fixed14_4,
    Char,
    String,
    Date,
    DateTime,
    DateTimeTz,
    Time,
    TimeTz,
    Boolean,
    BinBase64,
    BinHex,
    Uri,
    Uuid,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl DataType {
    /// The exact token as it appears in a `<dataType>` element.
    pub fn token(&self) -> &'static str {
        match self {
            DataType::Ui1 => "ui1",
            DataType::Ui2 => "ui2",
            DataType::Ui4 => "ui4",
            DataType::I1 => "i1",
            DataType::I2 => "i2",
            DataType::I4 => "i4",
            DataType::Int => "int",
            DataType::R4 => "r4",
            DataType::R8 => "r8",
            DataType::Number => "number",
            DataType::Float => "float",
            DataType::Fixed14_4 => "fixed.14.4",
            DataType::Char => "char",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::DateTime => "dateTime",
            DataType::DateTimeTz => "dateTime.tz",
            DataType::Time => "time",
            DataType::TimeTz => "time.tz",
            DataType::Boolean => "boolean",
            DataType::BinBase64 => "bin.base64",
            DataType::BinHex => "bin.hex",
            DataType::Uri => "uri",
            DataType::Uuid => "uuid",
        }
    }

    /// Validate and normalize `value` for this data type, returning the canonical on-wire
    /// string form (e.g. booleans always normalize to `"0"`/`"1"`).
    pub fn coerce(&self, value: &str) -> Result<String, MessageFormatError> {
        let trimmed = value.trim();
        match self {
            DataType::Ui1 => parse_int::<u8>(trimmed, self),
            DataType::Ui2 => parse_int::<u16>(trimmed, self),
            DataType::Ui4 => parse_int::<u32>(trimmed, self),
            DataType::I1 => parse_int::<i8>(trimmed, self),
            DataType::I2 => parse_int::<i16>(trimmed, self),
            DataType::I4 | DataType::Int => parse_int::<i32>(trimmed, self),
            DataType::R4 => parse_float::<f32>(trimmed, self),
            DataType::R8 | DataType::Number | DataType::Float => parse_float::<f64>(trimmed, self),
            DataType::Fixed14_4 => coerce_fixed_14_4(trimmed, self),
            DataType::Char => coerce_char(trimmed, self),
            DataType::String => Ok(trimmed.to_string()),
            DataType::Date => coerce_date(trimmed, self),
            DataType::DateTime | DataType::DateTimeTz => coerce_date_time(trimmed, self),
            DataType::Time | DataType::TimeTz => coerce_time(trimmed, self),
            DataType::Boolean => coerce_boolean(trimmed, self),
            DataType::BinBase64 => coerce_base64(trimmed, self),
            DataType::BinHex => coerce_hex(trimmed, self),
            DataType::Uri => coerce_uri(trimmed, self),
            DataType::Uuid => coerce_uuid(trimmed, self),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for DataType {
    type Err = MessageFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ui1" => DataType::Ui1,
            "ui2" => DataType::Ui2,
            "ui4" => DataType::Ui4,
            "i1" => DataType::I1,
            "i2" => DataType::I2,
            "i4" => DataType::I4,
            "int" => DataType::Int,
            "r4" => DataType::R4,
            "r8" => DataType::R8,
            "number" => DataType::Number,
            "float" => DataType::Float,
            "fixed.14.4" => DataType::Fixed14_4,
            "char" => DataType::Char,
            "string" => DataType::String,
            "date" => DataType::Date,
            "dateTime" => DataType::DateTime,
            "dateTime.tz" => DataType::DateTimeTz,
            "time" => DataType::Time,
            "time.tz" => DataType::TimeTz,
            "boolean" => DataType::Boolean,
            "bin.base64" => DataType::BinBase64,
            "bin.hex" => DataType::BinHex,
            "uri" => DataType::Uri,
            "uuid" => DataType::Uuid,
            other => return Err(error::invalid_value_for_type("dataType", other)),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn parse_int<T: FromStr>(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    value
        .parse::<T>()
        .map(|_| value.to_string())
        .map_err(|_| error::invalid_value_for_type(ty.token(), value))
}

fn parse_float<T: FromStr>(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    value
        .parse::<T>()
        .map(|_| value.to_string())
        .map_err(|_| error::invalid_value_for_type(ty.token(), value))
}

fn coerce_fixed_14_4(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    lazy_static! {
        static ref FIXED: Regex = Regex::new(r"^-?\d{1,14}(\.\d{1,4})?$").unwrap();
    }
    if FIXED.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(error::invalid_value_for_type(ty.token(), value))
    }
}

fn coerce_char(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    if value.chars().count() == 1 {
        Ok(value.to_string())
    } else {
        Err(error::invalid_value_for_type(ty.token(), value))
    }
}

fn coerce_date(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| value.to_string())
        .map_err(|_| error::invalid_value_for_type(ty.token(), value))
}

fn coerce_date_time(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(value.to_string());
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|_| value.to_string())
        .map_err(|_| error::invalid_value_for_type(ty.token(), value))
}

fn coerce_time(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    lazy_static! {
        static ref TIME_TZ: Regex =
            Regex::new(r"^\d{2}:\d{2}:\d{2}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    }
    if TIME_TZ.is_match(value) {
        let bare = value.trim_end_matches(['Z']);
        let bare = bare.split(['+', '-']).next().unwrap_or(bare);
        if NaiveTime::parse_from_str(bare, "%H:%M:%S").is_ok() {
            return Ok(value.to_string());
        }
    }
    Err(error::invalid_value_for_type(ty.token(), value))
}

fn coerce_boolean(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok("1".to_string()),
        "0" | "false" | "no" => Ok("0".to_string()),
        _ => Err(error::invalid_value_for_type(ty.token(), value)),
    }
}

fn coerce_base64(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    lazy_static! {
        static ref BASE64: Regex = Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").unwrap();
    }
    if !value.is_empty() && value.len() % 4 == 0 && BASE64.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(error::invalid_value_for_type(ty.token(), value))
    }
}

fn coerce_hex(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    if !value.is_empty() && value.len() % 2 == 0 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(value.to_lowercase())
    } else {
        Err(error::invalid_value_for_type(ty.token(), value))
    }
}

fn coerce_uri(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    if value.is_empty() {
        Err(error::invalid_value_for_type(ty.token(), value))
    } else {
        Ok(value.to_string())
    }
}

fn coerce_uuid(value: &str, ty: &DataType) -> Result<String, MessageFormatError> {
    lazy_static! {
        static ref UUID: Regex = Regex::new(
            r"^[a-fA-F\d]{8}-[a-fA-F\d]{4}-[a-fA-F\d]{4}-[a-fA-F\d]{4}-[a-fA-F\d]{12}$"
        )
        .unwrap();
    }
    let stripped = value.strip_prefix("uuid:").unwrap_or(value);
    if UUID.is_match(stripped) {
        Ok(stripped.to_lowercase())
    } else {
        Err(error::invalid_value_for_type(ty.token(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(DataType::Boolean.coerce("yes").unwrap(), "1");
        assert_eq!(DataType::Boolean.coerce("False").unwrap(), "0");
        assert!(DataType::Boolean.coerce("maybe").is_err());
    }

    #[test]
    fn test_ui4_rejects_negative() {
        assert!(DataType::Ui4.coerce("-1").is_err());
        assert_eq!(DataType::Ui4.coerce("42").unwrap(), "42");
    }

    #[test]
    fn test_uuid_strips_prefix_and_lowercases() {
        let v = DataType::Uuid
            .coerce("uuid:2FAC1234-31F8-11B4-A222-08002B34C003")
            .unwrap();
        assert_eq!(v, "2fac1234-31f8-11b4-a222-08002b34c003");
    }

    #[test]
    fn test_roundtrip_all_tokens_parse() {
        for token in [
            "ui1", "ui2", "ui4", "i1", "i2", "i4", "int", "r4", "r8", "number", "float",
            "fixed.14.4", "char", "string", "date", "dateTime", "dateTime.tz", "time", "time.tz",
            "boolean", "bin.base64", "bin.hex", "uri", "uuid",
        ] {
            let ty: DataType = token.parse().unwrap();
            assert_eq!(ty.token(), token);
        }
    }
}
