/*!
Constant tokens for the SOAP 1.1 envelope and the UPnP control namespace, grounded on the
same "table of wire constants" idiom the SSDP module uses (`ssdp::protocol`).
*/

pub const HEAD_SOAP_ACTION: &str = "SOAPACTION";

pub const HEAD_CONTENT_TYPE: &str = "CONTENT-TYPE";

pub const CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

pub const NS_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

pub const NS_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";

pub const NS_CONTROL: &str = "urn:schemas-upnp-org:control-1-0";

pub const FAULT_CODE_CLIENT: &str = "s:Client";

pub const FAULT_STRING_UPNP_ERROR: &str = "UPnPError";

pub const ERROR_INVALID_ACTION: u16 = 401;

pub const ERROR_INVALID_ARGS: u16 = 402;

pub const ERROR_ACTION_FAILED: u16 = 501;
