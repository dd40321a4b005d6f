/*!
Control-point side of the dispatcher: compose an action request, POST it to a device's
control URL, and decode the response envelope (success or fault) back into typed values.
*/
use crate::soap::envelope::{self, Fault};
use crate::soap::protocol;
use crate::Error;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Invoke `action_name` on the service identified by `service_type_urn`, at `control_url`,
/// with `arguments` in declared order. Returns the out-parameters in declared order, or the
/// `Error::UPnPFault` the device reported.
pub fn call_action(
    control_url: &str,
    service_type_urn: &str,
    action_name: &str,
    arguments: &[(String, String)],
) -> Result<Vec<(String, String)>, Error> {
    let body = envelope::build_request(service_type_urn, action_name, arguments);

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("content-type"),
        HeaderValue::from_static(protocol::CONTENT_TYPE),
    );
    let action_header = format!("\"{}#{}\"", service_type_urn, action_name);
    headers.insert(
        HeaderName::from_bytes(protocol::HEAD_SOAP_ACTION.as_bytes()).unwrap(),
        HeaderValue::from_str(&action_header)
            .map_err(|_| Error::MessageFormat(crate::error::invalid_header_value(
                protocol::HEAD_SOAP_ACTION,
                &action_header,
            )))?,
    );

    let client = Client::new();
    let response = client.post(control_url).headers(headers).body(body).send()?;

    let status = response.status();
    let text = response.text()?;

    match envelope::parse_response(&text) {
        Ok(Ok(values)) => Ok(values),
        Ok(Err(Fault { code, description })) => Err(Error::UPnPFault { code, description }),
        Err(_) if !status.is_success() => Err(Error::UPnPFault {
            code: status.as_u16(),
            description: status.canonical_reason().unwrap_or("Unknown Error").to_string(),
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_action_against_unreachable_host_is_transport_error() {
        let result = call_action(
            "http://127.0.0.1:1/control",
            "urn:schemas-upnp-org:service:TestService:1",
            "TestAction",
            &[],
        );
        assert!(matches!(result, Err(Error::Messaging(_))));
    }
}
