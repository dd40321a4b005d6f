/*!
Server-side action dispatch: takes a request body already routed to a particular service (the
HTTP host resolves the control URL to a [`ServiceRef`] before calling in here), locates the
action, coerces arguments, and invokes its handler.
*/
use crate::model::service::{Direction, ServiceRef};
use crate::soap::envelope::{self, ActionRequest};
use crate::soap::protocol;

/// The outcome of dispatching one action call, already shaped for the HTTP host: a success
/// carries the full response envelope (200), a fault carries the fault envelope alongside the
/// HTTP status the UDA expects for it (500 for all three fault codes).
pub enum DispatchOutcome {
    Success(String),
    Fault { http_status: u16, body: String },
}

/// Dispatch a raw SOAP request body against `service`. Never panics; every failure mode
/// listed in § 4.F's error table becomes a typed fault instead.
pub fn dispatch(service: &ServiceRef, body_xml: &str) -> DispatchOutcome {
    let request = match envelope::parse_request(body_xml) {
        Ok(request) => request,
        Err(_) => return fault(protocol::ERROR_INVALID_ACTION, "Invalid XML"),
    };

    let service = service.read().unwrap();
    if request.service_type_urn != service.type_urn().to_string() {
        return fault(protocol::ERROR_INVALID_ACTION, "Invalid Action");
    }

    let action = match service.spec.find_action(&request.action_name) {
        Some(action) => action,
        None => return fault(protocol::ERROR_INVALID_ACTION, "Invalid Action"),
    };

    let in_parameters: Vec<_> = action
        .parameters
        .iter()
        .filter(|p| p.direction == Direction::In)
        .collect();

    if in_parameters.len() != request.arguments.len() {
        return fault(protocol::ERROR_INVALID_ARGS, "Invalid Args");
    }

    let mut coerced_inputs = Vec::with_capacity(in_parameters.len());
    for parameter in &in_parameters {
        let raw = match find_argument(&request, &parameter.name) {
            Some(raw) => raw,
            None => return fault(protocol::ERROR_INVALID_ARGS, "Invalid Args"),
        };
        let variable = match service.spec.find_state_variable(&parameter.related_state_variable) {
            Some(variable) => variable,
            None => return fault(protocol::ERROR_ACTION_FAILED, "Action Failed"),
        };
        match variable.data_type.coerce(raw) {
            Ok(value) => coerced_inputs.push(value),
            Err(_) => return fault(protocol::ERROR_INVALID_ARGS, "Invalid Args"),
        }
    }

    let out_values = match (action.handler)(&coerced_inputs) {
        Ok(values) => values,
        Err(crate::Error::UPnPFault { code, description }) => return fault(code, &description),
        Err(_) => return fault(protocol::ERROR_ACTION_FAILED, "Action Failed"),
    };

    let out_parameters: Vec<_> = action
        .parameters
        .iter()
        .filter(|p| p.direction != Direction::In)
        .collect();

    if out_values.len() != out_parameters.len() {
        return fault(protocol::ERROR_ACTION_FAILED, "Action Failed");
    }

    let out_arguments: Vec<(String, String)> = out_parameters
        .iter()
        .zip(out_values.into_iter())
        .map(|(p, value)| (p.name.clone(), value))
        .collect();

    DispatchOutcome::Success(envelope::build_response(
        &request.service_type_urn,
        &action.name,
        &out_arguments,
    ))
}

fn find_argument<'a>(request: &'a ActionRequest, name: &str) -> Option<&'a str> {
    request
        .arguments
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn fault(code: u16, description: &str) -> DispatchOutcome {
    DispatchOutcome::Fault {
        http_status: 500,
        body: envelope::build_fault(code, description),
    }
}
