//! Exercises SOAP action dispatch end to end: a real [`ServiceSpec`] with a handler, a request
//! envelope built the way a control point would build one, and the fault shapes a device must
//! produce when that request is malformed.

use upnp::model::device::Device;
use upnp::model::service::{Direction, ParameterSpec, ServiceSpec};
use upnp::soap::dispatch::{dispatch, DispatchOutcome};
use upnp::soap::envelope;

fn switch_power_service() -> upnp::model::service::ServiceRef {
    let device = Device::new_root("BinaryLight", "Switch Light");
    let spec = ServiceSpec::new().action(
        "SetTarget",
        vec![ParameterSpec {
            direction: Direction::In,
            name: "newTargetValue".to_string(),
            related_state_variable: "Target".to_string(),
        }],
        Box::new(|args| {
            if args[0] == "1" {
                Ok(vec![])
            } else {
                Err(upnp::Error::UPnPFault {
                    code: 501,
                    description: "Action Failed".to_string(),
                })
            }
        }),
    );
    let spec = spec.state_variable(upnp::model::service::StateVariableSpec {
        name: "Target".to_string(),
        data_type: upnp::types::DataType::Boolean,
        default_value: Some("0".to_string()),
        allowed_values: None,
        allowed_range: None,
        evented: false,
    });
    Device::add_service(&device, "SwitchPower", spec)
}

fn service_type_urn(service: &upnp::model::service::ServiceRef) -> String {
    service.read().unwrap().type_urn().to_string()
}

#[test]
fn a_valid_request_dispatches_to_its_handler_and_succeeds() {
    let service = switch_power_service();
    let request = envelope::build_request(
        &service_type_urn(&service),
        "SetTarget",
        &[("newTargetValue".to_string(), "1".to_string())],
    );

    match dispatch(&service, &request) {
        DispatchOutcome::Success(body) => {
            assert!(body.contains("SetTargetResponse"));
        }
        DispatchOutcome::Fault { body, .. } => panic!("expected success, got fault: {}", body),
    }
}

#[test]
fn an_action_that_rejects_its_input_returns_a_upnp_fault() {
    let service = switch_power_service();
    let request = envelope::build_request(
        &service_type_urn(&service),
        "SetTarget",
        &[("newTargetValue".to_string(), "0".to_string())],
    );

    match dispatch(&service, &request) {
        DispatchOutcome::Fault { http_status, body } => {
            assert_eq!(http_status, 500);
            assert!(body.contains("501"));
            assert!(body.contains("Action Failed"));
        }
        DispatchOutcome::Success(_) => panic!("expected a fault"),
    }
}

#[test]
fn an_unknown_action_name_is_reported_as_invalid_action() {
    let service = switch_power_service();
    let request = envelope::build_request(&service_type_urn(&service), "DoesNotExist", &[]);

    match dispatch(&service, &request) {
        DispatchOutcome::Fault { http_status, body } => {
            assert_eq!(http_status, 500);
            assert!(body.contains("401"));
        }
        DispatchOutcome::Success(_) => panic!("expected a fault"),
    }
}

#[test]
fn a_malformed_body_is_reported_as_invalid_action_without_panicking() {
    let service = switch_power_service();
    match dispatch(&service, "not xml at all") {
        DispatchOutcome::Fault { http_status, .. } => assert_eq!(http_status, 500),
        DispatchOutcome::Success(_) => panic!("expected a fault"),
    }
}

#[test]
fn wrong_argument_count_is_reported_as_invalid_args() {
    let service = switch_power_service();
    let request = envelope::build_request(&service_type_urn(&service), "SetTarget", &[]);

    match dispatch(&service, &request) {
        DispatchOutcome::Fault { body, .. } => assert!(body.contains("402")),
        DispatchOutcome::Success(_) => panic!("expected a fault"),
    }
}
