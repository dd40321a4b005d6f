//! End-to-end checks of the device tree's path to description XML: two renders of the same
//! unchanged tree must be byte-identical, and the codec must be able to parse what the model
//! layer writes.

use upnp::description::device as xml;
use upnp::model::device::Device;
use upnp::model::service::{ParameterSpec, ServiceSpec, StateVariableSpec};
use upnp::model::service::Direction;
use upnp::types::DataType;

fn light_with_switch() -> upnp::model::device::DeviceRef {
    let device = Device::new_root("BinaryLight", "Living Room Light");
    {
        let mut device = device.write().unwrap();
        device.manufacturer = "upnp-host".to_string();
        device.model_name = "Reference Light".to_string();
    }
    let spec = ServiceSpec::new()
        .with_service_id("1")
        .state_variable(StateVariableSpec {
            name: "Status".to_string(),
            data_type: DataType::Boolean,
            default_value: Some("0".to_string()),
            allowed_values: None,
            allowed_range: None,
            evented: true,
        })
        .action(
            "GetStatus",
            vec![ParameterSpec {
                direction: Direction::RetVal,
                name: "ResultStatus".to_string(),
                related_state_variable: "Status".to_string(),
            }],
            Box::new(|_args| Ok(vec!["0".to_string()])),
        );
    Device::add_service(&device, "SwitchPower", spec);
    device
}

#[test]
fn same_tree_renders_identical_xml_twice() {
    let device = light_with_switch();
    let first = xml::to_string(&device.read().unwrap().to_description_root("http://192.168.1.5:8080/")).unwrap();
    let second = xml::to_string(&device.read().unwrap().to_description_root("http://192.168.1.5:8080/")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn rendered_description_round_trips_through_the_codec() {
    let device = light_with_switch();
    let root = device.read().unwrap().to_description_root("http://192.168.1.5:8080/");
    let rendered = xml::to_string(&root).unwrap();
    let parsed = xml::from_str(&rendered).unwrap();

    assert_eq!(parsed.device.friendly_name, "Living Room Light");
    assert_eq!(parsed.device.manufacturer, "upnp-host");
    assert_eq!(parsed.device.service_list.len(), 1);
    assert_eq!(
        parsed.device.service_list[0].service_type.to_string(),
        "urn:schemas-upnp-org:service:SwitchPower:1"
    );
}

#[test]
fn adding_a_device_twice_does_not_duplicate_it_in_the_description() {
    let device = light_with_switch();
    Device::add_device(&device, "Embedded", "child one", |_| {});
    Device::add_device(&device, "Embedded", "child one", |d| {
        d.manufacturer = "M".to_string();
    });

    let root = device.read().unwrap().to_description_root("http://192.168.1.5:8080/");
    assert_eq!(root.device.device_list.len(), 1);
    assert_eq!(root.device.device_list[0].manufacturer, "M");
}
