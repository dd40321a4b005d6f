//! Device-tree construction and persistence from outside the crate, using only the public
//! `model` API a device implementation would call.

use upnp::model::device::{create, Device};
use upnp::model::service::ServiceSpec;

#[test]
fn creating_the_same_device_twice_reuses_its_udn() {
    let dir = std::env::temp_dir().join(format!(
        "upnp-host-integration-test-{:?}",
        std::thread::current().id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::env::set_var("HOME", &dir);

    let first = create("TestDevice", "integration test device", |d| {
        d.friendly_name = "integration test device".to_string();
        d.manufacturer = "M".to_string();
        d.model_name = "X".to_string();
    })
    .unwrap();
    let udn = first.read().unwrap().udn.clone();

    let second = create("TestDevice", "integration test device", |_| {}).unwrap();
    assert_eq!(second.read().unwrap().udn, udn);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn a_device_missing_required_fields_fails_validation() {
    let root = Device::new_root("BinaryLight", "unvalidated");
    assert!(root.read().unwrap().validate().is_err());
}

#[test]
fn sub_devices_and_services_are_reachable_from_the_root_after_construction() {
    let root = Device::new_root("RootDevice", "root");
    let child = Device::add_device(&root, "Embedded", "embedded one", |d| {
        d.manufacturer = "M".to_string();
    });
    Device::add_service(&child, "SwitchPower", ServiceSpec::new());

    assert_eq!(root.read().unwrap().sub_devices.len(), 1);
    assert_eq!(child.read().unwrap().sub_services.len(), 1);
    assert_eq!(
        child.read().unwrap().device_path(),
        "/RootDevice/Embedded"
    );
}
