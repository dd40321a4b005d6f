/*!
The in-memory device/service tree: construction, identity preservation across restarts, and
the persistence codec backing it. See [`device`] for the tree itself, [`service`] for the
per-service action/state-variable catalog, and [`persist`] for the on-disk record shape.
*/

pub mod device;
pub use device::{create, Device, DeviceRef};

pub mod service;
pub use service::{
    ActionSpec, AllowedRange, Direction, ParameterSpec, Service, ServiceRef, ServiceSpec,
    StateVariableSpec,
};

pub mod persist;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::service::ServiceSpec;

    #[test]
    fn test_add_device_is_idempotent() {
        let root = Device::new_root("RootDevice", "root");
        let a = Device::add_device(&root, "Embedded", "child", |_| {});
        let b = Device::add_device(&root, "Embedded", "child", |d| {
            d.model_name = "X".to_string();
        });
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(root.read().unwrap().sub_devices.len(), 1);
        assert_eq!(b.read().unwrap().model_name, "X");
    }

    #[test]
    fn test_add_service_is_idempotent() {
        let root = Device::new_root("RootDevice", "root");
        let a = Device::add_service(&root, "TestService", ServiceSpec::new());
        let b = Device::add_service(&root, "TestService", ServiceSpec::new());
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(root.read().unwrap().sub_services.len(), 1);
    }

    #[test]
    fn test_device_path_root_last() {
        let root = Device::new_root("RootDevice", "root");
        let child = Device::add_device(&root, "ChildDevice", "child", |_| {});
        assert_eq!(root.read().unwrap().device_path(), "/RootDevice");
        assert_eq!(
            child.read().unwrap().device_path(),
            "/RootDevice/ChildDevice"
        );
    }

    #[test]
    fn test_validate_requires_descriptive_fields() {
        let root = Device::new_root("RootDevice", "root");
        assert!(root.read().unwrap().validate().is_err());
        {
            let mut root = root.write().unwrap();
            root.friendly_name = "Root".to_string();
            root.manufacturer = "M".to_string();
            root.model_name = "X".to_string();
        }
        assert!(root.read().unwrap().validate().is_ok());
    }

    #[test]
    fn test_persist_round_trip_preserves_udn() {
        let dir = std::env::temp_dir().join(format!(
            "upnp-host-model-test-{:?}",
            std::thread::current().id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::env::set_var("HOME", &dir);

        let first = create("TestDevice", "test", |d| {
            d.friendly_name = "test".to_string();
            d.manufacturer = "M".to_string();
            d.model_name = "X".to_string();
        })
        .unwrap();
        let udn = first.read().unwrap().udn.clone();

        let second = create("TestDevice", "test", |_| {}).unwrap();
        assert_eq!(second.read().unwrap().udn, udn);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
