/*!
The in-memory device tree: a root device exclusively owning its sub-devices and services,
with weak (lookup-only) back-references from child to parent, per § 3's ownership rules.

Built behind `Arc<RwLock<..>>` rather than `Rc<RefCell<..>>` so the same tree can be read by
the HTTP host's accept thread, the SSDP notify/search thread, and the owning application
thread at once; § 5 guarantees the tree is never mutated once [`crate::runtime::run`] is
entered, so contention on the lock is effectively nil.
*/
use crate::description::device as xml;
use crate::description::{SpecVersion, TypeID};
use crate::model::persist::{PersistedDevice, PersistedService};
use crate::model::service::{Service, ServiceRef, ServiceSpec};
use crate::uuid_gen;
use crate::Error;
use std::sync::{Arc, RwLock, Weak};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

pub type DeviceRef = Arc<RwLock<Device>>;

#[derive(Debug)]
pub struct Device {
    pub device_type: String,
    pub friendly_name: String,
    pub udn: String,
    pub manufacturer: String,
    pub manufacturer_url: Option<String>,
    pub model_description: Option<String>,
    pub model_name: String,
    pub model_number: Option<String>,
    pub model_url: Option<String>,
    pub serial_number: Option<String>,
    pub upc: Option<String>,
    pub presentation_url: Option<String>,
    pub icon_list: Vec<xml::Icon>,
    pub sub_devices: Vec<DeviceRef>,
    pub sub_services: Vec<ServiceRef>,
    parent: Weak<RwLock<Device>>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Device {
    /// Build a fresh root device with a newly-generated UDN.
    pub fn new_root(device_type: &str, friendly_name: &str) -> DeviceRef {
        Arc::new(RwLock::new(Device {
            device_type: device_type.to_string(),
            friendly_name: friendly_name.to_string(),
            udn: uuid_gen::new_udn(),
            manufacturer: String::new(),
            manufacturer_url: None,
            model_description: None,
            model_name: String::new(),
            model_number: None,
            model_url: None,
            serial_number: None,
            upc: None,
            presentation_url: None,
            icon_list: Vec::new(),
            sub_devices: Vec::new(),
            sub_services: Vec::new(),
            parent: Weak::new(),
        }))
    }

    pub fn is_root(&self) -> bool {
        self.parent.upgrade().is_none()
    }

    pub fn parent(&self) -> Option<DeviceRef> {
        self.parent.upgrade()
    }

    pub fn type_urn(&self) -> TypeID {
        TypeID::new_device(self.device_type.clone(), "1")
    }

    /// `add_device` is idempotent on `(type, friendly_name)`: a matching existing child is
    /// returned (with `block` applied to it) instead of creating a duplicate.
    pub fn add_device<F>(self_ref: &DeviceRef, device_type: &str, friendly_name: &str, block: F) -> DeviceRef
    where
        F: FnOnce(&mut Device),
    {
        if let Some(existing) = self_ref
            .read()
            .unwrap()
            .sub_devices
            .iter()
            .find(|d| {
                let d = d.read().unwrap();
                d.device_type == device_type && d.friendly_name == friendly_name
            })
            .cloned()
        {
            block(&mut existing.write().unwrap());
            return existing;
        }
        let child = Device::new_root(device_type, friendly_name);
        child.write().unwrap().parent = Arc::downgrade(self_ref);
        block(&mut child.write().unwrap());
        self_ref.write().unwrap().sub_devices.push(Arc::clone(&child));
        child
    }

    /// `add_service` is idempotent on `type`.
    pub fn add_service(self_ref: &DeviceRef, service_type: &str, spec: ServiceSpec) -> ServiceRef {
        if let Some(existing) = self_ref
            .read()
            .unwrap()
            .sub_services
            .iter()
            .find(|s| s.read().unwrap().service_type == service_type)
            .cloned()
        {
            return existing;
        }
        let service = Service::new(service_type, spec, self_ref);
        self_ref.write().unwrap().sub_services.push(Arc::clone(&service));
        service
    }

    /// `/` joined with this device's type and every ancestor's type, root-last.
    pub fn device_path(&self) -> String {
        let mut segments = vec![self.device_type.clone()];
        let mut current = self.parent.upgrade();
        while let Some(device) = current {
            let device = device.read().unwrap();
            segments.push(device.device_type.clone());
            current = device.parent.upgrade();
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Recursively asserts the required descriptive fields are present, per § 3's invariant
    /// that `friendly_name`/`manufacturer`/`model_name` are non-empty before any description
    /// is rendered or advertisement sent.
    pub fn validate(&self) -> Result<(), Error> {
        if self.friendly_name.is_empty() {
            return Err(Error::Validation {
                device: self.device_type.clone(),
                reason: "friendly_name is required".to_string(),
            });
        }
        if self.manufacturer.is_empty() {
            return Err(Error::Validation {
                device: self.device_type.clone(),
                reason: "manufacturer is required".to_string(),
            });
        }
        if self.model_name.is_empty() {
            return Err(Error::Validation {
                device: self.device_type.clone(),
                reason: "model_name is required".to_string(),
            });
        }
        for child in &self.sub_devices {
            child.read().unwrap().validate()?;
        }
        Ok(())
    }

    /// Render this device (and its sub-tree) as the XML-layer `Device` the description
    /// codec writes.
    pub fn to_description(&self) -> xml::Device {
        xml::Device {
            device_type: self.type_urn(),
            udn: self.udn.clone(),
            friendly_name: self.friendly_name.clone(),
            manufacturer: self.manufacturer.clone(),
            manufacturer_url: self.manufacturer_url.clone(),
            model_description: self.model_description.clone(),
            model_name: self.model_name.clone(),
            model_number: self.model_number.clone(),
            model_url: self.model_url.clone(),
            serial_number: self.serial_number.clone(),
            upc: self.upc.clone(),
            icon_list: self.icon_list.clone(),
            service_list: self
                .sub_services
                .iter()
                .map(|s| {
                    let s = s.read().unwrap();
                    xml::Service {
                        service_type: s.type_urn(),
                        service_id: s.service_id(),
                        scpd_url: s.scpd_url().unwrap_or_default(),
                        control_url: s.control_url().unwrap_or_default(),
                        event_sub_url: s.event_sub_url().unwrap_or_default(),
                    }
                })
                .collect(),
            device_list: self
                .sub_devices
                .iter()
                .map(|d| d.read().unwrap().to_description())
                .collect(),
            presentation_url: self.presentation_url.clone(),
        }
    }

    pub fn to_description_root(&self, url_base: &str) -> xml::DeviceRoot {
        xml::DeviceRoot {
            spec_version: SpecVersion::default(),
            url_base: url_base.to_string(),
            device: self.to_description(),
        }
    }

    pub fn to_persisted(&self) -> PersistedDevice {
        PersistedDevice {
            version: crate::model::persist::CURRENT_VERSION,
            device_type: self.device_type.clone(),
            friendly_name: self.friendly_name.clone(),
            udn: self.udn.clone(),
            manufacturer: self.manufacturer.clone(),
            manufacturer_url: self.manufacturer_url.clone(),
            model_description: self.model_description.clone(),
            model_name: self.model_name.clone(),
            model_number: self.model_number.clone(),
            model_url: self.model_url.clone(),
            serial_number: self.serial_number.clone(),
            upc: self.upc.clone(),
            sub_devices: self
                .sub_devices
                .iter()
                .map(|d| d.read().unwrap().to_persisted())
                .collect(),
            sub_services: self
                .sub_services
                .iter()
                .map(|s| PersistedService {
                    service_type: s.read().unwrap().service_type.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a server-less tree from a persisted record, reusing its UDN. Services come
    /// back with an empty [`ServiceSpec`] — the caller's construction block is responsible
    /// for reattaching real action handlers before `run`.
    pub fn from_persisted(persisted: &PersistedDevice) -> DeviceRef {
        let device = Arc::new(RwLock::new(Device {
            device_type: persisted.device_type.clone(),
            friendly_name: persisted.friendly_name.clone(),
            udn: persisted.udn.clone(),
            manufacturer: persisted.manufacturer.clone(),
            manufacturer_url: persisted.manufacturer_url.clone(),
            model_description: persisted.model_description.clone(),
            model_name: persisted.model_name.clone(),
            model_number: persisted.model_number.clone(),
            model_url: persisted.model_url.clone(),
            serial_number: persisted.serial_number.clone(),
            upc: persisted.upc.clone(),
            presentation_url: None,
            icon_list: Vec::new(),
            sub_devices: Vec::new(),
            sub_services: Vec::new(),
            parent: Weak::new(),
        }));

        for child in &persisted.sub_devices {
            let child_ref = Device::from_persisted(child);
            child_ref.write().unwrap().parent = Arc::downgrade(&device);
            device.write().unwrap().sub_devices.push(child_ref);
        }
        for service in &persisted.sub_services {
            let service_ref = Service::new(&service.service_type, ServiceSpec::new(), &device);
            device.write().unwrap().sub_services.push(service_ref);
        }
        device
    }
}

/// `create(type, friendly_name, block)`, § 4.D: load from the on-disk cache when present,
/// otherwise build fresh and persist. Either way `block` runs last, so it can override
/// mutable fields on a freshly-built OR a freshly-loaded device.
pub fn create<F>(device_type: &str, friendly_name: &str, block: F) -> Result<DeviceRef, Error>
where
    F: FnOnce(&mut Device),
{
    let path = crate::model::persist::cache_path(device_type, friendly_name);
    if let Some(path) = &path {
        if path.exists() {
            let persisted = crate::model::persist::load(path)?;
            let device = Device::from_persisted(&persisted);
            block(&mut device.write().unwrap());
            return Ok(device);
        }
    }

    let device = Device::new_root(device_type, friendly_name);
    block(&mut device.write().unwrap());
    if let Some(path) = &path {
        crate::model::persist::save(path, &device.read().unwrap().to_persisted())?;
    }
    Ok(device)
}
