/*!
On-disk device persistence: `bincode`-encoded records under `~/.UPnP/<type>/<friendly_name>`,
per the stable-schema design note (a tagged record plus a version integer; unknown versions
are rejected rather than guessed at).
*/
use crate::error;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

pub const CURRENT_VERSION: u32 = 1;

/// The durable shape of a device subtree. Deliberately excludes all runtime state (servers,
/// sockets, service handlers, threads) — only the fourteen descriptive fields survive a
/// dump/load cycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistedDevice {
    pub version: u32,
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
    pub sub_devices: Vec<PersistedDevice>,
    pub sub_services: Vec<PersistedService>,
}

/// The durable shape of a hosted service. Only the type is preserved; the action/state-table
/// catalog is rebuilt in memory by the concrete device's constructor every time it runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistedService {
    pub service_type: String,
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// `~/.UPnP/<device_type>/<friendly_name>`, the cache path § 4.D's `create` reads from and
/// writes to.
pub fn cache_path(device_type: &str, friendly_name: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".UPnP").join(device_type).join(friendly_name))
}

pub fn save(path: &PathBuf, device: &PersistedDevice) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = bincode::serialize(device)
        .map_err(|e| Error::OperationFailed {
            operation: "persist::save".to_string(),
            status: e.to_string(),
        })?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load(path: &PathBuf) -> Result<PersistedDevice, Error> {
    let bytes = fs::read(path)?;
    let device: PersistedDevice = bincode::deserialize(&bytes).map_err(|e| Error::OperationFailed {
        operation: "persist::load".to_string(),
        status: e.to_string(),
    })?;
    if device.version != CURRENT_VERSION {
        return Err(Error::MessageFormat(error::invalid_field_value(
            "version",
            device.version.to_string(),
        )));
    }
    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersistedDevice {
        PersistedDevice {
            version: CURRENT_VERSION,
            device_type: "TestDevice".to_string(),
            friendly_name: "test".to_string(),
            udn: "uuid:deadbeef-dead-beef-dead-beefdeadbeef".to_string(),
            manufacturer: "M".to_string(),
            manufacturer_url: None,
            model_description: None,
            model_name: "X".to_string(),
            model_number: None,
            model_url: None,
            serial_number: None,
            upc: None,
            sub_devices: vec![],
            sub_services: vec![PersistedService {
                service_type: "TestService".to_string(),
            }],
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "upnp-host-persist-test-{:?}",
            std::thread::current().id()
        ));
        let path = dir.join("cache_file");
        let device = sample();
        save(&path, &device).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.udn, device.udn);
        assert_eq!(loaded.sub_services.len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let dir = std::env::temp_dir().join(format!(
            "upnp-host-persist-test-v-{:?}",
            std::thread::current().id()
        ));
        let path = dir.join("cache_file");
        let mut device = sample();
        device.version = 99;
        save(&path, &device).unwrap();
        assert!(load(&path).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
