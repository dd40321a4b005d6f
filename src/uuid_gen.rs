/*!
RFC 4122 version-1 (time-based) UUID generation, keyed to a node id persisted on first use.

There is no UUID crate in this crate's dependency stack; the generator follows the same
`Mutex`-guarded singleton idiom this crate uses elsewhere for process-wide state (see
`utils::user_agent::make`), with the node id and the clock/sequence state protected by a
single lock.
*/

use rand::RngCore;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// A generated RFC 4122 version-1 UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid([u8; 16]);

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Uuid {
    /// Render as 32 contiguous hex digits, no hyphens.
    pub fn to_compact_string(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Render as `urn:uuid:<default-form>`.
    pub fn to_urn_string(&self) -> String {
        format!("urn:uuid:{}", self)
    }
}

impl Display for Uuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let hex = self.to_compact_string();
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

struct GeneratorState {
    node_id: [u8; 6],
    last_clock: u64,
    drift: u32,
    clock_seq: u16,
}

const GREGORIAN_EPOCH_OFFSET: u64 = 0x01B2_1DD2_1381_4000;
const DRIFT_LIMIT: u32 = 10_000;

lazy_static::lazy_static! {
    static ref STATE: Mutex<GeneratorState> = Mutex::new(GeneratorState::new());
}

impl GeneratorState {
    fn new() -> Self {
        let node_id = load_or_create_node_id();
        let mut rng = rand::thread_rng();
        GeneratorState {
            node_id,
            last_clock: 0,
            drift: 0,
            clock_seq: (rng.next_u32() & 0x3fff) as u16,
        }
    }

    /// Produce the next (clock, sequence) pair, enforcing monotonicity under the mutex.
    fn next_clock(&mut self) -> (u64, u16) {
        loop {
            let now = current_100ns_ticks();
            if now > self.last_clock {
                self.last_clock = now;
                self.drift = 0;
                return (self.last_clock, self.clock_seq);
            } else if now == self.last_clock {
                self.drift += 1;
                if self.drift > DRIFT_LIMIT {
                    std::thread::yield_now();
                    self.drift = 0;
                    continue;
                }
                self.last_clock += 1;
                return (self.last_clock, self.clock_seq);
            } else {
                warn!("uuid_gen - system clock moved backward, reseeding sequence");
                self.clock_seq = (rand::thread_rng().next_u32() & 0x3fff) as u16;
                self.last_clock = now;
                self.drift = 0;
                return (self.last_clock, self.clock_seq);
            }
        }
    }
}

fn current_100ns_ticks() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let ticks = since_epoch.as_secs() * 10_000_000 + u64::from(since_epoch.subsec_nanos()) / 100;
    (ticks + GREGORIAN_EPOCH_OFFSET) & 0x0FFF_FFFF_FFFF_FFFF
}

fn node_id_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".UPnP").join("uuid_mac_address"))
}

fn load_or_create_node_id() -> [u8; 6] {
    if let Some(path) = node_id_path() {
        if let Ok(contents) = fs::read_to_string(&path) {
            if let Some(node) = parse_node_id(contents.trim()) {
                return node;
            }
        }
        let node = random_multicast_node_id();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(
            &path,
            node.iter().map(|b| format!("{:02x}", b)).collect::<String>(),
        );
        return node;
    }
    random_multicast_node_id()
}

fn parse_node_id(hex: &str) -> Option<[u8; 6]> {
    if hex.len() != 12 {
        return None;
    }
    let mut node = [0u8; 6];
    for i in 0..6 {
        node[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(node)
}

/// A 48-bit node id with the multicast bit set, per RFC 4122 §4.5, so it can never be
/// mistaken for a real hardware address.
fn random_multicast_node_id() -> [u8; 6] {
    let mut node = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut node);
    node[0] |= 0x01;
    node
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Generate a new time-based UUID. Safe to call concurrently from multiple threads.
pub fn new_v1() -> Uuid {
    let mut state = STATE.lock().expect("uuid generator mutex poisoned");
    let (clock, seq) = state.next_clock();
    let node_id = state.node_id;
    drop(state);

    let time_low = (clock & 0xFFFF_FFFF) as u32;
    let time_mid = ((clock >> 32) & 0xFFFF) as u16;
    let time_hi_and_version = (((clock >> 48) & 0x0FFF) as u16) | 0x1000;
    let clock_seq_hi_and_reserved = (((seq >> 8) & 0x3F) as u8) | 0x80;
    let clock_seq_low = (seq & 0xFF) as u8;

    let mut bytes = [0u8; 16];
    bytes[0..4].copy_from_slice(&time_low.to_be_bytes());
    bytes[4..6].copy_from_slice(&time_mid.to_be_bytes());
    bytes[6..8].copy_from_slice(&time_hi_and_version.to_be_bytes());
    bytes[8] = clock_seq_hi_and_reserved;
    bytes[9] = clock_seq_low;
    bytes[10..16].copy_from_slice(&node_id);

    Uuid(bytes)
}

/// Generate a new UUID as a `uuid:<v1-uuid>` UDN, the form UPnP device identifiers use.
pub fn new_udn() -> String {
    format!("uuid:{}", new_v1())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_and_variant_bits() {
        let uuid = new_v1();
        let hex = uuid.to_compact_string();
        assert_eq!(&hex[12..13], "1");
        let variant_nibble = u8::from_str_radix(&hex[16..17], 16).unwrap();
        assert_eq!(variant_nibble & 0b1100, 0b1000);
    }

    #[test]
    fn test_monotonic_sequence() {
        let a = new_v1();
        let b = new_v1();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_format_has_hyphens() {
        let s = new_v1().to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s.chars().filter(|c| *c == '-').count(), 4);
    }
}
