//! funkhaus-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Funkhaus-Crates gemeinsam genutzt werden: IDs, Raum-Namen und
//! der Capability-Zustand einer Verbindung.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{Capabilities, CapabilityKind, ConnectionId, RoomName};
