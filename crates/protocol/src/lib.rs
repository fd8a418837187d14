//! funkhaus-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Nachrichtentypen, Enums und Strukturen
//! die zwischen Client und Relay ausgetauscht werden, sowie den
//! Frame-Codec fuer die TCP-Verbindung.

pub mod signal;
pub mod wire;

pub use signal::{ErrorCode, SignalMessage, SignalPayload};
pub use wire::FrameCodec;
