//! funkhaus-signaling – Raum-Koordination und Nachrichten-Relay
//!
//! Dieser Crate implementiert den Kern des Funkhaus-Relays: Verbindungs-
//! Verwaltung, Raum-Verzeichnis mit Kapazitaetsgrenze, Praesenz-
//! Momentaufnahmen, Punkt-zu-Punkt-Weiterleitung opaker Verhandlungs-
//! Payloads und die Vergabe von STUN/TURN-Credentials.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  State Machine: Verbunden -> Begruesst -> ImRaum
//!     |
//!     v
//! MessageDispatcher
//!     |
//!     +-- CredentialHandler  (Hello -> Welcome mit STUN/TURN-Listen)
//!     +-- RoomHandler        (Join, Create, Leave)
//!     +-- RelayHandler       (Message-Weiterleitung)
//!     +-- CapabilityHandler  (ShareScreen, UnshareScreen)
//!
//! ConnectionRegistry – Wer ist verbunden, mit welchen Capabilities
//! RoomDirectory      – Raum -> Mitglieder, Kapazitaet, Join/Leave atomar
//! PresenceTracker    – Praesenz-Momentaufnahme eines Raums
//! MessageRelay       – Adressierte Payloads an Ziel-Verbindungen
//! Broadcaster        – Send-Queues aller verbundenen Clients
//! CredentialVendor   – STUN/TURN-Listen, TURN nach Origin gefiltert
//! ```

pub mod broadcast;
pub mod connection;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod rooms;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::Broadcaster;
pub use connection::ClientConnection;
pub use credentials::CredentialVendor;
pub use dispatcher::MessageDispatcher;
pub use error::{CreateError, JoinError};
pub use presence::PresenceTracker;
pub use registry::ConnectionRegistry;
pub use relay::MessageRelay;
pub use rooms::{RemovalScope, RoomDirectory};
pub use server_state::{SignalingConfig, SignalingState};
pub use tcp::SignalingServer;
