//! Gemeinsamer Server-Zustand fuer den Signaling-Kern
//!
//! Haelt alle geteilten Komponenten als Arc-Referenzen, die sicher
//! zwischen tokio-Tasks geteilt werden koennen.

use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::credentials::{CredentialVendor, IceConfig};
use crate::presence::PresenceTracker;
use crate::registry::ConnectionRegistry;
use crate::relay::MessageRelay;
use crate::rooms::RoomDirectory;

/// Konfiguration fuer den Signaling-Kern
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Anzeigename des Servers (nur fuers Logging)
    pub server_name: String,
    /// Maximale gleichzeitige Verbindungen (0 = unbegrenzt)
    pub max_clients: u32,
    /// Maximale Mitglieder pro Raum (0 = unbegrenzt)
    pub raum_max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// STUN/TURN-Konfiguration
    pub ice: IceConfig,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            server_name: "Funkhaus Relay".to_string(),
            max_clients: 512,
            raum_max_clients: 0,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
            ice: IceConfig::default(),
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
///
/// Alle Komponenten teilen ihre inneren Zustaende via Arc. Clone eines
/// Feldes gibt eine Referenz auf denselben inneren Zustand.
pub struct SignalingState {
    /// Server-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Verbindungs-Registry (wer ist verbunden, Capabilities)
    pub registry: ConnectionRegistry,
    /// Send-Queues aller Clients
    pub broadcaster: Broadcaster,
    /// Raum-Verzeichnis (Mitgliedschaft, Kapazitaet)
    pub raeume: RoomDirectory,
    /// Praesenz-Lese-Sicht
    pub presence: PresenceTracker,
    /// Nachrichten-Weiterleitung
    pub relay: MessageRelay,
    /// STUN/TURN-Credential-Vergabe
    pub vendor: CredentialVendor,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(config: SignalingConfig) -> Arc<Self> {
        let registry = ConnectionRegistry::neu();
        let broadcaster = Broadcaster::neu();
        let raeume = RoomDirectory::neu(
            registry.clone(),
            broadcaster.clone(),
            config.raum_max_clients,
        );
        let presence = PresenceTracker::neu(raeume.clone(), registry.clone());
        let relay = MessageRelay::neu(registry.clone(), broadcaster.clone());
        let vendor = CredentialVendor::neu(config.ice.clone());

        Arc::new(Self {
            config: Arc::new(config),
            registry,
            broadcaster,
            raeume,
            presence,
            relay,
            vendor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn komponenten_teilen_denselben_zustand() {
        let state = SignalingState::neu(SignalingConfig::default());

        let id = state.registry.registrieren();
        let _rx = state.broadcaster.registrieren(id);
        state
            .raeume
            .beitreten(id, &funkhaus_core::RoomName::from("lobby"))
            .unwrap();

        // Presence-Sicht sieht den Beitritt ueber dieselben Handles
        let snapshot = state
            .presence
            .schnappschuss(&funkhaus_core::RoomName::from("lobby"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn standard_konfiguration() {
        let config = SignalingConfig::default();
        assert_eq!(config.max_clients, 512);
        assert_eq!(config.raum_max_clients, 0, "Raeume standardmaessig unbegrenzt");
        assert_eq!(config.keepalive_sek, 30);
    }
}
