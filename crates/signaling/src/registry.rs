//! Connection-Registry – Verwaltet lebende Verbindungen und ihren
//! Capability-Zustand
//!
//! Die Registry ist der alleinige Eigentuemer der `Connection`-Daten.
//! Das `room`-Feld wird ausschliesslich vom `RoomDirectory` gesetzt,
//! damit die referentielle Konsistenz (room-Feld <-> Mitgliedschaft)
//! an genau einer Stelle durchgesetzt wird.

use dashmap::DashMap;
use funkhaus_core::{Capabilities, CapabilityKind, ConnectionId, RoomName};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Zustand einer lebenden Verbindung
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    /// Welche Medien-Feeds diese Verbindung gerade anbietet
    pub capabilities: Capabilities,
    /// Aktueller Raum (None wenn in keinem Raum)
    pub room: Option<RoomName>,
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Verwaltet alle lebenden Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone der Registry teilt den inneren Zustand.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<ConnectionRegistryInner>,
}

struct ConnectionRegistryInner {
    /// Alle Verbindungen, indiziert nach ConnectionId
    connections: DashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    /// Erstellt eine neue ConnectionRegistry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(ConnectionRegistryInner {
                connections: DashMap::new(),
            }),
        }
    }

    /// Registriert eine neue Verbindung und gibt ihre frische ID zurueck
    ///
    /// Capability-Zustand startet mit den Standardwerten
    /// (screen=false, video=true, audio=false), kein Raum.
    pub fn registrieren(&self) -> ConnectionId {
        let id = ConnectionId::new();
        self.inner.connections.insert(
            id,
            Connection {
                id,
                capabilities: Capabilities::default(),
                room: None,
            },
        );
        tracing::debug!(connection_id = %id, "Verbindung registriert");
        id
    }

    /// Entfernt eine Verbindung aus der Registry
    ///
    /// Der Aufrufer muss die Verbindung vorher aus ihrem Raum entfernt
    /// haben – diese Operation fasst den Raum-Zustand nicht an.
    pub fn entfernen(&self, id: &ConnectionId) {
        self.inner.connections.remove(id);
        tracing::debug!(connection_id = %id, "Verbindung entfernt");
    }

    /// Setzt ein einzelnes Capability-Flag
    ///
    /// No-op bei unbekannter ID: Capability-Umschaltungen von bereits
    /// getrennten Verbindungen sind erwartbar und harmlos.
    pub fn capability_setzen(&self, id: &ConnectionId, kind: CapabilityKind, wert: bool) {
        if let Some(mut entry) = self.inner.connections.get_mut(id) {
            entry.capabilities.setzen(kind, wert);
        }
    }

    /// Gibt eine Kopie der Verbindungsdaten zurueck
    pub fn get(&self, id: &ConnectionId) -> Option<Connection> {
        self.inner.connections.get(id).map(|e| e.clone())
    }

    /// Gibt den aktuellen Raum einer Verbindung zurueck
    pub fn raum_von(&self, id: &ConnectionId) -> Option<RoomName> {
        self.inner.connections.get(id)?.room.clone()
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(id)
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.connections.len()
    }

    /// Setzt das `room`-Feld einer Verbindung
    ///
    /// Nur fuer das `RoomDirectory` – es ist der einzige Ort an dem
    /// Mitgliedschaft und room-Feld gemeinsam mutiert werden.
    pub(crate) fn raum_setzen(&self, id: &ConnectionId, raum: Option<RoomName>) {
        if let Some(mut entry) = self.inner.connections.get_mut(id) {
            entry.room = raum;
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrieren_mit_standard_capabilities() {
        let registry = ConnectionRegistry::neu();
        let id = registry.registrieren();

        let conn = registry.get(&id).expect("Verbindung muss existieren");
        assert_eq!(conn.id, id);
        assert!(!conn.capabilities.screen);
        assert!(conn.capabilities.video);
        assert!(!conn.capabilities.audio);
        assert!(conn.room.is_none());
    }

    #[test]
    fn ids_sind_eindeutig() {
        let registry = ConnectionRegistry::neu();
        let a = registry.registrieren();
        let b = registry.registrieren();
        assert_ne!(a, b);
        assert_eq!(registry.anzahl(), 2);
    }

    #[test]
    fn entfernen_loescht_verbindung() {
        let registry = ConnectionRegistry::neu();
        let id = registry.registrieren();

        registry.entfernen(&id);
        assert!(registry.get(&id).is_none());
        assert!(!registry.ist_registriert(&id));
        assert_eq!(registry.anzahl(), 0);
    }

    #[test]
    fn capability_setzen_aendert_nur_ein_flag() {
        let registry = ConnectionRegistry::neu();
        let id = registry.registrieren();

        registry.capability_setzen(&id, CapabilityKind::Screen, true);

        let conn = registry.get(&id).unwrap();
        assert!(conn.capabilities.screen);
        assert!(conn.capabilities.video, "video bleibt unangetastet");
        assert!(!conn.capabilities.audio);
    }

    #[test]
    fn capability_setzen_fuer_unbekannte_id_ist_no_op() {
        let registry = ConnectionRegistry::neu();
        let fremde_id = ConnectionId::new();

        // Darf weder panicken noch einen Eintrag anlegen
        registry.capability_setzen(&fremde_id, CapabilityKind::Audio, true);
        assert!(registry.get(&fremde_id).is_none());
    }

    #[test]
    fn raum_setzen_und_lesen() {
        let registry = ConnectionRegistry::neu();
        let id = registry.registrieren();

        registry.raum_setzen(&id, Some(RoomName::from("lobby")));
        assert_eq!(registry.raum_von(&id), Some(RoomName::from("lobby")));

        registry.raum_setzen(&id, None);
        assert_eq!(registry.raum_von(&id), None);
    }

    #[test]
    fn clone_teilt_inneren_state() {
        let r1 = ConnectionRegistry::neu();
        let r2 = r1.clone();
        let id = r1.registrieren();
        assert!(r2.ist_registriert(&id));
    }
}
