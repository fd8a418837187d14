//! Praesenz-Momentaufnahmen – Wer ist in einem Raum, mit welchen Feeds
//!
//! Der `PresenceTracker` ist eine reine Lese-Sicht ueber RoomDirectory
//! und ConnectionRegistry. Momentaufnahmen sind best-effort: verschwindet
//! ein Mitglied waehrend der Erstellung (Disconnect mitten im Lesen),
//! wird es ausgelassen statt die ganze Aufnahme scheitern zu lassen.

use funkhaus_core::{ConnectionId, RoomName};
use funkhaus_protocol::signal::PresenceSnapshot;

use crate::registry::ConnectionRegistry;
use crate::rooms::RoomDirectory;

/// Sammelt den Capability-Zustand einer Mitglieder-Liste auf
///
/// IDs die in der Registry fehlen werden uebersprungen – die Aufnahme
/// ist das bis dahin gesammelte Teilergebnis, nie ein Fehler.
pub(crate) fn sammeln(
    ids: impl IntoIterator<Item = ConnectionId>,
    registry: &ConnectionRegistry,
) -> PresenceSnapshot {
    let mut snapshot = PresenceSnapshot::default();
    for id in ids {
        match registry.get(&id) {
            Some(conn) => {
                snapshot.members.insert(id, conn.capabilities);
            }
            None => {
                tracing::debug!(
                    connection_id = %id,
                    "Mitglied waehrend der Momentaufnahme verschwunden – uebersprungen"
                );
            }
        }
    }
    snapshot
}

/// Lese-Sicht auf die aktuelle Praesenz eines Raums
///
/// Clone teilt die zugrundeliegenden Handles.
#[derive(Clone)]
pub struct PresenceTracker {
    raeume: RoomDirectory,
    registry: ConnectionRegistry,
}

impl PresenceTracker {
    /// Erstellt einen neuen PresenceTracker
    pub fn neu(raeume: RoomDirectory, registry: ConnectionRegistry) -> Self {
        Self { raeume, registry }
    }

    /// Erstellt eine Momentaufnahme der Praesenz eines Raums
    ///
    /// Fuer unbekannte Raeume ist die Aufnahme leer.
    pub fn schnappschuss(&self, name: &RoomName) -> PresenceSnapshot {
        sammeln(self.raeume.mitglieder(name), &self.registry)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
