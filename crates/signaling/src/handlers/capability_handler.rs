//! Capability-Handler – ShareScreen, UnshareScreen
//!
//! Capability-Umschaltungen sind zustandsaendernd aber antwortlos.
//! Ausserhalb eines Raums schalten sie nur das Flag um; erst der
//! naechste Praesenz-Schnappschuss macht den Zustand sichtbar.

use funkhaus_core::{CapabilityKind, ConnectionId};
use std::sync::Arc;

use crate::rooms::RemovalScope;
use crate::server_state::SignalingState;

/// Markiert die Verbindung als Screen-Share-Anbieter
pub fn handle_share_screen(connection_id: ConnectionId, state: &Arc<SignalingState>) {
    state
        .registry
        .capability_setzen(&connection_id, CapabilityKind::Screen, true);
    tracing::debug!(connection_id = %connection_id, "Screen-Share gestartet");
}

/// Beendet den Screen-Share-Feed der Verbindung
///
/// Neben dem Flag-Reset bekommt der aktuelle Raum (falls vorhanden) ein
/// Remove-Event mit Untertyp `screen`, die Mitgliedschaft bleibt.
pub fn handle_unshare_screen(connection_id: ConnectionId, state: &Arc<SignalingState>) {
    state
        .registry
        .capability_setzen(&connection_id, CapabilityKind::Screen, false);
    state
        .raeume
        .verlassen(connection_id, RemovalScope::Feed(CapabilityKind::Screen));
    tracing::debug!(connection_id = %connection_id, "Screen-Share beendet");
}
