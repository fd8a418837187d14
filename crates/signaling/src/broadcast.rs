//! Broadcaster – Send-Queues aller verbundenen Clients
//!
//! Der Broadcaster verwaltet die Send-Queues aller verbundenen Clients
//! und stellt Methoden bereit, um Nachrichten gezielt oder an eine
//! Empfaenger-Liste zu senden. Wer zu welchem Raum gehoert weiss
//! ausschliesslich das `RoomDirectory` – der Broadcaster bekommt fuer
//! Raum-Broadcasts die fertige Empfaenger-Liste gereicht, damit die
//! Mitgliedschaft nicht an zwei Stellen gepflegt wird.
//!
//! Senden ist nie blockierend: volle Queues verwerfen die Nachricht
//! (Back-pressure ist Sache des Transports, nicht des Koordinators).

use dashmap::DashMap;
use funkhaus_core::ConnectionId;
use funkhaus_protocol::SignalMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Client
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue eines verbundenen Clients
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub id: ConnectionId,
    pub tx: mpsc::Sender<SignalMessage>,
}

impl ClientSender {
    /// Sendet eine Nachricht nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, nachricht: SignalMessage) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %self.id, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection_id = %self.id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Broadcaster
// ---------------------------------------------------------------------------

/// Zentraler Verteiler fuer ausgehende Nachrichten
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<BroadcasterInner>,
}

struct BroadcasterInner {
    /// Client-Sender, indiziert nach ConnectionId
    clients: DashMap<ConnectionId, ClientSender>,
}

impl Broadcaster {
    /// Erstellt einen neuen Broadcaster
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(BroadcasterInner {
                clients: DashMap::new(),
            }),
        }
    }

    /// Registriert einen neuen Client und gibt seine Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via TCP.
    pub fn registrieren(&self, id: ConnectionId) -> mpsc::Receiver<SignalMessage> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner.clients.insert(id, ClientSender { id, tx });
        tracing::debug!(connection_id = %id, "Client im Broadcaster registriert");
        rx
    }

    /// Entfernt einen Client aus dem Broadcaster
    pub fn entfernen(&self, id: &ConnectionId) {
        self.inner.clients.remove(id);
        tracing::debug!(connection_id = %id, "Client aus Broadcaster entfernt");
    }

    /// Sendet eine Nachricht an einen einzelnen Client
    ///
    /// Gibt `true` zurueck wenn der Client gefunden und die Nachricht
    /// eingereiht wurde.
    pub fn an_verbindung_senden(&self, id: &ConnectionId, nachricht: SignalMessage) -> bool {
        match self.inner.clients.get(id) {
            Some(sender) => sender.senden(nachricht),
            None => {
                tracing::debug!(connection_id = %id, "Senden an unbekannten Client");
                false
            }
        }
    }

    /// Sendet eine Nachricht an eine Liste von Empfaengern
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_viele_senden(&self, ids: &[ConnectionId], nachricht: &SignalMessage) -> usize {
        let mut gesendet = 0;
        for id in ids {
            if let Some(sender) = self.inner.clients.get(id) {
                if sender.senden(nachricht.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Prueft ob ein Client registriert ist
    pub fn ist_registriert(&self, id: &ConnectionId) -> bool {
        self.inner.clients.contains_key(id)
    }

    /// Gibt die Anzahl der registrierten Clients zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.clients.len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
