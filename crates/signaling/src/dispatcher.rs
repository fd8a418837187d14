//! Message-Dispatcher – Routet SignalMessages an die richtigen Handler
//!
//! Der Dispatcher empfaengt SignalMessages von einer ClientConnection,
//! bestimmt den richtigen Handler und gibt die Antwort zurueck.
//!
//! ## Zustandspruefung
//! Die erste Nachricht jeder Verbindung muss `Hello` sein. Raum-, Relay-
//! und Capability-Nachrichten vor dem Hello werden mit `InvalidRequest`
//! beantwortet; nur Keepalive und Trace sind immer erlaubt.
//!
//! Alle Handler arbeiten rein in-memory, deshalb ist `dispatch` eine
//! gewoehnliche synchrone Funktion ohne await-Punkte.

use funkhaus_core::ConnectionId;
use funkhaus_protocol::signal::ErrorCode;
use funkhaus_protocol::{SignalMessage, SignalPayload};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::handlers::{capability_handler, credential_handler, relay_handler, room_handler};
use crate::server_state::SignalingState;

/// Dispatcher-Kontext – Informationen ueber die aktuelle Verbindung
pub struct DispatcherContext {
    /// Peer-Adresse, nur fuers Logging
    pub peer_addr: SocketAddr,
    /// Zugewiesene Verbindungs-ID
    pub connection_id: ConnectionId,
    /// Hat die Verbindung bereits ein Hello geschickt?
    pub begruesst: bool,
}

/// Zentraler Message-Dispatcher
///
/// Routet eingehende SignalMessages an die entsprechenden Handler und
/// gibt die Antwort-SignalMessage zurueck.
pub struct MessageDispatcher {
    state: Arc<SignalingState>,
}

impl MessageDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Verarbeitet eine eingehende SignalMessage und gibt die Antwort zurueck
    ///
    /// Gibt `None` zurueck wenn keine Antwort gesendet werden soll
    /// (fire-and-forget-Nachrichten wie Leave und Message, oder ein Join
    /// mit leerem Raum-Namen).
    pub fn dispatch(
        &self,
        message: SignalMessage,
        ctx: &mut DispatcherContext,
    ) -> Option<SignalMessage> {
        let request_id = message.request_id;

        match message.payload {
            // -------------------------------------------------------------------
            // Verbindungsaufbau
            // -------------------------------------------------------------------
            SignalPayload::Hello(req) => {
                if ctx.begruesst {
                    return Some(SignalMessage::error(
                        request_id,
                        ErrorCode::InvalidRequest,
                        "Hello bereits empfangen",
                    ));
                }

                let antwort =
                    credential_handler::handle_hello(req, request_id, ctx.connection_id, &self.state);
                ctx.begruesst = true;
                tracing::debug!(
                    connection_id = %ctx.connection_id,
                    peer = %ctx.peer_addr,
                    "Verbindung begruesst"
                );
                Some(antwort)
            }

            // -------------------------------------------------------------------
            // Keepalive (immer erlaubt)
            // -------------------------------------------------------------------
            SignalPayload::Ping(ping) => {
                let server_ts = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                Some(SignalMessage::pong(request_id, ping.timestamp_ms, server_ts))
            }

            SignalPayload::Pong(_) => {
                // Pong-Antworten vom Client werden nur geloggt (RTT-Messung)
                tracing::trace!("Pong empfangen (RTT-Messung)");
                None
            }

            // -------------------------------------------------------------------
            // Diagnostik (immer erlaubt, kein Routing)
            // -------------------------------------------------------------------
            SignalPayload::Trace(trace) => {
                tracing::debug!(
                    connection_id = %ctx.connection_id,
                    trace_type = %trace.trace_type,
                    session = ?trace.session,
                    prefix = ?trace.prefix,
                    peer = ?trace.peer,
                    time = ?trace.time,
                    value = ?trace.value,
                    "WebRTC-Trace"
                );
                None
            }

            // -------------------------------------------------------------------
            // Hello erfordernde Nachrichten
            // -------------------------------------------------------------------
            payload => {
                if !ctx.begruesst {
                    return Some(SignalMessage::error(
                        request_id,
                        ErrorCode::InvalidRequest,
                        "Zuerst Hello senden",
                    ));
                }
                self.dispatch_begruesst(payload, request_id, ctx)
            }
        }
    }

    /// Routet Nachrichten die ein vorangegangenes Hello erfordern
    fn dispatch_begruesst(
        &self,
        payload: SignalPayload,
        request_id: u32,
        ctx: &mut DispatcherContext,
    ) -> Option<SignalMessage> {
        let id = ctx.connection_id;

        match payload {
            // -------------------------------------------------------------------
            // Raum-Nachrichten
            // -------------------------------------------------------------------
            SignalPayload::Join(req) => {
                room_handler::handle_join(req, request_id, id, &self.state)
            }

            SignalPayload::Create(req) => {
                Some(room_handler::handle_create(req, request_id, id, &self.state))
            }

            SignalPayload::Leave => {
                room_handler::handle_leave(id, &self.state);
                None
            }

            // -------------------------------------------------------------------
            // Relay
            // -------------------------------------------------------------------
            SignalPayload::Message(envelope) => {
                relay_handler::handle_message(envelope, id, &self.state);
                None
            }

            // -------------------------------------------------------------------
            // Capability-Umschaltung
            // -------------------------------------------------------------------
            SignalPayload::ShareScreen => {
                capability_handler::handle_share_screen(id, &self.state);
                None
            }

            SignalPayload::UnshareScreen => {
                capability_handler::handle_unshare_screen(id, &self.state);
                None
            }

            // -------------------------------------------------------------------
            // Unerwartete Server->Client Nachrichten
            // -------------------------------------------------------------------
            SignalPayload::Welcome(_)
            | SignalPayload::JoinResponse(_)
            | SignalPayload::CreateResponse(_)
            | SignalPayload::Remove(_)
            | SignalPayload::Error(_) => {
                tracing::warn!(
                    connection_id = %id,
                    request_id,
                    "Unerwartete Server->Client Nachricht vom Client empfangen"
                );
                Some(SignalMessage::error(
                    request_id,
                    ErrorCode::InvalidRequest,
                    "Unerwartete Nachricht",
                ))
            }

            // Oben bereits behandelt
            SignalPayload::Hello(_)
            | SignalPayload::Ping(_)
            | SignalPayload::Pong(_)
            | SignalPayload::Trace(_) => None,
        }
    }

    /// Bereinigt alle Ressourcen einer Verbindung beim Trennen
    ///
    /// Reihenfolge: erst Raum verlassen (das Remove-Broadcast braucht
    /// die Raum-Zuordnung der Registry), dann Registry- und
    /// Broadcaster-Eintrag entfernen.
    pub fn client_cleanup(&self, id: ConnectionId) {
        self.state
            .raeume
            .verlassen(id, crate::rooms::RemovalScope::Vollstaendig);
        self.state.registry.entfernen(&id);
        self.state.broadcaster.entfernen(&id);

        tracing::debug!(connection_id = %id, "Verbindungs-Ressourcen bereinigt");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
