//! Raum-Handler – Join, Create, Leave
//!
//! Duenne Schicht ueber dem RoomDirectory: uebersetzt dessen Ergebnisse
//! in Protokoll-Antworten. Ein Join mit leerem Namen wird ohne Antwort
//! verworfen (der Client hat eine kaputte Anfrage geschickt, es gibt
//! nichts Sinnvolles zu bestaetigen oder abzulehnen).

use funkhaus_core::{ConnectionId, RoomName};
use funkhaus_protocol::signal::{
    CreateRequest, CreateResponse, ErrorCode, JoinRequest, JoinResponse,
};
use funkhaus_protocol::{SignalMessage, SignalPayload};
use std::sync::Arc;

use crate::error::{CreateError, JoinError};
use crate::rooms::RemovalScope;
use crate::server_state::SignalingState;

/// Verarbeitet einen Raum-Beitritt
pub fn handle_join(
    request: JoinRequest,
    request_id: u32,
    connection_id: ConnectionId,
    state: &Arc<SignalingState>,
) -> Option<SignalMessage> {
    let raum = RoomName::from(request.room);
    match state.raeume.beitreten(connection_id, &raum) {
        Ok(snapshot) => Some(SignalMessage::new(
            request_id,
            SignalPayload::JoinResponse(JoinResponse {
                room: raum,
                snapshot,
            }),
        )),
        Err(JoinError::UngueltigerName) => None,
        Err(JoinError::Voll) => Some(SignalMessage::error(
            request_id,
            ErrorCode::RoomFull,
            "Raum ist voll",
        )),
    }
}

/// Verarbeitet eine Raum-Erstellung
pub fn handle_create(
    request: CreateRequest,
    request_id: u32,
    connection_id: ConnectionId,
    state: &Arc<SignalingState>,
) -> SignalMessage {
    match state.raeume.erstellen(connection_id, request.room) {
        Ok((raum, snapshot)) => SignalMessage::new(
            request_id,
            SignalPayload::CreateResponse(CreateResponse {
                room: raum,
                snapshot,
            }),
        ),
        Err(CreateError::Vergeben) => SignalMessage::error(
            request_id,
            ErrorCode::NameTaken,
            "Raum-Name bereits vergeben",
        ),
    }
}

/// Verarbeitet ein explizites Verlassen des aktuellen Raums
///
/// Fire-and-forget: kein Antwort-Frame, die verbleibenden Mitglieder
/// sehen das Remove-Broadcast.
pub fn handle_leave(connection_id: ConnectionId, state: &Arc<SignalingState>) {
    state
        .raeume
        .verlassen(connection_id, RemovalScope::Vollstaendig);
}
