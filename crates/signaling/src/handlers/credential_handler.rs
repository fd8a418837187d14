//! Credential-Handler – Hello -> Welcome mit STUN/TURN-Listen
//!
//! Die STUN-Liste geht ungefiltert raus, TURN-Credentials haengen vom
//! Origin ab den der Client im Hello mitschickt.

use funkhaus_core::ConnectionId;
use funkhaus_protocol::signal::{HelloRequest, WelcomeResponse};
use funkhaus_protocol::{SignalMessage, SignalPayload};
use std::sync::Arc;

use crate::server_state::SignalingState;

/// Verarbeitet die Hello-Nachricht eines frisch verbundenen Clients
pub fn handle_hello(
    request: HelloRequest,
    request_id: u32,
    connection_id: ConnectionId,
    state: &Arc<SignalingState>,
) -> SignalMessage {
    tracing::debug!(
        connection_id = %connection_id,
        origin = ?request.origin,
        client_version = ?request.client_version,
        "Hello empfangen"
    );

    SignalMessage::new(
        request_id,
        SignalPayload::Welcome(WelcomeResponse {
            connection_id,
            stunservers: state.vendor.stun_credentials(),
            turnservers: state.vendor.turn_credentials(request.origin.as_deref()),
        }),
    )
}
