//! Relay-Handler – Adressierte Verhandlungs-Umschlaege weiterleiten
//!
//! Fire-and-forget: es gibt nie ein Antwort-Frame, auch nicht bei
//! fehlendem oder unbekanntem Ziel.

use funkhaus_core::ConnectionId;
use funkhaus_protocol::signal::MessageEnvelope;
use std::sync::Arc;

use crate::server_state::SignalingState;

/// Verarbeitet einen Message-Umschlag
pub fn handle_message(
    envelope: MessageEnvelope,
    connection_id: ConnectionId,
    state: &Arc<SignalingState>,
) {
    state.relay.weiterleiten(connection_id, envelope);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::SignalingConfig;
    use funkhaus_protocol::SignalPayload;

    #[test]
    fn umschlag_landet_beim_ziel() {
        let state = SignalingState::neu(SignalingConfig::default());
        let von = state.registry.registrieren();
        let ziel = state.registry.registrieren();
        let _rx_von = state.broadcaster.registrieren(von);
        let mut rx_ziel = state.broadcaster.registrieren(ziel);

        handle_message(
            MessageEnvelope {
                to: Some(ziel),
                from: None,
                payload: serde_json::json!({"sdp": "v=0..."}),
            },
            von,
            &state,
        );

        let msg = rx_ziel.try_recv().expect("Zustellung erwartet");
        match msg.payload {
            SignalPayload::Message(env) => assert_eq!(env.from, Some(von)),
            andere => panic!("Erwartet Message, erhalten: {andere:?}"),
        }
    }
}
