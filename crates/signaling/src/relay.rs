//! Message-Relay – Adressierte Verhandlungs-Payloads weiterleiten
//!
//! Das Relay ist fire-and-forget: fehlt das Ziel oder ist es unbekannt,
//! wird die Nachricht kommentarlos verworfen – der Absender bekommt
//! weder Fehler noch Bestaetigung. Zuverlaessigkeit der Verhandlung ist
//! Sache des darueberliegenden Protokolls.

use funkhaus_core::ConnectionId;
use funkhaus_protocol::signal::MessageEnvelope;
use funkhaus_protocol::{SignalMessage, SignalPayload};

use crate::broadcast::Broadcaster;
use crate::registry::ConnectionRegistry;

/// Leitet adressierte Umschlaege an Ziel-Verbindungen weiter
///
/// Clone teilt die zugrundeliegenden Handles.
#[derive(Clone)]
pub struct MessageRelay {
    registry: ConnectionRegistry,
    broadcaster: Broadcaster,
}

impl MessageRelay {
    /// Erstellt ein neues MessageRelay
    pub fn neu(registry: ConnectionRegistry, broadcaster: Broadcaster) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    /// Leitet einen Umschlag an seine Ziel-Verbindung weiter
    ///
    /// Das `from`-Feld wird serverseitig mit der ID des Absenders
    /// gestempelt – vom Client gelieferte Werte werden ueberschrieben,
    /// damit sich niemand als andere Verbindung ausgeben kann. Der
    /// Payload bleibt unangetastet.
    pub fn weiterleiten(&self, von: ConnectionId, mut umschlag: MessageEnvelope) {
        let Some(ziel) = umschlag.to else {
            tracing::debug!(von = %von, "Nachricht ohne Ziel verworfen");
            return;
        };

        if !self.registry.ist_registriert(&ziel) {
            tracing::debug!(von = %von, ziel = %ziel, "Nachricht an unbekanntes Ziel verworfen");
            return;
        }

        umschlag.from = Some(von);
        self.broadcaster
            .an_verbindung_senden(&ziel, SignalMessage::event(SignalPayload::Message(umschlag)));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn aufbau() -> (ConnectionRegistry, Broadcaster, MessageRelay) {
        let registry = ConnectionRegistry::neu();
        let broadcaster = Broadcaster::neu();
        let relay = MessageRelay::neu(registry.clone(), broadcaster.clone());
        (registry, broadcaster, relay)
    }

    fn verbinden(
        registry: &ConnectionRegistry,
        broadcaster: &Broadcaster,
    ) -> (ConnectionId, mpsc::Receiver<SignalMessage>) {
        let id = registry.registrieren();
        let rx = broadcaster.registrieren(id);
        (id, rx)
    }

    fn umschlag(ziel: Option<ConnectionId>) -> MessageEnvelope {
        MessageEnvelope {
            to: ziel,
            from: None,
            payload: serde_json::json!({"sdp": "v=0..."}),
        }
    }

    #[tokio::test]
    async fn weiterleitung_stempelt_absender() {
        let (registry, broadcaster, relay) = aufbau();
        let (von, _rx_von) = verbinden(&registry, &broadcaster);
        let (ziel, mut rx_ziel) = verbinden(&registry, &broadcaster);

        relay.weiterleiten(von, umschlag(Some(ziel)));

        let zugestellt = rx_ziel.try_recv().expect("Nachricht muss ankommen");
        match zugestellt.payload {
            SignalPayload::Message(env) => {
                assert_eq!(env.from, Some(von));
                assert_eq!(env.to, Some(ziel));
                assert_eq!(env.payload, serde_json::json!({"sdp": "v=0..."}));
            }
            andere => panic!("Erwartet Message, erhalten: {andere:?}"),
        }
    }

    #[tokio::test]
    async fn gefaelschter_absender_wird_ueberschrieben() {
        let (registry, broadcaster, relay) = aufbau();
        let (von, _rx_von) = verbinden(&registry, &broadcaster);
        let (ziel, mut rx_ziel) = verbinden(&registry, &broadcaster);
        let fremde_id = ConnectionId::new();

        let mut env = umschlag(Some(ziel));
        env.from = Some(fremde_id); // Spoofing-Versuch
        relay.weiterleiten(von, env);

        let zugestellt = rx_ziel.try_recv().unwrap();
        match zugestellt.payload {
            SignalPayload::Message(env) => assert_eq!(env.from, Some(von)),
            andere => panic!("Erwartet Message, erhalten: {andere:?}"),
        }
    }

    #[tokio::test]
    async fn ohne_ziel_wird_verworfen() {
        let (registry, broadcaster, relay) = aufbau();
        let (von, mut rx_von) = verbinden(&registry, &broadcaster);

        relay.weiterleiten(von, umschlag(None));

        // Keine Zustellung, kein Fehler an den Absender
        assert!(rx_von.try_recv().is_err());
    }

    #[tokio::test]
    async fn unbekanntes_ziel_wird_verworfen() {
        let (registry, broadcaster, relay) = aufbau();
        let (von, mut rx_von) = verbinden(&registry, &broadcaster);
        let unbekannt = ConnectionId::new();

        relay.weiterleiten(von, umschlag(Some(unbekannt)));

        assert!(rx_von.try_recv().is_err(), "Absender bleibt uninformiert");
    }
}
