//! Signalisierungsprotokoll (TCP)
//!
//! Definiert alle Nachrichten die ueber die persistente Verbindung
//! zwischen Client und Relay ausgetauscht werden.
//!
//! ## Design
//! - Request/Response Pattern: jede Nachricht hat eine `request_id: u32`
//! - JSON-Serialisierung via serde (TCP, nicht zeitkritisch)
//! - Tagged Enums fuer typsichere Nachrichtentypen
//! - Verhandlungs-Payloads (Offer/Answer/Candidate) bleiben opak –
//!   das Relay interpretiert sie nicht

use funkhaus_core::{Capabilities, CapabilityKind, ConnectionId, RoomName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Error-Responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Allgemein
    InternalError,
    InvalidRequest,
    // Raum
    RoomFull,
    NameTaken,
}

// ---------------------------------------------------------------------------
// Verbindungsaufbau
// ---------------------------------------------------------------------------

/// Erste Nachricht des Clients nach dem Verbindungsaufbau
///
/// Traegt den Origin des Clients (bei Browser-Clients der Wert des
/// Origin-Headers), anhand dessen die TURN-Credentials vergeben werden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloRequest {
    /// Origin des Clients (None bei nativen Clients)
    pub origin: Option<String>,
    /// Client-Version, nur fuers Logging
    pub client_version: Option<String>,
}

/// TURN-Credential-Eintrag wie er an den Client geht
///
/// Statisch aus der Konfiguration uebernommen – es werden keine
/// zeitlich begrenzten Shared-Secret-Credentials berechnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCredential {
    pub username: String,
    pub credential: String,
    pub urls: Vec<String>,
}

/// Antwort auf Hello: zugewiesene ID und Relay-Server-Listen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    /// Zugewiesene Verbindungs-ID
    pub connection_id: ConnectionId,
    /// Konfigurierte STUN-Server-URLs (ungefiltert)
    pub stunservers: Vec<String>,
    /// TURN-Credentials (abhaengig vom Origin, ggf. leer)
    pub turnservers: Vec<TurnCredential>,
}

// ---------------------------------------------------------------------------
// Raum-Nachrichten
// ---------------------------------------------------------------------------

/// Momentaufnahme der Praesenz eines Raums
///
/// Mitglieds-ID -> Capability-Zustand. Best-effort: Mitglieder die
/// waehrend der Erstellung verschwinden fehlen einfach.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    pub members: HashMap<ConnectionId, Capabilities>,
}

impl PresenceSnapshot {
    /// Anzahl der enthaltenen Mitglieder
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Prueft ob die Momentaufnahme leer ist
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Raum beitreten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Ziel-Raum. Ein leerer Name ist ungueltig und wird ohne
    /// Antwort verworfen.
    pub room: String,
}

/// Bestaetigung des Raum-Beitritts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub room: RoomName,
    /// Praesenz des Raums nach dem Beitritt (inklusive des Beitretenden)
    pub snapshot: PresenceSnapshot,
}

/// Raum erstellen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Gewuenschter Name. None = Server generiert einen frischen Namen.
    pub room: Option<String>,
}

/// Antwort auf Raum-Erstellung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    /// Der (ggf. generierte) Raum-Name
    pub room: RoomName,
    /// Praesenz des Raums nach dem Beitritt des Erstellers
    pub snapshot: PresenceSnapshot,
}

/// Broadcast: ein Mitglied (oder einer seiner Feeds) wurde entfernt
///
/// `kind = None` bedeutet vollstaendige Entfernung aus dem Raum,
/// `kind = Some(Screen)` nur das Ende eines Screen-Share-Feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveEvent {
    pub id: ConnectionId,
    pub kind: Option<CapabilityKind>,
}

// ---------------------------------------------------------------------------
// Relay-Nachrichten
// ---------------------------------------------------------------------------

/// Adressierter Verhandlungs-Umschlag (Offer/Answer/Candidate)
///
/// Das Relay stempelt `from` serverseitig und liefert den Payload
/// unveraendert aus. Fehlt `to` oder ist die Ziel-ID unbekannt, wird
/// die Nachricht kommentarlos verworfen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Ziel-Verbindung
    pub to: Option<ConnectionId>,
    /// Absender – wird vom Relay gesetzt, Client-Werte werden ueberschrieben
    pub from: Option<ConnectionId>,
    /// Opaker Verhandlungs-Payload
    pub payload: serde_json::Value,
}

/// WebRTC-Trace vom Client (nur fuers Logging, kein Routing)
///
/// Das Feld heisst `trace_type` statt `type`, weil `type` bereits als
/// Tag-Feld des SignalPayload-Enums belegt ist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRequest {
    pub trace_type: String,
    pub session: Option<serde_json::Value>,
    pub prefix: Option<serde_json::Value>,
    pub peer: Option<serde_json::Value>,
    pub time: Option<serde_json::Value>,
    pub value: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Keepalive
// ---------------------------------------------------------------------------

/// Ping (Client -> Server oder Server -> Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingMessage {
    /// Unix-Timestamp in Millisekunden fuer RTT-Messung
    pub timestamp_ms: u64,
}

/// Pong-Antwort (spiegelt Timestamp zurueck)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    /// Originaler Timestamp aus dem Ping
    pub echo_timestamp_ms: u64,
    /// Server-eigener Timestamp
    pub server_timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// Haupt-Enum: SignalPayload
// ---------------------------------------------------------------------------

/// Alle moeglichen Signalisierungs-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalPayload {
    // Verbindungsaufbau
    Hello(HelloRequest),
    Welcome(WelcomeResponse),

    // Raum
    Join(JoinRequest),
    JoinResponse(JoinResponse),
    Create(CreateRequest),
    CreateResponse(CreateResponse),
    Leave,
    Remove(RemoveEvent),

    // Relay
    Message(MessageEnvelope),

    // Capability-Umschaltung
    ShareScreen,
    UnshareScreen,

    // Diagnostik
    Trace(TraceRequest),

    // Keepalive
    Ping(PingMessage),
    Pong(PongMessage),

    // Error
    Error(ErrorResponse),
}

/// Standardisierte Fehler-Antwort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Signal-Frame (Umschlag fuer alle Nachrichten)
// ---------------------------------------------------------------------------

/// Signalisierungs-Nachricht mit Request/Response-Zuordnung
///
/// Jede Nachricht traegt eine `request_id` die der Client vergibt.
/// Der Server kopiert die ID in die Antwort damit der Client Request
/// und Response zuordnen kann. Server-initiierte Nachrichten
/// (Broadcasts, Relay-Zustellungen) tragen die request_id 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalMessage {
    /// Eindeutige Nachrichten-ID fuer Request/Response-Zuordnung
    pub request_id: u32,
    /// Inhalt der Nachricht
    pub payload: SignalPayload,
}

impl SignalMessage {
    /// Erstellt eine neue Signalisierungs-Nachricht
    pub fn new(request_id: u32, payload: SignalPayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Erstellt eine server-initiierte Nachricht (request_id 0)
    pub fn event(payload: SignalPayload) -> Self {
        Self::new(0, payload)
    }

    /// Erstellt ein Remove-Broadcast-Event
    pub fn remove(id: ConnectionId, kind: Option<CapabilityKind>) -> Self {
        Self::event(SignalPayload::Remove(RemoveEvent { id, kind }))
    }

    /// Erstellt eine Ping-Nachricht
    pub fn ping(request_id: u32, timestamp_ms: u64) -> Self {
        Self::new(request_id, SignalPayload::Ping(PingMessage { timestamp_ms }))
    }

    /// Erstellt eine Pong-Antwort
    pub fn pong(request_id: u32, echo_timestamp_ms: u64, server_timestamp_ms: u64) -> Self {
        Self::new(
            request_id,
            SignalPayload::Pong(PongMessage {
                echo_timestamp_ms,
                server_timestamp_ms,
            }),
        )
    }

    /// Erstellt eine Fehler-Antwort
    pub fn error(request_id: u32, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            request_id,
            SignalPayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        )
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_request_round_trip() {
        let msg = SignalMessage::new(
            7,
            SignalPayload::Join(JoinRequest {
                room: "lobby".into(),
            }),
        );
        let json = msg.to_json().unwrap();
        let zurueck = SignalMessage::from_json(&json).unwrap();
        assert_eq!(zurueck.request_id, 7);
        match zurueck.payload {
            SignalPayload::Join(req) => assert_eq!(req.room, "lobby"),
            andere => panic!("Erwartet Join, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn tag_feld_heisst_type() {
        let msg = SignalMessage::event(SignalPayload::Leave);
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"leave""#), "JSON: {json}");
    }

    #[test]
    fn message_envelope_payload_bleibt_opak() {
        let payload = serde_json::json!({
            "sdp": "v=0...",
            "negotiation": {"candidate": "candidate:1 1 UDP ..."}
        });
        let msg = SignalMessage::new(
            3,
            SignalPayload::Message(MessageEnvelope {
                to: Some(ConnectionId::new()),
                from: None,
                payload: payload.clone(),
            }),
        );
        let json = msg.to_json().unwrap();
        let zurueck = SignalMessage::from_json(&json).unwrap();
        match zurueck.payload {
            SignalPayload::Message(env) => assert_eq!(env.payload, payload),
            andere => panic!("Erwartet Message, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn remove_event_ohne_kind() {
        let id = ConnectionId::new();
        let msg = SignalMessage::remove(id, None);
        let json = msg.to_json().unwrap();
        let zurueck = SignalMessage::from_json(&json).unwrap();
        match zurueck.payload {
            SignalPayload::Remove(ev) => {
                assert_eq!(ev.id, id);
                assert!(ev.kind.is_none());
            }
            andere => panic!("Erwartet Remove, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn remove_event_mit_screen_kind() {
        let msg = SignalMessage::remove(ConnectionId::new(), Some(CapabilityKind::Screen));
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""kind":"screen""#), "JSON: {json}");
    }

    #[test]
    fn error_code_screaming_snake_case() {
        let msg = SignalMessage::error(1, ErrorCode::RoomFull, "Raum ist voll");
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""ROOM_FULL""#), "JSON: {json}");
    }

    #[test]
    fn presence_snapshot_serde() {
        let mut snapshot = PresenceSnapshot::default();
        snapshot
            .members
            .insert(ConnectionId::new(), Capabilities::default());
        let msg = SignalMessage::new(
            2,
            SignalPayload::JoinResponse(JoinResponse {
                room: RoomName::from("lobby"),
                snapshot,
            }),
        );
        let json = msg.to_json().unwrap();
        let zurueck = SignalMessage::from_json(&json).unwrap();
        match zurueck.payload {
            SignalPayload::JoinResponse(resp) => {
                assert_eq!(resp.snapshot.len(), 1);
                assert!(!resp.snapshot.is_empty());
            }
            andere => panic!("Erwartet JoinResponse, erhalten: {andere:?}"),
        }
    }
}
