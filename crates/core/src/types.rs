//! Gemeinsame Identifikations- und Zustandstypen fuer Funkhaus
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-ID
///
/// Wird beim Verbindungsaufbau vergeben und bleibt fuer die Lebensdauer
/// der Verbindung stabil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Name eines Raums
///
/// Raum-Namen sind entweder vom Client vergeben oder serverseitig generiert.
/// Ein leerer Name ist kein gueltiger Raum-Name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomName(pub String);

impl RoomName {
    /// Generiert einen frischen, global eindeutigen Raum-Namen
    pub fn generieren() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Prueft ob der Name wohlgeformt ist (nicht leer)
    pub fn ist_gueltig(&self) -> bool {
        !self.0.is_empty()
    }

    /// Gibt den Namen als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for RoomName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raum:{}", self.0)
    }
}

/// Medien-Feeds die eine Verbindung anbieten kann
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Screen,
    Video,
    Audio,
}

/// Capability-Zustand einer Verbindung
///
/// Feste Drei-Feld-Struktur. Unbekannte Felder werden beim Deserialisieren
/// ignoriert statt dynamisch gespeichert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub screen: bool,
    pub video: bool,
    pub audio: bool,
}

impl Capabilities {
    /// Setzt ein einzelnes Capability-Flag
    pub fn setzen(&mut self, kind: CapabilityKind, wert: bool) {
        match kind {
            CapabilityKind::Screen => self.screen = wert,
            CapabilityKind::Video => self.video = wert,
            CapabilityKind::Audio => self.audio = wert,
        }
    }
}

impl Default for Capabilities {
    /// Standardzustand einer frischen Verbindung: nur Video aktiv
    fn default() -> Self {
        Self {
            screen: false,
            video: true,
            audio: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_eindeutig() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b, "Zwei neue ConnectionIds muessen verschieden sein");
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId(Uuid::nil());
        assert!(id.to_string().starts_with("conn:"));
    }

    #[test]
    fn ids_sind_serde_kompatibel() {
        let id = ConnectionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let id2: ConnectionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, id2);
    }

    #[test]
    fn generierte_raum_namen_sind_eindeutig_und_gueltig() {
        let a = RoomName::generieren();
        let b = RoomName::generieren();
        assert_ne!(a, b);
        assert!(a.ist_gueltig());
    }

    #[test]
    fn leerer_raum_name_ist_ungueltig() {
        assert!(!RoomName::from("").ist_gueltig());
        assert!(RoomName::from("lobby").ist_gueltig());
    }

    #[test]
    fn capabilities_standardwerte() {
        let caps = Capabilities::default();
        assert!(!caps.screen);
        assert!(caps.video);
        assert!(!caps.audio);
    }

    #[test]
    fn capability_flag_setzen() {
        let mut caps = Capabilities::default();
        caps.setzen(CapabilityKind::Screen, true);
        caps.setzen(CapabilityKind::Video, false);
        assert!(caps.screen);
        assert!(!caps.video);
        assert!(!caps.audio);
    }

    #[test]
    fn capabilities_ignorieren_unbekannte_felder() {
        let json = r#"{"screen":true,"video":false,"audio":true,"cursor":true}"#;
        let caps: Capabilities = serde_json::from_str(json).unwrap();
        assert!(caps.screen);
        assert!(!caps.video);
        assert!(caps.audio);
    }
}
