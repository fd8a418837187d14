//! Fehlertypen fuer den Signaling-Kern
//!
//! Fehler sind hier bewusst eng geschnitten: Join und Create haben
//! eigene Enums, weil ihre Fehlerfaelle ueber den jeweiligen Antwort-
//! Kanal an den Client gehen. Kein Fehler in diesem Kern ist fatal
//! fuer den Prozess.

use thiserror::Error;

/// Fehler beim Raum-Beitritt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Raum-Name ist nicht wohlgeformt (leer). Die Anfrage wird ohne
    /// Antwort verworfen – es gibt keine Fehler-Response.
    #[error("Ungueltiger Raum-Name")]
    UngueltigerName,

    /// Raum hat die konfigurierte Mitgliedergrenze erreicht
    #[error("Raum ist voll")]
    Voll,
}

/// Fehler beim Erstellen eines Raums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreateError {
    /// Ein Raum dieses Namens hat bereits mindestens ein Mitglied
    #[error("Raum-Name bereits vergeben")]
    Vergeben,
}
