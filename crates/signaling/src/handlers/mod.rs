//! Handler fuer alle Signalisierungs-Nachrichten
//!
//! Jeder Handler ist fuer einen bestimmten Nachrichtentyp zustaendig
//! und hat Zugriff auf den gemeinsamen SignalingState.

pub mod capability_handler;
pub mod credential_handler;
pub mod relay_handler;
pub mod room_handler;
