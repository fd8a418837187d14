//! Credential-Vergabe – STUN/TURN-Listen fuer neue Verbindungen
//!
//! STUN-Server gehen ungefiltert an jeden Client. TURN-Credentials sind
//! wertvoller (der Server relayt dann Medien-Traffic) und werden nur
//! vergeben wenn entweder keine Origin-Allowlist konfiguriert ist oder
//! der Origin des Clients darin vorkommt.
//!
//! Es werden ausschliesslich statisch konfigurierte Credentials vergeben.
//! `secret`/`expiry` werden in der Konfiguration akzeptiert aber nicht
//! ausgewertet – zeitlich begrenzte Shared-Secret-Credentials
//! (draft-uberti-behave-turn-rest) sind bewusst nicht implementiert.

use funkhaus_protocol::signal::TurnCredential;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Konfigurationstypen
// ---------------------------------------------------------------------------

/// TURN-Server-Eintrag wie er in der Konfiguration steht
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnServerEintrag {
    pub username: String,
    pub credential: String,
    /// URL-Liste; alternativ kann `url` einen einzelnen Eintrag liefern
    pub urls: Vec<String>,
    /// Einzelne URL (Alternative zu `urls`)
    pub url: Option<String>,
    /// Akzeptiert aber ungenutzt (statische Vergabe)
    pub secret: Option<String>,
    /// Akzeptiert aber ungenutzt (statische Vergabe)
    pub expiry: Option<u64>,
}

impl Default for TurnServerEintrag {
    fn default() -> Self {
        Self {
            username: String::new(),
            credential: String::new(),
            urls: Vec::new(),
            url: None,
            secret: None,
            expiry: None,
        }
    }
}

impl TurnServerEintrag {
    /// Effektive URL-Liste: `urls` wenn nicht leer, sonst `url`
    fn effektive_urls(&self) -> Vec<String> {
        if !self.urls.is_empty() {
            self.urls.clone()
        } else {
            self.url.iter().cloned().collect()
        }
    }
}

/// ICE-Konfiguration (STUN/TURN-Server und Origin-Allowlist)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IceConfig {
    /// STUN-Server-URLs, gehen ungefiltert an jeden Client
    pub stunservers: Vec<String>,
    /// TURN-Server mit statischen Credentials
    pub turnservers: Vec<TurnServerEintrag>,
    /// Origin-Allowlist fuer TURN (None = keine Einschraenkung)
    pub turnorigins: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// CredentialVendor
// ---------------------------------------------------------------------------

/// Vergibt STUN/TURN-Credentials anhand der Konfiguration
///
/// Clone teilt die innere Konfiguration.
#[derive(Clone)]
pub struct CredentialVendor {
    config: Arc<IceConfig>,
}

impl CredentialVendor {
    /// Erstellt einen neuen CredentialVendor
    pub fn neu(config: IceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Gibt die konfigurierte STUN-Server-Liste unveraendert zurueck
    pub fn stun_credentials(&self) -> Vec<String> {
        self.config.stunservers.clone()
    }

    /// Gibt die TURN-Credential-Liste fuer einen Origin zurueck
    ///
    /// Volle Liste wenn keine Allowlist konfiguriert ist oder der Origin
    /// darin vorkommt, sonst leer. Ein fehlender Origin matcht nur den
    /// Fall "keine Allowlist".
    pub fn turn_credentials(&self, origin: Option<&str>) -> Vec<TurnCredential> {
        let erlaubt = match &self.config.turnorigins {
            None => true,
            Some(allowlist) => origin.is_some_and(|o| allowlist.iter().any(|a| a == o)),
        };

        if !erlaubt {
            tracing::debug!(?origin, "TURN-Credentials fuer Origin verweigert");
            return Vec::new();
        }

        self.config
            .turnservers
            .iter()
            .map(|server| TurnCredential {
                username: server.username.clone(),
                credential: server.credential.clone(),
                urls: server.effektive_urls(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
