//! funkhaus-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den oeffentlichen
//! Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::Result;
use config::ServerConfig;
use funkhaus_signaling::{SignalingServer, SignalingState};
use std::net::SocketAddr;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet das Relay und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. SignalingState aufbauen (Registry, Raeume, Relay, Credentials)
    /// 2. TCP-Listener starten
    /// 3. Auf Ctrl-C warten, dann Shutdown-Signal an alle Verbindungen
    pub async fn starten(self) -> Result<()> {
        let bind_addr: SocketAddr = self.config.tcp_bind_adresse().parse()?;

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %bind_addr,
            raum_max = self.config.raeume.max_clients,
            "Relay startet"
        );

        let state = SignalingState::neu(self.config.signaling_config());
        let signaling = SignalingServer::neu(state, bind_addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        let signaling_task = tokio::spawn(signaling.starten(shutdown_rx));

        tracing::info!("Relay laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Relay wird beendet");

        // Alle Verbindungs-Tasks und den Listener stoppen
        let _ = shutdown_tx.send(true);
        signaling_task.await??;

        Ok(())
    }
}
