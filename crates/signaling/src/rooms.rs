//! Raum-Verzeichnis – Raum-Namen auf Mitglieder-Mengen abbilden
//!
//! Das `RoomDirectory` ist der einzige Ort an dem Mitgliedschaft und das
//! `room`-Feld der Registry gemeinsam mutiert werden. Join erzwingt erst
//! das Verlassen eines anderen frueheren Raums, damit eine Verbindung nie
//! in zwei Raeumen gleichzeitig gezaehlt wird.
//!
//! ## Kritischer Abschnitt
//! Die Kapazitaetspruefung-dann-Einfuegen-Sequenz in `beitreten` ist die
//! einzige Operation die Ausschluss braucht: zwei Verbindungen die um den
//! letzten Platz eines Raums rennen duerfen nicht beide gewinnen. Ein
//! einzelner Mutex ueber das gesamte Verzeichnis serialisiert alle
//! Join/Leave/Create-Mutationen; alle Operationen darin sind rein
//! in-memory und damit kurz.
//!
//! Raeume sind ephemer: sie entstehen implizit beim ersten Beitritt und
//! werden sofort entfernt sobald das letzte Mitglied geht – leere
//! Eintraege ueberleben keine Mutation.

use funkhaus_core::{CapabilityKind, ConnectionId, RoomName};
use funkhaus_protocol::signal::PresenceSnapshot;
use funkhaus_protocol::SignalMessage;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::error::{CreateError, JoinError};
use crate::presence;
use crate::registry::ConnectionRegistry;

// ---------------------------------------------------------------------------
// RemovalScope
// ---------------------------------------------------------------------------

/// Umfang einer Entfernung beim Verlassen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalScope {
    /// Raum komplett verlassen: Mitgliedschaft und `room`-Feld werden
    /// geloescht, die verbleibenden Mitglieder bekommen ein
    /// `remove`-Event ohne Untertyp.
    Vollstaendig,
    /// Nur ein Feed endet (z.B. Screen-Share): der Raum bekommt ein
    /// `remove`-Event mit Untertyp, die Mitgliedschaft bleibt bestehen.
    Feed(CapabilityKind),
}

// ---------------------------------------------------------------------------
// RoomDirectory
// ---------------------------------------------------------------------------

/// Verzeichnis aller Raeume mit Kapazitaetsgrenze
///
/// Thread-safe via Arc. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct RoomDirectory {
    inner: Arc<RoomDirectoryInner>,
}

struct RoomDirectoryInner {
    registry: ConnectionRegistry,
    broadcaster: Broadcaster,
    /// Maximale Mitglieder pro Raum (0 = unbegrenzt)
    max_mitglieder: u32,
    /// Raum -> Mitglieder. Eintraege mit leerer Menge werden sofort
    /// entfernt, nie aufbewahrt.
    raeume: Mutex<HashMap<RoomName, HashSet<ConnectionId>>>,
}

impl RoomDirectory {
    /// Erstellt ein neues RoomDirectory
    pub fn neu(registry: ConnectionRegistry, broadcaster: Broadcaster, max_mitglieder: u32) -> Self {
        Self {
            inner: Arc::new(RoomDirectoryInner {
                registry,
                broadcaster,
                max_mitglieder,
                raeume: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Tritt einem Raum bei
    ///
    /// Ablauf als ein kritischer Abschnitt:
    /// 1. Namens-Validierung (leer = `UngueltigerName`, der Aufrufer
    ///    verwirft die Anfrage dann ohne Antwort)
    /// 2. Erzwungenes vollstaendiges Verlassen eines *anderen*
    ///    frueheren Raums (inklusive Remove-Broadcast) – Join ersetzt
    ///    jede abweichende vorherige Mitgliedschaft; die Mitgliedschaft
    ///    im Zielraum selbst bleibt unangetastet
    /// 3. Kapazitaetspruefung – bei `Voll` bleibt der Zielraum
    ///    unveraendert; das Verlassen aus Schritt 2 wird NICHT
    ///    rueckgaengig gemacht
    /// 4. Einfuegen, `room`-Feld setzen, Praesenz nach dem Beitritt
    ///    zurueckgeben
    pub fn beitreten(
        &self,
        id: ConnectionId,
        name: &RoomName,
    ) -> Result<PresenceSnapshot, JoinError> {
        if !name.ist_gueltig() {
            tracing::debug!(connection_id = %id, "Join mit leerem Raum-Namen verworfen");
            return Err(JoinError::UngueltigerName);
        }

        let mut raeume = self.inner.raeume.lock();
        self.beitreten_gesperrt(&mut raeume, id, name)
    }

    /// Erstellt einen Raum und tritt ihm bei
    ///
    /// Ohne Wunsch-Namen (oder mit leerem) wird ein frischer, global
    /// eindeutiger Name generiert. Hat ein Raum dieses Namens bereits
    /// mindestens ein Mitglied, schlaegt die Erstellung mit `Vergeben`
    /// fehl ohne dass beigetreten wird.
    pub fn erstellen(
        &self,
        id: ConnectionId,
        wunsch: Option<String>,
    ) -> Result<(RoomName, PresenceSnapshot), CreateError> {
        let name = match wunsch {
            Some(n) if !n.is_empty() => RoomName::from(n),
            _ => RoomName::generieren(),
        };

        let mut raeume = self.inner.raeume.lock();
        if raeume.get(&name).is_some_and(|m| !m.is_empty()) {
            tracing::debug!(connection_id = %id, raum = %name, "Raum-Name bereits vergeben");
            return Err(CreateError::Vergeben);
        }

        // Der Zielraum ist leer, die Kapazitaetspruefung kann hier nicht
        // fehlschlagen
        let snapshot = self
            .beitreten_gesperrt(&mut raeume, id, &name)
            .unwrap_or_default();
        Ok((name, snapshot))
    }

    /// Entfernt eine Verbindung (oder einen ihrer Feeds) aus ihrem Raum
    ///
    /// No-op wenn die Verbindung in keinem Raum ist.
    pub fn verlassen(&self, id: ConnectionId, umfang: RemovalScope) {
        let mut raeume = self.inner.raeume.lock();
        match umfang {
            RemovalScope::Vollstaendig => {
                self.vollstaendig_entfernen_gesperrt(&mut raeume, id);
            }
            RemovalScope::Feed(kind) => {
                let Some(raum) = self.inner.registry.raum_von(&id) else {
                    return;
                };
                // Mitgliedschaft bleibt bestehen, nur der Feed endet –
                // das Event geht an den ganzen Raum, den Verursacher
                // eingeschlossen
                let empfaenger = mitglieder_gesperrt(&raeume, &raum);
                self.inner
                    .broadcaster
                    .an_viele_senden(&empfaenger, &SignalMessage::remove(id, Some(kind)));
                tracing::debug!(connection_id = %id, raum = %raum, ?kind, "Feed entfernt");
            }
        }
    }

    /// Gibt die aktuelle Mitgliederzahl eines Raums zurueck (0 wenn der
    /// Raum nicht existiert)
    pub fn mitglieder_anzahl(&self, name: &RoomName) -> usize {
        self.inner
            .raeume
            .lock()
            .get(name)
            .map_or(0, HashSet::len)
    }

    /// Gibt alle Mitglieder eines Raums zurueck
    pub fn mitglieder(&self, name: &RoomName) -> Vec<ConnectionId> {
        mitglieder_gesperrt(&self.inner.raeume.lock(), name)
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden (Aufrufer haelt den Verzeichnis-Mutex)
    // -----------------------------------------------------------------------

    fn beitreten_gesperrt(
        &self,
        raeume: &mut HashMap<RoomName, HashSet<ConnectionId>>,
        id: ConnectionId,
        name: &RoomName,
    ) -> Result<PresenceSnapshot, JoinError> {
        // Erzwungenes Verlassen nur bei einem *anderen* frueheren Raum.
        // Ein Re-Join des eigenen Raums darf weder einen Platz freigeben
        // noch ein Remove-Event fuer ein weiterhin anwesendes Mitglied
        // ausloesen.
        if self.inner.registry.raum_von(&id).as_ref() != Some(name) {
            self.vollstaendig_entfernen_gesperrt(raeume, id);
        }

        // Kapazitaetspruefung vor dem Einfuegen
        let belegt = raeume.get(name).map_or(0, HashSet::len);
        let max = self.inner.max_mitglieder as usize;
        if max > 0 && belegt >= max {
            tracing::debug!(connection_id = %id, raum = %name, belegt, max, "Raum voll");
            return Err(JoinError::Voll);
        }

        raeume.entry(name.clone()).or_default().insert(id);
        self.inner.registry.raum_setzen(&id, Some(name.clone()));
        tracing::debug!(connection_id = %id, raum = %name, "Raum beigetreten");

        Ok(raeume
            .get(name)
            .map(|m| presence::sammeln(m.iter().copied(), &self.inner.registry))
            .unwrap_or_default())
    }

    fn vollstaendig_entfernen_gesperrt(
        &self,
        raeume: &mut HashMap<RoomName, HashSet<ConnectionId>>,
        id: ConnectionId,
    ) {
        let Some(raum) = self.inner.registry.raum_von(&id) else {
            return;
        };

        if let Some(mitglieder) = raeume.get_mut(&raum) {
            mitglieder.remove(&id);
            if mitglieder.is_empty() {
                raeume.remove(&raum);
                tracing::debug!(raum = %raum, "Leerer Raum entfernt");
            }
        }
        self.inner.registry.raum_setzen(&id, None);

        // Remove-Event ohne Untertyp an die verbleibenden Mitglieder
        let verbleibend = mitglieder_gesperrt(raeume, &raum);
        self.inner
            .broadcaster
            .an_viele_senden(&verbleibend, &SignalMessage::remove(id, None));
        tracing::debug!(connection_id = %id, raum = %raum, "Raum verlassen");
    }
}

fn mitglieder_gesperrt(
    raeume: &HashMap<RoomName, HashSet<ConnectionId>>,
    name: &RoomName,
) -> Vec<ConnectionId> {
    raeume
        .get(name)
        .map(|m| m.iter().copied().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use funkhaus_protocol::SignalPayload;
    use tokio::sync::mpsc;

    struct Aufbau {
        registry: ConnectionRegistry,
        broadcaster: Broadcaster,
        raeume: RoomDirectory,
    }

    fn aufbau(max_mitglieder: u32) -> Aufbau {
        let registry = ConnectionRegistry::neu();
        let broadcaster = Broadcaster::neu();
        let raeume = RoomDirectory::neu(registry.clone(), broadcaster.clone(), max_mitglieder);
        Aufbau {
            registry,
            broadcaster,
            raeume,
        }
    }

    /// Registriert eine Verbindung samt Broadcaster-Queue
    fn verbinden(a: &Aufbau) -> (ConnectionId, mpsc::Receiver<SignalMessage>) {
        let id = a.registry.registrieren();
        let rx = a.broadcaster.registrieren(id);
        (id, rx)
    }

    fn ist_remove_ohne_kind(msg: &SignalMessage, id: ConnectionId) -> bool {
        matches!(&msg.payload, SignalPayload::Remove(ev) if ev.id == id && ev.kind.is_none())
    }

    #[tokio::test]
    async fn beitreten_setzt_room_feld_und_mitgliedschaft() {
        let a = aufbau(0);
        let (id, _rx) = verbinden(&a);
        let raum = RoomName::from("lobby");

        let snapshot = a.raeume.beitreten(id, &raum).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.members.contains_key(&id));
        assert_eq!(a.registry.raum_von(&id), Some(raum.clone()));
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 1);
    }

    #[tokio::test]
    async fn leerer_name_wird_abgelehnt() {
        let a = aufbau(0);
        let (id, _rx) = verbinden(&a);

        let resultat = a.raeume.beitreten(id, &RoomName::from(""));
        assert_eq!(resultat.unwrap_err(), JoinError::UngueltigerName);
        assert_eq!(a.registry.raum_von(&id), None);
    }

    #[tokio::test]
    async fn voller_raum_lehnt_beitritt_ab_und_bleibt_unveraendert() {
        let a = aufbau(2);
        let raum = RoomName::from("eng");

        let (id1, _rx1) = verbinden(&a);
        let (id2, _rx2) = verbinden(&a);
        let (id3, _rx3) = verbinden(&a);

        a.raeume.beitreten(id1, &raum).unwrap();
        a.raeume.beitreten(id2, &raum).unwrap();

        let resultat = a.raeume.beitreten(id3, &raum);
        assert_eq!(resultat.unwrap_err(), JoinError::Voll);
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 2);
        assert_eq!(a.registry.raum_von(&id3), None, "room-Feld bleibt leer");
    }

    #[tokio::test]
    async fn rejoin_des_eigenen_vollen_raums_gibt_voll_ohne_mutation() {
        let a = aufbau(2);
        let raum = RoomName::from("eng");

        let (id1, _rx1) = verbinden(&a);
        let (id2, mut rx2) = verbinden(&a);

        a.raeume.beitreten(id1, &raum).unwrap();
        a.raeume.beitreten(id2, &raum).unwrap();

        // id1 ist bereits Mitglied – der Re-Join darf keinen Platz
        // freigeben und dann wieder belegen
        let resultat = a.raeume.beitreten(id1, &raum);
        assert_eq!(resultat.unwrap_err(), JoinError::Voll);

        // Mitgliedschaft und room-Feld unveraendert, kein Remove-Event
        // fuer das weiterhin anwesende Mitglied
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 2);
        assert_eq!(a.registry.raum_von(&id1), Some(raum.clone()));
        assert!(rx2.try_recv().is_err(), "kein Remove-Event fuer Anwesende");
    }

    #[tokio::test]
    async fn rejoin_des_eigenen_raums_ist_idempotent() {
        let a = aufbau(0);
        let raum = RoomName::from("lobby");

        let (id1, _rx1) = verbinden(&a);
        let (id2, mut rx2) = verbinden(&a);

        a.raeume.beitreten(id1, &raum).unwrap();
        a.raeume.beitreten(id2, &raum).unwrap();

        let snapshot = a.raeume.beitreten(id1, &raum).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 2);
        assert!(rx2.try_recv().is_err(), "kein Remove-Event beim Re-Join");
    }

    #[tokio::test]
    async fn voller_zielraum_macht_vorheriges_verlassen_nicht_rueckgaengig() {
        let a = aufbau(1);
        let alt = RoomName::from("alt");
        let eng = RoomName::from("eng");

        let (id1, _rx1) = verbinden(&a);
        let (id2, _rx2) = verbinden(&a);

        a.raeume.beitreten(id1, &eng).unwrap();
        a.raeume.beitreten(id2, &alt).unwrap();

        // id2 scheitert am vollen Zielraum, hat "alt" aber bereits verlassen
        assert_eq!(a.raeume.beitreten(id2, &eng).unwrap_err(), JoinError::Voll);
        assert_eq!(a.registry.raum_von(&id2), None);
        assert_eq!(a.raeume.mitglieder_anzahl(&alt), 0);
        assert_eq!(a.raeume.mitglieder_anzahl(&eng), 1);
    }

    #[tokio::test]
    async fn join_wechselt_raum_und_entfernt_leeren_raum() {
        let a = aufbau(0);
        let (id, _rx) = verbinden(&a);
        let raum_a = RoomName::from("A");
        let raum_b = RoomName::from("B");

        a.raeume.beitreten(id, &raum_a).unwrap();
        a.raeume.beitreten(id, &raum_b).unwrap();

        assert_eq!(a.registry.raum_von(&id), Some(raum_b.clone()));
        assert_eq!(a.raeume.mitglieder_anzahl(&raum_b), 1);
        // "A" hatte nur dieses Mitglied und existiert nicht mehr
        assert_eq!(a.raeume.mitglieder_anzahl(&raum_a), 0);
        assert!(a.raeume.mitglieder(&raum_a).is_empty());
    }

    #[tokio::test]
    async fn raumwechsel_sendet_remove_an_verbleibende() {
        let a = aufbau(0);
        let (id1, _rx1) = verbinden(&a);
        let (id2, mut rx2) = verbinden(&a);
        let raum_a = RoomName::from("A");
        let raum_b = RoomName::from("B");

        a.raeume.beitreten(id1, &raum_a).unwrap();
        a.raeume.beitreten(id2, &raum_a).unwrap();
        a.raeume.beitreten(id1, &raum_b).unwrap();

        let event = rx2.try_recv().expect("id2 muss ein Remove-Event sehen");
        assert!(ist_remove_ohne_kind(&event, id1));
        assert!(rx2.try_recv().is_err(), "genau ein Event");
    }

    #[tokio::test]
    async fn erstellen_mit_wunschnamen() {
        let a = aufbau(0);
        let (id, _rx) = verbinden(&a);

        let (name, snapshot) = a.raeume.erstellen(id, Some("X".into())).unwrap();
        assert_eq!(name, RoomName::from("X"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(a.registry.raum_von(&id), Some(name));
    }

    #[tokio::test]
    async fn erstellen_vergebener_name_schlaegt_fehl_ohne_beitritt() {
        let a = aufbau(0);
        let (id1, _rx1) = verbinden(&a);
        let (id2, _rx2) = verbinden(&a);

        a.raeume.erstellen(id1, Some("X".into())).unwrap();
        let resultat = a.raeume.erstellen(id2, Some("X".into()));

        assert_eq!(resultat.unwrap_err(), CreateError::Vergeben);
        assert_eq!(a.registry.raum_von(&id2), None, "id2 tritt nicht bei");
        assert_eq!(a.raeume.mitglieder_anzahl(&RoomName::from("X")), 1);
    }

    #[tokio::test]
    async fn erstellen_ohne_namen_generiert_frischen() {
        let a = aufbau(0);
        let (id1, _rx1) = verbinden(&a);
        let (id2, _rx2) = verbinden(&a);

        let (name1, _) = a.raeume.erstellen(id1, None).unwrap();
        let (name2, _) = a.raeume.erstellen(id2, None).unwrap();

        assert_ne!(name1, name2);
        assert!(name1.ist_gueltig());
        // Leerer Wunsch-Name zaehlt wie keiner
        let (id3, _rx3) = verbinden(&a);
        let (name3, _) = a.raeume.erstellen(id3, Some(String::new())).unwrap();
        assert!(name3.ist_gueltig());
    }

    #[tokio::test]
    async fn vollstaendiges_verlassen_broadcastet_und_raeumt_auf() {
        let a = aufbau(0);
        let (id1, _rx1) = verbinden(&a);
        let (id2, mut rx2) = verbinden(&a);
        let raum = RoomName::from("lobby");

        a.raeume.beitreten(id1, &raum).unwrap();
        a.raeume.beitreten(id2, &raum).unwrap();
        // id2 hat das Join-Remove von id1 nicht gesehen (id1 war zuerst da)
        assert!(rx2.try_recv().is_err());

        a.raeume.verlassen(id1, RemovalScope::Vollstaendig);

        let event = rx2.try_recv().expect("Remove-Event erwartet");
        assert!(ist_remove_ohne_kind(&event, id1));
        assert_eq!(a.registry.raum_von(&id1), None);
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 1);
    }

    #[tokio::test]
    async fn feed_entfernung_behaelt_mitgliedschaft() {
        let a = aufbau(0);
        let (id1, mut rx1) = verbinden(&a);
        let (id2, mut rx2) = verbinden(&a);
        let raum = RoomName::from("lobby");

        a.raeume.beitreten(id1, &raum).unwrap();
        a.raeume.beitreten(id2, &raum).unwrap();

        a.raeume
            .verlassen(id1, RemovalScope::Feed(CapabilityKind::Screen));

        // Beide sehen das Feed-Event, auch der Verursacher
        for rx in [&mut rx1, &mut rx2] {
            let event = rx.try_recv().expect("Feed-Remove erwartet");
            match &event.payload {
                SignalPayload::Remove(ev) => {
                    assert_eq!(ev.id, id1);
                    assert_eq!(ev.kind, Some(CapabilityKind::Screen));
                }
                andere => panic!("Erwartet Remove, erhalten: {andere:?}"),
            }
        }

        // Mitgliedschaft und room-Feld unveraendert
        assert_eq!(a.registry.raum_von(&id1), Some(raum.clone()));
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 2);
    }

    #[tokio::test]
    async fn verlassen_ohne_raum_ist_no_op() {
        let a = aufbau(0);
        let (id, mut rx) = verbinden(&a);

        a.raeume.verlassen(id, RemovalScope::Vollstaendig);
        a.raeume
            .verlassen(id, RemovalScope::Feed(CapabilityKind::Screen));

        assert!(rx.try_recv().is_err(), "keine Events ohne Raum");
    }

    #[tokio::test]
    async fn unbegrenzte_kapazitaet_bei_null() {
        let a = aufbau(0);
        let raum = RoomName::from("gross");

        for _ in 0..50 {
            let (id, _rx) = verbinden(&a);
            a.raeume.beitreten(id, &raum).unwrap();
        }
        assert_eq!(a.raeume.mitglieder_anzahl(&raum), 50);
    }
}
