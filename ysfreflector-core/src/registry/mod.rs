mod event;
mod peer;

pub use event::ReflectorEvent;
pub use peer::{PeerRecord, PeerSnapshot};

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant, SystemTime};

use ahash::AHashMap;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::blocklist::Blocklist;
use crate::config::ServerConfig;

const EVENT_CHANNEL_CAPACITY: usize = 1000;

struct ActiveTalker {
    callsign: String,
    started_at: Instant,
    bytes: u64,
}

/// Peer membership and talk-state arbitration.
///
/// Two locks, by design: `peers` (a reader-writer map) and `active_talker`
/// (a narrow mutex) are never held across an event-channel send, so emitting
/// an event can never deadlock against a reader waiting on the map.
pub struct PeerRegistry {
    peers: RwLock<AHashMap<SocketAddr, Arc<PeerRecord>>>,
    active_talker: Mutex<Option<ActiveTalker>>,
    blocklist: Arc<Blocklist>,
    max_connections: usize,
    inactivity_timeout: Duration,
    talk_max_duration: Duration,
    unmute_after: Duration,
    cleanup_interval: Duration,
    silence_gap: Duration,
    events: mpsc::Sender<ReflectorEvent>,
}

impl PeerRegistry {
    pub fn new(
        cfg: &ServerConfig,
        blocklist: Arc<Blocklist>,
    ) -> (Arc<Self>, mpsc::Receiver<ReflectorEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let registry = Arc::new(Self {
            peers: RwLock::new(AHashMap::default()),
            active_talker: Mutex::new(None),
            blocklist,
            max_connections: cfg.max_connections,
            inactivity_timeout: Duration::from_secs(cfg.timeout),
            talk_max_duration: Duration::from_secs(cfg.talk_max_duration),
            unmute_after: Duration::from_secs(cfg.unmute_after),
            cleanup_interval: Duration::from_secs(cfg.cleanup_interval),
            silence_gap: Duration::from_secs(cfg.silence_gap),
            events: tx,
        });
        (registry, rx)
    }

    fn emit(&self, event: ReflectorEvent) {
        if let Err(e) = self.events.try_send(event) {
            warn!(error = %e, "registry event channel full or closed, dropping event");
        }
    }

    /// Canonicalizes `callsign`; rejects on blocklist or capacity. Returns
    /// `(peer, is_new)` on success.
    pub fn add_or_touch(&self, callsign: &str, addr: SocketAddr) -> Option<(Arc<PeerRecord>, bool)> {
        if self.blocklist.is_blocked(callsign) {
            debug!(%callsign, %addr, "rejected: blocklisted");
            return None;
        }

        let now = Instant::now();

        {
            let peers = self.peers.read().expect("peer map lock poisoned");
            if let Some(peer) = peers.get(&addr) {
                peer.touch(now, callsign);
                return Some((peer.clone(), false));
            }
        }

        let mut peers = self.peers.write().expect("peer map lock poisoned");
        if let Some(peer) = peers.get(&addr) {
            peer.touch(now, callsign);
            return Some((peer.clone(), false));
        }
        if peers.len() >= self.max_connections {
            debug!(%callsign, %addr, "rejected: registry at capacity");
            return None;
        }

        let peer = Arc::new(PeerRecord::new(addr, callsign.to_string(), now));
        peers.insert(addr, peer.clone());
        drop(peers);

        self.emit(ReflectorEvent::PeerJoined {
            callsign: peer.callsign(),
            addr,
            timestamp: SystemTime::now(),
        });
        Some((peer, true))
    }

    pub fn get(&self, addr: SocketAddr) -> Option<Arc<PeerRecord>> {
        self.peers.read().expect("peer map lock poisoned").get(&addr).cloned()
    }

    pub fn remove(&self, addr: SocketAddr) -> bool {
        let removed = self.peers.write().expect("peer map lock poisoned").remove(&addr);
        let Some(peer) = removed else { return false };

        let peer_callsign = peer.callsign();
        let mut active = self.active_talker.lock().expect("active talker lock poisoned");
        if active.as_ref().is_some_and(|t| t.callsign == peer_callsign) {
            let talker = active.take().expect("checked above");
            self.emit(ReflectorEvent::TalkEnd {
                callsign: talker.callsign,
                addr,
                timestamp: SystemTime::now(),
                duration: talker.started_at.elapsed(),
            });
        }
        drop(active);

        self.emit(ReflectorEvent::PeerLeft { callsign: peer_callsign, addr, timestamp: SystemTime::now() });
        true
    }

    pub fn all_addresses(&self) -> Vec<SocketAddr> {
        self.peers.read().expect("peer map lock poisoned").keys().copied().collect()
    }

    pub fn count(&self) -> usize {
        self.peers.read().expect("peer map lock poisoned").len()
    }

    pub fn is_blocked(&self, callsign: &str) -> bool {
        self.blocklist.is_blocked(callsign)
    }

    /// Updates rx counters and, for `YSFD` traffic, drives the talk-state
    /// machine. `callsign` must already be canonical.
    pub fn process_packet(
        &self,
        callsign: &str,
        addr: SocketAddr,
        packet_type: crate::wire::PacketType,
        size: usize,
    ) {
        let now = Instant::now();
        let Some(peer) = self.get(addr) else { return };
        peer.record_rx(now, callsign, size);

        if packet_type == crate::wire::PacketType::Data {
            self.on_data_packet(&peer, callsign, now, size);
        }
    }

    /// Arbitrates the talk floor off the packet's own (live) source
    /// callsign. A packet from a peer other than the current active talker
    /// is dropped unless the floor is free or the active talker has gone
    /// silent for at least `silence_gap`.
    fn on_data_packet(&self, peer: &Arc<PeerRecord>, callsign: &str, now: Instant, size: usize) {
        if peer.is_muted(now) {
            return;
        }

        let mut active = self.active_talker.lock().expect("active talker lock poisoned");
        match active.as_mut() {
            None => {
                *active = Some(ActiveTalker {
                    callsign: callsign.to_string(),
                    started_at: now,
                    bytes: size as u64,
                });
                drop(active);
                self.emit(ReflectorEvent::TalkStart {
                    callsign: callsign.to_string(),
                    addr: peer.addr,
                    timestamp: SystemTime::now(),
                });
            }
            Some(talker) if talker.callsign == callsign => {
                let elapsed = talker.started_at.elapsed();
                if elapsed > self.talk_max_duration {
                    let talker = active.take().expect("checked above");
                    drop(active);
                    peer.mute_until(now + self.unmute_after);
                    self.emit(ReflectorEvent::TalkEnd {
                        callsign: talker.callsign,
                        addr: peer.addr,
                        timestamp: SystemTime::now(),
                        duration: elapsed,
                    });
                } else {
                    talker.bytes += size as u64;
                }
            }
            Some(talker) => {
                let active_peer = self.get_by_callsign(&talker.callsign);
                let gone_silent = active_peer
                    .as_ref()
                    .map(|p| now.duration_since(p.last_heard()) >= self.silence_gap)
                    .unwrap_or(true);
                if !gone_silent {
                    // A different peer still holds the floor; drop silently.
                    return;
                }

                let previous = active.take().expect("checked above");
                let previous_addr = active_peer.map_or(peer.addr, |p| p.addr);
                *active = Some(ActiveTalker {
                    callsign: callsign.to_string(),
                    started_at: now,
                    bytes: size as u64,
                });
                drop(active);
                self.emit(ReflectorEvent::TalkEnd {
                    callsign: previous.callsign,
                    addr: previous_addr,
                    timestamp: SystemTime::now(),
                    duration: previous.started_at.elapsed(),
                });
                self.emit(ReflectorEvent::TalkStart {
                    callsign: callsign.to_string(),
                    addr: peer.addr,
                    timestamp: SystemTime::now(),
                });
            }
        }
    }

    /// Increments tx counters unless `addr` is currently muted.
    pub fn process_transmit(&self, addr: SocketAddr, size: usize) {
        if let Some(peer) = self.get(addr) {
            if !peer.is_muted(Instant::now()) {
                peer.record_tx(size);
            }
        }
    }

    /// Background eviction and silence-gap sweep. Exits cooperatively within
    /// one `cleanup_interval` tick of `shutdown` being signalled.
    pub async fn start_cleanup(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.cleanup_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_cleanup_pass(),
                res = shutdown.changed() => {
                    if res.is_ok() && *shutdown.borrow() {
                        info!("peer registry cleanup loop stopping");
                        break;
                    }
                }
            }
        }
    }

    fn run_cleanup_pass(&self) {
        let now = Instant::now();

        let stale: Vec<SocketAddr> = {
            let peers = self.peers.read().expect("peer map lock poisoned");
            peers
                .values()
                .filter(|p| now.duration_since(p.last_heard()) > self.inactivity_timeout)
                .map(|p| p.addr)
                .collect()
        };
        for addr in stale {
            info!(%addr, "evicting inactive peer");
            self.remove(addr);
        }

        let silent_talker = {
            let active = self.active_talker.lock().expect("active talker lock poisoned");
            active.as_ref().and_then(|talker| {
                let peer = self.get_by_callsign(&talker.callsign)?;
                if now.duration_since(peer.last_heard()) > self.silence_gap {
                    Some((talker.callsign.clone(), talker.started_at, peer.addr))
                } else {
                    None
                }
            })
        };
        if let Some((callsign, started_at, addr)) = silent_talker {
            let mut active = self.active_talker.lock().expect("active talker lock poisoned");
            if active.as_ref().is_some_and(|t| t.callsign == callsign) {
                active.take();
                drop(active);
                self.emit(ReflectorEvent::TalkEnd {
                    callsign,
                    addr,
                    timestamp: SystemTime::now(),
                    duration: started_at.elapsed(),
                });
            }
        }
    }

    fn get_by_callsign(&self, callsign: &str) -> Option<Arc<PeerRecord>> {
        self.peers.read().expect("peer map lock poisoned").values().find(|p| p.callsign() == callsign).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::PacketType;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "0.0.0.0".into(),
            port: 42000,
            name: "TEST".into(),
            description: String::new(),
            max_connections: 2,
            timeout: 5,
            talk_max_duration: 3600,
            unmute_after: 10,
            cleanup_interval: 1,
            silence_gap: 2,
        }
    }

    #[test]
    fn rejects_blocklisted_callsigns() {
        let blocklist = Arc::new(Blocklist::from_callsigns(["KF8S"]));
        let (registry, _rx) = PeerRegistry::new(&test_config(), blocklist);
        assert!(registry.add_or_touch("KF8S", addr(1)).is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn enforces_capacity() {
        let (registry, _rx) = PeerRegistry::new(&test_config(), Arc::new(Blocklist::new()));
        assert!(registry.add_or_touch("W1AW", addr(1)).is_some());
        assert!(registry.add_or_touch("W2AW", addr(2)).is_some());
        assert!(registry.add_or_touch("W3AW", addr(3)).is_none());
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn touching_an_existing_peer_does_not_create_a_new_one() {
        let (registry, _rx) = PeerRegistry::new(&test_config(), Arc::new(Blocklist::new()));
        let (_, is_new) = registry.add_or_touch("W1AW", addr(1)).unwrap();
        assert!(is_new);
        let (_, is_new) = registry.add_or_touch("W1AW", addr(1)).unwrap();
        assert!(!is_new);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn only_one_talker_holds_the_floor() {
        let (registry, mut rx) = PeerRegistry::new(&test_config(), Arc::new(Blocklist::new()));
        registry.add_or_touch("AAAA", addr(1)).unwrap();
        registry.add_or_touch("BBBB", addr(2)).unwrap();

        registry.process_packet("AAAA", addr(1), PacketType::Data, 155);
        registry.process_packet("BBBB", addr(2), PacketType::Data, 155);

        assert!(matches!(rx.try_recv().unwrap(), ReflectorEvent::PeerJoined { .. }));
        assert!(matches!(rx.try_recv().unwrap(), ReflectorEvent::PeerJoined { .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ReflectorEvent::TalkStart { ref callsign, .. } if callsign == "AAAA"
        ));
        assert!(rx.try_recv().is_err(), "B's packet should not have produced a TalkStart");
    }

    #[test]
    fn remove_clears_an_active_talker() {
        let (registry, mut rx) = PeerRegistry::new(&test_config(), Arc::new(Blocklist::new()));
        registry.add_or_touch("AAAA", addr(1)).unwrap();
        registry.process_packet("AAAA", addr(1), PacketType::Data, 155);
        registry.remove(addr(1));

        let mut saw_talk_end = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, ReflectorEvent::TalkEnd { .. }) {
                saw_talk_end = true;
            }
        }
        assert!(saw_talk_end);
    }

    #[test]
    fn new_talker_accepted_after_silence_gap_elapses() {
        let mut cfg = test_config();
        cfg.silence_gap = 1;
        let (registry, mut rx) = PeerRegistry::new(&cfg, Arc::new(Blocklist::new()));
        registry.add_or_touch("AAAA", addr(1)).unwrap();
        registry.add_or_touch("BBBB", addr(2)).unwrap();

        registry.process_packet("AAAA", addr(1), PacketType::Data, 155);
        std::thread::sleep(Duration::from_millis(1100));
        registry.process_packet("BBBB", addr(2), PacketType::Data, 155);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        let saw_a_end = events
            .iter()
            .any(|e| matches!(e, ReflectorEvent::TalkEnd { callsign, .. } if callsign == "AAAA"));
        let saw_b_start = events
            .iter()
            .any(|e| matches!(e, ReflectorEvent::TalkStart { callsign, .. } if callsign == "BBBB"));
        assert!(saw_a_end, "expected A's stale talk state to end once silence_gap elapsed");
        assert!(saw_b_start, "expected B to take the floor after A went silent");
    }
}
