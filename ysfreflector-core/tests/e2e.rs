#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{sleep, timeout};

use ysfreflector_core::bridge::{
    CallType, CrossModeBridge, DmrNetwork, DmrPacket, DmrVoiceData, SocketOwnership,
};
use ysfreflector_core::config::{BridgeConfig, ServerConfig};
use ysfreflector_core::{Blocklist, PeerRegistry, ReflectorError, Result, UdpServer};

fn server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        name: "E2E-TEST".into(),
        description: "E2E Description".into(),
        max_connections: 8,
        timeout: 5,
        talk_max_duration: 3600,
        unmute_after: 10,
        cleanup_interval: 1,
        silence_gap: 2,
    }
}

async fn spawn_reflector(
    blocklist: Arc<Blocklist>,
    bridge: Option<Arc<CrossModeBridge>>,
) -> (SocketAddr, watch::Sender<bool>) {
    let server = Arc::new(UdpServer::bind("127.0.0.1:0".parse().unwrap()).await.unwrap());
    let addr = server.local_addr().unwrap();
    let (registry, _events) = PeerRegistry::new(&server_config(), blocklist);

    let collaborator = bridge
        .clone()
        .map(|b| b as Arc<dyn ysfreflector_core::BridgeCollaborator>);
    let reflector = Arc::new(ysfreflector_core::Reflector::new(
        server.clone(),
        registry.clone(),
        collaborator,
        "E2E-TEST".into(),
        "E2E Description".into(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn({
        let server = server.clone();
        let reflector = reflector.clone() as Arc<dyn ysfreflector_core::PacketHandler>;
        let shutdown_rx = shutdown_rx.clone();
        async move {
            let _ = server.run(reflector, shutdown_rx).await;
        }
    });

    if let Some(bridge) = bridge {
        tokio::spawn(bridge.clone().run_dmr_reader(shutdown_rx.clone()));
        tokio::spawn(bridge.run_hang_time_monitor(shutdown_rx.clone()));
    }

    sleep(Duration::from_millis(20)).await;
    (addr, shutdown_tx)
}

#[tokio::test]
async fn poll_response_matches_scenario_one() {
    let (addr, _shutdown) = spawn_reflector(Arc::new(Blocklist::new()), None).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut poll = Vec::from(*b"YSFP");
    poll.extend_from_slice(b"TEST      ");
    client.send_to(&poll, addr).await.unwrap();

    let mut buf = [0u8; 64];
    let (n, _) = timeout(Duration::from_secs(1), client.recv_from(&mut buf)).await.unwrap().unwrap();
    assert_eq!(n, 14);
    assert_eq!(&buf[0..4], b"YSFP");
    assert_eq!(&buf[4..14], b"REFLECTOR ");
}

#[tokio::test]
async fn status_probe_matches_scenario_two() {
    let (addr, _shutdown) = spawn_reflector(Arc::new(Blocklist::new()), None).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    // register one peer first so the status count is 1
    let mut poll = Vec::from(*b"YSFP");
    poll.extend_from_slice(b"TEST      ");
    client.send_to(&poll, addr).await.unwrap();
    let mut buf = [0u8; 64];
    client.recv_from(&mut buf).await.unwrap();

    client.send_to(b"YSFS", addr).await.unwrap();
    let (n, _) = timeout(Duration::from_secs(1), client.recv_from(&mut buf)).await.unwrap().unwrap();
    assert_eq!(n, 42);
    assert_eq!(&buf[0..4], b"YSFS");
    assert_eq!(&buf[9..25], b"E2E-TEST        ");
    assert_eq!(&buf[25..39], b"E2E Descriptio");
    assert_eq!(&buf[39..42], b"001");
}

async fn register_peer(server_addr: SocketAddr, callsign: &str) -> UdpSocket {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut poll = Vec::from(*b"YSFP");
    poll.extend_from_slice(format!("{callsign:<10}").as_bytes());
    client.send_to(&poll, server_addr).await.unwrap();
    let mut buf = [0u8; 64];
    timeout(Duration::from_secs(1), client.recv_from(&mut buf)).await.unwrap().unwrap();
    client
}

#[tokio::test]
async fn broadcast_excludes_the_source() {
    let (addr, _shutdown) = spawn_reflector(Arc::new(Blocklist::new()), None).await;

    let a = register_peer(addr, "AAAA").await;
    let b = register_peer(addr, "BBBB").await;
    let c = register_peer(addr, "CCCC").await;

    let mut data = vec![0u8; 155];
    data[0..4].copy_from_slice(b"YSFD");
    data[4..14].copy_from_slice(b"GATEWAY   ");
    data[14..24].copy_from_slice(b"AAAA      ");
    data[24..34].copy_from_slice(b"ALL       ");
    a.send_to(&data, addr).await.unwrap();

    let mut buf_b = [0u8; 256];
    let (n_b, _) = timeout(Duration::from_secs(1), b.recv_from(&mut buf_b)).await.unwrap().unwrap();
    let mut buf_c = [0u8; 256];
    let (n_c, _) = timeout(Duration::from_secs(1), c.recv_from(&mut buf_c)).await.unwrap().unwrap();

    assert_eq!(&buf_b[..n_b], &data[..]);
    assert_eq!(&buf_c[..n_c], &data[..]);

    // A must not receive its own transmission.
    a.send_to(b"YSFS", addr).await.unwrap(); // nudge so a has something pending if it were to receive data too
    let mut probe = [0u8; 4];
    let result = timeout(Duration::from_millis(200), a.recv_from(&mut probe)).await;
    if let Ok(Ok((n, _))) = result {
        assert_eq!(&probe[..n], b"YSFS", "A should only see its own status reply, never the broadcast");
    }
}

#[tokio::test]
async fn blocklisted_poll_is_rejected() {
    let blocklist = Arc::new(Blocklist::from_callsigns(["KF8S"]));
    let (addr, _shutdown) = spawn_reflector(blocklist, None).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut poll = Vec::from(*b"YSFP");
    poll.extend_from_slice(b"KF8S-DAVE ");
    client.send_to(&poll, addr).await.unwrap();

    let mut buf = [0u8; 64];
    let result = timeout(Duration::from_millis(300), client.recv_from(&mut buf)).await;
    assert!(result.is_err(), "a blocklisted poll must not receive a response");
}

struct FakeDmrNetwork {
    incoming: Mutex<mpsc::Receiver<DmrPacket>>,
    next_stream_id: AtomicU32,
}

impl FakeDmrNetwork {
    fn new(incoming: mpsc::Receiver<DmrPacket>) -> Self {
        Self { incoming: Mutex::new(incoming), next_stream_id: AtomicU32::new(1) }
    }
}

#[async_trait::async_trait]
impl DmrNetwork for FakeDmrNetwork {
    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    fn get_stream_id(&self) -> u32 {
        self.next_stream_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn send_voice_header(
        &self,
        _src_id: u32,
        _dst_id: u32,
        _slot: u8,
        _call_type: CallType,
        _stream_id: u32,
    ) -> Result<()> {
        Ok(())
    }

    async fn send_voice_data(
        &self,
        _src_id: u32,
        _dst_id: u32,
        _slot: u8,
        _call_type: CallType,
        _stream_id: u32,
        _seq: u8,
        _ambe: [u8; 33],
    ) -> Result<()> {
        Ok(())
    }

    async fn send_voice_terminator(
        &self,
        _src_id: u32,
        _dst_id: u32,
        _slot: u8,
        _call_type: CallType,
        _stream_id: u32,
        _seq: u8,
    ) -> Result<()> {
        Ok(())
    }

    async fn receive_packet(&self) -> Result<DmrPacket> {
        self.incoming
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| ReflectorError::DmrNetwork("fake channel closed".into()))
    }
}

fn bridge_config() -> BridgeConfig {
    BridgeConfig {
        enabled: true,
        ysf_local_addr: "0.0.0.0".into(),
        ysf_local_port: 0,
        gateway_callsign: "BRIDGE".into(),
        dmr_addr: "127.0.0.1".into(),
        dmr_port: 62031,
        dmr_id: 3120999,
        dmr_password: String::new(),
        dmr_callsign: "BRIDGE".into(),
        dmr_slot: 2,
        dmr_talkgroup: 91,
        dmr_ping_interval: 5,
        dmr_auth_timeout: 5,
        lookup_file_path: None,
        lookup_download_url: None,
        lookup_auto_download: false,
        lookup_refresh_interval: 3600,
        hang_time: 5,
    }
}

#[tokio::test]
async fn bridge_buffers_five_dmr_frames_into_one_ysfd_packet() {
    let (incoming_tx, incoming_rx) = mpsc::channel(16);
    let dmr = Arc::new(FakeDmrNetwork::new(incoming_rx));

    let server = Arc::new(UdpServer::bind("127.0.0.1:0".parse().unwrap()).await.unwrap());
    let server_addr = server.local_addr().unwrap();
    let (registry, _events) = PeerRegistry::new(&server_config(), Arc::new(Blocklist::new()));

    let bridge = CrossModeBridge::new(
        bridge_config(),
        dmr,
        server.clone(),
        registry.clone(),
        None,
        None,
        SocketOwnership::Borrowed,
    );

    let reflector = Arc::new(ysfreflector_core::Reflector::new(
        server.clone(),
        registry.clone(),
        Some(bridge.clone() as Arc<dyn ysfreflector_core::BridgeCollaborator>),
        "E2E-TEST".into(),
        "E2E Description".into(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn({
        let server = server.clone();
        let reflector = reflector.clone() as Arc<dyn ysfreflector_core::PacketHandler>;
        let shutdown_rx = shutdown_rx.clone();
        async move {
            let _ = server.run(reflector, shutdown_rx).await;
        }
    });
    tokio::spawn(bridge.clone().run_dmr_reader(shutdown_rx.clone()));
    sleep(Duration::from_millis(20)).await;

    let peer = register_peer(server_addr, "W1AW").await;

    for i in 0..5u8 {
        let voice = DmrVoiceData {
            src_id: 3120101,
            dst_id: 91,
            slot: 2,
            stream_id: 42,
            data: vec![i; 33],
        };
        incoming_tx.send(DmrPacket::VoiceData(voice)).await.unwrap();
        sleep(Duration::from_millis(15)).await;

        let mut buf = [0u8; 256];
        let result = timeout(Duration::from_millis(150), peer.recv_from(&mut buf)).await;
        if i < 4 {
            assert!(result.is_err(), "frame {i} should not have produced YSF output yet");
        } else {
            let (n, _) = result.expect("5th frame should flush a YSFD packet").unwrap();
            assert_eq!(n, 155);
            assert_eq!(&buf[0..4], b"YSFD");
            assert_eq!(&buf[24..34], b"ALL       ");
        }
    }

    let _ = shutdown_tx.send(true);
}
