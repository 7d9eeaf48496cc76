//! UDP transport and packet routing: receives datagrams, maps addresses to
//! participant ids, and feeds the matchmaker. All outbound traffic funnels
//! through an addressed send queue so the simulation never blocks on a peer.

use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Court, MatchConfig, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};

use crate::matchmaker::Matchmaker;
use crate::registry::ParticipantRegistry;

/// Messages sent from network tasks to the main server loop.
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ParticipantTimeout { participant_id: u32 },
}

/// Main server coordinating the socket, the registry, and the matchmaker.
pub struct Server {
    socket: Arc<UdpSocket>,
    registry: Arc<RwLock<ParticipantRegistry>>,
    matchmaker: Matchmaker,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<(u32, Packet)>,
    outbound_rx: Option<mpsc::UnboundedReceiver<(u32, Packet)>>,
    finished_rx: mpsc::UnboundedReceiver<u64>,
}

impl Server {
    pub async fn new(
        addr: &str,
        court: Court,
        config: MatchConfig,
        max_participants: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();

        let matchmaker = Matchmaker::new(court, config, outbound_tx.clone(), finished_tx);

        Ok(Server {
            socket,
            registry: Arc::new(RwLock::new(ParticipantRegistry::new(max_participants))),
            matchmaker,
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx: Some(outbound_rx),
            finished_rx,
        })
    }

    /// Spawns the task that continuously listens for incoming datagrams.
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if server_tx
                                .send(ServerMessage::PacketReceived { packet, addr })
                                .is_err()
                            {
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the addressed outbound queue. Sends are
    /// fire-and-forget; a failed send is logged, never retried.
    fn spawn_outbound_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let registry = Arc::clone(&self.registry);
        let Some(mut outbound_rx) = self.outbound_rx.take() else {
            return;
        };

        tokio::spawn(async move {
            while let Some((participant_id, packet)) = outbound_rx.recv().await {
                let addr = {
                    let registry = registry.read().await;
                    registry.addr_of(participant_id)
                };

                let Some(addr) = addr else {
                    debug!(
                        "Dropping packet for unknown participant {}",
                        participant_id
                    );
                    continue;
                };

                match serialize(&packet) {
                    Ok(data) => {
                        if let Err(e) = socket.send_to(&data, addr).await {
                            error!("Failed to send to participant {}: {}", participant_id, e);
                        }
                    }
                    Err(e) => error!("Failed to serialize outbound packet: {}", e),
                }
            }
        });
    }

    /// Spawns the task that periodically sweeps silent participants.
    fn spawn_timeout_checker(&self) {
        let registry = Arc::clone(&self.registry);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(Duration::from_secs(1));

            loop {
                sweep.tick().await;

                let timed_out = {
                    let mut registry = registry.write().await;
                    registry.check_timeouts()
                };

                for participant_id in timed_out {
                    if server_tx
                        .send(ServerMessage::ParticipantTimeout { participant_id })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        });
    }

    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!(
                    "Participant connecting from {} (version {})",
                    addr, client_version
                );

                // A reconnect from a known address replaces the old identity,
                // which also tears down any match it was seated in.
                let existing = {
                    let registry = self.registry.read().await;
                    registry.find_by_addr(addr)
                };
                if let Some(existing_id) = existing {
                    info!("Replacing existing participant {} from {}", existing_id, addr);
                    self.registry.write().await.remove(&existing_id);
                    self.matchmaker.participant_left(existing_id);
                }

                let assigned = {
                    let mut registry = self.registry.write().await;
                    registry.add(addr)
                };

                match assigned {
                    Some(participant_id) => {
                        self.send(participant_id, Packet::Connected { participant_id });
                    }
                    None => {
                        // Not registered, so there is no id to route by;
                        // answer the address directly.
                        let refusal = Packet::Disconnected {
                            reason: "Server full".to_string(),
                        };
                        if let Ok(data) = serialize(&refusal) {
                            let _ = self.socket.send_to(&data, addr).await;
                        }
                    }
                }
            }

            Packet::FindMatch => match self.lookup_and_touch(addr).await {
                Some(participant_id) => self.matchmaker.request_match(participant_id),
                None => warn!("FindMatch from unknown address {}", addr),
            },

            Packet::Input { action } => {
                if let Some(participant_id) = self.lookup_and_touch(addr).await {
                    self.matchmaker.submit_input(participant_id, action);
                }
            }

            Packet::Disconnect => {
                let participant_id = {
                    let registry = self.registry.read().await;
                    registry.find_by_addr(addr)
                };
                if let Some(participant_id) = participant_id {
                    self.registry.write().await.remove(&participant_id);
                    self.matchmaker.participant_left(participant_id);
                }
            }

            _ => warn!("Unexpected packet type from {}", addr),
        }
    }

    async fn lookup_and_touch(&self, addr: SocketAddr) -> Option<u32> {
        let mut registry = self.registry.write().await;
        let participant_id = registry.find_by_addr(addr)?;
        registry.touch(participant_id);
        Some(participant_id)
    }

    fn send(&self, participant_id: u32, packet: Packet) {
        if self.outbound_tx.send((participant_id, packet)).is_err() {
            error!("Outbound queue closed");
        }
    }

    /// Main server loop: routes inbound packets, timeout sweeps, and
    /// finished-match reports until the channels close.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_outbound_sender();
        self.spawn_timeout_checker();

        info!("Server started");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => match message {
                    Some(ServerMessage::PacketReceived { packet, addr }) => {
                        self.handle_packet(packet, addr).await;
                    }
                    Some(ServerMessage::ParticipantTimeout { participant_id }) => {
                        info!("Participant {} timed out", participant_id);
                        self.matchmaker.participant_left(participant_id);
                    }
                    None => break,
                },
                finished = self.finished_rx.recv() => {
                    if let Some(match_id) = finished {
                        self.matchmaker.match_finished(match_id);
                    }
                }
            }
        }

        Ok(())
    }
}
