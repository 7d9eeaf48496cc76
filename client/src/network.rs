//! Client connection: a non-blocking UDP socket drained once per render
//! frame. The render loop is never blocked by network I/O; pending datagrams
//! are consumed in one burst and bad ones are logged and dropped.

use bincode::{deserialize, serialize};
use log::{info, warn};
use shared::{InputAction, Packet};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct Connection {
    socket: UdpSocket,
    server_addr: SocketAddr,
    pub participant_id: Option<u32>,
}

impl Connection {
    /// Binds an ephemeral local socket and sends the connect request. The
    /// `Connected` acknowledgement arrives through a later `poll`.
    pub fn connect(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;
        let server_addr = server_addr.parse()?;

        let connection = Connection {
            socket,
            server_addr,
            participant_id: None,
        };
        connection.send(&Packet::Connect { client_version: 1 })?;
        info!("Connecting to {}", server_addr);
        Ok(connection)
    }

    pub fn send(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr)?;
        Ok(())
    }

    pub fn send_action(&self, action: InputAction) {
        if let Err(e) = self.send(&Packet::Input { action }) {
            warn!("Failed to send input: {}", e);
        }
    }

    pub fn find_match(&self) {
        if let Err(e) = self.send(&Packet::FindMatch) {
            warn!("Failed to send match request: {}", e);
        }
    }

    pub fn disconnect(&self) {
        let _ = self.send(&Packet::Disconnect);
    }

    /// Drains every datagram currently queued on the socket. The `Connected`
    /// acknowledgement is absorbed here; everything else is returned for the
    /// caller to handle.
    pub fn poll(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();
        let mut buffer = [0u8; 2048];

        loop {
            match self.socket.recv_from(&mut buffer) {
                Ok((len, _)) => match deserialize::<Packet>(&buffer[..len]) {
                    Ok(Packet::Connected { participant_id }) => {
                        info!("Connected with participant id {}", participant_id);
                        self.participant_id = Some(participant_id);
                    }
                    Ok(packet) => packets.push(packet),
                    Err(_) => warn!("Failed to deserialize packet from server"),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("Socket error: {}", e);
                    break;
                }
            }
        }

        packets
    }
}

/// Current wall-clock time in milliseconds, used to stamp snapshot receipt.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
