//! Connected-participant bookkeeping: identity assignment, address routing,
//! and liveness. Matchmaking and simulation never see addresses, only ids.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// One connected participant.
#[derive(Debug)]
pub struct Participant {
    pub id: u32,
    /// Network address for sending responses.
    pub addr: SocketAddr,
    /// Last time we received any packet from this participant.
    pub last_seen: Instant,
}

impl Participant {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Participant {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Registry of everyone currently connected, keyed by id with address
/// lookup both ways. Ids start at 1 and increment per connection.
pub struct ParticipantRegistry {
    participants: HashMap<u32, Participant>,
    next_id: u32,
    max_participants: usize,
}

impl ParticipantRegistry {
    pub fn new(max_participants: usize) -> Self {
        ParticipantRegistry {
            participants: HashMap::new(),
            next_id: 1,
            max_participants,
        }
    }

    /// Registers a new participant, or None at capacity.
    pub fn add(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.participants.len() >= self.max_participants {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        info!("Participant {} connected from {}", id, addr);
        self.participants.insert(id, Participant::new(id, addr));
        Some(id)
    }

    /// Returns true if the participant was present and removed.
    pub fn remove(&mut self, id: &u32) -> bool {
        if let Some(participant) = self.participants.remove(id) {
            info!("Participant {} disconnected", participant.id);
            true
        } else {
            false
        }
    }

    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.participants
            .iter()
            .find(|(_, participant)| participant.addr == addr)
            .map(|(id, _)| *id)
    }

    pub fn addr_of(&self, id: u32) -> Option<SocketAddr> {
        self.participants.get(&id).map(|participant| participant.addr)
    }

    /// Refreshes the liveness stamp; called for every inbound packet.
    pub fn touch(&mut self, id: u32) {
        if let Some(participant) = self.participants.get_mut(&id) {
            participant.last_seen = Instant::now();
        }
    }

    /// Removes and returns every participant that has gone silent.
    pub fn check_timeouts(&mut self) -> Vec<u32> {
        let timeout = Duration::from_secs(5);
        let timed_out: Vec<u32> = self
            .participants
            .iter()
            .filter(|(_, participant)| participant.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for id in &timed_out {
            self.remove(id);
        }

        timed_out
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
