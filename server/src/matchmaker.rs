//! Match lifecycle: FIFO pairing of waiting participants, input routing into
//! running matches, and teardown on departure or natural finish.
//!
//! Every match runs in its own tokio task with its own fixed-rate timer, so
//! matches never share mutable state. The task is the single writer of its
//! simulation; inputs arrive over a command channel and are folded in between
//! ticks, which makes each intent update atomic at a tick boundary.

use log::{debug, info, warn};
use shared::{Court, InputAction, MatchConfig, Packet, PaddleSide};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::sim::{MatchSim, SimEvent};

/// How long a finished match lingers before its table entry is released.
const FINISH_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug)]
enum MatchCommand {
    Input { side: PaddleSide, action: InputAction },
    Stop,
}

struct MatchHandle {
    participants: [u32; 2],
    commands: mpsc::UnboundedSender<MatchCommand>,
}

/// Owns the waiting queue and the active-match table. Constructed once at
/// server startup; all packets addressed to participants leave through the
/// `outbound` channel, and match tasks report completion through `finished`.
pub struct Matchmaker {
    queue: VecDeque<u32>,
    matches: HashMap<u64, MatchHandle>,
    /// participant id -> (match id, paddle side)
    seats: HashMap<u32, (u64, PaddleSide)>,
    next_match_id: u64,
    court: Court,
    config: MatchConfig,
    outbound: mpsc::UnboundedSender<(u32, Packet)>,
    finished: mpsc::UnboundedSender<u64>,
}

impl Matchmaker {
    pub fn new(
        court: Court,
        config: MatchConfig,
        outbound: mpsc::UnboundedSender<(u32, Packet)>,
        finished: mpsc::UnboundedSender<u64>,
    ) -> Self {
        Matchmaker {
            queue: VecDeque::new(),
            matches: HashMap::new(),
            seats: HashMap::new(),
            next_match_id: 1,
            court,
            config,
            outbound,
            finished,
        }
    }

    /// Enqueues a participant and starts a match once two are waiting. A
    /// participant already waiting or already seated is ignored.
    pub fn request_match(&mut self, participant_id: u32) {
        if self.seats.contains_key(&participant_id) {
            debug!(
                "Participant {} requested a match while already in one",
                participant_id
            );
            return;
        }
        if self.queue.contains(&participant_id) {
            debug!("Participant {} is already queued", participant_id);
            return;
        }

        self.queue.push_back(participant_id);
        info!(
            "Participant {} queued ({} waiting)",
            participant_id,
            self.queue.len()
        );

        while self.queue.len() >= 2 {
            let (Some(first), Some(second)) = (self.queue.pop_front(), self.queue.pop_front())
            else {
                break;
            };
            self.start_match(first, second);
        }
    }

    fn start_match(&mut self, first: u32, second: u32) {
        let match_id = self.next_match_id;
        self.next_match_id += 1;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let participants = [first, second];

        self.matches.insert(
            match_id,
            MatchHandle {
                participants,
                commands: command_tx,
            },
        );
        self.seats.insert(first, (match_id, PaddleSide::One));
        self.seats.insert(second, (match_id, PaddleSide::Two));

        tokio::spawn(run_match(
            match_id,
            MatchSim::new(self.court, self.config),
            participants,
            self.config.tick_rate,
            command_rx,
            self.outbound.clone(),
            self.finished.clone(),
        ));

        info!("Match {} started: {} vs {}", match_id, first, second);
        self.send(
            first,
            Packet::MatchFound {
                match_id,
                side: PaddleSide::One,
            },
        );
        self.send(
            second,
            Packet::MatchFound {
                match_id,
                side: PaddleSide::Two,
            },
        );
    }

    /// Routes one input action to the participant's paddle. Unroutable input
    /// is dropped; it is not an error for a stale packet to arrive after a
    /// match ended.
    pub fn submit_input(&mut self, participant_id: u32, action: InputAction) {
        match self.seats.get(&participant_id) {
            Some(&(match_id, side)) => {
                if let Some(handle) = self.matches.get(&match_id) {
                    let _ = handle.commands.send(MatchCommand::Input { side, action });
                }
            }
            None => debug!(
                "Dropping input from participant {} with no active match",
                participant_id
            ),
        }
    }

    /// Handles a departure: drops the participant from the queue, or tears
    /// down their match and notifies the remaining participant exactly once.
    /// Safe to call repeatedly.
    pub fn participant_left(&mut self, participant_id: u32) {
        self.queue.retain(|id| *id != participant_id);

        let Some((match_id, _)) = self.seats.remove(&participant_id) else {
            return;
        };
        let Some(handle) = self.matches.remove(&match_id) else {
            return;
        };

        // The tick task is stopped before the entry is released.
        let _ = handle.commands.send(MatchCommand::Stop);

        for other in handle.participants {
            if other != participant_id {
                self.seats.remove(&other);
                self.send(
                    other,
                    Packet::OpponentLeft {
                        reason: "opponent disconnected".to_string(),
                    },
                );
            }
        }
        info!(
            "Match {} torn down after participant {} left",
            match_id, participant_id
        );
    }

    /// Releases the table entries of a match whose task has finished.
    pub fn match_finished(&mut self, match_id: u64) {
        if let Some(handle) = self.matches.remove(&match_id) {
            for participant in handle.participants {
                self.seats.remove(&participant);
            }
            info!("Match {} released", match_id);
        }
    }

    pub fn waiting(&self) -> usize {
        self.queue.len()
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    fn send(&self, participant_id: u32, packet: Packet) {
        if self.outbound.send((participant_id, packet)).is_err() {
            warn!(
                "Outbound channel closed; dropping packet for participant {}",
                participant_id
            );
        }
    }
}

/// One match's tick loop. Owns the simulation exclusively; commands are
/// folded in between ticks. An overrun skips the late tick instead of
/// bursting, and broadcast is fire-and-forget so a slow peer cannot stall
/// the loop.
async fn run_match(
    match_id: u64,
    mut sim: MatchSim,
    participants: [u32; 2],
    tick_rate: u32,
    mut commands: mpsc::UnboundedReceiver<MatchCommand>,
    outbound: mpsc::UnboundedSender<(u32, Packet)>,
    finished: mpsc::UnboundedSender<u64>,
) {
    let mut ticker = interval(Duration::from_secs_f32(1.0 / tick_rate as f32));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately; consume it so dt starts sane.
    ticker.tick().await;

    let mut last_tick = Instant::now();
    let mut stopped = false;

    while !stopped && sim.is_active() {
        tokio::select! {
            command = commands.recv() => match command {
                Some(MatchCommand::Input { side, action }) => sim.apply_action(side, action),
                Some(MatchCommand::Stop) | None => stopped = true,
            },
            _ = ticker.tick() => {
                let now = Instant::now();
                let elapsed_ms = now.duration_since(last_tick).as_secs_f32() * 1000.0;
                last_tick = now;

                let events = sim.step(elapsed_ms);
                let snapshot = sim.snapshot(unix_millis());
                broadcast(&outbound, &participants, Packet::StateUpdate(snapshot));

                for event in events {
                    match event {
                        SimEvent::PointScored { scores, .. } => {
                            broadcast(&outbound, &participants, Packet::ScoreUpdate { scores });
                        }
                        SimEvent::Finished { winner, final_score } => {
                            broadcast(
                                &outbound,
                                &participants,
                                Packet::MatchOver { winner, final_score },
                            );
                        }
                    }
                }
            }
        }
    }

    if !stopped {
        // Natural finish: give the terminal packets a moment on the wire
        // before the table entry is released.
        tokio::time::sleep(FINISH_GRACE).await;
    }
    let _ = finished.send(match_id);
    debug!("Match {} task exited", match_id);
}

fn broadcast(
    outbound: &mpsc::UnboundedSender<(u32, Packet)>,
    participants: &[u32; 2],
    packet: Packet,
) {
    for participant in participants {
        let _ = outbound.send((*participant, packet.clone()));
    }
}

/// Current wall-clock time in milliseconds, stamped into every snapshot.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
