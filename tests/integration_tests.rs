//! Integration tests across the workspace crates: wire protocol over a real
//! socket, matchmaking end to end, a full serve/rally/score cycle, and the
//! client reconciliation fixtures.

use assert_approx_eq::assert_approx_eq;
use bincode::{deserialize, serialize};
use shared::{
    BallView, Court, Direction, InputAction, MatchConfig, Packet, PaddleSide, Snapshot, Vec2,
    REFERENCE_FRAME_MS,
};

/// NETWORK PROTOCOL TESTS
mod protocol_tests {
    use super::*;
    use std::net::UdpSocket;
    use std::thread;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn packet_serialization_roundtrip() {
        let test_packets = vec![
            Packet::Connect { client_version: 1 },
            Packet::FindMatch,
            Packet::Input {
                action: InputAction::Move(Direction::Left),
            },
            Packet::Connected { participant_id: 42 },
            Packet::MatchFound {
                match_id: 3,
                side: PaddleSide::Two,
            },
            Packet::ScoreUpdate { scores: [5, 3] },
            Packet::MatchOver {
                winner: PaddleSide::One,
                final_score: [11, 7],
            },
            Packet::OpponentLeft {
                reason: "Test".to_string(),
            },
        ];

        for packet in test_packets {
            let serialized = serialize(&packet).unwrap();
            let deserialized: Packet = deserialize(&serialized).unwrap();

            match (&packet, &deserialized) {
                (Packet::Connect { .. }, Packet::Connect { .. }) => {}
                (Packet::FindMatch, Packet::FindMatch) => {}
                (Packet::Input { .. }, Packet::Input { .. }) => {}
                (Packet::Connected { .. }, Packet::Connected { .. }) => {}
                (Packet::MatchFound { .. }, Packet::MatchFound { .. }) => {}
                (Packet::ScoreUpdate { .. }, Packet::ScoreUpdate { .. }) => {}
                (Packet::MatchOver { .. }, Packet::MatchOver { .. }) => {}
                (Packet::OpponentLeft { .. }, Packet::OpponentLeft { .. }) => {}
                _ => panic!("Packet type mismatch after serialization"),
            }
        }
    }

    #[tokio::test]
    async fn state_update_over_a_real_udp_socket() {
        let server_socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind server socket");
        let server_addr = server_socket.local_addr().unwrap();

        // Echo peer.
        let echo_socket = server_socket.try_clone().unwrap();
        thread::spawn(move || {
            let mut buf = [0; 2048];
            if let Ok((size, peer)) = echo_socket.recv_from(&mut buf) {
                let _ = echo_socket.send_to(&buf[..size], peer);
            }
        });

        sleep(Duration::from_millis(10)).await;

        let client_socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind client socket");
        client_socket
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();

        let snapshot = Snapshot {
            paddle1: Vec2::new(50.0, 360.0),
            paddle2: Vec2::new(710.0, 360.0),
            ball: BallView {
                x: 70.0,
                y: 280.0,
                visible: true,
            },
            serving: true,
            server_timestamp: 123_456,
        };
        let data = serialize(&Packet::StateUpdate(snapshot)).unwrap();
        client_socket.send_to(&data, server_addr).unwrap();

        let mut buf = [0; 2048];
        let (size, _) = client_socket.recv_from(&mut buf).unwrap();
        match deserialize::<Packet>(&buf[..size]).unwrap() {
            Packet::StateUpdate(received) => assert_eq!(received, snapshot),
            _ => panic!("Wrong packet type received"),
        }
    }
}

/// MATCHMAKING LIFECYCLE TESTS
mod matchmaking_tests {
    use super::*;
    use server::matchmaker::Matchmaker;
    use tokio::sync::mpsc;

    type Outbound = mpsc::UnboundedReceiver<(u32, Packet)>;

    fn matchmaker() -> (Matchmaker, Outbound) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (finished_tx, _finished_rx) = mpsc::unbounded_channel();
        (
            Matchmaker::new(
                Court::default(),
                MatchConfig::default(),
                outbound_tx,
                finished_tx,
            ),
            outbound_rx,
        )
    }

    fn drain(outbound: &mut Outbound) -> Vec<(u32, Packet)> {
        let mut packets = Vec::new();
        while let Ok(entry) = outbound.try_recv() {
            packets.push(entry);
        }
        packets
    }

    #[tokio::test]
    async fn two_find_match_requests_produce_one_match() {
        let (mut matchmaker, mut outbound) = matchmaker();

        matchmaker.request_match(7);
        matchmaker.request_match(9);

        let found: Vec<_> = drain(&mut outbound)
            .into_iter()
            .filter_map(|(participant, packet)| match packet {
                Packet::MatchFound { match_id, side } => Some((participant, match_id, side)),
                _ => None,
            })
            .collect();

        // Exactly one MatchFound per participant, complementary sides,
        // one shared match identity.
        assert_eq!(found.len(), 2);
        let (first, second) = (found[0], found[1]);
        assert_eq!(first.0, 7);
        assert_eq!(first.2, PaddleSide::One);
        assert_eq!(second.0, 9);
        assert_eq!(second.2, PaddleSide::Two);
        assert_eq!(first.1, second.1);
        assert_eq!(matchmaker.active_matches(), 1);
    }

    #[tokio::test]
    async fn departure_handling_is_idempotent() {
        let (mut matchmaker, mut outbound) = matchmaker();

        matchmaker.request_match(7);
        matchmaker.request_match(9);
        drain(&mut outbound);

        matchmaker.participant_left(7);
        matchmaker.participant_left(7);

        let notifications = drain(&mut outbound)
            .into_iter()
            .filter(|(participant, packet)| {
                *participant == 9 && matches!(packet, Packet::OpponentLeft { .. })
            })
            .count();
        assert_eq!(notifications, 1);
        assert_eq!(matchmaker.active_matches(), 0);
    }
}

/// SIMULATION SCENARIO TESTS
mod simulation_tests {
    use super::*;
    use server::sim::{MatchSim, SimEvent};

    const FRAME: f32 = REFERENCE_FRAME_MS;

    #[test]
    fn full_serve_rally_score_cycle() {
        let config = MatchConfig {
            serve_delay_ms: 0.0,
            ..MatchConfig::default()
        };
        let mut sim = MatchSim::new(Court::default(), config);

        assert!(sim.is_serving());
        assert_eq!(sim.serving_side(), Some(PaddleSide::One));

        // Serve: paddle one jumps into the pinned ball.
        sim.apply_action(PaddleSide::One, InputAction::Jump);
        let mut served = false;
        for _ in 0..60 {
            sim.step(FRAME);
            if !sim.is_serving() {
                served = true;
                break;
            }
        }
        assert!(served, "serve never fired");

        // Rally plays out with idle paddles until the ball grounds.
        let mut point = None;
        for _ in 0..2000 {
            let events = sim.step(FRAME);
            if let Some(SimEvent::PointScored { scores, server }) = events.first().copied() {
                point = Some((scores, server));
                break;
            }
        }

        let (scores, next_server) = point.expect("no point was scored");
        assert_eq!(scores.iter().sum::<u8>(), 1);
        assert!(sim.is_serving(), "serve state re-arms after the point");
        assert_eq!(sim.serving_side(), Some(next_server));
        assert_eq!(sim.scores(), scores);
        assert!(sim.is_active());
    }

    #[test]
    fn snapshots_are_consistent_with_engine_state() {
        let mut sim = MatchSim::new(Court::default(), MatchConfig::default());
        sim.apply_action(PaddleSide::One, InputAction::Move(Direction::Right));
        sim.step(FRAME);

        let snapshot = sim.snapshot(777);
        assert_eq!(snapshot.paddle1, sim.paddle(PaddleSide::One).pos);
        assert_eq!(snapshot.paddle2, sim.paddle(PaddleSide::Two).pos);
        assert_approx_eq!(snapshot.ball.x, sim.ball().pos.x, 1e-6);
        assert!(snapshot.serving);
        assert_eq!(snapshot.server_timestamp, 777);
    }
}

/// CLIENT RECONCILIATION TESTS
mod reconciliation_tests {
    use super::*;
    use client::game::{ClientMatchState, PredictionTuning};

    fn snapshot_at(ball_x: f32) -> Snapshot {
        Snapshot {
            paddle1: Vec2::new(50.0, 360.0),
            paddle2: Vec2::new(700.0, 360.0),
            ball: BallView {
                x: ball_x,
                y: 100.0,
                visible: true,
            },
            serving: false,
            server_timestamp: 0,
        }
    }

    #[test]
    fn interpolation_hits_the_exact_midpoint() {
        let tuning = PredictionTuning {
            interpolation_delay_ms: 50,
            ..PredictionTuning::default()
        };
        let mut state = ClientMatchState::new(
            PaddleSide::One,
            Court::default(),
            MatchConfig::default(),
            tuning,
        );

        state.accept_snapshot(snapshot_at(100.0), 0);
        state.accept_snapshot(snapshot_at(200.0), 100);

        // now = 100ms, delay = 50ms => render time 50ms => alpha 0.5.
        let view = state.remote_view(100).unwrap();
        assert_approx_eq!(view.ball.x, 150.0, 1e-4);
    }

    #[test]
    fn single_snapshot_fallback_is_verbatim() {
        let mut state = ClientMatchState::new(
            PaddleSide::One,
            Court::default(),
            MatchConfig::default(),
            PredictionTuning::default(),
        );

        state.accept_snapshot(snapshot_at(321.0), 0);

        let view = state.remote_view(10).unwrap();
        assert_approx_eq!(view.ball.x, 321.0, 1e-6);
        assert_approx_eq!(view.remote_paddle.x, 700.0, 1e-6);
    }
}
