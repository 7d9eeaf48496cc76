use clap::Parser;
use client::game::{ClientMatchState, PredictionTuning};
use client::input::InputTracker;
use client::network::{unix_millis, Connection};
use client::rendering::{Hud, Renderer};
use log::{info, warn};
use macroquad::prelude::*;
use shared::{normalize_step, Court, MatchConfig, Packet, PaddleSide};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,
}

enum Screen {
    Menu,
    Waiting,
    Playing(ClientMatchState),
    Over {
        winner: PaddleSide,
        final_score: [u8; 2],
        local: PaddleSide,
    },
}

fn window_conf() -> Conf {
    let court = Court::default();
    Conf {
        window_title: "Volley".to_string(),
        window_width: court.width as i32,
        window_height: (court.height + court.ground_thickness) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    info!("Controls: arrows or A/D to move, space to jump, escape to quit");

    let court = Court::default();
    let config = MatchConfig::default();
    let renderer = Renderer::new(court);
    let mut tracker = InputTracker::new();
    let mut scores = [0u8; 2];
    let mut screen = Screen::Menu;

    let mut connection = match Connection::connect(&args.server) {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Failed to reach server {}: {}", args.server, e);
            return;
        }
    };

    loop {
        for packet in connection.poll() {
            match packet {
                Packet::MatchFound { match_id, side } => {
                    info!("Match {} found, playing side {}", match_id, side.number());
                    scores = [0, 0];
                    screen = Screen::Playing(ClientMatchState::new(
                        side,
                        court,
                        config,
                        PredictionTuning::default(),
                    ));
                }
                Packet::StateUpdate(snapshot) => {
                    if let Screen::Playing(state) = &mut screen {
                        state.accept_snapshot(snapshot, unix_millis());
                    }
                }
                Packet::ScoreUpdate { scores: updated } => scores = updated,
                Packet::MatchOver {
                    winner,
                    final_score,
                } => {
                    let local = match &screen {
                        Screen::Playing(state) => state.side(),
                        _ => PaddleSide::One,
                    };
                    screen = Screen::Over {
                        winner,
                        final_score,
                        local,
                    };
                }
                Packet::OpponentLeft { reason } => {
                    info!("Opponent left: {}", reason);
                    screen = Screen::Menu;
                }
                Packet::Disconnected { reason } => {
                    warn!("Disconnected by server: {}", reason);
                    screen = Screen::Menu;
                }
                _ => {}
            }
        }

        if is_key_pressed(KeyCode::Escape) {
            connection.disconnect();
            break;
        }

        let mut next_screen = None;
        match &mut screen {
            Screen::Menu => {
                renderer.draw_menu(connection.participant_id.is_some());
                if is_key_pressed(KeyCode::Enter) && connection.participant_id.is_some() {
                    connection.find_match();
                    next_screen = Some(Screen::Waiting);
                }
            }
            Screen::Waiting => renderer.draw_waiting(),
            Screen::Playing(state) => {
                // Every edge goes to the server and into local prediction in
                // the same frame; the round-trip never gates responsiveness.
                for action in tracker.sample() {
                    connection.send_action(action);
                    state.apply_action(action);
                }

                let dt = normalize_step(get_frame_time() * 1000.0, config.max_step_ms);
                state.predict(dt);

                let view = state.remote_view(unix_millis());
                let hud = Hud {
                    scores,
                    local_side: state.side(),
                };
                renderer.draw_match(state.local_paddle(), view.as_ref(), &hud);
            }
            Screen::Over {
                winner,
                final_score,
                local,
            } => {
                renderer.draw_game_over(*winner, *final_score, *local);
                if is_key_pressed(KeyCode::Enter) {
                    next_screen = Some(Screen::Menu);
                }
            }
        }
        if let Some(next) = next_screen {
            screen = next;
        }

        next_frame().await;
    }
}
