//! Macroquad renderer for the match and the surrounding screens. Pure
//! presentation; everything it draws comes from the reconciliation layer.

use macroquad::prelude::*;
use shared::{BallView, Court, Paddle, PaddleSide, Vec2};

use crate::game::RemoteView;

pub struct Hud {
    pub scores: [u8; 2],
    pub local_side: PaddleSide,
}

pub struct Renderer {
    court: Court,
}

impl Renderer {
    pub fn new(court: Court) -> Self {
        Renderer { court }
    }

    pub fn draw_match(&self, local: &Paddle, remote: Option<&RemoteView>, hud: &Hud) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        self.draw_court();

        // Until the first snapshot arrives the remote paddle sits at spawn.
        let remote_pos = remote.map(|view| view.remote_paddle).unwrap_or_else(|| {
            let side = hud.local_side.other();
            Vec2::new(
                self.court.spawn_x(side),
                self.court.ground_y() - self.court.paddle_height,
            )
        });

        self.draw_paddle(local.pos, GREEN);
        self.draw_paddle(remote_pos, Color::from_rgba(255, 68, 68, 255));

        if let Some(view) = remote {
            if view.ball.visible {
                self.draw_ball(view.ball);
            }
            if view.serving {
                self.draw_banner("serve!", 24.0);
            }
        }

        self.draw_scores(hud);
    }

    pub fn draw_menu(&self, connected: bool) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        self.draw_court();
        if connected {
            self.draw_banner("press enter to find a match", 30.0);
        } else {
            self.draw_banner("connecting...", 30.0);
        }
    }

    pub fn draw_waiting(&self) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        self.draw_court();
        self.draw_banner("waiting for an opponent...", 30.0);
    }

    pub fn draw_game_over(&self, winner: PaddleSide, final_score: [u8; 2], local: PaddleSide) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        self.draw_court();

        let verdict = if winner == local { "you win!" } else { "you lose" };
        self.draw_banner(verdict, 40.0);

        let score_line = format!("{} - {}", final_score[0], final_score[1]);
        let size = measure_text(&score_line, None, 30, 1.0);
        draw_text(
            &score_line,
            self.court.mid_x() - size.width / 2.0,
            self.court.height / 2.0 + 40.0,
            30.0,
            WHITE,
        );
        self.draw_banner_at("press enter for the menu", 20.0, self.court.height - 60.0);
    }

    fn draw_court(&self) {
        // Ground band.
        draw_rectangle(
            0.0,
            self.court.ground_y(),
            self.court.width,
            self.court.ground_thickness,
            Color::from_rgba(68, 68, 68, 255),
        );

        let (net_x, net_y, net_w, net_h) = self.court.net_rect();
        draw_rectangle(net_x, net_y, net_w, net_h, Color::from_rgba(211, 211, 211, 255));
    }

    fn draw_paddle(&self, pos: Vec2, color: Color) {
        draw_rectangle(
            pos.x,
            pos.y,
            self.court.paddle_width,
            self.court.paddle_height,
            color,
        );
        draw_rectangle_lines(
            pos.x,
            pos.y,
            self.court.paddle_width,
            self.court.paddle_height,
            2.0,
            WHITE,
        );
    }

    fn draw_ball(&self, ball: BallView) {
        draw_circle(ball.x, ball.y, self.court.ball_radius, YELLOW);
        draw_circle_lines(ball.x, ball.y, self.court.ball_radius, 2.0, WHITE);
    }

    fn draw_scores(&self, hud: &Hud) {
        let line = format!(
            "{} - {}   (you are paddle {})",
            hud.scores[0],
            hud.scores[1],
            hud.local_side.number()
        );
        draw_text(&line, 16.0, 28.0, 24.0, WHITE);
    }

    fn draw_banner(&self, text: &str, size: f32) {
        self.draw_banner_at(text, size, self.court.height / 2.0);
    }

    fn draw_banner_at(&self, text: &str, size: f32, y: f32) {
        let measured = measure_text(text, None, size as u16, 1.0);
        draw_text(
            text,
            self.court.mid_x() - measured.width / 2.0,
            y,
            size,
            WHITE,
        );
    }
}
