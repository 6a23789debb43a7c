use glam::Vec2;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::RocketConfig;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocketState {
    Ascending,
    /// Terminal; the owning show replaces the rocket with a burst.
    Exploded,
}

#[derive(Debug, Clone)]
pub struct Rocket {
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    explode_height: f32,
    /// Last three positions, newest first.
    trail: [Vec2; 3],
    color: Color,
    scale: f32,
    state: RocketState,
}

impl Rocket {
    pub fn new(position: Vec2, acceleration: Vec2, explode_height: f32, color: Color, scale: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration,
            explode_height,
            trail: [position; 3],
            color,
            scale,
            state: RocketState::Ascending,
        }
    }

    /// Launches from the bottom edge of `viewport` at a random x.
    pub fn random(config: &RocketConfig, color: Color, viewport: Vec2, rng: &mut impl RandomSource) -> Self {
        let x = config.launch_x.sample(rng) * viewport.x;
        let explode_height = config.explode_height.sample(rng) * viewport.y;
        let scale = config.scale.sample(rng);
        Self::new(
            Vec2::new(x, 0.0),
            Vec2::new(0.0, config.acceleration),
            explode_height,
            color,
            scale,
        )
    }

    pub fn update(&mut self) {
        if self.state == RocketState::Exploded {
            return;
        }

        self.trail.rotate_right(1);
        self.trail[0] = self.position;
        self.velocity += self.acceleration;
        self.position += self.velocity;

        if self.position.y >= self.explode_height {
            self.state = RocketState::Exploded;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state == RocketState::Exploded
    }

    /// Strokes from a randomly picked trail slot to the current position, so
    /// the trail flickers between frames.
    pub fn draw(&self, canvas: &mut impl Canvas, rng: &mut impl RandomSource) {
        let start = self.trail[rng.index(self.trail.len())];
        canvas.save();
        canvas.begin_path();
        canvas.move_to(start);
        canvas.line_to(self.position);
        canvas.close_path();
        canvas.set_stroke_color(self.color);
        canvas.set_line_width(self.scale);
        canvas.stroke();
        canvas.restore();
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn state(&self) -> RocketState {
        self.state
    }

    pub fn explode_height(&self) -> f32 {
        self.explode_height
    }
}
