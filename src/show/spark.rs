use std::f32::consts::TAU;

use glam::Vec2;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::BurstConfig;
use crate::rng::RandomSource;

/// Axis-aligned region in burst-local units. Sparks leaving it die.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// The viewport `[0, viewport]` seen from a burst at `origin` drawn at `scale`.
    pub fn local_to(viewport: Vec2, origin: Vec2, scale: f32) -> Self {
        Self {
            min: -origin / scale,
            max: (viewport - origin) / scale,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[derive(Debug, Clone)]
pub struct Spark {
    position: Vec2,
    last_position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    color: Color,
    lifespan: f32,
    decay_rate: f32,
    bounds: Bounds,
}

impl Spark {
    pub fn new(velocity: Vec2, acceleration: Vec2, color: Color, decay_rate: f32, bounds: Bounds) -> Self {
        Self {
            position: Vec2::ZERO,
            last_position: Vec2::ZERO,
            velocity,
            acceleration,
            color,
            lifespan: 1.0,
            decay_rate,
            bounds,
        }
    }

    /// Random direction, speed and decay drawn from `burst`.
    pub fn random(burst: &BurstConfig, color: Color, bounds: Bounds, rng: &mut impl RandomSource) -> Self {
        let angle = rng.unit() * TAU;
        let speed = burst.speed.sample(rng);
        let decay_rate = burst.decay.sample(rng);
        Self::new(
            Vec2::from_angle(angle) * speed,
            Vec2::new(0.0, -burst.gravity),
            color,
            decay_rate,
            bounds,
        )
    }

    pub fn update(&mut self) {
        self.lifespan -= self.decay_rate;
        self.velocity += self.acceleration;
        self.last_position = self.position;
        self.position += self.velocity;
    }

    pub fn is_dead(&self) -> bool {
        self.lifespan <= 0.0 || !self.bounds.contains(self.position)
    }

    /// Strokes the last step, fading with the remaining lifespan.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.begin_path();
        canvas.move_to(self.last_position);
        canvas.line_to(self.position);
        canvas.close_path();
        canvas.set_stroke_color(self.color.with_alpha(self.lifespan.max(0.0)));
        canvas.stroke();
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn last_position(&self) -> Vec2 {
        self.last_position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn lifespan(&self) -> f32 {
        self.lifespan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Command, RecordingCanvas};
    use crate::rng::Sequence;

    fn wide_bounds() -> Bounds {
        Bounds {
            min: Vec2::splat(-1000.0),
            max: Vec2::splat(1000.0),
        }
    }

    #[test]
    fn test_update_integrates_velocity_then_position() {
        let mut spark = Spark::new(
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -0.5),
            Color::WHITE,
            0.25,
            wide_bounds(),
        );

        spark.update();
        assert_eq!(spark.velocity(), Vec2::new(1.0, -0.5));
        assert_eq!(spark.position(), Vec2::new(1.0, -0.5));
        assert_eq!(spark.last_position(), Vec2::ZERO);

        spark.update();
        assert_eq!(spark.position(), Vec2::new(2.0, -1.5));
        assert_eq!(spark.last_position(), Vec2::new(1.0, -0.5));
        assert_eq!(spark.lifespan(), 0.5);
    }

    #[test]
    fn test_lifespan_decays_to_death() {
        let mut spark = Spark::new(Vec2::ZERO, Vec2::ZERO, Color::WHITE, 0.25, wide_bounds());
        let mut previous = spark.lifespan();
        for _ in 0..3 {
            spark.update();
            assert!(spark.lifespan() <= previous);
            assert!(!spark.is_dead());
            previous = spark.lifespan();
        }
        spark.update();
        assert!(spark.is_dead());
    }

    #[test]
    fn test_leaving_bounds_kills() {
        let bounds = Bounds {
            min: Vec2::new(-2.0, -2.0),
            max: Vec2::new(2.0, 2.0),
        };
        let mut spark = Spark::new(Vec2::new(1.5, 0.0), Vec2::ZERO, Color::WHITE, 0.01, bounds);
        spark.update();
        assert!(!spark.is_dead());
        spark.update();
        assert!(spark.is_dead());
    }

    #[test]
    fn test_bounds_in_burst_frame() {
        let bounds = Bounds::local_to(Vec2::new(300.0, 200.0), Vec2::new(100.0, 50.0), 0.5);
        assert_eq!(bounds.min, Vec2::new(-200.0, -100.0));
        assert_eq!(bounds.max, Vec2::new(400.0, 300.0));
        assert!(bounds.contains(Vec2::ZERO));
        assert!(!bounds.contains(Vec2::new(0.0, -101.0)));
    }

    #[test]
    fn test_random_spark_from_burst() {
        let burst = BurstConfig::default();
        let mut rng = Sequence::constant(0.25);
        let spark = Spark::random(&burst, Color::WHITE, wide_bounds(), &mut rng);

        // angle = TAU / 4, speed = 1.25
        assert!(spark.velocity().abs_diff_eq(Vec2::new(0.0, 1.25), 1e-5));
        assert_eq!(spark.lifespan(), 1.0);

        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..100 {
            let spark = Spark::random(&burst, Color::WHITE, wide_bounds(), &mut rng);
            let speed = spark.velocity().length();
            assert!((1.0 - 1e-4..2.0 + 1e-4).contains(&speed));
        }
    }

    #[test]
    fn test_draw_fades_with_lifespan() {
        let mut spark = Spark::new(
            Vec2::new(1.0, 1.0),
            Vec2::ZERO,
            Color::rgba(200, 100, 50, 1.0),
            0.25,
            wide_bounds(),
        );
        spark.update();

        let mut canvas = RecordingCanvas::default();
        spark.draw(&mut canvas);
        assert_eq!(
            canvas.commands,
            vec![
                Command::BeginPath,
                Command::MoveTo(Vec2::ZERO),
                Command::LineTo(Vec2::new(1.0, 1.0)),
                Command::ClosePath,
                Command::StrokeColor(Color::rgba(200, 100, 50, 0.75)),
                Command::Stroke,
            ]
        );
    }
}
