use glam::{Affine2, Vec2};

use super::spark::{Bounds, Spark};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::{BurstConfig, ColorModel};
use crate::rng::RandomSource;

/// A burst of sparks drawn in a local frame anchored at `origin` and scaled by
/// `scale`.
#[derive(Debug, Clone)]
pub struct Explosion {
    origin: Vec2,
    scale: f32,
    sparks: Vec<Spark>,
}

impl Explosion {
    pub fn new(origin: Vec2, scale: f32, sparks: Vec<Spark>) -> Self {
        Self { origin, scale, sparks }
    }

    pub fn burst(
        origin: Vec2,
        scale: f32,
        config: &BurstConfig,
        viewport: Vec2,
        rng: &mut impl RandomSource,
    ) -> Self {
        let bounds = Bounds::local_to(viewport, origin, scale);
        let (min, max) = config.spark_count;
        let count = min + rng.index(max - min + 1);
        let base_hue = rng.unit() * 360.0;

        let mut sparks = Vec::with_capacity(count);
        for _ in 0..count {
            let color = spark_color(config.color, base_hue, rng);
            sparks.push(Spark::random(config, color, bounds, rng));
        }
        Self::new(origin, scale, sparks)
    }

    /// Advances and draws every spark, dropping the ones that died this tick.
    pub fn run(&mut self, canvas: &mut impl Canvas) {
        canvas.save();
        canvas.transform(Affine2::from_scale_angle_translation(
            Vec2::splat(self.scale),
            0.0,
            self.origin,
        ));
        self.sparks.retain_mut(|spark| {
            spark.update();
            spark.draw(canvas);
            !spark.is_dead()
        });
        canvas.restore();
    }

    pub fn is_dead(&self) -> bool {
        self.sparks.is_empty()
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }
}

fn spark_color(model: ColorModel, base_hue: f32, rng: &mut impl RandomSource) -> Color {
    match model {
        ColorModel::Hue { saturation, lightness } => {
            Color::hsla(base_hue, saturation, lightness.sample(rng), 1.0)
        }
        ColorModel::Rgb => random_rgb(rng, 1.0),
        ColorModel::White => Color::WHITE,
    }
}

pub(crate) fn random_rgb(rng: &mut impl RandomSource, alpha: f32) -> Color {
    let mut channel = || (rng.unit() * 255.0) as u8;
    let (r, g, b) = (channel(), channel(), channel());
    Color::rgba(r, g, b, alpha)
}
