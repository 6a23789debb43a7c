use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rng::RandomSource;

/// Upper bound on sparks per burst.
pub const MAX_SPARKS: usize = 2000;
/// Upper bound on spark speed and on gravity, in burst-local units per tick.
pub const MAX_SPEED: f32 = 50.0;

/// Uniform range `[min, max]`, written `[min, max]` in TOML. Equal ends give a
/// fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Span(pub f32, pub f32);

impl Span {
    pub fn fixed(value: f32) -> Self {
        Span(value, value)
    }

    pub fn sample(&self, rng: &mut impl RandomSource) -> f32 {
        rng.between(self.0, self.1)
    }

    fn check(&self, field: &'static str) -> Result<()> {
        if !self.0.is_finite() || !self.1.is_finite() {
            return Err(invalid(field, "bounds must be finite"));
        }
        if self.0 > self.1 {
            return Err(invalid(field, format!("min {} is greater than max {}", self.0, self.1)));
        }
        Ok(())
    }
}

/// Spark color scheme of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ColorModel {
    /// One random hue per burst, random lightness per spark.
    Hue { saturation: f32, lightness: Span },
    /// Independent random RGB per spark.
    Rgb,
    White,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RocketConfig {
    /// Launch x as a fraction of the viewport width.
    pub launch_x: Span,
    /// Upward acceleration per tick, in world units.
    pub acceleration: f32,
    /// Explosion height as a fraction of the viewport height.
    pub explode_height: Span,
    /// Trail line width and burst scale.
    pub scale: Span,
    pub trail_alpha: f32,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            launch_x: Span(0.1, 0.9),
            acceleration: 0.02,
            explode_height: Span(0.3, 0.8),
            scale: Span(0.1, 0.9),
            trail_alpha: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BurstConfig {
    /// Inclusive `[min, max]` number of sparks per burst.
    pub spark_count: (usize, usize),
    /// Initial spark speed per tick, in burst-local units.
    pub speed: Span,
    /// Lifespan lost per tick, sampled per spark.
    pub decay: Span,
    /// Downward acceleration per tick.
    pub gravity: f32,
    pub color: ColorModel,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            spark_count: (50, 199),
            speed: Span(1.0, 2.0),
            decay: Span(0.01, 0.02),
            gravity: 0.05,
            color: ColorModel::Hue {
                saturation: 100.0,
                lightness: Span(50.0, 100.0),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowConfig {
    /// Viewport height in world units; the width follows the surface aspect.
    pub world_height: f32,
    pub launch_interval_ms: Span,
    pub rocket: RocketConfig,
    pub burst: BurstConfig,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            world_height: 200.0,
            launch_interval_ms: Span::fixed(250.0),
            rocket: RocketConfig::default(),
            burst: BurstConfig::default(),
        }
    }
}

impl ShowConfig {
    /// Reads a TOML file; keys it leaves out keep the `classic` values.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ShowConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.world_height.is_finite() && self.world_height > 0.0) {
            return Err(invalid("world_height", "must be positive"));
        }

        self.launch_interval_ms.check("launch_interval_ms")?;
        if self.launch_interval_ms.0 <= 0.0 {
            return Err(invalid("launch_interval_ms", "must be positive"));
        }

        let rocket = &self.rocket;
        rocket.launch_x.check("rocket.launch_x")?;
        if rocket.launch_x.0 < 0.0 || rocket.launch_x.1 > 1.0 {
            return Err(invalid("rocket.launch_x", "must lie within [0, 1]"));
        }
        if !(rocket.acceleration.is_finite() && rocket.acceleration > 0.0) {
            return Err(invalid("rocket.acceleration", "must be positive"));
        }
        rocket.explode_height.check("rocket.explode_height")?;
        if rocket.explode_height.0 <= 0.0 || rocket.explode_height.1 > 1.0 {
            return Err(invalid("rocket.explode_height", "must lie within (0, 1]"));
        }
        rocket.scale.check("rocket.scale")?;
        if rocket.scale.0 <= 0.0 {
            return Err(invalid("rocket.scale", "must be positive"));
        }
        if !(0.0..=1.0).contains(&rocket.trail_alpha) {
            return Err(invalid("rocket.trail_alpha", "must lie within [0, 1]"));
        }

        let burst = &self.burst;
        let (min, max) = burst.spark_count;
        if min > max {
            return Err(invalid("burst.spark_count", format!("min {min} is greater than max {max}")));
        }
        if max > MAX_SPARKS {
            return Err(invalid("burst.spark_count", format!("max {max} exceeds {MAX_SPARKS}")));
        }
        burst.speed.check("burst.speed")?;
        if burst.speed.0 < 0.0 || burst.speed.1 > MAX_SPEED {
            return Err(invalid("burst.speed", format!("must lie within [0, {MAX_SPEED}]")));
        }
        burst.decay.check("burst.decay")?;
        if burst.decay.0 <= 0.0 {
            return Err(invalid("burst.decay", "must be positive"));
        }
        if !(burst.gravity.is_finite() && burst.gravity.abs() <= MAX_SPEED) {
            return Err(invalid("burst.gravity", format!("must lie within [-{MAX_SPEED}, {MAX_SPEED}]")));
        }
        if let ColorModel::Hue { saturation, lightness } = burst.color {
            if !(0.0..=100.0).contains(&saturation) {
                return Err(invalid("burst.color.saturation", "must lie within [0, 100]"));
            }
            lightness.check("burst.color.lightness")?;
        }

        Ok(())
    }
}

/// Built-in tunings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Multi-colored hue bursts, four launches per second
    #[default]
    Classic,
    /// Large white bursts, one launch per second
    Mono,
    /// Random RGB sparks with fast decay, two launches per second
    Confetti,
}

impl Preset {
    pub fn config(self) -> ShowConfig {
        match self {
            Preset::Classic => ShowConfig::default(),
            Preset::Mono => ShowConfig {
                launch_interval_ms: Span::fixed(1000.0),
                rocket: RocketConfig {
                    explode_height: Span(0.3, 0.6),
                    scale: Span(0.3, 0.6),
                    ..RocketConfig::default()
                },
                burst: BurstConfig {
                    spark_count: (166, 166),
                    decay: Span::fixed(0.012),
                    gravity: 0.08,
                    color: ColorModel::White,
                    ..BurstConfig::default()
                },
                ..ShowConfig::default()
            },
            Preset::Confetti => ShowConfig {
                launch_interval_ms: Span::fixed(500.0),
                rocket: RocketConfig {
                    explode_height: Span(0.4, 0.85),
                    scale: Span(0.4, 0.8),
                    ..RocketConfig::default()
                },
                burst: BurstConfig {
                    spark_count: (120, 240),
                    speed: Span(0.3, 2.0),
                    decay: Span(0.0125, 0.0625),
                    color: ColorModel::Rgb,
                    ..BurstConfig::default()
                },
                ..ShowConfig::default()
            },
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in [Preset::Classic, Preset::Mono, Preset::Confetti] {
            preset.config().validate().unwrap();
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ShowConfig = toml::from_str(
            r#"
            launch_interval_ms = [400.0, 800.0]

            [burst]
            spark_count = [10, 20]
            color = { model = "rgb" }
            "#,
        )
        .unwrap();

        assert_eq!(config.launch_interval_ms, Span(400.0, 800.0));
        assert_eq!(config.burst.spark_count, (10, 20));
        assert_eq!(config.burst.color, ColorModel::Rgb);
        assert_eq!(config.burst.decay, BurstConfig::default().decay);
        assert_eq!(config.rocket, RocketConfig::default());
        assert_eq!(config.world_height, 200.0);
    }

    #[test]
    fn test_hue_model_from_toml() {
        let config: ShowConfig = toml::from_str(
            r#"
            [burst.color]
            model = "hue"
            saturation = 80.0
            lightness = [40.0, 60.0]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.burst.color,
            ColorModel::Hue {
                saturation: 80.0,
                lightness: Span(40.0, 60.0)
            }
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: std::result::Result<ShowConfig, _> = toml::from_str("launch_rate = 4");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors_name_the_field() {
        let mut config = ShowConfig::default();
        config.burst.decay = Span(0.0, 0.02);
        match config.validate() {
            Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "burst.decay"),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut config = ShowConfig::default();
        config.rocket.explode_height = Span(0.8, 0.3);
        match config.validate() {
            Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "rocket.explode_height"),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut config = ShowConfig::default();
        config.launch_interval_ms = Span::fixed(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_burst_upper_bounds() {
        let field_of = |config: ShowConfig| match config.validate() {
            Err(Error::InvalidConfig { field, .. }) => field,
            other => panic!("unexpected result: {other:?}"),
        };

        let mut config = ShowConfig::default();
        config.burst.speed = Span::fixed(1.0e7);
        assert_eq!(field_of(config), "burst.speed");

        let mut config = ShowConfig::default();
        config.burst.spark_count = (10, usize::MAX);
        assert_eq!(field_of(config), "burst.spark_count");

        let mut config = ShowConfig::default();
        config.burst.gravity = -1.0e9;
        assert_eq!(field_of(config), "burst.gravity");

        let mut config = ShowConfig::default();
        config.burst.speed = Span(0.0, MAX_SPEED);
        config.burst.spark_count = (MAX_SPARKS, MAX_SPARKS);
        config.validate().unwrap();
    }

    #[test]
    fn test_classic_hue_defaults() {
        assert_eq!(
            BurstConfig::default().color,
            ColorModel::Hue {
                saturation: 100.0,
                lightness: Span(50.0, 100.0)
            }
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = ShowConfig::load(Path::new("/nonexistent/termworks.toml")).unwrap_err();
        assert!(matches!(err, Error::ReadConfig { .. }));
    }
}
