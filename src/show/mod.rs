use glam::Vec2;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::{ColorModel, ShowConfig};
use crate::rng::RandomSource;

pub mod explosion;
pub mod rocket;
pub mod spark;

pub use explosion::Explosion;
pub use rocket::Rocket;

#[derive(Debug, Clone)]
pub enum Entity {
    Rocket(Rocket),
    Explosion(Explosion),
}

impl Entity {
    fn run(&mut self, canvas: &mut impl Canvas, rng: &mut impl RandomSource) {
        match self {
            Entity::Rocket(rocket) => {
                rocket.update();
                rocket.draw(canvas, rng);
            }
            Entity::Explosion(explosion) => explosion.run(canvas),
        }
    }

    pub fn is_dead(&self) -> bool {
        match self {
            Entity::Rocket(rocket) => rocket.is_dead(),
            Entity::Explosion(explosion) => explosion.is_dead(),
        }
    }
}

/// Root of the simulation: launches rockets on a cadence and turns every
/// exploded rocket into a burst.
pub struct Show {
    config: ShowConfig,
    viewport: Vec2,
    entities: Vec<Entity>,
    elapsed_ms: f64,
    next_launch_ms: f64,
}

impl Show {
    pub fn new(config: ShowConfig, viewport: Vec2, rng: &mut impl RandomSource) -> Self {
        let next_launch_ms = config.launch_interval_ms.sample(rng) as f64;
        Self {
            config,
            viewport,
            entities: Vec::new(),
            elapsed_ms: 0.0,
            next_launch_ms,
        }
    }

    /// One frame: launch if the cadence is due, then run every entity.
    pub fn tick(&mut self, dt_ms: f64, canvas: &mut impl Canvas, rng: &mut impl RandomSource) {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= self.next_launch_ms {
            self.launch(rng);
            self.next_launch_ms = self.elapsed_ms + self.config.launch_interval_ms.sample(rng) as f64;
        }
        self.run(canvas, rng);
    }

    pub fn launch(&mut self, rng: &mut impl RandomSource) {
        let alpha = self.config.rocket.trail_alpha;
        let color = match self.config.burst.color {
            ColorModel::White => Color::WHITE.with_alpha(alpha),
            _ => explosion::random_rgb(rng, alpha),
        };
        let rocket = Rocket::random(&self.config.rocket, color, self.viewport, rng);
        log::debug!(
            "launch at x={:.1}, bursting at y={:.1}",
            rocket.position().x,
            rocket.explode_height()
        );
        self.entities.push(Entity::Rocket(rocket));
    }

    /// Runs every entity once and compacts the dead ones. Each exploded rocket
    /// is replaced by a burst at its final position; bursts spawned here first
    /// run on the next tick.
    pub fn run(&mut self, canvas: &mut impl Canvas, rng: &mut impl RandomSource) {
        let mut bursts = Vec::new();
        self.entities.retain_mut(|entity| {
            entity.run(canvas, rng);
            if !entity.is_dead() {
                return true;
            }
            if let Entity::Rocket(rocket) = entity {
                bursts.push((rocket.position(), rocket.scale()));
            }
            false
        });

        for (origin, scale) in bursts {
            let explosion = Explosion::burst(origin, scale, &self.config.burst, self.viewport, rng);
            log::debug!(
                "burst of {} sparks at ({:.1}, {:.1})",
                explosion.sparks().len(),
                origin.x,
                origin.y
            );
            self.entities.push(Entity::Explosion(explosion));
        }
    }

    /// New sparks and rockets use the new viewport; live ones keep theirs.
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Never pruned itself; dead only in the sense of having nothing to show.
    pub fn is_dead(&self) -> bool {
        self.entities.is_empty()
    }

    #[cfg(test)]
    fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }
}
