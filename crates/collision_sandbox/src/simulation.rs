//! Bodies bouncing around the collision world

use collision_engine::foundation::math::Vec2;
use collision_engine::geometry::Rect;
use collision_engine::{CollisionEngine, CollisionError, CollisionEvents, EntityId};
use rand::Rng;

use crate::config::SandboxConfig;

/// Moving box registered with the engine
#[derive(Debug, Clone)]
pub struct Body {
    /// Engine identity
    pub id: EntityId,
    /// Center position
    pub position: Vec2,
    /// Units per second
    pub velocity: Vec2,
    /// Edge lengths
    pub size: Vec2,
}

impl Body {
    /// Advance by `dt`, reflecting off the edges of `bounds`
    fn advance(&mut self, dt: f32, bounds: &Rect) {
        self.position += self.velocity * dt;

        let half = self.size * 0.5;
        if self.position.x - half.x < bounds.left() || self.position.x + half.x > bounds.right() {
            self.velocity.x = -self.velocity.x;
            self.position.x = self
                .position
                .x
                .clamp(bounds.left() + half.x, bounds.right() - half.x);
        }
        if self.position.y - half.y < bounds.top() || self.position.y + half.y > bounds.bottom() {
            self.velocity.y = -self.velocity.y;
            self.position.y = self
                .position
                .y
                .clamp(bounds.top() + half.y, bounds.bottom() - half.y);
        }
    }
}

/// Running totals over a simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Ticks simulated
    pub ticks: u32,
    /// Collisions started
    pub entered: usize,
    /// Collisions ended
    pub exited: usize,
    /// Most pairs colliding at once
    pub peak_contacts: usize,
}

/// Collision engine driven by bouncing bodies
#[derive(Debug)]
pub struct Simulation {
    engine: CollisionEngine,
    bodies: Vec<Body>,
    bounds: Rect,
    stats: SimulationStats,
}

impl Simulation {
    /// Create the world and spawn `body_count` random bodies inside it
    pub fn spawn(config: &SandboxConfig, rng: &mut impl Rng) -> Result<Self, CollisionError> {
        let mut engine = CollisionEngine::new(config.world.clone())?;
        let bounds = config.world.world_rect();
        // Bodies must fit inside the world to bounce off its walls
        let limit = bounds.width().min(bounds.height()).floor();
        let min_size = config.min_size.max(0.0).min(limit);
        let max_size = config.max_size.max(min_size).min(limit);
        if config.max_size > limit {
            log::warn!(
                "Body size {} exceeds the world, capping at {}",
                config.max_size,
                limit
            );
        }
        // Keep every body clear of the walls at spawn time
        let margin = max_size.ceil() * 0.5;

        let mut bodies = Vec::with_capacity(config.body_count);
        for index in 0..config.body_count {
            // Whole-unit sizes keep wall clamping exact
            let size = Vec2::new(
                rng.gen_range(min_size..=max_size).round(),
                rng.gen_range(min_size..=max_size).round(),
            );
            let position = Vec2::new(
                rng.gen_range(bounds.left() + margin..=bounds.right() - margin),
                rng.gen_range(bounds.top() + margin..=bounds.bottom() - margin),
            );
            let velocity = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0))
                * config.max_speed;

            let body = Body {
                id: EntityId::new(format!("body-{index:03}")),
                position,
                velocity,
                size,
            };
            engine.try_register(&body.id, body.position, body.size)?;
            bodies.push(body);
        }

        log::info!("Spawned {} bodies in '{}'", bodies.len(), engine.name());
        Ok(Self {
            engine,
            bodies,
            bounds,
            stats: SimulationStats::default(),
        })
    }

    /// Move every body by one time step and refresh collisions
    pub fn step(&mut self, dt: f32) -> Result<CollisionEvents, CollisionError> {
        for body in &mut self.bodies {
            body.advance(dt, &self.bounds);
            self.engine.try_move_to(body.id.as_str(), body.position)?;
        }

        let events = self.engine.update();
        self.stats.ticks += 1;
        self.stats.entered += events.entered.len();
        self.stats.exited += events.exited.len();
        self.stats.peak_contacts = self.stats.peak_contacts.max(self.engine.colliding_pairs().len());
        Ok(events)
    }

    /// Collision engine
    pub fn engine(&self) -> &CollisionEngine {
        &self.engine
    }

    /// Simulated bodies
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Totals so far
    pub fn stats(&self) -> SimulationStats {
        self.stats
    }
}
