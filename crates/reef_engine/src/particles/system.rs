//! Particle system component
//!
//! Emission model:
//! - `start(count, delay, duration)` schedules a burst of `count` particles
//!   after `delay` seconds
//! - with `duration > 0` the system keeps emitting one particle every
//!   `1 / emit_rate` seconds until `duration` seconds after the burst
//! - `duration == f32::INFINITY` emits until [`ParticleSystem::stop`]

use super::affector::Affector;
use super::particle::Particle;
use super::presets::ParticleKind;
use crate::assets::TextureHandle;
use crate::ecs::{Component, ComponentType, Entity, FrameContext};
use crate::foundation::math::{constants::TAU, Transform2D, Vec2};
use crate::render::{BlendMode, Colour, DrawCall, RenderTarget};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Burst {
    count: u32,
    delay: f32,
    duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Emission {
    elapsed: f32,
    accumulator: f32,
    duration: f32,
}

/// Emitter plus the particles it owns
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    kind: ParticleKind,
    emit_rate: f32,
    lifetime: f32,
    size: Vec2,
    blend: BlendMode,
    velocities: Vec<Vec2>,
    initial_speed: f32,
    follow_parent: bool,
    texture: Option<TextureHandle>,
    colour: Colour,
    affectors: Vec<Affector>,
    particles: Vec<Particle>,
    burst: Option<Burst>,
    emission: Option<Emission>,
    rng: StdRng,
}

impl ParticleSystem {
    /// Default particles per second while emitting
    pub const DEFAULT_EMIT_RATE: f32 = 30.0;
    /// Default particle lifetime in seconds
    pub const DEFAULT_LIFETIME: f32 = 2.0;
    /// Default particle size
    pub const DEFAULT_SIZE: f32 = 4.0;

    /// Idle system with default settings
    pub fn new(kind: ParticleKind, seed: u64) -> Self {
        Self {
            kind,
            emit_rate: Self::DEFAULT_EMIT_RATE,
            lifetime: Self::DEFAULT_LIFETIME,
            size: Vec2::new(Self::DEFAULT_SIZE, Self::DEFAULT_SIZE),
            blend: BlendMode::Alpha,
            velocities: Vec::new(),
            initial_speed: 1.0,
            follow_parent: false,
            texture: None,
            colour: Colour::WHITE,
            affectors: Vec::new(),
            particles: Vec::new(),
            burst: None,
            emission: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Preset this system was built from
    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    /// Particles per second while emitting
    pub fn set_emit_rate(&mut self, rate: f32) {
        self.emit_rate = rate.max(0.0);
    }

    /// Particles per second while emitting
    pub fn emit_rate(&self) -> f32 {
        self.emit_rate
    }

    /// Lifetime of newly spawned particles
    pub fn set_particle_lifetime(&mut self, seconds: f32) {
        self.lifetime = seconds;
    }

    /// Lifetime of newly spawned particles
    pub fn particle_lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Size of a particle quad before scaling
    pub fn set_particle_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Size of a particle quad before scaling
    pub fn particle_size(&self) -> Vec2 {
        self.size
    }

    /// Blend mode used when drawing
    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    /// Blend mode used when drawing
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Candidate initial velocities, one picked at random per particle
    pub fn set_random_initial_velocity(&mut self, velocities: Vec<Vec2>) {
        self.velocities = velocities;
    }

    /// Candidate initial velocities
    pub fn initial_velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    /// Speed of the radial default velocity used without candidates
    pub fn set_initial_speed(&mut self, speed: f32) {
        self.initial_speed = speed;
    }

    /// Keep particles in the owner's local space
    pub fn follow_parent(&mut self, follow: bool) {
        self.follow_parent = follow;
    }

    /// Whether particles live in the owner's local space
    pub fn follows_parent(&self) -> bool {
        self.follow_parent
    }

    /// Texture for every particle
    pub fn set_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
    }

    /// Base tint of new particles
    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    /// Append an affector; affectors run in the order added
    pub fn add_affector(&mut self, affector: Affector) {
        self.affectors.push(affector);
    }

    /// Affectors in application order
    pub fn affectors(&self) -> &[Affector] {
        &self.affectors
    }

    /// Live particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Schedule a burst and optional follow-up emission
    ///
    /// Replaces anything already scheduled. Live particles are kept.
    pub fn start(&mut self, count: u32, delay: f32, duration: f32) {
        self.burst = Some(Burst {
            count,
            delay: delay.max(0.0),
            duration: duration.max(0.0),
        });
        self.emission = None;
    }

    /// Burst after `delay`, then emit until stopped
    pub fn start_continuous(&mut self, count: u32, delay: f32) {
        self.start(count, delay, f32::INFINITY);
    }

    /// Stop emitting; live particles run out their lifetime
    pub fn stop(&mut self) {
        self.burst = None;
        self.emission = None;
    }

    /// Whether a burst is pending or emission is running
    pub fn is_active(&self) -> bool {
        self.burst.is_some() || self.emission.is_some()
    }

    /// Advance by `dt`; `origin` is the owner's world position
    ///
    /// Order: age, drop expired, emit, run affectors, integrate, fade.
    pub fn advance(&mut self, dt: f32, origin: Vec2) {
        for particle in &mut self.particles {
            particle.lifetime -= dt;
        }
        self.particles.retain(|particle| !particle.is_expired());

        let spawn_count = self.advance_emission(dt);
        let spawn_at = if self.follow_parent { Vec2::zeros() } else { origin };
        for _ in 0..spawn_count {
            self.spawn(spawn_at);
        }

        let base_alpha = f32::from(self.colour.a);
        for particle in &mut self.particles {
            for affector in &self.affectors {
                affector.apply(particle, dt);
            }
            particle.position += particle.velocity * dt;
            let alpha = base_alpha * particle.remaining_fraction();
            particle.colour = particle.colour.with_alpha(alpha.round() as u8);
        }
    }

    /// Number of particles to spawn this frame
    fn advance_emission(&mut self, dt: f32) -> u32 {
        let mut count = 0;

        if let Some(burst) = self.burst.as_mut() {
            burst.delay -= dt;
            if burst.delay > 0.0 {
                return 0;
            }
            let burst = *burst;
            self.burst = None;
            count += burst.count;
            if burst.duration > 0.0 {
                self.emission = Some(Emission {
                    elapsed: 0.0,
                    accumulator: 0.0,
                    duration: burst.duration,
                });
            }
            return count;
        }

        if let Some(emission) = self.emission.as_mut() {
            emission.elapsed += dt;
            if self.emit_rate > 0.0 {
                let interval = 1.0 / self.emit_rate;
                emission.accumulator += dt;
                while emission.accumulator >= interval {
                    emission.accumulator -= interval;
                    count += 1;
                }
            }
            if emission.elapsed >= emission.duration {
                self.emission = None;
            }
        }
        count
    }

    fn spawn(&mut self, position: Vec2) {
        let velocity = match self.velocities.choose(&mut self.rng) {
            Some(velocity) => *velocity,
            None => {
                let angle: f32 = self.rng.gen_range(0.0..TAU);
                Vec2::new(angle.cos(), angle.sin()) * self.initial_speed
            }
        };
        self.particles.push(Particle {
            position,
            velocity,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            colour: self.colour,
            lifetime: self.lifetime,
            max_lifetime: self.lifetime,
            kind: self.kind,
        });
    }
}

impl Component for ParticleSystem {
    fn component_type(&self) -> ComponentType {
        ComponentType::ParticleSystem
    }

    fn update(&mut self, entity: &mut Entity, dt: f32, _ctx: &mut FrameContext<'_>) {
        self.advance(dt, entity.world_position());
    }

    fn draw(&self, world: &Transform2D, target: &mut dyn RenderTarget) {
        for particle in &self.particles {
            let transform = if self.follow_parent {
                world.combine(&particle.transform())
            } else {
                particle.transform()
            };
            target.submit(DrawCall {
                texture: self.texture,
                source: None,
                size: self.size,
                origin: self.size / 2.0,
                transform,
                colour: particle.colour,
                blend: self.blend,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use approx::assert_relative_eq;

    fn system() -> ParticleSystem {
        let mut system = ParticleSystem::new(ParticleKind::Sparkle, 7);
        system.set_particle_lifetime(10.0);
        system
    }

    #[test]
    fn test_defaults() {
        let system = ParticleSystem::new(ParticleKind::Echo, 0);
        assert_relative_eq!(system.emit_rate(), 30.0);
        assert_relative_eq!(system.particle_lifetime(), 2.0);
        assert_eq!(system.particle_size(), Vec2::new(4.0, 4.0));
        assert!(!system.is_active());
    }

    #[test]
    fn test_one_shot_burst_waits_for_delay() {
        let mut system = system();
        system.start(5, 0.5, 0.0);
        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 0);
        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 5);
        assert!(!system.is_active());
        for _ in 0..10 {
            system.advance(0.25, Vec2::zeros());
        }
        assert_eq!(system.particle_count(), 5);
    }

    #[test]
    fn test_timed_emission_counts() {
        let mut system = system();
        system.set_emit_rate(4.0);
        system.start(2, 0.0, 1.0);

        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 2);
        for _ in 0..4 {
            system.advance(0.25, Vec2::zeros());
        }
        assert_eq!(system.particle_count(), 6);
        assert!(!system.is_active());
        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 6);
    }

    #[test]
    fn test_continuous_emission_until_stopped() {
        let mut system = system();
        system.set_emit_rate(4.0);
        system.start_continuous(1, 0.0);
        for _ in 0..41 {
            system.advance(0.25, Vec2::zeros());
        }
        // burst of one, then one per frame for 40 frames, minus expired (10 s lifetime)
        assert_eq!(system.particle_count(), 40);
        assert!(system.is_active());

        system.stop();
        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 39);
    }

    #[test]
    fn test_expired_particles_are_removed() {
        let mut system = ParticleSystem::new(ParticleKind::Sparkle, 1);
        system.set_particle_lifetime(0.5);
        system.start(3, 0.0, 0.0);
        system.advance(0.25, Vec2::zeros());
        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 3);
        system.advance(0.25, Vec2::zeros());
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn test_radial_default_velocity_has_initial_speed() {
        let mut system = system();
        system.set_initial_speed(3.0);
        system.start(8, 0.0, 0.0);
        system.advance(0.0, Vec2::zeros());
        for particle in system.particles() {
            assert_relative_eq!(particle.velocity.norm(), 3.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_candidate_velocities_and_world_space_spawn() {
        let mut system = system();
        let candidates = vec![Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        system.set_random_initial_velocity(candidates.clone());
        system.start(6, 0.0, 0.0);
        system.advance(0.1, Vec2::new(200.0, 300.0));
        for particle in system.particles() {
            let v = particle.velocity;
            assert!(candidates.contains(&v));
            assert_relative_eq!(particle.position.x, 200.0 + v.x * 0.1, epsilon = 1e-4);
            assert_relative_eq!(particle.position.y, 300.0 + v.y * 0.1, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_alpha_fades_with_remaining_life() {
        let mut system = ParticleSystem::new(ParticleKind::Echo, 3);
        system.set_particle_lifetime(1.0);
        system.start(1, 0.0, 0.0);
        system.advance(0.0, Vec2::zeros());
        assert_eq!(system.particles()[0].colour.a, 255);
        system.advance(0.5, Vec2::zeros());
        assert_eq!(system.particles()[0].colour.a, 128);
    }

    #[test]
    fn test_follow_parent_draws_relative_to_owner() {
        let mut system = system();
        system.follow_parent(true);
        system.start(1, 0.0, 0.0);
        system.advance(0.0, Vec2::new(500.0, 500.0));
        assert_eq!(system.particles()[0].position, Vec2::zeros());

        let mut list = DrawList::new();
        system.draw(&Transform2D::from_position(Vec2::new(40.0, 60.0)), &mut list);
        assert_eq!(list.calls[0].transform.position, Vec2::new(40.0, 60.0));
    }
}
