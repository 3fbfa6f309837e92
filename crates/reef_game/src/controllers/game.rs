//! Session-level game controller
//!
//! Lives outside the entity tree and is the only place entities are spawned.
//! It sees every message before the scene does, which keeps spawning out of
//! the middle of a tree traversal.

use super::bodypart::BodypartController;
use super::plankton::PlanktonController;
use crate::assets::GameAssets;
use crate::config::GameConfig;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reef_engine::ecs::{Entity, FrameContext, InputComponent, Layer, Scene};
use reef_engine::events::{Message, PlanktonEvent, PlanktonKind, PlayerEvent, StateId, UiEvent};
use reef_engine::foundation::collections::{BodyHandle, EntityId};
use reef_engine::foundation::math::{FloatRect, Vec2};
use reef_engine::particles::{ParticleKind, ParticleSystem};
use reef_engine::physics::PhysicsComponent;

/// One link of the player's chain, head first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    /// Entity of the head or part
    pub entity: EntityId,
    /// Its body
    pub body: BodyHandle,
}

/// Spawns the player, body parts and plankton, and keeps score
#[derive(Debug)]
pub struct GameController {
    config: GameConfig,
    assets: GameAssets,
    rng: StdRng,
    player: Option<EntityId>,
    chain: Vec<ChainLink>,
    detaching: Vec<EntityId>,
    plankton: Vec<EntityId>,
    base_length: f32,
    base_size: f32,
    base_scale: f32,
    score: u32,
    spawn_areas: [FloatRect; 2],
}

impl GameController {
    /// Create a controller; spawning starts when the menu closes
    pub fn new(config: GameConfig, assets: GameAssets) -> Self {
        let bounds = config.world.bounds;
        let screen_width = config.world.screen_width;
        let spawn_areas = [
            FloatRect::new(bounds.left, bounds.top, bounds.left.abs(), bounds.height),
            FloatRect::new(
                screen_width,
                bounds.top,
                (bounds.width - screen_width) / 2.0,
                bounds.height,
            ),
        ];
        let rng = StdRng::seed_from_u64(config.session.seed);

        Self {
            config,
            assets,
            rng,
            player: None,
            chain: Vec::new(),
            detaching: Vec::new(),
            plankton: Vec::new(),
            base_length: 0.0,
            base_size: 0.0,
            base_scale: 0.0,
            score: 0,
            spawn_areas,
        }
    }

    /// Player entity, while alive
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Chain links, head first; parts being detached are included until
    /// they report removal
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    /// Body parts still attached and not leaving
    pub fn body_part_count(&self) -> usize {
        self.attached_len().saturating_sub(1)
    }

    /// Score so far this round
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Constraint length the next part will get
    pub fn constraint_length(&self) -> f32 {
        self.base_length * self.shrink()
    }

    /// Radius the next part will get
    pub fn next_part_size(&self) -> f32 {
        self.base_size * self.shrink()
    }

    /// Drawable scale the next part will get
    pub fn next_part_scale(&self) -> f32 {
        self.base_scale * self.shrink()
    }

    /// `part_scale^n` for `n` attached parts; parts already asked to leave
    /// no longer count
    fn shrink(&self) -> f32 {
        let attached = i32::try_from(self.body_part_count()).unwrap_or(i32::MAX);
        self.config.player.part_scale.powi(attached)
    }

    /// Off-screen rectangles plankton spawn in
    pub fn spawn_areas(&self) -> &[FloatRect; 2] {
        &self.spawn_areas
    }

    /// Plankton still in the scene and not flagged for removal
    pub fn live_plankton(&self, scene: &Scene) -> usize {
        self.plankton
            .iter()
            .filter(|id| scene.entity(**id).is_some_and(|e| !e.is_destroyed()))
            .count()
    }

    fn attached_len(&self) -> usize {
        self.chain.len() - self.detaching.len().min(self.chain.len())
    }

    /// React to a message; called before the scene sees it
    pub fn handle_message(
        &mut self,
        message: &Message,
        scene: &mut Scene,
        ctx: &mut FrameContext<'_>,
    ) {
        match *message {
            Message::Ui(UiEvent::MenuClosed { state: StateId::Menu }) if self.player.is_none() => {
                self.start_round(scene, ctx);
            }
            Message::Ui(UiEvent::MenuOpened { state }) => {
                log::debug!("GameController: menu {:?} opened", state);
            }
            Message::Player(PlayerEvent::Died) => {
                log::info!("GameController: player died, score {}", self.score);
                self.player = None;
                self.chain.clear();
                self.detaching.clear();
                ctx.bus.send(Message::Ui(UiEvent::RequestState { state: StateId::Score }));
            }
            Message::Player(PlayerEvent::PartRemoved { part }) => self.part_removed(part),
            Message::Player(PlayerEvent::PartAdded { mass }) => {
                log::debug!("GameController: part added (mass {:.1})", mass);
                self.play_echo(scene);
            }
            Message::Plankton(PlanktonEvent::Died { kind }) => self.plankton_died(kind, scene, ctx),
            _ => {}
        }
    }

    fn start_round(&mut self, scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        self.score = 0;
        self.plankton.clear();
        self.spawn_player(scene, ctx);
        for _ in 0..self.config.player.initial_body_parts {
            self.add_body_part(scene, ctx);
        }
        for _ in 0..self.config.plankton.initial_count {
            self.spawn_plankton(scene, ctx);
        }
        log::info!(
            "GameController: round started with {} part(s) and {} plankton",
            self.body_part_count(),
            self.live_plankton(scene)
        );
    }

    fn particles(&mut self, kind: ParticleKind) -> ParticleSystem {
        ParticleSystem::create(kind, &mut self.rng)
    }

    fn sparkle(&mut self) -> ParticleSystem {
        let mut sparkle = self.particles(ParticleKind::Sparkle);
        sparkle.set_texture(self.assets.spark);
        sparkle.start(1, 0.0, 0.5);
        sparkle
    }

    fn trail(&mut self) -> ParticleSystem {
        let mut trail = self.particles(ParticleKind::Trail);
        trail.set_texture(self.assets.circle);
        trail.set_particle_size(Vec2::new(2.0, 2.0));
        trail
    }

    fn spawn_player(&mut self, scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        let player = &self.config.player;
        let position = player.spawn_position();

        let body = ctx.physics.add_body(player.size);
        ctx.physics.set_trigger(body, true);
        if let Some(b) = ctx.physics.body_mut(body) {
            b.position = position;
        }

        let input = InputComponent {
            acceleration: player.acceleration,
            drag: player.drag,
            max_speed: player.max_speed,
        };
        self.base_length = player.size + player.size * player.part_scale + player.padding;
        self.base_size = player.size * player.part_scale;
        self.base_scale = player.part_scale;

        let mut entity = Entity::new();
        entity.set_position(position);
        entity.add_component("drawable", self.assets.head.drawable(0));
        entity.add_component("control", PhysicsComponent::new(body));
        let trail = self.trail();
        entity.add_component("trail", trail);
        let sparkle = self.sparkle();
        entity.add_component("sparkle", sparkle);
        let mut echo = self.particles(ParticleKind::Echo);
        echo.set_texture(self.assets.circle);
        entity.add_component("echo", echo);
        entity.add_component("input", input);

        let id = scene.add(Layer::FrontMiddle, entity);
        self.player = Some(id);
        self.chain = vec![ChainLink { entity: id, body }];
        self.detaching.clear();
        log::info!("GameController: spawned player {:?} at {:?}", id, (position.x, position.y));
    }

    /// Attach a new part behind the last attached link
    pub fn add_body_part(
        &mut self,
        scene: &mut Scene,
        ctx: &mut FrameContext<'_>,
    ) -> Option<EntityId> {
        let player = self.player?;
        let attached = self.attached_len();
        let tail = *self.chain.get(attached.checked_sub(1)?)?;
        let tail_velocity = ctx.physics.body(tail.body).map_or_else(Vec2::zeros, |b| b.velocity);

        let spawn = self.config.player.spawn_position();
        let length = self.constraint_length();
        let position = Vec2::new(spawn.x - length * attached as f32, spawn.y);

        let body = ctx.physics.attach_body(self.next_part_size(), length, tail.body);
        let mass = match ctx.physics.body_mut(body) {
            Some(b) => {
                b.position = position;
                b.velocity = tail_velocity;
                b.mass()
            }
            None => 0.0,
        };

        let frame_count = self.assets.body_part.animation.frame_count;
        let max_parts = self.config.player.max_body_parts.max(1) as u32;
        let start_frame = frame_count / max_parts * attached as u32;
        let mut drawable = self.assets.body_part.drawable(start_frame);
        let part_scale = self.next_part_scale();
        drawable.scale = Vec2::new(part_scale, part_scale);

        let mut entity = Entity::new();
        entity.set_position(position);
        entity.add_component("drawable", drawable);
        entity.add_component("control", PhysicsComponent::new(body));
        let sparkle = self.sparkle();
        entity.add_component("sparkle", sparkle);
        entity.add_component("controller", BodypartController::new());

        let Some(id) = scene.add_child(player, entity) else {
            ctx.physics.remove_body(body);
            return None;
        };
        // keep attached links ahead of any that are leaving
        self.chain.insert(attached, ChainLink { entity: id, body });

        ctx.bus.send(Message::Player(PlayerEvent::PartAdded { mass }));
        log::debug!(
            "GameController: added body part {:?} ({} attached)",
            id,
            self.body_part_count()
        );
        Some(id)
    }

    fn part_removed(&mut self, part: EntityId) {
        let Some(index) = self.chain.iter().position(|link| link.entity == part) else {
            return;
        };
        self.chain.remove(index);
        self.detaching.retain(|id| *id != part);
        log::debug!("GameController: body part {:?} removed", part);
    }

    fn play_echo(&mut self, scene: &mut Scene) {
        let Some(player) = self.player.and_then(|id| scene.entity_mut(id)) else {
            return;
        };
        if let Some(echo) = player.component_mut::<ParticleSystem>("echo") {
            echo.start(1, 0.0, 0.0);
        }
    }

    fn plankton_died(&mut self, kind: PlanktonKind, scene: &mut Scene, ctx: &mut FrameContext<'_>) {
        let Some(player) = self.player else {
            return;
        };
        self.score += self.config.plankton.points.for_kind(kind);
        log::debug!("GameController: ate {:?} plankton, score {}", kind, self.score);

        match kind {
            PlanktonKind::Good => {
                if self.body_part_count() < self.config.player.max_body_parts {
                    self.add_body_part(scene, ctx);
                }
            }
            PlanktonKind::Bad => {
                if self.body_part_count() > 0 {
                    let tail = self.chain[self.attached_len() - 1].entity;
                    self.detaching.push(tail);
                    ctx.bus.send(Message::Player(PlayerEvent::DetachPart { part: tail }));
                } else {
                    if let Some(entity) = scene.entity_mut(player) {
                        entity.destroy();
                    }
                    self.player = None;
                    ctx.bus.send(Message::Player(PlayerEvent::Died));
                    log::info!("GameController: player lost its last part");
                    return;
                }
            }
            PlanktonKind::Bonus => {}
        }

        self.plankton.retain(|id| scene.entity(*id).is_some_and(|e| !e.is_destroyed()));
        while self.plankton.len() < self.config.plankton.max_count {
            if self.spawn_plankton(scene, ctx).is_none() {
                break;
            }
        }
    }

    fn choose_kind(&mut self) -> PlanktonKind {
        let weights = self.config.plankton.weights.as_array();
        match WeightedIndex::new(weights.iter().map(|(_, weight)| *weight)) {
            Ok(index) => weights[index.sample(&mut self.rng)].0,
            Err(_) => PlanktonKind::Good,
        }
    }

    /// Spawn one plankton off screen, heading for a random point on screen
    pub fn spawn_plankton(
        &mut self,
        scene: &mut Scene,
        ctx: &mut FrameContext<'_>,
    ) -> Option<EntityId> {
        let enemy = self.player?;
        let area = self.spawn_areas[self.rng.gen_range(0..self.spawn_areas.len())];
        let world = &self.config.world;
        let position = Vec2::new(
            area.left + area.width / 2.0,
            self.rng.gen_range(0.0..=world.screen_height),
        );
        let aim = Vec2::new(
            self.rng.gen_range(0.0..=world.screen_width),
            self.rng.gen_range(0.0..=world.screen_height),
        );
        let plankton = &self.config.plankton;
        let speed = if plankton.max_speed > plankton.min_speed {
            self.rng.gen_range(plankton.min_speed..plankton.max_speed)
        } else {
            plankton.min_speed
        };
        let heading = aim - position;
        let velocity = if heading.norm() > f32::EPSILON {
            heading.normalize() * speed
        } else {
            Vec2::zeros()
        };

        let body = ctx.physics.add_body(plankton.radius);
        if let Some(b) = ctx.physics.body_mut(body) {
            b.position = position;
            b.velocity = velocity;
        }

        let kind = self.choose_kind();
        let variant = self.rng.gen_range(0..self.assets.food.len());
        let drawable = self.assets.food[variant].drawable(0);
        let mut controller = PlanktonController::new(kind);
        controller.set_enemy_id(enemy);

        let mut entity = Entity::new();
        entity.set_position(position);
        entity.add_component("control", PhysicsComponent::new(body));
        entity.add_component("drawable", drawable);
        let trail = self.trail();
        entity.add_component("trail", trail);
        entity.add_component("controller", controller);

        let id = scene.add(Layer::FrontRear, entity);
        self.plankton.push(id);
        log::debug!("GameController: spawned {:?} plankton {:?}", kind, id);
        Some(id)
    }
}
