//! Plankton behaviour: health, tint, turning and death

use reef_engine::ecs::{AnimatedDrawable, Component, ComponentType, Entity, FrameContext};
use reef_engine::events::{Message, PhysicsEvent, PlanktonEvent, PlanktonKind, PlayerEvent};
use reef_engine::foundation::collections::EntityId;
use reef_engine::foundation::math::utils;
use reef_engine::physics::PhysicsComponent;
use reef_engine::render::Colour;

const MAX_HEALTH: f32 = 100.0;
/// Health lost per second while touching the enemy
const HEALTH_REDUCTION: f32 = 45.0;
const ROTATION_SPEED: f32 = 450.0;
const ROTATION_SPEED_MULTIPLIER: f32 = 0.95;
const ROTATION_TOLERANCE: f32 = 0.1;

/// Tint for a plankton kind, before health fading
pub fn kind_colour(kind: PlanktonKind) -> Colour {
    match kind {
        PlanktonKind::Good => Colour::rgba(220, 230, 210, 180),
        PlanktonKind::Bad => Colour::rgba(230, 220, 210, 180),
        PlanktonKind::Bonus => Colour::rgba(200, 200, 230, 180),
    }
}

/// Script component driving one plankton
///
/// Needs "control" (physics) and "drawable" siblings.
#[derive(Debug, Clone)]
pub struct PlanktonController {
    kind: PlanktonKind,
    enemy: Option<EntityId>,
    health: f32,
    health_hit: bool,
    request_rotation: bool,
    suicide: bool,
    dead: bool,
    target_rotation: f32,
    rotation_speed: f32,
}

impl PlanktonController {
    /// New controller at full health
    pub fn new(kind: PlanktonKind) -> Self {
        Self {
            kind,
            enemy: None,
            health: MAX_HEALTH,
            health_hit: false,
            request_rotation: false,
            suicide: false,
            dead: false,
            target_rotation: 0.0,
            rotation_speed: ROTATION_SPEED,
        }
    }

    /// Entity whose touch hurts this plankton
    pub fn set_enemy_id(&mut self, enemy: EntityId) {
        self.enemy = Some(enemy);
    }

    /// Kind
    pub fn kind(&self) -> PlanktonKind {
        self.kind
    }

    /// Current health
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether a turn is in progress
    pub fn is_rotating(&self) -> bool {
        self.request_rotation
    }

    fn request_rotation(&mut self, target: f32) {
        self.target_rotation = utils::wrap_degrees(target);
        self.rotation_speed = ROTATION_SPEED;
        self.request_rotation = true;
    }

    /// Turn `current` toward the target, never past it
    fn turn(&mut self, current: f32, dt: f32) -> f32 {
        let remaining = utils::shortest_turn(current, self.target_rotation);
        if remaining.abs() < ROTATION_TOLERANCE {
            self.request_rotation = false;
            return current;
        }

        let step = self.rotation_speed * dt;
        let applied = remaining.signum() * step.min(remaining.abs());
        self.rotation_speed *= ROTATION_SPEED_MULTIPLIER;

        if (remaining - applied).abs() < ROTATION_TOLERANCE || step < ROTATION_TOLERANCE {
            self.request_rotation = false;
        }
        utils::wrap_degrees(current + applied)
    }
}

impl Component for PlanktonController {
    fn component_type(&self) -> ComponentType {
        ComponentType::Script
    }

    fn on_start(&mut self, entity: &mut Entity, ctx: &mut FrameContext<'_>) {
        let handle = entity.require::<PhysicsComponent>("control").handle();
        entity.require::<AnimatedDrawable>("drawable");
        if let Some(body) = ctx.physics.body(handle) {
            self.request_rotation(utils::rotation(body.velocity));
        }
    }

    fn update(&mut self, entity: &mut Entity, dt: f32, ctx: &mut FrameContext<'_>) {
        if self.health_hit {
            self.health -= HEALTH_REDUCTION * dt;
            self.health_hit = false;
        }

        if self.request_rotation {
            let current = entity.require::<AnimatedDrawable>("drawable").rotation;
            let rotation = self.turn(current, dt);
            entity.require_mut::<AnimatedDrawable>("drawable").rotation = rotation;
        }

        if self.suicide {
            entity.destroy();
        } else if self.health <= 0.0 && !self.dead {
            self.dead = true;
            entity.destroy();
            log::debug!("Plankton {:?} ({:?}) eaten", entity.id(), self.kind);
            ctx.bus.send(Message::Plankton(PlanktonEvent::Died { kind: self.kind }));
        }

        let colour = kind_colour(self.kind);
        let alpha = (self.health / MAX_HEALTH * f32::from(colour.a)).max(0.0);
        entity.require_mut::<AnimatedDrawable>("drawable").colour = colour.with_alpha(alpha as u8);
    }

    fn handle_message(
        &mut self,
        message: &Message,
        entity: &mut Entity,
        ctx: &mut FrameContext<'_>,
    ) {
        match message {
            Message::Physics(event @ PhysicsEvent::Trigger { .. }) => {
                let enemy = self.enemy;
                assert!(
                    enemy.is_some(),
                    "plankton {:?} received a trigger before its enemy id was set",
                    entity.id()
                );
                if enemy.is_some_and(|enemy| event.involves(enemy)) && event.involves(entity.id()) {
                    self.health_hit = true;
                }
            }
            Message::Physics(event @ PhysicsEvent::Collision { .. }) => {
                if event.involves(entity.id()) {
                    let handle = entity.require::<PhysicsComponent>("control").handle();
                    if let Some(body) = ctx.physics.body(handle) {
                        self.request_rotation(utils::rotation(body.velocity));
                    }
                }
            }
            Message::Player(PlayerEvent::Died) => self.suicide = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use reef_engine::assets::AnimationData;
    use reef_engine::ecs::{Layer, Scene};
    use reef_engine::events::MessageBus;
    use reef_engine::foundation::math::Vec2;
    use reef_engine::input::InputState;
    use reef_engine::physics::PhysicsWorld;

    struct Harness {
        bus: MessageBus,
        physics: PhysicsWorld,
        input: InputState,
        scene: Scene,
        plankton: EntityId,
        enemy: EntityId,
    }

    impl Harness {
        fn new(kind: PlanktonKind, velocity: Vec2) -> Self {
            let mut physics = PhysicsWorld::default();
            let mut scene = Scene::new();
            let enemy = scene.add(Layer::FrontMiddle, Entity::new());

            let handle = physics.add_body(32.0);
            physics.body_mut(handle).unwrap().position = Vec2::new(500.0, 500.0);
            physics.body_mut(handle).unwrap().velocity = velocity;

            let mut controller = PlanktonController::new(kind);
            controller.set_enemy_id(enemy);
            let mut entity = Entity::new();
            entity.add_component("control", PhysicsComponent::new(handle));
            let animation = AnimationData::single_clip((32, 32), 1, 1.0);
            entity.add_component("drawable", AnimatedDrawable::new(None, animation));
            entity.add_component("controller", controller);
            let plankton = scene.add(Layer::FrontRear, entity);

            Self {
                bus: MessageBus::new(),
                physics,
                input: InputState::new(),
                scene,
                plankton,
                enemy,
            }
        }

        fn update(&mut self, dt: f32) {
            let mut ctx = FrameContext {
                bus: &mut self.bus,
                physics: &mut self.physics,
                input: &self.input,
            };
            self.scene.update(dt, &mut ctx);
        }

        fn deliver(&mut self, message: Message) {
            let mut ctx = FrameContext {
                bus: &mut self.bus,
                physics: &mut self.physics,
                input: &self.input,
            };
            self.scene.deliver(&message, &mut ctx);
        }

        fn controller(&self) -> &PlanktonController {
            self.scene.entity(self.plankton).unwrap().require("controller")
        }

        fn drawable(&self) -> &AnimatedDrawable {
            self.scene.entity(self.plankton).unwrap().require("drawable")
        }

        fn trigger(&self) -> Message {
            Message::Physics(PhysicsEvent::Trigger { entities: [self.plankton, self.enemy] })
        }
    }

    #[test]
    fn test_health_only_drops_while_hit() {
        let mut harness = Harness::new(PlanktonKind::Good, Vec2::new(1.0, 0.0));
        harness.update(0.1);
        assert_relative_eq!(harness.controller().health(), 100.0);

        harness.deliver(harness.trigger());
        harness.update(0.1);
        assert_relative_eq!(harness.controller().health(), 95.5, epsilon = 1e-4);

        // flag clears after one application
        harness.update(0.1);
        assert_relative_eq!(harness.controller().health(), 95.5, epsilon = 1e-4);
        assert_eq!(harness.drawable().colour.a, (95.5f32 / 100.0 * 180.0) as u8);
    }

    #[test]
    fn test_trigger_without_enemy_is_ignored() {
        let mut harness = Harness::new(PlanktonKind::Good, Vec2::new(1.0, 0.0));
        let stranger = harness.scene.add(Layer::FrontRear, Entity::new());
        let entities = [harness.plankton, stranger];
        harness.deliver(Message::Physics(PhysicsEvent::Trigger { entities }));
        harness.update(0.1);
        assert_relative_eq!(harness.controller().health(), 100.0);
    }

    #[test]
    fn test_dies_once_with_one_message_and_zero_alpha() {
        let mut harness = Harness::new(PlanktonKind::Bad, Vec2::new(1.0, 0.0));
        for _ in 0..3 {
            harness.deliver(harness.trigger());
            harness.update(1.0);
        }
        assert_eq!(harness.drawable().colour.a, 0);
        assert!(harness.scene.entity(harness.plankton).unwrap().is_destroyed());

        let deaths: Vec<_> = harness.bus.drain().into_iter().collect();
        let expected = Message::Plankton(PlanktonEvent::Died { kind: PlanktonKind::Bad });
        assert_eq!(deaths, vec![expected]);
    }

    #[test]
    fn test_late_updates_after_death_stay_silent() {
        let mut bus = MessageBus::new();
        let mut physics = PhysicsWorld::default();
        let input = InputState::new();
        let handle = physics.add_body(32.0);
        let mut entity = Entity::new();
        entity.add_component("control", PhysicsComponent::new(handle));
        let animation = AnimationData::single_clip((32, 32), 1, 1.0);
        entity.add_component("drawable", AnimatedDrawable::new(None, animation));

        let mut controller = PlanktonController::new(PlanktonKind::Good);
        controller.health = 0.0;
        let mut ctx = FrameContext { bus: &mut bus, physics: &mut physics, input: &input };
        controller.update(&mut entity, 0.1, &mut ctx);
        controller.update(&mut entity, 0.1, &mut ctx);

        assert!(entity.is_destroyed());
        assert_eq!(bus.pending(), 1);
    }

    #[test]
    fn test_player_death_makes_plankton_leave_silently() {
        let mut harness = Harness::new(PlanktonKind::Good, Vec2::new(1.0, 0.0));
        harness.deliver(Message::Player(PlayerEvent::Died));
        harness.update(0.1);
        assert!(harness.scene.entity(harness.plankton).unwrap().is_destroyed());
        assert_eq!(harness.bus.pending(), 0);
    }

    #[test]
    fn test_rotation_converges_without_overshoot() {
        // heading straight up: -90 degrees, i.e. 270
        let mut harness = Harness::new(PlanktonKind::Good, Vec2::new(0.0, -50.0));
        let mut previous_gap = f32::MAX;
        for _ in 0..600 {
            harness.update(1.0 / 60.0);
            let rotation = harness.drawable().rotation;
            let gap = utils::shortest_turn(rotation, 270.0).abs();
            assert!(gap <= previous_gap + 1e-3, "rotation moved away from target");
            previous_gap = gap;
            if !harness.controller().is_rotating() {
                break;
            }
        }
        assert!(!harness.controller().is_rotating());
        assert!(previous_gap < 1.0);
    }

    #[test]
    fn test_half_turn_stops_short_once_steps_fall_below_tolerance() {
        // facing 0, heading 180: the decaying speed can cover about 148 degrees
        let mut harness = Harness::new(PlanktonKind::Good, Vec2::new(-50.0, 0.0));
        let mut previous_gap = 180.0;
        let mut frames = 0;
        loop {
            harness.update(1.0 / 60.0);
            let gap = utils::shortest_turn(harness.drawable().rotation, 180.0).abs();
            assert!(gap < previous_gap, "gap must shrink every frame");
            previous_gap = gap;
            frames += 1;
            if !harness.controller().is_rotating() || frames >= 200 {
                break;
            }
        }
        assert!(!harness.controller().is_rotating());
        assert!((80..=90).contains(&frames), "stopped after {frames} frames");
        assert!((30.0..34.0).contains(&previous_gap), "stopped {previous_gap} degrees short");

        let settled = harness.drawable().rotation;
        for _ in 0..30 {
            harness.update(1.0 / 60.0);
        }
        assert_relative_eq!(harness.drawable().rotation, settled);
    }

    #[test]
    fn test_collision_retargets_to_velocity_heading() {
        let mut harness = Harness::new(PlanktonKind::Good, Vec2::new(1.0, 0.0));
        harness.update(0.016);
        let entity = harness.scene.entity(harness.plankton).unwrap();
        let handle = entity.require::<PhysicsComponent>("control").handle();
        harness.physics.body_mut(handle).unwrap().velocity = Vec2::new(0.0, 10.0);

        let entities = [harness.enemy, harness.plankton];
        harness.deliver(Message::Physics(PhysicsEvent::Collision { entities }));
        assert!(harness.controller().is_rotating());
        for _ in 0..120 {
            harness.update(1.0 / 60.0);
        }
        assert_relative_eq!(harness.drawable().rotation, 90.0, epsilon = 1.0);
    }
}
