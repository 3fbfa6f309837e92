//! Scene arena
//!
//! Owns every entity in a `SlotMap` keyed by [`EntityId`]. Root entities sit
//! in named layers which fix draw order; update order is layer order too but
//! nothing depends on it. Destroyed entities stay in the arena until
//! [`Scene::sweep`] runs after the update pass.

use super::component::FrameContext;
use super::entity::{Entity, UpdatePass};
use crate::events::Message;
use crate::foundation::collections::{EntityId, SlotMap};
use crate::foundation::math::Transform2D;
use crate::render::RenderTarget;

/// Named draw layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Far background
    BackRear,
    /// Background
    BackMiddle,
    /// Near background
    BackFront,
    /// Behind the player (food)
    FrontRear,
    /// Player
    FrontMiddle,
    /// In front of the player
    FrontFront,
    /// Overlay
    Ui,
}

impl Layer {
    /// Number of layers
    pub const COUNT: usize = 7;

    /// Every layer, back to front
    pub const ALL: [Layer; Self::COUNT] = [
        Layer::BackRear,
        Layer::BackMiddle,
        Layer::BackFront,
        Layer::FrontRear,
        Layer::FrontMiddle,
        Layer::FrontFront,
        Layer::Ui,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Entity arena plus layer roots
#[derive(Default)]
pub struct Scene {
    entities: SlotMap<EntityId, Entity>,
    layers: [Vec<EntityId>; Layer::COUNT],
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.entities.len())
            .field("layers", &self.layers)
            .finish()
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root entity to a layer, taking ownership
    pub fn add(&mut self, layer: Layer, mut entity: Entity) -> EntityId {
        entity.parent = None;
        entity.parent_world = Transform2D::identity();
        let id = self.entities.insert_with_key(|id| {
            entity.set_id(id);
            entity
        });
        self.layers[layer.index()].push(id);
        log::debug!("Scene: added {:?} to {:?}", id, layer);
        id
    }

    /// Add an entity as the last child of `parent`, keeping its world position
    ///
    /// Returns `None` (and drops the entity) if the parent is not in the scene.
    pub fn add_child(&mut self, parent: EntityId, mut entity: Entity) -> Option<EntityId> {
        let parent_world = self.entities.get(parent)?.world_transform();
        let world_position = entity.world_position();
        entity.parent = Some(parent);
        entity.parent_world = parent_world;
        entity.set_world_position(world_position);

        let id = self.entities.insert_with_key(|id| {
            entity.set_id(id);
            entity
        });
        if let Some(parent_entity) = self.entities.get_mut(parent) {
            parent_entity.children.push(id);
        }
        log::debug!("Scene: added {:?} under {:?}", id, parent);
        Some(id)
    }

    /// Borrow an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutably borrow an entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Whether the id refers to an entity still in the arena
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of entities in the arena, including ones waiting to be swept
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Root entities of a layer
    pub fn layer(&self, layer: Layer) -> &[EntityId] {
        &self.layers[layer.index()]
    }

    /// Deliver a message to every live component, depth first in layer order
    pub fn deliver(&mut self, message: &Message, ctx: &mut FrameContext<'_>) {
        for layer in Layer::ALL {
            let roots = self.layers[layer.index()].clone();
            for id in roots {
                self.deliver_to(id, message, ctx);
            }
        }
    }

    fn deliver_to(&mut self, id: EntityId, message: &Message, ctx: &mut FrameContext<'_>) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.is_destroyed() {
            return;
        }
        entity.deliver(message, ctx);
        let children = entity.children.clone();
        for child in children {
            self.deliver_to(child, message, ctx);
        }
    }

    /// Update every particle system component
    pub fn update_particles(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        self.traverse(UpdatePass::Particles, dt, ctx);
    }

    /// Update every other component, composing transforms parent to child
    pub fn update(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        self.traverse(UpdatePass::Logic, dt, ctx);
    }

    fn traverse(&mut self, pass: UpdatePass, dt: f32, ctx: &mut FrameContext<'_>) {
        for layer in Layer::ALL {
            let roots = self.layers[layer.index()].clone();
            for id in roots {
                self.update_entity(id, Transform2D::identity(), pass, dt, ctx);
            }
        }
    }

    fn update_entity(
        &mut self,
        id: EntityId,
        parent_world: Transform2D,
        pass: UpdatePass,
        dt: f32,
        ctx: &mut FrameContext<'_>,
    ) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.is_destroyed() {
            return;
        }
        entity.parent_world = parent_world;
        entity.update_components(pass, dt, ctx);

        let world = entity.world_transform();
        let children = entity.children.clone();
        for child in children {
            self.update_entity(child, world, pass, dt, ctx);
        }
    }

    /// Remove every entity flagged destroyed, together with its subtree
    ///
    /// Returns the number of entities removed.
    pub fn sweep(&mut self, ctx: &mut FrameContext<'_>) -> usize {
        let doomed: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.is_destroyed())
            .map(|(id, _)| id)
            .collect();

        let mut removed = 0;
        for id in doomed {
            // may already be gone with a destroyed ancestor
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            match entity.parent {
                Some(parent) => {
                    if let Some(parent_entity) = self.entities.get_mut(parent) {
                        parent_entity.children.retain(|child| *child != id);
                    }
                }
                None => {
                    for roots in &mut self.layers {
                        roots.retain(|root| *root != id);
                    }
                }
            }
            removed += self.remove_subtree(id, ctx);
        }

        if removed > 0 {
            log::debug!("Scene: swept {} entit{}", removed, if removed == 1 { "y" } else { "ies" });
        }
        removed
    }

    fn remove_subtree(&mut self, id: EntityId, ctx: &mut FrameContext<'_>) -> usize {
        let Some(mut entity) = self.entities.remove(id) else {
            return 0;
        };
        entity.destroy_components(ctx);
        let mut count = 1;
        for child in std::mem::take(&mut entity.children) {
            count += self.remove_subtree(child, ctx);
        }
        count
    }

    /// Submit draw calls for every live entity, back layer first
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        for layer in Layer::ALL {
            for &id in &self.layers[layer.index()] {
                self.draw_entity(id, target);
            }
        }
    }

    fn draw_entity(&self, id: EntityId, target: &mut dyn RenderTarget) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        if entity.is_destroyed() {
            return;
        }
        entity.draw(target);
        for &child in &entity.children {
            self.draw_entity(child, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Component, ComponentType};
    use crate::events::{MessageBus, PlayerEvent};
    use crate::foundation::math::Vec2;
    use crate::input::InputState;
    use crate::physics::PhysicsWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Logs every call and optionally destroys its entity on update
    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        destroy_on_update: bool,
        kind: ComponentType,
    }

    impl Probe {
        fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                log: log.clone(),
                destroy_on_update: false,
                kind: ComponentType::Script,
            }
        }
    }

    impl Component for Probe {
        fn component_type(&self) -> ComponentType {
            self.kind
        }

        fn update(&mut self, entity: &mut Entity, _dt: f32, _ctx: &mut FrameContext<'_>) {
            self.log.borrow_mut().push(format!("update {}", self.name));
            if self.destroy_on_update {
                entity.destroy();
            }
        }

        fn handle_message(
            &mut self,
            _message: &Message,
            _entity: &mut Entity,
            _ctx: &mut FrameContext<'_>,
        ) {
            self.log.borrow_mut().push(format!("message {}", self.name));
        }

        fn on_destroy(&mut self, _ctx: &mut FrameContext<'_>) {
            self.log.borrow_mut().push(format!("destroy {}", self.name));
        }
    }

    struct Harness {
        bus: MessageBus,
        physics: PhysicsWorld,
        input: InputState,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                bus: MessageBus::new(),
                physics: PhysicsWorld::default(),
                input: InputState::new(),
            }
        }

        fn ctx(&mut self) -> FrameContext<'_> {
            FrameContext {
                bus: &mut self.bus,
                physics: &mut self.physics,
                input: &self.input,
            }
        }
    }

    fn entity_with(probe: Probe) -> Entity {
        let mut entity = Entity::new();
        entity.add_component(probe.name, probe);
        entity
    }

    #[test]
    fn test_parents_update_before_children_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut harness = Harness::new();
        let mut scene = Scene::new();

        let root = scene.add(Layer::FrontMiddle, entity_with(Probe::new("root", &log)));
        scene.add_child(root, entity_with(Probe::new("first", &log))).unwrap();
        scene.add_child(root, entity_with(Probe::new("second", &log))).unwrap();
        scene.add(Layer::FrontRear, entity_with(Probe::new("food", &log)));

        scene.update(0.016, &mut harness.ctx());
        assert_eq!(
            *log.borrow(),
            vec!["update food", "update root", "update first", "update second"]
        );
    }

    #[test]
    fn test_child_world_position_follows_parent() {
        let mut harness = Harness::new();
        let mut scene = Scene::new();

        let mut parent = Entity::new();
        parent.set_position(Vec2::new(100.0, 100.0));
        let root = scene.add(Layer::FrontMiddle, parent);

        let mut child = Entity::new();
        child.set_world_position(Vec2::new(110.0, 100.0));
        let child = scene.add_child(root, child).unwrap();
        assert_eq!(scene.entity(child).unwrap().position(), Vec2::new(10.0, 0.0));

        scene.entity_mut(root).unwrap().set_position(Vec2::new(200.0, 50.0));
        scene.update(0.016, &mut harness.ctx());
        assert_eq!(scene.entity(child).unwrap().world_position(), Vec2::new(210.0, 50.0));
    }

    #[test]
    fn test_destroyed_subtree_is_swept_after_update_and_never_updates_again() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut harness = Harness::new();
        let mut scene = Scene::new();

        let mut doomed = Probe::new("parent", &log);
        doomed.destroy_on_update = true;
        let root = scene.add(Layer::FrontMiddle, entity_with(doomed));
        let child = scene.add_child(root, entity_with(Probe::new("child", &log))).unwrap();

        scene.update(0.016, &mut harness.ctx());
        // flagged, still present until the sweep
        assert!(scene.contains(root));
        assert_eq!(scene.sweep(&mut harness.ctx()), 2);
        assert!(!scene.contains(root));
        assert!(!scene.contains(child));
        assert!(scene.layer(Layer::FrontMiddle).is_empty());

        scene.update(0.016, &mut harness.ctx());
        scene.deliver(&Message::Player(PlayerEvent::Died), &mut harness.ctx());
        assert_eq!(
            *log.borrow(),
            vec!["update parent", "update child", "destroy parent", "destroy child"]
        );
    }

    #[test]
    fn test_sweeping_a_child_unlinks_it_from_its_parent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut harness = Harness::new();
        let mut scene = Scene::new();

        let root = scene.add(Layer::FrontMiddle, entity_with(Probe::new("root", &log)));
        let child = scene.add_child(root, entity_with(Probe::new("child", &log))).unwrap();
        scene.entity_mut(child).unwrap().destroy();

        assert_eq!(scene.sweep(&mut harness.ctx()), 1);
        assert!(scene.entity(root).unwrap().children().is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_particle_pass_only_touches_particle_systems() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut harness = Harness::new();
        let mut scene = Scene::new();

        let mut emitter = Probe::new("emitter", &log);
        emitter.kind = ComponentType::ParticleSystem;
        let mut entity = entity_with(emitter);
        entity.add_component("logic", Probe::new("logic", &log));
        scene.add(Layer::FrontMiddle, entity);

        scene.update_particles(0.016, &mut harness.ctx());
        scene.update(0.016, &mut harness.ctx());
        assert_eq!(*log.borrow(), vec!["update emitter", "update logic"]);
    }

    #[test]
    fn test_add_child_to_missing_parent_is_refused() {
        let mut scene = Scene::new();
        let root = scene.add(Layer::Ui, Entity::new());
        scene.entity_mut(root).unwrap().destroy();
        let mut harness = Harness::new();
        scene.sweep(&mut harness.ctx());
        assert!(scene.add_child(root, Entity::new()).is_none());
        assert!(scene.is_empty());
    }
}
