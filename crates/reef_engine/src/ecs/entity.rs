//! Entity implementation
//!
//! An entity is a positioned node owning named components. Parent/child links
//! are ids into the [`Scene`](super::Scene) arena, never references.

use super::component::{Component, ComponentType, FrameContext};
use crate::events::Message;
use crate::foundation::collections::EntityId;
use crate::foundation::math::{Transform2D, Vec2};
use crate::render::RenderTarget;

/// Which components a traversal touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdatePass {
    /// Particle systems only
    Particles,
    /// Everything except particle systems
    Logic,
}

impl UpdatePass {
    fn includes(self, component_type: ComponentType) -> bool {
        match self {
            Self::Particles => component_type == ComponentType::ParticleSystem,
            Self::Logic => component_type != ComponentType::ParticleSystem,
        }
    }
}

struct ComponentSlot {
    name: String,
    component: Option<Box<dyn Component>>,
    started: bool,
}

/// Scene node owning named components
pub struct Entity {
    id: EntityId,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    local: Transform2D,
    pub(crate) parent_world: Transform2D,
    components: Vec<ComponentSlot>,
    destroyed: bool,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("local", &self.local)
            .field("components", &self.component_names().collect::<Vec<_>>())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Entity {
    /// Create a detached entity; it gets its id when added to a scene
    pub fn new() -> Self {
        Self {
            id: EntityId::default(),
            parent: None,
            children: Vec::new(),
            local: Transform2D::identity(),
            parent_world: Transform2D::identity(),
            components: Vec::new(),
            destroyed: false,
        }
    }

    /// Entity id (null until added to a scene)
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// Parent entity, if any
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child entities in insertion order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Position relative to the parent
    pub fn position(&self) -> Vec2 {
        self.local.position
    }

    /// Set position relative to the parent
    pub fn set_position(&mut self, position: Vec2) {
        self.local.position = position;
    }

    /// Local rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.local.rotation
    }

    /// Set local rotation in degrees
    pub fn set_rotation(&mut self, degrees: f32) {
        self.local.rotation = degrees;
    }

    /// Local scale
    pub fn scale(&self) -> Vec2 {
        self.local.scale
    }

    /// Set local scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.local.scale = scale;
    }

    /// Local transform
    pub fn local_transform(&self) -> &Transform2D {
        &self.local
    }

    /// World transform: parent world composed with local
    pub fn world_transform(&self) -> Transform2D {
        self.parent_world.combine(&self.local)
    }

    /// World position
    pub fn world_position(&self) -> Vec2 {
        self.parent_world.transform_point(self.local.position)
    }

    /// Place the entity at a world position regardless of its parent
    pub fn set_world_position(&mut self, position: Vec2) {
        self.local.position = self.parent_world.inverse_transform_point(position);
    }

    /// Flag for removal at the end of the frame
    pub fn destroy(&mut self) {
        if !self.destroyed {
            log::debug!("Entity {:?} flagged for removal", self.id);
        }
        self.destroyed = true;
    }

    /// Whether the entity is waiting to be swept
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Take ownership of a component under `name`
    ///
    /// A component already registered under the same name is replaced in place.
    pub fn add_component<C: Component>(&mut self, name: impl Into<String>, component: C) {
        let name = name.into();
        let boxed: Box<dyn Component> = Box::new(component);
        if let Some(slot) = self.components.iter_mut().find(|slot| slot.name == name) {
            log::warn!("Entity {:?}: replacing component '{}'", self.id, name);
            slot.component = Some(boxed);
            slot.started = false;
        } else {
            self.components.push(ComponentSlot {
                name,
                component: Some(boxed),
                started: false,
            });
        }
    }

    /// Whether a component is registered under `name`
    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|slot| slot.name == name)
    }

    /// Component names in insertion order
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|slot| slot.name.as_str())
    }

    /// Look up a component by name and type
    pub fn component<C: Component>(&self, name: &str) -> Option<&C> {
        self.components
            .iter()
            .find(|slot| slot.name == name)
            .and_then(|slot| slot.component.as_deref())
            .and_then(|component| component.as_any().downcast_ref::<C>())
    }

    /// Look up a component mutably by name and type
    pub fn component_mut<C: Component>(&mut self, name: &str) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find(|slot| slot.name == name)
            .and_then(|slot| slot.component.as_deref_mut())
            .and_then(|component| component.as_any_mut().downcast_mut::<C>())
    }

    /// Look up a component that must exist
    ///
    /// # Panics
    /// If no component of that type is registered under `name`. A missing
    /// required sibling means the entity was assembled wrongly.
    pub fn require<C: Component>(&self, name: &str) -> &C {
        match self.component::<C>(name) {
            Some(component) => component,
            None => panic!("entity {:?} is missing required component '{}'", self.id, name),
        }
    }

    /// Mutable form of [`Entity::require`]
    ///
    /// # Panics
    /// If no component of that type is registered under `name`.
    pub fn require_mut<C: Component>(&mut self, name: &str) -> &mut C {
        let id = self.id;
        match self.component_mut::<C>(name) {
            Some(component) => component,
            None => panic!("entity {:?} is missing required component '{}'", id, name),
        }
    }

    /// Run `f` over every component in the pass, detaching each while it runs
    fn for_each_component(
        &mut self,
        pass: Option<UpdatePass>,
        ctx: &mut FrameContext<'_>,
        mut f: impl FnMut(&mut dyn Component, &mut Entity, &mut FrameContext<'_>),
    ) {
        for index in 0..self.components.len() {
            let wanted = self.components[index]
                .component
                .as_deref()
                .is_some_and(|component| {
                    pass.map_or(true, |pass| pass.includes(component.component_type()))
                });
            if !wanted {
                continue;
            }
            let Some(mut component) = self.components[index].component.take() else {
                continue;
            };

            if !self.components[index].started {
                self.components[index].started = true;
                component.on_start(self, ctx);
            }
            f(component.as_mut(), self, ctx);

            // a replacement registered under the same name while detached wins
            let slot = &mut self.components[index];
            if slot.component.is_none() {
                slot.component = Some(component);
            }
        }
    }

    pub(crate) fn update_components(
        &mut self,
        pass: UpdatePass,
        dt: f32,
        ctx: &mut FrameContext<'_>,
    ) {
        self.for_each_component(Some(pass), ctx, |component, entity, ctx| {
            component.update(entity, dt, ctx);
        });
    }

    pub(crate) fn deliver(&mut self, message: &Message, ctx: &mut FrameContext<'_>) {
        self.for_each_component(None, ctx, |component, entity, ctx| {
            component.handle_message(message, entity, ctx);
        });
    }

    pub(crate) fn destroy_components(&mut self, ctx: &mut FrameContext<'_>) {
        for slot in &mut self.components {
            if let Some(component) = slot.component.as_mut() {
                component.on_destroy(ctx);
            }
        }
    }

    pub(crate) fn draw(&self, target: &mut dyn RenderTarget) {
        let world = self.world_transform();
        for component in self.components.iter().filter_map(|slot| slot.component.as_deref()) {
            component.draw(&world, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageBus;
    use crate::input::InputState;
    use crate::physics::PhysicsWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Component for Recorder {
        fn component_type(&self) -> ComponentType {
            ComponentType::Script
        }

        fn on_start(&mut self, entity: &mut Entity, _ctx: &mut FrameContext<'_>) {
            // siblings are visible, self is not
            let sees_self =
                entity.has_component(self.label) && entity.component::<Self>(self.label).is_some();
            self.log.borrow_mut().push(format!("start {} self_visible={}", self.label, sees_self));
        }

        fn update(&mut self, _entity: &mut Entity, _dt: f32, _ctx: &mut FrameContext<'_>) {
            self.log.borrow_mut().push(format!("update {}", self.label));
        }
    }

    fn with_ctx(f: impl FnOnce(&mut FrameContext<'_>)) {
        let mut bus = MessageBus::new();
        let mut physics = PhysicsWorld::default();
        let input = InputState::new();
        let mut ctx = FrameContext {
            bus: &mut bus,
            physics: &mut physics,
            input: &input,
        };
        f(&mut ctx);
    }

    #[test]
    fn test_components_update_in_insertion_order_after_start() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut entity = Entity::new();
        entity.add_component("b", Recorder { label: "b", log: log.clone() });
        entity.add_component("a", Recorder { label: "a", log: log.clone() });

        with_ctx(|ctx| {
            entity.update_components(UpdatePass::Logic, 0.1, ctx);
            entity.update_components(UpdatePass::Logic, 0.1, ctx);
        });

        assert_eq!(
            *log.borrow(),
            vec![
                "start b self_visible=false",
                "update b",
                "start a self_visible=false",
                "update a",
                "update b",
                "update a",
            ]
        );
        assert_eq!(entity.component_names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_same_name_replaces_in_place() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut entity = Entity::new();
        entity.add_component("x", Recorder { label: "first", log: log.clone() });
        entity.add_component("y", Recorder { label: "y", log: log.clone() });
        entity.add_component("x", Recorder { label: "second", log: log.clone() });

        assert_eq!(entity.component_names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(entity.require::<Recorder>("x").label, "second");
    }

    #[test]
    fn test_lookup_with_wrong_type_is_none() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut entity = Entity::new();
        entity.add_component("x", Recorder { label: "x", log });
        assert!(entity.component::<crate::ecs::components::InputComponent>("x").is_none());
    }

    #[test]
    #[should_panic(expected = "missing required component 'drawable'")]
    fn test_require_missing_component_panics() {
        let entity = Entity::new();
        let _ = entity.require::<Recorder>("drawable");
    }

    #[test]
    fn test_world_position_round_trips_through_parent() {
        let mut entity = Entity::new();
        entity.parent_world = Transform2D::from_position(Vec2::new(100.0, 0.0));
        entity.set_world_position(Vec2::new(150.0, 20.0));
        assert_eq!(entity.position(), Vec2::new(50.0, 20.0));
        assert_eq!(entity.world_position(), Vec2::new(150.0, 20.0));
    }
}
