//! Circle-body physics world
//!
//! Owns every body in a flat arena. Bodies are circles with mass π·r². A body
//! may carry a distance constraint to a parent body, which turns the arena
//! into a forest of chains. Each step runs three phases:
//!
//! 1. integrate free bodies and bounce them off the world bounds
//! 2. one constraint pass in creation order, snapping each child to its rest
//!    length from the parent
//! 3. pairwise overlap tests, posting `Trigger` or `Collision` messages for
//!    bodies bound to entities

use crate::events::{Message, MessageBus, PhysicsEvent};
use crate::foundation::collections::{BodyHandle, EntityId, SlotMap};
use crate::foundation::math::{constants::PI, FloatRect, Vec2};

/// Bounds used when none are given: one screen wide plus half a screen of
/// off-screen margin on each side
pub const DEFAULT_WORLD_BOUNDS: FloatRect = FloatRect::new(-480.0, 0.0, 2880.0, 1080.0);

/// Separations shorter than this are treated as coincident
const MIN_SEPARATION: f32 = 1e-5;

/// Rigid distance constraint to a parent body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    /// Body this one hangs from
    pub parent: BodyHandle,
    /// Rest distance between the two centres
    pub length: f32,
}

/// A circle body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Centre in world space
    pub position: Vec2,
    /// Velocity in pixels per second
    pub velocity: Vec2,
    radius: f32,
    mass: f32,
    trigger: bool,
    owner: Option<EntityId>,
    constraint: Option<Constraint>,
}

impl Body {
    fn new(radius: f32) -> Self {
        Self {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            radius,
            mass: PI * radius * radius,
            trigger: false,
            owner: None,
            constraint: None,
        }
    }

    /// Radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Mass, π·r²
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Whether overlaps with this body are reported as triggers
    pub fn is_trigger(&self) -> bool {
        self.trigger
    }

    /// Entity this body belongs to, once bound
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Constraint to the parent body, if attached
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 }
    }
}

/// Arena of bodies plus world bounds
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, Body>,
    creation_order: Vec<BodyHandle>,
    bounds: FloatRect,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_BOUNDS)
    }
}

impl PhysicsWorld {
    /// Create an empty world with the given bounds
    pub fn new(bounds: FloatRect) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            creation_order: Vec::new(),
            bounds,
        }
    }

    /// Add a free body at the origin
    pub fn add_body(&mut self, radius: f32) -> BodyHandle {
        let handle = self.bodies.insert(Body::new(radius));
        self.creation_order.push(handle);
        log::debug!("Physics: added body {:?} (radius {})", handle, radius);
        handle
    }

    /// Add a body constrained to sit `length` away from `parent`
    ///
    /// The new body starts directly below the parent at rest length.
    ///
    /// # Panics
    /// If `parent` is not a live body.
    pub fn attach_body(&mut self, radius: f32, length: f32, parent: BodyHandle) -> BodyHandle {
        let parent_position = match self.bodies.get(parent) {
            Some(body) => body.position,
            None => panic!("attach_body: unknown parent body {:?}", parent),
        };

        let mut body = Body::new(radius);
        body.position = parent_position + Vec2::new(0.0, length);
        body.constraint = Some(Constraint { parent, length });

        let handle = self.bodies.insert(body);
        self.creation_order.push(handle);
        log::debug!("Physics: attached body {:?} to {:?} at length {}", handle, parent, length);
        handle
    }

    /// Record which entity owns a body so overlap messages can name it
    pub fn bind(&mut self, handle: BodyHandle, owner: EntityId) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.owner = Some(owner);
        }
    }

    /// Mark a body as a trigger
    pub fn set_trigger(&mut self, handle: BodyHandle, trigger: bool) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.trigger = trigger;
        }
    }

    /// Free a body from its parent, keeping its velocity
    ///
    /// Bodies constrained to it stay attached and travel with it.
    pub fn detach(&mut self, handle: BodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle) {
            if body.constraint.take().is_some() {
                log::debug!("Physics: detached body {:?}", handle);
            }
        }
    }

    /// Remove a body, handing its children to its own parent
    ///
    /// Children keep their rest length. If the removed body was free they
    /// become free too.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let removed = self.bodies.remove(handle)?;
        self.creation_order.retain(|h| *h != handle);

        let grandparent = removed.constraint.map(|c| c.parent);
        for (child_handle, body) in &mut self.bodies {
            let Some(constraint) = body.constraint.as_mut() else {
                continue;
            };
            if constraint.parent != handle {
                continue;
            }
            match grandparent {
                Some(parent) => {
                    constraint.parent = parent;
                    log::debug!("Physics: body {:?} reparented to {:?}", child_handle, parent);
                }
                None => {
                    body.constraint = None;
                    log::debug!("Physics: body {:?} freed", child_handle);
                }
            }
        }

        log::debug!("Physics: removed body {:?}", handle);
        Some(removed)
    }

    /// Borrow a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutably borrow a body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Constraint of a body, if it is attached
    pub fn constraint(&self, handle: BodyHandle) -> Option<&Constraint> {
        self.bodies.get(handle).and_then(Body::constraint)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Handles in creation order
    pub fn handles(&self) -> &[BodyHandle] {
        &self.creation_order
    }

    /// World bounds
    pub fn world_bounds(&self) -> FloatRect {
        self.bounds
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32, bus: &mut MessageBus) {
        if dt <= 0.0 {
            return;
        }
        self.integrate(dt);
        self.solve_constraints(dt);
        self.resolve_overlaps(bus);
    }

    fn integrate(&mut self, dt: f32) {
        let bounds = self.bounds;
        for body in self.bodies.values_mut().filter(|b| b.constraint.is_none()) {
            body.position += body.velocity * dt;

            let r = body.radius;
            if body.position.x - r < bounds.left {
                body.position.x = bounds.left + r;
                body.velocity.x = body.velocity.x.abs();
            } else if body.position.x + r > bounds.right() {
                body.position.x = bounds.right() - r;
                body.velocity.x = -body.velocity.x.abs();
            }
            if body.position.y - r < bounds.top {
                body.position.y = bounds.top + r;
                body.velocity.y = body.velocity.y.abs();
            } else if body.position.y + r > bounds.bottom() {
                body.position.y = bounds.bottom() - r;
                body.velocity.y = -body.velocity.y.abs();
            }
        }
    }

    fn solve_constraints(&mut self, dt: f32) {
        for index in 0..self.creation_order.len() {
            let handle = self.creation_order[index];
            let Some(Constraint { parent, length }) =
                self.bodies.get(handle).and_then(|b| b.constraint)
            else {
                continue;
            };
            let Some(anchor) = self.bodies.get(parent).map(|b| b.position) else {
                continue;
            };
            let Some(body) = self.bodies.get_mut(handle) else {
                continue;
            };

            let separation = body.position - anchor;
            let distance = separation.norm();
            let direction = if distance > MIN_SEPARATION {
                separation / distance
            } else {
                Vec2::new(0.0, 1.0)
            };
            let target = anchor + direction * length;
            body.velocity = (target - body.position) / dt;
            body.position = target;
        }
    }

    fn linked(a: &Body, a_handle: BodyHandle, b: &Body, b_handle: BodyHandle) -> bool {
        a.constraint.is_some_and(|c| c.parent == b_handle)
            || b.constraint.is_some_and(|c| c.parent == a_handle)
    }

    fn resolve_overlaps(&mut self, bus: &mut MessageBus) {
        let order = &self.creation_order;
        let mut events = 0usize;
        for i in 0..order.len() {
            for j in (i + 1)..order.len() {
                let (ha, hb) = (order[i], order[j]);
                let (Some(a), Some(b)) = (self.bodies.get(ha), self.bodies.get(hb)) else {
                    continue;
                };
                if Self::linked(a, ha, b, hb) {
                    continue;
                }

                let offset = b.position - a.position;
                let distance = offset.norm();
                let reach = a.radius + b.radius;
                if distance >= reach {
                    continue;
                }

                let trigger = a.trigger || b.trigger;
                let owners = a.owner.zip(b.owner);

                if !trigger {
                    let normal = if distance > MIN_SEPARATION {
                        offset / distance
                    } else {
                        Vec2::new(1.0, 0.0)
                    };
                    let (a, b) = (a.clone(), b.clone());
                    let (a, b) = Self::respond(a, b, normal, reach - distance);
                    self.bodies[ha] = a;
                    self.bodies[hb] = b;
                }

                if let Some((owner_a, owner_b)) = owners {
                    let entities = [owner_a, owner_b];
                    let event = if trigger {
                        PhysicsEvent::Trigger { entities }
                    } else {
                        PhysicsEvent::Collision { entities }
                    };
                    bus.send(Message::Physics(event));
                    events += 1;
                }
            }
        }
        if events > 0 {
            log::trace!("Physics: {} overlap events", events);
        }
    }

    /// Push the pair apart by inverse mass and swap normal velocity elastically
    fn respond(mut a: Body, mut b: Body, normal: Vec2, penetration: f32) -> (Body, Body) {
        let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
        let inv_total = inv_a + inv_b;
        if inv_total > 0.0 {
            a.position -= normal * (penetration * inv_a / inv_total);
            b.position += normal * (penetration * inv_b / inv_total);
        }

        let va = a.velocity.dot(&normal);
        let vb = b.velocity.dot(&normal);
        // only when closing
        if va - vb > 0.0 {
            let (ma, mb) = (a.mass, b.mass);
            let total = ma + mb;
            let va_after = (va * (ma - mb) + 2.0 * mb * vb) / total;
            let vb_after = (vb * (mb - ma) + 2.0 * ma * va) / total;
            a.velocity += normal * (va_after - va);
            b.velocity += normal * (vb_after - vb);
        }
        (a, b)
    }
}
