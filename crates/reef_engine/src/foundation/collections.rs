//! Specialized collection types
//!
//! Stable handles for everything the runtime hands out. Handles stay valid
//! until the owning arena removes the slot, after which lookups return `None`.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Identity of an entity in the scene arena
    pub struct EntityId;

    /// Handle to a body owned by the physics world
    pub struct BodyHandle;

    /// Handle to a texture owned by the asset cache
    pub struct TextureHandle;
}
