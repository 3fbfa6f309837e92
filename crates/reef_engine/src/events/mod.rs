//! Message bus
//!
//! Components never call each other directly. They post a [`Message`] on the
//! bus and every live component sees it on the next frame. Key properties:
//! - Deferred delivery: a message sent during frame N is delivered in frame N+1
//! - FIFO order within a frame
//! - Broadcast: no subscriber registry, handlers inspect the type and ignore
//!   what they don't care about

use crate::foundation::collections::EntityId;
use std::collections::VecDeque;

/// Coarse message category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Menu / UI state machine traffic
    Ui,
    /// Player lifecycle and body chain
    Player,
    /// Overlaps reported by the physics world
    Physics,
    /// Plankton lifecycle
    Plankton,
}

/// UI state identifiers understood by the host state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    /// Main menu
    Menu,
    /// Gameplay
    Game,
    /// End-of-round score screen
    Score,
}

/// UI events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// A menu state was opened
    MenuOpened {
        /// Which state opened
        state: StateId,
    },
    /// A menu state was closed
    MenuClosed {
        /// Which state closed
        state: StateId,
    },
    /// Ask the host to switch to a state
    RequestState {
        /// Requested state
        state: StateId,
    },
}

/// Player events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// The player entity is gone
    Died,
    /// A body part joined the chain
    PartAdded {
        /// Mass of the new part's body
        mass: f32,
    },
    /// Ask a body part to leave the chain
    DetachPart {
        /// Entity of the part to detach
        part: EntityId,
    },
    /// A body part left the chain
    PartRemoved {
        /// Entity of the part that left
        part: EntityId,
    },
}

/// Physics overlap events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsEvent {
    /// Overlap involving a trigger body, no response applied
    Trigger {
        /// Owning entities of both bodies
        entities: [EntityId; 2],
    },
    /// Overlap between two solid bodies, velocities were adjusted
    Collision {
        /// Owning entities of both bodies
        entities: [EntityId; 2],
    },
}

impl PhysicsEvent {
    /// Entities named by this event
    pub fn entities(&self) -> [EntityId; 2] {
        match *self {
            Self::Trigger { entities } | Self::Collision { entities } => entities,
        }
    }

    /// Whether the event names the given entity on either side
    pub fn involves(&self, entity: EntityId) -> bool {
        self.entities().contains(&entity)
    }
}

/// Plankton kinds, used for tinting and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PlanktonKind {
    /// Grows the player
    Good,
    /// Costs the player a body part
    Bad,
    /// Extra points
    Bonus,
}

/// Plankton events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanktonEvent {
    /// A plankton was eaten
    Died {
        /// Kind of the plankton that died
        kind: PlanktonKind,
    },
}

/// A message posted on the bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    /// UI traffic
    Ui(UiEvent),
    /// Player traffic
    Player(PlayerEvent),
    /// Physics traffic
    Physics(PhysicsEvent),
    /// Plankton traffic
    Plankton(PlanktonEvent),
}

impl Message {
    /// Coarse category of this message
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Ui(_) => MessageType::Ui,
            Self::Player(_) => MessageType::Player,
            Self::Physics(_) => MessageType::Physics,
            Self::Plankton(_) => MessageType::Plankton,
        }
    }
}

/// Deferred FIFO message queue, one per game session
#[derive(Debug, Default)]
pub struct MessageBus {
    queue: VecDeque<Message>,
    sent: u64,
    drained: u64,
}

impl MessageBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for delivery on the next frame
    pub fn send(&mut self, message: Message) {
        log::trace!("bus: queued {:?}", message);
        self.sent += 1;
        self.queue.push_back(message);
    }

    /// Take every queued message, oldest first
    ///
    /// Anything sent while the returned batch is being delivered goes into
    /// the now empty queue and waits for the next drain.
    pub fn drain(&mut self) -> VecDeque<Message> {
        let batch = std::mem::take(&mut self.queue);
        self.drained += batch.len() as u64;
        batch
    }

    /// Number of messages waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Iterate over waiting messages without consuming them
    pub fn peek(&self) -> impl Iterator<Item = &Message> {
        self.queue.iter()
    }

    /// Total messages sent over the session
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Total messages handed out for delivery over the session
    pub fn drained_count(&self) -> u64 {
        self.drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn died() -> Message {
        Message::Player(PlayerEvent::Died)
    }

    #[test]
    fn test_drain_is_fifo() {
        let mut bus = MessageBus::new();
        bus.send(Message::Ui(UiEvent::MenuClosed { state: StateId::Menu }));
        bus.send(died());

        let batch: Vec<_> = bus.drain().into_iter().collect();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].message_type(), MessageType::Ui);
        assert_eq!(batch[1], died());
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_messages_sent_during_delivery_wait_for_next_drain() {
        let mut bus = MessageBus::new();
        bus.send(died());

        let mut delivered = Vec::new();
        for message in bus.drain() {
            delivered.push(message);
            // a handler reacting by posting again
            bus.send(Message::Ui(UiEvent::RequestState { state: StateId::Score }));
        }
        assert_eq!(delivered, vec![died()]);
        assert_eq!(bus.pending(), 1);

        let next: Vec<_> = bus.drain().into_iter().collect();
        assert_eq!(next, vec![Message::Ui(UiEvent::RequestState { state: StateId::Score })]);
        assert_eq!(bus.sent_count(), 2);
        assert_eq!(bus.drained_count(), 2);
    }

    #[test]
    fn test_physics_event_involves_both_sides() {
        let mut ids = slotmap::SlotMap::<EntityId, ()>::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let c = ids.insert(());
        let event = PhysicsEvent::Trigger { entities: [a, b] };
        assert!(event.involves(a));
        assert!(event.involves(b));
        assert!(!event.involves(c));
    }
}
