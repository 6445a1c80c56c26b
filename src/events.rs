//! Game event system for decoupled communication with collaborators.
//!
//! The simulation emits events, host-side systems (damage text, animation,
//! audio, quest UI) consume them. This keeps the core free of any rendering
//! or UI coupling.

use hecs::Entity;

use crate::hooks::ItemDrop;

/// Events emitted by the simulation core during a tick
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// An attack landed. `critical` and `target_is_player` select the
    /// damage-text variant downstream.
    AttackHit {
        attacker: Entity,
        target: Entity,
        target_pos: (f32, f32),
        damage: i32,
        critical: bool,
        target_is_player: bool,
    },
    /// An attack was evaded
    AttackMissed {
        attacker: Entity,
        target: Entity,
        target_pos: (f32, f32),
    },
    /// A monster healed to full on arriving home
    MonsterHealed {
        entity: Entity,
        position: (f32, f32),
        amount: i32,
    },
    /// An entity died and was marked for removal
    EntityDied {
        entity: Entity,
        position: (f32, f32),
    },
    /// The player died
    PlayerDied {
        entity: Entity,
    },
    /// Player leveled up
    LevelUp {
        new_level: u32,
    },
    /// A quest-tracked monster was killed
    QuestProgress {
        quest_id: u32,
        monster_name: String,
    },
    /// Loot rolled on a monster death
    ItemsDropped {
        entity: Entity,
        position: (f32, f32),
        drops: Vec<ItemDrop>,
    },
}

/// Simple event queue - events are pushed during the tick, drained by the
/// host afterwards
#[derive(Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Peek at pending events without draining (used by tests)
    pub fn pending(&self) -> &[GameEvent] {
        &self.events
    }
}
