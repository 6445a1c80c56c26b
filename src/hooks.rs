//! Interfaces the core consumes from external collaborators.
//!
//! Loot tables, inventory, and quest logs live outside the simulation; the
//! core calls into them through this trait at the few points where a death
//! or level-up has side effects. All hooks are fire-and-forget.

/// A single loot drop rolled by the external loot system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDrop {
    pub name: String,
    pub count: u32,
}

/// Callbacks into the host. Default implementations do nothing, so hosts
/// implement only what they care about.
pub trait Hooks {
    /// Roll loot for a dying monster
    fn generate_drops(
        &mut self,
        _capacity: u32,
        _level: u32,
        _monster_name: &str,
        _quest_id: Option<u32>,
    ) -> Vec<ItemDrop> {
        Vec::new()
    }

    /// Player leveled up
    fn on_level_up(&mut self, _new_level: u32) {}

    /// Player inventory changed (loot picked up, weapon degraded)
    fn on_inventory_changed(&mut self) {}

    /// A quest-tracked monster was killed
    fn on_quest_progress(&mut self, _quest_id: u32, _monster_name: &str) {}
}

/// No-op hooks for tests and headless simulation
pub struct NoopHooks;

impl Hooks for NoopHooks {}
