//! Experience and leveling.

use hecs::{Entity, World};

use crate::components::Experience;
use crate::constants::XP_PER_LEVEL_MULTIPLIER;
use crate::events::{EventQueue, GameEvent};
use crate::hooks::Hooks;

/// XP needed to reach the next level
pub fn xp_for_level(level: u32) -> u32 {
    level * XP_PER_LEVEL_MULTIPLIER
}

/// Add XP to an experience component, handling level ups.
/// Returns true if at least one level was gained.
pub fn grant_xp(exp: &mut Experience, amount: u32) -> bool {
    exp.current += amount;
    let mut leveled_up = false;
    while exp.current >= xp_for_level(exp.level) {
        exp.current -= xp_for_level(exp.level);
        exp.level += 1;
        leveled_up = true;
    }
    leveled_up
}

/// Award kill XP to an entity (if it tracks experience), firing the
/// level-up hook and event on level gain.
pub fn award_kill_xp(
    world: &mut World,
    entity: Entity,
    amount: u32,
    events: &mut EventQueue,
    hooks: &mut dyn Hooks,
) {
    let new_level = match world.get::<&mut Experience>(entity) {
        Ok(mut exp) => grant_xp(&mut exp, amount).then_some(exp.level),
        Err(_) => None,
    };
    if let Some(new_level) = new_level {
        hooks.on_level_up(new_level);
        events.push(GameEvent::LevelUp { new_level });
    }
}
