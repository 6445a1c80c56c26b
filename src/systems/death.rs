//! Death handling and the corpse sweep.
//!
//! Destruction is two-phase: a kill attaches a `Dead` countdown marker (which
//! suppresses AI and movement), and a separate sweep despawns expired
//! corpses. The entity list is never mutated mid-iteration.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{
    Ai, AiState, AutoAttack, Combat, Dead, Monster, Movement, PathFollow,
};
use crate::constants::{MONSTER_CORPSE_DURATION, MONSTER_XP_PER_LEVEL, PLAYER_CORPSE_DURATION};
use crate::events::{EventQueue, GameEvent};
use crate::hooks::Hooks;
use crate::queries;
use crate::systems::{ai, experience};

/// Handle a monster reaching zero hp: loot, XP, quest bookkeeping, and the
/// two-phase removal mark.
pub fn kill_monster(
    world: &mut World,
    monster: Entity,
    killer: Entity,
    events: &mut EventQueue,
    hooks: &mut dyn Hooks,
) {
    let position = queries::entity_position(world, monster)
        .map(|p| (p.x, p.y))
        .unwrap_or((0.0, 0.0));

    // Loot and quest progress go through external collaborators
    let identity = world
        .get::<&Monster>(monster)
        .map(|m| (m.name.clone(), m.level, m.drop_capacity, m.quest_id))
        .ok();
    if let Some((name, level, drop_capacity, quest_id)) = identity {
        let drops = hooks.generate_drops(drop_capacity, level, &name, quest_id);
        if !drops.is_empty() {
            hooks.on_inventory_changed();
            events.push(GameEvent::ItemsDropped {
                entity: monster,
                position,
                drops,
            });
        }

        if let Some(quest_id) = quest_id {
            hooks.on_quest_progress(quest_id, &name);
            events.push(GameEvent::QuestProgress {
                quest_id,
                monster_name: name,
            });
        }

        experience::award_kill_xp(world, killer, level * MONSTER_XP_PER_LEVEL, events, hooks);
    }

    clear_target_references(world, monster);
    halt(world, monster);

    if let Ok(mut ai) = world.get::<&mut Ai>(monster) {
        ai.state = AiState::Dead;
        ai.target = None;
    }

    if !queries::has_dead_marker(world, monster) {
        let _ = world.insert_one(monster, Dead::new(MONSTER_CORPSE_DURATION));
    }

    events.push(GameEvent::EntityDied {
        entity: monster,
        position,
    });
}

/// Handle the player reaching zero hp. The killing monster, if any, enters
/// its victory idle.
pub fn kill_player(
    world: &mut World,
    player: Entity,
    killer: Option<Entity>,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    halt(world, player);

    if let Ok(mut auto) = world.get::<&mut AutoAttack>(player) {
        auto.target = None;
    }

    if !queries::has_dead_marker(world, player) {
        let _ = world.insert_one(player, Dead::new(PLAYER_CORPSE_DURATION));
    }

    if let Some(killer) = killer {
        if world.get::<&Ai>(killer).is_ok() {
            ai::transition_ai_state(world, killer, AiState::VictoryIdle, rng);
        }
    }

    events.push(GameEvent::PlayerDied { entity: player });
}

/// Count down `Dead` markers and physically remove expired entities.
/// Returns the despawned entities.
pub fn sweep_dead(world: &mut World, dt: f32) -> Vec<Entity> {
    let mut expired = Vec::new();
    for (id, dead) in world.query_mut::<&mut Dead>() {
        dead.remaining -= dt;
        if dead.remaining <= 0.0 {
            expired.push(id);
        }
    }
    for &id in &expired {
        let _ = world.despawn(id);
    }
    expired
}

/// Stop movement and abandon any path
fn halt(world: &mut World, entity: Entity) {
    if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
        movement.stop();
        movement.is_hasted = false;
    }
    if let Ok(mut path) = world.get::<&mut PathFollow>(entity) {
        path.clear();
    }
}

/// Remove a dying entity from every combat target, AI target, and
/// auto-attack reference.
fn clear_target_references(world: &mut World, dead_entity: Entity) {
    for (_, combat) in world.query_mut::<&mut Combat>() {
        if combat.attack_target == Some(dead_entity) {
            combat.attack_target = None;
        }
    }
    for (_, ai) in world.query_mut::<&mut Ai>() {
        if ai.target == Some(dead_entity) {
            ai.target = None;
        }
    }
    for (_, auto) in world.query_mut::<&mut AutoAttack>() {
        if auto.target == Some(dead_entity) {
            auto.target = None;
        }
    }
}
