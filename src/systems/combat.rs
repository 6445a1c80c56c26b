//! Swing timing and attack resolution.
//!
//! An attack is a timed swing; damage lands once, at the swing's hit frame.
//! Resolution rolls evasion first (a miss ends the attack outright), then
//! crit, then applies defense-reduced damage with a floor of 1. Deaths and
//! retaliation aggro cascade from here.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Ai, AiState, Combat, Dead, Equipment, Movement, Player, Stats};
use crate::constants::{ATTACK_STAMINA_COST, MIN_DAMAGE};
use crate::events::{EventQueue, GameEvent};
use crate::hooks::Hooks;
use crate::queries;
use crate::systems::{ai, death, movement};

/// Advance swing and cooldown timers, and regenerate resource pools.
pub fn tick_combat_timers(world: &mut World, dt: f32) {
    for (_, combat) in world.query::<&mut Combat>().iter() {
        combat.tick(dt);
    }
    for (_, stats) in world.query::<&mut Stats>().without::<&Dead>().iter() {
        stats.tick_regen(dt);
    }
}

/// Start a swing at the given target, paying the stamina cost.
/// Returns false (leaving all state untouched) if the attacker cannot
/// afford or is not ready to attack.
pub fn try_start_attack(world: &mut World, attacker: Entity, target: Entity) -> bool {
    let ready = world
        .get::<&Combat>(attacker)
        .map(|c| c.can_attack())
        .unwrap_or(false);
    if !ready {
        return false;
    }

    let paid = world
        .get::<&mut Stats>(attacker)
        .map(|mut s| s.spend_stamina(ATTACK_STAMINA_COST))
        .unwrap_or(false);
    if !paid {
        return false;
    }

    if let Ok(mut combat) = world.get::<&mut Combat>(attacker) {
        combat.start_attack(target);
    }
    true
}

/// Resolve every swing that has reached its hit frame this tick.
pub fn resolve_attacks(
    world: &mut World,
    events: &mut EventQueue,
    hooks: &mut dyn Hooks,
    rng: &mut impl Rng,
) {
    puffin::profile_function!();

    let mut pending: Vec<(Entity, Entity)> = Vec::new();
    for (id, combat) in world.query::<&Combat>().iter() {
        if combat.should_deal_damage() {
            if let Some(target) = combat.attack_target {
                pending.push((id, target));
            }
        }
    }

    for (attacker, target) in pending {
        perform_attack(world, attacker, target, events, hooks, rng);
    }
}

/// Resolve a single attack at its hit frame.
pub fn perform_attack(
    world: &mut World,
    attacker: Entity,
    target: Entity,
    events: &mut EventQueue,
    hooks: &mut dyn Hooks,
    rng: &mut impl Rng,
) {
    // The swing is spent regardless of outcome
    if let Ok(mut combat) = world.get::<&mut Combat>(attacker) {
        combat.damage_dealt = true;
        combat.attack_target = None;
    }

    // Target may have despawned mid-swing
    let Some(target_pos) = queries::entity_position(world, target) else {
        return;
    };
    let target_pos = (target_pos.x, target_pos.y);

    let attacker_is_player = world.get::<&Player>(attacker).is_ok();
    let target_is_player = world.get::<&Player>(target).is_ok();

    // Evasion roll ends resolution before any crit/damage rolls happen
    let evasion = world
        .get::<&Combat>(target)
        .map(|c| c.evasion)
        .unwrap_or(0.0);
    if rng.gen::<f32>() < evasion {
        events.push(GameEvent::AttackMissed {
            attacker,
            target,
            target_pos,
        });
        if attacker_is_player {
            degrade_weapon(world, attacker, hooks);
        }
        return;
    }

    let (crit_chance, crit_multiplier) = world
        .get::<&Combat>(attacker)
        .map(|c| (c.crit_chance, c.crit_multiplier))
        .unwrap_or((0.0, 1.0));
    let critical = rng.gen::<f32>() < crit_chance;

    let Ok(attack) = world.get::<&Stats>(attacker).map(|s| s.attack) else {
        return;
    };

    let died = {
        let Ok(mut target_stats) = world.get::<&mut Stats>(target) else {
            return;
        };
        let mut damage = (attack - target_stats.defense).max(MIN_DAMAGE);
        if critical {
            damage = (damage as f32 * crit_multiplier).round() as i32;
        }
        target_stats.apply_damage(damage);

        events.push(GameEvent::AttackHit {
            attacker,
            target,
            target_pos,
            damage,
            critical,
            target_is_player,
        });
        target_stats.is_dead()
    };

    if died {
        if !queries::has_dead_marker(world, target) {
            if target_is_player {
                death::kill_player(world, target, Some(attacker), events, rng);
            } else {
                death::kill_monster(world, target, attacker, events, hooks);
            }
        }
        return;
    }

    // Being struck always aggros, even non-aggressive monsters
    if attacker_is_player {
        aggro_struck_monster(world, target, attacker, rng);
    }
}

/// Turn the attacker's 8-way facing toward a target position.
pub fn face_target(world: &mut World, attacker: Entity, target_pos: glam::Vec2) {
    let Some(pos) = queries::entity_position(world, attacker) else {
        return;
    };
    if let Ok(mut mv) = world.get::<&mut Movement>(attacker) {
        mv.direction = movement::facing_from_delta(target_pos - pos);
    }
}

/// A player hit forces a passive-state monster into CHASING the attacker.
fn aggro_struck_monster(world: &mut World, monster: Entity, attacker: Entity, rng: &mut impl Rng) {
    let passive_state = match world.get::<&Ai>(monster) {
        Ok(ai) => matches!(
            ai.state,
            AiState::Idle | AiState::Roaming | AiState::Returning
        ),
        Err(_) => false,
    };
    if passive_state {
        ai::start_chase(world, monster, attacker, rng);
    }
}

/// Reduce the player's weapon durability after a whiff
fn degrade_weapon(world: &mut World, attacker: Entity, hooks: &mut dyn Hooks) {
    let degraded = match world.get::<&mut Equipment>(attacker) {
        Ok(mut equipment) => match equipment.weapon.as_mut() {
            Some(weapon) if weapon.durability > 0 => {
                weapon.durability -= 1;
                true
            }
            _ => false,
        },
        Err(_) => false,
    };
    if degraded {
        hooks.on_inventory_changed();
    }
}
