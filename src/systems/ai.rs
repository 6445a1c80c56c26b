//! Monster decision-making: the per-monster finite state machine.
//!
//! Each tick, every living monster checks its transition rules in strict
//! priority order and acts for its current state. All state changes funnel
//! through [`transition_ai_state`], which stops movement and clears any
//! path so no stale intent survives a state change.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::components::{
    Ai, AiState, Behavior, CollisionBox, Combat, Dead, Movement, PathFollow, Stats,
};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use crate::grid::Grid;
use crate::queries;
use crate::systems::combat;
use crate::systems::path::{self, PathRequest};

/// Snapshot of the fields the per-state handlers read
#[derive(Clone, Copy)]
struct AiView {
    state: AiState,
    pos: Vec2,
    home: Vec2,
    roam_radius: f32,
    detection_range: f32,
    attack_range: f32,
    return_threshold: f32,
    behavior: Behavior,
    roam_timer: f32,
    roam_interval: f32,
    path_timer: f32,
    path_update_interval: f32,
    victory_timer: f32,
    victory_idle_duration: f32,
    target: Option<Entity>,
    roam_target: Option<Vec2>,
}

/// Run the state machine for every living monster.
pub fn update_ai(
    world: &mut World,
    grid: &Grid,
    player: Entity,
    dt: f32,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    puffin::profile_function!();

    let monsters: Vec<Entity> = world
        .query::<&Ai>()
        .without::<&Dead>()
        .iter()
        .map(|(id, _)| id)
        .collect();

    for entity in monsters {
        update_monster(world, grid, entity, player, dt, events, rng);
    }
}

fn update_monster(
    world: &mut World,
    grid: &Grid,
    entity: Entity,
    player: Entity,
    dt: f32,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    // All per-state timers advance by the same tick delta
    {
        let Ok(mut ai) = world.get::<&mut Ai>(entity) else {
            return;
        };
        ai.roam_timer += dt;
        ai.path_timer += dt;
        ai.attack_timer += dt;
        ai.victory_timer += dt;
    }

    let Some(view) = snapshot(world, entity) else {
        return;
    };

    // Highest priority, from any state: our target went down
    if let Some(target) = view.target {
        if queries::is_entity_dead(world, target)
            && !matches!(view.state, AiState::VictoryIdle | AiState::Dead)
        {
            transition_ai_state(world, entity, AiState::VictoryIdle, rng);
            return;
        }
    }

    match view.state {
        AiState::Idle => update_idle(world, entity, player, &view, rng),
        AiState::Roaming => update_roaming(world, grid, entity, player, &view, rng),
        AiState::Chasing => update_chasing(world, grid, entity, player, &view, rng),
        AiState::Returning => update_returning(world, grid, entity, &view, events, rng),
        AiState::Attacking => update_attacking(world, entity, player, &view, rng),
        AiState::VictoryIdle => update_victory_idle(world, entity, &view, rng),
        AiState::Dead => {}
    }
}

/// Change an AI state, with all the structural side effects.
///
/// Same-state transitions are a strict no-op: no timer resets, no movement
/// or path clearing.
pub fn transition_ai_state(world: &mut World, entity: Entity, new_state: AiState, rng: &mut impl Rng) {
    let old_state = match world.get::<&Ai>(entity) {
        Ok(ai) => ai.state,
        Err(_) => return,
    };
    if old_state == new_state {
        return;
    }

    if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
        movement.stop();
        if old_state == AiState::Returning {
            movement.is_hasted = false;
        }
        if new_state == AiState::Returning {
            movement.is_hasted = true;
        }
    }
    if let Ok(mut path) = world.get::<&mut PathFollow>(entity) {
        path.clear();
    }

    if let Ok(mut ai) = world.get::<&mut Ai>(entity) {
        ai.state = new_state;
        ai.roam_target = None;
        match new_state {
            AiState::Idle => {
                ai.roam_timer = 0.0;
                ai.roam_interval = rng.gen_range(ROAM_INTERVAL_MIN..ROAM_INTERVAL_MAX);
            }
            AiState::VictoryIdle => {
                ai.victory_timer = 0.0;
                ai.target = None;
            }
            AiState::Returning => {
                ai.target = None;
            }
            _ => {}
        }
    }
}

/// Put a monster on the attacker's trail, forcing an immediate path
/// recompute on the next chasing tick.
pub fn start_chase(world: &mut World, entity: Entity, target: Entity, rng: &mut impl Rng) {
    transition_ai_state(world, entity, AiState::Chasing, rng);
    if let Ok(mut ai) = world.get::<&mut Ai>(entity) {
        ai.target = Some(target);
        ai.path_timer = ai.path_update_interval;
    }
}

fn update_idle(
    world: &mut World,
    entity: Entity,
    player: Entity,
    view: &AiView,
    rng: &mut impl Rng,
) {
    if should_aggro(world, player, view) {
        start_chase(world, entity, player, rng);
        return;
    }

    if view.roam_timer >= view.roam_interval {
        transition_ai_state(world, entity, AiState::Roaming, rng);
    }
}

fn update_roaming(
    world: &mut World,
    grid: &Grid,
    entity: Entity,
    player: Entity,
    view: &AiView,
    rng: &mut impl Rng,
) {
    if should_aggro(world, player, view) {
        start_chase(world, entity, player, rng);
        return;
    }

    let busy = is_moving_or_following(world, entity);
    if busy {
        return;
    }

    // A pending roam target with no movement left means we arrived
    if view.roam_target.is_some() {
        transition_ai_state(world, entity, AiState::Idle, rng);
        return;
    }

    // Pick a random point within the roam radius of home
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = rng.gen_range(0.0..view.roam_radius);
    let destination = view.home + Vec2::from_angle(angle) * radius;

    match request_entity_path(world, grid, entity, view.pos, destination) {
        PathRequest::Following => {
            if let Ok(mut ai) = world.get::<&mut Ai>(entity) {
                ai.roam_target = Some(destination);
            }
        }
        // Nowhere to go (or nothing to do): settle back down
        PathRequest::AlreadyThere | PathRequest::Unreachable => {
            transition_ai_state(world, entity, AiState::Idle, rng);
        }
    }
}

fn update_chasing(
    world: &mut World,
    grid: &Grid,
    entity: Entity,
    player: Entity,
    view: &AiView,
    rng: &mut impl Rng,
) {
    let Some(player_pos) = queries::entity_position(world, player) else {
        transition_ai_state(world, entity, AiState::Returning, rng);
        return;
    };

    // Leash break comes before every other chasing rule
    if view.pos.distance(view.home) > view.return_threshold {
        transition_ai_state(world, entity, AiState::Returning, rng);
        return;
    }

    // Aggro lost: player got too far away
    if view.pos.distance(player_pos) > view.detection_range * TILE_SIZE * AGGRO_DROP_FACTOR {
        transition_ai_state(world, entity, AiState::Returning, rng);
        return;
    }

    // Close enough to swing
    if view.pos.distance(player_pos) <= view.attack_range {
        transition_ai_state(world, entity, AiState::Attacking, rng);
        if let Ok(mut ai) = world.get::<&mut Ai>(entity) {
            ai.target = Some(player);
        }
        return;
    }

    // Recompute the pursuit path on an interval, not every tick
    if view.path_timer >= view.path_update_interval {
        if let Ok(mut ai) = world.get::<&mut Ai>(entity) {
            ai.path_timer = 0.0;
        }
        match request_entity_path(world, grid, entity, view.pos, player_pos) {
            PathRequest::Following | PathRequest::AlreadyThere => {}
            PathRequest::Unreachable => {
                transition_ai_state(world, entity, AiState::Returning, rng);
            }
        }
    }
}

fn update_attacking(
    world: &mut World,
    entity: Entity,
    player: Entity,
    view: &AiView,
    rng: &mut impl Rng,
) {
    let Some(player_pos) = queries::entity_position(world, player) else {
        transition_ai_state(world, entity, AiState::Returning, rng);
        return;
    };

    // Target slipped out of reach: resume the chase
    if view.pos.distance(player_pos) > view.attack_range * ATTACK_BREAK_FACTOR {
        start_chase(world, entity, player, rng);
        return;
    }

    let ai_ready = world
        .get::<&Ai>(entity)
        .map(|ai| ai.can_attack())
        .unwrap_or(false);
    let combat_ready = world
        .get::<&Combat>(entity)
        .map(|c| c.can_attack())
        .unwrap_or(false);

    if ai_ready && combat_ready {
        combat::face_target(world, entity, player_pos);
        if combat::try_start_attack(world, entity, player) {
            if let Ok(mut ai) = world.get::<&mut Ai>(entity) {
                ai.attack_timer = 0.0;
            }
        }
    }
}

fn update_returning(
    world: &mut World,
    grid: &Grid,
    entity: Entity,
    view: &AiView,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    if view.pos.distance(view.home) < RETURN_ARRIVE_DISTANCE {
        finish_return(world, entity, events, rng);
        return;
    }

    if is_moving_or_following(world, entity) {
        return;
    }

    match request_entity_path(world, grid, entity, view.pos, view.home) {
        PathRequest::Following => {}
        PathRequest::AlreadyThere => finish_return(world, entity, events, rng),
        // No way home: give up the return rather than pacing forever. The
        // transition clears haste on the way out.
        PathRequest::Unreachable => {
            transition_ai_state(world, entity, AiState::Idle, rng);
        }
    }
}

/// Arrived home: drop haste, heal to full, settle into idle.
fn finish_return(world: &mut World, entity: Entity, events: &mut EventQueue, rng: &mut impl Rng) {
    let healed = match world.get::<&mut Stats>(entity) {
        Ok(mut stats) => {
            let amount = stats.max_hp - stats.hp;
            stats.heal_full();
            amount
        }
        Err(_) => 0,
    };
    if healed > 0 {
        let position = queries::entity_position(world, entity)
            .map(|p| (p.x, p.y))
            .unwrap_or((0.0, 0.0));
        events.push(GameEvent::MonsterHealed {
            entity,
            position,
            amount: healed,
        });
    }
    transition_ai_state(world, entity, AiState::Idle, rng);
}

fn update_victory_idle(world: &mut World, entity: Entity, view: &AiView, rng: &mut impl Rng) {
    if view.victory_timer < view.victory_idle_duration {
        return;
    }
    if view.pos.distance(view.home) <= view.roam_radius * VICTORY_HOME_FACTOR {
        transition_ai_state(world, entity, AiState::Idle, rng);
    } else {
        transition_ai_state(world, entity, AiState::Returning, rng);
    }
}

/// Aggro check for passive states: aggressive behavior, a living player,
/// the monster near enough to home, and the player inside detection range.
fn should_aggro(world: &World, player: Entity, view: &AiView) -> bool {
    if view.behavior != Behavior::Aggressive {
        return false;
    }
    if queries::is_entity_dead(world, player) {
        return false;
    }
    if view.pos.distance(view.home) > view.roam_radius * AGGRO_HOME_LIMIT_FACTOR {
        return false;
    }
    let Some(player_pos) = queries::entity_position(world, player) else {
        return false;
    };
    view.pos.distance(player_pos) <= view.detection_range * TILE_SIZE
}

fn is_moving_or_following(world: &World, entity: Entity) -> bool {
    let moving = world
        .get::<&Movement>(entity)
        .map(|m| m.is_moving)
        .unwrap_or(false);
    let following = world
        .get::<&PathFollow>(entity)
        .map(|p| p.is_following)
        .unwrap_or(false);
    moving || following
}

/// Route an entity toward a world destination through its own path state
fn request_entity_path(
    world: &mut World,
    grid: &Grid,
    entity: Entity,
    from: Vec2,
    to: Vec2,
) -> PathRequest {
    let bbox = world.get::<&CollisionBox>(entity).map(|b| *b).ok();
    match world.get::<&mut PathFollow>(entity) {
        Ok(mut path_follow) => {
            path::request_path(grid, &mut path_follow, bbox.as_ref(), from, to)
        }
        Err(_) => PathRequest::Unreachable,
    }
}

fn snapshot(world: &World, entity: Entity) -> Option<AiView> {
    let pos = queries::entity_position(world, entity)?;
    let ai = world.get::<&Ai>(entity).ok()?;
    Some(AiView {
        state: ai.state,
        pos,
        home: ai.home,
        roam_radius: ai.roam_radius,
        detection_range: ai.detection_range,
        attack_range: ai.attack_range,
        return_threshold: ai.return_threshold,
        behavior: ai.behavior,
        roam_timer: ai.roam_timer,
        roam_interval: ai.roam_interval,
        path_timer: ai.path_timer,
        path_update_interval: ai.path_update_interval,
        victory_timer: ai.victory_timer,
        victory_idle_duration: ai.victory_idle_duration,
        target: ai.target,
        roam_target: ai.roam_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use crate::spawning::{self, templates};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (World, Grid, EventQueue, StdRng) {
        (
            World::new(),
            Grid::new(32, 32),
            EventQueue::new(),
            StdRng::seed_from_u64(7),
        )
    }

    fn monster_state(world: &World, entity: Entity) -> AiState {
        world.get::<&Ai>(entity).unwrap().state
    }

    #[test]
    fn test_same_state_transition_is_noop() {
        let (mut world, _grid, _events, mut rng) = setup();
        let monster = templates::wolf().spawn(&mut world, Vec2::new(320.0, 320.0));

        {
            let mut ai = world.get::<&mut Ai>(monster).unwrap();
            ai.roam_timer = 2.5;
            ai.roam_interval = 99.0;
        }
        {
            let mut movement = world.get::<&mut Movement>(monster).unwrap();
            movement.move_to(Vec2::new(400.0, 320.0));
        }
        world
            .get::<&mut PathFollow>(monster)
            .unwrap()
            .follow(vec![(6, 5)], Vec2::new(320.0, 320.0));

        transition_ai_state(&mut world, monster, AiState::Idle, &mut rng);

        // Nothing may have been touched
        let ai = world.get::<&Ai>(monster).unwrap();
        assert_eq!(ai.roam_timer, 2.5);
        assert_eq!(ai.roam_interval, 99.0);
        drop(ai);
        assert!(world.get::<&Movement>(monster).unwrap().is_moving);
        assert!(world.get::<&PathFollow>(monster).unwrap().is_following);
    }

    #[test]
    fn test_transition_clears_movement_and_path() {
        let (mut world, _grid, _events, mut rng) = setup();
        let monster = templates::wolf().spawn(&mut world, Vec2::new(320.0, 320.0));

        world
            .get::<&mut Movement>(monster)
            .unwrap()
            .move_to(Vec2::new(400.0, 320.0));
        world
            .get::<&mut PathFollow>(monster)
            .unwrap()
            .follow(vec![(6, 5)], Vec2::new(320.0, 320.0));

        transition_ai_state(&mut world, monster, AiState::Roaming, &mut rng);

        assert!(!world.get::<&Movement>(monster).unwrap().is_moving);
        assert!(!world.get::<&PathFollow>(monster).unwrap().is_following);
    }

    #[test]
    fn test_leash_break_forces_return_with_haste() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let mut template = templates::wolf();
        template.roam_radius = 100.0;
        template.return_threshold = 400.0;
        let monster = template.spawn(&mut world, home);
        let player = spawning::spawn_player(&mut world, Vec2::new(900.0, 320.0));

        // Chasing, but displaced 500 units from home
        start_chase(&mut world, monster, player, &mut rng);
        world
            .get::<&mut Position>(monster)
            .unwrap()
            .set_vec(home + Vec2::new(500.0, 0.0));

        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Returning);
        assert!(world.get::<&Movement>(monster).unwrap().is_hasted);
    }

    #[test]
    fn test_leash_break_beats_aggro_lost() {
        // Both leash-break and aggro-lost hold; the outcome must be the
        // leash rule's (still Returning, target cleared) - checked first
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let mut template = templates::wolf();
        template.return_threshold = 300.0;
        template.detection_range = 2.0;
        let monster = template.spawn(&mut world, home);
        let player = spawning::spawn_player(&mut world, Vec2::new(1800.0, 320.0));

        start_chase(&mut world, monster, player, &mut rng);
        world
            .get::<&mut Position>(monster)
            .unwrap()
            .set_vec(home + Vec2::new(500.0, 0.0));

        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Returning);
        assert!(world.get::<&Ai>(monster).unwrap().target.is_none());
    }

    #[test]
    fn test_idle_monster_aggros_in_detection_range() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::wolf().spawn(&mut world, home);
        // Wolf detection range is 4 tiles = 256 units
        let player = spawning::spawn_player(&mut world, home + Vec2::new(200.0, 0.0));

        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Chasing);
        assert_eq!(world.get::<&Ai>(monster).unwrap().target, Some(player));
    }

    #[test]
    fn test_passive_monster_ignores_player() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::slime().spawn(&mut world, home);
        let player = spawning::spawn_player(&mut world, home + Vec2::new(100.0, 0.0));

        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_ne!(monster_state(&world, monster), AiState::Chasing);
    }

    #[test]
    fn test_chasing_enters_attacking_in_range() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::wolf().spawn(&mut world, home);
        let player = spawning::spawn_player(&mut world, home + Vec2::new(40.0, 0.0));

        start_chase(&mut world, monster, player, &mut rng);
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Attacking);
    }

    #[test]
    fn test_attacking_starts_swing_and_faces_target() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::wolf().spawn(&mut world, home);
        // Player due west of the monster
        let player = spawning::spawn_player(&mut world, home + Vec2::new(-40.0, 0.0));

        start_chase(&mut world, monster, player, &mut rng);
        // Tick 1 transitions to Attacking, tick 2 swings
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        let combat = world.get::<&Combat>(monster).unwrap();
        assert!(combat.is_attacking);
        assert_eq!(combat.attack_target, Some(player));
        drop(combat);
        assert_eq!(world.get::<&Movement>(monster).unwrap().direction, 4);
        assert_eq!(world.get::<&Ai>(monster).unwrap().attack_timer, 0.0);
    }

    #[test]
    fn test_returning_arrival_heals_and_idles() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::wolf().spawn(&mut world, home);

        world.get::<&mut Stats>(monster).unwrap().hp = 3;
        {
            let mut ai = world.get::<&mut Ai>(monster).unwrap();
            ai.state = AiState::Returning;
        }
        world.get::<&mut Movement>(monster).unwrap().is_hasted = true;
        // Already within arrival distance of home
        world
            .get::<&mut Position>(monster)
            .unwrap()
            .set_vec(home + Vec2::new(10.0, 0.0));

        let player = player_stub(&mut world);
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Idle);
        let stats = world.get::<&Stats>(monster).unwrap();
        assert_eq!(stats.hp, stats.max_hp);
        drop(stats);
        assert!(!world.get::<&Movement>(monster).unwrap().is_hasted);
        assert!(events
            .pending()
            .iter()
            .any(|e| matches!(e, GameEvent::MonsterHealed { .. })));
    }

    #[test]
    fn test_victory_idle_times_out_to_idle_near_home() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::wolf().spawn(&mut world, home);
        {
            let mut ai = world.get::<&mut Ai>(monster).unwrap();
            ai.state = AiState::VictoryIdle;
            ai.victory_timer = ai.victory_idle_duration;
        }

        let player = player_stub(&mut world);
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Idle);
    }

    #[test]
    fn test_victory_idle_times_out_to_returning_far_from_home() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let mut template = templates::wolf();
        template.roam_radius = 100.0;
        let monster = template.spawn(&mut world, home);
        {
            let mut ai = world.get::<&mut Ai>(monster).unwrap();
            ai.state = AiState::VictoryIdle;
            ai.victory_timer = ai.victory_idle_duration;
        }
        world
            .get::<&mut Position>(monster)
            .unwrap()
            .set_vec(home + Vec2::new(200.0, 0.0));

        let player = player_stub(&mut world);
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::Returning);
    }

    #[test]
    fn test_downed_target_grants_victory_idle() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(320.0, 320.0);
        let monster = templates::wolf().spawn(&mut world, home);
        let player = spawning::spawn_player(&mut world, home + Vec2::new(600.0, 0.0));

        start_chase(&mut world, monster, player, &mut rng);
        world.get::<&mut Stats>(player).unwrap().hp = 0;

        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);

        assert_eq!(monster_state(&world, monster), AiState::VictoryIdle);
        assert!(world.get::<&Ai>(monster).unwrap().target.is_none());
    }

    #[test]
    fn test_idle_rolls_over_to_roaming() {
        let (mut world, grid, mut events, mut rng) = setup();
        let home = Vec2::new(640.0, 640.0);
        let monster = templates::slime().spawn(&mut world, home);
        {
            let mut ai = world.get::<&mut Ai>(monster).unwrap();
            ai.roam_timer = ai.roam_interval;
        }

        let player = player_stub(&mut world);
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);
        assert_eq!(monster_state(&world, monster), AiState::Roaming);

        // Next tick picks a destination and starts following a path (or
        // settles straight back to idle if the roll landed on its own tile)
        update_ai(&mut world, &grid, player, TICK_DT, &mut events, &mut rng);
        let roaming = monster_state(&world, monster) == AiState::Roaming;
        let idled = monster_state(&world, monster) == AiState::Idle;
        assert!(roaming || idled);
        if roaming {
            assert!(world.get::<&PathFollow>(monster).unwrap().is_following);
        }
    }

    fn player_stub(world: &mut World) -> Entity {
        spawning::spawn_player(world, Vec2::new(1920.0, 1920.0))
    }
}
