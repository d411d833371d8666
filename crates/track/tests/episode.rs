use layout::procedural::RingTrack;
use layout::{Side, TrackLayout};
use physics::{Action, Vec3};
use rl::Env;
use track::{
    CheckpointId, ContactEvent, EpisodeController, EpisodeState, ObstacleId, TerminationCause,
    TrackConfig, TrackError, Zone,
};

const IDLE: Action = Action::new(0.0, 0.0, 0.0);

fn straight_track() -> TrackLayout {
    TrackLayout::from_path("tests/data/straight_track.json").unwrap()
}

fn seeded() -> TrackConfig {
    TrackConfig {
        seed: Some(3),
        ..TrackConfig::default()
    }
}

fn controller() -> EpisodeController {
    let mut env = EpisodeController::new(&straight_track(), seeded()).unwrap();
    env.reset();
    env
}

#[test]
fn first_checkpoint_visit_is_rewarded_once() {
    let mut env = controller();
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(2)));
    let result = env.step(IDLE);
    assert_eq!(result.reward, 1.0);
    assert!(!result.terminated);
    assert!(env.registry().checkpoint(CheckpointId(2)).unwrap().visited);
    // The target moves on to the closest remaining checkpoint
    assert_eq!(env.nearest().checkpoint(), Some(CheckpointId(0)));
}

#[test]
fn revisiting_a_checkpoint_ends_the_episode() {
    let mut env = controller();
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));
    env.step(IDLE);

    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));
    let result = env.step(IDLE);
    assert_eq!(result.reward, -0.4);
    assert!(result.terminated);
    assert_eq!(result.cause, Some(TerminationCause::RevisitedCheckpoint));

    // The next episode has already started with clean flags
    assert_eq!(env.episode(), 2);
    assert_eq!(env.state(), EpisodeState::Active);
    assert!(env.registry().checkpoints().iter().all(|c| !c.visited));
}

#[test]
fn dwelling_past_the_limit_times_out() {
    let mut env = controller();
    let mut ticks = 0;
    let result = loop {
        env.push_event(ContactEvent::ZoneDwell(Zone::Other));
        let result = env.step(IDLE);
        ticks += 1;
        if result.terminated || ticks > 100 {
            break result;
        }
        assert_eq!(result.reward, 0.0);
    };
    // 0.02 s ticks against a 1.0 s limit: the timer first exceeds it around
    // tick 51, give or take float accumulation.
    assert!((50..=52).contains(&ticks), "timed out after {ticks} ticks");
    assert_eq!(result.reward, -0.7);
    assert_eq!(result.cause, Some(TerminationCause::DwellTimeout));
    assert_eq!(env.dwell_timer(), 0.0);
}

#[test]
fn final_zone_dwell_trickles_reward_and_times_out_neutrally() {
    let mut env = controller();
    let mut total = 0.0;
    loop {
        env.push_event(ContactEvent::FINAL_ZONE_DWELL);
        let result = env.step(IDLE);
        total += result.reward;
        if result.terminated {
            assert_eq!(result.cause, Some(TerminationCause::DwellTimeout));
            // Only the per-tick trickle, the timeout itself is worth nothing
            assert_eq!(result.reward, 0.0001);
            break;
        }
    }
    assert!(total > 0.0 && total < 0.01, "total {total}");
}

#[test]
fn first_visit_restarts_the_dwell_timer() {
    let mut env = controller();
    for _ in 0..40 {
        env.push_event(ContactEvent::ZoneDwell(Zone::Other));
        env.step(IDLE);
    }
    assert!(env.dwell_timer() > 0.7);

    env.push_event(ContactEvent::CheckpointHit(CheckpointId(1)));
    env.step(IDLE);
    assert_eq!(env.dwell_timer(), 0.0);

    for _ in 0..40 {
        env.push_event(ContactEvent::ZoneDwell(Zone::Other));
        assert!(!env.step(IDLE).terminated);
    }
}

#[test]
fn tilted_platform_ends_the_episode_off_track() {
    let mut env = controller();
    env.vehicle_mut().speed = 0.5;
    // dot(Y, platform_up) = 0.85, below the 0.9 threshold
    env.set_platform_up(Vec3::new(0.0, 0.85, 0.526_782_7));
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));

    let result = env.step(Action::new(1.0, 0.0, 0.0));
    assert!(result.terminated);
    assert_eq!(result.cause, Some(TerminationCause::OffTrack));
    // The queued checkpoint hit was dropped
    assert_eq!(result.reward, -1.0);
    assert_eq!(env.vehicle().speed, 0.0);
}

#[test]
fn hazards_terminate_with_their_penalty() {
    let cases = [
        (ContactEvent::HostileMarker, TerminationCause::HostileMarker),
        (ContactEvent::TerrainBoundary, TerminationCause::TerrainBoundary),
        (
            ContactEvent::ObstacleCollision(ObstacleId(1)),
            TerminationCause::ObstacleCollision,
        ),
    ];
    for (event, cause) in cases {
        let mut env = controller();
        env.push_event(event);
        let result = env.step(IDLE);
        assert_eq!(result.reward, -1.0, "{event:?}");
        assert_eq!(result.cause, Some(cause), "{event:?}");
    }
}

#[test]
fn dodging_an_obstacle_marks_it_encountered() {
    let mut env = controller();
    let target = env.nearest().obstacle().unwrap();
    env.push_event(ContactEvent::ObstacleHandlerEnter(target));
    let result = env.step(IDLE);
    assert_eq!(result.reward, 1.0);
    assert!(env.registry().obstacle(target).unwrap().encountered);
    assert_ne!(env.nearest().obstacle(), Some(target));
}

#[test]
fn first_terminating_event_short_circuits_the_step() {
    let mut env = controller();
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));
    env.push_event(ContactEvent::HostileMarker);
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(1)));
    let result = env.step(IDLE);
    assert!(result.terminated);
    assert_eq!(result.cause, Some(TerminationCause::HostileMarker));
    assert_eq!(result.reward, 0.0);
}

#[test]
fn unknown_ids_are_ignored() {
    let mut env = controller();
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(99)));
    env.push_event(ContactEvent::ObstacleHandlerEnter(ObstacleId(99)));
    let result = env.step(IDLE);
    assert_eq!(result.reward, 0.0);
    assert!(!result.terminated);
}

#[test]
fn step_limit_cuts_the_episode() {
    let config = TrackConfig {
        max_episode_steps: 5,
        ..seeded()
    };
    let mut env = EpisodeController::new(&straight_track(), config).unwrap();
    env.reset();
    for _ in 0..4 {
        assert!(!env.step(IDLE).terminated);
    }
    let result = env.step(IDLE);
    assert_eq!(result.cause, Some(TerminationCause::StepLimit));
    assert_eq!(result.reward, 0.0);
    assert_eq!(env.step_count(), 0);
}

#[test]
fn reset_restores_spawn_and_clears_flags() {
    let mut env = controller();
    let spawn = env.spawn();
    for _ in 0..20 {
        env.step(Action::new(1.0, 0.3, 0.0));
    }
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));
    let target = env.nearest().obstacle().unwrap();
    env.push_event(ContactEvent::ObstacleHandlerEnter(target));
    env.step(IDLE);
    assert_ne!(env.vehicle().transform.position, spawn.position);

    env.reset();
    env.reset();
    let car = env.vehicle();
    assert_eq!(car.transform, spawn);
    assert_eq!(car.speed, 0.0);
    assert_eq!(car.velocity, Vec3::ZERO);
    assert_eq!(env.dwell_timer(), 0.0);
    assert!(env.registry().checkpoints().iter().all(|c| !c.visited));
    assert!(env.registry().obstacles().iter().all(|o| !o.encountered));
    assert_eq!(env.nearest().checkpoint(), Some(CheckpointId(2)));
}

#[test]
fn speed_window_is_drawn_per_episode() {
    let mut env = controller();
    for _ in 0..50 {
        env.reset();
        let car = env.vehicle();
        assert!((0.8..=1.4).contains(&car.max_speed), "max {}", car.max_speed);
        assert!((-0.5..=-0.01).contains(&car.min_speed), "min {}", car.min_speed);
    }
}

#[test]
fn config_file_overrides_are_honored() {
    let config = TrackConfig::from_path("tests/data/config.json").unwrap();
    let mut env = EpisodeController::new(&straight_track(), config).unwrap();
    env.reset();
    assert_eq!(env.vehicle().min_speed, -0.25);
    assert_eq!(env.vehicle().max_speed, 1.2);

    env.push_event(ContactEvent::CheckpointHit(CheckpointId(1)));
    assert_eq!(env.step(IDLE).reward, 2.0);
}

#[test]
fn reconfiguration_waits_for_the_next_episode() {
    let mut env = controller();
    let mut next = seeded();
    next.rewards.checkpoint_first_visit = 5.0;
    env.reconfigure(next).unwrap();

    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));
    assert_eq!(env.step(IDLE).reward, 1.0);

    env.reset();
    env.push_event(ContactEvent::CheckpointHit(CheckpointId(0)));
    assert_eq!(env.step(IDLE).reward, 5.0);
    assert_eq!(env.config().rewards.checkpoint_first_visit, 5.0);
}

#[test]
fn invalid_reconfiguration_is_rejected() {
    let mut env = controller();
    let bad = TrackConfig {
        fixed_delta_time: 0.0,
        ..seeded()
    };
    assert!(matches!(env.reconfigure(bad), Err(TrackError::InvalidConfig(_))));
    env.reset();
    assert_eq!(env.config().fixed_delta_time, 0.02);
}

#[test]
fn stepping_before_reset_starts_an_episode() {
    let mut env = EpisodeController::new(&straight_track(), seeded()).unwrap();
    assert_eq!(env.state(), EpisodeState::Uninitialized);
    let result = env.step(IDLE);
    assert!(!result.terminated);
    assert_eq!(env.state(), EpisodeState::Active);
    assert_eq!(env.episode(), 1);
}

#[test]
fn full_slot_pool_places_every_obstacle_on_a_distinct_slot() {
    let ring = RingTrack {
        obstacles: 57,
        ..RingTrack::default()
    };
    let mut env = EpisodeController::new(&ring.build(), seeded()).unwrap();
    for _ in 0..10 {
        env.reset();
        let mut slots: Vec<usize> = env
            .registry()
            .obstacles()
            .iter()
            .map(|o| o.slot.unwrap().1)
            .collect();
        slots.sort_unstable();
        assert_eq!(slots, (0..57).collect::<Vec<_>>());
    }
}

#[test]
fn obstacles_land_on_both_sides_with_offset_handlers() {
    let ring = RingTrack {
        obstacles: 57,
        ..RingTrack::default()
    };
    let mut env = EpisodeController::new(&ring.build(), seeded()).unwrap();
    let offset = env.config().handler_offset;
    let (mut right, mut left) = (0, 0);
    for _ in 0..5 {
        env.reset();
        for o in env.registry().obstacles() {
            let (side, _) = o.slot.unwrap();
            match side {
                Side::Right => right += 1,
                Side::Left => left += 1,
            }
            let expected =
                o.transform.position + side.handler_sign() * offset * o.transform.forward();
            assert!(
                o.handler.position.abs_diff_eq(expected, 1e-4),
                "{side:?}: {} vs {expected}",
                o.handler.position
            );
        }
    }
    assert!(right > 0 && left > 0, "right {right}, left {left}");
}

#[test]
fn more_obstacles_than_slots_is_a_setup_error() {
    let ring = RingTrack {
        obstacles: 58,
        ..RingTrack::default()
    };
    let err = EpisodeController::new(&ring.build(), seeded()).err().unwrap();
    assert!(matches!(
        err,
        TrackError::TooManyObstacles {
            obstacles: 58,
            slots: 57
        }
    ));
}

#[test]
fn same_seed_same_placement() {
    let layout = RingTrack::default().build();
    let mut a = EpisodeController::new(&layout, seeded()).unwrap();
    let mut b = EpisodeController::new(&layout, seeded()).unwrap();
    for _ in 0..3 {
        a.reset();
        b.reset();
        assert_eq!(a.registry().obstacles(), b.registry().obstacles());
        assert_eq!(a.vehicle(), b.vehicle());
    }
}

#[test]
fn nearest_targets_minimize_distance_after_reset() {
    let mut env = EpisodeController::new(&RingTrack::default().build(), seeded()).unwrap();
    for _ in 0..5 {
        env.reset();
        let at = env.vehicle().transform.position;
        let id = env.nearest().obstacle().unwrap();
        let chosen = env.registry().obstacle(id).unwrap().transform.position.distance(at);
        for obstacle in env.registry().obstacles() {
            assert!(chosen <= obstacle.transform.position.distance(at));
        }
    }
}

#[test]
fn env_interface_reports_flat_vectors() {
    let mut env = controller();
    assert_eq!(env.obs_size(), 18);
    assert_eq!(env.action_size(), 3);

    let obs = Env::reset(&mut env);
    assert_eq!(obs.len(), 18);
    // Heading +Z against checkpoint 2, which faces +X
    assert!(obs[10].abs() < 1e-6);

    let (obs, reward, done) = Env::step(&mut env, &[1.0]);
    assert_eq!(obs.len(), 18);
    assert_eq!(reward, 0.0);
    assert!(!done);
    assert!(env.vehicle().speed > 0.0);
}
