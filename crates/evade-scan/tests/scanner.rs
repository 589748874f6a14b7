mod common;

use common::*;
use evade_core::{Classification, Vec2, Vec3};
use evade_nav::{Obstacle, ObstacleWorld};
use evade_scan::{
    AgentState, SampleEval, ScanConfig, ScanEnv, Scanner, ScoreWeights, ThreatState, TickOutcome,
};
use evade_tools::{LineKind, NullTraceSink, VecTraceSink};

const R: f32 = 10.0;

fn agent() -> AgentState {
    AgentState::new(Vec3::ZERO)
}

fn threat() -> ThreatState {
    ThreatState::new(THREAT_AT)
}

fn threat_eye() -> Vec3 {
    THREAT_AT + Vec3::UP * ScanConfig::default().eye_height
}

fn scanner(points: Vec<Vec2>) -> Scanner<FixedSampler> {
    Scanner::new(ScanConfig::default(), FixedSampler::new(points)).expect("valid config")
}

#[test]
fn spot_behind_wall_gets_cover_bonus() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0)]);

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    let report = outcome.report().expect("scanned");
    let best = report.best.expect("candidate");
    let hit = best.hit.expect("probe stopped by the wall");
    assert_eq!(hit.class, Classification::Wall);
    assert!(approx(best.raw.x, 3.4));
    assert_eq!(best.raw.y, 0.0);
    assert!(best.cover);
    assert!(!best.direct_sight);

    let expected = 1000.0 + best.projected.distance(threat_eye()) * 2.0;
    assert!(approx(best.score, expected));
    assert_eq!(moves, vec![best.projected]);
}

#[test]
fn probe_hitting_threat_is_penalized() {
    let world = open_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0)]);

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    let best = outcome.report().and_then(|r| r.best).expect("candidate");
    assert_eq!(best.hit.map(|h| h.class), Some(Classification::Threat));
    assert!(approx(best.raw.x, 8.9));
    assert!(best.direct_sight);
    assert!(!best.cover);

    let expected = best.projected.distance(threat_eye()) * 2.0 - 500.0;
    assert!(approx(best.score, expected));
}

#[test]
fn cover_outweighs_distance() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    // The open spot comes first and is farther from the threat.
    let mut scanner = scanner(vec![sample_at(R, 0.0, -5.0), sample_at(R, 5.0, 0.0)]);

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    let report = outcome.report().expect("scanned");
    assert_eq!(report.projected, 2);
    let best = report.best.expect("candidate");
    assert!(best.cover);
    assert_eq!(best.offset, Vec2::new(5.0, 0.0));
}

#[test]
fn exact_tie_keeps_first_in_sample_order() {
    let world = open_world();
    let surface = floor();
    let north = sample_at(R, 0.0, 5.0);
    let south = sample_at(R, 0.0, -5.0);

    for (order, expected) in [
        (vec![north, south], Vec2::new(0.0, 5.0)),
        (vec![south, north], Vec2::new(0.0, -5.0)),
    ] {
        let mut moves: Vec<Vec3> = Vec::new();
        let mut scanner = scanner(order);
        let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
        let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

        let best = outcome.report().and_then(|r| r.best).expect("candidate");
        assert_eq!(best.offset, expected);
    }
}

#[test]
fn zero_samples_is_a_quiet_pass() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(Vec::new());

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    let report = outcome.report().expect("scanned");
    assert_eq!(report.samples, 0);
    assert!(report.best.is_none());
    assert!(!report.dispatched);
    assert!(moves.is_empty());
    assert_eq!(scanner.next_scan_time(), 0.5);
    assert_eq!(scanner.next_repath_time(), 0.0);
}

#[test]
fn failed_projection_everywhere_selects_nothing() {
    let world = walled_world();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![
        sample_at(R, 5.0, 0.0),
        sample_at(R, 0.0, 5.0),
        sample_at(R, -3.0, -3.0),
    ]);

    let mut env = ScanEnv::new(&world, &NoSurface).with_mover(&mut moves);
    let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    let report = outcome.report().expect("scanned");
    assert_eq!(report.in_range, 3);
    assert_eq!(report.projected, 0);
    assert!(report.best.is_none());
    assert!(moves.is_empty());
    assert_eq!(scanner.last_destination(), None);
}

#[test]
fn samples_outside_disc_or_at_center_are_skipped() {
    let world = open_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![
        Vec2::new(0.0, 0.0), // corner of the extent, ~14 units out
        Vec2::new(R, R),     // agent itself
        sample_at(R, 0.0, 10.0),
    ]);

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    let report = outcome.report().expect("scanned");
    assert_eq!(report.samples, 3);
    assert_eq!(report.in_range, 1);
}

#[test]
fn absent_threat_or_controller_is_a_no_op() {
    let world = walled_world();
    let surface = floor();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0)]);

    let mut moves: Vec<Vec3> = Vec::new();
    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    assert_eq!(
        scanner.tick(0.0, &agent(), None, &mut env),
        TickOutcome::NoThreat
    );

    let mut env = ScanEnv::new(&world, &surface);
    assert_eq!(
        scanner.tick(0.0, &agent(), Some(&threat()), &mut env),
        TickOutcome::NoController
    );

    assert_eq!(scanner.sampler().calls, 0);
    assert_eq!(scanner.next_scan_time(), 0.0);
    assert!(moves.is_empty());
}

#[test]
fn no_scan_before_the_scan_deadline() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0)]);

    let mut scanned_at = Vec::new();
    for step in 0..=4 {
        let now = step as f64 * 0.25;
        let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
        match scanner.tick(now, &agent(), Some(&threat()), &mut env) {
            TickOutcome::Scanned(_) => scanned_at.push(now),
            TickOutcome::NotDue => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(scanned_at, vec![0.0, 0.5, 1.0]);
    assert_eq!(scanner.sampler().calls, 3);
}

#[test]
fn movement_requests_respect_repath_cooldown() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let config = ScanConfig {
        scan_interval: 0.0,
        repath_cooldown: 1.0,
        ..ScanConfig::default()
    };
    let mut scanner =
        Scanner::new(config, FixedSampler::new(vec![sample_at(R, 5.0, 0.0)])).expect("config");

    let mut dispatched_at = Vec::new();
    for step in 0..=8 {
        let now = step as f64 * 0.25;
        let gate_open = now >= scanner.next_repath_time();
        let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
        let outcome = scanner.tick(now, &agent(), Some(&threat()), &mut env);
        assert!(outcome.report().is_some(), "zero interval scans every tick");
        if outcome.dispatched().is_some() {
            assert!(gate_open);
            dispatched_at.push(now);
        }
    }

    assert_eq!(dispatched_at, vec![0.0, 1.0, 2.0]);
    assert_eq!(moves.len(), 3);
    assert_eq!(scanner.sampler().calls, 9);
}

#[test]
fn ticks_before_the_deadline_change_nothing() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0)]);

    {
        let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
        scanner.tick(0.0, &agent(), Some(&threat()), &mut env);
    }
    let snapshot = (
        scanner.next_scan_time(),
        scanner.next_repath_time(),
        scanner.last_destination(),
        scanner.sampler().calls,
        moves.len(),
    );

    for _ in 0..2 {
        let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
        assert_eq!(
            scanner.tick(0.1, &agent(), Some(&threat()), &mut env),
            TickOutcome::NotDue
        );
    }

    assert_eq!(
        snapshot,
        (
            scanner.next_scan_time(),
            scanner.next_repath_time(),
            scanner.last_destination(),
            scanner.sampler().calls,
            moves.len(),
        )
    );
}

#[test]
fn reset_timers_reopens_both_gates() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0)]);

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    scanner.tick(0.0, &agent(), Some(&threat()), &mut env);
    assert_eq!(
        scanner.tick(0.1, &agent(), Some(&threat()), &mut env),
        TickOutcome::NotDue
    );

    scanner.reset_timers();
    let outcome = scanner.tick(0.1, &agent(), Some(&threat()), &mut env);
    assert!(outcome.dispatched().is_some());
    drop(env);
    assert_eq!(moves.len(), 2);
}

fn cluttered_world() -> ObstacleWorld {
    ObstacleWorld::new()
        .with(wall())
        .with(Obstacle::cuboid(
            Vec3::new(-3.0, 1.0, 4.0),
            Vec3::new(2.0, 1.0, 0.5),
            Classification::Wall,
        ))
        .with(Obstacle::cuboid(
            Vec3::new(0.0, 1.0, -6.0),
            Vec3::new(0.5, 1.0, 3.0),
            Classification::Wall,
        ))
        .with(threat_box(THREAT_AT))
}

#[test]
fn candidates_stay_within_scan_radius() {
    let world = cluttered_world();
    let surface = floor();
    let agent = agent();
    let mut scanner = Scanner::new(ScanConfig::default(), RecordingSampler::new(11)).expect("config");

    let samples = scanner.sampler_mut().inner.samples(2.0 * R, 2.0 * R, 1.5);
    assert!(!samples.is_empty());

    let mut scored = 0;
    for sample in samples {
        if let SampleEval::Scored(c) = scanner.evaluate(sample, &agent, &threat(), &world, &surface)
        {
            scored += 1;
            assert!(c.offset.length() <= R);
            assert!(c.raw.distance(agent.position) <= R + 1e-4, "{c:?}");
        }
    }
    assert!(scored > 0);
}

#[test]
fn selected_candidate_maximizes_score() {
    let world = cluttered_world();
    let surface = floor();
    let agent = agent();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut scanner = Scanner::new(ScanConfig::default(), RecordingSampler::new(3)).expect("config");

    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let report = scanner.scan_pass(0.0, &agent, &threat(), &mut env);
    let best = report.best.expect("candidate");

    let mut first_max = None;
    for &sample in scanner.sampler().last.iter() {
        if let SampleEval::Scored(c) = scanner.evaluate(sample, &agent, &threat(), &world, &surface)
        {
            assert!(best.score >= c.score);
            if first_max.is_none() && c.score == best.score {
                first_max = Some(c);
            }
        }
    }
    assert_eq!(first_max, Some(best));
}

#[test]
fn safe_point_bonus_only_when_enabled() {
    let world = open_world().with(Obstacle::cuboid(
        Vec3::new(0.0, 1.0, 5.5),
        Vec3::new(1.0, 1.0, 0.5),
        Classification::SafePoint,
    ));
    let surface = floor();
    let north = vec![sample_at(R, 0.0, 5.0)];

    let mut plain = scanner(north.clone());
    let mut moves: Vec<Vec3> = Vec::new();
    let mut env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
    let best = plain
        .tick(0.0, &agent(), Some(&threat()), &mut env)
        .report()
        .and_then(|r| r.best)
        .expect("candidate");
    assert!(best.hit.is_none(), "safe points don't stop probes when disabled");
    assert!(!best.safe_point);

    let config = ScanConfig {
        weights: ScoreWeights {
            safe_point_bonus: Some(300.0),
            ..ScoreWeights::default()
        },
        ..ScanConfig::default()
    };
    let mut bonus = Scanner::new(config, FixedSampler::new(north)).expect("config");
    let best = bonus
        .tick(0.0, &agent(), Some(&threat()), &mut env)
        .report()
        .and_then(|r| r.best)
        .expect("candidate");
    assert_eq!(best.hit.map(|h| h.class), Some(Classification::SafePoint));
    assert!(best.safe_point);
    assert!(approx(best.raw.z, 4.4));
    let expected = best.projected.distance(threat_eye()) * 2.0 + 300.0;
    assert!(approx(best.score, expected));
}

#[test]
fn trace_lines_follow_probe_outcome() {
    let world = walled_world();
    let surface = floor();
    let mut moves: Vec<Vec3> = Vec::new();
    let mut sink = VecTraceSink::default();
    let mut scanner = scanner(vec![sample_at(R, 5.0, 0.0), sample_at(R, 0.0, 5.0)]);

    let mut env = ScanEnv::new(&world, &surface)
        .with_mover(&mut moves)
        .with_trace(&mut sink);
    scanner.tick(0.0, &agent(), Some(&threat()), &mut env);

    // Wall probe + its marker, clear probe + its marker.
    assert_eq!(sink.count(LineKind::BlockedByWall), 2);
    assert_eq!(sink.count(LineKind::Pullback), 1);
    assert_eq!(sink.count(LineKind::Clear), 2);
    assert_eq!(sink.count(LineKind::Destination), 1);
    assert!(sink.lines.iter().all(|l| l.ttl_seconds == 0.5));
}

#[test]
fn disabled_trace_does_not_change_decisions() {
    let world = cluttered_world();
    let surface = floor();

    let run = |traced: bool| {
        let mut moves: Vec<Vec3> = Vec::new();
        let mut lines = VecTraceSink::default();
        let mut null = NullTraceSink;
        let mut scanner =
            Scanner::new(ScanConfig::default(), RecordingSampler::new(5)).expect("config");
        let env = ScanEnv::new(&world, &surface).with_mover(&mut moves);
        let mut env = if traced {
            env.with_trace(&mut lines)
        } else {
            env.with_trace(&mut null)
        };
        let outcome = scanner.tick(0.0, &agent(), Some(&threat()), &mut env);
        drop(env);
        (outcome, moves, lines.lines.len())
    };

    let (traced, traced_moves, traced_lines) = run(true);
    let (silent, silent_moves, silent_lines) = run(false);
    assert_eq!(traced, silent);
    assert_eq!(traced_moves, silent_moves);
    assert!(traced_lines > 0);
    assert_eq!(silent_lines, 0);
}
