//! Simulation world and per-tick sequencing
//!
//! Owns every body, the arena and the optional target. One `tick` runs motion,
//! walls and collisions in that order and reports what the host should draw
//! and play.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::ArenaBounds;
use super::body::{Body, BodySnapshot, SpeedRange};
use super::boundary::{self, BoundaryReflector};
use super::collision::{CollisionEvent, CollisionResolver};
use super::motion::{self, MotionMode};
use super::placement::PlacementGenerator;
use crate::error::{SimError, SimResult};
use crate::settings::{SimConfig, Variant};

/// Lifecycle of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldPhase {
    /// Built, not ticked yet
    Idle,
    /// Ticking
    Running,
    /// Fresh population placed, waiting for the next tick
    Reset,
}

/// Output of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub bodies: Vec<BodySnapshot>,
    pub collisions: Vec<CollisionEvent>,
}

#[derive(Debug, Clone)]
pub struct World {
    variant: Variant,
    arena: ArenaBounds,
    speeds: SpeedRange,
    placement: PlacementGenerator,
    reflector: BoundaryReflector,
    resolver: CollisionResolver,
    rng: Pcg32,
    seed: u64,
    bodies: Vec<Body>,
    target: Option<DVec2>,
    phase: WorldPhase,
    /// Bumped on every spawn/reset
    generation: u32,
    tick_count: u64,
}

impl World {
    /// Bounce-variant world with the given population
    pub fn new(
        arena: ArenaBounds,
        body_count: usize,
        radius: f64,
        placement_buffer: f64,
        speed_range: SpeedRange,
        rng_seed: u64,
    ) -> SimResult<Self> {
        Self::from_config(&SimConfig {
            variant: Variant::Bounce,
            arena,
            body_count,
            radius,
            placement_buffer,
            edge_margin: None,
            speed_range,
            seed: rng_seed,
            ..SimConfig::default()
        })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        let placement = config.placement()?;
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let bodies = placement.spawn(config.body_count, &config.arena, &config.speed_range, &mut rng)?;

        log::info!(
            "{} world {}x{} with {} bodies (radius {}, seed {})",
            config.variant.as_str(),
            config.arena.width,
            config.arena.height,
            bodies.len(),
            config.radius,
            config.seed
        );

        Ok(Self {
            variant: config.variant,
            arena: config.arena,
            speeds: config.speed_range,
            placement,
            reflector: BoundaryReflector::new(config.corner_policy),
            resolver: CollisionResolver::default(),
            rng,
            seed: config.seed,
            bodies,
            target: None,
            phase: WorldPhase::Idle,
            generation: 0,
            tick_count: 0,
        })
    }

    /// Replace the population with `count` freshly placed bodies.
    ///
    /// On failure the current population is kept.
    pub fn spawn(&mut self, count: usize) -> SimResult<()> {
        let bodies = self
            .placement
            .spawn(count, &self.arena, &self.speeds, &mut self.rng)?;
        self.bodies = bodies;
        self.generation += 1;
        self.phase = WorldPhase::Reset;
        log::info!("Spawned {} bodies (generation {})", count, self.generation);
        Ok(())
    }

    /// Fresh placement with the same body count
    pub fn reset(&mut self) -> SimResult<()> {
        self.spawn(self.bodies.len())
    }

    pub fn set_target(&mut self, point: DVec2) {
        log::debug!("Target set to ({:.1}, {:.1})", point.x, point.y);
        self.target = Some(point);
    }

    pub fn clear_target(&mut self) {
        log::debug!("Target cleared");
        self.target = None;
    }

    /// Motion policy for the next tick
    pub fn motion_mode(&self) -> MotionMode {
        match (self.target, self.variant) {
            (Some(target), _) => MotionMode::Seek(target),
            (None, Variant::Bounce) => MotionMode::FreeFlight,
            (None, Variant::Homing) => MotionMode::ReturnHome,
        }
    }

    /// Advance the simulation by `dt` (same time unit as the speeds).
    ///
    /// Bodies a jammed crowd leaves overlapping stay where they were at the
    /// start of the tick, so every tick ends overlap-free.
    pub fn tick(&mut self, dt: f64) -> SimResult<TickResult> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::invalid(format!("dt must be positive, got {dt}")));
        }

        self.phase = WorldPhase::Running;
        self.tick_count += 1;

        let mode = self.motion_mode();
        let previous: Vec<DVec2> = self.bodies.iter().map(|b| b.position).collect();
        for body in &mut self.bodies {
            body.position = motion::integrate(body, mode, &self.speeds, dt);
            if mode.is_homing() {
                boundary::contain(body, &self.arena);
            } else {
                self.reflector.apply(body, &self.arena);
            }
        }

        let collisions = self.resolver.resolve(&mut self.bodies, Some(&self.arena));
        self.resolver.settle(&mut self.bodies, &previous);
        log::trace!(
            "Tick {}: {:?}, {} collisions",
            self.tick_count,
            mode,
            collisions.len()
        );

        Ok(TickResult {
            bodies: self.snapshot(),
            collisions,
        })
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies.iter().map(Body::snapshot).collect()
    }

    /// First body whose disc contains `point`
    pub fn body_at(&self, point: DVec2) -> Option<&Body> {
        self.bodies.iter().find(|b| b.hit_test(point))
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn target(&self) -> Option<DVec2> {
        self.target
    }

    pub fn arena(&self) -> &ArenaBounds {
        &self.arena
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT_MS;
    use crate::sim::body::BodyId;
    use proptest::prelude::*;

    fn arena() -> ArenaBounds {
        ArenaBounds::new(400.0, 400.0).unwrap()
    }

    fn bounce_world(count: usize, seed: u64) -> World {
        World::new(arena(), count, 10.0, 2.0, SpeedRange::new(0.1, 0.7).unwrap(), seed).unwrap()
    }

    fn assert_contained(world: &World) {
        for body in world.bodies() {
            assert!(
                world.arena().contains(body.position, body.radius, 1e-9),
                "body {} escaped: {:?}",
                body.id,
                body.position
            );
        }
    }

    fn assert_invariants(world: &World) {
        assert_contained(world);
        let bodies = world.bodies();
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let gap = a.position.distance(b.position) - (a.radius + b.radius);
                assert!(gap >= -1e-6, "bodies {} and {} overlap by {}", a.id, b.id, -gap);
            }
        }
    }

    #[test]
    fn test_new_world_is_idle() {
        let world = bounce_world(5, 1);
        assert_eq!(world.phase(), WorldPhase::Idle);
        assert_eq!(world.body_count(), 5);
        assert_eq!(world.generation(), 0);
        assert_eq!(world.tick_count(), 0);
        assert_eq!(world.motion_mode(), MotionMode::FreeFlight);
        let ids: Vec<_> = world.bodies().iter().map(|b| b.id).collect();
        assert_eq!(ids, (0..5).map(BodyId).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_construction() {
        let speeds = SpeedRange { min: 0.1, max: 0.7 };
        assert!(matches!(
            World::new(arena(), 3, 0.0, 1.0, speeds, 1),
            Err(SimError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            World::new(arena(), 3, 5.0, 1.0, SpeedRange { min: 0.7, max: 0.1 }, 1),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_placement_infeasible_on_construction() {
        let crowded = ArenaBounds::new(100.0, 100.0).unwrap();
        let speeds = SpeedRange::new(0.1, 0.7).unwrap();
        let result = World::from_config(&SimConfig {
            arena: crowded,
            body_count: 40,
            radius: 10.0,
            placement_buffer: 1.0,
            edge_margin: None,
            speed_range: speeds,
            max_placement_attempts: 100,
            ..SimConfig::default()
        });
        assert!(matches!(result, Err(SimError::PlacementInfeasible { requested: 40, .. })));
    }

    #[test]
    fn test_tick_rejects_bad_dt() {
        let mut world = bounce_world(3, 2);
        assert!(matches!(world.tick(0.0), Err(SimError::InvalidConfiguration(_))));
        assert!(world.tick(-1.0).is_err());
        assert!(world.tick(f64::NAN).is_err());
        assert_eq!(world.phase(), WorldPhase::Idle);
        assert_eq!(world.tick_count(), 0);
    }

    #[test]
    fn test_phase_transitions() {
        let mut world = bounce_world(4, 3);
        world.tick(FRAME_DT_MS).unwrap();
        assert_eq!(world.phase(), WorldPhase::Running);

        world.reset().unwrap();
        assert_eq!(world.phase(), WorldPhase::Reset);
        assert_eq!(world.generation(), 1);
        assert_eq!(world.body_count(), 4);

        world.tick(FRAME_DT_MS).unwrap();
        assert_eq!(world.phase(), WorldPhase::Running);
        assert_eq!(world.tick_count(), 2);
    }

    #[test]
    fn test_reset_replaces_population() {
        let mut world = bounce_world(6, 4);
        let before: Vec<_> = world.bodies().iter().map(|b| b.position).collect();
        world.reset().unwrap();
        let after: Vec<_> = world.bodies().iter().map(|b| b.position).collect();
        assert_eq!(after.len(), 6);
        assert_ne!(before, after);
        let ids: Vec<_> = world.bodies().iter().map(|b| b.id).collect();
        assert_eq!(ids, (0..6).map(BodyId).collect::<Vec<_>>());
    }

    #[test]
    fn test_failed_spawn_keeps_population() {
        let mut world = World::from_config(&SimConfig {
            arena: arena(),
            body_count: 3,
            radius: 10.0,
            placement_buffer: 2.0,
            edge_margin: None,
            max_placement_attempts: 200,
            ..SimConfig::default()
        })
        .unwrap();
        let before = world.snapshot();
        let err = world.spawn(2_000).unwrap_err();
        assert!(matches!(err, SimError::PlacementInfeasible { .. }));
        assert_eq!(world.snapshot(), before);
        assert_eq!(world.generation(), 0);
    }

    #[test]
    fn test_spawn_changes_count() {
        let mut world = bounce_world(3, 6);
        world.spawn(7).unwrap();
        assert_eq!(world.body_count(), 7);
        world.reset().unwrap();
        assert_eq!(world.body_count(), 7);
    }

    #[test]
    fn test_free_flight_speed_is_conserved() {
        let mut world = bounce_world(1, 7);
        let speed = world.bodies()[0].speed();
        for _ in 0..2_000 {
            let result = world.tick(FRAME_DT_MS).unwrap();
            assert!(result.collisions.is_empty());
            assert!((world.bodies()[0].speed() - speed).abs() < 1e-12);
        }
        assert_invariants(&world);
    }

    #[test]
    fn test_wall_scenario() {
        let mut world = bounce_world(1, 8);
        world.bodies[0].position = DVec2::new(90.0, 50.0);
        world.bodies[0].velocity = DVec2::new(10.0, 0.0);
        world.bodies[0].radius = 5.0;
        let arena = ArenaBounds::new(100.0, 100.0).unwrap();
        world.arena = arena;

        let result = world.tick(1.0).unwrap();
        assert_eq!(result.bodies[0].position, DVec2::new(95.0, 50.0));
        assert_eq!(world.bodies()[0].direction(), DVec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_collision_scenario_through_tick() {
        let mut world = bounce_world(2, 9);
        world.bodies[0].position = DVec2::new(100.0, 100.0);
        world.bodies[0].velocity = DVec2::new(1.0, 0.0);
        world.bodies[0].radius = 5.0;
        world.bodies[1].position = DVec2::new(107.0, 100.0);
        world.bodies[1].velocity = DVec2::new(-1.0, 0.0);
        world.bodies[1].radius = 5.0;

        // dt small enough that motion keeps them overlapping
        let result = world.tick(0.5).unwrap();
        assert_eq!(result.collisions, vec![CollisionEvent::new(BodyId(0), BodyId(1))]);
        let d = result.bodies[0].position.distance(result.bodies[1].position);
        assert!((d - 10.0).abs() < 1e-9);
        assert!((world.bodies()[0].velocity - DVec2::new(-1.0, 0.0)).length() < 1e-12);
        assert!((world.bodies()[1].velocity - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_seek_target_converges_exactly() {
        let mut world = bounce_world(1, 10);
        let target = DVec2::new(200.0, 200.0);
        world.set_target(target);
        assert_eq!(world.motion_mode(), MotionMode::Seek(target));

        let mut last = world.bodies()[0].position.distance(target);
        let mut arrived = false;
        for _ in 0..10_000 {
            world.tick(FRAME_DT_MS).unwrap();
            let d = world.bodies()[0].position.distance(target);
            assert!(d <= last);
            last = d;
            if world.bodies()[0].position == target {
                arrived = true;
                break;
            }
        }
        assert!(arrived);

        // Stays put while the target is held
        world.tick(FRAME_DT_MS).unwrap();
        assert_eq!(world.bodies()[0].position, target);

        world.clear_target();
        assert_eq!(world.motion_mode(), MotionMode::FreeFlight);
        world.tick(FRAME_DT_MS).unwrap();
        assert_ne!(world.bodies()[0].position, target);
    }

    #[test]
    fn test_homing_variant_returns_home() {
        let config = SimConfig {
            arena: arena(),
            body_count: 1,
            radius: 10.0,
            placement_buffer: 2.0,
            edge_margin: None,
            ..SimConfig::from_variant(Variant::Homing)
        };
        let mut world = World::from_config(&config).unwrap();
        world.bodies[0].velocity = DVec2::new(1.0, 0.0);
        let home = world.bodies()[0].home_position;
        assert_eq!(world.motion_mode(), MotionMode::ReturnHome);

        world.set_target(DVec2::new(20.0, 380.0));
        for _ in 0..20 {
            world.tick(FRAME_DT_MS).unwrap();
        }
        assert_ne!(world.bodies()[0].position, home);

        world.clear_target();
        assert_eq!(world.motion_mode(), MotionMode::ReturnHome);
        let mut last = world.bodies()[0].position.distance(home);
        for _ in 0..1_000 {
            world.tick(FRAME_DT_MS).unwrap();
            let d = world.bodies()[0].position.distance(home);
            assert!(d <= last);
            last = d;
        }
        assert_eq!(world.bodies()[0].position, home);
        // Homing leaves the stored velocity alone
        assert_eq!(world.bodies()[0].velocity, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_target_outside_arena_is_contained() {
        let mut world = bounce_world(3, 11);
        world.set_target(DVec2::new(-500.0, 1_000.0));
        for _ in 0..500 {
            world.tick(FRAME_DT_MS).unwrap();
            assert_contained(&world);
        }
    }

    #[test]
    fn test_body_at() {
        let world = bounce_world(3, 12);
        let body = &world.bodies()[1];
        let found = world.body_at(body.position + DVec2::new(1.0, 1.0)).unwrap();
        assert_eq!(found.id, body.id);
        assert!(world.body_at(DVec2::new(-50.0, -50.0)).is_none());
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = bounce_world(8, 99);
        let mut b = bounce_world(8, 99);
        for frame in 0..600 {
            if frame == 200 {
                a.set_target(DVec2::new(150.0, 250.0));
                b.set_target(DVec2::new(150.0, 250.0));
            }
            if frame == 350 {
                a.clear_target();
                b.clear_target();
            }
            if frame == 450 {
                a.reset().unwrap();
                b.reset().unwrap();
            }
            assert_eq!(a.tick(FRAME_DT_MS).unwrap(), b.tick(FRAME_DT_MS).unwrap());
        }
    }

    fn crowd(variant: Variant, count: usize, seed: u64) -> World {
        World::from_config(&SimConfig {
            arena: arena(),
            body_count: count,
            radius: 10.0,
            placement_buffer: 2.0,
            edge_margin: None,
            seed,
            ..SimConfig::from_variant(variant)
        })
        .unwrap()
    }

    fn assert_unique_events(result: &TickResult) {
        let mut pairs: Vec<_> = result.collisions.iter().map(|e| e.pair()).collect();
        let total = pairs.len();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), total);
    }

    #[test]
    fn test_crowded_target_stays_contained() {
        let mut world = bounce_world(10, 13);
        world.set_target(DVec2::new(200.0, 200.0));
        for _ in 0..400 {
            let result = world.tick(FRAME_DT_MS).unwrap();
            assert_unique_events(&result);
            assert_invariants(&world);
        }
    }

    #[test]
    fn test_dense_seek_crowd_never_overlaps() {
        for (variant, count) in [(Variant::Homing, 40), (Variant::Bounce, 30)] {
            let mut world = crowd(variant, count, 21);
            world.set_target(DVec2::new(200.0, 200.0));
            for _ in 0..600 {
                let result = world.tick(FRAME_DT_MS).unwrap();
                assert_unique_events(&result);
                assert_invariants(&world);
            }
        }
    }

    #[test]
    fn test_dense_crowd_returns_home_without_overlap() {
        let mut world = crowd(Variant::Homing, 30, 22);
        world.set_target(DVec2::new(200.0, 200.0));
        for _ in 0..200 {
            world.tick(FRAME_DT_MS).unwrap();
        }
        world.clear_target();
        assert_eq!(world.motion_mode(), MotionMode::ReturnHome);
        for _ in 0..400 {
            world.tick(FRAME_DT_MS).unwrap();
            assert_invariants(&world);
        }
    }

    #[test]
    fn test_bodies_meeting_on_target_are_split() {
        let mut world = crowd(Variant::Homing, 2, 23);
        world.bodies[0].position = DVec2::new(100.0, 200.0);
        world.bodies[1].position = DVec2::new(300.0, 200.0);
        // Both arrive on the target in one tick and are split apart by the resolver
        world.set_target(DVec2::new(200.0, 200.0));
        world.tick(1_000.0).unwrap();
        assert_invariants(&world);
        let d = world.bodies()[0].position.distance(world.bodies()[1].position);
        assert!((d - 20.0).abs() < 1e-9);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_crowds_keep_invariants(
            seed in any::<u64>(),
            count in 25usize..36,
            homing in any::<bool>(),
            tx in 20.0..380.0f64,
            ty in 20.0..380.0f64,
        ) {
            let variant = if homing { Variant::Homing } else { Variant::Bounce };
            let mut world = crowd(variant, count, seed);
            world.set_target(DVec2::new(tx, ty));
            for frame in 0..240 {
                if frame == 160 {
                    world.clear_target();
                }
                let result = world.tick(FRAME_DT_MS).unwrap();
                prop_assert_eq!(result.bodies.len(), count);
                assert_invariants(&world);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_bounce_keeps_invariants(seed in any::<u64>(), count in 2usize..7) {
            let mut world = bounce_world(count, seed);
            for _ in 0..300 {
                let result = world.tick(FRAME_DT_MS).unwrap();
                prop_assert_eq!(result.bodies.len(), count);
                let mut pairs: Vec<_> = result.collisions.iter().map(|e| e.pair()).collect();
                let total = pairs.len();
                pairs.sort();
                pairs.dedup();
                prop_assert_eq!(pairs.len(), total);
                assert_invariants(&world);
            }
        }
    }
}
