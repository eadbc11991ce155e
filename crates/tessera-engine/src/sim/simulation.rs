use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::coords::Vec2;

use super::{Containment, Entity, SimConfig, World};

/// Advances one entity by one tick.
///
/// The position moves by the full velocity first; the boundary test runs
/// afterwards and only flips velocity signs. Under [`Containment::Reflect`]
/// the position is never corrected, so an entity can end a tick outside the
/// world by at most one step and comes back on the next one.
#[inline]
pub fn step(entity: &mut Entity, size: Vec2, world: World, containment: Containment) {
    entity.position += entity.velocity;

    let p = entity.position;
    if p.x < 0.0 {
        entity.velocity.x = -entity.velocity.x;
    }
    if p.x + size.x > world.width {
        entity.velocity.x = -entity.velocity.x;
    }
    if p.y < 0.0 {
        entity.velocity.y = -entity.velocity.y;
    }
    if p.y + size.y > world.height {
        entity.velocity.y = -entity.velocity.y;
    }

    if containment == Containment::Strict {
        let max_x = (world.width - size.x).max(0.0);
        let max_y = (world.height - size.y).max(0.0);
        entity.position.x = entity.position.x.clamp(0.0, max_x);
        entity.position.y = entity.position.y.clamp(0.0, max_y);
    }
}

/// Advances every entity by one tick, in storage order.
pub fn tick(entities: &mut [Entity], size: Vec2, world: World, containment: Containment) {
    for entity in entities {
        step(entity, size, world, containment);
    }
}

/// Owns the fixed entity population and its parameters.
#[derive(Debug, Clone)]
pub struct Simulation {
    entities: Vec<Entity>,
    world: World,
    size: Vec2,
    containment: Containment,
    max_speed: f32,
    ticks: u64,
}

impl Simulation {
    /// Creates the population with randomized in-bounds positions and
    /// integer velocities drawn from `config.velocity`.
    pub fn new(config: &SimConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let max_x = (config.world.width - config.entity_size.x).max(0.0);
        let max_y = (config.world.height - config.entity_size.y).max(0.0);
        let (vmin, vmax) = (config.velocity.min(), config.velocity.max());

        let entities = (0..config.entity_count)
            .map(|_| {
                let position = Vec2::new(
                    sample_unit_range(&mut rng, max_x),
                    sample_unit_range(&mut rng, max_y),
                );
                let velocity = Vec2::new(
                    rng.gen_range(vmin..=vmax) as f32,
                    rng.gen_range(vmin..=vmax) as f32,
                );
                Entity::new(position, velocity)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "simulation initialized: {} entities, world {}x{}, seed {:?}",
            entities.len(),
            config.world.width,
            config.world.height,
            config.seed
        );

        Self {
            entities,
            world: config.world,
            size: config.entity_size,
            containment: config.containment,
            max_speed: config.velocity.max_magnitude(),
            ticks: 0,
        }
    }

    /// Wraps an explicit population. The maximum speed is derived from it.
    pub fn from_entities(
        entities: Vec<Entity>,
        world: World,
        size: Vec2,
        containment: Containment,
    ) -> Self {
        let max_speed = entities
            .iter()
            .map(|e| e.velocity.x.abs().max(e.velocity.y.abs()))
            .fold(0.0_f32, f32::max);
        Self {
            entities,
            world,
            size,
            containment,
            max_speed,
            ticks: 0,
        }
    }

    pub fn tick(&mut self) {
        tick(&mut self.entities, self.size, self.world, self.containment);
        self.ticks += 1;
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_size(&self) -> Vec2 {
        self.size
    }

    pub fn world(&self) -> World {
        self.world
    }

    /// Largest per-tick displacement along one axis; bounds the overshoot.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn sample_unit_range(rng: &mut StdRng, max: f32) -> f32 {
    if max > 0.0 { rng.gen_range(0.0..=max) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::VelocityRange;

    const SIZE: Vec2 = Vec2::new(32.0, 32.0);

    fn seeded(seed: u64) -> SimConfig {
        SimConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn single(position: Vec2, velocity: Vec2) -> Simulation {
        Simulation::from_entities(
            vec![Entity::new(position, velocity)],
            World::default(),
            SIZE,
            Containment::Reflect,
        )
    }

    // ── initialization ────────────────────────────────────────────────────

    #[test]
    fn initial_population_is_in_bounds() {
        let sim = Simulation::new(&seeded(7));
        let world = sim.world();
        assert_eq!(sim.entities().len(), 256);
        for e in sim.entities() {
            assert!(e.position.x >= 0.0 && e.position.x + SIZE.x <= world.width);
            assert!(e.position.y >= 0.0 && e.position.y + SIZE.y <= world.height);
        }
    }

    #[test]
    fn initial_velocities_are_integers_in_default_range() {
        let sim = Simulation::new(&seeded(11));
        for e in sim.entities() {
            for v in [e.velocity.x, e.velocity.y] {
                assert_eq!(v.fract(), 0.0);
                assert!((-2.0..=5.0).contains(&v), "velocity {v} out of range");
            }
        }
    }

    #[test]
    fn default_velocity_range_is_biased_positive() {
        // [-2, 5] is deliberately asymmetric.
        let sim = Simulation::new(&seeded(3));
        let mean: f32 = sim.entities().iter().map(|e| e.velocity.x).sum::<f32>()
            / sim.entities().len() as f32;
        assert!(mean > 0.5, "mean x velocity {mean}");
    }

    #[test]
    fn symmetric_range_is_available_and_centred() {
        let cfg = SimConfig {
            velocity: VelocityRange::symmetric(3),
            entity_count: 4096,
            ..seeded(3)
        };
        let sim = Simulation::new(&cfg);
        let mean: f32 = sim.entities().iter().map(|e| e.velocity.x).sum::<f32>()
            / sim.entities().len() as f32;
        assert!(mean.abs() < 0.25, "mean x velocity {mean}");
    }

    #[test]
    fn entity_larger_than_world_starts_at_origin() {
        let cfg = SimConfig {
            world: World::new(16.0, 16.0),
            entity_count: 3,
            ..seeded(1)
        };
        let sim = Simulation::new(&cfg);
        assert!(sim.entities().iter().all(|e| e.position == Vec2::zero()));
    }

    // ── stepping ──────────────────────────────────────────────────────────

    #[test]
    fn position_advances_by_exact_velocity() {
        let mut sim = Simulation::new(&seeded(5));
        for _ in 0..500 {
            let before = sim.entities().to_vec();
            sim.tick();
            for (prev, next) in before.iter().zip(sim.entities()) {
                assert_eq!(next.position, prev.position + prev.velocity);
            }
        }
    }

    #[test]
    fn left_wall_overshoot_then_return() {
        let mut sim = single(Vec2::new(0.0, 100.0), Vec2::new(-3.0, 0.0));

        sim.tick();
        let e = sim.entities()[0];
        assert_eq!(e.position, Vec2::new(-3.0, 100.0));
        assert_eq!(e.velocity, Vec2::new(3.0, 0.0));

        sim.tick();
        let e = sim.entities()[0];
        assert_eq!(e.position, Vec2::new(0.0, 100.0));
        assert_eq!(e.velocity, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn velocity_flips_once_per_crossing() {
        let mut sim = single(Vec2::new(1.0, 10.0), Vec2::new(-2.0, 0.0));
        let mut flips = 0;
        let mut last = sim.entities()[0].velocity.x;
        for _ in 0..10 {
            sim.tick();
            let v = sim.entities()[0].velocity.x;
            if v != last {
                flips += 1;
            }
            last = v;
        }
        assert_eq!(flips, 1);
        assert_eq!(last, 2.0);
    }

    #[test]
    fn right_and_bottom_edges_reflect() {
        let world = World::default();
        let start = Vec2::new(world.width - SIZE.x - 1.0, world.height - SIZE.y - 1.0);
        let mut sim = single(start, Vec2::new(4.0, 4.0));
        sim.tick();
        let e = sim.entities()[0];
        assert_eq!(e.position, start + Vec2::new(4.0, 4.0));
        assert_eq!(e.velocity, Vec2::new(-4.0, -4.0));
    }

    #[test]
    fn entities_do_not_interact() {
        let cfg = seeded(21);
        let mut together = Simulation::new(&cfg);
        let mut apart: Vec<Entity> = together.entities().to_vec();

        for _ in 0..200 {
            together.tick();
            for e in apart.iter_mut() {
                step(e, SIZE, cfg.world, cfg.containment);
            }
        }
        assert_eq!(together.entities(), apart.as_slice());
    }

    // ── determinism & bounds ──────────────────────────────────────────────

    fn bits(sim: &Simulation) -> Vec<[u32; 4]> {
        sim.entities()
            .iter()
            .map(|e| {
                let [px, py] = e.position.to_bits();
                let [vx, vy] = e.velocity.to_bits();
                [px, py, vx, vy]
            })
            .collect()
    }

    #[test]
    fn same_seed_same_state_after_many_ticks() {
        let mut a = Simulation::new(&seeded(42));
        let mut b = Simulation::new(&seeded(42));
        for _ in 0..1000 {
            a.tick();
            b.tick();
        }
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.ticks(), 1000);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = Simulation::new(&seeded(1));
        let b = Simulation::new(&seeded(2));
        assert_ne!(bits(&a), bits(&b));
    }

    #[test]
    fn overshoot_is_bounded_by_one_step() {
        let mut sim = Simulation::new(&seeded(1234));
        let world = sim.world();
        let over = sim.max_speed();
        assert_eq!(over, 5.0);

        for _ in 0..1000 {
            sim.tick();
            for e in sim.entities() {
                let p = e.position;
                assert!(p.x >= -over && p.x <= world.width, "x = {}", p.x);
                assert!(p.y >= -over && p.y <= world.height, "y = {}", p.y);
                assert!(p.x + SIZE.x <= world.width + over);
                assert!(p.y + SIZE.y <= world.height + over);
            }
        }
    }

    #[test]
    fn strict_containment_never_leaves_world() {
        let cfg = SimConfig {
            containment: Containment::Strict,
            ..seeded(99)
        };
        let mut sim = Simulation::new(&cfg);
        for _ in 0..1000 {
            sim.tick();
            for e in sim.entities() {
                assert!(e.position.x >= 0.0 && e.position.x + SIZE.x <= cfg.world.width);
                assert!(e.position.y >= 0.0 && e.position.y + SIZE.y <= cfg.world.height);
            }
        }
    }
}
