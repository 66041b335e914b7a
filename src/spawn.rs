use rand::Rng;

use crate::config::{AsteroidConfig, Config};
use crate::constants::*;
use crate::entities::{Asteroid, Enemy, EnemyKind};
use crate::types::{lerp, normalize01, PlayArea, Vector2D};

/// Chance of the small (aiming) saucer at score zero; ramps to certainty
/// at the accuracy-saturation score.
const SMALL_ENEMY_BASE_CHANCE: f64 = 0.3;

/// Unit direction with both components at least `min_component` in
/// magnitude, so nothing crawls along a screen edge forever.
pub fn random_direction(min_component: f64, rng: &mut impl Rng) -> Vector2D {
    loop {
        let angle = rng.gen_range(0.0..360.0);
        let direction = Vector2D::new(1.0, 0.0).rotate(angle);
        if direction.x.abs() >= min_component && direction.y.abs() >= min_component {
            return direction;
        }
    }
}

/// Uniform point in the play area, rejecting anything within
/// `min_distance` of `avoid` so a fresh wave never spawns on the ship.
pub fn random_position(
    area: &PlayArea,
    avoid: Option<Vector2D>,
    min_distance: f64,
    rng: &mut impl Rng,
) -> Vector2D {
    loop {
        let candidate = Vector2D::new(
            rng.gen_range(0.0..area.width),
            rng.gen_range(0.0..area.height),
        );
        match avoid {
            Some(point) if candidate.distance_to(point) < min_distance => continue,
            _ => return candidate,
        }
    }
}

/// Spin rate in deg/s, either direction, never slower than the minimum.
pub fn random_spin(rng: &mut impl Rng) -> f64 {
    let magnitude = rng.gen_range(MIN_ASTEROID_SPIN..=MAX_ASTEROID_SPIN);
    if rng.gen_bool(0.5) { magnitude } else { -magnitude }
}

/// How many asteroids a level opens with.
pub fn wave_size(level: u32) -> u32 {
    (level + LEVEL_ASTEROIDS_OFFSET).min(MAX_NEW_ASTEROIDS)
}

/// Full-size asteroids for the start of `level`, placed away from
/// `avoid` (the ship, when it is alive).
pub fn spawn_wave(
    level: u32,
    config: &AsteroidConfig,
    area: &PlayArea,
    avoid: Option<Vector2D>,
    rng: &mut impl Rng,
) -> Vec<Asteroid> {
    (0..wave_size(level))
        .map(|_| {
            Asteroid::new(
                rng.gen_range(config.min_speed..=config.max_speed),
                random_direction(config.min_direction_angle, rng),
                random_position(area, avoid, config.min_spawn_distance, rng),
                3,
                random_spin(rng),
                rng.gen_range(0..ASTEROID_VARIANTS),
            )
        })
        .collect()
}

pub fn pick_enemy_kind(score: u32, max_score: u32, rng: &mut impl Rng) -> EnemyKind {
    let t = normalize01(score as f64, 0.0, max_score as f64);
    let small_chance = lerp(SMALL_ENEMY_BASE_CHANCE, 1.0, t);
    if rng.gen_bool(small_chance) {
        EnemyKind::Small
    } else {
        EnemyKind::Big
    }
}

/// Saucers are sampled like asteroids and then pushed onto a random
/// screen edge; resampled when the snap lands back inside the ship's
/// exclusion zone.
fn random_edge_position(
    config: &Config,
    area: &PlayArea,
    avoid: Option<Vector2D>,
    rng: &mut impl Rng,
) -> Vector2D {
    let min_distance = config.asteroid.min_spawn_distance;
    loop {
        let mut candidate = random_position(area, avoid, min_distance, rng);
        match rng.gen_range(0..4) {
            0 => candidate.y = 0.0,
            1 => candidate.y = area.height,
            2 => candidate.x = 0.0,
            _ => candidate.x = area.width,
        }
        match avoid {
            Some(point) if candidate.distance_to(point) < min_distance => {
                continue;
            }
            _ => return candidate,
        }
    }
}

pub fn spawn_enemy(
    config: &Config,
    score: u32,
    area: &PlayArea,
    avoid: Option<Vector2D>,
    rng: &mut impl Rng,
) -> Enemy {
    let kind = pick_enemy_kind(score, config.enemy.max_score, rng);
    let position = random_edge_position(config, area, avoid, rng);
    let initial_direction =
        random_direction(config.asteroid.min_direction_angle, rng);
    let speed = rng.gen_range(config.enemy.min_speed..=config.enemy.max_speed);
    Enemy::new(&config.enemy, position, initial_direction, speed, kind, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const AREA: PlayArea = PlayArea { width: 1280.0, height: 720.0 };

    #[test]
    fn directions_avoid_near_axis_headings() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let d = random_direction(0.3, &mut rng);
            assert!(d.x.abs() >= 0.3);
            assert!(d.y.abs() >= 0.3);
            assert!((d.magnitude() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn positions_respect_exclusion_zone() {
        let mut rng = StdRng::seed_from_u64(42);
        let avoid = AREA.center();
        for _ in 0..200 {
            let p = random_position(&AREA, Some(avoid), 100.0, &mut rng);
            assert!(p.distance_to(avoid) >= 100.0);
        }
    }

    #[test]
    fn spin_never_slower_than_minimum() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let spin = random_spin(&mut rng);
            assert!(spin.abs() >= MIN_ASTEROID_SPIN);
            assert!(spin.abs() <= MAX_ASTEROID_SPIN);
        }
    }

    #[test]
    fn wave_size_grows_then_caps() {
        assert_eq!(wave_size(1), 4);
        assert_eq!(wave_size(5), 8);
        assert_eq!(wave_size(9), 12);
        assert_eq!(wave_size(50), MAX_NEW_ASTEROIDS);
    }

    #[test]
    fn wave_spawns_full_size_asteroids() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = AsteroidConfig::default();
        let wave = spawn_wave(1, &config, &AREA, Some(AREA.center()), &mut rng);
        assert_eq!(wave.len(), 4);
        for asteroid in &wave {
            assert_eq!(asteroid.state, 3);
            assert!(asteroid.velocity >= config.min_speed);
            assert!(asteroid.velocity <= config.max_speed);
        }
    }

    #[test]
    fn high_score_always_sends_the_small_saucer() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(
                pick_enemy_kind(40_000, 40_000, &mut rng),
                EnemyKind::Small
            );
        }
    }

    #[test]
    fn enemies_spawn_on_an_edge() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = Config::default();
        for _ in 0..20 {
            let enemy = spawn_enemy(&config, 0, &AREA, None, &mut rng);
            let c = enemy.rect.center;
            let on_edge = c.x == 0.0
                || c.x == AREA.width
                || c.y == 0.0
                || c.y == AREA.height;
            assert!(on_edge);
        }
    }

    #[test]
    fn enemies_keep_their_distance_from_the_ship() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = Config::default();
        // ship parked right on an edge, where saucers arrive
        let ship = Vector2D::new(0.0, 360.0);
        for _ in 0..100 {
            let enemy = spawn_enemy(&config, 0, &AREA, Some(ship), &mut rng);
            assert!(
                enemy.rect.center.distance_to(ship)
                    >= config.asteroid.min_spawn_distance
            );
        }
    }

    #[test]
    fn enemy_headings_avoid_near_axis_directions() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = Config::default();
        for _ in 0..50 {
            let enemy = spawn_enemy(&config, 0, &AREA, None, &mut rng);
            let d = enemy.facing_direction;
            assert!(d.x.abs() >= config.asteroid.min_direction_angle);
            assert!(d.y.abs() >= config.asteroid.min_direction_angle);
        }
    }
}
