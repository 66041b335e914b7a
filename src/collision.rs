use rand::Rng;

use crate::constants::*;
use crate::entities::Asteroid;
use crate::types::{Rect, Vector2D};

pub fn circles_collide(
    center_a: Vector2D,
    radius_a: f64,
    center_b: Vector2D,
    radius_b: f64,
) -> bool {
    center_a.distance_to(center_b) < radius_a + radius_b
}

/// Loose rect overlap: both rects shrink toward their centers first so
/// that near misses between small fast sprites do not register.
pub fn rects_collide(a: &Rect, b: &Rect) -> bool {
    a.shrunk(SHOT_COLLIDE_RATIO).overlaps(&b.shrunk(SHOT_COLLIDE_RATIO))
}

/// Circle test when both parties have a radius, loose rect test whenever
/// one of them (a shot) does not.
pub fn hit_test(
    rect_a: &Rect,
    radius_a: Option<f64>,
    rect_b: &Rect,
    radius_b: Option<f64>,
) -> bool {
    match (radius_a, radius_b) {
        (Some(ra), Some(rb)) => {
            circles_collide(rect_a.center, ra, rect_b.center, rb)
        }
        _ => rects_collide(rect_a, rect_b),
    }
}

/// Headings of breakaway fragments relative to the parent's direction of
/// travel. Fragments leave in mirrored pairs; an odd leftover doubles
/// straight back.
pub fn breakaway_angles(count: u32) -> Vec<f64> {
    let unit = if count == 2 {
        180.0 / 2.0
    } else if count % 2 == 0 {
        180.0 / (count - 1) as f64
    } else {
        180.0 / count as f64
    };

    let mut angles = Vec::with_capacity(count as usize);
    for i in 0..count / 2 {
        let step = unit * (i + 1) as f64;
        angles.push(step);
        angles.push(-step);
    }
    if count % 2 == 1 {
        angles.push(180.0);
    }
    angles
}

fn pick_variant(previous: Option<u8>, rng: &mut impl Rng) -> u8 {
    let variant = rng.gen_range(0..ASTEROID_VARIANTS);
    if previous == Some(variant) {
        (variant + 1) % ASTEROID_VARIANTS
    } else {
        variant
    }
}

/// Breaks a hit asteroid into smaller ones, or returns nothing when the
/// asteroid was already at the smallest tier and simply vanishes.
pub fn fragment(parent: &Asteroid, rng: &mut impl Rng) -> Option<Vec<Asteroid>> {
    if parent.state <= 1 {
        return None;
    }

    let count = rng.gen_range(MIN_BREAKAWAY_ASTEROIDS..=MAX_BREAKAWAY_ASTEROIDS);
    let speed = parent.velocity * BREAKAWAY_VELOCITY_SCALE;

    let mut previous_variant = None;
    let children = breakaway_angles(count)
        .into_iter()
        .map(|angle| {
            let variant = pick_variant(previous_variant, rng);
            previous_variant = Some(variant);
            Asteroid::new(
                speed,
                parent.direction.rotate(angle),
                parent.rect.center,
                parent.state - 1,
                parent.spin_rate,
                variant,
            )
        })
        .collect();
    Some(children)
}
