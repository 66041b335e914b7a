// --- Game Constants ---
// Tunables live in config.json (see config.rs); these are the compiled-in
// defaults plus the values that are not meant to be user-adjustable.

pub const PLAY_AREA_WIDTH: f64 = 1280.0;
pub const PLAY_AREA_HEIGHT: f64 = 720.0;

pub const BASE_SCORE: u32 = 150;
pub const STARTING_LIVES: u32 = 3;
pub const EXTRA_LIFE_TARGET: u32 = 10_000;

pub const LEVEL_ASTEROIDS_OFFSET: u32 = 3;
pub const MAX_NEW_ASTEROIDS: u32 = 12;
pub const LEVEL_START_DELAY_MS: u64 = 500;
pub const LEVEL_TRANSITION_DELAY_MS: u64 = 3000;
pub const LEVEL_TRANSITION_FLASH_SECS: f64 = 3.0;

pub const BREAKAWAY_VELOCITY_SCALE: f64 = 1.2;
pub const MIN_BREAKAWAY_ASTEROIDS: u32 = 2;
pub const MAX_BREAKAWAY_ASTEROIDS: u32 = 3;
pub const ASTEROID_VARIANTS: u8 = 3;
pub const MIN_ASTEROID_SPIN: f64 = 100.0; // deg/s magnitude
pub const MAX_ASTEROID_SPIN: f64 = 200.0;

// Loose rect mode for fast-moving small sprites (shots).
pub const SHOT_COLLIDE_RATIO: f64 = 0.75;

pub const RESPAWN_DELAY_MS: u64 = 2000;
pub const RESPAWN_FLASH_SECS: f64 = 3.0;
pub const FLASH_SPEED: f64 = 9.0;

pub const HYPERSPACE_LENGTH_SECS: f64 = 1.0;
pub const HYPERSPACE_MIN_SURVIVAL: f64 = 0.75;
pub const HYPERSPACE_MAX_SURVIVAL: f64 = 0.98;
pub const HYPERSPACE_ASTEROID_MIN: f64 = 1.0;
pub const HYPERSPACE_ASTEROID_MAX: f64 = 60.0;

pub const SHIP_SIZE: f64 = 40.0;
pub const SHOT_SIZE: f64 = 8.0;
pub const SHIP_REMAINS_LIFESPAN_SECS: f64 = 2.5;

// Game-over screen waits this long before the menu replaces the scoreboard.
pub const END_MENU_DELAY_MS: u64 = 1000;

pub const FRAME_TIME_MS: u64 = 16;
pub const MAX_DELTA_TIME: f64 = 0.1;
