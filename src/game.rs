use std::path::PathBuf;

use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{CueSink, SoundCue};
use crate::collision::{fragment, hit_test};
use crate::config::Config;
use crate::constants::*;
use crate::entities::{Asteroid, Enemy, OwnerKind, Ship, ShipRemains, Shot};
use crate::highscores::Highscores;
use crate::input::Action;
use crate::spawn::{spawn_enemy, spawn_wave};
use crate::types::PlayArea;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateId {
    Intro,
    Controls,
    Main,
    End,
}

pub enum Transition {
    Stay,
    To(StateId),
    Quit,
}

/// Score, lives and level for one run. The extra-life bank accumulates
/// alongside the score and rolls over so no points toward the next life
/// are ever lost.
pub struct GameSession {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    extra_life_bank: u32,
}

impl GameSession {
    pub fn new() -> Self {
        GameSession {
            score: 0,
            level: 1,
            lives: STARTING_LIVES,
            extra_life_bank: 0,
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
        self.extra_life_bank += points;
    }

    /// Grants at most one life per call, keeping the remainder banked.
    pub fn extra_life_check(&mut self) -> bool {
        if self.extra_life_bank >= EXTRA_LIFE_TARGET {
            self.extra_life_bank %= EXTRA_LIFE_TARGET;
            self.lives += 1;
            true
        } else {
            false
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

fn asteroid_points(state: u8) -> u32 {
    BASE_SCORE / state as u32
}

/// The playing state proper. Owns every entity and advances the whole
/// simulation one frame per tick.
pub struct MainState {
    pub session: GameSession,
    pub ship: Ship,
    pub remains: Vec<ShipRemains>,
    pub shots: Vec<Shot>,
    pub asteroids: Vec<Asteroid>,
    pub enemies: Vec<Enemy>,

    config: Config,
    area: PlayArea,
    rng: StdRng,
    started: bool,
    wave_spawned: bool,
    respawn_at: Option<u64>,
    next_enemy_at: u64,
    pending_level_start: Option<u64>,
}

impl MainState {
    pub fn new(config: Config, area: PlayArea) -> Self {
        Self::with_rng(config, area, StdRng::from_entropy())
    }

    pub fn with_rng(config: Config, area: PlayArea, rng: StdRng) -> Self {
        let ship = Ship::new(&config.player, area.center());
        MainState {
            session: GameSession::new(),
            ship,
            remains: Vec::new(),
            shots: Vec::new(),
            asteroids: Vec::new(),
            enemies: Vec::new(),
            config,
            area,
            rng,
            started: false,
            wave_spawned: false,
            respawn_at: None,
            next_enemy_at: 0,
            pending_level_start: None,
        }
    }

    pub fn tick(
        &mut self,
        now_ms: u64,
        delta_time: f64,
        actions: &[Action],
        sink: &mut dyn CueSink,
    ) -> Transition {
        if !self.started {
            self.started = true;
            self.pending_level_start = Some(now_ms + LEVEL_START_DELAY_MS);
            self.next_enemy_at = now_ms + self.config.enemy.spawn_interval_ms;
        }

        if let Some(transition) = self.handle_actions(now_ms, actions, sink) {
            return transition;
        }

        self.update_entities(now_ms, delta_time, sink);
        self.resolve_collisions(now_ms, sink);

        if let Some(at) = self.respawn_at {
            if now_ms >= at && !self.ship.alive && self.session.lives > 0 {
                self.ship.respawn(self.area.center());
                self.respawn_at = None;
            }
        }

        if now_ms >= self.next_enemy_at && self.wave_spawned {
            let avoid = self.ship.alive.then_some(self.ship.rect.center);
            let enemy = spawn_enemy(
                &self.config,
                self.session.score,
                &self.area,
                avoid,
                &mut self.rng,
            );
            info!("saucer {:?} enters at level {}", enemy.kind, self.session.level);
            self.enemies.push(enemy);
            self.next_enemy_at = now_ms + self.config.enemy.spawn_interval_ms;
        }

        self.advance_level(now_ms);

        if self.session.extra_life_check() {
            info!("extra life at score {}", self.session.score);
        }

        if !self.ship.alive && self.session.lives == 0 {
            return Transition::To(StateId::End);
        }
        Transition::Stay
    }

    fn handle_actions(
        &mut self,
        now_ms: u64,
        actions: &[Action],
        sink: &mut dyn CueSink,
    ) -> Option<Transition> {
        for action in actions {
            match action {
                Action::Quit => return Some(Transition::Quit),
                Action::Cancel => return Some(Transition::To(StateId::Intro)),
                _ if !self.ship.has_control() => {}
                Action::EngineOn => self.ship.engine_on(sink),
                Action::EngineOff => self.ship.engine_off(),
                Action::TurnLeft => self.ship.turn(1.0),
                Action::TurnRight => self.ship.turn(-1.0),
                Action::Fire => {
                    if let Some(shot) = self.ship.fire(now_ms, sink) {
                        self.shots.push(shot);
                    }
                }
                Action::Hyperspace => {
                    self.ship.hyperspace(
                        self.asteroids.len(),
                        &self.area,
                        &mut self.rng,
                        sink,
                    );
                    if !self.ship.remains_alive {
                        self.kill_ship(now_ms, sink);
                    }
                }
                Action::Confirm | Action::NavUp | Action::NavDown => {}
            }
        }
        None
    }

    fn update_entities(&mut self, now_ms: u64, delta_time: f64, sink: &mut dyn CueSink) {
        if self.ship.alive {
            self.ship.update(delta_time, &self.area);
        }

        for remains in &mut self.remains {
            remains.update(delta_time, &self.area);
        }
        self.remains.retain(|r| !r.expired());

        for shot in &mut self.shots {
            shot.update(delta_time, &self.area);
        }
        self.shots.retain(|s| !s.expired());

        for asteroid in &mut self.asteroids {
            asteroid.update(delta_time, &self.area);
        }

        let target = if self.ship.alive && self.ship.vulnerable() {
            Some(self.ship.rect.center)
        } else {
            None
        };
        for enemy in &mut self.enemies {
            enemy.update(
                delta_time,
                self.session.score,
                target,
                &self.area,
                &mut self.rng,
            );
            // saucers hold fire while there is no ship to shoot at
            if target.is_some() {
                if let Some(shot) = enemy.fire(now_ms, sink) {
                    self.shots.push(shot);
                }
            }
        }
    }

    fn resolve_collisions(&mut self, now_ms: u64, sink: &mut dyn CueSink) {
        self.resolve_ship_hits(now_ms, sink);
        self.resolve_enemy_hits(now_ms, sink);
        self.resolve_asteroid_hits(sink);
    }

    fn resolve_ship_hits(&mut self, now_ms: u64, sink: &mut dyn CueSink) {
        if !self.ship.vulnerable() {
            return;
        }
        let ship_rect = self.ship.rect;
        let ship_radius = self.ship.collision_radius();

        let asteroid_hit = self.asteroids.iter().position(|a| {
            hit_test(&ship_rect, ship_radius, &a.rect, a.collision_radius())
        });
        if let Some(index) = asteroid_hit {
            // only projectile hits fragment; a ram just destroys it
            self.asteroids.remove(index);
            sink.play(SoundCue::AsteroidExplosion);
            self.kill_ship(now_ms, sink);
            return;
        }

        // ramming a saucer kills the ship but leaves the saucer flying
        let enemy_hit = self.enemies.iter().any(|e| {
            hit_test(&ship_rect, ship_radius, &e.rect, e.collision_radius())
        });
        if enemy_hit {
            self.kill_ship(now_ms, sink);
            return;
        }

        let shot_hit = self.shots.iter().position(|s| {
            s.owner == OwnerKind::Enemy
                && hit_test(&ship_rect, ship_radius, &s.rect, s.collision_radius())
        });
        if let Some(index) = shot_hit {
            self.shots.remove(index);
            self.kill_ship(now_ms, sink);
        }
    }

    fn resolve_enemy_hits(&mut self, now_ms: u64, sink: &mut dyn CueSink) {
        let mut i = 0;
        while i < self.enemies.len() {
            let enemy = &self.enemies[i];
            let hit = self.shots.iter().position(|s| {
                s.owner == OwnerKind::Player
                    && hit_test(
                        &enemy.rect,
                        enemy.collision_radius(),
                        &s.rect,
                        s.collision_radius(),
                    )
            });
            match hit {
                Some(shot_index) => {
                    self.shots.remove(shot_index);
                    let enemy = self.enemies.remove(i);
                    self.session
                        .add_score(BASE_SCORE * enemy.kind.score_weight());
                    sink.play(SoundCue::EnemyExplosion);
                    // a kill brings the next saucer sooner
                    self.next_enemy_at = now_ms
                        + self
                            .config
                            .enemy
                            .spawn_interval_ms
                            .saturating_sub(self.config.enemy.overlap_offset_ms);
                }
                None => i += 1,
            }
        }
    }

    /// Any shot destroys an asteroid, but only the player's score from it.
    fn resolve_asteroid_hits(&mut self, sink: &mut dyn CueSink) {
        let mut children = Vec::new();
        let mut i = 0;
        while i < self.asteroids.len() {
            let asteroid = &self.asteroids[i];
            let hit = self.shots.iter().position(|s| {
                hit_test(
                    &asteroid.rect,
                    asteroid.collision_radius(),
                    &s.rect,
                    s.collision_radius(),
                )
            });
            match hit {
                Some(shot_index) => {
                    let shot = self.shots.remove(shot_index);
                    let asteroid = self.asteroids.remove(i);
                    if shot.owner == OwnerKind::Player {
                        self.session.add_score(asteroid_points(asteroid.state));
                    }
                    sink.play(SoundCue::AsteroidExplosion);
                    if let Some(mut brood) = fragment(&asteroid, &mut self.rng) {
                        children.append(&mut brood);
                    }
                }
                None => i += 1,
            }
        }
        self.asteroids.append(&mut children);
    }

    fn kill_ship(&mut self, now_ms: u64, sink: &mut dyn CueSink) {
        self.ship.alive = false;
        self.ship.engine_off();
        self.session.lives = self.session.lives.saturating_sub(1);
        self.remains.push(ShipRemains::from_ship(&self.ship));
        sink.play(SoundCue::PlayerExplosion);
        if self.session.lives > 0 {
            self.respawn_at = Some(now_ms + RESPAWN_DELAY_MS);
        }
        info!("ship destroyed, {} lives left", self.session.lives);
    }

    fn advance_level(&mut self, now_ms: u64) {
        let field_clear = self.asteroids.is_empty() && self.enemies.is_empty();

        if self.pending_level_start.is_none() && field_clear && self.wave_spawned {
            self.pending_level_start = Some(now_ms + LEVEL_TRANSITION_DELAY_MS);
            if self.ship.alive {
                self.ship.start_flash(LEVEL_TRANSITION_FLASH_SECS);
            }
        }

        if let Some(at) = self.pending_level_start {
            if now_ms >= at {
                if self.wave_spawned {
                    self.session.level += 1;
                    info!("level {} begins", self.session.level);
                }
                let avoid = self.ship.alive.then_some(self.ship.rect.center);
                let mut wave = spawn_wave(
                    self.session.level,
                    &self.config.asteroid,
                    &self.area,
                    avoid,
                    &mut self.rng,
                );
                self.asteroids.append(&mut wave);
                self.shots.clear();
                self.wave_spawned = true;
                self.pending_level_start = None;
            }
        }
    }
}

/// A vertical menu driven by the nav actions.
pub struct Menu {
    pub items: &'static [&'static str],
    pub selected: usize,
}

impl Menu {
    pub fn new(items: &'static [&'static str]) -> Self {
        Menu { items, selected: 0 }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(self.items.len() - 1);
    }

    pub fn down(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }
}

pub struct IntroState {
    pub menu: Menu,
}

impl IntroState {
    pub fn new() -> Self {
        IntroState {
            menu: Menu::new(&["New Game", "Controls", "Quit"]),
        }
    }

    pub fn tick(&mut self, actions: &[Action]) -> Transition {
        for action in actions {
            match action {
                Action::NavUp => self.menu.up(),
                Action::NavDown => self.menu.down(),
                Action::Confirm => {
                    return match self.menu.selected {
                        0 => Transition::To(StateId::Main),
                        1 => Transition::To(StateId::Controls),
                        _ => Transition::Quit,
                    };
                }
                Action::Cancel | Action::Quit => return Transition::Quit,
                _ => {}
            }
        }
        Transition::Stay
    }
}

impl Default for IntroState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ControlsState;

impl ControlsState {
    pub fn tick(&mut self, actions: &[Action]) -> Transition {
        for action in actions {
            match action {
                Action::Confirm | Action::Cancel => {
                    return Transition::To(StateId::Intro);
                }
                Action::Quit => return Transition::Quit,
                _ => {}
            }
        }
        Transition::Stay
    }
}

/// Game-over screen. Settles the highscore board once, shows the
/// scoreboard alone for a moment, then offers the menu.
pub struct EndState {
    pub final_score: u32,
    pub board: Highscores,
    pub new_rank: Option<usize>,
    pub menu: Menu,
    entered_at: Option<u64>,
    scores_path: PathBuf,
}

impl EndState {
    pub fn new(final_score: u32, scores_path: PathBuf) -> Self {
        EndState {
            final_score,
            board: Highscores::new(),
            new_rank: None,
            menu: Menu::new(&["New Game", "Main Menu", "Quit"]),
            entered_at: None,
            scores_path,
        }
    }

    pub fn menu_open(&self, now_ms: u64) -> bool {
        match self.entered_at {
            Some(at) => now_ms >= at + END_MENU_DELAY_MS,
            None => false,
        }
    }

    pub fn tick(&mut self, now_ms: u64, actions: &[Action]) -> Transition {
        if self.entered_at.is_none() {
            self.entered_at = Some(now_ms);
            self.board = Highscores::load(&self.scores_path);
            self.new_rank = self.board.insert(self.final_score);
            // rewritten in full every game over, created if absent
            if let Err(err) = self.board.save(&self.scores_path) {
                error!("could not save highscores: {err:#}");
            }
        }

        if !self.menu_open(now_ms) {
            return Transition::Stay;
        }

        for action in actions {
            match action {
                Action::NavUp => self.menu.up(),
                Action::NavDown => self.menu.down(),
                Action::Confirm => {
                    return match self.menu.selected {
                        0 => Transition::To(StateId::Main),
                        1 => Transition::To(StateId::Intro),
                        _ => Transition::Quit,
                    };
                }
                Action::Cancel | Action::Quit => return Transition::Quit,
                _ => {}
            }
        }
        Transition::Stay
    }
}

/// Owns the active state and routes ticks to it. Entering Main always
/// rebuilds it, so every run starts from scratch.
pub struct Game {
    pub state: StateId,
    pub intro: IntroState,
    pub controls: ControlsState,
    pub main: Option<MainState>,
    pub end: Option<EndState>,
    config: Config,
    area: PlayArea,
    scores_path: PathBuf,
}

impl Game {
    pub fn new(config: Config, area: PlayArea, scores_path: PathBuf) -> Self {
        Game {
            state: StateId::Intro,
            intro: IntroState::new(),
            controls: ControlsState,
            main: None,
            end: None,
            config,
            area,
            scores_path,
        }
    }

    /// Advances the current state one frame. Returns false once the game
    /// should exit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        delta_time: f64,
        actions: &[Action],
        sink: &mut dyn CueSink,
    ) -> bool {
        let transition = match self.state {
            StateId::Intro => self.intro.tick(actions),
            StateId::Controls => self.controls.tick(actions),
            StateId::Main => match self.main.as_mut() {
                Some(main) => main.tick(now_ms, delta_time, actions, sink),
                None => Transition::To(StateId::Intro),
            },
            StateId::End => match self.end.as_mut() {
                Some(end) => end.tick(now_ms, actions),
                None => Transition::To(StateId::Intro),
            },
        };

        match transition {
            Transition::Stay => true,
            Transition::Quit => false,
            Transition::To(next) => {
                self.enter(next);
                true
            }
        }
    }

    fn enter(&mut self, next: StateId) {
        match next {
            StateId::Main => {
                self.main =
                    Some(MainState::new(self.config.clone(), self.area));
            }
            StateId::End => {
                let score = self
                    .main
                    .as_ref()
                    .map(|m| m.session.score)
                    .unwrap_or(0);
                self.end =
                    Some(EndState::new(score, self.scores_path.clone()));
            }
            StateId::Intro | StateId::Controls => {}
        }
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_life_grants_once_and_banks_the_rest() {
        let mut session = GameSession::new();
        session.add_score(10_300);
        assert!(session.extra_life_check());
        assert_eq!(session.lives, STARTING_LIVES + 1);
        // the 300 surplus stays banked
        session.add_score(9_700);
        assert!(session.extra_life_check());
        assert_eq!(session.lives, STARTING_LIVES + 2);
        assert!(!session.extra_life_check());
    }

    #[test]
    fn smaller_asteroids_score_higher() {
        assert_eq!(asteroid_points(3), 50);
        assert_eq!(asteroid_points(2), 75);
        assert_eq!(asteroid_points(1), 150);
    }

    #[test]
    fn menu_wraps_both_directions() {
        let mut menu = Menu::new(&["a", "b", "c"]);
        menu.up();
        assert_eq!(menu.selected, 2);
        menu.down();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn intro_confirm_starts_a_game() {
        let mut intro = IntroState::new();
        match intro.tick(&[Action::Confirm]) {
            Transition::To(StateId::Main) => {}
            _ => panic!("expected transition to Main"),
        }
    }

    #[test]
    fn end_screen_writes_the_board_even_without_a_qualifying_score() {
        let path = std::env::temp_dir().join("rusteroids_end_save_test.txt");
        let _ = std::fs::remove_file(&path);
        let mut end = EndState::new(0, path.clone());
        end.tick(0, &[]);
        assert!(path.exists());
        assert_eq!(end.new_rank, None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn end_menu_is_gated() {
        let dir = std::env::temp_dir().join("rusteroids_end_gate_test.txt");
        let mut end = EndState::new(0, dir);
        // first tick stamps the entry time; menu still closed
        end.tick(1000, &[]);
        assert!(!end.menu_open(1500));
        assert!(end.menu_open(1000 + END_MENU_DELAY_MS));
        // confirm before the gate opens is ignored
        match end.tick(1500, &[Action::Confirm]) {
            Transition::Stay => {}
            _ => panic!("menu acted before the gate opened"),
        }
    }
}
