use std::io::{self, Write};

use crossterm::{cursor::MoveTo, queue, style::Print};

use crate::entities::{Asteroid, Enemy, EnemyKind, Ship, ShipRemains, Shot};
use crate::game::{ControlsState, EndState, Game, IntroState, MainState, Menu, StateId};
use crate::types::{PlayArea, Vector2D};

// --- GameGrid for geometric rendering ---

/// Character grid one frame is composed into. Play-area coordinates are
/// scaled down to terminal cells at draw time.
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    scale_x: f64,
    scale_y: f64,
}

impl GameGrid {
    pub fn new(width: u16, height: u16, area: &PlayArea) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            scale_x: width as f64 / area.width,
            scale_y: height as f64 / area.height,
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(' ');
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    fn plot(&mut self, point: Vector2D, c: char) {
        let x = (point.x * self.scale_x).round();
        let y = (point.y * self.scale_y).round();
        if x >= 0.0 && y >= 0.0 {
            self.set_char(x as u16, y as u16, c);
        }
    }

    pub fn draw_text(&mut self, x: u16, y: u16, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set_char(x + i as u16, y, c);
        }
    }

    pub fn draw_text_centered(&mut self, y: u16, text: &str) {
        let x = (self.width as usize).saturating_sub(text.len()) / 2;
        self.draw_text(x as u16, y, text);
    }

    pub fn render(&self, stdout: &mut impl Write) -> io::Result<()> {
        for y in 0..self.height {
            let row: String = self.grid[y as usize].iter().collect();
            queue!(stdout, MoveTo(0, y), Print(row))?;
        }
        stdout.flush()
    }
}

// --- Entity sprites ---

/// One of eight arrowheads, picked by the facing octant.
fn ship_glyph(facing: Vector2D) -> char {
    // y grows downward, so flip it for the usual angle convention
    let degrees = (-facing.y).atan2(facing.x).to_degrees();
    let octant = ((degrees + 382.5) / 45.0) as u32 % 8;
    ['>', '/', '^', '\\', '<', '/', 'v', '\\'][octant as usize]
}

fn asteroid_glyph(asteroid: &Asteroid) -> char {
    match asteroid.state {
        3 => '@',
        2 => 'O',
        _ => 'o',
    }
}

pub fn draw_ship(grid: &mut GameGrid, ship: &Ship) {
    if !ship.alive || !ship.visible() {
        return;
    }
    grid.plot(ship.rect.center, ship_glyph(ship.facing_direction));
    if ship.thrusting {
        let tail = ship
            .rect
            .center
            .sub(ship.facing_direction.scale(ship.rect.height));
        grid.plot(tail, '+');
    }
}

pub fn draw_remains(grid: &mut GameGrid, remains: &ShipRemains) {
    grid.plot(remains.rect.center, 'x');
}

pub fn draw_shot(grid: &mut GameGrid, shot: &Shot) {
    grid.plot(shot.rect.center, '*');
}

pub fn draw_asteroid(grid: &mut GameGrid, asteroid: &Asteroid) {
    grid.plot(asteroid.rect.center, asteroid_glyph(asteroid));
}

pub fn draw_enemy(grid: &mut GameGrid, enemy: &Enemy) {
    let glyph = match enemy.kind {
        EnemyKind::Small => 'w',
        EnemyKind::Big => 'W',
    };
    grid.plot(enemy.rect.center, glyph);
}

// --- Screens ---

fn draw_menu(grid: &mut GameGrid, menu: &Menu, first_row: u16) {
    for (i, item) in menu.items.iter().enumerate() {
        let marker = if i == menu.selected { "> " } else { "  " };
        grid.draw_text_centered(first_row + i as u16, &format!("{marker}{item}"));
    }
}

pub fn draw_intro(grid: &mut GameGrid, intro: &IntroState) {
    let mid = grid.height / 2;
    grid.draw_text_centered(mid.saturating_sub(4), "R U S T E R O I D S");
    draw_menu(grid, &intro.menu, mid);
}

pub fn draw_controls(grid: &mut GameGrid, _controls: &ControlsState) {
    let top = grid.height / 3;
    let lines = [
        "Controls",
        "",
        "Up      thrust",
        "Left    turn left",
        "Right   turn right",
        "Space   fire",
        "H       hyperspace",
        "Esc     back to menu",
        "",
        "Enter to return",
    ];
    for (i, line) in lines.iter().enumerate() {
        grid.draw_text_centered(top + i as u16, line);
    }
}

pub fn draw_main(grid: &mut GameGrid, main: &MainState) {
    for asteroid in &main.asteroids {
        draw_asteroid(grid, asteroid);
    }
    for enemy in &main.enemies {
        draw_enemy(grid, enemy);
    }
    for shot in &main.shots {
        draw_shot(grid, shot);
    }
    for remains in &main.remains {
        draw_remains(grid, remains);
    }
    draw_ship(grid, &main.ship);

    let hud = format!(
        "Score: {}  Lives: {}  Level: {}",
        main.session.score, main.session.lives, main.session.level
    );
    grid.draw_text(1, 0, &hud);
}

pub fn draw_end(grid: &mut GameGrid, end: &EndState, now_ms: u64) {
    let top = grid.height / 4;
    grid.draw_text_centered(top, "G A M E   O V E R");
    grid.draw_text_centered(top + 2, &format!("Final score: {}", end.final_score));

    for (i, score) in end.board.scores().iter().enumerate() {
        let marker = if end.new_rank == Some(i) { " <--" } else { "" };
        grid.draw_text_centered(
            top + 4 + i as u16,
            &format!("{}. {}{}", i + 1, score, marker),
        );
    }

    if end.menu_open(now_ms) {
        draw_menu(grid, &end.menu, top + 4 + end.board.scores().len() as u16 + 2);
    }
}

/// Composes the frame for whichever state is active.
pub fn draw_game(grid: &mut GameGrid, game: &Game, now_ms: u64) {
    grid.clear();
    match game.state {
        StateId::Intro => draw_intro(grid, &game.intro),
        StateId::Controls => draw_controls(grid, &game.controls),
        StateId::Main => {
            if let Some(main) = &game.main {
                draw_main(grid, main);
            }
        }
        StateId::End => {
            if let Some(end) = &game.end {
                draw_end(grid, end, now_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    const AREA: PlayArea = PlayArea { width: 1280.0, height: 720.0 };

    #[test]
    fn plot_scales_play_area_to_cells() {
        let mut grid = GameGrid::new(128, 36, &AREA);
        grid.plot(Vector2D::new(640.0, 360.0), '@');
        assert_eq!(grid.grid[18][64], '@');
    }

    #[test]
    fn plot_off_grid_is_dropped() {
        let mut grid = GameGrid::new(128, 36, &AREA);
        grid.plot(Vector2D::new(-50.0, 360.0), '@');
        grid.plot(Vector2D::new(640.0, 5000.0), '@');
        assert!(grid.grid.iter().flatten().all(|&c| c == ' '));
    }

    #[test]
    fn ship_glyph_tracks_facing() {
        assert_eq!(ship_glyph(Vector2D::new(0.0, -1.0)), '^');
        assert_eq!(ship_glyph(Vector2D::new(0.0, 1.0)), 'v');
        assert_eq!(ship_glyph(Vector2D::new(1.0, 0.0)), '>');
        assert_eq!(ship_glyph(Vector2D::new(-1.0, 0.0)), '<');
    }

    #[test]
    fn dead_ship_is_not_drawn() {
        let mut grid = GameGrid::new(128, 36, &AREA);
        let mut ship = Ship::new(&PlayerConfig::default(), AREA.center());
        ship.alive = false;
        draw_ship(&mut grid, &ship);
        assert!(grid.grid.iter().flatten().all(|&c| c == ' '));
    }

    #[test]
    fn centered_text_lands_in_the_middle() {
        let mut grid = GameGrid::new(20, 5, &AREA);
        grid.draw_text_centered(2, "hi");
        assert_eq!(grid.grid[2][9], 'h');
        assert_eq!(grid.grid[2][10], 'i');
    }
}
