use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType},
};
use log::{error, info};

use rusteroids::audio::LogSink;
use rusteroids::config::Config;
use rusteroids::constants::*;
use rusteroids::game::Game;
use rusteroids::input::poll_actions;
use rusteroids::rendering::{draw_game, GameGrid};
use rusteroids::types::PlayArea;

fn main() -> anyhow::Result<()> {
    simple_logging::log_to_file("rusteroids.log", log::LevelFilter::Info)
        .context("opening log file")?;
    info!("starting up");

    let config = Config::load(Path::new("config.json"))?;

    let (terminal_width, terminal_height) =
        size().context("querying terminal size")?;
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, Hide, Clear(ClearType::All))
        .context("preparing terminal")?;

    let result = run(&config, terminal_width, terminal_height, &mut stdout);

    if let Err(err) = execute!(stdout, Show) {
        error!("could not restore cursor: {err}");
    }
    if let Err(err) = disable_raw_mode() {
        error!("could not disable raw mode: {err}");
    }

    info!("shutting down");
    result
}

fn run(
    config: &Config,
    terminal_width: u16,
    terminal_height: u16,
    stdout: &mut impl Write,
) -> anyhow::Result<()> {
    let area = PlayArea {
        width: PLAY_AREA_WIDTH,
        height: PLAY_AREA_HEIGHT,
    };
    let mut game = Game::new(
        config.clone(),
        area,
        PathBuf::from("highscores.txt"),
    );
    let mut grid = GameGrid::new(terminal_width, terminal_height, &area);
    let mut sink = LogSink::new(config.music.effects_volume);

    let start = Instant::now();
    let mut last_frame = start;

    loop {
        let actions = poll_actions(Duration::from_millis(FRAME_TIME_MS))
            .context("reading input")?;

        let now = Instant::now();
        let now_ms = now.duration_since(start).as_millis() as u64;
        let delta_time = now
            .duration_since(last_frame)
            .as_secs_f64()
            .min(MAX_DELTA_TIME);
        last_frame = now;

        if !game.tick(now_ms, delta_time, &actions, &mut sink) {
            return Ok(());
        }

        draw_game(&mut grid, &game, now_ms);
        grid.render(stdout).context("writing frame")?;
    }
}
