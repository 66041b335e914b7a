pub mod audio;
pub mod collision;
pub mod config;
pub mod constants;
pub mod entities;
pub mod game;
pub mod highscores;
pub mod input;
pub mod rendering;
pub mod spawn;
pub mod types;
