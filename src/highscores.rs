use std::fs;
use std::path::Path;

use anyhow::Context;
use log::warn;

pub const MAX_ENTRIES: usize = 5;

/// Top scores, highest first. Kept as plain numbers; the rank prefix in
/// the file is regenerated on save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highscores {
    scores: Vec<u32>,
}

impl Highscores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Places `score` on the board if it qualifies, returning its 0-based
    /// rank. A zero score never qualifies.
    pub fn insert(&mut self, score: u32) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let rank = self.scores.iter().position(|&s| score > s);
        match rank {
            Some(rank) => {
                self.scores.insert(rank, score);
                self.scores.truncate(MAX_ENTRIES);
                Some(rank)
            }
            None if self.scores.len() < MAX_ENTRIES => {
                self.scores.push(score);
                Some(self.scores.len() - 1)
            }
            None => None,
        }
    }

    /// Reads the board from disk. A missing file is an empty board;
    /// unreadable lines are dropped with a warning rather than wiping
    /// what does parse.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::new(),
        };
        let mut board = Self::new();
        for line in raw.lines() {
            let score = line
                .rsplit(' ')
                .next()
                .and_then(|field| field.parse::<u32>().ok());
            match score {
                Some(score) => {
                    board.insert(score);
                }
                None => warn!("skipping unreadable highscore line: {line:?}"),
            }
        }
        board
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let body: String = self
            .scores
            .iter()
            .enumerate()
            .map(|(i, score)| format!("{}. {}\n", i + 1, score))
            .collect();
        fs::write(path, body)
            .with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: &[u32]) -> Highscores {
        let mut board = Highscores::new();
        for &score in scores {
            board.insert(score);
        }
        board
    }

    #[test]
    fn fills_in_descending_order() {
        let board = board(&[300, 900, 600]);
        assert_eq!(board.scores(), &[900, 600, 300]);
    }

    #[test]
    fn reports_the_rank_of_a_new_entry() {
        let mut board = board(&[900, 600, 300]);
        assert_eq!(board.insert(700), Some(1));
        assert_eq!(board.scores(), &[900, 700, 600, 300]);
    }

    #[test]
    fn full_board_drops_the_lowest() {
        let mut board = board(&[900, 800, 700, 600, 500]);
        assert_eq!(board.insert(650), Some(4));
        assert_eq!(board.scores(), &[900, 800, 700, 650, 600]);
    }

    #[test]
    fn full_board_rejects_a_score_that_beats_nothing() {
        let mut board = board(&[900, 800, 700, 600, 500]);
        assert_eq!(board.insert(400), None);
        assert_eq!(board.scores().len(), MAX_ENTRIES);
    }

    #[test]
    fn zero_never_qualifies() {
        let mut board = Highscores::new();
        assert_eq!(board.insert(0), None);
        assert!(board.scores().is_empty());
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("rusteroids_highscores_test.txt");
        let original = board(&[900, 600, 300]);
        original.save(&path).unwrap();
        let loaded = Highscores::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_file_is_an_empty_board() {
        let board = Highscores::load(Path::new("/nonexistent/scores.txt"));
        assert!(board.scores().is_empty());
    }
}
