//! Run score and best score
//!
//! The best score is the only thing that outlives a page load. It is read once
//! when the game starts and written back only when a finished run beats it.

use crate::consts::SCORE_MODULUS;
use crate::platform::storage::BestScoreStore;

/// Result of ending a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Score the run ended with
    pub score: u32,
    /// Whether that score became the new best
    pub new_best: bool,
}

/// Current run score plus best score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    score: u32,
    best: u32,
}

impl Scoreboard {
    pub fn new(best: u32) -> Self {
        Self { score: 0, best }
    }

    /// Score of the current run
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Best committed score
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Count one paddle bounce, wrapping at [`SCORE_MODULUS`]
    pub fn add_point(&mut self) {
        self.score = (self.score + 1) % SCORE_MODULUS;
    }

    /// Whether the running score would beat the best if committed now
    pub fn beats_best(&self) -> bool {
        self.score > self.best
    }

    /// End the run: keep the best, persist it if improved, and zero the score
    pub fn commit_run<S: BestScoreStore + ?Sized>(&mut self, store: &mut S) -> RunSummary {
        let score = self.score;
        let new_best = self.beats_best();
        if new_best {
            self.best = score;
            store.save_best(score);
            log::info!("New best score: {}", score);
        }
        self.score = 0;
        RunSummary { score, new_best }
    }
}
