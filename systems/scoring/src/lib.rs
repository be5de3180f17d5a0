#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step and time accounting for a running level.
//!
//! [`Scorekeeper`] listens to world events and freezes the final [`Score`]
//! when victory is announced. Persisting best scores is delegated to a
//! [`ScoreBook`].

use std::{collections::BTreeMap, time::Duration};

use boxoban_core::{Event, Score};
use tracing::{debug, info};

/// Pure system that counts steps and elapsed time until victory.
#[derive(Debug, Default)]
pub struct Scorekeeper {
    steps: u32,
    elapsed: Duration,
    finished: Option<Score>,
}

impl Scorekeeper {
    /// Creates a scorekeeper with no steps and no elapsed time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events, returning the final score when victory arrives.
    ///
    /// Events after victory are ignored so the returned score stays frozen.
    pub fn handle(&mut self, events: &[Event]) -> Option<Score> {
        if self.finished.is_some() {
            return None;
        }

        for event in events {
            match event {
                Event::MoveResolved { outcome, .. } if !outcome.is_blocked() => {
                    self.steps = self.steps.saturating_add(1);
                }
                Event::TimeAdvanced { dt } => {
                    self.elapsed = self.elapsed.saturating_add(*dt);
                }
                Event::Victory => {
                    let score = self.current();
                    debug!(steps = score.steps, seconds = score.seconds, "level solved");
                    self.finished = Some(score);
                    return Some(score);
                }
                _ => {}
            }
        }
        None
    }

    /// Score accumulated so far, counting whole seconds only.
    #[must_use]
    pub fn current(&self) -> Score {
        let seconds = u32::try_from(self.elapsed.as_secs()).unwrap_or(u32::MAX);
        Score::new(self.steps, seconds)
    }

    /// Final score once the level has been solved.
    #[must_use]
    pub fn finished(&self) -> Option<Score> {
        self.finished
    }

    /// Clears all counters for a restarted level.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Persistence seam for per-level best scores.
pub trait ScoreBook {
    /// Best score recorded for the level, `None` when it was never solved.
    fn best_score(&self, chapter: u32, level: u32) -> Option<Score>;

    /// Records `score` if it beats the stored one, returning whether it did.
    fn record_score(&mut self, chapter: u32, level: u32, score: Score) -> bool;
}

/// Score book kept in memory, keyed by chapter and level.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreBook {
    scores: BTreeMap<(u32, u32), Score>,
}

impl MemoryScoreBook {
    /// Creates an empty score book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of levels with a recorded score.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Reports whether no level has a recorded score.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl ScoreBook for MemoryScoreBook {
    fn best_score(&self, chapter: u32, level: u32) -> Option<Score> {
        self.scores.get(&(chapter, level)).copied()
    }

    fn record_score(&mut self, chapter: u32, level: u32, score: Score) -> bool {
        let improved = self
            .scores
            .get(&(chapter, level))
            .map_or(true, |best| score.is_better_than(best));
        if improved {
            let _ = self.scores.insert((chapter, level), score);
            info!(chapter, level, steps = score.steps, seconds = score.seconds, "new best score");
        }
        improved
    }
}
