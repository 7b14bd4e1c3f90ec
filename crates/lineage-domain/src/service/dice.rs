//! Dice - The randomness port
//!
//! The domain never touches an RNG directly. Adapters provide real dice;
//! tests use `ScriptedDice` to make breeding deterministic.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Source of uniformly distributed integers
pub trait Dice {
    /// Roll an integer in `low..=high`
    fn roll(&self, low: i32, high: i32) -> i32;

    /// Pick `0` or `1` with equal probability
    fn coin(&self) -> usize {
        if self.roll(0, 1) == 0 {
            0
        } else {
            1
        }
    }
}

/// Dice that replay a fixed sequence of rolls.
///
/// Each roll is clamped into the requested range. Once the script runs
/// out, every roll returns `low`.
#[derive(Debug, Default)]
pub struct ScriptedDice {
    rolls: Mutex<VecDeque<i32>>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Dice for ScriptedDice {
    fn roll(&self, low: i32, high: i32) -> i32 {
        let next = self
            .rolls
            .lock()
            .ok()
            .and_then(|mut rolls| rolls.pop_front());
        match next {
            Some(value) => value.clamp(low, high),
            None => low,
        }
    }
}
