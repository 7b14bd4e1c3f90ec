//! Real dice backed by the thread-local RNG

use lineage_domain::Dice;
use rand::Rng;

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngDice;

impl ThreadRngDice {
    pub fn new() -> Self {
        Self
    }
}

impl Dice for ThreadRngDice {
    fn roll(&self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        rand::thread_rng().gen_range(low..=high)
    }
}
