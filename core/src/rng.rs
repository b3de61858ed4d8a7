//! Seeded random sources for maze generation
//!
//! The generator only talks to [`MazeRng`], so the draw sequence it makes
//! (how many draws, in which order, with which bounds) is the compatibility
//! contract. Any generator that answers those draws identically produces an
//! identical maze.
//!
//! Two sources are provided:
//! - [`SimpleLCG`]: Park-Miller MINSTD, cheap and easy to port.
//! - [`MonoRandom`](crate::MonoRandom): the subtractive generator behind
//!   rule seeds, needed to reproduce shared seeds draw for draw.

use core::fmt;
use core::str::FromStr;

use crate::mono_random::MonoRandom;

/// Source of the random draws consumed by generation and goal selection
pub trait MazeRng {
    /// Uniform integer in `[0, bound)`
    fn next_int(&mut self, bound: usize) -> usize;

    /// Fisher-Yates shuffle walking down from the end of the slice
    fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut i = items.len();
        while i > 1 {
            let j = self.next_int(i);
            i -= 1;
            items.swap(j, i);
        }
    }
}

/// Park-Miller Linear Congruential Generator
///
/// Constants:
/// - Multiplier (a): 48271
/// - Modulus (m): 2^31 - 1 = 2147483647
///
/// Generates a deterministic sequence of pseudo-random numbers from a seed.
/// Same seed always produces the same sequence.
#[derive(Debug, Clone)]
pub struct SimpleLCG {
    state: u32,
}

impl SimpleLCG {
    const A: u64 = 48271;
    const M: u64 = 2147483647; // 2^31 - 1

    /// Create a new LCG with the given seed
    ///
    /// If seed is 0, it's replaced with 1 to avoid degenerate sequence.
    /// Seeds at or above the modulus are folded into range first.
    pub fn new(seed: u32) -> Self {
        let state = (seed as u64 % Self::M) as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    fn advance(&mut self) {
        // u64 keeps the product from overflowing
        self.state = ((self.state as u64 * Self::A) % Self::M) as u32;
    }
}

impl MazeRng for SimpleLCG {
    /// Always consumes one draw, even for a bound of 1.
    /// Pure integer arithmetic: `(state * bound) / m`.
    fn next_int(&mut self, bound: usize) -> usize {
        self.advance();
        ((self.state as u64 * bound as u64) / Self::M) as usize
    }
}

/// Which generator backs a session's maze layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RngKind {
    /// Rule-seed compatible subtractive generator
    #[default]
    Mono,
    /// Park-Miller MINSTD
    Lcg,
}

impl RngKind {
    /// Run `f` with a freshly seeded generator of this kind
    pub fn with_rng<T>(self, seed: i32, f: impl FnOnce(&mut dyn DrawSource) -> T) -> T {
        match self {
            RngKind::Mono => f(&mut MonoRandom::new(seed)),
            RngKind::Lcg => f(&mut SimpleLCG::new(seed as u32)),
        }
    }
}

/// Object-safe view of a [`MazeRng`], for picking the generator at runtime
pub trait DrawSource {
    fn draw(&mut self, bound: usize) -> usize;
}

impl<R: MazeRng> DrawSource for R {
    fn draw(&mut self, bound: usize) -> usize {
        self.next_int(bound)
    }
}

impl MazeRng for &mut dyn DrawSource {
    fn next_int(&mut self, bound: usize) -> usize {
        // Go through the vtable; `self.draw` would pick the blanket impl and recurse
        (**self).draw(bound)
    }
}

impl FromStr for RngKind {
    type Err = alloc::string::String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mono") {
            Ok(RngKind::Mono)
        } else if s.eq_ignore_ascii_case("lcg") {
            Ok(RngKind::Lcg)
        } else {
            Err(alloc::format!("Invalid rng kind: '{}'. Must be 'mono' or 'lcg'", s))
        }
    }
}

impl fmt::Display for RngKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RngKind::Mono => write!(f, "mono"),
            RngKind::Lcg => write!(f, "lcg"),
        }
    }
}
