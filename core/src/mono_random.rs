//! Knuth subtractive generator, as shipped in Mono's `System.Random`
//!
//! Rule seeds are shared between players and between implementations, so
//! this port reproduces the reference generator bit for bit, including its
//! wrapping 32-bit arithmetic and the "bound of 0 or 1 consumes no draw"
//! shortcut in `next_int`.

use crate::rng::MazeRng;

const MBIG: i32 = i32::MAX;
const MSEED: i32 = 161_803_398;

/// Subtractive lagged-Fibonacci generator with a 55 entry state table
#[derive(Debug, Clone)]
pub struct MonoRandom {
    seed: i32,
    seed_array: [i32; 56],
    inext: usize,
    inextp: usize,
}

impl MonoRandom {
    pub fn new(seed: i32) -> Self {
        let subtraction = if seed == i32::MIN { MBIG } else { seed.abs() };
        let mut seed_array = [0i32; 56];

        let mut mj = MSEED.wrapping_sub(subtraction);
        seed_array[55] = mj;
        let mut mk: i32 = 1;
        for i in 1..55 {
            let ii = (21 * i) % 55;
            seed_array[ii] = mk;
            mk = mj.wrapping_sub(mk);
            if mk < 0 {
                mk = mk.wrapping_add(MBIG);
            }
            mj = seed_array[ii];
        }

        for _ in 1..5 {
            for i in 1..56 {
                seed_array[i] = seed_array[i].wrapping_sub(seed_array[1 + (i + 30) % 55]);
                if seed_array[i] < 0 {
                    seed_array[i] = seed_array[i].wrapping_add(MBIG);
                }
            }
        }

        Self {
            seed,
            seed_array,
            inext: 0,
            inextp: 31,
        }
    }

    /// The seed this generator was built from
    pub fn seed(&self) -> i32 {
        self.seed
    }

    fn internal_sample(&mut self) -> i32 {
        self.inext += 1;
        if self.inext >= 56 {
            self.inext = 1;
        }
        self.inextp += 1;
        if self.inextp >= 56 {
            self.inextp = 1;
        }

        let mut ret = self.seed_array[self.inext].wrapping_sub(self.seed_array[self.inextp]);
        if ret < 0 {
            ret = ret.wrapping_add(MBIG);
        }
        self.seed_array[self.inext] = ret;
        ret
    }

    /// Uniform double in `[0, 1)`
    pub fn sample(&mut self) -> f64 {
        self.internal_sample() as f64 * (1.0 / MBIG as f64)
    }
}

impl MazeRng for MonoRandom {
    fn next_int(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        (self.sample() * bound as f64) as u32 as usize
    }
}
