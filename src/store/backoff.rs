//! Backoff between lost CAS rounds
//!
//! With backoff disabled a writer replays its mutation immediately. Enabled,
//! it spins a jittered, doubling number of iterations and, once past
//! `max_spins`, yields its thread before each retry.

use std::hint;
use std::thread;

use rand::Rng;

use crate::config::BackoffConfig;

#[derive(Debug)]
pub(crate) struct Backoff {
    config: BackoffConfig,
    spins: u32,
}

impl Backoff {
    pub(crate) fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            spins: config.initial_spins,
        }
    }

    /// Waits before the next retry.
    pub(crate) fn wait(&mut self) {
        if !self.config.enabled {
            return;
        }

        let half = self.spins / 2;
        let jitter = rand::thread_rng().gen_range(0..=half);
        for _ in 0..half + jitter {
            hint::spin_loop();
        }

        if self.spins >= self.config.max_spins {
            thread::yield_now();
        } else {
            self.spins = self.spins.saturating_mul(2).min(self.config.max_spins);
        }
    }

    #[cfg(test)]
    fn spins(&self) -> u32 {
        self.spins
    }
}
