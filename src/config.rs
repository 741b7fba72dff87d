//! Runtime configuration from the environment.
//!
//! `HOST` (default 0.0.0.0), `PORT` (default 8080), `DRAW_SEED` (optional; seeds the
//! bulk-draw shuffle so a draw can be reproduced). Log filtering is `RUST_LOG`.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub draw_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            draw_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            draw_seed: lookup("DRAW_SEED").and_then(|s| s.parse().ok()),
        }
    }

    /// RNG for bulk draws: seeded when `DRAW_SEED` is set, otherwise from entropy.
    pub fn draw_rng(&self) -> StdRng {
        match self.draw_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
