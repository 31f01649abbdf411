use rand::Rng;

use crate::common::{Config, Method, DEFAULT_RANDOM_LEN, DEFAULT_SERIAL_WIDTH};
use crate::request::GenerationRequest;

/// Alphabet of random suffixes.
pub const RANDOM_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Code identity
//------------------------------------------------------------------------------

/// Produces the code text for a position of a run.
///
/// Serial codes are a pure function of the request and the position. Random
/// codes draw a fresh suffix on every call and are never deduplicated: two
/// positions of the same run may end up with the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeIdentity {
    serial_width: usize,
    random_len: usize,
}

impl Default for CodeIdentity {
    fn default() -> Self {
        Self { serial_width: DEFAULT_SERIAL_WIDTH, random_len: DEFAULT_RANDOM_LEN }
    }
}

impl From<&Config> for CodeIdentity {
    fn from(cfg: &Config) -> Self {
        Self { serial_width: cfg.serial_width, random_len: cfg.random_len }
    }
}

impl CodeIdentity {
    /// `idx` is the 0-based position inside the run.
    pub fn produce<R: Rng>(&self, req: &GenerationRequest, idx: u32, rng: &mut R) -> String {
        let mut code = req.normalized_prefix();
        match req.method {
            Method::Serial => {
                // Counters wider than the pad width grow instead of being cut
                let n = req.start_number.saturating_add(i64::from(idx));
                code.push_str(&format!("{n:0w$}", w = self.serial_width));
            }
            Method::Random => code.extend(random_suffix(self.random_len, rng)),
        }
        code
    }
}

/// Shorthand for [`CodeIdentity::produce`] with the default widths.
pub fn produce_code<R: Rng>(req: &GenerationRequest, idx: u32, rng: &mut R) -> String {
    CodeIdentity::default().produce(req, idx, rng)
}

fn random_suffix<R: Rng>(len: usize, rng: &mut R) -> impl Iterator<Item = char> + '_ {
    (0..len).map(move |_| RANDOM_CHARSET[rng.random_range(0..RANDOM_CHARSET.len())] as char)
}
