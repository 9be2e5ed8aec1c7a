//! Random origin/destination pairs inside an [`Area`].
//!
//! Rejection sampling over the area's bounding box with a fixed attempt
//! budget per pair, so a tiny or sliver-shaped area shrinks the run instead
//! of looping forever.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::sdk::area::{Area, Coordinate};
use crate::sdk::routing::error::ErrorKind;
use crate::sdk::routing::route::RoutePair;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    pub count: usize,
    pub min_separation_m: f64,
    /// Candidate draws per pair; each origin or destination draw costs one.
    pub max_attempts: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            count: 5,
            min_separation_m: 500.0,
            max_attempts: 100,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Sampling slot {slot} exhausted after {attempts} attempts")]
pub struct SamplingExhausted {
    pub slot: usize,
    pub attempts: usize,
}

impl SamplingExhausted {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SamplingExhausted
    }
}

/// Pairs that were drawn, plus the slots that ran out of attempts.
#[derive(Debug, Clone, Default)]
pub struct SampleOutcome {
    pub pairs: Vec<RoutePair>,
    pub exhausted: Vec<SamplingExhausted>,
}

impl SampleOutcome {
    pub fn is_complete(&self) -> bool {
        self.exhausted.is_empty()
    }
}

/// Draws `settings.count` pairs. Pair ids are consecutive from 0 in draw order.
pub fn sample_pairs<R: Rng + ?Sized>(
    area: &Area,
    settings: &SamplerSettings,
    rng: &mut R,
) -> SampleOutcome {
    let mut outcome = SampleOutcome::default();
    for slot in 0..settings.count {
        let id = outcome.pairs.len();
        match sample_pair(area, id, slot, settings, rng) {
            Ok(pair) => outcome.pairs.push(pair),
            Err(exhausted) => {
                log::warn!("{}", exhausted);
                outcome.exhausted.push(exhausted);
            }
        }
    }
    outcome
}

/// Seeded convenience wrapper; `None` draws from OS entropy.
pub fn sample_pairs_seeded(area: &Area, settings: &SamplerSettings, seed: Option<u64>) -> SampleOutcome {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    sample_pairs(area, settings, &mut rng)
}

/// One pair within the attempt budget.
pub fn sample_pair<R: Rng + ?Sized>(
    area: &Area,
    id: usize,
    slot: usize,
    settings: &SamplerSettings,
    rng: &mut R,
) -> Result<RoutePair, SamplingExhausted> {
    let (min_lon, min_lat, max_lon, max_lat) = area.bounding_box();
    let mut attempts = 0;
    let draw = |rng: &mut R, attempts: &mut usize| -> Option<Coordinate> {
        while *attempts < settings.max_attempts {
            *attempts += 1;
            let candidate = Coordinate::new(
                rng.gen_range(min_lat..=max_lat),
                rng.gen_range(min_lon..=max_lon),
            );
            if area.contains(&candidate) {
                return Some(candidate);
            }
        }
        None
    };

    while attempts < settings.max_attempts {
        let Some(origin) = draw(&mut *rng, &mut attempts) else {
            break;
        };
        let Some(destination) = draw(&mut *rng, &mut attempts) else {
            break;
        };
        if origin.distance_to(&destination) >= settings.min_separation_m {
            return Ok(RoutePair {
                id,
                origin,
                destination,
            });
        }
    }

    Err(SamplingExhausted { slot, attempts })
}
