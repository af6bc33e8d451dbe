use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::model::{clamp_level, ReadingSource, Sample};
use crate::error::{Result, SiloError};

/// Closed interval sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: f64,
    pub max: f64,
}

impl UniformRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Symmetric range `[-amplitude, amplitude]`
    pub const fn symmetric(amplitude: f64) -> Self {
        Self::new(-amplitude, amplitude)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SiloError::config(format!("{} range must be finite", name)));
        }
        if self.min > self.max {
            return Err(SiloError::config(format!(
                "{} range is inverted ({} > {})",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Random-walk policy for synthetic readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Level assumed for a silo without history
    pub initial_level: f64,
    /// Per tick depletion, subtracted from the level
    pub consumption: UniformRange,
    /// Measurement jitter added to the level
    pub noise: UniformRange,
    pub temp_base_c: f64,
    pub temp_jitter: UniformRange,
    pub humidity_base: f64,
    pub humidity_jitter: UniformRange,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_level: 50.0,
            consumption: UniformRange::new(0.01, 0.15),
            noise: UniformRange::symmetric(0.05),
            temp_base_c: 24.0,
            temp_jitter: UniformRange::new(-1.0, 5.0),
            humidity_base: 13.0,
            humidity_jitter: UniformRange::symmetric(2.0),
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if !self.initial_level.is_finite() {
            return Err(SiloError::config("initial level must be finite"));
        }
        self.consumption.validate("consumption")?;
        self.noise.validate("noise")?;
        self.temp_jitter.validate("temperature jitter")?;
        self.humidity_jitter.validate("humidity jitter")?;
        Ok(())
    }
}

/// Produces readings that continue plausibly from the previous level
#[derive(Debug, Clone)]
pub struct ReadingSimulator<R: Rng = StdRng> {
    params: SimulationParams,
    rng: R,
}

impl ReadingSimulator<StdRng> {
    /// Deterministic simulator when a seed is given, entropy seeded otherwise
    pub fn from_seed(params: SimulationParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(params, rng)
    }
}

impl<R: Rng> ReadingSimulator<R> {
    pub fn with_rng(params: SimulationParams, rng: R) -> Self {
        Self { params, rng }
    }

    /// Next level from the previous one: `clamp(prev - consumption + noise)`
    pub fn next_level(&mut self, prev_level: Option<f64>) -> f64 {
        let prev = prev_level.unwrap_or(self.params.initial_level);
        let consumption = self.params.consumption.sample(&mut self.rng);
        let noise = self.params.noise.sample(&mut self.rng);
        clamp_level(prev - consumption + noise)
    }

    /// Full synthetic sample. Temperature and humidity are drawn
    /// independently of the level on every call.
    pub fn next_sample(&mut self, prev_level: Option<f64>) -> Sample {
        let level_percent = self.next_level(prev_level);
        let temp_c = self.params.temp_base_c + self.params.temp_jitter.sample(&mut self.rng);
        let humidity = self.params.humidity_base + self.params.humidity_jitter.sample(&mut self.rng);

        Sample {
            level_percent,
            temp_c,
            humidity,
            source: ReadingSource::Simulated,
        }
    }
}
