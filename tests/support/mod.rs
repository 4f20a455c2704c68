//! Deterministic in-memory dataset generator for integration tests.
//!
//! Mirrors the row layout and value ranges of the reference data generator
//! (origin/destination rows of `{id, attrs...}`, dense cartesian
//! accessibility pairs with a zeroed diagonal) but drives them off a seeded
//! `rand_chacha` RNG instead of `libc`'s `rand`/`srand`, so results are
//! reproducible across platforms.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A per-column null-fraction policy. `Uniform` matches the reference
/// generator's `frand(0.6, 0.6)` (every column is 60% null). `ColumnIndexThreshold`
/// reproduces the behavior the end-to-end scenarios rely on: column `a` is
/// `(1 - a/100)` fraction null, clamped to `[0, 1]` — column 0 is all-null,
/// column 1 is ~99% null (~1% non-null), and any column at index 100 or
/// beyond is fully dense.
#[derive(Clone, Copy, Debug)]
pub enum NullPolicy {
    Uniform(f32),
    ColumnIndexThreshold,
}

impl NullPolicy {
    fn fraction(self, column: u32) -> f32 {
        match self {
            Self::Uniform(p) => p,
            Self::ColumnIndexThreshold => (1.0 - column as f32 / 100.0).clamp(0.0, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub num_origins: u32,
    pub num_dests: u32,
    pub origin_attrs: u32,
    pub dest_attrs: u32,
    pub seed: u64,
    pub null_policy: NullPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_origins: 64,
            num_dests: 16,
            origin_attrs: 8,
            dest_attrs: 8,
            seed: 33,
            null_policy: NullPolicy::Uniform(0.6),
        }
    }
}

/// The three row-major input files a generated dataset maps to.
pub struct Dataset {
    pub origin_bytes: Vec<u8>,
    pub destination_bytes: Vec<u8>,
    pub accessibility_bytes: Vec<u8>,
}

/// Generates a dataset matching `config`, deterministic for a given seed.
#[must_use]
pub fn generate(config: &GeneratorConfig) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let origin_bytes = generate_attribute_table(
        &mut rng,
        config.num_origins,
        config.origin_attrs,
        config.null_policy,
        0.0,
        1000.0,
    );

    let destination_bytes = generate_attribute_table(
        &mut rng,
        config.num_dests,
        config.dest_attrs,
        config.null_policy,
        0.0,
        500.0,
    );

    let accessibility_bytes =
        generate_accessibility_table(&mut rng, config.num_origins, config.num_dests);

    Dataset {
        origin_bytes,
        destination_bytes,
        accessibility_bytes,
    }
}

fn generate_attribute_table(
    rng: &mut ChaCha8Rng,
    n_rows: u32,
    n_attrs: u32,
    null_policy: NullPolicy,
    low: f32,
    high: f32,
) -> Vec<u8> {
    let row_size = 4 + n_attrs as usize * 4;
    let mut bytes = Vec::with_capacity(n_rows as usize * row_size);

    for id in 0..n_rows {
        bytes.extend_from_slice(&id.to_ne_bytes());

        for a in 0..n_attrs {
            let is_null = rng.random::<f32>() < null_policy.fraction(a);
            let value = if is_null {
                f32::NAN
            } else {
                rng.random_range(low..high)
            };
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
    }

    bytes
}

fn generate_accessibility_table(rng: &mut ChaCha8Rng, num_origins: u32, num_dests: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(num_origins as usize * num_dests as usize * 16);

    for origin_id in 0..num_origins {
        for destination_id in 0..num_dests {
            let (time, distance) = if origin_id == destination_id {
                (0.0, 0.0)
            } else {
                (rng.random_range(1.0..120.0), rng.random_range(0.5..50.0))
            };

            bytes.extend_from_slice(&origin_id.to_ne_bytes());
            bytes.extend_from_slice(&destination_id.to_ne_bytes());
            bytes.extend_from_slice(&time.to_ne_bytes());
            bytes.extend_from_slice(&distance.to_ne_bytes());
        }
    }

    bytes
}

/// Writes a generated [`Dataset`] into `dir` using the `<entity>_<P>p.bin`
/// naming convention, returning the three paths in
/// `(origin, destination, accessibility)` order.
pub fn write_dataset(
    dir: &std::path::Path,
    dataset: &Dataset,
    percent_token: &str,
) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let origin_path = dir.join(format!("origin_{percent_token}.bin"));
    let destination_path = dir.join(format!("destination_{percent_token}.bin"));
    let accessibility_path = dir.join(format!("accessibility_{percent_token}.bin"));

    std::fs::write(&origin_path, &dataset.origin_bytes).unwrap();
    std::fs::write(&destination_path, &dataset.destination_bytes).unwrap();
    std::fs::write(&accessibility_path, &dataset.accessibility_bytes).unwrap();

    (origin_path, destination_path, accessibility_path)
}
