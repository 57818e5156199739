use crate::config::{Config, ConfigError};
use serde::Serialize;
use statusgen::{Distribution, DistributionError, StatusCodeGenerator};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid status code distribution: {0}")]
    Distribution(#[from] DistributionError),
    #[error("could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize, Debug)]
pub struct SampleReport {
    pub samples: u64,
    pub buckets: Vec<BucketReport>,
    pub codes: BTreeMap<u16, u64>,
}

#[derive(Serialize, Debug)]
pub struct BucketReport {
    pub name: String,
    pub weight: u32,
    pub count: u64,
    pub percent: f64,
}

pub fn run(count: u64, seed: Option<u64>, config_path: Option<PathBuf>) -> Result<(), SampleError> {
    let distribution = match config_path {
        Some(path) => {
            let config = Config::from_file(&path)?;
            match config.demo_api.and_then(|c| c.distribution) {
                Some(buckets) => Distribution::new(buckets)?,
                None => Distribution::default(),
            }
        }
        None => Distribution::default(),
    };

    let generator = StatusCodeGenerator::new(distribution, demo_api::random_source(seed));
    let report = sample(&generator, count);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

pub fn sample(generator: &StatusCodeGenerator, count: u64) -> SampleReport {
    let table = generator.distribution().buckets();
    let mut per_bucket = vec![0u64; table.len()];
    let mut codes: BTreeMap<u16, u64> = BTreeMap::new();

    for _ in 0..count {
        let draw = generator.draw();
        per_bucket[draw.bucket_index] += 1;
        *codes.entry(draw.code.as_u16()).or_default() += 1;
    }

    let buckets = table
        .iter()
        .zip(per_bucket)
        .map(|(bucket, hits)| BucketReport {
            name: bucket.name().to_string(),
            weight: bucket.weight(),
            count: hits,
            percent: if count == 0 {
                0.0
            } else {
                hits as f64 * 100.0 / count as f64
            },
        })
        .collect();

    SampleReport {
        samples: count,
        buckets,
        codes,
    }
}
