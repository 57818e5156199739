use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Bucket weights must add up to this value; bucket draws are taken from
/// `[0, TOTAL_WEIGHT)`.
pub const TOTAL_WEIGHT: u32 = 100;

const DEFAULT_BUCKETS: [(&str, u32, &[StatusCode]); 3] = [
    (
        "2xx",
        30,
        &[StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT],
    ),
    (
        "4xx",
        40,
        &[
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::CONFLICT,
        ],
    ),
    (
        "5xx",
        30,
        &[
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ],
    ),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DistributionError {
    #[error("distribution has no buckets")]
    NoBuckets,

    #[error("bucket {0:?} has no candidate status codes")]
    EmptyBucket(String),

    #[error("bucket name {0:?} is used more than once")]
    DuplicateBucket(String),

    #[error("bucket weights sum to {total}, expected 100")]
    WeightSum { total: u64 },

    #[error("invalid HTTP status code: {0}")]
    InvalidStatusCode(u16),
}

/// Bucket as written in a config file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BucketConfig {
    /// Label used in logs and metrics (e.g. "4xx")
    pub name: String,
    /// Share of draws out of [`TOTAL_WEIGHT`] that land in this bucket
    pub weight: u32,
    /// Candidate codes, picked uniformly once the bucket is chosen
    pub codes: Vec<u16>,
}

/// A named group of candidate status codes sharing one selection weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    name: String,
    weight: u32,
    codes: Vec<StatusCode>,
}

impl Bucket {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Never empty.
    pub fn codes(&self) -> &[StatusCode] {
        &self.codes
    }
}

/// Ordered set of weighted buckets.
///
/// Weights always sum to [`TOTAL_WEIGHT`] and every bucket holds at least one
/// code; both are checked when the distribution is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    buckets: Vec<Bucket>,
}

impl Distribution {
    pub fn new(buckets: Vec<BucketConfig>) -> Result<Self, DistributionError> {
        if buckets.is_empty() {
            return Err(DistributionError::NoBuckets);
        }

        let mut validated = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            if bucket.codes.is_empty() {
                return Err(DistributionError::EmptyBucket(bucket.name));
            }
            if validated.iter().any(|b: &Bucket| b.name == bucket.name) {
                return Err(DistributionError::DuplicateBucket(bucket.name));
            }

            let codes = bucket
                .codes
                .iter()
                .map(|&code| {
                    StatusCode::from_u16(code).map_err(|_| DistributionError::InvalidStatusCode(code))
                })
                .collect::<Result<Vec<_>, _>>()?;

            validated.push(Bucket {
                name: bucket.name,
                weight: bucket.weight,
                codes,
            });
        }

        let total: u64 = validated.iter().map(|b| u64::from(b.weight)).sum();
        if total != u64::from(TOTAL_WEIGHT) {
            return Err(DistributionError::WeightSum { total });
        }

        Ok(Self { buckets: validated })
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Maps a draw in `[0, TOTAL_WEIGHT)` to its bucket by walking the
    /// cumulative weights in table order.
    pub fn bucket_for(&self, draw: u32) -> &Bucket {
        &self.buckets[self.index_for(draw)]
    }

    /// Position in [`Self::buckets`] of the bucket a draw lands in.
    pub fn index_for(&self, draw: u32) -> usize {
        let mut upper = 0;
        for (index, bucket) in self.buckets.iter().enumerate() {
            upper += bucket.weight;
            if draw < upper {
                return index;
            }
        }

        // Only reachable for out-of-range draws; buckets are never empty.
        self.buckets.len() - 1
    }

    /// Every code any bucket can produce, in table order.
    pub fn codes(&self) -> impl Iterator<Item = StatusCode> + '_ {
        self.buckets.iter().flat_map(|b| b.codes.iter().copied())
    }
}

impl Default for Distribution {
    fn default() -> Self {
        let buckets = DEFAULT_BUCKETS
            .iter()
            .map(|(name, weight, codes)| Bucket {
                name: (*name).to_string(),
                weight: *weight,
                codes: codes.to_vec(),
            })
            .collect();

        Self { buckets }
    }
}
