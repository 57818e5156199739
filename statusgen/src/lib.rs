//! Weighted HTTP status code generation.
//!
//! A [`StatusCodeGenerator`] picks a bucket from a [`Distribution`] using a
//! uniform draw over `[0, 100)`, then picks one code uniformly from that
//! bucket. Randomness comes from an injected [`RandomSource`] so callers can
//! choose between per-thread streams, a seeded stream, or a scripted one.

pub mod distribution;
pub mod generator;
pub mod random;

pub use distribution::{Bucket, BucketConfig, Distribution, DistributionError, TOTAL_WEIGHT};
pub use generator::{Draw, StatusCodeGenerator};
pub use random::{RandomSource, ScriptedSource, SeededSource, ThreadRngSource};
