use crate::distribution::{Bucket, Distribution, TOTAL_WEIGHT};
use crate::random::{RandomSource, ThreadRngSource};
use http::StatusCode;
use std::sync::Arc;

/// Result of one draw: the chosen bucket (with its table position) and the
/// code picked from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw<'a> {
    pub bucket: &'a Bucket,
    pub bucket_index: usize,
    pub code: StatusCode,
}

/// Picks status codes from a weighted [`Distribution`].
///
/// Holds no per-call state, so one instance can be cloned into every request
/// task. Each call consumes exactly two values from the random source: one
/// over `[0, TOTAL_WEIGHT)` for the bucket and one over the bucket's size for
/// the code.
#[derive(Clone)]
pub struct StatusCodeGenerator {
    distribution: Arc<Distribution>,
    source: Arc<dyn RandomSource>,
}

impl StatusCodeGenerator {
    pub fn new(distribution: Distribution, source: Arc<dyn RandomSource>) -> Self {
        Self {
            distribution: Arc::new(distribution),
            source,
        }
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn draw(&self) -> Draw<'_> {
        let bucket_index = self.distribution.index_for(self.source.below(TOTAL_WEIGHT));
        let bucket = &self.distribution.buckets()[bucket_index];
        let codes = bucket.codes();
        let index = self.source.below(codes.len() as u32) as usize;

        Draw {
            bucket,
            bucket_index,
            code: codes[index],
        }
    }

    pub fn generate(&self) -> StatusCode {
        self.draw().code
    }
}

impl Default for StatusCodeGenerator {
    fn default() -> Self {
        Self::new(Distribution::default(), Arc::new(ThreadRngSource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedSource, SeededSource};

    const ALL_CODES: [u16; 8] = [200, 201, 204, 400, 404, 409, 500, 503];

    fn scripted(values: &[u32]) -> StatusCodeGenerator {
        StatusCodeGenerator::new(
            Distribution::default(),
            Arc::new(ScriptedSource::new(values.to_vec())),
        )
    }

    #[test]
    fn test_scripted_sequences() {
        let cases = [
            ([0, 0], 200),
            ([29, 2], 204),
            ([30, 0], 400),
            ([69, 2], 409),
            ([70, 0], 500),
            ([99, 1], 503),
        ];

        for (script, expected) in cases {
            let generator = scripted(&script);
            assert_eq!(
                generator.generate().as_u16(),
                expected,
                "script {script:?}"
            );
        }
    }

    #[test]
    fn test_every_draw_maps_into_its_bucket() {
        for p in 0..TOTAL_WEIGHT {
            let expected: &[u16] = match p {
                0..30 => &[200, 201, 204],
                30..70 => &[400, 404, 409],
                _ => &[500, 503],
            };

            for secondary in 0..3 {
                let code = scripted(&[p, secondary]).generate().as_u16();
                assert!(expected.contains(&code), "p={p} produced {code}");
                assert!(ALL_CODES.contains(&code));
            }
        }
    }

    #[test]
    fn test_constant_source() {
        let zeros = StatusCodeGenerator::new(
            Distribution::default(),
            Arc::new(ScriptedSource::constant(0)),
        );
        for _ in 0..10 {
            assert_eq!(zeros.generate(), StatusCode::OK);
        }

        let nineties = StatusCodeGenerator::new(
            Distribution::default(),
            Arc::new(ScriptedSource::constant(99)),
        );
        for _ in 0..10 {
            let draw = nineties.draw();
            assert_eq!(draw.bucket.name(), "5xx");
            assert_eq!(draw.bucket_index, 2);
            // 99 % 2 picks the second candidate
            assert_eq!(draw.code, StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    #[test]
    fn test_bucket_frequencies_converge() {
        let generator =
            StatusCodeGenerator::new(Distribution::default(), Arc::new(SeededSource::new(42)));
        let samples = 100_000;
        let mut counts = [0u32; 3];

        for _ in 0..samples {
            let code = generator.generate().as_u16();
            assert!(ALL_CODES.contains(&code));
            match code / 100 {
                2 => counts[0] += 1,
                4 => counts[1] += 1,
                5 => counts[2] += 1,
                other => panic!("unexpected class {other}xx"),
            }
        }

        // Within 2 percentage points of 30/40/30
        for (count, expected) in counts.into_iter().zip([30.0, 40.0, 30.0]) {
            let pct = f64::from(count) * 100.0 / f64::from(samples);
            assert!(
                (pct - expected).abs() < 2.0,
                "expected ~{expected}%, got {pct:.2}%"
            );
        }
    }

    #[test]
    fn test_default_generator_uses_default_table() {
        let generator = StatusCodeGenerator::default();
        assert_eq!(generator.distribution(), &Distribution::default());

        for _ in 0..1000 {
            assert!(ALL_CODES.contains(&generator.generate().as_u16()));
        }
    }

    #[test]
    fn test_concurrent_use() {
        let generator = StatusCodeGenerator::default();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    (0..1000)
                        .map(|_| generator.generate().as_u16())
                        .all(|code| ALL_CODES.contains(&code))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
