use std::hint::black_box;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::Rng;
use rust_decimal::Decimal;

use super::{BenchmarkCase, Suite};
use crate::dataset::Workspace;
use crate::harness::Mode;
use crate::registry::benchmark_id;

pub const SUITE: Suite = Suite {
    name: "NumberBenchmarks",
    category: "NUMBERS",
    context: "Number arithmetic",
    build,
};

/// Random decimal in `[0, 1)`, kept at full binary precision.
fn random_decimal<R: Rng>(rng: &mut R) -> Decimal {
    Decimal::from_f64_retain(rng.gen::<f64>()).unwrap_or_default()
}

fn build(_ws: &Workspace) -> io::Result<Vec<BenchmarkCase>> {
    let id = |method| benchmark_id(SUITE.name, method);
    let atomic = Arc::new(AtomicU64::new(0));

    Ok(vec![
        BenchmarkCase::new(
            id("generateAndAddDoubleNumbers"),
            Mode::Throughput,
            "Generate two random doubles and add them",
            || {
                let mut rng = rand::thread_rng();
                let sum = rng.gen::<f64>() + rng.gen::<f64>();
                black_box(sum);
                Ok(())
            },
        ),
        BenchmarkCase::new(
            id("generateAndAddAtomicNumbers"),
            Mode::Throughput,
            "Generate a random integer and add it to a shared atomic counter",
            move || {
                let n = rand::thread_rng().gen_range(0..1_000u64);
                black_box(atomic.fetch_add(n, Ordering::Relaxed));
                Ok(())
            },
        ),
        BenchmarkCase::new(
            id("generateAndAddBigDecimalNumbers"),
            Mode::Throughput,
            "Generate two random arbitrary-precision decimals and add them",
            || {
                let mut rng = rand::thread_rng();
                let a = random_decimal(&mut rng);
                let b = random_decimal(&mut rng);
                let sum = a
                    .checked_add(b)
                    .ok_or_else(|| io::Error::other("decimal overflow"))?;
                black_box(sum);
                Ok(())
            },
        ),
        BenchmarkCase::new(
            id("generateAndLogarithmDoubleNumbers"),
            Mode::Throughput,
            "Generate a random double and take its natural logarithm",
            || {
                let v: f64 = rand::thread_rng().gen_range(1.0..1_000_000.0);
                black_box(v.ln());
                Ok(())
            },
        ),
        BenchmarkCase::new(
            id("generateAndPowerDoubleNumbers"),
            Mode::Throughput,
            "Generate two random doubles and raise one to the power of the other",
            || {
                let mut rng = rand::thread_rng();
                let base: f64 = rng.gen_range(0.0..100.0);
                let exp: f64 = rng.gen_range(0.0..10.0);
                black_box(base.powf(exp));
                Ok(())
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_decimals_keep_fraction_digits() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..100 {
            let d = random_decimal(&mut rng);
            assert!(d >= Decimal::ZERO && d < Decimal::ONE, "{d}");
        }

        let a = Decimal::from_f64_retain(0.1).unwrap();
        let b = Decimal::from_f64_retain(0.2).unwrap();
        let sum = a.checked_add(b).unwrap();
        // Exact decimal addition of the binary values, no f64 rounding.
        assert_ne!(sum, Decimal::from_f64_retain(0.1 + 0.2).unwrap());
        assert!(sum.scale() > 15);
    }

    #[test]
    fn every_case_runs() {
        let ws = Workspace::create(0).unwrap();
        let cases = build(&ws).unwrap();
        assert_eq!(cases.len(), 5);
        for case in &cases {
            assert_eq!(case.mode, Mode::Throughput);
            (case.op)().unwrap();
        }
    }
}
