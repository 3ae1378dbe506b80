//! Benchmark driver: cycles-per-tuple and observed false-positive rate for
//! every filter variant.
//!
//! ```text
//! filter-bench [<log2_num_keys> <bits_per_key> <log2_num_lookups>]
//! ```
//!
//! With no arguments the defaults are `12 12 20`: 4096 keys, 12 bits per
//! key, about one million lookups. Build keys are `0..n`, probe keys are
//! `n..2n` (so every probe hit is a false positive), and both sets pass
//! through the batch mixer before touching a filter; mixing time is
//! charged to the operation, exactly as a join pipeline would pay it.

use blockbloom::hash;
use blockbloom::util::cycles::CycleCounter;
use blockbloom::{
    BlockedFilter, CacheSectorized32, CacheSectorized64, MaskBlocked32, MaskBlocked64,
    RegisterBlocked32, RegisterBlocked64, SimdGatherBlocked, TwoWordBlocked,
};
use std::process::ExitCode;

/// Parsed driver parameters.
struct BenchConfig {
    log2_num_keys: u32,
    bits_per_key: u32,
    log2_num_lookups: u32,
}

impl BenchConfig {
    const DEFAULT: BenchConfig = BenchConfig {
        log2_num_keys: 12,
        bits_per_key: 12,
        log2_num_lookups: 20,
    };
}

const USAGE: &str = "usage: filter-bench [<log2_num_keys> <bits_per_key> <log2_num_lookups>]";

fn parse_field(arg: &str, name: &str, max: u32) -> Result<u32, String> {
    let value: u32 = arg
        .parse()
        .map_err(|_| format!("invalid {name} {arg:?}: expected a non-negative integer\n{USAGE}"))?;
    if value == 0 || value > max {
        return Err(format!("invalid {name} {value}: must be in 1..={max}\n{USAGE}"));
    }
    Ok(value)
}

fn parse_args(args: &[String]) -> Result<BenchConfig, String> {
    match args {
        [] => Ok(BenchConfig::DEFAULT),
        [keys, bits, lookups] => Ok(BenchConfig {
            log2_num_keys: parse_field(keys, "log2_num_keys", 28)?,
            bits_per_key: parse_field(bits, "bits_per_key", 64)?,
            log2_num_lookups: parse_field(lookups, "log2_num_lookups", 32)?,
        }),
        _ => Err(format!("expected zero or three arguments, got {}\n{USAGE}", args.len())),
    }
}

/// Key widths the driver can mix a `u64` stream into.
trait BenchKey: Copy + Default {
    fn mix_batch(src: &[u64], dst: &mut [Self]);
}

impl BenchKey for u64 {
    fn mix_batch(src: &[u64], dst: &mut [u64]) {
        hash::mix64_batch(src, dst);
    }
}

impl BenchKey for u32 {
    fn mix_batch(src: &[u64], dst: &mut [u32]) {
        hash::mix32_batch(src, dst);
    }
}

/// Build, probe, and report one variant.
fn run_variant<F>(cfg: &BenchConfig, keys: &[u64], probe_keys: &[u64]) -> Result<(), blockbloom::FilterError>
where
    F: BlockedFilter,
    F::Key: BenchKey,
{
    let num_keys = keys.len();
    let mut filter = F::with_params(num_keys, cfg.bits_per_key)?;
    let mut hashes = vec![F::Key::default(); num_keys];

    // Insert, mixing included.
    let start = CycleCounter::now();
    F::Key::mix_batch(keys, &mut hashes);
    filter.insert(&hashes);
    let end = CycleCounter::now();
    let insert_cpt = (end - start) as f64 / num_keys as f64;

    // Lookup, repeated until the requested probe volume is reached.
    let num_lookups = 1u64 << cfg.log2_num_lookups;
    let repeats = (num_lookups / num_keys as u64).max(1);
    let mut out = vec![0u32; num_keys];
    let start = CycleCounter::now();
    for _ in 0..repeats {
        F::Key::mix_batch(probe_keys, &mut hashes);
        filter.lookup(&hashes, &mut out);
    }
    let end = CycleCounter::now();
    let lookup_cpt = (end - start) as f64 / (repeats * num_keys as u64) as f64;

    // Probe keys are disjoint from build keys, so every hit is false.
    let false_positives = out.iter().filter(|&&v| v != 0).count();
    let fp_rate = false_positives as f64 / num_keys as f64;

    println!("[{}]", F::NAME);
    println!("Insert took {insert_cpt} cycles per tuple");
    println!("Lookup took {lookup_cpt} cycles per tuple");
    println!("False-positive rate ~ {fp_rate}");
    println!();
    Ok(())
}

fn run(cfg: &BenchConfig) -> Result<(), blockbloom::FilterError> {
    let num_keys = 1usize << cfg.log2_num_keys;
    let keys: Vec<u64> = (0..num_keys as u64).collect();
    let probe_keys: Vec<u64> = (num_keys as u64..2 * num_keys as u64).collect();

    println!("Number of keys: {num_keys}");
    println!();

    run_variant::<RegisterBlocked32>(cfg, &keys, &probe_keys)?;
    run_variant::<MaskBlocked32>(cfg, &keys, &probe_keys)?;
    run_variant::<RegisterBlocked64>(cfg, &keys, &probe_keys)?;
    run_variant::<MaskBlocked64>(cfg, &keys, &probe_keys)?;
    run_variant::<TwoWordBlocked>(cfg, &keys, &probe_keys)?;
    run_variant::<CacheSectorized32>(cfg, &keys, &probe_keys)?;
    run_variant::<CacheSectorized64>(cfg, &keys, &probe_keys)?;
    run_variant::<SimdGatherBlocked>(cfg, &keys, &probe_keys)?;
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = match parse_args(&args) {
        Ok(cfg) => cfg,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&cfg) {
        eprintln!("benchmark failed: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_defaults_with_no_args() {
        let cfg = parse_args(&[]).unwrap();
        assert_eq!(cfg.log2_num_keys, 12);
        assert_eq!(cfg.bits_per_key, 12);
        assert_eq!(cfg.log2_num_lookups, 20);
    }

    #[test]
    fn test_three_positional_args() {
        let cfg = parse_args(&args(&["14", "16", "24"])).unwrap();
        assert_eq!(cfg.log2_num_keys, 14);
        assert_eq!(cfg.bits_per_key, 16);
        assert_eq!(cfg.log2_num_lookups, 24);
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!(parse_args(&args(&["14"])).is_err());
        assert!(parse_args(&args(&["14", "16"])).is_err());
        assert!(parse_args(&args(&["14", "16", "24", "1"])).is_err());
    }

    #[test]
    fn test_garbage_values_are_rejected() {
        assert!(parse_args(&args(&["x", "16", "24"])).is_err());
        assert!(parse_args(&args(&["14", "-3", "24"])).is_err());
        assert!(parse_args(&args(&["14", "0", "24"])).is_err());
        assert!(parse_args(&args(&["64", "16", "24"])).is_err());
    }
}
