//! Minimal CPU burner accepting the `stress-ng` flags the service emits.
//!
//! `cpu-stresser --stress-bin cpu-burn` runs on hosts without stress-ng.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cpu-burn")]
#[command(about = "Spin CPU workers for a fixed duration")]
struct Args {
    /// Number of workers, 0 means one per logical CPU
    #[arg(long, default_value = "1")]
    cpu: usize,

    /// Run time: plain seconds or with an s/m/h suffix
    #[arg(long, default_value = "10s", value_parser = parse_timeout)]
    timeout: Duration,

    /// Print the number of completed rounds per worker on exit
    #[arg(long)]
    metrics_brief: bool,
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let (digits, scale) = match raw.chars().last() {
        Some('s') => (&raw[..raw.len() - 1], 1),
        Some('m') => (&raw[..raw.len() - 1], 60),
        Some('h') => (&raw[..raw.len() - 1], 3600),
        _ => (raw, 1),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid timeout: {}", raw))?;
    Ok(Duration::from_secs(value * scale))
}

fn stress_cpu(threads: usize, duration: Duration) -> Vec<u64> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    let stop_thread = thread::spawn(move || {
        thread::sleep(duration);
        running_clone.store(false, Ordering::SeqCst);
    });

    let mut handles = vec![];

    for _ in 0..threads {
        let running = Arc::clone(&running);
        let rounds = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&rounds);
        let handle = thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let _ = (0..1_000_000).fold(0u64, |acc, x| acc.wrapping_add(x));
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });
        handles.push((handle, rounds));
    }

    let mut totals = Vec::with_capacity(handles.len());
    for (handle, rounds) in handles {
        let _ = handle.join();
        totals.push(rounds.load(Ordering::Relaxed));
    }
    let _ = stop_thread.join();
    totals
}

fn main() {
    let args = Args::parse();
    let workers = if args.cpu == 0 { num_cpus::get() } else { args.cpu };

    let start = Instant::now();
    let totals = stress_cpu(workers, args.timeout);

    if args.metrics_brief {
        for (worker, rounds) in totals.iter().enumerate() {
            println!("cpu-burn: worker {} completed {} rounds", worker, rounds);
        }
        println!(
            "cpu-burn: {} workers ran for {:.2}s",
            workers,
            start.elapsed().as_secs_f64()
        );
    }
}
