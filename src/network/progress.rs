//! Per-file progress reporting of the network stages.
//!
//! The overlap scan and the dataset assembler both walk the sorted file list once, and
//! decoding one file dominates each step. [`FileProgress`] reports those steps with the
//! duration of the last one and a smoothed average, which is what an ETA needs when a
//! few files are much larger than the others.
//!
//! Components
//! -----------------
//! * [`StepTimer`] – wall time of each step, smoothed by an exponential moving average.
//! * [`StepTiming`] – what a [`StepTimer::tick`] returns, displayed as `"last: 42ms, avg: 40ms"`.
//! * [`fmt_dur`] – compact [`Duration`] formatting (`"253µs"`, `"42ms"`, `"3.14s"`).
//! * [`FileProgress`] – one step per processed file.
//!
//! Usage
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use eddynet::network::progress::FileProgress;
//!
//! let files = [Utf8Path::new("Anticyclonic_20200101.parquet")];
//! let mut progress = FileProgress::new("scan", files.len());
//! for file in files {
//!     // ... load and compare `file` ...
//!     progress.step(file);
//! }
//! progress.finish();
//! ```
//!
//! Reporting
//! -----------------
//! Progress is reported only when the `INFO` level is enabled for this crate. With the
//! `progress` feature it is rendered as an `indicatif` bar, without it each step is an
//! `info!` event carrying the stage, the file name and the timings.
//!
//! Smoothing
//! -----------------
//! * `avg ← α·last + (1–α)·avg`, with `α` clamped to `(0, 1]`.
//! * `α = 1` keeps the last step only, a small `α` follows slow trends.
//! * The first tick sets the average to the first step.
use std::fmt;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use tracing::{info, Level};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Smoothing factor of the per-file average.
const STEP_ALPHA: f64 = 0.2;

/// Duration of the last step and smoothed average of all the steps so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTiming {
    pub last: Duration,
    pub avg: Duration,
}

impl fmt::Display for StepTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "last: {}, avg: {}", fmt_dur(self.last), fmt_dur(self.avg))
    }
}

/// Wall time between consecutive [`tick`](StepTimer::tick)s.
#[derive(Debug, Clone)]
pub struct StepTimer {
    start: Instant,
    avg_ns: Option<f64>,
    alpha: f64,
    steps: u64,
}

impl StepTimer {
    /// `alpha` outside `(0, 1]` (or NaN) falls back to `1`, i.e. no smoothing.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha > 0.0 && alpha <= 1.0 { alpha } else { 1.0 };
        StepTimer {
            start: Instant::now(),
            avg_ns: None,
            alpha,
            steps: 0,
        }
    }

    /// Close the current step and start the next one.
    pub fn tick(&mut self) -> StepTiming {
        let now = Instant::now();
        let last = now.duration_since(self.start);
        self.start = now;
        self.steps += 1;

        let last_ns = last.as_nanos() as f64;
        let avg_ns = match self.avg_ns {
            None => last_ns,
            Some(avg) => self.alpha * last_ns + (1.0 - self.alpha) * avg,
        };
        self.avg_ns = Some(avg_ns);

        StepTiming {
            last,
            avg: Duration::from_nanos(avg_ns as u64),
        }
    }

    /// Smoothed step duration, zero before the first tick.
    pub fn avg(&self) -> Duration {
        Duration::from_nanos(self.avg_ns.unwrap_or(0.0) as u64)
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// `µs` below a millisecond, `ms` below a second, seconds with two decimals above.
pub fn fmt_dur(d: Duration) -> String {
    match d.as_micros() {
        us if us < 1_000 => format!("{us}µs"),
        us if us < 1_000_000 => format!("{}ms", us / 1_000),
        _ => format!("{:.2}s", d.as_secs_f64()),
    }
}

/// Progress of one stage over the file list.
pub struct FileProgress {
    stage: &'static str,
    total: usize,
    enabled: bool,
    timer: StepTimer,
    #[cfg(feature = "progress")]
    bar: Option<ProgressBar>,
}

impl FileProgress {
    pub fn new(stage: &'static str, total: usize) -> Self {
        let enabled = tracing::enabled!(Level::INFO);

        #[cfg(feature = "progress")]
        let bar = enabled.then(|| {
            let pb = ProgressBar::new(total.max(1) as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "{prefix} {bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) \
                 | ETA {eta_precise} | {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.set_prefix(stage);
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        });

        FileProgress {
            stage,
            total,
            enabled,
            timer: StepTimer::new(STEP_ALPHA),
            #[cfg(feature = "progress")]
            bar,
        }
    }

    /// Record that `file` has been processed.
    pub fn step(&mut self, file: &Utf8Path) {
        let timing = self.timer.tick();
        if !self.enabled {
            return;
        }

        #[cfg(feature = "progress")]
        if let Some(pb) = &self.bar {
            pb.set_message(format!("{file} | {timing}"));
            pb.inc(1);
            return;
        }

        info!(
            "{} {}/{} {file} ({timing})",
            self.stage,
            self.timer.steps(),
            self.total
        );
    }

    pub fn finish(self) {
        #[cfg(feature = "progress")]
        if let Some(pb) = self.bar {
            pb.finish_and_clear();
        }
    }
}
