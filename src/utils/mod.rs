use std::time::{Duration, Instant};
use tracing::info;

/// Logs when a pipeline stage starts and how long it took.
pub struct Timer {
    stage: String,
    start: Instant,
    reported: bool,
}

impl Timer {
    pub fn start(stage: impl Into<String>) -> Self {
        let stage = stage.into();
        info!("⏱  Starting: {}", stage);
        Self {
            stage,
            start: Instant::now(),
            reported: false,
        }
    }

    /// Log the finish line now and return the elapsed time.
    pub fn stop(mut self) -> Duration {
        self.report()
    }

    fn report(&mut self) -> Duration {
        let took = self.start.elapsed();
        if !self.reported {
            info!("⏱  Finished: {} (took {:.2?})", self.stage, took);
            self.reported = true;
        }
        took
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.report();
    }
}

/// Thousands separators for summary tables: 12345 → "12,345".
pub fn fmt_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let groups: Vec<&str> = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|g| std::str::from_utf8(g).unwrap_or_default())
        .collect();
    let sign = if n < 0 { "-" } else { "" };
    format!("{}{}", sign, groups.join(","))
}
