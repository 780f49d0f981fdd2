use std::collections::HashMap;
use std::time::Instant;

/// Observer for conversion runs.
///
/// Use cases report progress, per-stage timings and counters here instead
/// of printing, so the CLI and tests can each decide what to do with them.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the frame count is
    /// not known up front.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage (decode, encode, upload, ...) took for
    /// one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. still size in bytes).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger: forwards messages to the `log` crate and prints a stage
/// breakdown once the run finishes.
///
/// Progress lines are throttled to every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames;
        let mut lines = vec![format!(
            "Conversion summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let total: f64 = values.iter().sum();
            lines.push(format!(
                "  {name}: avg {:.1}  total {total:.0}",
                mean(values)
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let rate = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.1} frames/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = self.frames.max(current);
        let at_end = total > 0 && current >= total;
        if current % self.throttle_frames != 0 && !at_end {
            return;
        }
        if total > 0 {
            let pct = current.min(total) as f64 / total as f64 * 100.0;
            log::info!("Converting: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Converting: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("decode", 5.0);
        logger.metric("still_bytes", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values_per_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("encode", 20.0);
        logger.timing("encode", 30.0);
        logger.timing("upload", 5.0);

        assert_eq!(logger.timings_for("encode").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("upload").unwrap(), &[5.0]);
        assert!(logger.timings_for("decode").is_none());
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("still_bytes", 300.0);
        logger.metric("still_bytes", 400.0);

        let values = logger.metrics_for("still_bytes").unwrap();
        assert_relative_eq!(mean(values), 350.0);
    }

    #[test]
    fn test_summary_lists_stages_metrics_and_rate() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(12, 12);
        logger.timing("encode", 20.0);
        logger.timing("upload", 5.0);
        logger.metric("still_bytes", 1024.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Conversion summary (12 frames"));
        assert!(summary.contains("encode"));
        assert!(summary.contains("upload"));
        assert!(summary.contains("still_bytes: avg 1024.0"));
        assert!(summary.contains("frames/s"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_progress_with_unknown_total_counts_frames() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=7 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames, 7);
    }

    #[test]
    fn test_info_keeps_messages() {
        let mut logger = StdoutPipelineLogger::default();
        logger.info("Extracted 4 frames");
        assert_eq!(logger.messages(), &["Extracted 4 frames".to_string()]);
        assert_eq!(logger.throttle_frames, 25);
    }
}
