//! Load progress notifications.

use log::info;

/// Receives `(current, total)` line counts as the loader advances.
pub trait ProgressObserver {
    fn on_progress(&mut self, current: u64, total: u64);
}

/// Discards progress notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _current: u64, _total: u64) {}
}

/// Logs progress each time another `step_percent` of the file is done.
#[derive(Debug, Clone)]
pub struct LogProgress {
    step_percent: u64,
    next_percent: u64,
}

impl LogProgress {
    pub fn new(step_percent: u64) -> Self {
        let step_percent = step_percent.clamp(1, 100);
        Self {
            step_percent,
            next_percent: step_percent,
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, current: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = current.saturating_mul(100) / total;
        if percent < self.next_percent {
            return;
        }
        info!("event=load_progress module=loader status=ok current={current} total={total} percent={percent}");
        self.next_percent = (percent / self.step_percent + 1) * self.step_percent;
    }
}

#[cfg(test)]
mod tests {
    use super::{LogProgress, ProgressObserver};

    #[test]
    fn log_progress_advances_threshold_past_current_percent() {
        let mut progress = LogProgress::new(25);
        progress.on_progress(1, 10);
        assert_eq!(progress.next_percent, 25);
        progress.on_progress(6, 10);
        assert_eq!(progress.next_percent, 75);
        progress.on_progress(10, 10);
        assert_eq!(progress.next_percent, 125);
    }

    #[test]
    fn zero_total_is_ignored() {
        let mut progress = LogProgress::default();
        progress.on_progress(3, 0);
        assert_eq!(progress.next_percent, 10);
    }
}
