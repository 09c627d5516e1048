use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

const FPS_WINDOW: Duration = Duration::from_secs(1);
const LOG_INTERVAL: Duration = Duration::from_secs(2);

/// Rendered-results-per-second over a sliding one second window.
pub struct FpsMeter {
    ticks: VecDeque<Instant>,
    last_log: Option<Instant>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            ticks: VecDeque::new(),
            last_log: None,
        }
    }

    pub fn tick(&mut self, now: Instant) -> f32 {
        self.ticks.push_back(now);
        while let Some(front) = self.ticks.front() {
            if now.duration_since(*front) > FPS_WINDOW {
                self.ticks.pop_front();
            } else {
                break;
            }
        }

        let fps = self.fps();
        let due = self
            .last_log
            .is_none_or(|last| now.duration_since(last) >= LOG_INTERVAL);
        if due {
            log::debug!("overlay rate {fps:.1} fps");
            self.last_log = Some(now);
        }
        fps
    }

    pub fn fps(&self) -> f32 {
        match (self.ticks.front(), self.ticks.back()) {
            (Some(first), Some(last)) if self.ticks.len() > 1 => {
                let span = last.duration_since(*first).as_secs_f32();
                if span > 0.0 {
                    (self.ticks.len() - 1) as f32 / span
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_ticks_report_their_rate() {
        let mut meter = FpsMeter::new();
        let start = Instant::now();
        let mut fps = 0.0;
        for i in 0..=30 {
            fps = meter.tick(start + Duration::from_millis(i * 40));
        }
        assert!((fps - 25.0).abs() < 0.5, "fps was {fps}");
    }

    #[test]
    fn single_tick_is_zero() {
        let mut meter = FpsMeter::new();
        assert_eq!(meter.tick(Instant::now()), 0.0);
    }

    #[test]
    fn old_ticks_leave_the_window() {
        let mut meter = FpsMeter::new();
        let start = Instant::now();
        meter.tick(start);
        meter.tick(start + Duration::from_millis(10));
        meter.tick(start + Duration::from_secs(5));
        assert_eq!(meter.fps(), 0.0);
    }
}
