/// Lifecycle of one playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Loading,
    ReadyPaused,
    ReadyPlaying,
    Error,
    /// Terminal for the session until the subscription leaves `Pending`
    TrialEnded,
}

impl RuntimeState {
    pub fn is_ready(&self) -> bool {
        matches!(self, RuntimeState::ReadyPaused | RuntimeState::ReadyPlaying)
    }
}

/// Remaining free-trial time for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCountdown {
    pub remaining: u32,
    pub running: bool,
}

impl TrialCountdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining: duration_secs,
            running: false,
        }
    }

    /// Take one second off. Returns true when this tick reached zero.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.running = false;
            return true;
        }
        false
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// `m:ss`, as shown in the trial banner
pub fn format_trial_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_trial_time() {
        assert_eq!(format_trial_time(120), "2:00");
        assert_eq!(format_trial_time(119), "1:59");
        assert_eq!(format_trial_time(65), "1:05");
        assert_eq!(format_trial_time(9), "0:09");
        assert_eq!(format_trial_time(0), "0:00");
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut countdown = TrialCountdown::new(2);
        assert!(!countdown.tick());
        assert_eq!(countdown.remaining, 2);

        countdown.running = true;
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert_eq!(countdown.remaining, 0);
        assert!(!countdown.running);

        // Exhausted countdown never wraps
        countdown.running = true;
        assert!(!countdown.tick());
        assert_eq!(countdown.remaining, 0);
    }
}
