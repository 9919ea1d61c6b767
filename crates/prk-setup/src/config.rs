use std::time::Duration;

/// Sequencer timing knobs.
///
/// The settle delay replaces the hard-coded inter-step sleep the setup
/// flow needs: a fullscreen toggle or permission prompt visually disrupts
/// the next prompt if steps run back-to-back, so the sequencer waits this
/// long after each step resolves before advancing. Tests run with
/// [`SetupConfig::immediate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupConfig {
    /// Pause after each step resolves before the next step starts.
    pub settle_delay: Duration,

    /// Upper bound on any single capability prompt/probe. `None` preserves
    /// the browser's behavior of waiting on the user indefinitely; `Some`
    /// converts an expired prompt into a `Timeout` step failure, handled
    /// exactly like a denial of that step.
    pub prompt_timeout: Option<Duration>,
}

impl SetupConfig {
    pub fn sane_defaults() -> Self {
        Self {
            settle_delay: Duration::from_millis(750),
            prompt_timeout: None,
        }
    }

    /// Zero settle delay, no timeout. For tests and headless probes.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            prompt_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_wait_indefinitely_on_prompts() {
        let cfg = SetupConfig::sane_defaults();
        assert!(cfg.prompt_timeout.is_none());
        assert!(cfg.settle_delay > Duration::ZERO);
    }

    #[test]
    fn immediate_has_zero_settle() {
        assert_eq!(SetupConfig::immediate().settle_delay, Duration::ZERO);
    }
}
