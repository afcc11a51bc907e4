//! Inbound control signals.

/// Wire form of the stop signal, as carried by the indicator's stop
/// action and by external control messages.
pub const STOP_SIGNAL: &str = "STOP";

/// Commands the tracker accepts from its control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Start or continue tracking.
    Start,
    /// Stop tracking and terminate the hosting process.
    Stop,
}

impl ControlCommand {
    /// Parses an out-of-band control message. `"STOP"` stops; any other
    /// signal means start/continue tracking.
    pub fn parse(signal: &str) -> Self {
        if signal == STOP_SIGNAL {
            ControlCommand::Stop
        } else {
            ControlCommand::Start
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_signal_parses_to_stop() {
        assert_eq!(ControlCommand::parse("STOP"), ControlCommand::Stop);
    }

    #[test]
    fn test_anything_else_means_start() {
        assert_eq!(ControlCommand::parse(""), ControlCommand::Start);
        assert_eq!(ControlCommand::parse("START"), ControlCommand::Start);
        assert_eq!(ControlCommand::parse("stop"), ControlCommand::Start);
    }
}
