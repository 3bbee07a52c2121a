use crate::internals::*;
use std::time::Duration;

/// Timing and retry settings of the OPC-N3 driver.
///
/// The defaults follow the OPC-N3 SPI flow chart. Every field is public so a test bench or a
/// slower bus can tune them; the builder methods cover the settings most commonly changed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Wall-clock budget for one readiness poll. Backstop against miscounted retries.
    pub initiate_deadline: Duration,
    /// Delay before resending the command byte after a busy echo.
    pub busy_delay: Duration,
    /// Delay before resending the command byte after an unexpected echo.
    pub unexpected_delay: Duration,
    /// Time the device needs to reset its SPI buffer, also slept after a link fault.
    pub recovery_delay: Duration,
    /// Pause after the ready echo before data is clocked out.
    pub ready_settle: Duration,
    /// Busy or unexpected echoes tolerated before the SPI buffer is reset.
    pub busy_budget: u32,
    /// SPI buffer resets after which a readiness poll gives up.
    pub reset_cycles: u32,
    /// Pause after each power command.
    pub command_gap: Duration,
    /// Time the fan needs to spin up after it was switched on.
    pub fan_spin_up: Duration,
    /// Pause before re-reading the power status after a wrong acknowledgement.
    pub ack_recheck_delay: Duration,
    /// Pause between two attempts of a power command.
    pub power_retry_delay: Duration,
    /// Attempts of a power command.
    pub power_attempts: u32,
    /// Pause after reading the power status.
    pub status_gap: Duration,
    /// Pause between two attempts of a frame read.
    pub frame_retry_delay: Duration,
    /// Attempts of a frame read.
    pub frame_attempts: u32,
    /// Accepted difference between requested and reported sampling period.
    pub sampling_tolerance: Duration,
}

impl Config {
    /// Sets the wall-clock budget of a readiness poll.
    pub fn initiate_deadline(mut self, deadline: Duration) -> Self {
        self.initiate_deadline = deadline;
        self
    }

    /// Sets the SPI buffer recovery delay.
    pub fn recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Sets the number of attempts for power commands and frame reads.
    ///
    /// # Arguments
    ///
    /// * `power` - Attempts of a fan or laser command.
    /// * `frame` - Attempts of a checksum-verified frame read.
    pub fn attempts(mut self, power: u32, frame: u32) -> Self {
        self.power_attempts = power;
        self.frame_attempts = frame;
        self
    }

    /// Sets the accepted sampling period discrepancy.
    pub fn sampling_tolerance(mut self, tolerance: Duration) -> Self {
        self.sampling_tolerance = tolerance;
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            initiate_deadline: OPCN3_DEFAULT_INITIATE_DEADLINE,
            busy_delay: OPCN3_DEFAULT_BUSY_DELAY,
            unexpected_delay: OPCN3_DEFAULT_UNEXPECTED_DELAY,
            recovery_delay: OPCN3_DEFAULT_RECOVERY_DELAY,
            ready_settle: OPCN3_DEFAULT_READY_SETTLE,
            busy_budget: OPCN3_DEFAULT_BUSY_BUDGET,
            reset_cycles: OPCN3_DEFAULT_RESET_CYCLES,
            command_gap: OPCN3_DEFAULT_COMMAND_GAP,
            fan_spin_up: OPCN3_DEFAULT_FAN_SPIN_UP,
            ack_recheck_delay: OPCN3_DEFAULT_ACK_RECHECK_DELAY,
            power_retry_delay: OPCN3_DEFAULT_POWER_RETRY_DELAY,
            power_attempts: OPCN3_DEFAULT_POWER_ATTEMPTS,
            status_gap: OPCN3_DEFAULT_STATUS_GAP,
            frame_retry_delay: OPCN3_DEFAULT_FRAME_RETRY_DELAY,
            frame_attempts: OPCN3_DEFAULT_FRAME_ATTEMPTS,
            sampling_tolerance: OPCN3_DEFAULT_SAMPLING_TOLERANCE,
        }
    }
}
