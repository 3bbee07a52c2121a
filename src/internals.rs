use std::time::Duration;

/// Wall-clock budget for one readiness poll.
pub const OPCN3_DEFAULT_INITIATE_DEADLINE: Duration = Duration::from_secs(10);

/// Delay before resending the command byte after a busy echo (datasheet: > 10 ms).
pub const OPCN3_DEFAULT_BUSY_DELAY: Duration = Duration::from_millis(15);

/// Delay before resending the command byte after an unexpected echo.
pub const OPCN3_DEFAULT_UNEXPECTED_DELAY: Duration = Duration::from_millis(100);

/// Time the device needs to reset its SPI buffer (datasheet: > 2 s).
pub const OPCN3_DEFAULT_RECOVERY_DELAY: Duration = Duration::from_secs(3);

/// Pause after the ready echo before clocking out data (datasheet: > 10 µs).
pub const OPCN3_DEFAULT_READY_SETTLE: Duration = Duration::from_micros(10);

/// Busy or unexpected echoes tolerated before the SPI buffer is reset.
pub const OPCN3_DEFAULT_BUSY_BUDGET: u32 = 20;

/// SPI buffer resets after which a readiness poll gives up.
pub const OPCN3_DEFAULT_RESET_CYCLES: u32 = 2;

/// Pause after a power command so that exchanges are not too close together.
pub const OPCN3_DEFAULT_COMMAND_GAP: Duration = Duration::from_secs(1);

/// Time the fan needs to spin up (datasheet: > 600 ms).
pub const OPCN3_DEFAULT_FAN_SPIN_UP: Duration = Duration::from_millis(600);

/// Pause before re-reading the power status after a wrong acknowledgement.
pub const OPCN3_DEFAULT_ACK_RECHECK_DELAY: Duration = Duration::from_secs(1);

/// Pause between two attempts of a power command.
pub const OPCN3_DEFAULT_POWER_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Attempts of a power command before it is reported as failed.
pub const OPCN3_DEFAULT_POWER_ATTEMPTS: u32 = 3;

/// Pause after reading the power status.
pub const OPCN3_DEFAULT_STATUS_GAP: Duration = Duration::from_millis(500);

/// Pause between two attempts of a frame read.
pub const OPCN3_DEFAULT_FRAME_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Attempts of a frame read before it is reported as failed.
pub const OPCN3_DEFAULT_FRAME_ATTEMPTS: u32 = 3;

/// Accepted difference between requested and reported sampling period.
pub const OPCN3_DEFAULT_SAMPLING_TOLERANCE: Duration = Duration::from_millis(500);

/// Granularity at which cancellable waits check the cancel token.
pub const OPCN3_CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);
