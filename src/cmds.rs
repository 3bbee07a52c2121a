// Command bytes, repeated while polling for readiness and while clocking data out

/// Command code to control the power state of the fan and the laser.
/// Followed by one of the `OPCN3_POWER_*` sub-commands once the device is ready.
pub const OPCN3_CMD_POWER: u8 = 0x03;

/// Command code to read the DAC and power status (6 bytes, no checksum).
pub const OPCN3_CMD_READ_POWER_STATUS: u8 = 0x13;

/// Command code to read the histogram data and reset the device's histogram (86 bytes).
pub const OPCN3_CMD_READ_HISTOGRAM: u8 = 0x30;

/// Command code to read the PM data (three IEEE-754 floats and a checksum, 14 bytes).
pub const OPCN3_CMD_READ_PM: u8 = 0x32;

/// Command code to set the fan digital potentiometer. Followed by a single data byte.
pub const OPCN3_CMD_SET_FAN_POT: u8 = 0x42;

// Power sub-commands, sent after OPCN3_CMD_POWER has been acknowledged as ready

/// Sub-command to switch the fan off.
pub const OPCN3_POWER_FAN_OFF: u8 = 0x02;

/// Sub-command to switch the fan on.
pub const OPCN3_POWER_FAN_ON: u8 = 0x03;

/// Sub-command to switch the laser off.
pub const OPCN3_POWER_LASER_OFF: u8 = 0x06;

/// Sub-command to switch the laser on.
pub const OPCN3_POWER_LASER_ON: u8 = 0x07;
