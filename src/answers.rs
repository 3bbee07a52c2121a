// Bytes echoed back while a command byte is being polled

/// Echoed when the device is ready to serve the polled command.
pub const OPCN3_ANS_READY: u8 = 0xF3;

/// Echoed while the device is busy. The command byte should be resent after a short delay.
pub const OPCN3_ANS_BUSY: u8 = 0x31;

/// Echoed values that indicate a chip-select / wiring problem on the SPI link.
pub const OPCN3_ANS_LINK_FAULTS: [u8; 3] = [0xE6, 0x63, 0x00];

/// Acknowledgement byte returned for an accepted power sub-command.
pub const OPCN3_ANS_POWER_ACCEPTED: u8 = 0x03;

// Power status answer (OPCN3_CMD_READ_POWER_STATUS)

/// Size of the DAC and power status answer.
pub const OPCN3_POWER_STATUS_SIZE: usize = 6;

/// Offset of the fan on/off byte.
pub const OPCN3_POWER_STATUS_FAN: usize = 0;
/// Offset of the laser DAC on/off byte.
pub const OPCN3_POWER_STATUS_LASER: usize = 1;
/// Offset of the fan DAC value.
pub const OPCN3_POWER_STATUS_FAN_DAC: usize = 2;
/// Offset of the laser DAC value.
pub const OPCN3_POWER_STATUS_LASER_DAC: usize = 3;
/// Offset of the laser switch byte.
pub const OPCN3_POWER_STATUS_LASER_SWITCH: usize = 4;
/// Offset of the gain byte (bit 0: high gain, bit 1: auto gain toggle).
pub const OPCN3_POWER_STATUS_GAIN: usize = 5;

/// Gain bit in the gain byte.
pub const OPCN3_POWER_GAIN_BIT: u8 = 0x01;
/// Auto gain toggle bit in the gain byte.
pub const OPCN3_POWER_AUTO_GAIN_BIT: u8 = 0x02;

// PM answer (OPCN3_CMD_READ_PM)

/// Size of the PM answer, checksum included.
pub const OPCN3_PM_FRAME_SIZE: usize = 14;

/// Byte groups clocked out one transfer at a time: PM1, PM2.5, PM10, checksum.
pub const OPCN3_PM_FRAME_GROUPS: [usize; 4] = [4, 4, 4, 2];

// Histogram answer (OPCN3_CMD_READ_HISTOGRAM)

/// Size of the histogram answer, checksum included.
pub const OPCN3_HISTOGRAM_FRAME_SIZE: usize = OPCN3_HIST_CHECKSUM + 2;

/// Number of particle size bins in the histogram.
pub const OPCN3_HISTOGRAM_BINS: usize = 24;

/// Number of mean time-of-flight samples in the histogram.
pub const OPCN3_HISTOGRAM_MTOF: usize = 4;

/// Byte groups clocked out one transfer at a time, in frame order.
///
/// bins, MToF, sampling period, flow rate, temperature, humidity, PM1, PM2.5, PM10,
/// reject glitch, reject long TOF, reject ratio, reject out of range, fan revolutions,
/// laser status, checksum.
pub const OPCN3_HISTOGRAM_FRAME_GROUPS: [usize; 16] =
    [48, 4, 2, 2, 2, 2, 4, 4, 4, 2, 2, 2, 2, 2, 2, 2];

/// Offset of the first bin count.
pub const OPCN3_HIST_BINS: usize = 0;
/// Offset of the first MToF byte.
pub const OPCN3_HIST_MTOF: usize = 48;
/// Offset of the sampling period (hundredths of a second).
pub const OPCN3_HIST_SAMPLING_PERIOD: usize = 52;
/// Offset of the sample flow rate (hundredths of ml/s).
pub const OPCN3_HIST_FLOW_RATE: usize = 54;
/// Offset of the raw temperature.
pub const OPCN3_HIST_TEMPERATURE: usize = 56;
/// Offset of the raw relative humidity.
pub const OPCN3_HIST_HUMIDITY: usize = 58;
/// Offset of the PM1 float.
pub const OPCN3_HIST_PM1: usize = 60;
/// Offset of the PM2.5 float.
pub const OPCN3_HIST_PM2_5: usize = 64;
/// Offset of the PM10 float.
pub const OPCN3_HIST_PM10: usize = 68;
/// Offset of the glitch reject count.
pub const OPCN3_HIST_REJECT_GLITCH: usize = 72;
/// Offset of the long time-of-flight reject count.
pub const OPCN3_HIST_REJECT_LONG_TOF: usize = 74;
/// Offset of the ratio reject count.
pub const OPCN3_HIST_REJECT_RATIO: usize = 76;
/// Offset of the out-of-range reject count.
pub const OPCN3_HIST_REJECT_OUT_OF_RANGE: usize = 78;
/// Offset of the fan revolution count.
pub const OPCN3_HIST_FAN_REV_COUNT: usize = 80;
/// Offset of the laser status.
pub const OPCN3_HIST_LASER_STATUS: usize = 82;
/// Offset of the trailing checksum.
pub const OPCN3_HIST_CHECKSUM: usize = 84;
