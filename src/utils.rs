/// Full scale of the 16-bit temperature and humidity readings.
const RAW_FULL_SCALE: f32 = 65535.0;

/// Converts the raw board temperature to °C (-45 °C at 0, +130 °C at full scale).
#[inline]
pub fn temperature_from_raw(raw: u16) -> f32 {
    -45.0 + 175.0 * (raw as f32 / RAW_FULL_SCALE)
}

/// Converts the raw board relative humidity to % (0 % at 0, 100 % at full scale).
#[inline]
pub fn humidity_from_raw(raw: u16) -> f32 {
    100.0 * (raw as f32 / RAW_FULL_SCALE)
}

/// Converts a value reported in hundredths (sampling period, flow rate).
#[inline]
pub fn from_hundredths(raw: u16) -> f32 {
    raw as f32 / 100.0
}

/// Maps a percentage (0-100) onto the 8-bit potentiometer range.
///
/// Returns `None` above 100 %.
pub fn percent_to_dac(percent: u8) -> Option<u8> {
    if percent > 100 {
        return None;
    }
    Some(((percent as u16 * 255 + 50) / 100) as u8)
}

/// Maps an 8-bit potentiometer value onto a percentage.
#[inline]
pub fn dac_to_percent(dac: u8) -> f32 {
    dac as f32 * 100.0 / 255.0
}
