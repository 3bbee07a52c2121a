use crate::answers::*;
use crate::base::Error;
use std::fmt;

/// Interpretation of the byte echoed back while a command byte is polled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// The device is ready to serve the command.
    Ready,
    /// The device is busy, the command byte should be resent.
    Busy,
    /// A chip-select / wiring problem. Contains the echoed byte.
    LinkFault(u8),
    /// Any other byte.
    Unexpected(u8),
}

impl LinkStatus {
    pub fn from_byte(byte: u8) -> LinkStatus {
        match byte {
            OPCN3_ANS_READY => LinkStatus::Ready,
            OPCN3_ANS_BUSY => LinkStatus::Busy,
            b if OPCN3_ANS_LINK_FAULTS.contains(&b) => LinkStatus::LinkFault(b),
            b => LinkStatus::Unexpected(b),
        }
    }
}

/// An independently switchable subsystem of the sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PowerDomain {
    Fan,
    Laser,
}

impl fmt::Display for PowerDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerDomain::Fan => write!(f, "fan"),
            PowerDomain::Laser => write!(f, "laser"),
        }
    }
}

/// Last known state of a power domain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PowerState {
    Off,
    On,
    /// Never set, or a command failed and the physical state could not be confirmed.
    #[default]
    Unknown,
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

/// Selects one field of the DAC and power status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PowerField {
    Fan,
    Laser,
    FanDac,
    LaserDac,
    LaserSwitch,
    Gain,
    AutoGainToggle,
}

/// DAC and power status read back from the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PowerStatus {
    /// Fan power switch.
    pub fan_on: bool,
    /// Laser DAC power switch.
    pub laser_dac_on: bool,
    /// Fan potentiometer value (0-255).
    pub fan_dac: u8,
    /// Laser potentiometer value (0-255).
    pub laser_dac: u8,
    /// Laser switch.
    pub laser_switch: bool,
    /// High gain selected.
    pub gain: bool,
    /// Automatic gain switching enabled.
    pub auto_gain: bool,
}

impl PowerStatus {
    /// Decodes the 6-byte status answer.
    pub fn from_bytes(raw: &[u8; OPCN3_POWER_STATUS_SIZE]) -> PowerStatus {
        let gain = raw[OPCN3_POWER_STATUS_GAIN];
        PowerStatus {
            fan_on: raw[OPCN3_POWER_STATUS_FAN] != 0,
            laser_dac_on: raw[OPCN3_POWER_STATUS_LASER] != 0,
            fan_dac: raw[OPCN3_POWER_STATUS_FAN_DAC],
            laser_dac: raw[OPCN3_POWER_STATUS_LASER_DAC],
            laser_switch: raw[OPCN3_POWER_STATUS_LASER_SWITCH] != 0,
            gain: gain & OPCN3_POWER_GAIN_BIT != 0,
            auto_gain: gain & OPCN3_POWER_AUTO_GAIN_BIT != 0,
        }
    }

    /// Returns whether `domain` is reported on.
    pub fn is_on(&self, domain: PowerDomain) -> bool {
        match domain {
            PowerDomain::Fan => self.fan_on,
            PowerDomain::Laser => self.laser_dac_on,
        }
    }

    /// Returns a single field as a number: switches as 0/1, DACs as their raw value.
    pub fn get(&self, field: PowerField) -> u8 {
        match field {
            PowerField::Fan => self.fan_on as u8,
            PowerField::Laser => self.laser_dac_on as u8,
            PowerField::FanDac => self.fan_dac,
            PowerField::LaserDac => self.laser_dac,
            PowerField::LaserSwitch => self.laser_switch as u8,
            PowerField::Gain => self.gain as u8,
            PowerField::AutoGainToggle => self.auto_gain as u8,
        }
    }

    /// Fan speed in percent of the potentiometer range.
    pub fn fan_speed_percent(&self) -> f32 {
        crate::utils::dac_to_percent(self.fan_dac)
    }

    /// Laser power in percent of the potentiometer range.
    pub fn laser_power_percent(&self) -> f32 {
        crate::utils::dac_to_percent(self.laser_dac)
    }
}

/// Mass concentrations in µg/m³.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MassConcentrations {
    pub pm1: f32,
    pub pm2_5: f32,
    pub pm10: f32,
}

/// The full diagnostic histogram frame, converted to physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Particle counts per size bin.
    pub bins: [u16; OPCN3_HISTOGRAM_BINS],
    /// Mean time of flight for bins 1, 3, 5 and 7 (raw, 1/3 µs units).
    pub mtof: [u8; OPCN3_HISTOGRAM_MTOF],
    /// Actual sampling period in seconds.
    pub sampling_period: f32,
    /// Sample flow rate in ml/s.
    pub flow_rate: f32,
    /// Board temperature in °C.
    pub temperature: f32,
    /// Board relative humidity in %.
    pub relative_humidity: f32,
    pub mass: MassConcentrations,
    pub reject_glitch: u16,
    pub reject_long_tof: u16,
    pub reject_ratio: u16,
    pub reject_out_of_range: u16,
    pub fan_rev_count: u16,
    pub laser_status: u16,
}

/// Number of fields in a flattened `DiagnosticFrame`.
pub const DIAGNOSTIC_FIELD_COUNT: usize = 41;

/// Names of the flattened `DiagnosticFrame` fields, in record order.
pub const DIAGNOSTIC_FIELD_NAMES: [&str; DIAGNOSTIC_FIELD_COUNT] = [
    "bin_0",
    "bin_1",
    "bin_2",
    "bin_3",
    "bin_4",
    "bin_5",
    "bin_6",
    "bin_7",
    "bin_8",
    "bin_9",
    "bin_10",
    "bin_11",
    "bin_12",
    "bin_13",
    "bin_14",
    "bin_15",
    "bin_16",
    "bin_17",
    "bin_18",
    "bin_19",
    "bin_20",
    "bin_21",
    "bin_22",
    "bin_23",
    "mtof_1",
    "mtof_3",
    "mtof_5",
    "mtof_7",
    "sampling_period",
    "flow_rate",
    "temperature",
    "relative_humidity",
    "pm1",
    "pm2_5",
    "pm10",
    "reject_glitch",
    "reject_long_tof",
    "reject_ratio",
    "reject_out_of_range",
    "fan_rev_count",
    "laser_status",
];

impl Histogram {
    /// Values in the order of `DIAGNOSTIC_FIELD_NAMES`.
    pub fn values(&self) -> [f32; DIAGNOSTIC_FIELD_COUNT] {
        let mut values = [0f32; DIAGNOSTIC_FIELD_COUNT];
        let mut i = 0;
        let mut push = |v: f32| {
            values[i] = v;
            i += 1;
        };
        self.bins.iter().for_each(|&b| push(f32::from(b)));
        self.mtof.iter().for_each(|&m| push(f32::from(m)));
        push(self.sampling_period);
        push(self.flow_rate);
        push(self.temperature);
        push(self.relative_humidity);
        push(self.mass.pm1);
        push(self.mass.pm2_5);
        push(self.mass.pm10);
        push(f32::from(self.reject_glitch));
        push(f32::from(self.reject_long_tof));
        push(f32::from(self.reject_ratio));
        push(f32::from(self.reject_out_of_range));
        push(f32::from(self.fan_rev_count));
        push(f32::from(self.laser_status));
        values
    }
}

/// One field of a flattened measurement record.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FieldValue {
    Number(f32),
    /// The measurement failed; never reported as zero since zero is a valid reading.
    Error,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one sampling cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticFrame {
    /// A checksum-verified histogram frame.
    Valid(Histogram),
    /// No trustworthy data. Contains the reason.
    Failed(Error),
}

impl DiagnosticFrame {
    pub fn is_valid(&self) -> bool {
        matches!(self, DiagnosticFrame::Valid(_))
    }

    pub fn histogram(&self) -> Option<&Histogram> {
        match self {
            DiagnosticFrame::Valid(h) => Some(h),
            DiagnosticFrame::Failed(_) => None,
        }
    }

    /// Flattens the frame into named fields. Every name is present for both variants;
    /// a failed frame reports `FieldValue::Error` for each of them.
    pub fn record(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            DiagnosticFrame::Valid(h) => DIAGNOSTIC_FIELD_NAMES
                .iter()
                .zip(h.values())
                .map(|(&name, v)| (name, FieldValue::Number(v)))
                .collect(),
            DiagnosticFrame::Failed(_) => DIAGNOSTIC_FIELD_NAMES
                .iter()
                .map(|&name| (name, FieldValue::Error))
                .collect(),
        }
    }
}

impl From<crate::base::Result<Histogram>> for DiagnosticFrame {
    fn from(result: crate::base::Result<Histogram>) -> Self {
        match result {
            Ok(h) => DiagnosticFrame::Valid(h),
            Err(e) => DiagnosticFrame::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram() -> Histogram {
        Histogram {
            bins: [7; OPCN3_HISTOGRAM_BINS],
            mtof: [1, 2, 3, 4],
            sampling_period: 5.0,
            flow_rate: 4.5,
            temperature: 21.0,
            relative_humidity: 40.0,
            mass: MassConcentrations {
                pm1: 0.0,
                pm2_5: 1.5,
                pm10: 3.0,
            },
            reject_glitch: 1,
            reject_long_tof: 2,
            reject_ratio: 3,
            reject_out_of_range: 4,
            fan_rev_count: 0,
            laser_status: 600,
        }
    }

    #[test]
    fn link_status_classification() {
        assert_eq!(LinkStatus::from_byte(0xF3), LinkStatus::Ready);
        assert_eq!(LinkStatus::from_byte(0x31), LinkStatus::Busy);
        assert_eq!(LinkStatus::from_byte(0xE6), LinkStatus::LinkFault(0xE6));
        assert_eq!(LinkStatus::from_byte(0x63), LinkStatus::LinkFault(0x63));
        assert_eq!(LinkStatus::from_byte(0x00), LinkStatus::LinkFault(0x00));
        assert_eq!(LinkStatus::from_byte(0x12), LinkStatus::Unexpected(0x12));
    }

    #[test]
    fn power_status_decoding() {
        let status = PowerStatus::from_bytes(&[1, 0, 255, 128, 1, 0x03]);
        assert!(status.is_on(PowerDomain::Fan));
        assert!(!status.is_on(PowerDomain::Laser));
        assert_eq!(status.get(PowerField::FanDac), 255);
        assert_eq!(status.get(PowerField::LaserDac), 128);
        assert_eq!(status.get(PowerField::LaserSwitch), 1);
        assert_eq!(status.get(PowerField::Gain), 1);
        assert_eq!(status.get(PowerField::AutoGainToggle), 1);
        assert_eq!(status.fan_speed_percent(), 100.0);
    }

    #[test]
    fn record_keys_are_identical_for_both_variants() {
        let valid = DiagnosticFrame::Valid(histogram()).record();
        let failed = DiagnosticFrame::Failed(Error::Cancelled).record();
        assert_eq!(valid.len(), DIAGNOSTIC_FIELD_COUNT);
        assert_eq!(failed.len(), DIAGNOSTIC_FIELD_COUNT);
        for ((a, _), (b, _)) in valid.iter().zip(failed.iter()) {
            assert_eq!(a, b);
        }
        assert!(failed.iter().all(|(_, v)| *v == FieldValue::Error));
    }

    #[test]
    fn zero_reading_is_not_an_error() {
        let record = DiagnosticFrame::Valid(histogram()).record();
        let pm1 = record.iter().find(|(name, _)| *name == "pm1").unwrap().1;
        assert_eq!(pm1, FieldValue::Number(0.0));
        assert_eq!(pm1.to_string(), "0");
        assert_eq!(FieldValue::Error.to_string(), "error");
    }

    #[test]
    fn values_follow_field_names() {
        let values = histogram().values();
        let index = |name: &str| {
            DIAGNOSTIC_FIELD_NAMES
                .iter()
                .position(|&n| n == name)
                .unwrap()
        };
        assert_eq!(values[index("bin_23")], 7.0);
        assert_eq!(values[index("mtof_7")], 4.0);
        assert_eq!(values[index("pm2_5")], 1.5);
        assert_eq!(values[index("laser_status")], 600.0);
    }

    #[test]
    fn record_prints_device_precision() {
        let mut h = histogram();
        h.sampling_period = 6.2;
        h.flow_rate = 4.37;
        let record = DiagnosticFrame::Valid(h).record();
        let printed = |name: &str| {
            record
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.to_string())
                .unwrap()
        };
        assert_eq!(printed("sampling_period"), "6.2");
        assert_eq!(printed("flow_rate"), "4.37");
        assert_eq!(printed("bin_0"), "7");
    }
}
