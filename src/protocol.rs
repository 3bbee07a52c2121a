use crate::answers::*;
use crate::base::{Error, Result};
use crate::checksum::checksum;
use crate::types::{Histogram, MassConcentrations};
use crate::utils::{from_hundredths, humidity_from_raw, temperature_from_raw};
use byteorder::{ByteOrder, LittleEndian};
use log::{error, trace};

/// Checks the trailing little-endian CRC-16 of `frame` against the bytes before it.
///
/// A frame that fails this check carries no reliable field at all and must be read again
/// as a whole.
pub fn verify_frame(frame: &[u8]) -> Result<()> {
    if frame.len() < 2 {
        return Err(Error::InvalidArgument {
            description: format!("frame of {} bytes has no checksum", frame.len()),
        });
    }
    let (payload, trailer) = frame.split_at(frame.len() - 2);
    let expected = LittleEndian::read_u16(trailer);
    let computed = checksum(payload);
    if expected != computed {
        error!(
            "Checksum is wrong: frame says {:#06X}, computed {:#06X}",
            expected, computed
        );
        return Err(Error::ChecksumMismatch { expected, computed });
    }
    trace!("Checksum is correct ({:#06X})", computed);
    Ok(())
}

/// Reads the three PM floats starting at the given offsets of `frame`.
fn mass_concentrations(frame: &[u8], offsets: [usize; 3]) -> MassConcentrations {
    let float = |offset: usize| LittleEndian::read_f32(&frame[offset..offset + 4]);
    MassConcentrations {
        pm1: float(offsets[0]),
        pm2_5: float(offsets[1]),
        pm10: float(offsets[2]),
    }
}

/// Decodes the PM answer: PM1, PM2.5 and PM10 as IEEE-754 floats, then the checksum.
pub fn parse_pm_frame(frame: &[u8; OPCN3_PM_FRAME_SIZE]) -> Result<MassConcentrations> {
    verify_frame(frame)?;
    let pm = mass_concentrations(frame, [0, 4, 8]);
    trace!("Parsed PM frame: {:?}", pm);
    Ok(pm)
}

/// Decodes the histogram answer.
pub fn parse_histogram(frame: &[u8; OPCN3_HISTOGRAM_FRAME_SIZE]) -> Result<Histogram> {
    verify_frame(frame)?;

    let word = |offset: usize| LittleEndian::read_u16(&frame[offset..offset + 2]);

    let mut bins = [0u16; OPCN3_HISTOGRAM_BINS];
    LittleEndian::read_u16_into(
        &frame[OPCN3_HIST_BINS..OPCN3_HIST_BINS + 2 * OPCN3_HISTOGRAM_BINS],
        &mut bins,
    );
    let mut mtof = [0u8; OPCN3_HISTOGRAM_MTOF];
    mtof.copy_from_slice(&frame[OPCN3_HIST_MTOF..OPCN3_HIST_MTOF + OPCN3_HISTOGRAM_MTOF]);

    let histogram = Histogram {
        bins,
        mtof,
        sampling_period: from_hundredths(word(OPCN3_HIST_SAMPLING_PERIOD)),
        flow_rate: from_hundredths(word(OPCN3_HIST_FLOW_RATE)),
        temperature: temperature_from_raw(word(OPCN3_HIST_TEMPERATURE)),
        relative_humidity: humidity_from_raw(word(OPCN3_HIST_HUMIDITY)),
        mass: mass_concentrations(
            frame,
            [OPCN3_HIST_PM1, OPCN3_HIST_PM2_5, OPCN3_HIST_PM10],
        ),
        reject_glitch: word(OPCN3_HIST_REJECT_GLITCH),
        reject_long_tof: word(OPCN3_HIST_REJECT_LONG_TOF),
        reject_ratio: word(OPCN3_HIST_REJECT_RATIO),
        reject_out_of_range: word(OPCN3_HIST_REJECT_OUT_OF_RANGE),
        fan_rev_count: word(OPCN3_HIST_FAN_REV_COUNT),
        laser_status: word(OPCN3_HIST_LASER_STATUS),
    };
    trace!("Parsed histogram frame: {:?}", histogram);
    Ok(histogram)
}
