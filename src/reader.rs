use crate::answers::*;
use crate::base::{Error, Result};
use crate::cmds::*;
use crate::protocol::{parse_histogram, parse_pm_frame};
use crate::types::{Histogram, MassConcentrations};
use crate::OpcN3Device;
use embedded_hal::spi::SpiDevice;
use log::{debug, error, info, trace};
use std::time::Duration;

impl<SPI> OpcN3Device<SPI>
where
    SPI: SpiDevice,
{
    /// Reads the PM1, PM2.5 and PM10 mass concentrations.
    ///
    /// A frame with a wrong checksum is read again as a whole, up to `frame_attempts`
    /// times. Does not touch the fan or the laser.
    pub fn read_short_frame(&mut self) -> Result<MassConcentrations> {
        trace!("Reading PM frame");
        let pm = self.read_frame::<_, OPCN3_PM_FRAME_SIZE>(
            OPCN3_CMD_READ_PM,
            &OPCN3_PM_FRAME_GROUPS,
            parse_pm_frame,
        )?;
        debug!(
            "PM 1: {} µg/m³ | PM 2.5: {} µg/m³ | PM 10: {} µg/m³",
            pm.pm1, pm.pm2_5, pm.pm10
        );
        Ok(pm)
    }

    /// Reads the full histogram frame. Reading it also restarts the device's histogram.
    ///
    /// A device-reported sampling period that differs from `expected_sampling` by more
    /// than the configured tolerance is logged, the data is still returned.
    ///
    /// # Arguments
    ///
    /// * `expected_sampling` - The sampling period the caller waited for.
    pub fn read_long_frame(&mut self, expected_sampling: Duration) -> Result<Histogram> {
        trace!("Reading histogram frame");
        let histogram = self.read_frame::<_, OPCN3_HISTOGRAM_FRAME_SIZE>(
            OPCN3_CMD_READ_HISTOGRAM,
            &OPCN3_HISTOGRAM_FRAME_GROUPS,
            parse_histogram,
        )?;

        let tolerance = self.link.config().sampling_tolerance.as_secs_f32();
        let expected = expected_sampling.as_secs_f32();
        let reported = histogram.sampling_period;
        if reported > expected + tolerance {
            info!(
                "Sampling period of the sensor was {:.2} seconds longer than expected",
                reported - expected
            );
        } else if reported < expected - tolerance {
            info!(
                "Sampling period of the sensor was {:.2} seconds shorter than expected",
                expected - reported
            );
        }

        debug!(
            "Histogram: PM1 {} | PM2.5 {} | PM10 {} | {:.2} °C | {:.2} %RH | period {} s | flow {} ml/s",
            histogram.mass.pm1,
            histogram.mass.pm2_5,
            histogram.mass.pm10,
            histogram.temperature,
            histogram.relative_humidity,
            histogram.sampling_period,
            histogram.flow_rate
        );
        Ok(histogram)
    }

    /// Reads and discards the histogram accumulated so far, so that the next histogram
    /// only covers what follows.
    pub fn reset_histogram(&mut self) -> Result<()> {
        let config = *self.link.config();
        let mut last_error = None;
        for attempt in 1..=config.frame_attempts {
            let mut discarded = [0u8; OPCN3_HISTOGRAM_FRAME_SIZE];
            let result = self
                .link
                .initiate(OPCN3_CMD_READ_HISTOGRAM)
                .and_then(|mut ready| ready.read_into(&mut discarded));
            match result {
                Ok(()) => {
                    debug!("Old histogram deleted, starting a new one");
                    return Ok(());
                }
                Err(e) => {
                    error!(
                        "Failed to initiate histogram ({}/{}): {}",
                        attempt, config.frame_attempts, e
                    );
                    last_error = Some(e);
                    if attempt < config.frame_attempts {
                        self.link.pacer().sleep(config.recovery_delay);
                    }
                }
            }
        }
        error!(
            "Failed {} times to initiate histogram, skipping this measurement",
            config.frame_attempts
        );
        Err(last_error.unwrap_or_else(no_attempts))
    }

    /// Polls `command`, reads `N` bytes group by group and parses them.
    ///
    /// A failed poll ends the read at once. A checksum mismatch restarts the whole read.
    fn read_frame<T, const N: usize>(
        &mut self,
        command: u8,
        groups: &[usize],
        parse: fn(&[u8; N]) -> Result<T>,
    ) -> Result<T> {
        let config = *self.link.config();
        let mut last_error = None;
        for attempt in 1..=config.frame_attempts {
            let mut frame = [0u8; N];
            self.link
                .initiate(command)?
                .read_groups(groups, &mut frame)?;

            match parse(&frame) {
                Ok(value) => return Ok(value),
                Err(e @ Error::ChecksumMismatch { .. }) => {
                    error!(
                        "Checksum for {:#04X} is not correct, reading again ({}/{})",
                        command, attempt, config.frame_attempts
                    );
                    last_error = Some(e);
                    if attempt < config.frame_attempts {
                        self.link.pacer().sleep(config.frame_retry_delay);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        error!(
            "Data for {:#04X} wrong {} consecutive times, skipping this reading",
            command, config.frame_attempts
        );
        Err(last_error.unwrap_or_else(no_attempts))
    }
}

fn no_attempts() -> Error {
    Error::InvalidArgument {
        description: "no frame attempts configured".to_owned(),
    }
}
