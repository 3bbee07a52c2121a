//! # OPC-N3 Driver
//!
//! `opcn3` is a driver for the Alphasense OPC-N3 optical particle counter over SPI.
//! It polls the device's half-duplex command protocol until the device is ready, switches the
//! fan and the laser with verified acknowledgements, and reads checksum-verified PM and
//! histogram frames.
//!
//! The SPI bus is any `embedded_hal::spi::SpiDevice` configured for `SPI_MODE` at no more
//! than `SPI_MAX_FREQUENCY_HZ`. All waits are blocking sleeps on the calling thread.

extern crate byteorder;
extern crate embedded_hal;
extern crate log;

mod answers;
pub mod base;
mod checksum;
pub mod cmds;
mod config;
mod internals;
mod power;
mod protocol;
mod reader;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

pub use crate::base::{CancelToken, Error, Link, Pacer, Ready, Result};
pub use crate::checksum::{checksum, verify, Crc16};
pub use crate::config::Config;
pub use crate::protocol::{parse_histogram, parse_pm_frame, verify_frame};

use crate::types::{DiagnosticFrame, Histogram, MassConcentrations, PowerState};
use embedded_hal::spi::{Mode, SpiDevice, MODE_1};
use log::{debug, info, trace, warn};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// SPI mode of the OPC-N3: clock idle low, data sampled on the falling edge.
pub const SPI_MODE: Mode = MODE_1;

/// Highest SPI clock the OPC-N3 supports.
pub const SPI_MAX_FREQUENCY_HZ: u32 = 750_000;

/// SPI clock known to work reliably with long cables.
pub const SPI_DEFAULT_FREQUENCY_HZ: u32 = 400_000;

/// Represents a connection to and control interface for an OPC-N3 sensor.
///
/// The device exclusively owns its SPI bus and remembers the last confirmed state of the fan
/// and the laser, so that redundant power commands are skipped. Dropping a device that has sent
/// power commands powers both down unless both are confirmed off.
///
/// # Example
/// ```ignore
/// let spi = /* embedded_hal::spi::SpiDevice in SPI_MODE */;
/// let mut opc = OpcN3Device::new(spi);
/// let frame = opc.sample(Duration::from_secs(2), Duration::from_secs(5));
/// for (name, value) in frame.record() {
///     println!("{name}: {value}");
/// }
/// ```
#[derive(Debug)]
pub struct OpcN3Device<SPI>
where
    SPI: SpiDevice,
{
    link: Link<SPI>,
    fan: PowerState,
    laser: PowerState,
    /// Set once a power command has been sent.
    commanded: bool,
}

impl<SPI> OpcN3Device<SPI>
where
    SPI: SpiDevice,
{
    /// Constructs a new `OpcN3Device` with the default `Config`.
    pub fn new(spi: SPI) -> OpcN3Device<SPI> {
        OpcN3Device::with_config(spi, Config::default())
    }

    /// Constructs a new `OpcN3Device` with custom timings and retry budgets.
    pub fn with_config(spi: SPI, config: Config) -> OpcN3Device<SPI> {
        trace!("Creating new OpcN3Device");
        OpcN3Device {
            link: Link::new(spi, config, Pacer::new(CancelToken::new())),
            fan: PowerState::Unknown,
            laser: PowerState::Unknown,
            commanded: false,
        }
    }

    pub fn config(&self) -> &Config {
        self.link.config()
    }

    /// Returns a token that aborts the flush and sampling waits of `sample` and `sample_pm`.
    /// The fan and the laser are still powered down before those calls return.
    pub fn cancel_token(&self) -> CancelToken {
        self.link.pacer().token().clone()
    }

    /// Last confirmed state of the fan.
    pub fn fan_state(&self) -> PowerState {
        self.fan
    }

    /// Last confirmed state of the laser.
    pub fn laser_state(&self) -> PowerState {
        self.laser
    }

    /// Polls the device with `command` until it is ready and hands out the exchange.
    pub fn initiate(&mut self, command: u8) -> Result<Ready<'_, SPI>> {
        self.link.initiate(command)
    }

    /// Takes one full measurement.
    ///
    /// Switches the fan on, waits half of `flush`, switches the laser on, waits the rest of
    /// `flush`, discards the histogram accumulated so far, waits `sample` and reads the
    /// histogram. The laser and then the fan are switched off on every exit path, including
    /// failures and cancellation.
    ///
    /// Never fails: a failed measurement is returned as `DiagnosticFrame::Failed`.
    ///
    /// # Arguments
    ///
    /// * `flush` - Time the fan runs to flush the sensor with fresh air.
    /// * `sample` - Time during which the laser samples particles.
    pub fn sample(&mut self, flush: Duration, sample: Duration) -> DiagnosticFrame {
        info!("Sampling (flush {:?}, sample {:?})", flush, sample);
        let result = PowerSession::begin(self).measure_histogram(flush, sample);
        if let Err(e) = &result {
            warn!("Measurement failed: {}", e);
        }
        DiagnosticFrame::from(result)
    }

    /// Takes one PM-only measurement with the same power sequence as `sample`.
    pub fn sample_pm(&mut self, flush: Duration, sample: Duration) -> Result<MassConcentrations> {
        info!("Sampling PM (flush {:?}, sample {:?})", flush, sample);
        let mut session = PowerSession::begin(self);
        session.power_up(flush)?;
        session.link.pacer().wait(sample)?;
        session.read_short_frame()
    }

    fn measure_histogram(&mut self, flush: Duration, sample: Duration) -> Result<Histogram> {
        self.power_up(flush)?;
        self.reset_histogram()?;
        self.link.pacer().wait(sample)?;
        self.read_long_frame(sample)
    }

    /// Fan on, half the flush, laser on, rest of the flush.
    fn power_up(&mut self, flush: Duration) -> Result<()> {
        let pacer = self.link.pacer().clone();
        pacer.check()?;
        self.set_fan(true)?;
        pacer.wait(flush / 2)?;
        self.set_laser(true)?;
        pacer.wait(flush - flush / 2)?;
        debug!("Fan and laser running, flush complete");
        Ok(())
    }
}

impl<SPI> Drop for OpcN3Device<SPI>
where
    SPI: SpiDevice,
{
    fn drop(&mut self) {
        let confirmed_off = self.fan == PowerState::Off && self.laser == PowerState::Off;
        if self.commanded && !confirmed_off {
            warn!(
                "OpcN3Device dropped with fan {:?} and laser {:?}, powering down",
                self.fan, self.laser
            );
            self.power_down();
        }
    }
}

/// Powers the fan and the laser down when dropped.
struct PowerSession<'a, SPI>
where
    SPI: SpiDevice,
{
    device: &'a mut OpcN3Device<SPI>,
}

impl<'a, SPI> PowerSession<'a, SPI>
where
    SPI: SpiDevice,
{
    fn begin(device: &'a mut OpcN3Device<SPI>) -> PowerSession<'a, SPI> {
        trace!("Power session started");
        PowerSession { device }
    }
}

impl<SPI> Deref for PowerSession<'_, SPI>
where
    SPI: SpiDevice,
{
    type Target = OpcN3Device<SPI>;

    fn deref(&self) -> &Self::Target {
        self.device
    }
}

impl<SPI> DerefMut for PowerSession<'_, SPI>
where
    SPI: SpiDevice,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.device
    }
}

impl<SPI> Drop for PowerSession<'_, SPI>
where
    SPI: SpiDevice,
{
    fn drop(&mut self) {
        self.device.power_down();
        trace!("Power session ended");
    }
}
