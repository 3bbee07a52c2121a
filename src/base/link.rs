use crate::base::error::{Error, Result};
use crate::base::pacer::Pacer;
use crate::config::Config;
use crate::types::LinkStatus;
use embedded_hal::spi::{Error as _, SpiDevice};
use log::{error, trace, warn};
use std::time::{Duration, Instant};

/// Link sends command bytes to the OPC-N3 over SPI and polls until the device is ready
///
/// The link exclusively owns the SPI device. A successful `initiate` hands out a `Ready`
/// token that mutably borrows the link, so no other command can be started until the
/// exchange that follows the ready echo is finished.
///
/// # Examples
/// ```ignore
/// let mut link = Link::new(spi, Config::default(), Pacer::default());
/// let mut ready = link.initiate(OPCN3_CMD_READ_PM)?;
/// let mut frame = [0u8; OPCN3_PM_FRAME_SIZE];
/// ready.read_groups(&OPCN3_PM_FRAME_GROUPS, &mut frame)?;
/// ```
#[derive(Debug)]
pub struct Link<SPI> {
    spi: SPI,
    config: Config,
    pacer: Pacer,
}

impl<SPI> Link<SPI>
where
    SPI: SpiDevice,
{
    /// Create a new `Link` over an SPI device configured for mode 1.
    pub fn new(spi: SPI, config: Config, pacer: Pacer) -> Link<SPI> {
        trace!("Creating new Link with config {:?}", config);
        Link { spi, config, pacer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Gives the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Clocks `byte` out and returns the byte clocked in during the same cycle.
    fn exchange(&mut self, byte: u8) -> Result<u8> {
        let mut buf = [byte];
        self.spi.transfer_in_place(&mut buf).map_err(|e| {
            error!("SPI transfer of {:#04X} failed: {:?}", byte, e);
            Error::Spi(e.kind())
        })?;
        trace!("Sent {:#04X}, received {:#04X}", byte, buf[0]);
        Ok(buf[0])
    }

    /// Sleeps for `duration`, but never past `deadline`.
    fn sleep_within(&self, duration: Duration, start: Instant, deadline: Duration) {
        let remaining = deadline.saturating_sub(start.elapsed());
        self.pacer.sleep(duration.min(remaining));
    }

    /// Polls the device with `command` until it reports ready.
    ///
    /// Busy and unexpected echoes are retried after a short delay. Once the busy budget is
    /// spent the device gets `recovery_delay` to reset its SPI buffer; after `reset_cycles`
    /// such resets the poll gives up with `Error::LinkFault`. A fault sentinel ends the
    /// poll at once, after the recovery delay. The whole poll never outlives
    /// `initiate_deadline` and then fails with `Error::Timeout`.
    ///
    /// # Arguments
    ///
    /// * `command` - The command byte to poll with.
    pub fn initiate(&mut self, command: u8) -> Result<Ready<'_, SPI>> {
        trace!("Initiate transmission with command byte {:#04X}", command);
        let config = self.config;
        let start = Instant::now();
        let mut attempts = 0u32;
        let mut cycles = 0u32;

        loop {
            let elapsed = start.elapsed();
            if elapsed >= config.initiate_deadline {
                error!(
                    "Transmission initiation for {:#04X} took too long ({:?})",
                    command, elapsed
                );
                return Err(Error::Timeout { elapsed });
            }

            let echoed = self.exchange(command)?;
            match LinkStatus::from_byte(echoed) {
                LinkStatus::Ready => {
                    trace!(
                        "Device ready for {:#04X} after {} attempts and {} resets",
                        command,
                        attempts,
                        cycles
                    );
                    self.pacer.sleep(config.ready_settle);
                    return Ok(Ready {
                        link: self,
                        command,
                    });
                }
                LinkStatus::Busy => {
                    attempts += 1;
                    self.sleep_within(config.busy_delay, start, config.initiate_deadline);
                }
                LinkStatus::LinkFault(code) => {
                    error!(
                        "Problem with the chip select line while polling {:#04X} (echoed {:#04X})",
                        command, code
                    );
                    self.sleep_within(config.recovery_delay, start, config.initiate_deadline);
                    return Err(Error::LinkFault { code });
                }
                LinkStatus::Unexpected(code) => {
                    warn!(
                        "Unexpected byte {:#04X} while polling {:#04X}",
                        code, command
                    );
                    attempts += 1;
                    self.sleep_within(config.unexpected_delay, start, config.initiate_deadline);
                }
            }

            if attempts > config.busy_budget {
                cycles += 1;
                if cycles >= config.reset_cycles {
                    error!(
                        "Device still not ready for {:#04X} after {} SPI buffer resets",
                        command, cycles
                    );
                    return Err(Error::LinkFault { code: echoed });
                }
                warn!(
                    "Device not ready for {:#04X} after {} attempts, resetting SPI buffer",
                    command, attempts
                );
                self.sleep_within(config.recovery_delay, start, config.initiate_deadline);
                attempts = 0;
            }
        }
    }
}

/// Exclusive access to a device that has answered ready to a command byte.
#[derive(Debug)]
pub struct Ready<'a, SPI> {
    link: &'a mut Link<SPI>,
    command: u8,
}

impl<SPI> Ready<'_, SPI>
where
    SPI: SpiDevice,
{
    /// The command byte this exchange was initiated with.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Sends a single data byte (a sub-command or an argument) and returns the echo.
    pub fn exchange(&mut self, byte: u8) -> Result<u8> {
        self.link.exchange(byte)
    }

    /// Clocks `buf.len()` bytes out of the device by repeating the command byte.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.fill(self.command);
        self.link.spi.transfer_in_place(buf).map_err(|e| {
            error!("SPI read for {:#04X} failed: {:?}", self.command, e);
            Error::Spi(e.kind())
        })?;
        trace!("Read for {:#04X}: {:02X?}", self.command, buf);
        Ok(())
    }

    /// Fills `frame` with one transfer per group, in order.
    ///
    /// # Arguments
    ///
    /// * `groups` - Sizes of the field groups. Their sum must equal `frame.len()`.
    /// * `frame` - Destination of the concatenated groups.
    pub fn read_groups(&mut self, groups: &[usize], frame: &mut [u8]) -> Result<()> {
        let total: usize = groups.iter().sum();
        if total != frame.len() {
            return Err(Error::InvalidArgument {
                description: format!(
                    "field groups cover {} bytes, frame has {}",
                    total,
                    frame.len()
                ),
            });
        }
        let mut offset = 0;
        for &size in groups {
            self.read_into(&mut frame[offset..offset + size])?;
            offset += size;
        }
        Ok(())
    }
}
