use crate::answers::*;
use crate::base::{Error, Result};
use crate::cmds::*;
use crate::types::{PowerDomain, PowerField, PowerState, PowerStatus};
use crate::utils::percent_to_dac;
use crate::OpcN3Device;
use embedded_hal::spi::SpiDevice;
use log::{debug, error, info, trace, warn};

impl<SPI> OpcN3Device<SPI>
where
    SPI: SpiDevice,
{
    /// Switches the fan on or off and returns the confirmed state.
    ///
    /// Nothing is sent when the fan is already known to be in the requested state.
    pub fn set_fan(&mut self, on: bool) -> Result<bool> {
        if self.fan == PowerState::from(on) {
            debug!("Fan already {}", if on { "on" } else { "off" });
            return Ok(on);
        }
        self.switch(PowerDomain::Fan, on)
    }

    /// Switches the laser on or off and returns the confirmed state.
    ///
    /// Nothing is sent when the laser is already known to be in the requested state.
    pub fn set_laser(&mut self, on: bool) -> Result<bool> {
        if self.laser == PowerState::from(on) {
            debug!("Laser already {}", if on { "on" } else { "off" });
            return Ok(on);
        }
        self.switch(PowerDomain::Laser, on)
    }

    /// Reads the DAC and power status.
    pub fn read_power_status(&mut self) -> Result<PowerStatus> {
        trace!("Reading DAC and power status");
        let mut raw = [0u8; OPCN3_POWER_STATUS_SIZE];
        self.link
            .initiate(OPCN3_CMD_READ_POWER_STATUS)?
            .read_into(&mut raw)?;
        let status = PowerStatus::from_bytes(&raw);
        debug!("DAC and power status: {:?}", status);
        self.link.pacer().sleep(self.link.config().status_gap);
        Ok(status)
    }

    /// Reads a single field of the DAC and power status.
    pub fn read_power_field(&mut self, field: PowerField) -> Result<u8> {
        let value = self.read_power_status()?.get(field);
        debug!("DAC and power status for {:?} is {}", field, value);
        Ok(value)
    }

    /// Sets the fan speed through the fan potentiometer.
    ///
    /// # Arguments
    ///
    /// * `percent` - Fan speed, 0 to 100.
    pub fn set_fan_speed(&mut self, percent: u8) -> Result<()> {
        let dac = percent_to_dac(percent).ok_or_else(|| Error::InvalidArgument {
            description: format!("fan speed {}% is above 100%", percent),
        })?;
        debug!("Setting fan speed to {}% (pot {})", percent, dac);
        let echoed = self
            .link
            .initiate(OPCN3_CMD_SET_FAN_POT)?
            .exchange(dac)?;
        trace!("Fan pot answered {:#04X}", echoed);
        self.link.pacer().sleep(self.link.config().command_gap);
        Ok(())
    }

    /// Sends the power command for `domain` until it is confirmed or the attempts run out.
    pub(crate) fn switch(&mut self, domain: PowerDomain, on: bool) -> Result<bool> {
        let config = *self.link.config();
        let action = if on { "on" } else { "off" };
        debug!("Turning {} {}", domain, action);
        self.commanded = true;

        let mut last_error = None;
        for attempt in 1..=config.power_attempts {
            match self.try_switch(domain, on) {
                Ok(()) => {
                    self.set_state(domain, PowerState::from(on));
                    info!("{} is {}", domain, action);
                    return Ok(on);
                }
                Err(e) => {
                    error!(
                        "Failed to turn {} {} ({}/{}): {}",
                        domain, action, attempt, config.power_attempts, e
                    );
                    last_error = Some(e);
                    if attempt < config.power_attempts {
                        info!("Trying again to turn {} {}...", domain, action);
                        self.link.pacer().sleep(config.power_retry_delay);
                    }
                }
            }
        }

        error!(
            "Failed {} times to turn {} {}",
            config.power_attempts, domain, action
        );
        self.set_state(domain, PowerState::Unknown);
        Err(last_error.unwrap_or_else(|| Error::InvalidArgument {
            description: "no power attempts configured".to_owned(),
        }))
    }

    /// One power command attempt. A wrong acknowledgement is resolved by the status readback.
    fn try_switch(&mut self, domain: PowerDomain, on: bool) -> Result<()> {
        let config = *self.link.config();
        let sub_command = match (domain, on) {
            (PowerDomain::Fan, true) => OPCN3_POWER_FAN_ON,
            (PowerDomain::Fan, false) => OPCN3_POWER_FAN_OFF,
            (PowerDomain::Laser, true) => OPCN3_POWER_LASER_ON,
            (PowerDomain::Laser, false) => OPCN3_POWER_LASER_OFF,
        };

        let ack = self.link.initiate(OPCN3_CMD_POWER)?.exchange(sub_command)?;
        if domain == PowerDomain::Fan && on {
            self.link.pacer().sleep(config.fan_spin_up);
        }

        if ack == OPCN3_ANS_POWER_ACCEPTED {
            self.link.pacer().sleep(config.command_gap);
            return Ok(());
        }

        warn!(
            "Unexpected acknowledgement {:#04X} for {} {}, checking power status",
            ack,
            domain,
            if on { "on" } else { "off" }
        );
        self.link.pacer().sleep(config.ack_recheck_delay);
        let status = self.read_power_status()?;
        if status.is_on(domain) == on {
            info!(
                "Wrong answer received after SPI writing, but {} is well {}",
                domain,
                if on { "on" } else { "off" }
            );
            Ok(())
        } else {
            Err(Error::PowerAckMismatch {
                domain,
                requested: on,
                ack,
            })
        }
    }

    fn set_state(&mut self, domain: PowerDomain, state: PowerState) {
        match domain {
            PowerDomain::Fan => self.fan = state,
            PowerDomain::Laser => self.laser = state,
        }
    }

    /// Switches the laser, then the fan, off regardless of their last known state.
    pub(crate) fn power_down(&mut self) {
        debug!("Powering down laser and fan");
        if let Err(e) = self.switch(PowerDomain::Laser, false) {
            error!("Laser could not be confirmed off: {}", e);
        }
        if let Err(e) = self.switch(PowerDomain::Fan, false) {
            error!("Fan could not be confirmed off: {}", e);
        }
    }
}
