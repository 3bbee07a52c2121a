//! Simulated OPC-N3 used by the unit tests.
//!
//! The simulator answers command polls the way the device does (ready, busy or a fault
//! sentinel), then serves power sub-commands and data frames. Clones share their state,
//! so a test keeps one handle to script behaviour and inspect counters while the driver
//! owns another.

use crate::answers::*;
use crate::checksum::checksum;
use crate::cmds::*;
use crate::config::Config;
use byteorder::{ByteOrder, LittleEndian};
use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// Config with millisecond delays.
pub fn test_config() -> Config {
    Config {
        initiate_deadline: Duration::from_secs(2),
        busy_delay: Duration::from_millis(1),
        unexpected_delay: Duration::from_millis(1),
        recovery_delay: Duration::from_millis(2),
        ready_settle: Duration::ZERO,
        command_gap: Duration::ZERO,
        fan_spin_up: Duration::from_millis(1),
        ack_recheck_delay: Duration::from_millis(1),
        power_retry_delay: Duration::from_millis(1),
        status_gap: Duration::ZERO,
        frame_retry_delay: Duration::from_millis(1),
        ..Config::default()
    }
}

/// Builds a PM answer with a correct checksum.
pub fn pm_frame(pm1: f32, pm2_5: f32, pm10: f32) -> [u8; OPCN3_PM_FRAME_SIZE] {
    let mut frame = [0u8; OPCN3_PM_FRAME_SIZE];
    LittleEndian::write_f32_into(&[pm1, pm2_5, pm10], &mut frame[..12]);
    let crc = checksum(&frame[..12]);
    LittleEndian::write_u16(&mut frame[12..], crc);
    frame
}

/// Raw values of a simulated histogram answer.
#[derive(Debug, Clone)]
pub struct HistogramFields {
    pub sampling_period: u16,
    pub flow_rate: u16,
    pub temperature: u16,
    pub humidity: u16,
    pub pm: [f32; 3],
}

impl Default for HistogramFields {
    fn default() -> Self {
        HistogramFields {
            sampling_period: 500,
            flow_rate: 450,
            temperature: 24000,
            humidity: 30000,
            pm: [1.25, 2.5, 5.0],
        }
    }
}

/// Builds a histogram answer with a correct checksum. Bin `i` counts `100 + i`.
pub fn histogram_frame(fields: &HistogramFields) -> [u8; OPCN3_HISTOGRAM_FRAME_SIZE] {
    let mut frame = [0u8; OPCN3_HISTOGRAM_FRAME_SIZE];
    let bins: Vec<u16> = (0..OPCN3_HISTOGRAM_BINS as u16).map(|i| 100 + i).collect();
    LittleEndian::write_u16_into(&bins, &mut frame[OPCN3_HIST_BINS..OPCN3_HIST_MTOF]);
    frame[OPCN3_HIST_MTOF..OPCN3_HIST_SAMPLING_PERIOD].copy_from_slice(&[10, 20, 30, 40]);
    let words = [
        (OPCN3_HIST_SAMPLING_PERIOD, fields.sampling_period),
        (OPCN3_HIST_FLOW_RATE, fields.flow_rate),
        (OPCN3_HIST_TEMPERATURE, fields.temperature),
        (OPCN3_HIST_HUMIDITY, fields.humidity),
        (OPCN3_HIST_REJECT_GLITCH, 1),
        (OPCN3_HIST_REJECT_LONG_TOF, 2),
        (OPCN3_HIST_REJECT_RATIO, 3),
        (OPCN3_HIST_REJECT_OUT_OF_RANGE, 4),
        (OPCN3_HIST_FAN_REV_COUNT, 5),
        (OPCN3_HIST_LASER_STATUS, 600),
    ];
    for (offset, value) in words {
        LittleEndian::write_u16(&mut frame[offset..offset + 2], value);
    }
    LittleEndian::write_f32_into(&fields.pm, &mut frame[OPCN3_HIST_PM1..OPCN3_HIST_REJECT_GLITCH]);
    let crc = checksum(&frame[..OPCN3_HIST_CHECKSUM]);
    LittleEndian::write_u16(&mut frame[OPCN3_HIST_CHECKSUM..], crc);
    frame
}

#[derive(Debug)]
enum Mode {
    Idle,
    Pending(u8),
    Streaming(Vec<u8>, usize),
}

#[derive(Debug)]
struct SimState {
    mode: Mode,
    script: VecDeque<u8>,
    busy_remaining: u32,
    echo: Option<u8>,
    faulty_command: Option<u8>,
    bus_error: bool,
    fan: bool,
    laser: bool,
    fan_dac: u8,
    wrong_ack: bool,
    refuse_fan: bool,
    refuse_laser: bool,
    corrupt_reads: u32,
    pm: [u8; OPCN3_PM_FRAME_SIZE],
    histogram: [u8; OPCN3_HISTOGRAM_FRAME_SIZE],
    polls: u32,
    initiations: HashMap<u8, u32>,
    sub_commands: Vec<u8>,
}

impl SimState {
    fn respond(&mut self, byte: u8) -> u8 {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Idle => self.poll(byte),
            Mode::Pending(command) => self.serve(command, byte),
            Mode::Streaming(data, pos) => {
                let out = data[pos];
                if pos + 1 < data.len() {
                    self.mode = Mode::Streaming(data, pos + 1);
                }
                out
            }
        }
    }

    fn poll(&mut self, command: u8) -> u8 {
        self.polls += 1;
        match self.script.pop_front() {
            Some(OPCN3_ANS_READY) => return self.accept(command),
            Some(echo) => return echo,
            None => {}
        }
        if let Some(echo) = self.echo {
            return echo;
        }
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return OPCN3_ANS_BUSY;
        }
        if self.faulty_command == Some(command) {
            return 0xE6;
        }
        self.accept(command)
    }

    fn accept(&mut self, command: u8) -> u8 {
        *self.initiations.entry(command).or_insert(0) += 1;
        self.mode = Mode::Pending(command);
        OPCN3_ANS_READY
    }

    fn serve(&mut self, command: u8, byte: u8) -> u8 {
        match command {
            OPCN3_CMD_POWER => {
                self.sub_commands.push(byte);
                match byte {
                    OPCN3_POWER_FAN_OFF if !self.refuse_fan => self.fan = false,
                    OPCN3_POWER_FAN_ON if !self.refuse_fan => self.fan = true,
                    OPCN3_POWER_LASER_OFF if !self.refuse_laser => self.laser = false,
                    OPCN3_POWER_LASER_ON if !self.refuse_laser => self.laser = true,
                    _ => {}
                }
                if self.wrong_ack {
                    0xFF
                } else {
                    OPCN3_ANS_POWER_ACCEPTED
                }
            }
            OPCN3_CMD_SET_FAN_POT => {
                self.fan_dac = byte;
                OPCN3_CMD_SET_FAN_POT
            }
            OPCN3_CMD_READ_POWER_STATUS => {
                let status = vec![
                    self.fan as u8,
                    self.laser as u8,
                    self.fan_dac,
                    200,
                    self.laser as u8,
                    0x01,
                ];
                self.stream(status)
            }
            OPCN3_CMD_READ_PM => {
                let frame = self.maybe_corrupt(self.pm.to_vec());
                self.stream(frame)
            }
            OPCN3_CMD_READ_HISTOGRAM => {
                let frame = self.maybe_corrupt(self.histogram.to_vec());
                self.stream(frame)
            }
            _ => 0x00,
        }
    }

    fn maybe_corrupt(&mut self, mut frame: Vec<u8>) -> Vec<u8> {
        if self.corrupt_reads > 0 {
            self.corrupt_reads -= 1;
            frame[3] ^= 0xFF;
        }
        frame
    }

    fn stream(&mut self, data: Vec<u8>) -> u8 {
        let first = data[0];
        if data.len() > 1 {
            self.mode = Mode::Streaming(data, 1);
        }
        first
    }
}

/// A simulated OPC-N3 behind an SPI device.
#[derive(Debug, Clone)]
pub struct SimulatedOpc {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedOpc {
    pub fn new() -> SimulatedOpc {
        SimulatedOpc {
            state: Rc::new(RefCell::new(SimState {
                mode: Mode::Idle,
                script: VecDeque::new(),
                busy_remaining: 0,
                echo: None,
                faulty_command: None,
                bus_error: false,
                fan: false,
                laser: false,
                fan_dac: 255,
                wrong_ack: false,
                refuse_fan: false,
                refuse_laser: false,
                corrupt_reads: 0,
                pm: pm_frame(12.5, 20.0, 35.25),
                histogram: histogram_frame(&HistogramFields::default()),
                polls: 0,
                initiations: HashMap::new(),
                sub_commands: Vec::new(),
            })),
        }
    }

    /// Answers the next command polls with `echoes`, in order, before any other behaviour.
    /// A scripted ready echo serves the polled command.
    pub fn script(&self, echoes: &[u8]) {
        self.state.borrow_mut().script.extend(echoes.iter().copied());
    }

    /// Answers busy to the next `polls` command polls.
    pub fn busy_for(&self, polls: u32) {
        self.state.borrow_mut().busy_remaining = polls;
    }

    pub fn always_busy(&self) {
        self.always_echo(OPCN3_ANS_BUSY);
    }

    /// Answers every command poll with `byte`.
    pub fn always_echo(&self, byte: u8) {
        self.state.borrow_mut().echo = Some(byte);
    }

    /// Answers polls of `command` with a chip-select fault.
    pub fn fault_on(&self, command: u8) {
        self.state.borrow_mut().faulty_command = Some(command);
    }

    pub fn bus_error(&self) {
        self.state.borrow_mut().bus_error = true;
    }

    /// Acknowledges power sub-commands with a wrong byte while still applying them.
    pub fn wrong_ack(&self) {
        self.state.borrow_mut().wrong_ack = true;
    }

    /// Ignores power sub-commands for the fan.
    pub fn refuse_fan(&self) {
        let mut state = self.state.borrow_mut();
        state.refuse_fan = true;
        state.wrong_ack = true;
    }

    /// Ignores power sub-commands for the laser.
    pub fn refuse_laser(&self) {
        let mut state = self.state.borrow_mut();
        state.refuse_laser = true;
        state.wrong_ack = true;
    }

    /// Corrupts the next `reads` PM or histogram answers.
    pub fn corrupt_next(&self, reads: u32) {
        self.state.borrow_mut().corrupt_reads = reads;
    }

    pub fn set_histogram(&self, frame: [u8; OPCN3_HISTOGRAM_FRAME_SIZE]) {
        self.state.borrow_mut().histogram = frame;
    }

    pub fn set_pm(&self, frame: [u8; OPCN3_PM_FRAME_SIZE]) {
        self.state.borrow_mut().pm = frame;
    }

    pub fn fan_on(&self) -> bool {
        self.state.borrow().fan
    }

    pub fn laser_on(&self) -> bool {
        self.state.borrow().laser
    }

    pub fn fan_dac(&self) -> u8 {
        self.state.borrow().fan_dac
    }

    /// Number of command polls received.
    pub fn polls(&self) -> u32 {
        self.state.borrow().polls
    }

    /// Number of times `command` was answered ready.
    pub fn initiations(&self, command: u8) -> u32 {
        self.state
            .borrow()
            .initiations
            .get(&command)
            .copied()
            .unwrap_or(0)
    }

    /// Number of times the power sub-command `sub` was sent.
    pub fn sub_command_count(&self, sub: u8) -> usize {
        self.state
            .borrow()
            .sub_commands
            .iter()
            .filter(|&&s| s == sub)
            .count()
    }

    /// Power sub-commands in the order they were sent.
    pub fn sub_commands(&self) -> Vec<u8> {
        self.state.borrow().sub_commands.clone()
    }
}

impl ErrorType for SimulatedOpc {
    type Error = ErrorKind;
}

impl SpiDevice for SimulatedOpc {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        let mut state = self.state.borrow_mut();
        if state.bus_error {
            return Err(ErrorKind::Other);
        }
        for op in operations.iter_mut() {
            match op {
                Operation::TransferInPlace(buf) => {
                    for b in buf.iter_mut() {
                        *b = state.respond(*b);
                    }
                }
                Operation::Write(buf) => {
                    for &b in buf.iter() {
                        state.respond(b);
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = state.respond(0);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
