//! Scripted two-wire port, fake clock and fake reset pin for driving the
//! whole bus stack on the host.

#![allow(dead_code)]

use hygro_probe::hw::{Millis, TwiPort};
use hygro_probe::Twi;

/// Everything the engine did to the bus, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    AddressWrite(u8),
    AddressRead(u8),
    Tx(u8),
    /// Byte served to the master and whether the master acked it.
    Rx(u8, bool),
    Stop,
}

/// What one simulated slave serves to reads.
pub enum SlaveKind {
    /// Canned frames; each read transaction serves the next one, the last
    /// frame repeating. A read past a frame's end is NACK-terminated.
    Frames(Vec<Vec<u8>>),
    /// One control register: reads return it, a write replaces it.
    Register(u8),
}

pub struct Slave {
    pub address: u8,
    pub kind: SlaveKind,
    /// Every data byte accepted from the master.
    pub written: Vec<u8>,
    /// Select NACKs to serve before acking ("device busy writing").
    pub nack_selects: usize,
    /// NACK the n-th data byte of any write (0-based).
    pub nack_data_at: Option<usize>,

    frame_selects: usize,
    current: usize,
    cursor: usize,
}

impl Slave {
    pub fn frames(address: u8, frames: Vec<Vec<u8>>) -> Self {
        Self {
            address,
            kind: SlaveKind::Frames(frames),
            written: Vec::new(),
            nack_selects: 0,
            nack_data_at: None,
            frame_selects: 0,
            current: 0,
            cursor: 0,
        }
    }

    pub fn register(address: u8, value: u8) -> Self {
        Self {
            address,
            kind: SlaveKind::Register(value),
            written: Vec::new(),
            nack_selects: 0,
            nack_data_at: None,
            frame_selects: 0,
            current: 0,
            cursor: 0,
        }
    }

    pub fn with_nack_selects(mut self, count: usize) -> Self {
        self.nack_selects = count;
        self
    }

    pub fn with_nack_data_at(mut self, index: usize) -> Self {
        self.nack_data_at = Some(index);
        self
    }

    pub fn register_value(&self) -> u8 {
        match self.kind {
            SlaveKind::Register(value) => value,
            SlaveKind::Frames(_) => panic!("not a register slave"),
        }
    }

    /// Every read-select moves on to the next frame, the last repeating.
    fn begin_read(&mut self) {
        if let SlaveKind::Frames(ref frames) = self.kind {
            self.cursor = 0;
            self.current = self.frame_selects.min(frames.len() - 1);
            self.frame_selects += 1;
        }
    }

    /// Next byte for the master, or None once the source is exhausted.
    fn serve(&mut self) -> Option<u8> {
        match self.kind {
            SlaveKind::Register(value) => Some(value),
            SlaveKind::Frames(ref frames) => {
                let byte = frames[self.current].get(self.cursor).copied();
                self.cursor += 1;
                byte
            }
        }
    }

    fn accept(&mut self, byte: u8) -> bool {
        let index = self.written.len();
        self.written.push(byte);
        if let SlaveKind::Register(ref mut value) = self.kind {
            *value = byte;
        }
        self.nack_data_at != Some(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortState {
    Idle,
    /// START done; the next proceed carries the address byte.
    Started,
    /// Selected for write; index into `slaves`.
    SelectedWrite(usize),
    /// Selected for read; index into `slaves`.
    SelectedRead(usize),
}

/// Scripted register surface standing in for the hardware.
pub struct MockPort {
    pub slaves: Vec<Slave>,
    pub events: Vec<BusEvent>,
    pub starts: usize,
    pub stops: usize,

    /// Pending arbitration losses, served at the next STARTs.
    pub arbitration_losses: usize,
    /// The START phase never completes (timeout injection).
    pub hang_on_start: bool,
    /// Data phases never complete.
    pub hang_on_data: bool,
    /// Force a raw status at the n-th phase completion (0-based).
    pub force_status_at: Option<(usize, u8)>,

    raises: usize,
    state: PortState,
    bus_owned: bool,
    status: u8,
    flag: bool,
    data: u8,
}

impl MockPort {
    pub fn new(slaves: Vec<Slave>) -> Self {
        Self {
            slaves,
            events: Vec::new(),
            starts: 0,
            stops: 0,
            arbitration_losses: 0,
            hang_on_start: false,
            hang_on_data: false,
            force_status_at: None,
            raises: 0,
            state: PortState::Idle,
            bus_owned: false,
            status: 0,
            flag: false,
            data: 0,
        }
    }

    pub fn slave(&self, address: u8) -> &Slave {
        self.slaves
            .iter()
            .find(|s| s.address == address)
            .expect("no such slave")
    }

    fn raise(&mut self, status: u8) {
        let mut status = status;
        if let Some((at, forced)) = self.force_status_at {
            if self.raises == at {
                status = forced;
                self.force_status_at = None;
            }
        }
        self.raises += 1;
        self.status = status;
        self.flag = true;
    }

    fn find_slave(&mut self, address: u8) -> Option<usize> {
        self.slaves.iter().position(|s| s.address == address)
    }
}

impl TwiPort for MockPort {
    fn issue_start(&mut self) {
        self.starts += 1;
        self.events.push(BusEvent::Start);
        self.flag = false;

        if self.hang_on_start {
            return;
        }
        if self.arbitration_losses > 0 {
            self.arbitration_losses -= 1;
            self.bus_owned = false;
            self.state = PortState::Idle;
            self.raise(0x38);
            return;
        }

        let status = if self.bus_owned { 0x10 } else { 0x08 };
        self.bus_owned = true;
        self.state = PortState::Started;
        self.raise(status);
    }

    fn issue_stop(&mut self) {
        self.stops += 1;
        self.events.push(BusEvent::Stop);
        self.bus_owned = false;
        self.state = PortState::Idle;
        self.flag = false;
    }

    fn proceed(&mut self, ack: bool) {
        self.flag = false;

        match self.state {
            PortState::Started => {
                let address = self.data >> 1;
                let read = self.data & 1 == 1;
                let found = self.find_slave(address);

                let acked = match found {
                    Some(i) => {
                        if self.slaves[i].nack_selects > 0 {
                            self.slaves[i].nack_selects -= 1;
                            false
                        } else {
                            true
                        }
                    }
                    None => false,
                };

                if read {
                    self.events.push(BusEvent::AddressRead(address));
                } else {
                    self.events.push(BusEvent::AddressWrite(address));
                }

                match (acked, read) {
                    (true, false) => {
                        self.state = PortState::SelectedWrite(found.unwrap());
                        self.raise(0x18);
                    }
                    (true, true) => {
                        let i = found.unwrap();
                        self.slaves[i].begin_read();
                        self.state = PortState::SelectedRead(i);
                        self.raise(0x40);
                    }
                    (false, false) => self.raise(0x20),
                    (false, true) => self.raise(0x48),
                }
            }
            PortState::SelectedWrite(i) => {
                if self.hang_on_data {
                    return;
                }
                self.events.push(BusEvent::Tx(self.data));
                let acked = self.slaves[i].accept(self.data);
                self.raise(if acked { 0x28 } else { 0x30 });
            }
            PortState::SelectedRead(i) => {
                if self.hang_on_data {
                    return;
                }
                match self.slaves[i].serve() {
                    Some(byte) => {
                        self.data = byte;
                        self.events.push(BusEvent::Rx(byte, ack));
                        self.raise(if ack { 0x50 } else { 0x58 });
                    }
                    None => {
                        // source exhausted: byte arrives NACK-terminated
                        // no matter what the master asked for
                        self.data = 0xFF;
                        self.events.push(BusEvent::Rx(0xFF, false));
                        self.raise(0x58);
                    }
                }
            }
            PortState::Idle => {
                // nothing selected; report a status no phase recognizes
                self.raise(0x00);
            }
        }
    }

    fn phase_done(&self) -> bool {
        self.flag
    }

    fn stop_pending(&self) -> bool {
        false
    }

    fn status(&self) -> u8 {
        self.status
    }

    fn control(&self) -> u8 {
        0
    }

    fn write_data(&mut self, byte: u8) {
        self.data = byte;
    }

    fn read_data(&self) -> u8 {
        self.data
    }
}

/// Fake millisecond counter: every poll advances time, so bounded waits and
/// delays elapse without wall-clock involvement.
pub struct FakeMillis {
    now: u32,
}

impl FakeMillis {
    pub fn new() -> Self {
        Self { now: 0 }
    }
}

impl Millis for FakeMillis {
    fn reset(&mut self) {
        self.now = 0;
    }

    fn now(&mut self) -> u32 {
        let t = self.now;
        self.now += 1;
        t
    }
}

/// Reset line stand-in recording every commanded level (true = high).
pub struct FakePin {
    pub transitions: Vec<bool>,
}

impl FakePin {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }
}

impl embedded_hal::digital::v2::OutputPin for FakePin {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.transitions.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.transitions.push(true);
        Ok(())
    }
}

pub fn mock_bus(slaves: Vec<Slave>) -> Twi<MockPort, FakeMillis> {
    Twi::new(MockPort::new(slaves), FakeMillis::new())
}
