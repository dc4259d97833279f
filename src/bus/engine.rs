//! Phase-level state machine of the transaction engine.
//!
//! Each phase resets the timeout counter, issues one hardware command, polls
//! the completion flag under the bound, then classifies the reported status
//! through the pure [`transition`] function. Recovery (whole-transaction
//! restart) is the caller's job; cleanup STOP after a failure is handled by
//! the primitives in `transfer`, which know whether the bus was owned.

use crate::config;
use crate::hw::{Millis, TwiPort};

use super::{BusStatus, Twi, TwiError};

/// Transfer direction carried in the address byte's R/W bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// Where a transaction currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Starting,
    Addressing,
    TransferringData,
    Stopping,
    Failed,
}

/// What a completed phase's status code means for the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Phase finished as expected.
    Complete,
    /// The whole transaction must be retried from START (bounded).
    Restart(TwiError),
    /// The transaction cannot continue.
    Fault(TwiError),
}

/// Classify one completed phase. Pure: drives the engine and its tests.
pub(crate) fn transition(phase: Phase, dir: Direction, status: BusStatus) -> (Phase, Verdict) {
    match (phase, status) {
        (Phase::Starting, BusStatus::StartSent | BusStatus::RepeatedStartSent) => {
            (Phase::Addressing, Verdict::Complete)
        }
        (Phase::Starting, BusStatus::ArbitrationLost) => {
            (Phase::Starting, Verdict::Restart(TwiError::ArbitrationLost))
        }

        (Phase::Addressing, BusStatus::AddressWriteAck) if dir == Direction::Write => {
            (Phase::TransferringData, Verdict::Complete)
        }
        (Phase::Addressing, BusStatus::AddressReadAck) if dir == Direction::Read => {
            (Phase::TransferringData, Verdict::Complete)
        }
        (Phase::Addressing, BusStatus::AddressWriteNack) if dir == Direction::Write => {
            (Phase::Starting, Verdict::Restart(TwiError::AddressNack))
        }
        (Phase::Addressing, BusStatus::AddressReadNack) if dir == Direction::Read => {
            (Phase::Starting, Verdict::Restart(TwiError::AddressNack))
        }
        (Phase::Addressing, BusStatus::ArbitrationLost) => {
            (Phase::Starting, Verdict::Restart(TwiError::ArbitrationLost))
        }

        (Phase::TransferringData, BusStatus::DataWriteAck) if dir == Direction::Write => {
            (Phase::TransferringData, Verdict::Complete)
        }
        (Phase::TransferringData, BusStatus::DataWriteNack) if dir == Direction::Write => {
            (Phase::Failed, Verdict::Fault(TwiError::DataNack))
        }
        // an unacknowledged read byte is the normal end of a read, not a
        // failure; the caller sees it through the `more` flag
        (Phase::TransferringData, BusStatus::DataReadAck | BusStatus::DataReadNack)
            if dir == Direction::Read =>
        {
            (Phase::TransferringData, Verdict::Complete)
        }

        (_, status) => (
            Phase::Failed,
            Verdict::Fault(TwiError::UnexpectedStatus(status.raw())),
        ),
    }
}

impl<P, C> Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    /// Signal a START condition and verify the bus took it.
    ///
    /// Either START variant is accepted: a transaction restarted without an
    /// intervening STOP legitimately reports a repeated START.
    pub fn start(&mut self, expected: BusStatus) -> Result<(), TwiError> {
        self.phase = Phase::Starting;
        self.port.issue_start();
        self.await_phase("start")?;

        let status = BusStatus::from(self.port.status());
        if status == expected {
            self.phase = Phase::Addressing;
            return Ok(());
        }
        self.step(Direction::Write, status, "start")
    }

    /// Transmit SLA+R/W for `addr`.
    pub fn address(&mut self, addr: u8, dir: Direction) -> Result<(), TwiError> {
        self.phase = Phase::Addressing;
        self.port.write_data((addr << 1) | dir as u8);
        self.port.proceed(false);
        self.await_phase("address")?;

        let status = BusStatus::from(self.port.status());
        self.step(dir, status, "address")
    }

    /// Transmit one data byte and require its acknowledge.
    pub fn data_tx(&mut self, byte: u8) -> Result<(), TwiError> {
        self.phase = Phase::TransferringData;
        self.port.write_data(byte);
        self.port.proceed(false);
        self.await_phase("data tx")?;

        let status = BusStatus::from(self.port.status());
        self.step(Direction::Write, status, "data tx")
    }

    /// Receive one data byte. `ack` tells the slave more bytes are wanted;
    /// the returned flag is false once the transfer ended on a NACK.
    pub fn data_rx(&mut self, ack: bool) -> Result<(u8, bool), TwiError> {
        self.phase = Phase::TransferringData;
        self.port.proceed(ack);
        self.await_phase("data rx")?;

        let status = BusStatus::from(self.port.status());
        self.step(Direction::Read, status, "data rx")?;
        Ok((self.port.read_data(), status == BusStatus::DataReadAck))
    }

    /// Signal a STOP condition, releasing the bus.
    ///
    /// Never fails: the wait for the stop flag to clear is bounded and a
    /// stuck flag is only reported through the verbose diagnostics.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopping;
        self.port.issue_stop();

        self.clock.reset();
        while self.port.stop_pending() {
            if self.clock.now() >= config::TWI_TIMEOUT_MS {
                self.complain("stop");
                break;
            }
        }
        self.phase = Phase::Idle;
    }

    /// Poll the completion flag under the timeout bound.
    fn await_phase(&mut self, what: &'static str) -> Result<(), TwiError> {
        self.clock.reset();
        while !self.port.phase_done() {
            if self.clock.now() >= config::TWI_TIMEOUT_MS {
                self.phase = Phase::Failed;
                self.complain(what);
                return Err(TwiError::Timeout);
            }
        }
        Ok(())
    }

    /// Run the transition function and fold its verdict into a result.
    fn step(&mut self, dir: Direction, status: BusStatus, what: &'static str) -> Result<(), TwiError> {
        let (next, verdict) = transition(self.phase, dir, status);
        self.phase = next;
        match verdict {
            Verdict::Complete => Ok(()),
            // recoverable; the restarting caller stays quiet about it
            Verdict::Restart(e) => Err(e),
            Verdict::Fault(e) => {
                self.complain(what);
                Err(e)
            }
        }
    }

    /// Verbose failure diagnostics: failing phase plus raw registers.
    fn complain(&self, what: &'static str) {
        if !self.verbose {
            return;
        }
        #[cfg(feature = "defmt")]
        defmt::error!(
            "twi {} failed: control=0x{:02x} status=0x{:02x}",
            what,
            self.port.control(),
            self.port.status()
        );
        #[cfg(not(feature = "defmt"))]
        let _ = what;
    }
}
