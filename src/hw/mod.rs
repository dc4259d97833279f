/// Register-level surface of a two-wire master peripheral.
///
/// One implementation per target. The engine is written against this trait
/// alone, so no bus code touches ambient hardware state.
pub trait TwiPort {
    /// Command a START (or repeated START) condition and run the phase.
    fn issue_start(&mut self);

    /// Command a STOP condition.
    fn issue_stop(&mut self);

    /// Clear the completion flag and run the next phase. `ack` selects
    /// whether the receiver acknowledges the byte it is about to take.
    fn proceed(&mut self, ack: bool);

    /// Completion flag for the phase in flight.
    fn phase_done(&self) -> bool;

    /// True while a commanded STOP has not yet cleared.
    fn stop_pending(&self) -> bool;

    /// Raw status register.
    fn status(&self) -> u8;

    /// Raw control register, for diagnostics only.
    fn control(&self) -> u8;

    /// Load the data register.
    fn write_data(&mut self, byte: u8);

    /// Read the data register.
    fn read_data(&self) -> u8;
}

/// Resettable millisecond counter advanced by the platform tick.
///
/// Every bounded wait rewinds the counter first and compares against a fixed
/// threshold, so the implementation only has to count since the last reset.
pub trait Millis {
    /// Rewind the counter to zero.
    fn reset(&mut self);

    /// Milliseconds since the last [`reset`](Self::reset).
    fn now(&mut self) -> u32;
}
