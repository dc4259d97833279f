use crate::hw::Millis;

/// Busy-wait for `ms` milliseconds against the injected counter.
pub fn delay_ms<C: Millis>(clock: &mut C, ms: u32) {
    clock.reset();
    while clock.now() < ms {}
}
