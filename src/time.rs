//! Time units

pub use fugit::{HertzU32 as Hertz, MicrosDurationU64, RateExtU32};

/// Microseconds taken by `ticks` cycles of a `clock`
pub const fn ticks_to_micros(ticks: u64, clock: Hertz) -> MicrosDurationU64 {
    MicrosDurationU64::from_ticks(ticks * 1_000_000 / clock.raw() as u64)
}
