//! Compile-time configuration of the blinky
//!
//! Invalid values stop the build: the constants below are evaluated in const
//! context and [`ConfigError::panic`] aborts that evaluation.

use crate::pwm::{ConfigError, PwmConfig};
use crate::time::Hertz;
use crate::timer::Channel;

/// Timer input clock. The internal RC oscillator (HSI) with every bus
/// prescaler at its reset value of 1.
pub const INPUT_CLOCK: Hertz = Hertz::MHz(8);

/// TIM2 channel the LED hangs off; channel 1 comes out on PA0.
pub const LED_CHANNEL: Channel = Channel::C1;

/// 1 Hz, 50 %: clock pre-divided to 1 kHz, period and pulse in milliseconds
pub const BLINK_1HZ_MS: PwmConfig = unwrap(PwmConfig::from_millis(INPUT_CLOCK, 1_000, 500));

/// 1 Hz, 50 %: divide by 1000, then 8000 counts per cycle with the edge at 4000
pub const BLINK_1HZ_COARSE: PwmConfig = unwrap(PwmConfig::new(999, 8_000, 4_000));

/// Configuration flashed by the `pwm_blinky` firmware
pub const BLINK: PwmConfig = BLINK_1HZ_MS;

const fn unwrap(config: Result<PwmConfig, ConfigError>) -> PwmConfig {
    match config {
        Ok(config) => config,
        Err(e) => e.panic(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_variant_registers() {
        assert_eq!(BLINK_1HZ_MS.prescaler(), 7_999);
        assert_eq!(BLINK_1HZ_MS.period(), 1_000);
        assert_eq!(BLINK_1HZ_MS.compare(), 500);
    }

    #[test]
    fn variants_are_equivalent() {
        assert_eq!(BLINK_1HZ_MS.period_ticks(), BLINK_1HZ_COARSE.period_ticks());
        assert_eq!(BLINK_1HZ_MS.high_ticks(), BLINK_1HZ_COARSE.high_ticks());
        assert_eq!(BLINK_1HZ_COARSE.frequency(INPUT_CLOCK), Hertz::Hz(1));
        assert_eq!(BLINK_1HZ_COARSE.duty_permille(), 500);
    }
}
