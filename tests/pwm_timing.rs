//! Timing properties of PWM configurations
//!
//! Run with: cargo test --test pwm_timing

use std::fmt::Write;

use stm32f1xx_pwm_blinky::config::{BLINK, BLINK_1HZ_COARSE, BLINK_1HZ_MS, INPUT_CLOCK};
use stm32f1xx_pwm_blinky::pwm::{ConfigError, PwmConfig};
use stm32f1xx_pwm_blinky::time::Hertz;

#[test]
fn period_and_duty_follow_register_values() {
    let cases = [
        (0u16, 1u16, 0u16),
        (0, 65_535, 1),
        (999, 8_000, 4_000),
        (65_535, 65_535, 65_535),
        (3, 7, 2),
    ];

    for (psc, period, compare) in cases {
        let config = PwmConfig::new(psc, period, compare).unwrap();

        assert_eq!(config.period_ticks(), (u64::from(psc) + 1) * u64::from(period));
        assert_eq!(config.high_ticks(), (u64::from(psc) + 1) * u64::from(compare));
        assert_eq!(config.duty_permille(), u32::from(compare) * 1000 / u32::from(period));
        assert_eq!(config.auto_reload(), period - 1);
    }
}

#[test]
fn millisecond_variant_counts_at_1khz() {
    assert_eq!(BLINK_1HZ_MS.counter_clock(INPUT_CLOCK), Hertz::kHz(1));
    assert_eq!(BLINK_1HZ_MS.period_duration(INPUT_CLOCK).to_millis(), 1_000);
    assert_eq!(BLINK_1HZ_MS.high_duration(INPUT_CLOCK).to_millis(), 500);
}

#[test]
fn coarse_variant_counts_at_8khz() {
    assert_eq!(BLINK_1HZ_COARSE.counter_clock(INPUT_CLOCK), Hertz::kHz(8));
    assert_eq!(BLINK_1HZ_COARSE.period_duration(INPUT_CLOCK).to_millis(), 1_000);
    assert_eq!(BLINK_1HZ_COARSE.duty_permille(), 500);
}

#[test]
fn firmware_blinks_at_one_hertz() {
    assert_eq!(BLINK.frequency(INPUT_CLOCK), Hertz::Hz(1));
    assert_eq!(BLINK.duty_permille(), 500);
    assert!(!BLINK.is_always_high());
    assert!(!BLINK.is_always_low());
}

#[test]
fn from_millis_matches_hand_computed_prescaler() {
    let config = PwmConfig::from_millis(Hertz::MHz(8), 1_000, 500).unwrap();
    assert_eq!(config, PwmConfig::new(7_999, 1_000, 500).unwrap());

    let config = PwmConfig::from_millis(Hertz::MHz(24), 250, 25).unwrap();
    assert_eq!(config.prescaler(), 23_999);
    assert_eq!(config.period_duration(Hertz::MHz(24)).to_millis(), 250);
    assert_eq!(config.duty_permille(), 100);
}

#[test]
fn from_millis_rejects_out_of_range_values() {
    assert_eq!(
        PwmConfig::from_millis(Hertz::MHz(8), 100, 101),
        Err(ConfigError::CompareExceedsPeriod)
    );
    assert_eq!(
        PwmConfig::from_millis(Hertz::MHz(8), 0, 0),
        Err(ConfigError::ZeroPeriod)
    );
    assert_eq!(
        PwmConfig::from_millis(Hertz::Hz(0), 10, 5),
        Err(ConfigError::ClockNotDivisible)
    );
    // 65.536 MHz still fits a divide-by-65536
    assert!(PwmConfig::from_millis(Hertz::kHz(65_536), 10, 5).is_ok());
    assert_eq!(
        PwmConfig::from_millis(Hertz::kHz(65_537), 10, 5),
        Err(ConfigError::PrescalerOutOfRange)
    );
}

#[test]
fn compare_equal_to_period_is_full_duty() {
    let config = PwmConfig::new(0, 100, 100).unwrap();
    assert!(config.is_always_high());
    assert_eq!(config.duty_permille(), 1000);
    assert_eq!(config.high_ticks(), config.period_ticks());
}

#[test]
fn errors_display_a_reason() {
    let mut buf = String::new();
    write!(buf, "{}", ConfigError::CompareExceedsPeriod).unwrap();
    assert_eq!(buf, "compare value exceeds the period");
}

#[test]
fn longest_period_stops_one_short_of_full_counter_range() {
    let config = PwmConfig::new(0, u16::MAX, u16::MAX).unwrap();
    assert_eq!(config.auto_reload(), 0xFFFE);
    assert_eq!(config.period_ticks(), 65_535);
}
