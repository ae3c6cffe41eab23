//! PWM output initialization
//!
//! A [`Pwm`] takes a [`PwmRegisters`] implementation through the channel
//! lifecycle in [`crate::state`]:
//!
//! ```text
//! Disabled --configure()--> Configured --start()--> Running
//! ```
//!
//! Every step writes an absolute value or does a clear-then-set of a field, so
//! running the whole sequence a second time leaves the registers unchanged.

use core::fmt;
use core::marker::PhantomData;

use crate::gpio::PinConfig;
use crate::state::{Configured, Disabled, Running};
use crate::time::{self, Hertz, MicrosDurationU64};
use crate::timer::OutputCompareMode;

/// Invalid PWM constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The period must be at least one count.
    ZeroPeriod,
    /// The compare value is larger than the period, the duty cycle would exceed 100 %.
    CompareExceedsPeriod,
    /// The requested divisor does not fit the 16-bit prescaler.
    PrescalerOutOfRange,
    /// The input clock is not a whole multiple of 1 kHz.
    ClockNotDivisible,
}

impl ConfigError {
    /// Abort const evaluation with a readable message
    pub const fn panic(self) -> ! {
        match self {
            ConfigError::ZeroPeriod => panic!("PWM period must be at least one count"),
            ConfigError::CompareExceedsPeriod => panic!("PWM compare value exceeds the period"),
            ConfigError::PrescalerOutOfRange => panic!("PWM prescaler divisor out of range"),
            ConfigError::ClockNotDivisible => panic!("timer clock is not a multiple of 1 kHz"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroPeriod => "period must be at least one count",
            ConfigError::CompareExceedsPeriod => "compare value exceeds the period",
            ConfigError::PrescalerOutOfRange => "prescaler divisor out of range",
            ConfigError::ClockNotDivisible => "timer clock is not a multiple of 1 kHz",
        };
        f.write_str(msg)
    }
}

/// Prescaler, period and compare value of one PWM channel
///
/// With prescaler value `P`, a period of `A` counts and compare value `C` the
/// output repeats every `(P + 1) * A` input clock cycles and stays high for
/// `(P + 1) * C` of them, giving a duty cycle of `C / A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    prescaler: u16,
    period: u16,
    compare: u16,
}

impl PwmConfig {
    /// `prescaler` is the raw `PSC` value, the clock is divided by `prescaler + 1`.
    /// `period` is the number of counts per cycle, `compare` the number of those
    /// counts during which the output is high. `ARR` is written as
    /// `period - 1`, so the longest period is 65 535 counts; the full 16-bit
    /// range (`ARR = 0xFFFF`) isn't reachable.
    pub const fn new(prescaler: u16, period: u16, compare: u16) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if compare > period {
            return Err(ConfigError::CompareExceedsPeriod);
        }

        Ok(Self {
            prescaler,
            period,
            compare,
        })
    }

    /// Divide `clock` down to 1 kHz and express period and pulse width in
    /// milliseconds.
    pub const fn from_millis(clock: Hertz, period_ms: u16, high_ms: u16) -> Result<Self, ConfigError> {
        let hz = clock.raw();
        if hz == 0 || hz % 1_000 != 0 {
            return Err(ConfigError::ClockNotDivisible);
        }

        let divisor = hz / 1_000;
        if divisor > 1 << 16 {
            return Err(ConfigError::PrescalerOutOfRange);
        }

        Self::new((divisor - 1) as u16, period_ms, high_ms)
    }

    /// Raw `PSC` value
    pub const fn prescaler(&self) -> u16 {
        self.prescaler
    }

    /// Counts per cycle
    pub const fn period(&self) -> u16 {
        self.period
    }

    /// Raw `CCRx` value
    pub const fn compare(&self) -> u16 {
        self.compare
    }

    /// Raw `ARR` value. The counter runs from 0 through `ARR` inclusive.
    pub const fn auto_reload(&self) -> u16 {
        self.period - 1
    }

    /// Input clock cycles per counter tick
    pub const fn divisor(&self) -> u32 {
        self.prescaler as u32 + 1
    }

    /// Input clock cycles per PWM cycle
    pub const fn period_ticks(&self) -> u64 {
        self.divisor() as u64 * self.period as u64
    }

    /// Input clock cycles per PWM cycle spent high
    pub const fn high_ticks(&self) -> u64 {
        self.divisor() as u64 * self.compare as u64
    }

    /// Frequency the counter advances at
    pub const fn counter_clock(&self, clock: Hertz) -> Hertz {
        Hertz::from_raw(clock.raw() / self.divisor())
    }

    /// Output frequency, truncated to whole hertz
    pub const fn frequency(&self, clock: Hertz) -> Hertz {
        Hertz::from_raw((clock.raw() as u64 / self.period_ticks()) as u32)
    }

    pub const fn period_duration(&self, clock: Hertz) -> MicrosDurationU64 {
        time::ticks_to_micros(self.period_ticks(), clock)
    }

    pub const fn high_duration(&self, clock: Hertz) -> MicrosDurationU64 {
        time::ticks_to_micros(self.high_ticks(), clock)
    }

    /// Duty cycle in tenths of a percent
    pub const fn duty_permille(&self) -> u32 {
        self.compare as u32 * 1_000 / self.period as u32
    }

    pub const fn is_always_high(&self) -> bool {
        self.compare == self.period
    }

    pub const fn is_always_low(&self) -> bool {
        self.compare == 0
    }

    /// Output level in PWM mode 1 while the counter holds `count`
    pub const fn level_at(&self, count: u16) -> bool {
        count < self.compare
    }
}

/// Register-definition interface the initializer drives
///
/// The implementor fixes which port, pin, timer and channel are used. Each
/// method is a single unconditional register write, or a read-modify-write of
/// one field.
pub trait PwmRegisters {
    /// Ungate the clock of the GPIO port
    fn enable_port_clock(&mut self);

    /// Clear the pin's 4-bit field, then set it to `config`
    fn configure_pin(&mut self, config: PinConfig);

    /// Ungate the clock of the timer
    fn enable_timer_clock(&mut self);

    fn set_prescaler(&mut self, psc: u16);

    fn set_auto_reload(&mut self, arr: u16);

    fn set_compare(&mut self, ccr: u16);

    /// Clear the channel's `OCxM` field, then set it to `mode`
    fn set_compare_mode(&mut self, mode: OutputCompareMode);

    /// Connect the channel's output to the pin
    fn enable_output(&mut self);

    /// Load the preloaded prescaler with an update event and clear the
    /// resulting update flag
    fn generate_update(&mut self);

    fn enable_counter(&mut self);
}

impl<R> PwmRegisters for &mut R
where
    R: PwmRegisters + ?Sized,
{
    fn enable_port_clock(&mut self) {
        (**self).enable_port_clock();
    }

    fn configure_pin(&mut self, config: PinConfig) {
        (**self).configure_pin(config);
    }

    fn enable_timer_clock(&mut self) {
        (**self).enable_timer_clock();
    }

    fn set_prescaler(&mut self, psc: u16) {
        (**self).set_prescaler(psc);
    }

    fn set_auto_reload(&mut self, arr: u16) {
        (**self).set_auto_reload(arr);
    }

    fn set_compare(&mut self, ccr: u16) {
        (**self).set_compare(ccr);
    }

    fn set_compare_mode(&mut self, mode: OutputCompareMode) {
        (**self).set_compare_mode(mode);
    }

    fn enable_output(&mut self) {
        (**self).enable_output();
    }

    fn generate_update(&mut self) {
        (**self).generate_update();
    }

    fn enable_counter(&mut self) {
        (**self).enable_counter();
    }
}

/// A PWM channel moving through its lifecycle
pub struct Pwm<R, STATE> {
    regs: R,
    config: PwmConfig,
    _state: PhantomData<STATE>,
}

impl<R, STATE> Pwm<R, STATE> {
    pub fn config(&self) -> &PwmConfig {
        &self.config
    }

    fn into_state<NEXT>(self) -> Pwm<R, NEXT> {
        Pwm {
            regs: self.regs,
            config: self.config,
            _state: PhantomData,
        }
    }
}

impl<R> Pwm<R, Disabled>
where
    R: PwmRegisters,
{
    pub fn new(regs: R, config: PwmConfig) -> Self {
        Pwm {
            regs,
            config,
            _state: PhantomData,
        }
    }

    /// Ungate the clocks, route the pin to the timer and program the prescaler,
    /// period, compare value and PWM mode 1. The output stays disconnected.
    pub fn configure(mut self) -> Pwm<R, Configured> {
        // GPIO registers ignore writes until the port is clocked
        self.regs.enable_port_clock();
        self.regs.configure_pin(PinConfig::ALTERNATE_PUSH_PULL_2MHZ);

        self.regs.enable_timer_clock();
        self.regs.set_prescaler(self.config.prescaler());
        self.regs.set_auto_reload(self.config.auto_reload());
        self.regs.set_compare(self.config.compare());
        self.regs.set_compare_mode(OutputCompareMode::PwmMode1);

        #[cfg(feature = "defmt")]
        defmt::debug!("pwm configured: {}", self.config);

        self.into_state()
    }
}

impl<R> Pwm<R, Configured>
where
    R: PwmRegisters,
{
    /// Connect the output and start counting. The counter enable is the last
    /// write: nothing toggles before it.
    pub fn start(mut self) -> Pwm<R, Running> {
        self.regs.enable_output();
        self.regs.generate_update();
        self.regs.enable_counter();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "pwm running: period {} counts, duty {} permille",
            self.config.period(),
            self.config.duty_permille()
        );

        self.into_state()
    }
}

impl<R> Pwm<R, Running> {
    /// Gives back the register set. The timer keeps running.
    pub fn release(self) -> R {
        self.regs
    }
}

/// Bring `regs` from reset into a running PWM output
pub fn init<R>(regs: R, config: PwmConfig) -> Pwm<R, Running>
where
    R: PwmRegisters,
{
    Pwm::new(regs, config).configure().start()
}

/// Initialize, then idle forever while the timer drives the pin
pub fn run<R>(regs: R, config: PwmConfig) -> !
where
    R: PwmRegisters,
{
    let _pwm = init(regs, config);

    loop {
        cortex_m::asm::nop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Calls {
        log: [Option<&'static str>; 16],
        len: usize,
    }

    impl Calls {
        fn push(&mut self, name: &'static str) {
            self.log[self.len] = Some(name);
            self.len += 1;
        }

        fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
            self.log[..self.len].iter().flatten().copied()
        }
    }

    impl PwmRegisters for Calls {
        fn enable_port_clock(&mut self) {
            self.push("port_clock");
        }
        fn configure_pin(&mut self, _: PinConfig) {
            self.push("pin");
        }
        fn enable_timer_clock(&mut self) {
            self.push("timer_clock");
        }
        fn set_prescaler(&mut self, _: u16) {
            self.push("psc");
        }
        fn set_auto_reload(&mut self, _: u16) {
            self.push("arr");
        }
        fn set_compare(&mut self, _: u16) {
            self.push("ccr");
        }
        fn set_compare_mode(&mut self, _: OutputCompareMode) {
            self.push("ccmr");
        }
        fn enable_output(&mut self) {
            self.push("ccer");
        }
        fn generate_update(&mut self) {
            self.push("egr");
        }
        fn enable_counter(&mut self) {
            self.push("cen");
        }
    }

    fn blink() -> PwmConfig {
        match PwmConfig::new(7999, 1000, 500) {
            Ok(config) => config,
            Err(e) => e.panic(),
        }
    }

    #[test]
    fn configure_stops_before_output() {
        let pwm = Pwm::new(Calls::default(), blink()).configure();
        let calls = pwm.into_state::<Running>().release();

        assert!(calls
            .names()
            .eq(["port_clock", "pin", "timer_clock", "psc", "arr", "ccr", "ccmr"]));
    }

    #[test]
    fn counter_enable_is_last() {
        let calls = init(Calls::default(), blink()).release();

        assert_eq!(calls.len, 10);
        assert_eq!(calls.names().last(), Some("cen"));
        assert_eq!(calls.names().filter(|n| *n == "cen").count(), 1);
    }

    #[test]
    fn reference_configuration() {
        let config = blink();
        let clock = Hertz::MHz(8);

        assert_eq!(config.counter_clock(clock), Hertz::kHz(1));
        assert_eq!(config.period_ticks(), 8_000_000);
        assert_eq!(config.frequency(clock), Hertz::Hz(1));
        assert_eq!(config.period_duration(clock).to_millis(), 1_000);
        assert_eq!(config.high_duration(clock).to_millis(), 500);
        assert_eq!(config.duty_permille(), 500);
        assert_eq!(config.auto_reload(), 999);
    }

    #[test]
    fn rejects_invalid_constants() {
        assert_eq!(PwmConfig::new(0, 0, 0), Err(ConfigError::ZeroPeriod));
        assert_eq!(PwmConfig::new(0, 100, 101), Err(ConfigError::CompareExceedsPeriod));
        assert_eq!(
            PwmConfig::from_millis(Hertz::Hz(8_000_500), 1000, 500),
            Err(ConfigError::ClockNotDivisible)
        );
        assert_eq!(
            PwmConfig::from_millis(Hertz::MHz(72), 1000, 500),
            Err(ConfigError::PrescalerOutOfRange)
        );
    }

    #[test]
    fn duty_extremes() {
        let full = PwmConfig::new(0, 10, 10).unwrap();
        assert!(full.is_always_high());
        assert!((0..10).all(|count| full.level_at(count)));

        let off = PwmConfig::new(0, 10, 0).unwrap();
        assert!(off.is_always_low());
        assert!((0..10).all(|count| !off.level_at(count)));
    }
}
