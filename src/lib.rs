//! Hardware PWM LED blinky for the STM32F1xx family of microcontrollers
//!
//! `TIM2` is brought from its reset state into free-running PWM mode 1 and
//! routed to a GPIOA pin in alternate-function mode. Once the counter is
//! enabled the waveform is produced entirely by the timer; the CPU idles.

#![no_std]
#![allow(non_camel_case_types)]

#[cfg(all(feature = "rt", not(feature = "device-selected")))]
compile_error!(
    "This crate requires one of the following device features enabled:
        stm32f100xb
        stm32f101xb
        stm32f103x8
        stm32f103xb
                "
);

#[cfg(feature = "stm32f100xb")]
pub use stm32f1::stm32f100 as pac;

#[cfg(feature = "stm32f101xb")]
pub use stm32f1::stm32f101 as pac;

#[cfg(any(feature = "stm32f103x8", feature = "stm32f103xb"))]
pub use stm32f1::stm32f103 as pac;

#[cfg(feature = "device-selected")]
pub mod blinky;

#[cfg(feature = "device-selected")]
pub mod prelude;

#[cfg(feature = "device-selected")]
pub mod rcc;

pub mod config;
pub mod gpio;
pub mod pwm;
pub mod time;
pub mod timer;

#[cfg(feature = "sim")]
pub mod sim;

pub mod state {
    //! Lifecycle of a PWM channel
    //!
    //! The states only ever advance: `Disabled` → `Configured` → `Running`.

    /// Reset default, the channel output is not connected
    pub struct Disabled;

    /// Clocks, pin, prescaler, period, compare value and mode are set
    pub struct Configured;

    /// Output and counter enabled, the waveform is active
    pub struct Running;
}
