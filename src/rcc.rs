//! Reset and clock control
//!
//! Only peripheral clock gating is exposed. The system clock is left at its
//! reset configuration: HSI at 8 MHz, no PLL, all bus prescalers at 1.

use crate::pac::{rcc, GPIOA, RCC, TIM2};
use crate::time::Hertz;

/// Extension trait that constrains the `RCC` peripheral
pub trait RccExt {
    /// Constrains the `RCC` peripheral so it plays nicely with the other abstractions
    fn constrain(self) -> Rcc;
}

impl RccExt for RCC {
    fn constrain(self) -> Rcc {
        Rcc {
            apb1: APB1 { _0: () },
            apb2: APB2 { _0: () },
            clocks: Clocks::RESET,
        }
    }
}

/// Constrained RCC peripheral
pub struct Rcc {
    /// Advanced Peripheral Bus 1 (APB1) registers
    pub apb1: APB1,
    /// Advanced Peripheral Bus 2 (APB2) registers
    pub apb2: APB2,
    pub clocks: Clocks,
}

/// Advanced Peripheral Bus 1 (APB1) registers
pub struct APB1 {
    _0: (),
}

impl APB1 {
    pub(crate) fn enr(&mut self) -> &rcc::APB1ENR {
        // NOTE(unsafe) this proxy grants exclusive access to this register
        unsafe { &(*RCC::ptr()).apb1enr }
    }
}

/// Advanced Peripheral Bus 2 (APB2) registers
pub struct APB2 {
    _0: (),
}

impl APB2 {
    pub(crate) fn enr(&mut self) -> &rcc::APB2ENR {
        // NOTE(unsafe) this proxy grants exclusive access to this register
        unsafe { &(*RCC::ptr()).apb2enr }
    }
}

/// Bus a peripheral's clock gate lives on
pub trait RccBus {
    type Bus;
}

/// Peripheral clock gating
pub trait Enable: RccBus {
    /// Set the peripheral's enable bit. Its registers ignore writes until then.
    fn enable(bus: &mut Self::Bus);
}

impl RccBus for GPIOA {
    type Bus = APB2;
}

impl Enable for GPIOA {
    fn enable(apb: &mut APB2) {
        apb.enr().modify(|_, w| w.iopaen().set_bit());
    }
}

impl RccBus for TIM2 {
    type Bus = APB1;
}

impl Enable for TIM2 {
    fn enable(apb: &mut APB1) {
        apb.enr().modify(|_, w| w.tim2en().set_bit());
    }
}

const HSI: u32 = 8_000_000; // Hz

/// Frozen clock frequencies
///
/// Always the reset configuration; this crate never reprograms the clock tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    pclk1: Hertz,
    sysclk: Hertz,
}

impl Clocks {
    /// HSI, no PLL, `HPRE`, `PPRE1` and `PPRE2` all dividing by 1
    pub const RESET: Self = Clocks {
        pclk1: Hertz::from_raw(HSI),
        sysclk: Hertz::from_raw(HSI),
    };

    /// Returns the frequency of the APB1
    pub fn pclk1(&self) -> Hertz {
        self.pclk1
    }

    /// Returns the system (core) frequency
    pub fn sysclk(&self) -> Hertz {
        self.sysclk
    }

    /// Returns the frequency for timers on APB1
    ///
    /// Timer clocks are doubled only when `PPRE1` divides, which it doesn't at reset.
    pub fn timclk1(&self) -> Hertz {
        self.pclk1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::INPUT_CLOCK;

    #[test]
    fn reset_clocks_match_configured_input() {
        let clocks = Clocks::RESET;
        assert_eq!(clocks.timclk1(), INPUT_CLOCK);
        assert_eq!(clocks.sysclk(), Hertz::MHz(8));
        assert_eq!(clocks.pclk1(), clocks.sysclk());
    }
}
