//! Blinks an LED on PA0 at 1 Hz, 50 % duty, from TIM2 channel 1
//!
//! The LED and a 1k series resistor go between PA0 and ground. After the
//! timer is started the core does nothing; the blinking is pure hardware.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

use panic_halt as _;

#[cfg(feature = "defmt")]
use defmt_rtt as _;

use cortex_m_rt::entry;
use stm32f1xx_pwm_blinky::{blinky::Tim2Pwm, config, pac, prelude::*, pwm};

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();

    let rcc = dp.RCC.constrain();

    #[cfg(feature = "defmt")]
    defmt::info!(
        "sysclk {} Hz, timer clock {} Hz, blinking every {} ms",
        rcc.clocks.sysclk().raw(),
        rcc.clocks.timclk1().raw(),
        config::BLINK.period_duration(rcc.clocks.timclk1()).to_millis()
    );

    let regs = Tim2Pwm::new(dp.GPIOA, dp.TIM2, rcc.apb1, rcc.apb2, config::LED_CHANNEL);

    pwm::run(regs, config::BLINK)
}
