//! TIM2 PWM output on GPIOA
//!
//! Channel `n` of TIM2 comes out on `PA(n-1)` with the default (unremapped)
//! pin mapping: CH1 on PA0, CH2 on PA1, CH3 on PA2, CH4 on PA3.

use crate::gpio::{self, ConfigRegister, PinConfig};
use crate::pac::{GPIOA, TIM2};
use crate::pwm::PwmRegisters;
use crate::rcc::{Enable, APB1, APB2};
use crate::timer::{self, Channel, OutputCompareMode};

/// The registers one TIM2 channel and its GPIOA pin are driven through
pub struct Tim2Pwm {
    gpioa: GPIOA,
    tim: TIM2,
    apb1: APB1,
    apb2: APB2,
    channel: Channel,
}

impl Tim2Pwm {
    pub fn new(gpioa: GPIOA, tim: TIM2, apb1: APB1, apb2: APB2, channel: Channel) -> Self {
        Self {
            gpioa,
            tim,
            apb1,
            apb2,
            channel,
        }
    }
}

impl PwmRegisters for Tim2Pwm {
    fn enable_port_clock(&mut self) {
        GPIOA::enable(&mut self.apb2);
    }

    #[allow(unused_unsafe)]
    fn configure_pin(&mut self, config: PinConfig) {
        let pin = self.channel.tim2_pin();
        match ConfigRegister::of(pin) {
            ConfigRegister::Low => self
                .gpioa
                .crl
                .modify(|r, w| unsafe { w.bits(gpio::modify_cr(r.bits(), pin, config)) }),
            ConfigRegister::High => self
                .gpioa
                .crh
                .modify(|r, w| unsafe { w.bits(gpio::modify_cr(r.bits(), pin, config)) }),
        }
    }

    fn enable_timer_clock(&mut self) {
        TIM2::enable(&mut self.apb1);
    }

    #[allow(unused_unsafe)]
    fn set_prescaler(&mut self, psc: u16) {
        self.tim.psc.write(|w| unsafe { w.bits(u32::from(psc)) });
    }

    #[allow(unused_unsafe)]
    fn set_auto_reload(&mut self, arr: u16) {
        self.tim.arr.write(|w| unsafe { w.bits(u32::from(arr)) });
    }

    #[allow(unused_unsafe)]
    fn set_compare(&mut self, ccr: u16) {
        let ccr = u32::from(ccr);
        match self.channel {
            Channel::C1 => self.tim.ccr1().write(|w| unsafe { w.bits(ccr) }),
            Channel::C2 => self.tim.ccr2().write(|w| unsafe { w.bits(ccr) }),
            Channel::C3 => self.tim.ccr3().write(|w| unsafe { w.bits(ccr) }),
            Channel::C4 => self.tim.ccr4().write(|w| unsafe { w.bits(ccr) }),
        }
    }

    #[allow(unused_unsafe)]
    fn set_compare_mode(&mut self, mode: OutputCompareMode) {
        let channel = self.channel;
        match channel {
            Channel::C1 | Channel::C2 => self
                .tim
                .ccmr1_output()
                .modify(|r, w| unsafe { w.bits(timer::modify_ccmr(r.bits(), channel, mode)) }),
            Channel::C3 | Channel::C4 => self
                .tim
                .ccmr2_output()
                .modify(|r, w| unsafe { w.bits(timer::modify_ccmr(r.bits(), channel, mode)) }),
        }
    }

    #[allow(unused_unsafe)]
    fn enable_output(&mut self) {
        let mask = self.channel.cce_mask();
        self.tim.ccer.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
    }

    fn generate_update(&mut self) {
        // Trigger an update event to load the prescaler value to the clock
        self.tim.egr.write(|w| w.ug().set_bit());
        // The above line raises an update event which will indicate
        // that the timer is already finished. Since this is not the case,
        // it should be cleared
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
    }

    fn enable_counter(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }
}
