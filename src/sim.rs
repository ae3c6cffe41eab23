//! Emulated RCC, GPIOA and TIM2 for host-side checks
//!
//! [`Board`] implements [`PwmRegisters`] on plain integers laid out like the
//! STM32F1 registers and advances the timer one input clock cycle per
//! [`Board::tick`]. It models what the initialization sequence depends on:
//!
//! - writes to a peripheral whose clock is gated off are dropped
//! - `PSC` is preloaded and only takes effect on an update event
//! - the counter runs from 0 through `ARR`, one step per `PSC + 1` cycles
//! - in PWM mode 1 `OCxREF` is high while `CNT < CCRx`, PWM mode 2 inverts it
//! - the pin follows `OCxREF` only in alternate-function output mode with
//!   `CCxE` set
//!
//! Match-driven modes (active/inactive on match, toggle) are not modelled;
//! like `Frozen` they hold the reference level.

use heapless::Vec;

use crate::gpio::{self, ConfigRegister, PinConfig, CR_RESET};
use crate::pwm::PwmRegisters;
use crate::timer::{self, Channel, OutputCompareMode, CR1_CEN, EGR_UG, SR_UIF};

/// Number of register writes the board remembers
pub const LOG_CAPACITY: usize = 32;

/// `RCC_APB2ENR.IOPAEN`
const IOPAEN: u32 = 1 << 2;
/// `RCC_APB1ENR.TIM2EN`
const TIM2EN: u32 = 1 << 0;

/// Emulated registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Apb1enr,
    Apb2enr,
    GpioaCrl,
    GpioaCrh,
    Cr1,
    Sr,
    Egr,
    Ccmr1,
    Ccmr2,
    Ccer,
    Psc,
    Arr,
    Ccr(Channel),
}

impl Register {
    fn is_gpioa(self) -> bool {
        matches!(self, Register::GpioaCrl | Register::GpioaCrh)
    }

    fn is_tim2(self) -> bool {
        !self.is_gpioa() && !matches!(self, Register::Apb1enr | Register::Apb2enr)
    }
}

/// One logged register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub register: Register,
    pub value: u32,
    /// `false` when the peripheral's clock was off and the write was dropped
    pub accepted: bool,
}

/// Electrical state of the LED pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    /// Input mode, nothing drives the pin
    Floating,
    Low,
    High,
}

/// Register contents that define the operating configuration
///
/// Counter value and status flags are left out, they change on their own
/// once the timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub apb1enr: u32,
    pub apb2enr: u32,
    pub crl: u32,
    pub crh: u32,
    pub cr1: u32,
    pub ccmr1: u32,
    pub ccmr2: u32,
    pub ccer: u32,
    pub psc: u32,
    pub arr: u32,
    pub ccr: [u32; 4],
}

pub struct Board {
    channel: Channel,

    apb1enr: u32,
    apb2enr: u32,

    crl: u32,
    crh: u32,

    cr1: u32,
    sr: u32,
    ccmr1: u32,
    ccmr2: u32,
    ccer: u32,
    cnt: u32,
    psc: u32,
    psc_shadow: u32,
    psc_cnt: u32,
    arr: u32,
    ccr: [u32; 4],
    oc_ref: bool,

    level: PinLevel,
    edges: u32,
    first_edge_after: Option<usize>,
    settle_ticks: u32,
    cycles: u64,
    log: Vec<Write, LOG_CAPACITY>,
}

impl Board {
    /// Power-on reset state, driving TIM2 `channel` on its default GPIOA pin
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            apb1enr: 0,
            apb2enr: 0,
            crl: CR_RESET,
            crh: CR_RESET,
            cr1: 0,
            sr: 0,
            ccmr1: 0,
            ccmr2: 0,
            ccer: 0,
            cnt: 0,
            psc: 0,
            psc_shadow: 0,
            psc_cnt: 0,
            arr: 0xFFFF,
            ccr: [0; 4],
            oc_ref: false,
            level: PinLevel::Floating,
            edges: 0,
            first_edge_after: None,
            settle_ticks: 0,
            cycles: 0,
            log: Vec::new(),
        }
    }

    /// Advance `ticks` input clock cycles after every register write
    pub fn with_settle_ticks(mut self, ticks: u32) -> Self {
        self.settle_ticks = ticks;
        self
    }

    /// Advance the timer by one input clock cycle
    pub fn tick(&mut self) {
        self.cycles += 1;

        if self.apb1enr & TIM2EN != 0 && self.cr1 & CR1_CEN != 0 {
            self.psc_cnt += 1;
            if self.psc_cnt > self.psc_shadow {
                self.psc_cnt = 0;
                if self.cnt >= self.arr {
                    self.cnt = 0;
                    self.psc_shadow = self.psc;
                    self.sr |= SR_UIF;
                } else {
                    self.cnt += 1;
                }
            }
        }

        let before = self.level;
        self.update_output();
        if Self::is_edge(before, self.level) {
            self.edges += 1;
            if self.first_edge_after.is_none() {
                self.first_edge_after = Some(self.log.len());
            }
        }
    }

    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    pub fn pin_level(&self) -> PinLevel {
        self.level
    }

    /// Live counter value
    pub fn counter(&self) -> u32 {
        self.cnt
    }

    /// Input clock cycles elapsed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Low/high transitions produced by the running timer. Level changes
    /// caused directly by a register write are not counted.
    pub fn edges(&self) -> u32 {
        self.edges
    }

    /// How many writes had been made when the first edge appeared
    pub fn first_edge_after(&self) -> Option<usize> {
        self.first_edge_after
    }

    pub fn writes(&self) -> &[Write] {
        &self.log
    }

    pub fn dropped_writes(&self) -> usize {
        self.log.iter().filter(|w| !w.accepted).count()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            apb1enr: self.apb1enr,
            apb2enr: self.apb2enr,
            crl: self.crl,
            crh: self.crh,
            cr1: self.cr1,
            ccmr1: self.ccmr1,
            ccmr2: self.ccmr2,
            ccer: self.ccer,
            psc: self.psc,
            arr: self.arr,
            ccr: self.ccr,
        }
    }

    fn is_edge(before: PinLevel, after: PinLevel) -> bool {
        matches!(
            (before, after),
            (PinLevel::Low, PinLevel::High) | (PinLevel::High, PinLevel::Low)
        )
    }

    fn clocked(&self, register: Register) -> bool {
        if register.is_gpioa() {
            self.apb2enr & IOPAEN != 0
        } else if register.is_tim2() {
            self.apb1enr & TIM2EN != 0
        } else {
            true
        }
    }

    fn write(&mut self, register: Register, value: u32) {
        let accepted = self.clocked(register);

        if accepted {
            match register {
                Register::Apb1enr => self.apb1enr = value,
                Register::Apb2enr => self.apb2enr = value,
                Register::GpioaCrl => self.crl = value,
                Register::GpioaCrh => self.crh = value,
                Register::Cr1 => self.cr1 = value & 0x3FF,
                // rc_w0: writing 0 clears, writing 1 keeps
                Register::Sr => self.sr &= value,
                Register::Egr => {
                    if value & EGR_UG != 0 {
                        self.cnt = 0;
                        self.psc_cnt = 0;
                        self.psc_shadow = self.psc;
                        self.sr |= SR_UIF;
                    }
                }
                Register::Ccmr1 => self.ccmr1 = value,
                Register::Ccmr2 => self.ccmr2 = value,
                Register::Ccer => self.ccer = value,
                Register::Psc => self.psc = value & 0xFFFF,
                Register::Arr => self.arr = value & 0xFFFF,
                Register::Ccr(channel) => self.ccr[channel.index() as usize] = value & 0xFFFF,
            }
            self.update_output();
        }

        // Full log only loses the record, not the write
        let _ = self.log.push(Write {
            register,
            value,
            accepted,
        });

        for _ in 0..self.settle_ticks {
            self.tick();
        }
    }

    fn ccmr(&self) -> u32 {
        match self.channel {
            Channel::C1 | Channel::C2 => self.ccmr1,
            Channel::C3 | Channel::C4 => self.ccmr2,
        }
    }

    fn update_output(&mut self) {
        let ccr = self.ccr[self.channel.index() as usize];
        self.oc_ref = match timer::read_ccmr(self.ccmr(), self.channel) {
            OutputCompareMode::PwmMode1 => self.cnt < ccr,
            OutputCompareMode::PwmMode2 => self.cnt >= ccr,
            OutputCompareMode::ForceActive => true,
            OutputCompareMode::ForceInactive => false,
            _ => self.oc_ref,
        };

        let pin = self.channel.tim2_pin();
        let cr = match ConfigRegister::of(pin) {
            ConfigRegister::Low => self.crl,
            ConfigRegister::High => self.crh,
        };
        let config = gpio::read_cr(cr, pin);

        self.level = if !config.is_output() {
            PinLevel::Floating
        } else if !config.is_alternate() || self.ccer & self.channel.cce_mask() == 0 {
            // ODR resets to 0, a disabled channel output is inactive
            PinLevel::Low
        } else if self.oc_ref {
            PinLevel::High
        } else {
            PinLevel::Low
        };
    }
}

impl PwmRegisters for Board {
    fn enable_port_clock(&mut self) {
        self.write(Register::Apb2enr, self.apb2enr | IOPAEN);
    }

    fn configure_pin(&mut self, config: PinConfig) {
        let pin = self.channel.tim2_pin();
        match ConfigRegister::of(pin) {
            ConfigRegister::Low => self.write(Register::GpioaCrl, gpio::modify_cr(self.crl, pin, config)),
            ConfigRegister::High => self.write(Register::GpioaCrh, gpio::modify_cr(self.crh, pin, config)),
        }
    }

    fn enable_timer_clock(&mut self) {
        self.write(Register::Apb1enr, self.apb1enr | TIM2EN);
    }

    fn set_prescaler(&mut self, psc: u16) {
        self.write(Register::Psc, u32::from(psc));
    }

    fn set_auto_reload(&mut self, arr: u16) {
        self.write(Register::Arr, u32::from(arr));
    }

    fn set_compare(&mut self, ccr: u16) {
        self.write(Register::Ccr(self.channel), u32::from(ccr));
    }

    fn set_compare_mode(&mut self, mode: OutputCompareMode) {
        match self.channel {
            Channel::C1 | Channel::C2 => {
                self.write(Register::Ccmr1, timer::modify_ccmr(self.ccmr1, self.channel, mode))
            }
            Channel::C3 | Channel::C4 => {
                self.write(Register::Ccmr2, timer::modify_ccmr(self.ccmr2, self.channel, mode))
            }
        }
    }

    fn enable_output(&mut self) {
        self.write(Register::Ccer, self.ccer | self.channel.cce_mask());
    }

    fn generate_update(&mut self) {
        self.write(Register::Egr, EGR_UG);
        self.write(Register::Sr, self.sr & !SR_UIF);
    }

    fn enable_counter(&mut self) {
        self.write(Register::Cr1, self.cr1 | CR1_CEN);
    }
}
