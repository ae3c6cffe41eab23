//! Pin configuration for the STM32F1 `CRL`/`CRH` registers
//!
//! Every pin owns a 4-bit field: `MODE[1:0]` in the low half selects input or
//! an output slew rate, `CNF[1:0]` in the high half selects the function.
//! Pins 0..=7 live in `CRL`, pins 8..=15 in `CRH`.

/// MODE[1:0]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Input (reset state)
    Input = 0b00,
    /// Output, max speed 10 MHz
    Output10MHz = 0b01,
    /// Output, max speed 2 MHz
    Output2MHz = 0b10,
    /// Output, max speed 50 MHz
    Output50MHz = 0b11,
}

/// CNF[1:0] when the pin is an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputKind {
    /// General purpose output push-pull
    PushPull = 0b00,
    /// General purpose output open-drain
    OpenDrain = 0b01,
    /// Alternate function output push-pull
    AlternatePushPull = 0b10,
    /// Alternate function output open-drain
    AlternateOpenDrain = 0b11,
}

/// CNF[1:0] when the pin is an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputKind {
    /// Analog mode
    Analog = 0b00,
    /// Floating input (reset state)
    Floating = 0b01,
    /// Input with pull-up / pull-down
    PullUpPullDown = 0b10,
}

/// Half of the port configuration register a pin lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigRegister {
    /// `CRL`, pins 0..=7
    Low,
    /// `CRH`, pins 8..=15
    High,
}

impl ConfigRegister {
    pub const fn of(pin: u8) -> Self {
        if pin < 8 {
            ConfigRegister::Low
        } else {
            ConfigRegister::High
        }
    }
}

/// Reset value of `CRL` and `CRH`: every pin is a floating input
pub const CR_RESET: u32 = 0x4444_4444;

/// Encoded 4-bit `CNF`/`MODE` field of one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig(u8);

impl PinConfig {
    /// Floating input, the power-on default
    pub const RESET: Self = Self::input(InputKind::Floating);

    /// Alternate function output, push-pull, 2 MHz slew rate
    pub const ALTERNATE_PUSH_PULL_2MHZ: Self =
        Self::output(OutputKind::AlternatePushPull, Mode::Output2MHz);

    pub const fn input(kind: InputKind) -> Self {
        Self(((kind as u8) << 2) | Mode::Input as u8)
    }

    /// `mode` must be one of the output speeds; `Mode::Input` yields an input
    /// encoding with the same `CNF` bits.
    pub const fn output(kind: OutputKind, mode: Mode) -> Self {
        Self(((kind as u8) << 2) | mode as u8)
    }

    /// Field value, right-aligned
    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self((bits & 0b1111) as u8)
    }

    pub const fn mode(self) -> Mode {
        match self.0 & 0b11 {
            0b00 => Mode::Input,
            0b01 => Mode::Output10MHz,
            0b10 => Mode::Output2MHz,
            _ => Mode::Output50MHz,
        }
    }

    pub const fn is_output(self) -> bool {
        !matches!(self.mode(), Mode::Input)
    }

    /// The pin is driven by a peripheral rather than `ODR`
    pub const fn is_alternate(self) -> bool {
        self.is_output() && (self.0 & 0b1000) != 0
    }
}

/// Bit offset of `pin`'s field inside its configuration register
pub const fn field_offset(pin: u8) -> u32 {
    4 * (pin as u32 % 8)
}

/// Clear `pin`'s field in `cr`, then set it to `config`.
///
/// The reset encoding (`CNF = 0b01`) has a bit the alternate encodings don't,
/// so OR-ing the new value over the old one would leave a mixed field.
pub const fn modify_cr(cr: u32, pin: u8, config: PinConfig) -> u32 {
    let offset = field_offset(pin);
    (cr & !(0b1111 << offset)) | (config.bits() << offset)
}

/// Decode `pin`'s field from a configuration register value
pub const fn read_cr(cr: u32, pin: u8) -> PinConfig {
    PinConfig::from_bits(cr >> field_offset(pin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternate_push_pull_2mhz_encoding() {
        // CNF = 0b10, MODE = 0b10
        assert_eq!(PinConfig::ALTERNATE_PUSH_PULL_2MHZ.bits(), 0b1010);
        assert!(PinConfig::ALTERNATE_PUSH_PULL_2MHZ.is_alternate());
    }

    #[test]
    fn reset_encoding_is_floating_input() {
        assert_eq!(PinConfig::RESET.bits(), 0b0100);
        assert!(!PinConfig::RESET.is_output());
        assert_eq!(read_cr(CR_RESET, 0), PinConfig::RESET);
        assert_eq!(read_cr(CR_RESET, 13), PinConfig::RESET);
    }

    #[test]
    fn modify_clears_reset_cnf_bit() {
        let cr = modify_cr(CR_RESET, 0, PinConfig::ALTERNATE_PUSH_PULL_2MHZ);
        assert_eq!(cr, 0x4444_444A);

        // OR-ing alone would have produced CNF = 0b11 (alternate open-drain)
        assert_ne!(CR_RESET | 0b1010, cr);
    }

    #[test]
    fn modify_only_touches_one_field() {
        let cr = modify_cr(CR_RESET, 3, PinConfig::ALTERNATE_PUSH_PULL_2MHZ);
        assert_eq!(cr, 0x4444_A444);

        let cr = modify_cr(CR_RESET, 9, PinConfig::output(OutputKind::PushPull, Mode::Output50MHz));
        assert_eq!(cr, 0x4444_4434);
        assert_eq!(ConfigRegister::of(9), ConfigRegister::High);
    }

    #[test]
    fn modify_is_idempotent() {
        let once = modify_cr(CR_RESET, 0, PinConfig::ALTERNATE_PUSH_PULL_2MHZ);
        let twice = modify_cr(once, 0, PinConfig::ALTERNATE_PUSH_PULL_2MHZ);
        assert_eq!(once, twice);
    }
}
