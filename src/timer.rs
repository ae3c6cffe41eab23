//! General purpose timer register encodings (TIM2..TIM5)

/// Capture/compare channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    C1,
    C2,
    C3,
    C4,
}

impl Channel {
    /// Zero-based channel index
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// GPIOA pin carrying this TIM2 channel without remapping (`TIM2_REMAP = 00`)
    pub const fn tim2_pin(self) -> u8 {
        self.index()
    }

    /// Offset of `OCxM` within `CCMR1` (channels 1, 2) or `CCMR2` (channels 3, 4)
    pub const fn ocm_offset(self) -> u32 {
        match self {
            Channel::C1 | Channel::C3 => 4,
            Channel::C2 | Channel::C4 => 12,
        }
    }

    /// `CCxE` bit in `CCER`
    pub const fn cce_mask(self) -> u32 {
        1 << (4 * self.index() as u32)
    }
}

/// OCxM[2:0] (Output Compare Mode) field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputCompareMode {
    /// Frozen - the comparison between `CCRx` and `CNT` has no effect on the output (reset
    /// state).
    Frozen = 0b000,

    /// Set channel to active level on match.
    ActiveOnMatch = 0b001,

    /// Set channel to inactive level on match.
    InactiveOnMatch = 0b010,

    /// Toggle - `OCxREF` toggles when `CNT` = `CCRx`.
    Toggle = 0b011,

    /// Force inactive level - `OCxREF` is forced low.
    ForceInactive = 0b100,

    /// Force active level - `OCxREF` is forced high.
    ForceActive = 0b101,

    /// PWM mode 1 - in upcounting, the channel is active as long as `CNT` < `CCRx`, else
    /// inactive.
    PwmMode1 = 0b110,

    /// PWM mode 2 - in upcounting, the channel is inactive as long as `CNT` < `CCRx`, else
    /// active.
    PwmMode2 = 0b111,
}

impl OutputCompareMode {
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b111 {
            0b000 => Self::Frozen,
            0b001 => Self::ActiveOnMatch,
            0b010 => Self::InactiveOnMatch,
            0b011 => Self::Toggle,
            0b100 => Self::ForceInactive,
            0b101 => Self::ForceActive,
            0b110 => Self::PwmMode1,
            _ => Self::PwmMode2,
        }
    }
}

/// `CR1.CEN`, counter enable
pub const CR1_CEN: u32 = 1 << 0;

/// `EGR.UG`, update generation
pub const EGR_UG: u32 = 1 << 0;

/// `SR.UIF`, update interrupt flag
pub const SR_UIF: u32 = 1 << 0;

/// Clear `channel`'s `OCxM` field in the matching `CCMRx` value, then set it to `mode`
pub const fn modify_ccmr(ccmr: u32, channel: Channel, mode: OutputCompareMode) -> u32 {
    let offset = channel.ocm_offset();
    (ccmr & !(0b111 << offset)) | ((mode as u32) << offset)
}

/// Decode `channel`'s `OCxM` field from a `CCMRx` value
pub const fn read_ccmr(ccmr: u32, channel: Channel) -> OutputCompareMode {
    OutputCompareMode::from_bits(ccmr >> channel.ocm_offset())
}
