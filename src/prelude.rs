pub use fugit::{ExtU32 as _, RateExtU32 as _};

pub use crate::rcc::RccExt as _stm32f1xx_pwm_blinky_rcc_RccExt;
