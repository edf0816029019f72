//! Behaviours that differ between historical CHIP-8 interpreters.
//!
//! Useful links:
//! * [CHIP-8 quirks test](https://github.com/Timendus/chip8-test-suite#quirks-test)
//! * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Quirks {
    /// 8XY0-8XY3: reset VF to 0 after copy/OR/AND/XOR (COSMAC VIP)
    pub logic_resets_flag: bool,
    /// 8XY6/8XYE: shift VX in place instead of shifting VY into VX (CHIP-48 and SUPER-CHIP)
    pub shift_in_place: bool,
    /// FX55/FX65: leave I pointing past the last register transferred (COSMAC VIP)
    pub load_store_increments_index: bool,
    /// BNNN/BXNN: jump to XNN plus VX (CHIP-48 and SUPER-CHIP) instead of NNN plus V0
    pub jump_with_vx: bool,
    /// DXYN: sprite rows past the bottom edge wrap to the top instead of being clipped
    pub wrap_vertical: bool,
}

impl Quirks {
    pub const fn cosmac_vip() -> Quirks {
        Quirks {
            logic_resets_flag: true,
            shift_in_place: false,
            load_store_increments_index: true,
            jump_with_vx: false,
            wrap_vertical: false,
        }
    }

    pub const fn chip48() -> Quirks {
        Quirks {
            logic_resets_flag: false,
            shift_in_place: true,
            load_store_increments_index: false,
            jump_with_vx: true,
            wrap_vertical: false,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::cosmac_vip()
    }
}
