/// Latched state of the 16-key hex keypad. Bit `n` of a mask is key `n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    current: u16,
    previous: u16,
}

impl Keypad {
    /// Latch the mask supplied for this step, keeping the last one for
    /// transition detection.
    pub fn latch(&mut self, keys: u16) {
        self.previous = self.current;
        self.current = keys;
    }

    pub fn reset(&mut self) {
        *self = Keypad::default();
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.current & (1 << (key & 0xF)) != 0
    }

    /// Lowest key that is down now but was up on the previous step.
    pub fn newly_pressed(&self) -> Option<u8> {
        let pressed = self.current & !self.previous;
        if pressed == 0 {
            None
        } else {
            Some(pressed.trailing_zeros() as u8)
        }
    }
}
