/// Delay and sound timers, driven by an external 60Hz tick counter.
///
/// The host passes its tick counter on every step; the timers only decay when
/// that counter moves, however many instructions run in between.
#[derive(Clone, Debug, Default)]
pub struct Timers {
    /// Delay timer
    delay: u8,
    /// Sound timer
    sound: u8,
    /// Tick seen on the previous step, `None` until the first step after a reset
    last_tick: Option<u64>,
    /// Sound timer value that decides this step's beeper output
    sound_gate: u8,
}

impl Timers {
    pub fn new() -> Timers {
        Timers::default()
    }

    pub fn reset(&mut self) {
        *self = Timers::default();
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    /// Writing the sound timer also replaces the value the current step's
    /// beeper output is computed from.
    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
        self.sound_gate = value;
    }

    /// Start a step at `tick`: remember the sound timer before decay, then
    /// decay both timers by the number of ticks elapsed since the last step.
    pub fn advance(&mut self, tick: u64) {
        self.sound_gate = self.sound;

        let elapsed = match self.last_tick {
            // Counter went backwards: resync without decaying
            Some(last) if tick < last => 0,
            Some(last) => tick - last,
            None => 0,
        };
        self.last_tick = Some(tick);

        if elapsed > 0 {
            self.delay = decay(self.delay, elapsed);
            self.sound = decay(self.sound, elapsed);
        }
    }

    /// Beeper state for the current step. A single remaining tick of sound
    /// timer is silent on the COSMAC VIP.
    pub fn sound_on(&self) -> bool {
        self.sound_gate > 1
    }
}

fn decay(value: u8, elapsed: u64) -> u8 {
    let step = elapsed.min(value as u64) as u8;
    value - step
}
