//! Whole-program runs through the public API only.

use chip_8_core::{Chip8, Chip8Builder, Chip8Error, MEMORY_SIZE};
use pretty_assertions::assert_eq;

/// Split instruction words into big-endian program bytes.
fn program(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn setup(words: &[u16]) -> Chip8 {
    Chip8Builder::new()
        .with_rom(program(words))
        .with_rng_seed(7)
        .build()
        .unwrap()
}

/// Host inputs for one run.
struct Host {
    keys: u16,
    ticks: u64,
    sound: bool,
}

impl Host {
    fn new() -> Host {
        Host {
            keys: 0,
            ticks: 0,
            sound: false,
        }
    }

    fn cycle(&mut self, chip: &mut Chip8) {
        self.sound = chip.step(self.keys, self.ticks).unwrap();
    }

    fn cycle_pc(&mut self, chip: &mut Chip8, pc: u16) {
        self.cycle(chip);
        assert_eq!(chip.pc(), pc, "PC != 0x{:04x}", pc);
    }

    fn cycle_vx(&mut self, chip: &mut Chip8, vx: usize, value: u8) {
        self.cycle(chip);
        assert_eq!(chip.register(vx), value, "V{:X} != 0x{:02x}", vx, value);
    }

    fn cycle_i(&mut self, chip: &mut Chip8, index: u16) {
        self.cycle(chip);
        assert_eq!(chip.index(), index, "I != 0x{:04x}", index);
    }
}

#[test]
fn test_load_initial_state() {
    let chip = setup(&[0x1200]);

    assert_eq!(chip.pc(), 0x200);
    assert_eq!(chip.stack_pointer(), 0);
    assert_eq!(chip.delay_timer(), 0);
    assert_eq!(chip.sound_timer(), 0);
    assert_eq!(chip.waiting_for_key(), None);
    // "0" glyph at the start of memory
    assert_eq!(chip.memory_byte(0x000), 0xF0);
    assert_eq!(chip.memory_byte(0x001), 0x90);
}

#[test]
fn test_build_rejects_large_rom() {
    let res = Chip8Builder::new().with_rom(vec![0; 4000]).build();

    assert!(matches!(
        res,
        Err(Chip8Error::ProgramTooLarge {
            size: 4000,
            max: 3584
        })
    ));
}

#[test]
fn test_jump_then_set() {
    let mut chip = setup(&[0x1204, 0x0000, 0x6028, 0x6129]);
    let mut host = Host::new();

    host.cycle_pc(&mut chip, 0x204);
    host.cycle(&mut chip);
    host.cycle(&mut chip);

    assert_eq!(chip.register(0), 0x28);
    assert_eq!(chip.register(1), 0x29);
}

#[test]
fn test_immediate_add_wraps_and_keeps_flag() {
    let mut chip = setup(&[0x60FF, 0x70FF]);
    let mut host = Host::new();
    chip.set_register(0xF, 0x2A);

    host.cycle(&mut chip);
    host.cycle(&mut chip);

    assert_eq!(chip.register(0), 0xFE);
    assert_eq!(chip.register(0xF), 0x2A);
}

#[test]
fn test_register_add_carries() {
    let mut chip = setup(&[0x6001, 0x61FF, 0x8014]);
    let mut host = Host::new();

    for _ in 0..3 {
        host.cycle(&mut chip);
    }

    assert_eq!(chip.register(0), 0x00);
    assert_eq!(chip.register(0xF), 0x01);
}

#[test]
fn test_accessor_round_trips() {
    let mut chip = setup(&[]);

    for reg in 0..16 {
        chip.set_register(reg, 0xA0 + reg as u8);
    }
    for reg in 0..16 {
        assert_eq!(chip.register(reg), 0xA0 + reg as u8);
    }

    for addr in (0..MEMORY_SIZE as u16).step_by(7) {
        chip.set_memory_byte(addr, (addr % 251) as u8);
    }
    for addr in (0..MEMORY_SIZE as u16).step_by(7) {
        assert_eq!(chip.memory_byte(addr), (addr % 251) as u8);
    }
}

// general control-flow tests (no I/O, no ALU-with-carry-flag)
#[test]
fn test_control_flow_program() {
    let prog = [
        /* 0x200 */ 0x1204, // jump to address 204 (third instruction)
        /* 0x202 */ 0x0000, // TRAP (shouldn't land here)
        /* 0x204 */ 0x6028, // V0 = 0x28
        /* 0x206 */ 0x6129, // V1 = 0x29
        /* 0x208 */ 0x622A, // V2 = 0x2A
        /* 0x20A */ 0x632B, // V3 = 0x2B
        /* 0x20C */ 0x7002, // V0 += 2 ( -> 0x2A)
        /* 0x20E */ 0x7102, // V1 += 2 ( -> 0x2B)
        /* 0x210 */ 0x7202, // V2 += 2 ( -> 0x2C)
        /* 0x212 */ 0x7302, // V3 += 2 ( -> 0x2D)
        /* 0x214 */ 0x302A, // skip if V0 == 0x2A (TAKEN)
        /* 0x216 */ 0x0000, // TRAP
        /* 0x218 */ 0x402A, // skip if V0 != 0x2A (NOT TAKEN)
        /* 0x21A */ 0x4299, // skip if V2 != 0x99 (TAKEN)
        /* 0x21C */ 0x0000, // TRAP
        /* 0x21E */ 0x1230, // skip over the subroutine ahead
        /* 0x220 */ 0x9120, // skip if V1 != V2 (TAKEN)
        /* 0x222 */ 0x0000, // TRAP
        /* 0x224 */ 0xA20A, // I = 0x20A
        /* 0x226 */ 0x7002, // V0 += 2 ( -> 0x2C)
        /* 0x228 */ 0x5020, // skip if V0 == V2 (TAKEN)
        /* 0x22A */ 0x0000, // TRAP
        /* 0x22C */ 0xF165, // V0 = RAM[0x20A], V1 = RAM[0x20B], I = 0x20C
        /* 0x22E */ 0x00EE, // return from subroutine
        /* 0x230 */ 0x2220, // call 0x220
        /* 0x232 */ 0xA300, // I = 0x300
        /* 0x234 */ 0xF355, // store V0-V3 into RAM[I..I+3] (and I += 4)
    ];
    let mut chip = setup(&prog);
    let mut host = Host::new();

    assert_eq!(chip.pc(), 0x200);
    assert_eq!(chip.memory_byte(0x200), 0x12);
    assert_eq!(chip.memory_byte(0x201), 0x04);

    host.cycle_pc(&mut chip, 0x204);
    host.cycle_vx(&mut chip, 0, 0x28);
    host.cycle_vx(&mut chip, 1, 0x29);
    host.cycle_vx(&mut chip, 2, 0x2A);
    host.cycle_vx(&mut chip, 3, 0x2B);
    host.cycle_vx(&mut chip, 0, 0x2A);
    host.cycle_vx(&mut chip, 1, 0x2B);
    host.cycle_vx(&mut chip, 2, 0x2C);
    host.cycle_vx(&mut chip, 3, 0x2D);
    host.cycle_pc(&mut chip, 0x218);
    host.cycle_pc(&mut chip, 0x21A);
    host.cycle_pc(&mut chip, 0x21E);
    host.cycle_pc(&mut chip, 0x230);
    host.cycle_pc(&mut chip, 0x220);
    assert_eq!(chip.stack(), &[0x232]);
    host.cycle_pc(&mut chip, 0x224);
    host.cycle_i(&mut chip, 0x20A);
    host.cycle_vx(&mut chip, 0, 0x2C);
    host.cycle_pc(&mut chip, 0x22C);
    host.cycle_i(&mut chip, 0x20C);
    assert_eq!(chip.register(0), 0x63);
    assert_eq!(chip.register(1), 0x2B);
    host.cycle_pc(&mut chip, 0x232);
    assert_eq!(chip.stack_pointer(), 0);
    host.cycle_i(&mut chip, 0x300);
    host.cycle_i(&mut chip, 0x304);
    assert_eq!(
        (0x300..0x304).map(|a| chip.memory_byte(a)).collect::<Vec<_>>(),
        vec![0x63, 0x2B, 0x2C, 0x2D]
    );

    // Running off the end lands on zeroed memory, which traps
    assert_eq!(
        chip.step(0, 0),
        Err(Chip8Error::IllegalInstruction {
            opcode: 0x0000,
            address: 0x236
        })
    );
}

// core ALU (8XYN) operations with carry flag (VF) setting/clearing tests
#[test]
fn test_alu_flag_program() {
    let prog = [
        /* 0x200 */ 0x6001, // V0 = 0x01
        /* 0x202 */ 0x6102, // V1 = 0x02
        /* 0x204 */ 0x62FE, // V2 = 0xfe
        /* 0x206 */ 0x63FF, // V3 = 0xff
        /* 0x208 */ 0x8400, // V4 = V0 (0x01)
        /* 0x20A */ 0x8011, // V0 |= V1 (0x03; VF = 0)
        /* 0x20C */ 0x8022, // V0 &= V2 (0x02; VF = 0)
        /* 0x20E */ 0x70FF, // V0 += 0xFF (0x01; VF unchanged)
        /* 0x210 */ 0x8303, // V3 ^= V0 (0xfe; VF = 0)
        /* 0x212 */ 0x8303, // V3 ^= V0 (0xff; VF = 0)
        /* 0x214 */ 0x8024, // V0 += V2 (0xff; VF = 0)
        /* 0x216 */ 0x6001, // V0 = 0x01
        /* 0x218 */ 0x8034, // V0 += V3 (0x00; VF = 1)
        /* 0x21A */ 0x6001, // V0 = 0x01
        /* 0x21C */ 0x8105, // V1 -= V0 (0x01; VF = 1)
        /* 0x21E */ 0x6102, // V1 = 0x02
        /* 0x220 */ 0x8015, // V0 -= V1 (0xff; VF = 0)
        /* 0x222 */ 0x6001, // V0 = 0x01
        /* 0x224 */ 0x8017, // V0 = V1 - V0 (0x01; VF = 1)
        /* 0x226 */ 0x6001, // V0 = 0x01
        /* 0x228 */ 0x8107, // V1 = V0 - V1 (0xff; VF = 0)
        /* 0x22A */ 0x6102, // V1 = 0x02
        /* 0x22C */ 0x8E06, // VE = V0 >> 1 (0x00; VF = 1)
        /* 0x22E */ 0x8E16, // VE = V1 >> 1 (0x01; VF = 0)
        /* 0x230 */ 0x6A7F, // VA = 0x7f
        /* 0x232 */ 0x8EAE, // VE = VA << 1 (0xfe; VF = 0)
        /* 0x234 */ 0x8E3E, // VE = V3 << 1 (0xfe; VF = 1)
    ];
    let mut chip = setup(&prog);
    let mut host = Host::new();

    host.cycle_vx(&mut chip, 0, 0x01);
    host.cycle_vx(&mut chip, 1, 0x02);
    host.cycle_vx(&mut chip, 2, 0xfe);
    host.cycle_vx(&mut chip, 3, 0xff);
    host.cycle_vx(&mut chip, 4, 0x01);
    chip.set_register(15, 1);
    host.cycle_vx(&mut chip, 0, 0x03);
    assert_eq!(chip.register(15), 0);
    chip.set_register(15, 1);
    host.cycle_vx(&mut chip, 0, 0x02);
    assert_eq!(chip.register(15), 0);
    chip.set_register(15, 42);
    host.cycle_vx(&mut chip, 0, 0x01);
    assert_eq!(chip.register(15), 42);
    host.cycle_vx(&mut chip, 3, 0xfe);
    assert_eq!(chip.register(15), 0);
    host.cycle_vx(&mut chip, 3, 0xff);
    chip.set_register(15, 1);
    host.cycle_vx(&mut chip, 0, 0xff);
    assert_eq!(chip.register(15), 0);
    host.cycle_vx(&mut chip, 0, 0x01);
    host.cycle_vx(&mut chip, 0, 0x00);
    assert_eq!(chip.register(15), 1);
    host.cycle_vx(&mut chip, 0, 0x01);
    chip.set_register(15, 0);
    host.cycle_vx(&mut chip, 1, 0x01);
    assert_eq!(chip.register(15), 1);
    host.cycle_vx(&mut chip, 1, 0x02);
    host.cycle_vx(&mut chip, 0, 0xff);
    assert_eq!(chip.register(15), 0);
    host.cycle_vx(&mut chip, 0, 0x01);
    chip.set_register(15, 0);
    host.cycle_vx(&mut chip, 0, 0x01);
    assert_eq!(chip.register(15), 1);
    host.cycle_vx(&mut chip, 0, 0x01);
    host.cycle_vx(&mut chip, 1, 0xff);
    assert_eq!(chip.register(15), 0);
    host.cycle_vx(&mut chip, 1, 0x02);
    chip.set_register(15, 0);
    host.cycle_vx(&mut chip, 14, 0x00);
    assert_eq!(chip.register(15), 1);
    host.cycle_vx(&mut chip, 14, 0x01);
    assert_eq!(chip.register(15), 0);
    host.cycle_vx(&mut chip, 10, 0x7f);
    host.cycle_vx(&mut chip, 14, 0xfe);
    assert_eq!(chip.register(15), 0);
    host.cycle_vx(&mut chip, 14, 0xfe);
    assert_eq!(chip.register(15), 1);
}

// timer, sound-state, and key status/press tests
#[test]
fn test_timer_sound_and_key_program() {
    let prog = [
        /* 0x200 */ 0x1200, // jump-to-self
        /* 0x202 */ 0xE09E, // skip-if-key-VX-is-down
        /* 0x204 */ 0xE0A1, // skip-if-key-VX-is-NOT-down
        /* 0x206 */ 0xF107, // copy delay timer into V1
        /* 0x208 */ 0xF115, // set delay timer to value from V1
        /* 0x20A */ 0xF218, // set sound timer to value from V2
        /* 0x20C */ 0xF30A, // wait for keypress, store index in V3
        /* 0x20E */ 0x8000, // V0 = V0
        /* 0x210 */ 0x1210, // another infinite loop in place
    ];
    let mut chip = setup(&prog);
    let mut host = Host::new();

    // EX9E (skip-if-key-down)
    chip.set_pc(0x202);
    chip.set_register(0, 0);
    host.keys = 0x0002;
    host.cycle_pc(&mut chip, 0x204);
    chip.set_pc(0x202);
    chip.set_register(0, 1);
    host.cycle_pc(&mut chip, 0x206);

    // EXA1 (skip-if-key-up)
    chip.set_pc(0x204);
    chip.set_register(0, 0);
    host.cycle_pc(&mut chip, 0x208);
    chip.set_pc(0x204);
    chip.set_register(0, 1);
    host.cycle_pc(&mut chip, 0x206);

    // FX15/FX07 simple setting/getting
    host.keys = 0;
    chip.set_pc(0x208);
    chip.set_register(1, 3);
    host.cycle_pc(&mut chip, 0x20A);
    chip.set_pc(0x206);
    chip.set_register(1, 0);
    host.cycle_vx(&mut chip, 1, 3);

    // delay timer holds until the tick moves
    for _ in 0..1000 {
        chip.set_pc(0x206);
        chip.set_register(1, 0xff);
        host.cycle_vx(&mut chip, 1, 3);
    }
    chip.set_pc(0x206);
    chip.set_register(1, 0xff);
    host.ticks += 1;
    host.cycle_vx(&mut chip, 1, 2);

    // multi-tick increment
    for _ in 0..1000 {
        chip.set_pc(0x206);
        chip.set_register(1, 0xff);
        host.cycle_vx(&mut chip, 1, 2);
    }
    chip.set_pc(0x206);
    chip.set_register(1, 0xff);
    host.ticks += 2;
    host.cycle_vx(&mut chip, 1, 0);

    // a sound timer of 1 stays silent
    chip.set_pc(0x20A);
    chip.set_register(2, 1);
    host.cycle_pc(&mut chip, 0x20C);
    assert!(!host.sound, "minimum sound activation tick test failed");

    chip.set_pc(0x20A);
    chip.set_register(2, 2);
    host.cycle_pc(&mut chip, 0x20C);
    assert!(host.sound, "sound activation test failed");

    chip.set_pc(0x200);
    for i in 0..1000 {
        host.cycle_pc(&mut chip, 0x200);
        assert!(host.sound, "sound deactivated early (loop #{})", i);
    }
    host.ticks += 1;
    host.cycle_pc(&mut chip, 0x200);
    assert!(host.sound, "sound deactivated early (1 tick)");
    host.ticks += 1;
    host.cycle_pc(&mut chip, 0x200);
    assert!(!host.sound, "sound failed to deactivate on timeout");

    // wait-for-keystroke: key F is already down when the wait starts
    host.keys = 0x8000;
    chip.set_pc(0x210);
    host.cycle_pc(&mut chip, 0x210);
    chip.set_pc(0x20C);
    for _ in 0..1000 {
        host.cycle_pc(&mut chip, 0x20C);
    }
    assert_eq!(chip.waiting_for_key(), Some(3));
    host.keys |= 0x10;
    host.cycle_pc(&mut chip, 0x20E);
    assert_eq!(chip.register(3), 0x04);
    assert_eq!(chip.waiting_for_key(), None);

    // wait-for-keystroke while the delay timer runs
    chip.set_register(1, 2);
    chip.set_pc(0x208);
    host.cycle_pc(&mut chip, 0x20A);

    chip.set_pc(0x20C);
    host.keys = 0x8000;
    host.cycle_pc(&mut chip, 0x20C);
    host.ticks += 1;
    host.cycle_pc(&mut chip, 0x20C);
    host.keys |= 0x20;
    host.cycle_pc(&mut chip, 0x20E);
    assert_eq!(chip.register(3), 0x05);

    chip.set_register(1, 0xff);
    chip.set_pc(0x206);
    host.cycle_vx(&mut chip, 1, 1);
}

#[test]
fn test_draw_font_digit() {
    // V0 = 7, I = font(V0), draw at (V1, V2) = (60, 0)
    let mut chip = setup(&[0x6007, 0x613C, 0xF029, 0xD125]);
    let mut host = Host::new();

    for _ in 0..4 {
        host.cycle(&mut chip);
    }

    assert_eq!(chip.index(), 7 * 5);
    assert_eq!(chip.register(0xF), 0);
    let fb = chip.framebuffer();
    // top row of "7" is 0xF0, so columns 60..63 are lit
    for x in 60..64 {
        assert_eq!(fb.pixel(x, 0), 1);
    }
    // second row is 0x10: the fourth column lands on 63
    assert_eq!(fb.pixel(63, 1), 1);
    assert_eq!(fb.pixel(60, 1), 0);
    assert!(fb.buffer().iter().all(|&p| p <= 1));
}
