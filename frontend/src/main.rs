use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use chip_8_core::{
    Chip8, Chip8Builder, Chip8Color, Instruction, Quirks, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_FOREGROUND_COLOR, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use clap::{Parser, ValueEnum};
use log::{error, info};
use sdl2::{
    audio::{AudioCallback, AudioSpecDesired},
    event::Event,
    keyboard::{KeyboardState, Keycode, Scancode},
    pixels::PixelFormatEnum,
};

/// Keyboard bindings for the hex keypad:
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D  <-  Q W E R
/// 7 8 9 E      A S D F
/// A 0 B F      Z X C V
/// ```
///
/// with the arrow keys and space as alternates for 5/7/8/9 and 6.
const KEYPAD_BINDINGS: [(Scancode, u8); 21] = [
    (Scancode::Num1, 0x1),
    (Scancode::Num2, 0x2),
    (Scancode::Num3, 0x3),
    (Scancode::Num4, 0xC),
    (Scancode::Q, 0x4),
    (Scancode::W, 0x5),
    (Scancode::Up, 0x5),
    (Scancode::E, 0x6),
    (Scancode::Space, 0x6),
    (Scancode::R, 0xD),
    (Scancode::A, 0x7),
    (Scancode::Left, 0x7),
    (Scancode::S, 0x8),
    (Scancode::Down, 0x8),
    (Scancode::D, 0x9),
    (Scancode::Right, 0x9),
    (Scancode::F, 0xE),
    (Scancode::Z, 0xA),
    (Scancode::X, 0x0),
    (Scancode::C, 0xB),
    (Scancode::V, 0xF),
];

const TICK_HZ: u128 = 60;
const SAMPLE_RATE: i32 = 44_100;
const TONE_HZ: f32 = 440.0;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// COSMAC VIP behaviour
    Vip,
    /// CHIP-48 / SUPER-CHIP behaviour
    Chip48,
}

/// CHIP-8 Emulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file that will be executed
    #[clap(index = 1)]
    rom: PathBuf,

    /// Filepath to font file (80 bytes, 5 per hex digit)
    #[clap(long)]
    font: Option<PathBuf>,

    /// Background Color as HEX 0xAABBFF [default: 0x000000]
    #[clap(long)]
    background: Option<Chip8Color>,

    /// Foreground Color as HEX 0xAABBFF [default: 0xFFFFFF]
    #[clap(long)]
    foreground: Option<Chip8Color>,

    /// Display scaling factor
    #[clap(short, long, default_value_t = 10)]
    scale: u32,

    /// Instructions per second
    #[clap(short, long, default_value_t = 700)]
    ips: u32,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Interpreter quirks to emulate
    #[clap(long, value_enum, default_value_t = Mode::Vip)]
    mode: Mode,

    /// Wrap sprites drawn past the bottom edge back to the top
    #[clap(long)]
    wrap_vertical: bool,

    /// Trace every executed instruction
    #[clap(short, long)]
    debug: bool,
}

/// Square wave beeper, paused and resumed with the interpreter's sound state.
struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

fn keypad_mask(keyboard: &KeyboardState) -> u16 {
    KEYPAD_BINDINGS
        .iter()
        .filter(|(scancode, _)| keyboard.is_scancode_pressed(*scancode))
        .fold(0u16, |mask, (_, key)| mask | 1 << key)
}

fn build_chip(args: &Args) -> Result<Chip8> {
    let mut quirks = match args.mode {
        Mode::Vip => Quirks::cosmac_vip(),
        Mode::Chip48 => Quirks::chip48(),
    };
    quirks.wrap_vertical = args.wrap_vertical;

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM file {}", args.rom.display()))?;
    info!("loading ROM {} ({} bytes)", args.rom.display(), rom.len());

    let mut builder = Chip8Builder::new().with_rom(rom).with_quirks(quirks);

    if let Some(font) = &args.font {
        let data = std::fs::read(font)
            .with_context(|| format!("failed to read font file {}", font.display()))?;
        let font: [u8; 80] = data
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("font file must be exactly 80 bytes, got {}", data.len()))?;
        builder = builder.with_font(font);
    }

    if let Some(seed) = args.seed {
        builder = builder.with_rng_seed(seed);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.debug {
        logger.filter_module("chip_8_core", log::LevelFilter::Trace);
    }
    logger.init();

    if args.scale == 0 || args.scale > 100 {
        return Err(anyhow!("Display scaling factor must be between [1-100]"));
    }

    if args.ips == 0 || args.ips > 1_000_000 {
        return Err(anyhow!("Instructions per second [1-1000000]"));
    }

    let mut chip = build_chip(&args)?;
    let foreground = args.foreground.unwrap_or(DEFAULT_FOREGROUND_COLOR);
    let background = args.background.unwrap_or(DEFAULT_BACKGROUND_COLOR);

    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;
    let audio_subsystem = sdl_context.audio().map_err(anyhow::Error::msg)?;

    let window = video_subsystem
        .window(
            "chip8-emulator",
            SCREEN_WIDTH as u32 * args.scale,
            SCREEN_HEIGHT as u32 * args.scale,
        )
        .position_centered()
        .build()?;

    let mut canvas = window.into_canvas().build()?;

    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator.create_texture_streaming(
        PixelFormatEnum::RGBX8888,
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    )?;

    let desired = AudioSpecDesired {
        freq: Some(SAMPLE_RATE),
        channels: Some(1),
        samples: None,
    };
    let beeper = audio_subsystem
        .open_playback(None, &desired, |spec| SquareWave {
            phase_inc: TONE_HZ / spec.freq as f32,
            phase: 0.0,
            volume: 0.25,
        })
        .map_err(anyhow::Error::msg)?;

    let mut event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;

    let delta_update = Duration::new(0, 1_000_000_000u32 / args.ips);
    let start = Instant::now();
    let mut next_update = start;
    let mut sound_on = false;

    'running: loop {
        // Wait until next update
        let now = Instant::now();
        if let Some(delay) = next_update.checked_duration_since(now) {
            ::std::thread::sleep(delay);
        }
        next_update += delta_update;

        // Process events
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                _ => {}
            }
        }

        let keys = keypad_mask(&event_pump.keyboard_state());
        let tick = (start.elapsed().as_millis() * TICK_HZ / 1000) as u64;

        // Execute one CHIP-8 instruction
        let pc = chip.pc();
        let beep = match chip.step(keys, tick) {
            Ok(beep) => beep,
            Err(err) => {
                let word = u16::from_be_bytes([chip.memory_byte(pc), chip.memory_byte(pc + 1)]);
                match Instruction::decode(word) {
                    Some(inst) => error!("halted at 0x{:03x} ({})", pc, inst),
                    None => error!("halted at 0x{:03x} (instruction=0x{:04x})", pc, word),
                }
                return Err(err.into());
            }
        };

        if beep != sound_on {
            if beep {
                beeper.resume();
            } else {
                beeper.pause();
            }
            sound_on = beep;
        }

        // If display buffer was changed then draw changes on canvas
        if let Some(frame) = chip.take_frame() {
            // Copy CHIP-8 display buffer into GPU texture
            let pixels = frame.to_rgbx(foreground, background);
            texture.update(None, Chip8Color::as_bytes(&pixels), SCREEN_WIDTH * 4)?;

            // Copy texture to Canvas
            canvas.copy(&texture, None, None).map_err(anyhow::Error::msg)?;

            // present canvas on screen
            canvas.present();
        }
    }

    info!("quitting");
    Ok(())
}
