use crate::color::Chip8Color;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

const PIXEL_ON: u8 = 1;
const PIXEL_OFF: u8 = 0;

/// 64x32 monochrome display, one byte per pixel holding 0 (off) or 1 (on).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[u8; SCREEN_WIDTH * SCREEN_HEIGHT]>,
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new()
    }
}

impl Framebuffer {
    pub fn new() -> Framebuffer {
        Framebuffer {
            pixels: Box::new([PIXEL_OFF; SCREEN_WIDTH * SCREEN_HEIGHT]),
            dirty: true,
        }
    }

    /// Pixel at column `x`, row `y`. Out of range coordinates read as off.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            self.pixels[y * SCREEN_WIDTH + x]
        } else {
            PIXEL_OFF
        }
    }

    /// All pixels in row-major order.
    pub fn buffer(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(SCREEN_WIDTH)
    }

    /// Changed since the host last took a frame.
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        self.pixels.fill(PIXEL_OFF);
        self.dirty = true;
    }

    /// XOR an 8 pixel wide sprite onto the screen with its top left corner at
    /// (`x` mod 64, `y` mod 32). Columns wrap around the right edge; rows below
    /// the bottom edge are clipped unless `wrap_vertical` is set.
    ///
    /// Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8], wrap_vertical: bool) -> bool {
        let ox = x as usize % SCREEN_WIDTH;
        let oy = y as usize % SCREEN_HEIGHT;
        let mut collision = false;

        for (row, data) in sprite.iter().enumerate() {
            let mut py = oy + row;
            if py >= SCREEN_HEIGHT {
                if !wrap_vertical {
                    break;
                }
                py %= SCREEN_HEIGHT;
            }

            for column in 0..8 {
                if data & (0x80 >> column) == 0 {
                    continue;
                }
                let px = (ox + column) % SCREEN_WIDTH;
                let pixel = &mut self.pixels[py * SCREEN_WIDTH + px];
                if *pixel == PIXEL_ON {
                    collision = true;
                }
                *pixel ^= PIXEL_ON;
            }
        }

        self.dirty = true;
        collision
    }

    /// Render every pixel with the given colors, row-major.
    pub fn to_rgbx(&self, foreground: Chip8Color, background: Chip8Color) -> Vec<Chip8Color> {
        self.pixels
            .iter()
            .map(|&p| if p == PIXEL_ON { foreground } else { background })
            .collect()
    }
}
