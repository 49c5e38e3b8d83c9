//! Offline capture target.
//!
//! `FramebufferTarget` renders a page's text into a `MockFramebuffer` and
//! stores it as PNG, so a suite can run end-to-end without a browser (dry
//! runs, CI without a display, tests).

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageBuffer, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use super::types::{CaptureTarget, SnapshotError, SnapshotResult};
use super::utils::{generate_filename, generate_timestamp};

const GLYPH_SIZE: u32 = 8;
const LINE_HEIGHT: u32 = 12;
const MARGIN: u32 = 10;
const HEADER_HEIGHT: u32 = 28;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const HEADER_BG: [u8; 3] = [30, 41, 59];
const HEADER_FG: [u8; 3] = [248, 250, 252];
const TEXT_FG: [u8; 3] = [15, 23, 42];

/// A virtual framebuffer for programmatic drawing
///
/// Provides the drawing API used to fake rendered pages:
/// - `fill()` - Fill entire buffer with a color
/// - `draw_rect()` - Draw a filled rectangle
/// - `draw_text()` - Draw text using font8x8 glyphs
#[derive(Debug, Clone)]
pub struct MockFramebuffer {
    width: u32,
    height: u32,
    /// RGB pixel buffer (row-major, 3 bytes per pixel)
    buffer: Vec<u8>,
}

impl MockFramebuffer {
    /// Create a new framebuffer with the given dimensions, initialized to black
    pub fn new(width: u32, height: u32) -> Self {
        let buffer = vec![0u8; (width * height * 3) as usize];
        Self {
            width,
            height,
            buffer,
        }
    }

    /// Create a framebuffer initialized to a specific color
    pub fn with_color(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color);
        fb
    }

    /// Load a framebuffer from PNG image bytes
    pub fn from_png_bytes(data: &[u8]) -> SnapshotResult<Self> {
        let img = image::load_from_memory(data)
            .map_err(|e| SnapshotError::Capture(format!("Failed to load PNG: {}", e)))?;
        let rgb = img.to_rgb8();
        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            buffer: rgb.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the entire framebuffer with a color
    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text using font8x8 glyphs
    ///
    /// Each character is 8x8 pixels. Text does not wrap.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: [u8; 3], bg: [u8; 3]) {
        let mut cursor_x = x;
        for ch in text.chars() {
            self.draw_char(cursor_x, y, ch, fg, bg);
            cursor_x += GLYPH_SIZE;
            if cursor_x >= self.width {
                break;
            }
        }
    }

    fn draw_char(&mut self, x: u32, y: u32, ch: char, fg: [u8; 3], bg: [u8; 3]) {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0u8; 8]);
        for (row_idx, row) in glyph.iter().enumerate() {
            let py = y + row_idx as u32;
            if py >= self.height {
                break;
            }
            for bit in 0..GLYPH_SIZE {
                let px = x + bit;
                if px >= self.width {
                    break;
                }
                // font8x8 stores LSB as leftmost pixel
                let is_fg = (row >> bit) & 1 == 1;
                self.set_pixel(px, py, if is_fg { fg } else { bg });
            }
        }
    }

    /// Get the color of a pixel
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = ((y * self.width + x) * 3) as usize;
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Encode the framebuffer as PNG bytes
    pub fn to_png(&self) -> SnapshotResult<Vec<u8>> {
        let img: RgbImage = ImageBuffer::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| SnapshotError::Capture("Buffer size does not match dimensions".into()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| SnapshotError::Capture(format!("Failed to encode PNG: {}", e)))?;
        Ok(bytes)
    }
}

/// Capture target that draws page text into a framebuffer
///
/// Routes registered through [`FramebufferTarget::page`] render their lines;
/// once any page is registered, navigating to an unknown route fails like a
/// broken link would. With no pages registered every route renders its own
/// path, which is enough for capture-only runs.
#[derive(Debug, Clone)]
pub struct FramebufferTarget {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    pages: HashMap<String, Vec<String>>,
    current_route: Option<String>,
}

impl FramebufferTarget {
    pub fn new(output_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            width,
            height,
            pages: HashMap::new(),
            current_route: None,
        }
    }

    /// Register the text lines shown at `route`
    pub fn page(
        mut self,
        route: impl Into<String>,
        lines: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.pages
            .insert(route.into(), lines.into_iter().map(Into::into).collect());
        self
    }

    fn render(&self, route: &str, full_surface: bool) -> MockFramebuffer {
        let fallback = vec![route.to_string()];
        let lines = self.pages.get(route).unwrap_or(&fallback);

        let content_height = HEADER_HEIGHT + MARGIN * 2 + lines.len() as u32 * LINE_HEIGHT;
        let height = if full_surface {
            self.height.max(content_height)
        } else {
            self.height
        };

        let mut fb = MockFramebuffer::with_color(self.width, height, BACKGROUND);
        fb.draw_rect(0, 0, self.width, HEADER_HEIGHT, HEADER_BG);
        fb.draw_text(MARGIN, MARGIN, route, HEADER_FG, HEADER_BG);
        for (i, line) in lines.iter().enumerate() {
            let y = HEADER_HEIGHT + MARGIN + i as u32 * LINE_HEIGHT;
            fb.draw_text(MARGIN, y, line, TEXT_FG, BACKGROUND);
        }
        fb
    }
}

impl CaptureTarget for FramebufferTarget {
    fn source_type(&self) -> &str {
        "framebuffer"
    }

    async fn navigate(&mut self, route: &str) -> SnapshotResult<()> {
        if !self.pages.is_empty() && !self.pages.contains_key(route) {
            self.current_route = None;
            return Err(SnapshotError::Navigation(format!(
                "no page rendered at '{}'",
                route
            )));
        }
        self.current_route = Some(route.to_string());
        Ok(())
    }

    async fn capture(&mut self, full_surface: bool) -> SnapshotResult<PathBuf> {
        let route = self
            .current_route
            .as_deref()
            .ok_or_else(|| SnapshotError::Capture("navigate before capturing".into()))?;

        let png = self.render(route, full_surface).to_png()?;
        let path = self
            .output_dir
            .join(generate_filename(self.source_type(), route, &generate_timestamp()));

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}
