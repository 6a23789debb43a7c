use std::io::{self, Write};

use glam::{Affine2, Vec2};

use crate::canvas::Canvas;
use crate::color::Color;

#[derive(Clone, Copy)]
struct DrawState {
    transform: Affine2,
    stroke: Color,
    line_width: f32,
}

/// Canvas rasterized into an RGB light buffer and shown with half-block
/// characters, two pixels per terminal cell.
///
/// World coordinates are y-up; `world_height` units span the full pixel
/// height and the width follows the terminal's aspect.
pub struct TerminalCanvas {
    width: usize,
    height: usize,
    pixels_per_unit: f32,
    light: Vec<[f32; 3]>,
    state: DrawState,
    stack: Vec<DrawState>,
    /// Stroke segments in pixel space.
    path: Vec<(Vec2, Vec2)>,
    cursor: Option<Vec2>,
    subpath_start: Vec2,
    subpath_points: usize,
    background: (u8, u8, u8),
    output_buf: Vec<u8>,
}

impl TerminalCanvas {
    pub fn new(cols: usize, rows: usize, world_height: f32, background: (u8, u8, u8)) -> Self {
        let width = cols.max(1);
        let height = rows.max(1) * 2;
        let scale = height as f32 / world_height;

        Self {
            width,
            height,
            pixels_per_unit: scale,
            light: vec![[0.0; 3]; width * height],
            state: DrawState {
                transform: Affine2::from_cols_array(&[scale, 0.0, 0.0, -scale, 0.0, height as f32]),
                stroke: Color::WHITE,
                line_width: 1.0,
            },
            stack: Vec::new(),
            path: Vec::new(),
            cursor: None,
            subpath_start: Vec2::ZERO,
            subpath_points: 0,
            background,
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    /// Drawable area in world units.
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) / self.pixels_per_unit
    }

    /// Writes the frame, plus an optional status line in the top-left corner.
    pub fn present(&mut self, out: &mut impl Write, overlay: Option<&str>) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: (u8, u8, u8) = (255, 255, 255);
        let mut prev_bot: (u8, u8, u8) = (255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top = self.shade(self.light[top_idx]);
                let bot = self.shade(self.light[bot_idx]);

                // Only emit color codes if changed
                if top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = (255, 255, 255);
            prev_bot = (255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        if let Some(text) = overlay {
            write!(self.output_buf, "\x1b[H\x1b[0m{text}")?;
        }

        out.write_all(&self.output_buf)?;
        out.flush()?;
        Ok(())
    }

    /// Light adds onto the background, saturating per channel.
    fn shade(&self, light: [f32; 3]) -> (u8, u8, u8) {
        let (r, g, b) = self.background;
        let add = |base: u8, amount: f32| (base as f32 + amount).min(255.0) as u8;
        (add(r, light[0]), add(g, light[1]), add(b, light[2]))
    }

    fn point(&self, point: Vec2) -> Vec2 {
        self.state.transform.transform_point2(point)
    }

    fn plot(&mut self, x: i32, y: i32, rgb: [f32; 3]) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let cell = &mut self.light[y as usize * self.width + x as usize];
        for (channel, amount) in cell.iter_mut().zip(rgb) {
            // Headroom above white; shade() clamps on output.
            *channel = (*channel + amount).min(510.0);
        }
    }

    fn rasterize(&mut self, from: Vec2, to: Vec2, rgb: [f32; 3]) {
        let extent = Vec2::new(self.width as f32, self.height as f32);
        let Some((from, to)) = clip(from, to, extent) else {
            return;
        };
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        let mut last = None;
        for i in 0..=steps {
            let p = from + delta * (i as f32 / steps as f32);
            let pixel = (p.x.floor() as i32, p.y.floor() as i32);
            if last != Some(pixel) {
                self.plot(pixel.0, pixel.1, rgb);
                last = Some(pixel);
            }
        }
    }

    #[cfg(test)]
    fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.light[y * self.width + x]
    }
}

/// Liang-Barsky clip of the segment to `[0, extent]`; `None` when nothing of
/// it is visible.
fn clip(from: Vec2, to: Vec2, extent: Vec2) -> Option<(Vec2, Vec2)> {
    if !from.is_finite() || !to.is_finite() {
        return None;
    }
    // f64 keeps the clipped ends pixel-exact for far-off endpoints.
    let (from, to, extent) = (from.as_dvec2(), to.as_dvec2(), extent.as_dvec2());
    let delta = to - from;
    let (mut enter, mut exit) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-delta.x, from.x),
        (delta.x, extent.x - from.x),
        (-delta.y, from.y),
        (delta.y, extent.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            enter = enter.max(q / p);
        } else {
            exit = exit.min(q / p);
        }
    }
    (enter <= exit).then(|| ((from + delta * enter).as_vec2(), (from + delta * exit).as_vec2()))
}

impl Canvas for TerminalCanvas {
    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = None;
        self.subpath_points = 0;
    }

    fn move_to(&mut self, point: Vec2) {
        let p = self.point(point);
        self.cursor = Some(p);
        self.subpath_start = p;
        self.subpath_points = 1;
    }

    fn line_to(&mut self, point: Vec2) {
        let Some(from) = self.cursor else {
            self.move_to(point);
            return;
        };
        let to = self.point(point);
        self.path.push((from, to));
        self.cursor = Some(to);
        self.subpath_points += 1;
    }

    fn close_path(&mut self) {
        // A two-point subpath closes onto itself; skip the retraced segment.
        if let Some(from) = self.cursor {
            if self.subpath_points > 2 {
                self.path.push((from, self.subpath_start));
            }
            self.cursor = Some(self.subpath_start);
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn stroke(&mut self) {
        let (r, g, b) = self.state.stroke.to_rgb();
        let weight = self.state.stroke.alpha() * self.state.line_width.clamp(0.25, 1.0);
        let rgb = [r as f32 * weight, g as f32 * weight, b as f32 * weight];
        let segments = std::mem::take(&mut self.path);
        for &(from, to) in &segments {
            self.rasterize(from, to, rgb);
        }
        self.path = segments;
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&mut self, transform: Affine2) {
        self.state.transform = self.state.transform * transform;
    }

    fn fade(&mut self, amount: f32) {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        for cell in &mut self.light {
            for channel in cell.iter_mut() {
                *channel *= keep;
            }
        }
    }
}
