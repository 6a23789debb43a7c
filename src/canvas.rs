use glam::{Affine2, Vec2};

use crate::color::Color;

/// Immediate-mode 2D drawing surface, modelled on an HTML canvas context.
///
/// Paths are built with `begin_path`/`move_to`/`line_to`/`close_path` and
/// rendered by `stroke`. `save`/`restore` push and pop the transform, stroke
/// color and line width; `transform` post-multiplies the current transform.
pub trait Canvas {
    fn begin_path(&mut self);
    fn move_to(&mut self, point: Vec2);
    fn line_to(&mut self, point: Vec2);
    fn close_path(&mut self);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn stroke(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn transform(&mut self, transform: Affine2);
    /// Dims everything drawn so far by `amount` in `[0, 1]`.
    fn fade(&mut self, amount: f32);
}

/// Canvas that records every call, for asserting on drawing output.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub(crate) commands: Vec<Command>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    ClosePath,
    StrokeColor(Color),
    LineWidth(f32),
    Stroke,
    Save,
    Restore,
    Transform(Affine2),
    Fade(f32),
}

#[cfg(test)]
impl RecordingCanvas {
    pub(crate) fn strokes(&self) -> usize {
        self.commands.iter().filter(|c| **c == Command::Stroke).count()
    }

    pub(crate) fn stroke_colors(&self) -> Vec<Color> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::StrokeColor(color) => Some(*color),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn begin_path(&mut self) {
        self.commands.push(Command::BeginPath);
    }
    fn move_to(&mut self, point: Vec2) {
        self.commands.push(Command::MoveTo(point));
    }
    fn line_to(&mut self, point: Vec2) {
        self.commands.push(Command::LineTo(point));
    }
    fn close_path(&mut self) {
        self.commands.push(Command::ClosePath);
    }
    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(Command::StrokeColor(color));
    }
    fn set_line_width(&mut self, width: f32) {
        self.commands.push(Command::LineWidth(width));
    }
    fn stroke(&mut self) {
        self.commands.push(Command::Stroke);
    }
    fn save(&mut self) {
        self.commands.push(Command::Save);
    }
    fn restore(&mut self) {
        self.commands.push(Command::Restore);
    }
    fn transform(&mut self, transform: Affine2) {
        self.commands.push(Command::Transform(transform));
    }
    fn fade(&mut self, amount: f32) {
        self.commands.push(Command::Fade(amount));
    }
}
