use std::fmt;

/// Stroke color in either RGBA or HSLA form.
///
/// Channels: `r`, `g`, `b` in `0..=255`, `h` in degrees, `s` and `l` in
/// percent, alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgba { r: u8, g: u8, b: u8, a: f32 },
    Hsla { h: f32, s: f32, l: f32, a: f32 },
}

impl Color {
    pub const WHITE: Color = Color::Rgba {
        r: 255,
        g: 255,
        b: 255,
        a: 1.0,
    };

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Color::Rgba {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        Color::Hsla {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn alpha(&self) -> f32 {
        match *self {
            Color::Rgba { a, .. } | Color::Hsla { a, .. } => a,
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        match self {
            Color::Rgba { r, g, b, .. } => Color::rgba(r, g, b, alpha),
            Color::Hsla { h, s, l, .. } => Color::hsla(h, s, l, alpha),
        }
    }

    /// Opaque RGB channels, alpha ignored.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match *self {
            Color::Rgba { r, g, b, .. } => (r, g, b),
            Color::Hsla { h, s, l, .. } => hsl_to_rgb(h, s / 100.0, l / 100.0),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Color::Rgba { r, g, b, a } => write!(f, "rgba({r}, {g}, {b}, {a})"),
            Color::Hsla { h, s, l, a } => write!(f, "hsla({h}, {s}%, {l}%, {a})"),
        }
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsla_primaries() {
        assert_eq!(Color::hsla(0.0, 100.0, 50.0, 1.0).to_rgb(), (255, 0, 0));
        assert_eq!(Color::hsla(120.0, 100.0, 50.0, 1.0).to_rgb(), (0, 255, 0));
        assert_eq!(Color::hsla(240.0, 100.0, 50.0, 1.0).to_rgb(), (0, 0, 255));
        assert_eq!(Color::hsla(200.0, 80.0, 100.0, 1.0).to_rgb(), (255, 255, 255));
        assert_eq!(Color::hsla(200.0, 80.0, 0.0, 1.0).to_rgb(), (0, 0, 0));
    }

    #[test]
    fn test_constructors_clamp() {
        let color = Color::hsla(-30.0, 150.0, 50.0, 2.0);
        assert_eq!(
            color,
            Color::Hsla {
                h: 330.0,
                s: 100.0,
                l: 50.0,
                a: 1.0
            }
        );
        assert_eq!(Color::rgba(1, 2, 3, -1.0).alpha(), 0.0);
    }

    #[test]
    fn test_with_alpha_keeps_channels() {
        let faded = Color::rgba(10, 20, 30, 1.0).with_alpha(0.25);
        assert_eq!(faded, Color::rgba(10, 20, 30, 0.25));
        assert_eq!(faded.to_rgb(), (10, 20, 30));
    }

    #[test]
    fn test_css_strings() {
        assert_eq!(Color::rgba(255, 128, 0, 0.5).to_string(), "rgba(255, 128, 0, 0.5)");
        assert_eq!(Color::hsla(210.0, 100.0, 75.0, 1.0).to_string(), "hsla(210, 100%, 75%, 1)");
    }
}
