//! Colours: the categorical palette, named colours and sequential ramps.

/// Discrete palette cycled over series positions.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    /// The classic ten-colour categorical palette
    pub fn category10() -> Self {
        Self {
            colors: vec![
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
                "#7f7f7f", "#bcbd22", "#17becf",
            ],
        }
    }

    pub fn get(&self, index: usize) -> &'static str {
        self.colors[index % self.colors.len()]
    }
}

/// Parse `#rrggbb`, `#rgb` or a known colour name into RGB components.
pub fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex);
    }

    let rgb = match color.to_ascii_lowercase().as_str() {
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "yellow" => (255, 255, 0),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "orange" => (255, 165, 0),
        "steelblue" => (70, 130, 180),
        "gray" | "grey" => (128, 128, 128),
        "purple" => (128, 0, 128),
        "brown" => (165, 42, 42),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        _ => return None,
    };
    Some(rgb)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |s: &str| channel(s).map(|v| v * 17);
            Some((expand(&hex[0..1])?, expand(&hex[1..2])?, expand(&hex[2..3])?))
        }
        _ => None,
    }
}

/// A sequential colour ramp sampled at evenly spaced stops.
#[derive(Debug, Clone)]
pub struct Ramp {
    stops: Vec<(u8, u8, u8)>,
}

impl Ramp {
    /// Look a ramp up by name; unknown names fall back to `Blues`
    pub fn named(name: &str) -> Self {
        let stops = match name.to_ascii_lowercase().as_str() {
            "reds" => vec![(255, 245, 240), (252, 187, 161), (251, 106, 74), (203, 24, 29), (103, 0, 13)],
            "greens" => vec![(247, 252, 245), (199, 233, 192), (116, 196, 118), (35, 139, 69), (0, 68, 27)],
            "viridis" => vec![(68, 1, 84), (59, 82, 139), (33, 145, 140), (94, 201, 98), (253, 231, 37)],
            _ => vec![(247, 251, 255), (198, 219, 239), (107, 174, 214), (33, 113, 181), (8, 48, 107)],
        };
        Self { stops }
    }

    /// Colour at `t` in [0, 1], linearly interpolated between stops
    pub fn at(&self, t: f64) -> (u8, u8, u8) {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let segments = (self.stops.len() - 1) as f64;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(self.stops.len() - 2);
        let weight = pos - lower as f64;
        let (a, b) = (self.stops[lower], self.stops[lower + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * weight).round() as u8;
        (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}
