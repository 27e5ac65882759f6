/// RGB color for PDF graphics operations.
///
/// Each component is in the range 0.0 (none) to 1.0 (full intensity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::gray(0.0);

    /// Create a color from RGB components (each 0.0–1.0).
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Create a grayscale color (r = g = b = level).
    pub const fn gray(level: f64) -> Self {
        Color {
            r: level,
            g: level,
            b: level,
        }
    }

    /// Content-stream operator setting this as the non-stroking color.
    pub(crate) fn fill_op(&self) -> String {
        format!(
            "{} {} {} rg\n",
            format_component(self.r),
            format_component(self.g),
            format_component(self.b),
        )
    }

    /// Content-stream operator setting this as the stroking color.
    pub(crate) fn stroke_op(&self) -> String {
        format!(
            "{} {} {} RG\n",
            format_component(self.r),
            format_component(self.g),
            format_component(self.b),
        )
    }
}

fn format_component(v: f64) -> String {
    crate::document::format_coord(v.clamp(0.0, 1.0))
}
