/// Packed `0xAARRGGBB`, the layout Skia's `SkColor` uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    #[inline]
    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0 as u8
    }
}

impl From<Color> for u32 {
    fn from(c: Color) -> u32 {
        c.0
    }
}

/// Device-space point (pixels, after the grid transform).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where the host wants the scene drawn.
///
/// `x`, `y`, `width`, `height` are logical units; `scaling` maps them to device
/// pixels. Backends apply origin, clip and scaling when they hand out a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scaling: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { x: 0.0, y: 0.0, width, height, scaling: 1.0 }
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_scaling(mut self, scaling: f32) -> Self {
        self.scaling = scaling;
        self
    }

    /// Zero-area or non-finite viewports draw nothing.
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.scaling > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.scaling.is_finite()
    }

    /// Device-pixel size, rounded the way the host sizes its surfaces.
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width * self.scaling).round().max(0.0) as u32;
        let h = (self.height * self.scaling).round().max(0.0) as u32;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_round_trip_through_packing() {
        let c = Color::from_argb(0x80, 0xE0, 0x10, 0x40);
        assert_eq!(c.0, 0x80E0_1040);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x80, 0xE0, 0x10, 0x40));
        assert_eq!(u32::from(Color::from_rgb(12, 16, 24)), 0xFF0C_1018);
    }

    #[test]
    fn viewport_drawability() {
        assert!(Viewport::new(10.0, 10.0).is_drawable());
        assert!(!Viewport::new(0.0, 10.0).is_drawable());
        assert!(!Viewport::new(10.0, 10.0).with_scaling(0.0).is_drawable());
        assert_eq!(Viewport::new(100.0, 50.0).with_scaling(1.5).pixel_size(), (150, 75));
    }
}
