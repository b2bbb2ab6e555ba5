use crate::render::{Color, Point};

/// Logical grid the scene is laid out on. Coordinates are inclusive: `0..=GRID_WIDTH`.
pub const GRID_WIDTH: i32 = 80;
pub const GRID_HEIGHT: i32 = 40;

pub const GRID_CENTER: GridPoint = GridPoint { x: GRID_WIDTH / 2, y: GRID_HEIGHT / 2 };

pub const PALETTE: [Color; 7] = [
    Color::from_argb(0xFF, 0x10, 0x10, 0x10),
    Color::from_argb(0xFF, 0x80, 0x80, 0x80),
    Color::from_argb(0xFF, 0xC0, 0xC0, 0xC0),
    Color::from_argb(0xFF, 0x10, 0x10, 0x10),
    Color::from_argb(0xFF, 0x80, 0x80, 0x80),
    Color::from_argb(0xFF, 0xC0, 0xC0, 0xC0),
    Color::from_argb(0xFF, 0xE0, 0x10, 0x40),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(&self) -> bool {
        (0..=GRID_WIDTH).contains(&self.x) && (0..=GRID_HEIGHT).contains(&self.y)
    }

    /// Map to device space: cell centers, uniformly scaled, then offset.
    #[inline]
    pub fn to_point(self, layout: &GridLayout) -> Point {
        Point {
            x: layout.offset_x + (self.x as f32 + 0.5) * layout.scale,
            y: layout.offset_y + (self.y as f32 + 0.5) * layout.scale,
        }
    }
}

/// Uniform scale-to-fit of the grid inside a `width x height` rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl GridLayout {
    /// Returns `None` when the rectangle has no drawable area.
    pub fn fit(width: f32, height: f32) -> Option<Self> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let cells_x = (GRID_WIDTH + 1) as f32;
        let cells_y = (GRID_HEIGHT + 1) as f32;
        let scale = (width / cells_x).min(height / cells_y);
        if !(scale > 0.0) || !scale.is_finite() {
            return None;
        }
        Some(Self {
            scale,
            offset_x: (width - scale * cells_x) * 0.5,
            offset_y: (height - scale * cells_y) * 0.5,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Line,
    Quad,
    Cubic,
}

/// One segment of the scene chain.
///
/// `control1` is meaningful for `Quad` and `Cubic`, `control2` only for `Cubic`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    pub kind: SegmentKind,
    pub start: GridPoint,
    pub control1: GridPoint,
    pub control2: GridPoint,
    pub end: GridPoint,
    pub color: Color,
    pub width: f32,
    /// Last element of its stroked sub-path.
    pub split: bool,
}

impl Element {
    pub fn line(start: GridPoint, end: GridPoint) -> Self {
        Self {
            kind: SegmentKind::Line,
            start,
            control1: GridPoint::default(),
            control2: GridPoint::default(),
            end,
            color: PALETTE[0],
            width: 1.0,
            split: false,
        }
    }

    /// Every point the segment references, for bounds checks.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> {
        let (c1, c2) = match self.kind {
            SegmentKind::Line => (None, None),
            SegmentKind::Quad => (Some(self.control1), None),
            SegmentKind::Cubic => (Some(self.control1), Some(self.control2)),
        };
        [Some(self.start), c1, c2, Some(self.end)].into_iter().flatten()
    }
}
