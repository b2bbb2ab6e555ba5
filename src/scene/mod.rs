pub mod element;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use element::{Element, GridLayout, GridPoint, SegmentKind, GRID_CENTER, GRID_HEIGHT, GRID_WIDTH, PALETTE};

pub const MIN_COMPLEXITY: i32 = 0;
pub const MAX_COMPLEXITY: i32 = 24;
pub const DEFAULT_COMPLEXITY: i32 = 8;

/// Hard cap on the element count reachable from the top of the complexity range.
pub const MAX_ELEMENTS: usize = 120_000;

/// Random-walk steps. Biased to the right so the chain sweeps across the grid.
const OFFSETS: [(i32, i32); 4] = [(-4, 0), (2, 0), (1, -2), (1, 2)];

/// Element count for a complexity level.
///
/// Linear in thousands below level 10, then steps of ten thousand, capped.
pub fn target_count(level: i32) -> usize {
    let level = level.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY);
    if level < 10 {
        return (level as usize + 1) * 1_000;
    }
    ((level as usize - 8) * 10_000).min(MAX_ELEMENTS)
}

/// Procedural scene: one continuous chain of segments sized by a complexity level.
///
/// The scene owns its random generator; the renderer borrows it to flip split flags
/// so a seeded scene replays the same frames.
pub struct Scene {
    elements: Vec<Element>,
    cursor: GridPoint,
    complexity: i32,
    rng: StdRng,
}

impl Scene {
    pub fn new(complexity: i32) -> Self {
        Self::with_rng(complexity, StdRng::from_entropy())
    }

    pub fn with_seed(complexity: i32, seed: u64) -> Self {
        Self::with_rng(complexity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(complexity: i32, rng: StdRng) -> Self {
        Self {
            elements: Vec::new(),
            cursor: GRID_CENTER,
            complexity: complexity.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY),
            rng,
        }
    }

    pub fn complexity(&self) -> i32 {
        self.complexity
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn cursor(&self) -> GridPoint {
        self.cursor
    }

    /// Clamp and apply a complexity level. Returns `false` when nothing changed.
    pub fn set_complexity(&mut self, level: i32) -> bool {
        let level = level.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY);
        if level == self.complexity {
            return false;
        }
        self.complexity = level;
        self.resize(target_count(level));
        true
    }

    /// Bring the element count in line with the current complexity. No-op when it already is.
    pub fn ensure_size(&mut self) {
        self.resize(target_count(self.complexity));
    }

    pub fn resize(&mut self, count: usize) {
        let current = self.elements.len();
        if count == current {
            return;
        }

        if count < current {
            self.elements.truncate(count);
            self.cursor = self.elements.last().map_or(GRID_CENTER, |e| e.end);
            return;
        }

        self.elements.reserve(count - current);
        self.cursor = self.elements.last().map_or(GRID_CENTER, |e| e.end);
        for _ in current..count {
            let element = self.generate_element(self.cursor);
            self.cursor = element.end;
            self.elements.push(element);
        }
    }

    /// Build one segment starting at `last`. Lines get twice the weight of quads or cubics.
    pub fn generate_element(&mut self, last: GridPoint) -> Element {
        let seg = self.rng.gen_range(0..4);
        let next = self.random_point(last);

        let mut element = Element::line(last, next);
        match seg {
            0 | 1 => {}
            2 => {
                element.kind = SegmentKind::Quad;
                element.control1 = next;
                element.end = self.random_point(next);
            }
            _ => {
                element.kind = SegmentKind::Cubic;
                element.control1 = next;
                element.control2 = self.random_point(next);
                element.end = self.random_point(next);
            }
        }

        element.color = PALETTE[self.rng.gen_range(0..PALETTE.len())];
        element.width = (self.rng.gen::<f64>().powi(5) * 20.0 + 1.0) as f32;
        element.split = self.rng.gen_bool(0.5);
        element
    }

    /// One random-walk step from `last`, reflected on any axis that would leave the grid.
    pub fn random_point(&mut self, last: GridPoint) -> GridPoint {
        let (dx, dy) = OFFSETS[self.rng.gen_range(0..OFFSETS.len())];
        step(last, dx, dy)
    }

    pub(crate) fn frame_parts(&mut self) -> (&mut [Element], &mut StdRng) {
        (&mut self.elements, &mut self.rng)
    }

    #[cfg(test)]
    pub(crate) fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }
}

fn step(last: GridPoint, dx: i32, dy: i32) -> GridPoint {
    let mut x = last.x + dx;
    if !(0..=GRID_WIDTH).contains(&x) {
        x -= dx * 2;
    }
    let mut y = last.y + dy;
    if !(0..=GRID_HEIGHT).contains(&y) {
        y -= dy * 2;
    }
    GridPoint { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_chain(scene: &Scene) {
        for pair in scene.elements().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for e in scene.elements() {
            for p in e.points() {
                assert!(p.in_bounds(), "{p:?} out of bounds");
            }
        }
        if let Some(last) = scene.elements().last() {
            assert_eq!(scene.cursor(), last.end);
        } else {
            assert_eq!(scene.cursor(), GRID_CENTER);
        }
    }

    #[test]
    fn target_count_table() {
        let expected = [
            1_000, 2_000, 3_000, 4_000, 5_000, 6_000, 7_000, 8_000, 9_000, 10_000,
            20_000, 30_000, 40_000, 50_000, 60_000, 70_000, 80_000, 90_000, 100_000,
            110_000, 120_000, 120_000, 120_000, 120_000, 120_000,
        ];
        for (level, count) in expected.iter().enumerate() {
            assert_eq!(target_count(level as i32), *count, "level {level}");
        }
        assert_eq!(target_count(-3), 1_000);
        assert_eq!(target_count(99), 120_000);
    }

    #[test]
    fn set_complexity_clamps_and_skips_unchanged() {
        let mut scene = Scene::with_seed(DEFAULT_COMPLEXITY, 1);
        assert_eq!(scene.element_count(), 0);
        assert!(!scene.set_complexity(8));
        assert_eq!(scene.element_count(), 0);

        assert!(scene.set_complexity(40));
        assert_eq!(scene.complexity(), MAX_COMPLEXITY);
        assert_eq!(scene.element_count(), MAX_ELEMENTS);

        assert!(scene.set_complexity(-5));
        assert_eq!(scene.complexity(), 0);
        assert_eq!(scene.element_count(), 1_000);
    }

    #[test]
    fn chain_survives_grow_shrink_grow() {
        let mut scene = Scene::with_seed(0, 7);
        for count in [500, 5_000, 120, 0, 3_000, 3_000, 2_999, 8_000] {
            scene.resize(count);
            assert_eq!(scene.element_count(), count);
            assert_chain(&scene);
        }
    }

    #[test]
    fn shrink_keeps_prefix_and_regrowth_differs() {
        let mut scene = Scene::with_seed(0, 11);
        scene.resize(2_000);
        let before = scene.elements().to_vec();

        scene.resize(1_000);
        assert_eq!(scene.elements(), &before[..1_000]);
        assert_eq!(scene.cursor(), before[999].end);

        scene.resize(2_000);
        assert_eq!(&scene.elements()[..1_000], &before[..1_000]);
        assert_ne!(&scene.elements()[1_000..], &before[1_000..]);
        assert_chain(&scene);
    }

    #[test]
    fn random_point_stays_on_grid() {
        for x in 0..=GRID_WIDTH {
            for y in 0..=GRID_HEIGHT {
                for (dx, dy) in OFFSETS {
                    let p = step(GridPoint::new(x, y), dx, dy);
                    assert!(p.in_bounds(), "({x},{y}) + ({dx},{dy}) -> {p:?}");
                }
            }
        }

        let mut scene = Scene::with_seed(0, 3);
        let mut p = GRID_CENTER;
        for _ in 0..10_000 {
            p = scene.random_point(p);
            assert!(p.in_bounds());
        }
    }

    #[test]
    fn step_reflects_instead_of_clamping() {
        assert_eq!(step(GridPoint::new(2, 5), -4, 0), GridPoint::new(6, 5));
        assert_eq!(step(GridPoint::new(GRID_WIDTH, 5), 2, 0), GridPoint::new(GRID_WIDTH - 2, 5));
        assert_eq!(step(GridPoint::new(10, 0), 1, -2), GridPoint::new(11, 2));
        assert_eq!(step(GridPoint::new(10, GRID_HEIGHT), 1, 2), GridPoint::new(11, GRID_HEIGHT - 2));
    }

    #[test]
    fn generated_elements_match_their_kind() {
        let mut scene = Scene::with_seed(0, 5);
        let mut lines = 0;
        for _ in 0..4_000 {
            let e = scene.generate_element(GRID_CENTER);
            assert_eq!(e.start, GRID_CENTER);
            assert!(e.width >= 1.0 && e.width <= 21.0);
            assert!(PALETTE.contains(&e.color));
            if e.kind == SegmentKind::Line {
                lines += 1;
            }
        }
        // Lines carry half of the sampling weight.
        assert!((1_600..2_400).contains(&lines), "lines = {lines}");
    }

    #[test]
    fn seeded_scenes_are_reproducible() {
        let mut a = Scene::with_seed(3, 42);
        let mut b = Scene::with_seed(3, 42);
        a.ensure_size();
        b.ensure_size();
        assert_eq!(a.elements(), b.elements());
    }
}
