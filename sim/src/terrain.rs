//! Terrain - destructible heightmap, procedural generation and craters.
//!
//! The terrain is a single row of column heights, one per horizontal pixel,
//! measured upward from the bottom of the playfield. Screen-space surface of
//! column `c` is therefore `screen_height - heights[c]`.

use crate::config::TerrainConfig;
use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Crater depth per unit of `sqrt(radius - distance)`.
pub const CRATER_DEPTH_SCALE: f32 = 5.0;

/// A crater left by a shell, kept for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crater {
    /// Impact position in screen space.
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Depth removed at the centre column.
    pub depth: f32,
}

/// Heightmap resource.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    heights: Vec<f32>,
    screen_height: f32,
    craters: Vec<Crater>,
    /// Craters not yet handed to a snapshot.
    #[serde(skip)]
    new_craters: Vec<Crater>,
}

impl Terrain {
    /// Build terrain from explicit heights, clamped to `[0, screen_height]`.
    pub fn from_heights(heights: Vec<f32>, screen_height: f32) -> SimResult<Self> {
        if heights.is_empty() {
            return Err(SimError::invalid("terrain needs at least one column"));
        }
        if !(screen_height.is_finite() && screen_height > 0.0) {
            return Err(SimError::invalid("screen height must be positive"));
        }
        let heights = heights
            .into_iter()
            .map(|h| if h.is_finite() { h.clamp(0.0, screen_height) } else { 0.0 })
            .collect();
        Ok(Self {
            heights,
            screen_height,
            craters: Vec::new(),
            new_craters: Vec::new(),
        })
    }

    /// Flat terrain of constant height.
    pub fn flat(width: usize, screen_height: f32, height: f32) -> SimResult<Self> {
        Self::from_heights(vec![height; width], screen_height)
    }

    /// Generate rolling hills through `peak_count` sample points.
    ///
    /// `peak_count` includes the two endpoints, which are pinned to
    /// `config.edge_height`; the remaining `peak_count - 2` points sit on
    /// distinct interior columns at random heights. Segments between sample
    /// points use cosine easing, and the result is smoothed with a 3-point
    /// moving average.
    pub fn generate<R: Rng>(
        width: usize,
        screen_height: f32,
        peak_count: usize,
        config: &TerrainConfig,
        rng: &mut R,
    ) -> SimResult<Self> {
        if !(3..=6).contains(&peak_count) {
            return Err(SimError::invalid(format!(
                "peak count {peak_count} outside [3, 6]"
            )));
        }
        if width < peak_count {
            return Err(SimError::invalid(format!(
                "width {width} too small for {peak_count} peaks"
            )));
        }

        let edge = config.edge_height;
        let interior = peak_count - 2;

        let mut columns: Vec<usize> = rand::seq::index::sample(rng, width - 2, interior)
            .into_iter()
            .map(|i| i + 1)
            .collect();
        columns.sort_unstable();

        let mut samples = Vec::with_capacity(peak_count);
        samples.push((0, edge));
        for column in columns {
            let height = rng.random_range(config.min_peak_height..=config.max_peak_height);
            samples.push((column, height as f32));
        }
        samples.push((width - 1, edge));

        let mut heights = vec![edge; width];
        for pair in samples.windows(2) {
            let (start_x, start_h) = pair[0];
            let (end_x, end_h) = pair[1];
            let span = (end_x - start_x) as f32;
            for (x, height) in heights.iter_mut().enumerate().take(end_x).skip(start_x) {
                let t = (x - start_x) as f32 / span;
                *height = cosine_interpolate(start_h, end_h, t);
            }
        }
        heights[width - 1] = edge;

        let heights = smooth(heights, config.smoothing_passes);
        Self::from_heights(heights, screen_height)
    }

    /// Generate with a random peak count from the configured range.
    pub fn generate_random<R: Rng>(
        width: usize,
        screen_height: f32,
        config: &TerrainConfig,
        rng: &mut R,
    ) -> SimResult<Self> {
        let min = config.min_peaks.max(3);
        let max = config.max_peaks.min(6);
        if min > max {
            return Err(SimError::invalid("empty peak count range"));
        }
        let peak_count = rng.random_range(min..=max);
        Self::generate(width, screen_height, peak_count, config, rng)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.heights.len()
    }

    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn craters(&self) -> &[Crater] {
        &self.craters
    }

    /// Craters made since the last [`Self::take_new_craters`].
    pub fn new_craters(&self) -> &[Crater] {
        &self.new_craters
    }

    pub fn take_new_craters(&mut self) -> Vec<Crater> {
        std::mem::take(&mut self.new_craters)
    }

    /// Height of a column.
    ///
    /// # Panics
    ///
    /// Panics if `column >= width()`. Callers validate with [`Self::column_at`]
    /// or use [`Self::try_height_at`].
    pub fn height_at(&self, column: usize) -> f32 {
        self.heights[column]
    }

    pub fn try_height_at(&self, column: usize) -> SimResult<f32> {
        self.heights
            .get(column)
            .copied()
            .ok_or(SimError::OutOfBoundsQuery {
                column: column as i64,
                width: self.width(),
            })
    }

    /// Column under a screen-space x, if inside the playfield.
    pub fn column_at(&self, x: f32) -> Option<usize> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let column = x.floor() as usize;
        (column < self.width()).then_some(column)
    }

    /// Screen-space y of the ground surface at a column.
    ///
    /// # Panics
    ///
    /// Same contract as [`Self::height_at`].
    pub fn surface_y(&self, column: usize) -> f32 {
        self.screen_height - self.height_at(column)
    }

    /// Blast a crater centred on screen-space `center_x`.
    ///
    /// Every column whose distance to `center_x` is at most `radius` drops by
    /// `floor(sqrt(radius - distance) * 5)`, never below zero. Returns the
    /// number of columns that were lowered.
    pub fn deform(&mut self, center_x: f32, radius: f32) -> usize {
        if !center_x.is_finite() || !radius.is_finite() || radius < 0.0 {
            return 0;
        }

        let first = (center_x - radius).floor().max(0.0) as usize;
        let last = (center_x + radius).ceil();
        if last < 0.0 {
            return 0;
        }
        let last = (last as usize).min(self.width().saturating_sub(1));

        let mut lowered = 0;
        let mut center_depth = 0.0;
        for column in first..=last {
            let distance = (column as f32 - center_x).abs();
            if distance > radius {
                continue;
            }
            let depth = crater_depth(radius, distance);
            center_depth = f32::max(center_depth, depth);
            let height = &mut self.heights[column];
            let new_height = (*height - depth).max(0.0);
            if new_height < *height {
                *height = new_height;
                lowered += 1;
            }
        }

        let surface = self
            .column_at(center_x)
            .map(|c| self.surface_y(c))
            .unwrap_or(self.screen_height);
        let crater = Crater {
            x: center_x,
            y: surface,
            radius,
            depth: center_depth,
        };
        self.craters.push(crater);
        self.new_craters.push(crater);
        lowered
    }
}

/// Whole-pixel crater depth at `distance` from the centre.
fn crater_depth(radius: f32, distance: f32) -> f32 {
    ((radius - distance).sqrt() * CRATER_DEPTH_SCALE).floor()
}

/// Ease-in/ease-out blend between `a` and `b`.
fn cosine_interpolate(a: f32, b: f32, t: f32) -> f32 {
    let eased = (1.0 - (t * PI).cos()) / 2.0;
    a * (1.0 - eased) + b * eased
}

/// 3-point moving average over interior columns, `passes` times.
fn smooth(mut heights: Vec<f32>, passes: usize) -> Vec<f32> {
    if heights.len() < 3 {
        return heights;
    }
    for _ in 0..passes {
        let previous = heights.clone();
        for (x, window) in previous.windows(3).enumerate() {
            heights[x + 1] = (window[0] + window[1] + window[2]) / 3.0;
        }
    }
    heights
}

/// Full terrain state for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub width: usize,
    pub screen_height: f32,
    pub heights: Vec<f32>,
    pub craters: Vec<Crater>,
}

impl TerrainSnapshot {
    pub fn from_terrain(terrain: &Terrain) -> Self {
        Self {
            width: terrain.width(),
            screen_height: terrain.screen_height,
            heights: terrain.heights.clone(),
            craters: terrain.craters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generated(seed: u64) -> Terrain {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Terrain::generate_random(800, 600.0, &TerrainConfig::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_generated_terrain_bounds() {
        for seed in 0..50 {
            let terrain = generated(seed);
            assert_eq!(terrain.width(), 800);
            for &h in terrain.heights() {
                assert!((0.0..=600.0).contains(&h), "seed {seed}: height {h}");
            }
            assert_eq!(terrain.height_at(0), 20.0);
            assert_eq!(terrain.height_at(799), 20.0);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generated(7).heights(), generated(7).heights());
        assert_ne!(generated(7).heights(), generated(8).heights());
    }

    #[test]
    fn test_generated_terrain_has_hills() {
        let terrain = generated(3);
        let peak = terrain.heights().iter().cloned().fold(0.0, f32::max);
        assert!(peak > 50.0, "expected rolling hills, max height {peak}");
    }

    #[test]
    fn test_generate_rejects_bad_peak_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = TerrainConfig::default();
        assert!(Terrain::generate(800, 600.0, 2, &config, &mut rng).is_err());
        assert!(Terrain::generate(800, 600.0, 7, &config, &mut rng).is_err());
        assert!(Terrain::generate(4, 600.0, 5, &config, &mut rng).is_err());
        assert!(Terrain::generate(3, 600.0, 3, &config, &mut rng).is_ok());
    }

    #[test]
    fn test_heights_clamped_to_screen() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let terrain =
            Terrain::generate(200, 150.0, 6, &TerrainConfig::default(), &mut rng).unwrap();
        assert!(terrain.heights().iter().all(|&h| (0.0..=150.0).contains(&h)));
    }

    #[test]
    fn test_cosine_interpolation_endpoints() {
        assert_eq!(cosine_interpolate(20.0, 300.0, 0.0), 20.0);
        assert!((cosine_interpolate(20.0, 300.0, 1.0) - 300.0).abs() < 1e-3);
        assert!((cosine_interpolate(0.0, 100.0, 0.5) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_smoothing_keeps_endpoints() {
        let smoothed = smooth(vec![0.0, 30.0, 0.0, 30.0, 0.0], 1);
        assert_eq!(smoothed, vec![0.0, 10.0, 20.0, 10.0, 0.0]);
    }

    #[test]
    fn test_crater_depth_profile() {
        let mut terrain = Terrain::flat(100, 600.0, 100.0).unwrap();
        let lowered = terrain.deform(50.0, 15.0);

        // sqrt(15) * 5 = 19.36 -> 19
        assert_eq!(terrain.height_at(50), 81.0);
        // sqrt(14) * 5 = 18.7 -> 18
        assert_eq!(terrain.height_at(49), 82.0);
        assert_eq!(terrain.height_at(51), 82.0);
        // distance 15 -> depth 0
        assert_eq!(terrain.height_at(35), 100.0);
        assert_eq!(terrain.height_at(65), 100.0);
        assert_eq!(terrain.height_at(34), 100.0);
        assert_eq!(lowered, 29);
        assert_eq!(terrain.craters().len(), 1);
        assert_eq!(terrain.craters()[0].depth, 19.0);
    }

    #[test]
    fn test_deform_never_raises_or_goes_negative() {
        let mut terrain = generated(11);
        for x in [0.0, 3.5, 120.0, 400.25, 799.0, 810.0, -5.0] {
            for _ in 0..30 {
                let before = terrain.heights().to_vec();
                terrain.deform(x, 15.0);
                for (old, new) in before.iter().zip(terrain.heights()) {
                    assert!(new <= old);
                    assert!(*new >= 0.0);
                }
            }
        }
        assert_eq!(terrain.height_at(0), 0.0);
    }

    #[test]
    fn test_deform_at_edges() {
        let mut terrain = Terrain::flat(40, 600.0, 50.0).unwrap();
        terrain.deform(0.0, 15.0);
        assert_eq!(terrain.height_at(0), 31.0);
        terrain.deform(39.9, 15.0);
        assert!(terrain.height_at(39) < 50.0);
    }

    #[test]
    fn test_out_of_bounds_query() {
        let terrain = Terrain::flat(10, 600.0, 20.0).unwrap();
        assert_eq!(terrain.try_height_at(9).unwrap(), 20.0);
        let err = terrain.try_height_at(10).unwrap_err();
        assert!(matches!(err, SimError::OutOfBoundsQuery { column: 10, width: 10 }));
    }

    #[test]
    #[should_panic]
    fn test_height_at_fails_fast() {
        let terrain = Terrain::flat(10, 600.0, 20.0).unwrap();
        terrain.height_at(10);
    }

    #[test]
    fn test_column_at() {
        let terrain = Terrain::flat(800, 600.0, 20.0).unwrap();
        assert_eq!(terrain.column_at(0.0), Some(0));
        assert_eq!(terrain.column_at(799.9), Some(799));
        assert_eq!(terrain.column_at(800.0), None);
        assert_eq!(terrain.column_at(-0.1), None);
        assert_eq!(terrain.column_at(f32::NAN), None);
        assert_eq!(terrain.surface_y(10), 580.0);
    }

    #[test]
    fn test_fractional_centre_is_symmetric() {
        let mut terrain = Terrain::flat(100, 600.0, 100.0).unwrap();
        terrain.deform(50.5, 15.0);

        // distance 14.5 on both sides -> sqrt(0.5) * 5 = 3.5 -> 3
        assert_eq!(terrain.height_at(36), 97.0);
        assert_eq!(terrain.height_at(65), 97.0);
        assert_eq!(terrain.height_at(35), 100.0);
        assert_eq!(terrain.height_at(66), 100.0);
    }

    #[test]
    fn test_new_craters_taken_once() {
        let mut terrain = Terrain::flat(100, 600.0, 100.0).unwrap();
        terrain.deform(20.0, 15.0);
        terrain.deform(70.0, 15.0);
        assert_eq!(terrain.new_craters().len(), 2);

        let taken = terrain.take_new_craters();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].x, 20.0);
        assert!(terrain.new_craters().is_empty());
        assert!(terrain.take_new_craters().is_empty());
        // The full record is kept.
        assert_eq!(terrain.craters().len(), 2);
    }

    #[test]
    fn test_terrain_snapshot() {
        let terrain = Terrain::flat(5, 600.0, 20.0).unwrap();
        let snapshot = TerrainSnapshot::from_terrain(&terrain);
        assert_eq!(snapshot.width, 5);
        assert_eq!(snapshot.heights, vec![20.0; 5]);
        assert!(snapshot.craters.is_empty());
    }
}
