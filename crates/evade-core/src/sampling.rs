use crate::{BlueNoiseSampler, DeterministicRng, SplitMix64, Vec2};

/// Bridson's Poisson-disc sampler over a seeded [`SplitMix64`] stream.
///
/// Each call to [`BlueNoiseSampler::samples_into`] continues the RNG stream, so consecutive
/// batches differ while a whole run stays reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct PoissonDiscSampler {
    rng: SplitMix64,
    attempts: u32,
    grid: Vec<Option<u32>>,
    active: Vec<u32>,
}

impl PoissonDiscSampler {
    /// Candidate attempts per active point before it is retired.
    pub const DEFAULT_ATTEMPTS: u32 = 30;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: SplitMix64::new(seed),
            attempts: Self::DEFAULT_ATTEMPTS,
            grid: Vec::new(),
            active: Vec::new(),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn samples(&mut self, width: f32, height: f32, min_spacing: f32) -> Vec<Vec2> {
        let mut out = Vec::new();
        self.samples_into(width, height, min_spacing, &mut out);
        out
    }
}

impl BlueNoiseSampler for PoissonDiscSampler {
    fn samples_into(&mut self, width: f32, height: f32, min_spacing: f32, out: &mut Vec<Vec2>) {
        out.clear();
        if !(width > 0.0 && height > 0.0 && min_spacing > 0.0) {
            return;
        }
        if !(width.is_finite() && height.is_finite() && min_spacing.is_finite()) {
            return;
        }

        let cell = min_spacing / core::f32::consts::SQRT_2;
        let cols = (width / cell).ceil().max(1.0) as usize;
        let rows = (height / cell).ceil().max(1.0) as usize;
        let r2 = min_spacing * min_spacing;

        self.grid.clear();
        self.grid.resize(cols * rows, None);
        self.active.clear();

        let cell_of = |p: Vec2| -> (usize, usize) {
            let cx = ((p.x / cell) as usize).min(cols - 1);
            let cy = ((p.y / cell) as usize).min(rows - 1);
            (cx, cy)
        };

        let first = Vec2::new(
            self.rng.next_f32_range(0.0, width),
            self.rng.next_f32_range(0.0, height),
        );
        let (cx, cy) = cell_of(first);
        self.grid[cy * cols + cx] = Some(0);
        self.active.push(0);
        out.push(first);

        while !self.active.is_empty() {
            let slot = self.rng.next_index(self.active.len());
            let center = out[self.active[slot] as usize];

            let mut placed = false;
            for _ in 0..self.attempts {
                let angle = self.rng.next_f32_range(0.0, core::f32::consts::TAU);
                let radius = self.rng.next_f32_range(min_spacing, 2.0 * min_spacing);
                let candidate = center + Vec2::new(angle.cos(), angle.sin()) * radius;

                if candidate.x < 0.0
                    || candidate.y < 0.0
                    || candidate.x > width
                    || candidate.y > height
                {
                    continue;
                }

                let (cx, cy) = cell_of(candidate);
                let x0 = cx.saturating_sub(2);
                let y0 = cy.saturating_sub(2);
                let x1 = (cx + 2).min(cols - 1);
                let y1 = (cy + 2).min(rows - 1);

                let mut too_close = false;
                'scan: for gy in y0..=y1 {
                    for gx in x0..=x1 {
                        if let Some(idx) = self.grid[gy * cols + gx] {
                            if out[idx as usize].distance_squared(candidate) < r2 {
                                too_close = true;
                                break 'scan;
                            }
                        }
                    }
                }
                if too_close {
                    continue;
                }

                let idx = out.len() as u32;
                out.push(candidate);
                self.grid[cy * cols + cx] = Some(idx);
                self.active.push(idx);
                placed = true;
                break;
            }

            if !placed {
                self.active.swap_remove(slot);
            }
        }
    }
}
