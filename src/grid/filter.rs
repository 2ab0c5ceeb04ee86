//! Optional neighborhood denoising of occupancy values.
//!
//! All filters treat a cell as a candidate when it is unknown (`< 0`) or
//! above `threshold`; every other cell is reset to free.

use serde::{Deserialize, Serialize};

use super::occupancy::{FREE, OCCUPIED, OccupancyGrid, UNKNOWN};

/// Post-processing applied to a quantized grid before publishing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenoisePolicy {
    /// Publish the quantized grid unchanged
    #[default]
    None,
    /// In-place 3x3 sum with 8-bit wrapping accumulation
    LocalSum,
    /// 3x3 sum over an unmodified copy of the grid
    LocalSumSnapshot,
    /// Clamped 5x5 majority vote of confidently free cells
    MajorityVote,
}

impl DenoisePolicy {
    /// Filter `grid` in place.
    pub fn apply(&self, grid: &mut OccupancyGrid, threshold: f32) {
        let (width, height) = (grid.width(), grid.height());
        match self {
            DenoisePolicy::None => {}
            DenoisePolicy::LocalSum => local_sum(&mut grid.data, width, height, threshold),
            DenoisePolicy::LocalSumSnapshot => {
                local_sum_snapshot(&mut grid.data, width, height, threshold)
            }
            DenoisePolicy::MajorityVote => majority_vote(&mut grid.data, width, height, threshold),
        }
    }
}

#[inline]
fn is_candidate(value: i8, threshold: f32) -> bool {
    value < 0 || value as f32 > threshold
}

#[inline]
fn classify_sum(normalized: i32, threshold: f32) -> i8 {
    if normalized as f32 > threshold * 0.1 {
        OCCUPIED
    } else if normalized > 1 {
        FREE
    } else {
        UNKNOWN
    }
}

/// 3x3 local-sum rule, byte-for-byte with the historical in-place pass.
///
/// The cell accumulates its neighborhood into itself with `i8` wrapping
/// arithmetic, so it adds its own running sum when the window reaches the
/// centre, and it reads neighbours above and to the left after they have
/// already been rewritten. The result depends on scan order. The one-cell
/// border is left untouched.
pub fn local_sum(data: &mut [i8], width: usize, height: usize, threshold: f32) {
    if width < 3 || height < 3 {
        return;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y * width + x;
            if !is_candidate(data[idx], threshold) {
                data[idx] = FREE;
                continue;
            }
            for i in y - 1..=y + 1 {
                for j in x - 1..=x + 1 {
                    data[idx] = data[idx].wrapping_add(data[i * width + j]);
                }
            }
            data[idx] /= 10;
            data[idx] = classify_sum(data[idx] as i32, threshold);
        }
    }
}

/// 3x3 local-sum rule evaluated against an unmodified copy of the grid.
///
/// Each of the nine cells is counted once and summed without overflow, so
/// the result no longer depends on scan order. The one-cell border is left
/// untouched.
pub fn local_sum_snapshot(data: &mut [i8], width: usize, height: usize, threshold: f32) {
    if width < 3 || height < 3 {
        return;
    }
    let snapshot = data.to_vec();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y * width + x;
            if !is_candidate(snapshot[idx], threshold) {
                data[idx] = FREE;
                continue;
            }
            let mut sum = 0i32;
            for i in y - 1..=y + 1 {
                for j in x - 1..=x + 1 {
                    sum += snapshot[i * width + j] as i32;
                }
            }
            data[idx] = classify_sum(sum / 10, threshold);
        }
    }
}

/// 5x5 majority vote of confidently free cells (`0 < value < threshold`).
///
/// The window is clamped at the grid edges. Neighbours are read from an
/// unmodified copy so cells reset earlier in the pass still vote.
pub fn majority_vote(data: &mut [i8], width: usize, height: usize, threshold: f32) {
    if width == 0 || height == 0 {
        return;
    }
    let snapshot = data.to_vec();
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let value = snapshot[idx];
            if !is_candidate(value, threshold) {
                data[idx] = FREE;
                continue;
            }

            let (y0, y1) = (y.saturating_sub(2), (y + 2).min(height - 1));
            let (x0, x1) = (x.saturating_sub(2), (x + 2).min(width - 1));
            let mut count = 0usize;
            let mut confidently_free = 0usize;
            for i in y0..=y1 {
                for j in x0..=x1 {
                    let neighbour = snapshot[i * width + j];
                    count += 1;
                    if neighbour > 0 && (neighbour as f32) < threshold {
                        confidently_free += 1;
                    }
                }
            }

            data[idx] = if confidently_free > count / 2 {
                FREE
            } else if value > 0 {
                OCCUPIED
            } else {
                UNKNOWN
            };
        }
    }
}
