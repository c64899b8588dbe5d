const NEWTON_ITERATIONS: usize = 8;
const NEWTON_MIN_SLOPE: f64 = 1e-6;
const SOLVE_EPSILON: f64 = 1e-7;
const BISECTION_ITERATIONS: usize = 64;

/// CSS-style cubic bezier easing with fixed endpoints `(0,0)` and `(1,1)`.
///
/// Control points are clamped to `[0, 1]` on construction, which keeps `x(s)` monotonic and the
/// curve a function of `x`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: clamp_unit(x1),
            y1: clamp_unit(y1),
            x2: clamp_unit(x2),
            y2: clamp_unit(y2),
        }
    }

    /// CSS `ease`.
    pub fn css_ease() -> Self {
        Self::new(0.25, 0.1, 0.25, 1.0)
    }

    /// CSS `ease-in`.
    pub fn css_ease_in() -> Self {
        Self::new(0.42, 0.0, 1.0, 1.0)
    }

    /// CSS `ease-out`.
    pub fn css_ease_out() -> Self {
        Self::new(0.0, 0.0, 0.58, 1.0)
    }

    /// CSS `ease-in-out`.
    pub fn css_ease_in_out() -> Self {
        Self::new(0.42, 0.0, 0.58, 1.0)
    }

    /// Evaluate `y` for progress `x` (clamped to `[0, 1]`).
    pub fn apply(&self, x: f64) -> f64 {
        let x = clamp_unit(x);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        let s = self.solve_s_for_x(x);
        clamp_unit(bezier_coord(s, self.y1, self.y2))
    }

    /// Invert `x(s)`: Newton-Raphson first, bisection when the slope flattens out or Newton
    /// fails to converge.
    fn solve_s_for_x(&self, x: f64) -> f64 {
        let mut s = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = bezier_coord(s, self.x1, self.x2) - x;
            if err.abs() < SOLVE_EPSILON {
                return s;
            }
            let slope = bezier_slope(s, self.x1, self.x2);
            if slope.abs() < NEWTON_MIN_SLOPE {
                break;
            }
            s -= err / slope;
            if !(0.0..=1.0).contains(&s) {
                break;
            }
        }

        let (mut lo, mut hi) = (0.0f64, 1.0f64);
        let mut mid = x;
        for _ in 0..BISECTION_ITERATIONS {
            mid = (lo + hi) / 2.0;
            let err = bezier_coord(mid, self.x1, self.x2) - x;
            if err.abs() < SOLVE_EPSILON {
                break;
            }
            if err > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        mid
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

// One coordinate of the cubic with P0 = 0 and P3 = 1.
fn bezier_coord(s: f64, p1: f64, p2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/bezier.rs"]
mod tests;
