//! Cubic basis matrices for curve evaluation.
//!
//! Every supported basis is expressed as a 4x4 matrix `M` applied to the
//! monomials `[t³, t², t, 1]`, so the weight of control vertex `i` at local
//! parameter `t` is
//!
//! ```text
//! c_i(t) = M[0][i]·t³ + M[1][i]·t² + M[2][i]·t + M[3][i]
//! ```
//!
//! The linear basis uses the same form with only the first two columns set.

use prim_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

const LINEAR: [[f64; 4]; 4] = [
    [0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0],
    [-1.0, 1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 0.0],
];

const BEZIER: [[f64; 4]; 4] = [
    [-1.0, 3.0, -3.0, 1.0],
    [3.0, -6.0, 3.0, 0.0],
    [-3.0, 3.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 0.0],
];

const BSPLINE: [[f64; 4]; 4] = [
    [-1.0 / 6.0, 3.0 / 6.0, -3.0 / 6.0, 1.0 / 6.0],
    [3.0 / 6.0, -6.0 / 6.0, 3.0 / 6.0, 0.0],
    [-3.0 / 6.0, 0.0, 3.0 / 6.0, 0.0],
    [1.0 / 6.0, 4.0 / 6.0, 1.0 / 6.0, 0.0],
];

const CATMULL_ROM: [[f64; 4]; 4] = [
    [-0.5, 1.5, -1.5, 0.5],
    [1.0, -2.5, 2.0, -0.5],
    [-0.5, 0.0, 0.5, 0.0],
    [0.0, 1.0, 0.0, 0.0],
];

/// Blending-function family shared by every sub-curve of a curves primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    Linear,
    Bezier,
    BSpline,
    CatmullRom,
}

impl Basis {
    pub fn matrix(self) -> &'static [[f64; 4]; 4] {
        match self {
            Basis::Linear => &LINEAR,
            Basis::Bezier => &BEZIER,
            Basis::BSpline => &BSPLINE,
            Basis::CatmullRom => &CATMULL_ROM,
        }
    }

    /// Number of control vertices to advance between consecutive spans.
    pub fn step(self) -> usize {
        match self {
            Basis::Bezier => 3,
            Basis::Linear | Basis::BSpline | Basis::CatmullRom => 1,
        }
    }

    pub fn is_linear(self) -> bool {
        matches!(self, Basis::Linear)
    }

    /// Number of control vertices that influence a single span.
    pub fn num_coefficients(self) -> usize {
        if self.is_linear() {
            2
        } else {
            4
        }
    }

    /// Smallest vertex count a sub-curve may have for this basis.
    pub fn min_vertices(self, periodic: bool) -> usize {
        match (self.is_linear(), periodic) {
            (true, _) => 2,
            (false, true) => 3,
            (false, false) => 4,
        }
    }

    /// Number of spans in a sub-curve of `num_vertices` control vertices.
    pub fn num_segments(self, periodic: bool, num_vertices: usize) -> usize {
        if self.is_linear() {
            return if periodic {
                num_vertices
            } else {
                num_vertices.saturating_sub(1)
            };
        }
        if periodic {
            num_vertices / self.step()
        } else if num_vertices < 4 {
            0
        } else {
            (num_vertices - 4) / self.step() + 1
        }
    }

    /// Control vertices left over after the last whole span of an open cubic curve.
    pub fn trailing_vertices(self, periodic: bool, num_vertices: usize) -> usize {
        if self.is_linear() || num_vertices < self.min_vertices(periodic) {
            return 0;
        }
        if periodic {
            num_vertices % self.step()
        } else {
            (num_vertices - 4) % self.step()
        }
    }

    /// Basis weights of the four span control vertices at local parameter `t`.
    pub fn coefficients(self, t: f64) -> [f64; 4] {
        let m = self.matrix();
        let t2 = t * t;
        let t3 = t2 * t;
        let mut c = [0.0; 4];
        for (i, ci) in c.iter_mut().enumerate() {
            *ci = m[0][i] * t3 + m[1][i] * t2 + m[2][i] * t + m[3][i];
        }
        c
    }

    /// First derivative of [`Basis::coefficients`] with respect to `t`.
    pub fn derivative_coefficients(self, t: f64) -> [f64; 4] {
        let m = self.matrix();
        let t2 = t * t;
        let mut c = [0.0; 4];
        for (i, ci) in c.iter_mut().enumerate() {
            *ci = 3.0 * m[0][i] * t2 + 2.0 * m[1][i] * t + m[2][i];
        }
        c
    }

    /// Evaluate a span from its control vertices.
    ///
    /// Only the first [`Basis::num_coefficients`] entries of `cvs` are read.
    pub fn evaluate(self, cvs: &[Point3; 4], t: f64) -> Point3 {
        weighted(&self.coefficients(t), cvs, self.num_coefficients())
    }

    /// Evaluate the derivative of a span with respect to its local parameter.
    pub fn evaluate_derivative(self, cvs: &[Point3; 4], t: f64) -> Vector3 {
        weighted(&self.derivative_coefficients(t), cvs, self.num_coefficients())
    }
}

fn weighted(c: &[f64; 4], cvs: &[Point3; 4], n: usize) -> Point3 {
    c.iter()
        .zip(cvs.iter())
        .take(n)
        .fold(Point3::ZERO, |acc, (&w, &p)| acc + w * p)
}
