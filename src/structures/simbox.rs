// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of the SimBox structure and its methods.

use nalgebra::{Matrix3, Vector3};

/// Structure defining simulation box shape and dimensions
/// in the LAMMPS convention: the box spans from `lo` to `hi` along each dimension
/// and is (optionally) skewed by the tilt factors `xy`, `xz`, and `yz`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimBox {
    /// `[lo, hi]` along x, y, and z.
    pub bounds: [[f64; 2]; 3],
    /// Tilt factors `[xy, xz, yz]`.
    pub tilt: [f64; 3],
}

impl SimBox {
    /// Create new orthogonal simulation box.
    pub fn new(bounds: [[f64; 2]; 3]) -> Self {
        SimBox {
            bounds,
            tilt: [0.0; 3],
        }
    }

    /// Create new simulation box with the specified tilt factors.
    pub fn with_tilt(mut self, tilt: [f64; 3]) -> Self {
        self.tilt = tilt;
        self
    }

    /// Construct the simulation box from the bounds of a dump file.
    ///
    /// For triclinic boxes, dump files contain the bounds of the bounding box
    /// of the simulation box which are converted to the actual box bounds.
    pub fn from_dump_bounds(bounds: [[f64; 2]; 3], tilt: Option<[f64; 3]>) -> Self {
        let tilt = match tilt {
            None => return SimBox::new(bounds),
            Some(x) => x,
        };

        let [xy, xz, yz] = tilt;
        let candidates = [0.0, xy, xz, xy + xz];
        let xmin = candidates.iter().cloned().fold(f64::INFINITY, f64::min);
        let xmax = candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        SimBox {
            bounds: [
                [bounds[0][0] - xmin, bounds[0][1] - xmax],
                [bounds[1][0] - yz.min(0.0), bounds[1][1] - yz.max(0.0)],
                bounds[2],
            ],
            tilt,
        }
    }

    /// Get the bounds of the bounding box of the simulation box
    /// (as written into dump files).
    pub fn to_dump_bounds(&self) -> [[f64; 2]; 3] {
        if !self.is_triclinic() {
            return self.bounds;
        }

        let [xy, xz, yz] = self.tilt;
        let candidates = [0.0, xy, xz, xy + xz];
        let xmin = candidates.iter().cloned().fold(f64::INFINITY, f64::min);
        let xmax = candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        [
            [self.bounds[0][0] + xmin, self.bounds[0][1] + xmax],
            [self.bounds[1][0] + yz.min(0.0), self.bounds[1][1] + yz.max(0.0)],
            self.bounds[2],
        ]
    }

    /// Create new simulation box from lengths and angles (in degrees).
    /// The box starts at the origin.
    ///
    /// ## Example
    /// ```
    /// # use lammps_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let simbox = SimBox::from_lengths_angles([5.0, 4.0, 3.0], [80.0, 70.0, 120.0]);
    /// let [xy, xz, yz] = simbox.tilt;
    ///
    /// assert_approx_eq!(f64, xy, -2.000000, epsilon = 0.0001);
    /// assert_approx_eq!(f64, xz,  1.026060, epsilon = 0.0001);
    /// assert_approx_eq!(f64, yz,  1.193930, epsilon = 0.0001);
    /// ```
    pub fn from_lengths_angles(lengths: [f64; 3], angles: [f64; 3]) -> Self {
        let [a, b, c] = lengths;
        let [alpha, beta, gamma] = angles.map(|x| x.to_radians());

        let lx = a;
        let xy = b * gamma.cos();
        let xz = c * beta.cos();
        let ly = (b * b - xy * xy).sqrt();
        let yz = (b * c * alpha.cos() - xy * xz) / ly;
        let lz = (c * c - xz * xz - yz * yz).sqrt();

        let mut tilt = [xy, xz, yz];
        // remove numerical noise of orthogonal boxes
        for t in tilt.iter_mut() {
            if t.abs() < 1e-12 {
                *t = 0.0;
            }
        }

        SimBox::new([[0.0, lx], [0.0, ly], [0.0, lz]]).with_tilt(tilt)
    }

    /// Calculate lengths of the box vectors and the angles between them (in degrees).
    pub fn to_lengths_angles(&self) -> ([f64; 3], [f64; 3]) {
        let [lx, ly, lz] = self.edge_lengths();
        let [xy, xz, yz] = self.tilt;

        let a = lx;
        let b = (ly * ly + xy * xy).sqrt();
        let c = (lz * lz + xz * xz + yz * yz).sqrt();

        let alpha = ((xy * xz + ly * yz) / (b * c)).acos().to_degrees();
        let beta = (xz / c).acos().to_degrees();
        let gamma = (xy / b).acos().to_degrees();

        ([a, b, c], [alpha, beta, gamma])
    }

    /// Check whether the simulation box is triclinic (any tilt factor is non-zero).
    pub fn is_triclinic(&self) -> bool {
        self.tilt.iter().any(|&t| t != 0.0)
    }

    /// Get the edge lengths of the box `[hi - lo]` along each dimension.
    pub fn edge_lengths(&self) -> [f64; 3] {
        self.bounds.map(|[lo, hi]| hi - lo)
    }

    /// Get the origin (`lo` corner) of the simulation box.
    pub fn origin(&self) -> Vector3<f64> {
        Vector3::new(self.bounds[0][0], self.bounds[1][0], self.bounds[2][0])
    }

    /// Get the box matrix with the box vectors `a`, `b`, `c` as columns.
    pub fn matrix(&self) -> Matrix3<f64> {
        let [lx, ly, lz] = self.edge_lengths();
        let [xy, xz, yz] = self.tilt;

        Matrix3::new(lx, xy, xz, 0.0, ly, yz, 0.0, 0.0, lz)
    }

    /// Get the volume of the simulation box.
    pub fn volume(&self) -> f64 {
        self.matrix().determinant()
    }

    /// Convert fractional (scaled) coordinates into Cartesian coordinates.
    pub fn unscale(&self, scaled: [f64; 3]) -> [f64; 3] {
        let cartesian = self.matrix() * Vector3::from(scaled) + self.origin();
        [cartesian.x, cartesian.y, cartesian.z]
    }

    /// Convert Cartesian coordinates into fractional (scaled) coordinates.
    /// Returns `None` if the box is degenerate.
    pub fn scale(&self, cartesian: [f64; 3]) -> Option<[f64; 3]> {
        let inverse = self.matrix().try_inverse()?;
        let scaled = inverse * (Vector3::from(cartesian) - self.origin());
        Some([scaled.x, scaled.y, scaled.z])
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
