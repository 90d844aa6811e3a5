//! ALA (2001) soil-spring bearing and adhesion factors.
//!
//! `x = H / D` is the centreline depth over diameter. The tabulated `Nqh`
//! polynomials are fitted for `x ≤ 11`; beyond that they turn over, so `x` is
//! clamped there.

/// Reference pressure for the adhesion factor (psf, 100 kPa).
const ADHESION_REFERENCE_PSF: f64 = 2089.0;

/// Upper end of the fitted `H / D` range.
pub const MAX_DEPTH_RATIO: f64 = 11.0;

/// `Nqh = a + b·x + c·x² + d·x³ + e·x⁴` by friction angle (degrees).
const NQH_ROWS: [(f64, [f64; 5]); 7] = [
    (0.0, [0.0, 0.0, 0.0, 0.0, 0.0]),
    (20.0, [2.399, 0.439, -0.03, 1.059e-3, -1.754e-5]),
    (25.0, [3.332, 0.839, -0.090, 5.606e-3, -1.319e-4]),
    (30.0, [4.565, 1.234, -0.089, 4.275e-3, -9.159e-5]),
    (35.0, [6.816, 2.019, -0.146, 7.651e-3, -1.683e-4]),
    (40.0, [10.959, 1.783, 0.045, -5.425e-3, -1.153e-4]),
    (45.0, [17.658, 3.309, 0.048, -6.443e-3, -1.299e-4]),
];

/// Adhesion factor `α` for cohesion `c` (psf), limited to `[0, 1]`.
pub fn adhesion_factor(cohesion: f64) -> f64 {
    let c = cohesion / ADHESION_REFERENCE_PSF;
    let alpha = 0.608 - 0.123 * c - 0.274 / (c * c + 1.0) + 0.695 / (c * c * c + 1.0);
    alpha.clamp(0.0, 1.0)
}

/// At-rest earth pressure coefficient (Jaky).
pub fn at_rest_coefficient(friction_angle: f64) -> f64 {
    1.0 - friction_angle.to_radians().sin()
}

fn clamp_ratio(x: f64) -> f64 {
    x.clamp(0.0, MAX_DEPTH_RATIO)
}

/// Horizontal bearing factor for clay, capped at 9.
pub fn horizontal_bearing_clay(x: f64) -> f64 {
    let x = clamp_ratio(x);
    let n = 6.752 + 0.065 * x - 11.063 / (x + 1.0).powi(2) + 7.119 / (x + 1.0).powi(3);
    n.min(9.0)
}

/// Horizontal bearing factor for sand, interpolated linearly in `φ` between the
/// tabulated rows and held at the 45° row above that.
pub fn horizontal_bearing_sand(friction_angle: f64, x: f64) -> f64 {
    let x = clamp_ratio(x);
    let phi = friction_angle.clamp(0.0, 45.0);
    let poly = |c: &[f64; 5]| c[0] + x * (c[1] + x * (c[2] + x * (c[3] + x * c[4])));

    let mut value = poly(&NQH_ROWS[NQH_ROWS.len() - 1].1);
    for pair in NQH_ROWS.windows(2) {
        let (lo_phi, lo) = &pair[0];
        let (hi_phi, hi) = &pair[1];
        if phi <= *hi_phi {
            let t = (phi - lo_phi) / (hi_phi - lo_phi);
            value = (1.0 - t) * poly(lo) + t * poly(hi);
            break;
        }
    }
    value.max(0.0)
}
