//! Sun geometry and lamination optics for the solar array.

use core::f64::consts::PI;

use crate::error::ModelResult;
use sc_core::numeric::clamp_unit;
use sc_core::{Dimension, ParamStore, Unit};

/// Refractive index of air.
const N_AIR: f64 = 1.0;

/// Lower bound on `cos(theta_1)` when scaling absorption path length.
const MIN_PATH_COS: f64 = 1e-6;

/// Fraction of direct irradiance reaching a horizontal array.
///
/// Hour angle `h = (hours - 12) * pi/12`, declination 0:
/// `sin(alpha) = sin(lat) sin(dec) + cos(lat) cos(dec) cos(h)`.
/// Returns 0 when the sun is at or below the horizon.
pub fn incidence_factor(latitude_rad: f64, seconds_since_midnight: f64) -> f64 {
    let hours = seconds_since_midnight / 3600.0;
    let h = (hours - 12.0) * (PI / 12.0);
    let dec: f64 = 0.0;
    let sin_alpha = latitude_rad.sin() * dec.sin() + latitude_rad.cos() * dec.cos() * h.cos();
    let sin_alpha = sin_alpha.clamp(-1.0, 1.0);
    if sin_alpha <= 0.0 {
        0.0
    } else {
        sin_alpha
    }
}

/// Cover glass and encapsulant properties.
#[derive(Clone, Debug, PartialEq)]
pub struct LaminationOptics {
    pub n_cover: f64,
    /// Fractional reflectance reduction from an anti-reflective coating.
    pub ar_gain: f64,
    pub t_cover_m: f64,
    pub alpha_cover_per_m: f64,
    pub t_eva_m: f64,
    pub alpha_eva_per_m: f64,
    /// Soiling and other lumped losses.
    pub tau_misc: f64,
}

impl LaminationOptics {
    pub const REQUIRED: [&'static str; 5] = ["n_cover", "t_cover", "alpha_cover", "t_eva", "alpha_eva"];
    pub const OPTIONAL: [&'static str; 2] = ["ar_gain", "tau_misc"];

    pub fn from_params(params: &ParamStore) -> ModelResult<Self> {
        let meter = Unit::si(Dimension::LENGTH);
        let per_meter = Unit::new("1/m", 1.0, Dimension::LENGTH.powi(-1));
        let ar_gain = match params.get_opt("ar_gain") {
            Some(_) => params.ratio("ar_gain")?,
            None => 0.0,
        };
        let tau_misc = match params.get_opt("tau_misc") {
            Some(_) => params.ratio("tau_misc")?,
            None => 1.0,
        };
        Ok(Self {
            n_cover: params.ratio("n_cover")?,
            ar_gain,
            t_cover_m: params.magnitude_in("t_cover", &meter)?,
            alpha_cover_per_m: params.magnitude_in("alpha_cover", &per_meter)?,
            t_eva_m: params.magnitude_in("t_eva", &meter)?,
            alpha_eva_per_m: params.magnitude_in("alpha_eva", &per_meter)?,
            tau_misc,
        })
    }

    /// Transmittance multiplier `tau(theta)` in `[0, 1]` for incidence angle
    /// `theta` (radians from the panel normal).
    pub fn transmittance(&self, theta: f64) -> f64 {
        let n1 = self.n_cover;

        // Snell
        let s = (theta.sin() / n1).clamp(-1.0, 1.0);
        let theta1 = s.asin();
        let c0 = theta.cos();
        let c1 = theta1.cos();

        // unpolarised Fresnel
        let rs = ((N_AIR * c0 - n1 * c1) / (N_AIR * c0 + n1 * c1)).powi(2);
        let rp = ((N_AIR * c1 - n1 * c0) / (N_AIR * c1 + n1 * c0)).powi(2);
        let r = 0.5 * (rs + rp) * (1.0 - self.ar_gain);
        let t_interface = (1.0 - r).max(0.0);

        // Beer-Lambert through cover and encapsulant
        let path_scale = 1.0 / c1.max(MIN_PATH_COS);
        let t_abs = (-self.alpha_cover_per_m * self.t_cover_m * path_scale).exp()
            * (-self.alpha_eva_per_m * self.t_eva_m * path_scale).exp();

        clamp_unit(t_interface * t_abs * self.tau_misc)
    }
}
