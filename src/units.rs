//! Spatial units and the voxel-to-MBF affine.
//!
//! MBF space is expressed in micrometres with +x towards the right of the
//! image, +y towards its top and +z towards the top of the stack. Image
//! rows grow downwards, hence the negated y scale.

use ndarray::Array2;

use crate::error::{MbfError, Result};

const UNITS: &str = "pm, nm, um, mm, cm, dm, m, Dm, Hm, Km";

/// Size of one `name` in metres.
///
/// Accepts short symbols, their long forms (`micro`, `micrometer`,
/// `micrometre`, `μm`, ...) or a bare number, which is taken as the scale
/// itself.
pub fn get_unit_scale(name: &str) -> Result<f64> {
    let scale = match name {
        "pm" | "pico" | "picometer" | "picometre" => 1e-12,
        "nm" | "nano" | "nanometer" | "nanometre" => 1e-9,
        "um" | "micro" | "micrometer" | "micrometre" | "μm" => 1e-6,
        "mm" | "milli" | "millimeter" | "millimetre" => 1e-3,
        "cm" | "centi" | "centimeter" | "centimetre" => 1e-2,
        "dm" | "deci" | "decimeter" | "decimetre" => 1e-1,
        "m" | "meter" | "metre" => 1.0,
        "Dm" | "deca" | "decameter" | "decametre" => 1e1,
        "Hm" | "hecto" | "hectometer" | "hectometre" => 1e2,
        "Km" | "kilo" | "kilometer" | "kilometre" => 1e3,
        other => other.trim().parse::<f64>().map_err(|_| MbfError::Parse {
            message: format!("unknown unit '{other}'"),
            help: Some(format!("Use one of {UNITS}, a long form such as 'micrometer', or a number")),
        })?,
    };
    Ok(scale)
}

/// Convert `value` from `src` units to `dst` units.
pub fn convert_unit(value: f64, src: &str, dst: &str) -> Result<f64> {
    Ok(value * (get_unit_scale(src)? / get_unit_scale(dst)?))
}

/// In-place [`convert_unit`] over a slice.
pub fn convert_unit_slice(values: &mut [f64], src: &str, dst: &str) -> Result<()> {
    let factor = get_unit_scale(src)? / get_unit_scale(dst)?;
    for value in values.iter_mut() {
        *value *= factor;
    }
    Ok(())
}

/// Build the 4x4 matrix mapping voxel indices `(i, j, k)` to MBF space.
///
/// `scale` is the voxel size along `(x, y, z)` and `origin` the MBF
/// position of the top-left corner of the first voxel. The x/y origin sits
/// on the voxel corner while z is centred on the plane.
pub fn make_vox2mbf(scale: [f64; 3], origin: [f64; 3]) -> Array2<f64> {
    let mut affine = Array2::eye(4);
    for axis in 0..3 {
        affine[[axis, axis]] = scale[axis];
    }
    affine[[1, 1]] *= -1.0;
    for axis in 0..3 {
        affine[[axis, 3]] = origin[axis] + affine[[axis, axis]] * 0.5;
    }
    for axis in 0..2 {
        affine[[axis, 3]] += affine[[axis, axis]] * 0.5;
    }
    affine
}
