use crate::{Component, Params, Path, Point, StringError, Surface};

/// largest element of `vals`, or NaN if any element is NaN
fn nan_max(vals: &[f64]) -> f64 {
    vals.iter().fold(f64::NEG_INFINITY, |h, &v| {
        if h.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            h.max(v)
        }
    })
}

/// Take one steepest-descent step from `path`. Every point moves against the
/// interpolated gradient, scaled by the largest gradient magnitude on the
/// whole path, so the point on the steepest slope moves exactly
/// `params.step_size` and every other point moves proportionally less.
///
/// Outside of `params.strict` mode, gradients that cannot be interpolated are
/// NaN and poison the shared scale factor, so the whole returned path is NaN.
pub fn evolve(
    surface: &Surface,
    path: &Path,
    params: &Params,
) -> Result<Path, StringError> {
    let gx = surface.eval(Component::GradX, path.points());
    let gy = surface.eval(Component::GradY, path.points());
    if params.strict {
        if let Some(index) =
            gx.iter().zip(&gy).position(|(x, y)| x.is_nan() || y.is_nan())
        {
            return Err(StringError::OutOfDomain {
                index,
                point: path.points()[index],
            });
        }
    }
    let grads: Vec<Point> =
        gx.into_iter().zip(gy).map(|(x, y)| Point::new(x, y)).collect();
    let mags: Vec<f64> = grads.iter().map(|g| g.norm()).collect();
    let h = nan_max(&mags);
    log::trace!("largest gradient magnitude h = {h:.8e}");
    if params.strict && h == 0.0 {
        return Err(StringError::ZeroGradient);
    }
    Ok(Path::new(
        path.iter()
            .zip(&grads)
            .map(|(p, g)| p - params.step_size * g / h)
            .collect(),
    ))
}
