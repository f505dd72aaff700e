//! Joint-angle geometry on the image plane.

use crate::landmarks::Point3D;

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees.
///
/// Only the `(x, y)` projection is used. Returns `0.0` when either ray has
/// zero length. The cosine is clamped to `[-1, 1]` before `acos`, so rounding
/// on (anti)parallel rays cannot produce NaN.
pub fn angle(a: Point3D, b: Point3D, c: Point3D) -> f64 {
    let ba = (f64::from(a.x - b.x), f64::from(a.y - b.y));
    let bc = (f64::from(c.x - b.x), f64::from(c.y - b.y));

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let mag = ba.0.hypot(ba.1) * bc.0.hypot(bc.1);
    if mag == 0.0 {
        return 0.0;
    }
    (dot / mag).clamp(-1.0, 1.0).acos().to_degrees()
}
