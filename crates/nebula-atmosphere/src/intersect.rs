//! Ray/sphere intersection against planet-centred spheres.

use glam::Vec3;

/// Both roots of a ray/sphere intersection, `near <= far`.
///
/// Roots behind the ray origin are reported as negative distances; callers
/// clamp as they need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereHit {
    pub near: f32,
    pub far: f32,
}

/// Intersect a ray with a sphere of `radius` centred on the origin.
///
/// `dir` must be normalized. Returns `None` when the ray's line misses the
/// sphere entirely.
///
/// The constant term is evaluated as `(|o| - r)(|o| + r)` and the roots via the
/// stable quadratic form, so a camera a few metres above a 6360 km planet still
/// resolves its altitude in `f32`.
pub fn ray_sphere_intersect(origin: Vec3, dir: Vec3, radius: f32) -> Option<SphereHit> {
    let b = origin.dot(dir);
    let dist = origin.length();
    let c = (dist - radius) * (dist + radius);
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    let q = if b > 0.0 {
        -(b + sqrt_disc)
    } else {
        -b + sqrt_disc
    };

    if q == 0.0 {
        // Origin on the sphere and ray tangent to it.
        return Some(SphereHit {
            near: 0.0,
            far: 0.0,
        });
    }

    let (t0, t1) = (q, c / q);
    Some(SphereHit {
        near: t0.min(t1),
        far: t0.max(t1),
    })
}

/// Distance along the ray to the first ground hit ahead of the origin.
///
/// An origin on or under the surface that heads downward is already at the
/// ground and gets `Some(0.0)`; grazing or upward rays from there get `None`.
pub fn ground_hit_distance(origin: Vec3, dir: Vec3, ground_radius: f32) -> Option<f32> {
    let hit = ray_sphere_intersect(origin, dir, ground_radius)?;
    if hit.near > 0.0 {
        return Some(hit.near);
    }
    let on_or_below = origin.length() <= ground_radius;
    (on_or_below && origin.dot(dir) < 0.0).then_some(0.0)
}

/// Whether the ray strikes the ground in front of its origin.
pub fn hits_ground(origin: Vec3, dir: Vec3, ground_radius: f32) -> bool {
    ground_hit_distance(origin, dir, ground_radius).is_some()
}

/// Distance from radius `r` to the sphere of radius `top`, travelling with
/// zenith cosine `mu`. Assumes `r <= top`.
pub fn distance_to_top_boundary(r: f32, mu: f32, top: f32) -> f32 {
    let top_sq_minus_r_sq = ((top - r) * (top + r)).max(0.0);
    let disc = (top_sq_minus_r_sq + r * r * mu * mu).max(0.0);
    let sqrt_disc = disc.sqrt();
    if mu >= 0.0 {
        let denom = r * mu + sqrt_disc;
        if denom <= 0.0 {
            0.0
        } else {
            top_sq_minus_r_sq / denom
        }
    } else {
        (-r * mu + sqrt_disc).max(0.0)
    }
}
