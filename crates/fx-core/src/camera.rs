use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::constants::*;

/// Perspective camera looking at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

/// A point projected onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Canvas pixel position, origin top-left.
    pub px: Vec2,
    /// Pixels per world unit at that depth, for sizing sprites.
    pub px_per_unit: f32,
    /// Eye-space distance, larger is further away.
    pub depth: f32,
}

impl Camera {
    fn preset(eye: [f32; 3], fov_deg: f32, aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(eye),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: fov_deg.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    pub fn particles(aspect: f32) -> Self {
        Self::preset(PARTICLE_CAMERA_EYE, PARTICLE_CAMERA_FOV_DEG, aspect)
    }

    pub fn orbit(aspect: f32) -> Self {
        Self::preset(ORBIT_CAMERA_EYE, ORBIT_CAMERA_FOV_DEG, aspect)
    }

    pub fn timeline(aspect: f32) -> Self {
        Self::preset(TIMELINE_CAMERA_EYE, TIMELINE_CAMERA_FOV_DEG, aspect)
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point onto a `width` x `height` canvas.
    ///
    /// Returns `None` for points behind the near plane.
    pub fn project(&self, world: Vec3, width: f32, height: f32) -> Option<ScreenPoint> {
        let view = self.view_matrix().transform_point3(world);
        let depth = -view.z;
        if depth <= self.znear {
            return None;
        }
        let clip = self.projection_matrix() * view.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        let px = Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height);
        let px_per_unit = height * 0.5 / ((self.fovy_radians * 0.5).tan() * depth);
        Some(ScreenPoint {
            px,
            px_per_unit,
            depth,
        })
    }

    /// World-space ray through canvas pixel `(sx, sy)`.
    ///
    /// Returns `(ray_origin, ray_direction)`.
    pub fn screen_ray(&self, sx: f32, sy: f32, width: f32, height: f32) -> (Vec3, Vec3) {
        let ndc_x = (2.0 * sx / width.max(1.0)) - 1.0;
        let ndc_y = 1.0 - (2.0 * sy / height.max(1.0));
        let inv = self.view_projection().inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        let rd = (p1 - self.eye).normalize_or_zero();
        (self.eye, rd)
    }
}

/// Distance along the ray to the first hit on the sphere, if any.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Index of the nearest sphere the ray hits.
pub fn pick_nearest<I>(ray_origin: Vec3, ray_dir: Vec3, spheres: I) -> Option<usize>
where
    I: IntoIterator<Item = (Vec3, f32)>,
{
    spheres
        .into_iter()
        .enumerate()
        .filter_map(|(i, (center, radius))| {
            ray_sphere(ray_origin, ray_dir, center, radius).map(|t| (i, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_canvas_center() {
        let cam = Camera::orbit(1.0);
        let p = cam.project(Vec3::ZERO, 300.0, 300.0).unwrap();
        assert!((p.px - Vec2::new(150.0, 150.0)).length() < 1e-3);
        assert!((p.depth - 8.0).abs() < 1e-4);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let cam = Camera::particles(1.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 10.0), 100.0, 100.0).is_none());
    }

    #[test]
    fn center_ray_hits_origin_sphere() {
        let cam = Camera::orbit(1.0);
        let (ro, rd) = cam.screen_ray(150.0, 150.0, 300.0, 300.0);
        let t = ray_sphere(ro, rd, Vec3::ZERO, 0.8).unwrap();
        assert!((t - 7.2).abs() < 1e-3);
    }

    #[test]
    fn picking_prefers_the_closer_sphere() {
        let ro = Vec3::new(0.0, 0.0, 8.0);
        let rd = Vec3::NEG_Z;
        let hit = pick_nearest(
            ro,
            rd,
            [(Vec3::new(0.0, 0.0, -2.0), 0.8), (Vec3::new(0.0, 0.0, 2.0), 0.8)],
        );
        assert_eq!(hit, Some(1));
        assert_eq!(pick_nearest(ro, Vec3::X, [(Vec3::ZERO, 0.8)]), None);
    }
}
