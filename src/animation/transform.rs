use crate::{
    animation::anim::{Animation, Property},
    foundation::core::{Affine, Vec2},
};

/// Depth at which `translate_z` doubles the apparent size.
const PERSPECTIVE_PX: f64 = 1000.0;

/// Resolved transform values of an element at one sampled time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformSnapshot {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels.
    pub y: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// 2D rotation in degrees, clockwise in screen space.
    pub rotation: f64,
    /// Rotation about X in degrees.
    pub rotate_x: f64,
    /// Rotation about Y in degrees.
    pub rotate_y: f64,
    /// Rotation about Z in degrees.
    pub rotate_z: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Depth offset in pixels.
    pub translate_z: f64,
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            rotate_z: 0.0,
            opacity: 1.0,
            translate_z: 0.0,
        }
    }
}

impl TransformSnapshot {
    /// Fold `animations` over `base` at element-local time `t`.
    ///
    /// Later animations on the same property win. Animations that sample to `None` leave the
    /// current value untouched.
    pub fn evaluate(base: &TransformSnapshot, animations: &[Animation], t: f64) -> Self {
        animations.iter().fold(*base, |mut acc, anim| {
            if let Some(v) = anim.sample(t) {
                acc.set(anim.property(), v);
            }
            acc
        })
    }

    /// Overwrite one property.
    pub fn set(&mut self, property: Property, value: f64) {
        match property {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Scale => {
                self.scale_x = value;
                self.scale_y = value;
            }
            Property::ScaleX => self.scale_x = value,
            Property::ScaleY => self.scale_y = value,
            Property::Rotation => self.rotation = value,
            Property::RotateX => self.rotate_x = value,
            Property::RotateY => self.rotate_y = value,
            Property::RotateZ => self.rotate_z = value,
            Property::Opacity => self.opacity = value,
            Property::TranslateZ => self.translate_z = value,
        }
    }

    /// Opacity clamped to `[0, 1]`.
    pub fn clamped_opacity(&self) -> f64 {
        self.opacity.clamp(0.0, 1.0)
    }

    /// `true` when the snapshot does not move, scale, or rotate pixels.
    pub fn is_geometric_identity(&self) -> bool {
        self.to_affine(1.0, 1.0) == Affine::IDENTITY
    }

    /// Pixel-space affine for a layer of `width x height`, pivoting around its center.
    ///
    /// `rotate_x`/`rotate_y` are approximated by cosine foreshortening of the opposite axis and
    /// `translate_z` by a perspective scale.
    pub fn to_affine(&self, width: f64, height: f64) -> Affine {
        let depth = (PERSPECTIVE_PX / (PERSPECTIVE_PX - self.translate_z).max(1.0)).max(0.0);
        let sx = self.scale_x * self.rotate_y.to_radians().cos() * depth;
        let sy = self.scale_y * self.rotate_x.to_radians().cos() * depth;
        let angle = (self.rotation + self.rotate_z).to_radians();

        let center = Vec2::new(width / 2.0, height / 2.0);
        let about_center = Affine::translate(center)
            * Affine::rotate(angle)
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-center);
        let out = Affine::translate(Vec2::new(self.x, self.y)) * about_center;
        snap_identity(out)
    }
}

fn snap_identity(a: Affine) -> Affine {
    let c = a.as_coeffs();
    let id = Affine::IDENTITY.as_coeffs();
    if c.iter().zip(id.iter()).all(|(x, y)| (x - y).abs() < 1e-9) {
        Affine::IDENTITY
    } else {
        a
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transform.rs"]
mod tests;
