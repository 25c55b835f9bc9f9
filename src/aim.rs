use na::{Point3, UnitQuaternion, Vector3};
use raylink_api_types::RaycastQuery;

pub const DEFAULT_REACH: f32 = 1000.0;

/// Where the client is looking from, and how far its rays go.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aim {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub reach: f32,
}

impl Default for Aim {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            reach: DEFAULT_REACH,
        }
    }
}

impl Aim {
    /// Yaw turns around +Y, pitch around +X, both in degrees. With both at
    /// zero the aim looks down -Z.
    pub fn from_yaw_pitch(position: Point3<f32>, yaw: f32, pitch: f32, reach: f32) -> Self {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw.to_radians());
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch.to_radians());

        Self {
            position,
            rotation: yaw * pitch,
            reach,
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * -Vector3::z()
    }

    pub fn query(&self) -> RaycastQuery {
        RaycastQuery::new(self.position, self.position + self.forward() * self.reach)
    }
}
