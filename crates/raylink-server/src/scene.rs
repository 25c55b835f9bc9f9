//! Static scene descriptions loaded into the server's query world.
//!
//! Scenes are JSON files listing fixed colliders:
//!
//! ```json
//! {
//!   "name": "hangar",
//!   "colliders": [
//!     { "shape": { "type": "cuboid", "half_extents": [50.0, 0.5, 50.0] },
//!       "translation": [0.0, -1.5, 0.0] },
//!     { "shape": { "type": "ball", "radius": 2.0 },
//!       "translation": [0.0, 3.0, -10.0] }
//!   ]
//! }
//! ```

use crate::world::SceneState;
use rapier::na::Unit;
use rapier::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unable to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("collider {index}: {reason}")]
    InvalidCollider { index: usize, reason: &'static str },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescription {
    Ball { radius: Real },
    Cuboid { half_extents: [Real; 3] },
    Capsule { half_height: Real, radius: Real },
    HalfSpace { normal: [Real; 3] },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderDescription {
    pub shape: ShapeDescription,
    #[serde(default)]
    pub translation: [Real; 3],
    /// Axis-angle, in radians.
    #[serde(default)]
    pub rotation: [Real; 3],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub name: String,
    pub colliders: Vec<ColliderDescription>,
}

impl ColliderDescription {
    pub fn new(shape: ShapeDescription, translation: [Real; 3]) -> Self {
        Self {
            shape,
            translation,
            rotation: [0.0; 3],
        }
    }

    fn builder(&self) -> Result<ColliderBuilder, &'static str> {
        let all_finite = |values: &[Real]| values.iter().all(|v| v.is_finite());
        if !all_finite(&self.translation) || !all_finite(&self.rotation) {
            return Err("non-finite pose");
        }

        let builder = match self.shape {
            ShapeDescription::Ball { radius } => {
                if !(radius > 0.0) {
                    return Err("ball radius must be positive");
                }
                ColliderBuilder::ball(radius)
            }
            ShapeDescription::Cuboid { half_extents } => {
                if !half_extents.iter().all(|e| *e > 0.0) {
                    return Err("cuboid half-extents must be positive");
                }
                let [hx, hy, hz] = half_extents;
                ColliderBuilder::cuboid(hx, hy, hz)
            }
            ShapeDescription::Capsule {
                half_height,
                radius,
            } => {
                if !(half_height >= 0.0 && radius > 0.0) {
                    return Err("capsule dimensions must be positive");
                }
                ColliderBuilder::capsule_y(half_height, radius)
            }
            ShapeDescription::HalfSpace { normal } => {
                let normal = Unit::try_new(Vector::from(normal), 1.0e-6)
                    .ok_or("half-space normal must not be zero")?;
                ColliderBuilder::halfspace(normal)
            }
        };

        Ok(builder
            .translation(Vector::from(self.translation))
            .rotation(Vector::from(self.rotation)))
    }
}

impl SceneDescription {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn build(&self) -> Result<SceneState, SceneError> {
        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for (index, desc) in self.colliders.iter().enumerate() {
            let builder = desc
                .builder()
                .map_err(|reason| SceneError::InvalidCollider { index, reason })?;
            colliders.insert(builder);
        }

        Ok(SceneState::new(bodies, colliders))
    }
}

/// The scene served when no file is given: a ground slab under the origin, a
/// wall across the -Z axis and a few crates.
pub fn builtin_scene() -> SceneDescription {
    /*
     * Ground
     */
    let ground = ColliderDescription::new(
        ShapeDescription::Cuboid {
            half_extents: [100.0, 0.5, 100.0],
        },
        [0.0, -1.5, 0.0],
    );

    /*
     * Wall
     */
    let wall = ColliderDescription::new(
        ShapeDescription::Cuboid {
            half_extents: [50.0, 25.0, 1.0],
        },
        [0.0, 0.0, -30.0],
    );

    /*
     * Crates
     */
    let crate_shape = ShapeDescription::Cuboid {
        half_extents: [1.0, 1.0, 1.0],
    };
    let crates = [
        ColliderDescription::new(crate_shape, [5.0, 0.0, -5.0]),
        ColliderDescription {
            rotation: [0.0, std::f32::consts::FRAC_PI_4, 0.0],
            ..ColliderDescription::new(crate_shape, [-6.0, 0.0, -8.0])
        },
        ColliderDescription::new(ShapeDescription::Ball { radius: 1.0 }, [-3.0, 0.0, 6.0]),
    ];

    let mut colliders = vec![ground, wall];
    colliders.extend(crates);

    SceneDescription {
        name: "main_scene".to_string(),
        colliders,
    }
}
