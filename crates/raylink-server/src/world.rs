use crate::service::{BackendError, RaycastService};
use rapier::prelude::*;
use raylink_api_types::RaycastQuery;
use std::sync::{Arc, RwLock};

pub struct SceneState {
    pub query_pipeline: QueryPipeline,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub loaded: bool,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            query_pipeline: QueryPipeline::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            loaded: false,
        }
    }
}

impl SceneState {
    pub fn new(bodies: RigidBodySet, colliders: ColliderSet) -> Self {
        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&bodies, &colliders);

        Self {
            query_pipeline,
            bodies,
            colliders,
            loaded: true,
        }
    }

    /// First collider crossed by the segment, with the time of impact along it.
    pub fn cast_segment(&self, query: &RaycastQuery) -> Option<(ColliderHandle, Real)> {
        if query.is_degenerate() {
            return None;
        }

        self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &query.ray(),
            1.0,
            true,
            QueryFilter::default(),
        )
    }
}

#[derive(Clone, Default)]
pub struct SharedScene(pub Arc<RwLock<SceneState>>);

impl SharedScene {
    pub fn new(state: SceneState) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    pub fn install(&self, state: SceneState) -> Result<(), BackendError> {
        let mut scene = self.0.write().map_err(|_| BackendError::Poisoned)?;
        *scene = state;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.0.read().map(|scene| scene.loaded).unwrap_or(false)
    }
}

impl RaycastService for SharedScene {
    fn raycast(&self, query: &RaycastQuery) -> Result<bool, BackendError> {
        let scene = self.0.read().map_err(|_| BackendError::Poisoned)?;
        if !scene.loaded {
            return Err(BackendError::SceneNotLoaded);
        }

        Ok(scene.cast_segment(query).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_scene() -> SharedScene {
        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        colliders
            .insert(ColliderBuilder::cuboid(10.0, 10.0, 1.0).translation(vector![0.0, 0.0, -20.0]));
        SharedScene::new(SceneState::new(bodies, colliders))
    }

    #[test]
    fn segment_through_the_wall_hits() {
        let query = RaycastQuery::new(point![0.0, 0.0, 0.0], point![0.0, 0.0, -1000.0]);
        assert!(wall_scene().raycast(&query).unwrap());
    }

    #[test]
    fn segment_stopping_short_of_the_wall_misses() {
        let query = RaycastQuery::new(point![0.0, 0.0, 0.0], point![0.0, 0.0, -5.0]);
        assert!(!wall_scene().raycast(&query).unwrap());
    }

    #[test]
    fn segment_pointing_away_misses() {
        let query = RaycastQuery::new(point![0.0, 0.0, 0.0], point![1000.0, 1000.0, 1000.0]);
        assert!(!wall_scene().raycast(&query).unwrap());
    }

    #[test]
    fn degenerate_segment_misses() {
        let p = point![0.0, 0.0, -20.0];
        assert!(!wall_scene().raycast(&RaycastQuery::new(p, p)).unwrap());
    }

    #[test]
    fn unloaded_scene_is_a_backend_failure() {
        let scene = SharedScene::default();
        let query = RaycastQuery::new(point![0.0, 0.0, 0.0], point![0.0, 0.0, -1000.0]);

        assert!(!scene.is_loaded());
        assert!(matches!(
            scene.raycast(&query),
            Err(BackendError::SceneNotLoaded)
        ));
    }

    #[test]
    fn installing_a_scene_makes_it_queryable() {
        let scene = SharedScene::default();
        let loaded = wall_scene();
        let state = std::mem::take(&mut *loaded.0.write().unwrap());
        scene.install(state).unwrap();

        let query = RaycastQuery::new(point![0.0, 0.0, 0.0], point![0.0, 0.0, -1000.0]);
        assert!(scene.is_loaded());
        assert!(scene.raycast(&query).unwrap());
    }
}
