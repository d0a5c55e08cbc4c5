//! Collision world: broadphase registry and query façade
//!
//! Owns every active collider and answers the queries the rest of the
//! application asks: ray casts, capsule sweeps, static overlaps, and the
//! once-per-tick bookkeeping step. The broadphase is a flat arena with
//! cached conservative AABBs; narrow-phase work only runs on shapes that
//! survive the AABB cull. Candidate handles are snapshotted into a `Vec`
//! before any narrow-phase test, so shapes registered or unregistered
//! from inside a query callback cannot corrupt iteration.

use log::{debug, warn};
use slotmap::new_key_type;

use crate::foundation::collections::HandleMap;
use crate::foundation::math::{Vec3, Transform};
use crate::scene::{EntityId, TransformSource};

use super::collision::contact::{capsule_vs_shape, Contact};
use super::collision::mesh::{MeshData, MeshError, TriangleCache};
use super::collision::primitives::{Aabb, Ray, GEOM_EPSILON};
use super::collision::shape::{ColliderShape, ShapeKind};
use super::collision_layers::CollisionLayers;
use super::events::{CollisionEvents, CollisionPair};

new_key_type! {
    /// Stable handle to a registered collider (index + generation)
    pub struct ShapeHandle;
}

/// Cap on march steps for a capsule sweep
const MAX_SWEEP_STEPS: u32 = 64;

/// Binary refinement rounds after a sweep finds an overlap
const SWEEP_REFINE_ROUNDS: u32 = 8;

/// How trigger volumes participate in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Trigger shapes are excluded from results
    Ignore,
    /// Trigger shapes are tested like any other shape
    Collide,
}

/// Result of a ray intersection test
///
/// Results from [`CollisionWorld::raycast_all`] are unsorted; callers
/// that need the closest hit reduce explicitly.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The shape that was hit
    pub shape: ShapeHandle,
    /// The entity owning the shape
    pub entity: EntityId,
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// The surface normal at the intersection point
    pub normal: Vec3,
}

/// Result of a capsule sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepHit {
    /// The first blocking shape along the sweep
    pub shape: ShapeHandle,
    /// The entity owning the shape
    pub entity: EntityId,
    /// Distance the capsule can travel before contact
    pub distance: f32,
    /// Contact point on the blocking surface
    pub point: Vec3,
    /// Surface normal at the contact, pointing toward the capsule
    pub normal: Vec3,
    /// Whether the sweep already overlapped the shape at its start
    pub start_penetrating: bool,
}

/// Registry record for one collider
struct ColliderData {
    entity: EntityId,
    shape: ColliderShape,
    local_center: Vec3,
    layer: u32,
    pair_mask: u32,
    is_trigger: bool,
    transform: Transform,
    world_aabb: Aabb,
    dirty: bool,
}

impl ColliderData {
    fn recompute_bounds(&mut self) {
        self.world_aabb = self
            .shape
            .world_obb(&self.transform, self.local_center)
            .aabb();
        self.dirty = false;
    }

    fn matches(&self, layer_mask: u32, policy: TriggerPolicy) -> bool {
        if self.layer & layer_mask == 0 {
            return false;
        }
        !(self.is_trigger && policy == TriggerPolicy::Ignore)
    }
}

/// The collision core's single owned mutable structure
///
/// All registry mutation goes through `register_collider`,
/// `unregister_collider`, `mark_dirty`, and the per-tick `step`; queries
/// take `&self` and never suspend.
#[derive(Default)]
pub struct CollisionWorld {
    colliders: HandleMap<ShapeHandle, ColliderData>,
    events: CollisionEvents,
}

impl CollisionWorld {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self {
            colliders: HandleMap::with_key(),
            events: CollisionEvents::new(),
        }
    }

    /// Register a collider for an entity
    ///
    /// Bounds are computed immediately from the supplied transform. Each
    /// call mints a fresh handle; registering the same shape twice is
    /// two distinct colliders by construction.
    pub fn register_collider(
        &mut self,
        entity: EntityId,
        shape: ColliderShape,
        local_center: Vec3,
        layer: u32,
        is_trigger: bool,
        transform: Transform,
    ) -> ShapeHandle {
        let mut data = ColliderData {
            entity,
            shape,
            local_center,
            layer,
            pair_mask: CollisionLayers::ALL,
            is_trigger,
            transform,
            world_aabb: Aabb::new(Vec3::zeros(), Vec3::zeros()),
            dirty: false,
        };
        data.recompute_bounds();
        let handle = self.colliders.insert(data);
        debug!("registered collider {handle:?} for entity {entity:?}");
        handle
    }

    /// Remove a collider
    ///
    /// Idempotent: removing an already-removed handle is a no-op and
    /// returns `false`.
    pub fn unregister_collider(&mut self, handle: ShapeHandle) -> bool {
        let removed = self.colliders.remove(handle).is_some();
        if removed {
            debug!("unregistered collider {handle:?}");
        }
        removed
    }

    /// Flag a collider's bounds for recomputation
    ///
    /// Bounds refresh on the next `step` or `refresh_bounds` call.
    pub fn mark_dirty(&mut self, handle: ShapeHandle) {
        if let Some(data) = self.colliders.get_mut(handle) {
            data.dirty = true;
        }
    }

    /// Push a new world transform for a collider and recompute its bounds
    pub fn update_transform(&mut self, handle: ShapeHandle, transform: Transform) {
        if let Some(data) = self.colliders.get_mut(handle) {
            data.transform = transform;
            data.recompute_bounds();
        }
    }

    /// Restrict which layers a collider pairs with for event detection
    pub fn set_pair_mask(&mut self, handle: ShapeHandle, mask: u32) {
        if let Some(data) = self.colliders.get_mut(handle) {
            data.pair_mask = mask;
        }
    }

    /// Rebuild a mesh collider's triangle cache from fresh submesh data
    ///
    /// The new cache replaces the old one atomically. Calling this on a
    /// non-mesh collider is a logged no-op.
    pub fn refresh_mesh(
        &mut self,
        handle: ShapeHandle,
        submeshes: &[MeshData<'_>],
    ) -> Result<(), MeshError> {
        let Some(data) = self.colliders.get_mut(handle) else {
            return Ok(());
        };
        match &mut data.shape {
            ColliderShape::Mesh(cache) => {
                *cache = TriangleCache::from_submeshes(submeshes)?;
                data.recompute_bounds();
                Ok(())
            }
            _ => {
                warn!("refresh_mesh called on non-mesh collider {handle:?}");
                Ok(())
            }
        }
    }

    /// Number of registered colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Check if a handle still resolves to a live collider
    pub fn has_collider(&self, handle: ShapeHandle) -> bool {
        self.colliders.contains_key(handle)
    }

    /// The entity owning a collider
    pub fn entity_of(&self, handle: ShapeHandle) -> Option<EntityId> {
        self.colliders.get(handle).map(|d| d.entity)
    }

    /// The category of a collider's shape
    pub fn shape_kind(&self, handle: ShapeHandle) -> Option<ShapeKind> {
        self.colliders.get(handle).map(|d| d.shape.kind())
    }

    /// A collider's cached conservative world AABB
    pub fn world_aabb(&self, handle: ShapeHandle) -> Option<Aabb> {
        self.colliders.get(handle).map(|d| d.world_aabb)
    }

    /// Collision/trigger events computed by the most recent `step`
    pub fn events(&self) -> &CollisionEvents {
        &self.events
    }

    /// Advance per-tick bookkeeping
    ///
    /// Pulls every collider's world transform from the scene
    /// collaborator, recomputes cached bounds, and updates the
    /// collision/trigger pair events. Called once per fixed simulation
    /// tick by the owning loop; bounds are guaranteed fresh relative to
    /// this tick's transform state before any query consults them.
    pub fn step(&mut self, _fixed_delta_time: f32, transforms: &dyn TransformSource) {
        for (handle, data) in &mut self.colliders {
            match transforms.world_transform(data.entity) {
                Some(transform) => {
                    data.transform = transform;
                    data.recompute_bounds();
                }
                None => {
                    warn!(
                        "collider {handle:?} has no resolvable transform; keeping last bounds"
                    );
                    if data.dirty {
                        data.recompute_bounds();
                    }
                }
            }
        }
        self.update_pair_events();
    }

    /// Recompute bounds for colliders marked dirty since the last step
    ///
    /// For mid-tick transform mutation: call `mark_dirty` +
    /// `refresh_bounds` before issuing further queries so no query reads
    /// stale bounds.
    pub fn refresh_bounds(&mut self, transforms: &dyn TransformSource) {
        for (_, data) in &mut self.colliders {
            if !data.dirty {
                continue;
            }
            if let Some(transform) = transforms.world_transform(data.entity) {
                data.transform = transform;
            }
            data.recompute_bounds();
        }
    }

    /// Cast a ray against every matching collider
    ///
    /// Returns all hits within `max_distance`, in registry order — not
    /// sorted by distance. Call sites that need the closest hit reduce
    /// explicitly (and typically filter, e.g. skipping their own entity,
    /// before taking the minimum).
    pub fn raycast_all(
        &self,
        ray: &Ray,
        max_distance: f32,
        layer_mask: u32,
        policy: TriggerPolicy,
    ) -> Vec<RaycastHit> {
        let mut hits = Vec::new();
        for (handle, data) in &self.colliders {
            if !data.matches(layer_mask, policy) {
                continue;
            }
            // Broadphase: the cached AABB always contains the true OBB
            match data.world_aabb.intersect_ray(ray.origin, ray.direction) {
                Some(entry) if entry <= max_distance => {}
                _ => continue,
            }
            if let Some((distance, point, normal)) =
                data.shape
                    .raycast(ray, max_distance, &data.transform, data.local_center)
            {
                hits.push(RaycastHit {
                    shape: handle,
                    entity: data.entity,
                    distance,
                    point,
                    normal,
                });
            }
        }
        hits
    }

    /// Sweep a capsule along a direction
    ///
    /// Reports the nearest blocking contact with its surface normal and
    /// travel distance, or `None` if the path is clear within
    /// `distance`. See [`Self::capsule_cast_filtered`] to exclude one
    /// entity's own shapes.
    pub fn capsule_cast(
        &self,
        p1: Vec3,
        p2: Vec3,
        radius: f32,
        direction: Vec3,
        distance: f32,
        layer_mask: u32,
        policy: TriggerPolicy,
    ) -> Option<SweepHit> {
        self.capsule_cast_filtered(p1, p2, radius, direction, distance, layer_mask, policy, None)
    }

    /// Sweep a capsule, skipping shapes owned by `exclude`
    ///
    /// The sweep marches the capsule in conservative half-radius steps,
    /// then pins the first contact with a fixed number of binary
    /// refinement rounds against the static overlap kernel. Step count
    /// is capped; a sweep longer than the cap allows simply marches
    /// coarser and keeps the best contact found.
    pub fn capsule_cast_filtered(
        &self,
        p1: Vec3,
        p2: Vec3,
        radius: f32,
        direction: Vec3,
        distance: f32,
        layer_mask: u32,
        policy: TriggerPolicy,
        exclude: Option<EntityId>,
    ) -> Option<SweepHit> {
        let length = direction.magnitude();
        if length < GEOM_EPSILON || distance <= 0.0 || radius <= 0.0 {
            return None;
        }
        let dir = direction / length;

        let start_bounds = capsule_aabb(p1, p2, radius);
        let end_offset = dir * distance;
        let swept_bounds = start_bounds
            .union(&capsule_aabb(p1 + end_offset, p2 + end_offset, radius))
            .inflated(GEOM_EPSILON);

        // Snapshot candidates before narrow-phase work
        let candidates: Vec<ShapeHandle> = self
            .colliders
            .iter()
            .filter(|(_, data)| {
                data.matches(layer_mask, policy)
                    && exclude.map_or(true, |e| data.entity != e)
                    && data.world_aabb.intersects(&swept_bounds)
            })
            .map(|(handle, _)| handle)
            .collect();

        let step = (radius * 0.5).max(distance / MAX_SWEEP_STEPS as f32);

        let mut best: Option<SweepHit> = None;
        for handle in candidates {
            let Some(data) = self.colliders.get(handle) else {
                continue;
            };
            let overlap_at = |t: f32| -> Option<Contact> {
                let offset = dir * t;
                capsule_vs_shape(
                    p1 + offset,
                    p2 + offset,
                    radius,
                    &data.shape,
                    &data.transform,
                    data.local_center,
                )
            };

            if let Some(contact) = overlap_at(0.0) {
                // Already touching at the start of the sweep
                best = Some(SweepHit {
                    shape: handle,
                    entity: data.entity,
                    distance: 0.0,
                    point: contact.point,
                    normal: contact.normal,
                    start_penetrating: true,
                });
                break;
            }

            let limit = best.map_or(distance, |b| b.distance.min(distance));
            let mut t_free = 0.0f32;
            let mut t = step.min(limit);
            loop {
                if overlap_at(t).is_some() {
                    // Refine the crossing between the last free position
                    // and the first overlapping one
                    let mut lo = t_free;
                    let mut hi = t;
                    for _ in 0..SWEEP_REFINE_ROUNDS {
                        let mid = (lo + hi) * 0.5;
                        if overlap_at(mid).is_some() {
                            hi = mid;
                        } else {
                            lo = mid;
                        }
                    }
                    if let Some(contact) = overlap_at(hi) {
                        if best.map_or(true, |b| lo < b.distance) {
                            best = Some(SweepHit {
                                shape: handle,
                                entity: data.entity,
                                distance: lo,
                                point: contact.point,
                                normal: contact.normal,
                                start_penetrating: false,
                            });
                        }
                    }
                    break;
                }
                t_free = t;
                if t >= limit {
                    break;
                }
                t = (t + step).min(limit);
            }
        }
        best
    }

    /// Find every shape statically overlapping a capsule
    ///
    /// Feeds depenetration: pair each returned handle with
    /// [`Self::capsule_contact`] for the push-out vector.
    pub fn overlap_capsule(
        &self,
        p1: Vec3,
        p2: Vec3,
        radius: f32,
        layer_mask: u32,
        policy: TriggerPolicy,
    ) -> Vec<ShapeHandle> {
        let bounds = capsule_aabb(p1, p2, radius);
        let candidates: Vec<ShapeHandle> = self
            .colliders
            .iter()
            .filter(|(_, data)| {
                data.matches(layer_mask, policy) && data.world_aabb.intersects(&bounds)
            })
            .map(|(handle, _)| handle)
            .collect();

        candidates
            .into_iter()
            .filter(|&handle| {
                self.colliders.get(handle).is_some_and(|data| {
                    capsule_vs_shape(
                        p1,
                        p2,
                        radius,
                        &data.shape,
                        &data.transform,
                        data.local_center,
                    )
                    .is_some()
                })
            })
            .collect()
    }

    /// Exact contact between a capsule and one registered shape
    pub fn capsule_contact(
        &self,
        handle: ShapeHandle,
        p1: Vec3,
        p2: Vec3,
        radius: f32,
    ) -> Option<Contact> {
        let data = self.colliders.get(handle)?;
        capsule_vs_shape(p1, p2, radius, &data.shape, &data.transform, data.local_center)
    }

    /// Remove every collider and forget all event state
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.events.clear();
    }

    /// Detect overlapping pairs and roll them into the event tracker
    fn update_pair_events(&mut self) {
        let handles: Vec<ShapeHandle> = self.colliders.keys().collect();
        let mut pairs = Vec::new();

        for (i, &a) in handles.iter().enumerate() {
            for &b in &handles[i + 1..] {
                let (Some(da), Some(db)) = (self.colliders.get(a), self.colliders.get(b)) else {
                    continue;
                };
                if !CollisionLayers::should_collide(da.layer, da.pair_mask, db.layer, db.pair_mask)
                {
                    continue;
                }
                if !da.world_aabb.intersects(&db.world_aabb) {
                    continue;
                }
                let obb_a = da.shape.world_obb(&da.transform, da.local_center);
                let obb_b = db.shape.world_obb(&db.transform, db.local_center);
                if obb_a.overlaps(&obb_b) {
                    pairs.push(CollisionPair::new(a, b, da.is_trigger || db.is_trigger));
                }
            }
        }

        self.events.update(pairs);
    }
}

/// Conservative AABB of a capsule
fn capsule_aabb(p1: Vec3, p2: Vec3, radius: f32) -> Aabb {
    Aabb::new(p1.inf(&p2), p1.sup(&p2)).inflated(radius)
}
