//! Character movement resolution
//!
//! A per-agent resolver built entirely on top of the collision world's
//! query façade: ground detection, slope and step handling, sliding
//! collision response, depenetration, and jump/gravity integration. The
//! resolver owns no geometry code of its own.

use log::warn;

use crate::foundation::math::{UnitQuaternion, Vec3, Transform};
use crate::physics::collision::primitives::Ray;
use crate::physics::collision::shape::ShapeKind;
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::collision_world::{CollisionWorld, TriggerPolicy};
use crate::scene::EntityId;

use super::config::CharacterConfig;

/// Iteration cap on the capsule-sweep slide loop
const MAX_SLIDE_ITERATIONS: u32 = 4;

/// Ticks the ground snap stays suppressed after a jump impulse
const SNAP_SUPPRESSION_TICKS: u32 = 3;

/// Cap on simultaneous depenetration corrections per tick
const MAX_DEPENETRATION_CORRECTIONS: u32 = 2;

/// Hits with a smaller normal up-component never count as ground
const GROUND_NORMAL_MIN_Y: f32 = 0.1;

/// Contact normals below this up-component are treated as wall-like
const WALL_NORMAL_MAX_Y: f32 = 0.5;

/// Nudge applied to escape a degenerate touching contact on a curved shape
const TOUCH_NUDGE: f32 = 0.01;

/// Vertical speeds below this allow post-move ground adjustment
const SETTLED_VERTICAL_VELOCITY: f32 = 0.1;

/// Motion magnitudes below this end the slide loop
const MOTION_EPSILON: f32 = 1e-4;

/// A ground detection result near the agent's feet
#[derive(Debug, Clone, Copy)]
struct GroundSample {
    height: f32,
    normal: Vec3,
}

/// Per-agent character movement resolver
///
/// State machine with two states: grounded and airborne. Jumping is not
/// a state — it is an instantaneous vertical impulse into airborne, with
/// the snap suppression counter blocking same-tick re-snapping.
pub struct CharacterController {
    entity: EntityId,
    config: CharacterConfig,
    collision_mask: u32,
    vertical_velocity: f32,
    grounded: bool,
    snap_suppression_frames: u32,
}

impl CharacterController {
    /// Create a resolver for an agent entity
    pub fn new(entity: EntityId, config: CharacterConfig) -> Self {
        Self {
            entity,
            config,
            collision_mask: CollisionLayers::ALL,
            vertical_velocity: 0.0,
            grounded: false,
            snap_suppression_frames: 0,
        }
    }

    /// Restrict which layers the agent collides with
    pub fn with_collision_mask(mut self, mask: u32) -> Self {
        self.collision_mask = mask;
        self
    }

    /// The agent's movement configuration
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    /// Mutable access for runtime tuning
    pub fn config_mut(&mut self) -> &mut CharacterConfig {
        &mut self.config
    }

    /// Whether the agent currently rests on walkable ground
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Current vertical velocity (positive is up)
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Apply an instantaneous vertical velocity change
    ///
    /// A positive impulse leaves the grounded state immediately and
    /// suppresses ground snapping for a few ticks so the snap step
    /// cannot cancel the jump in the same tick.
    pub fn add_vertical_impulse(&mut self, impulse: f32) {
        self.vertical_velocity += impulse;
        if impulse > 0.0 {
            self.grounded = false;
            self.snap_suppression_frames = SNAP_SUPPRESSION_TICKS;
        }
    }

    /// Resolve one tick of movement
    ///
    /// `motion` is the desired velocity (units/second); the vertical
    /// component is owned by the resolver and ignored on input. The
    /// agent's transform is adjusted in place.
    pub fn movement(
        &mut self,
        world: &CollisionWorld,
        transform: &mut Transform,
        motion: Vec3,
        delta_time: f32,
    ) {
        if delta_time <= 0.0 {
            return;
        }

        self.vertical_velocity -= self.config.gravity * delta_time;

        let ground = self.sample_ground(world, transform.position);
        self.resolve_vertical(transform, ground, delta_time);

        let horizontal = Vec3::new(motion.x, 0.0, motion.z);
        self.resolve_horizontal(world, transform, horizontal, delta_time);

        let ground = self.sample_ground(world, transform.position);
        self.post_move_adjust(transform, ground, horizontal, delta_time);

        // While grounded the snap step owns vertical correction
        if !self.grounded {
            self.depenetrate(world, transform);
        }

        self.snap_suppression_frames = self.snap_suppression_frames.saturating_sub(1);
    }

    /// Probe for walkable ground under the agent
    ///
    /// Averages one or more downward point-samples near the feet; a
    /// single center probe is used. Hits on the agent's own shapes are
    /// skipped before reducing to the closest, and hits whose normal
    /// points sideways or down never count as ground.
    fn sample_ground(&self, world: &CollisionWorld, position: Vec3) -> Option<GroundSample> {
        let offsets = [Vec3::zeros()];
        let max_distance = self.config.half_height() + self.config.ground_check_distance;
        let walkable = self.config.walkable_normal_y();

        let mut height_sum = 0.0;
        let mut normal_sum = Vec3::zeros();
        let mut count = 0u32;

        for offset in offsets {
            let Some(ray) = Ray::new(position + offset, Vec3::new(0.0, -1.0, 0.0)) else {
                continue;
            };
            let hits = world.raycast_all(
                &ray,
                max_distance,
                self.collision_mask,
                TriggerPolicy::Ignore,
            );
            let best = hits
                .iter()
                .filter(|hit| hit.entity != self.entity)
                .filter(|hit| hit.normal.y > GROUND_NORMAL_MIN_Y)
                .filter(|hit| hit.normal.y >= walkable)
                .min_by(|a, b| a.distance.total_cmp(&b.distance));
            if let Some(hit) = best {
                height_sum += hit.point.y;
                normal_sum += hit.normal;
                count += 1;
            }
        }

        if count == 0 {
            return None;
        }
        let normal = normal_sum / count as f32;
        if normal.magnitude_squared() < f32::EPSILON {
            return None;
        }
        Some(GroundSample {
            height: height_sum / count as f32,
            normal: normal.normalize(),
        })
    }

    /// Gravity integration, ground snapping, and landing
    fn resolve_vertical(
        &mut self,
        transform: &mut Transform,
        ground: Option<GroundSample>,
        delta_time: f32,
    ) {
        let Some(ground) = ground else {
            transform.position.y += self.vertical_velocity * delta_time;
            self.grounded = false;
            return;
        };

        let target = ground.height + self.config.rest_height();
        let snap_allowed = self.snap_suppression_frames == 0 && self.vertical_velocity <= 0.0;

        if snap_allowed && transform.position.y - target <= self.config.snap_epsilon {
            // Smooth toward the rest height instead of teleporting; the
            // asymmetric speed caps are what keep sloped ground from
            // reading as a staircase
            self.grounded = true;
            let delta = target - transform.position.y;
            let step = delta.clamp(
                -self.config.descend_smooth_speed * delta_time,
                self.config.climb_smooth_speed * delta_time,
            );
            transform.position.y += step;
            self.vertical_velocity = 0.0;
            return;
        }

        let new_y = transform.position.y + self.vertical_velocity * delta_time;
        if self.snap_suppression_frames == 0 && self.vertical_velocity < 0.0 && new_y < target {
            // Landing this tick: snap exactly to the ground height
            transform.position.y = target;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        } else {
            transform.position.y = new_y;
            self.grounded = false;
        }
    }

    /// Iterative capsule-sweep slide loop for horizontal motion
    fn resolve_horizontal(
        &mut self,
        world: &CollisionWorld,
        transform: &mut Transform,
        horizontal_motion: Vec3,
        delta_time: f32,
    ) {
        let mut remaining = horizontal_motion * delta_time;
        let skin = self.config.skin_width;
        let radius = self.config.radius;

        for _ in 0..MAX_SLIDE_ITERATIONS {
            let distance = remaining.magnitude();
            if distance < MOTION_EPSILON {
                break;
            }
            let direction = remaining / distance;

            // Sweep lifted by the skin; a flush floor contact is not an
            // obstacle to horizontal motion
            let (p1, p2) = self.capsule_segment(transform.position);
            let lift = Vec3::new(0.0, skin, 0.0);
            let (p1, p2) = (p1 + lift, p2 + lift);
            let Some(hit) = world.capsule_cast_filtered(
                p1,
                p2,
                radius,
                direction,
                distance + skin,
                self.collision_mask,
                TriggerPolicy::Ignore,
                Some(self.entity),
            ) else {
                transform.position += remaining;
                break;
            };

            // Low obstacle: retry the sweep from a raised position, and
            // commit the step offset if that path is clear
            let foot_y = transform.position.y - self.config.half_height();
            let obstacle_height = hit.point.y - foot_y;
            if obstacle_height > 0.0
                && obstacle_height <= self.config.step_offset
                && hit.normal.y > -GROUND_NORMAL_MIN_Y
            {
                let raise = Vec3::new(0.0, self.config.step_offset, 0.0);
                let raised_clear = world
                    .capsule_cast_filtered(
                        p1 + raise,
                        p2 + raise,
                        radius,
                        direction,
                        distance + skin,
                        self.collision_mask,
                        TriggerPolicy::Ignore,
                        Some(self.entity),
                    )
                    .is_none();
                if raised_clear {
                    transform.position.y += self.config.step_offset;
                    continue;
                }
            }

            // Advance to contact minus the skin, then slide the rest
            // along the contact plane
            let advance = (hit.distance - skin).max(0.0).min(distance);
            transform.position += direction * advance;

            let mut residual = remaining - direction * advance;
            residual -= hit.normal * residual.dot(&hit.normal);
            residual.y = residual
                .y
                .clamp(-self.config.max_climb_per_frame, self.config.max_climb_per_frame);

            if residual.magnitude() < MOTION_EPSILON {
                // A degenerate already-touching contact on a curved
                // shape gets a fixed nudge along the original direction
                // instead of the slide; otherwise the agent is blocked
                let curved = world
                    .shape_kind(hit.shape)
                    .is_some_and(ShapeKind::is_curved);
                if curved && hit.distance <= skin {
                    transform.position += direction * TOUCH_NUDGE;
                    continue;
                }
                break;
            }
            remaining = residual;
        }
    }

    /// Post-move ground re-adjustment and up-axis alignment
    ///
    /// Yaw is derived from the intended motion direction, not the
    /// post-slide facing, so the agent does not visibly steer while
    /// climbing a curved surface.
    fn post_move_adjust(
        &mut self,
        transform: &mut Transform,
        ground: Option<GroundSample>,
        intended_motion: Vec3,
        delta_time: f32,
    ) {
        let Some(ground) = ground else {
            return;
        };
        if self.snap_suppression_frames > 0
            || self.vertical_velocity.abs() > SETTLED_VERTICAL_VELOCITY
        {
            return;
        }

        let target = ground.height + self.config.rest_height();
        let delta = target - transform.position.y;
        if delta.abs() <= self.config.snap_epsilon.max(self.config.step_offset) {
            let step = delta.clamp(
                -self.config.descend_smooth_speed * delta_time,
                self.config.climb_smooth_speed * delta_time,
            );
            transform.position.y += step;
            self.grounded = true;
        }

        let yaw = if intended_motion.magnitude_squared() > MOTION_EPSILON * MOTION_EPSILON {
            intended_motion.x.atan2(intended_motion.z)
        } else {
            let forward = transform.rotation * Vec3::new(0.0, 0.0, 1.0);
            forward.x.atan2(forward.z)
        };
        let yaw_rotation = UnitQuaternion::from_axis_angle(&Vec3::y_axis(), yaw);
        let tilt = UnitQuaternion::rotation_between(&Vec3::new(0.0, 1.0, 0.0), &ground.normal)
            .unwrap_or_else(UnitQuaternion::identity);
        let target_rotation = tilt * yaw_rotation;
        let blend = (self.config.ground_align_speed * delta_time).min(1.0);
        transform.rotation = transform
            .rotation
            .try_slerp(&target_rotation, blend, 1.0e-6)
            .unwrap_or(target_rotation);
    }

    /// Push the capsule out of static overlaps while airborne
    ///
    /// Wall-like contacts push horizontally; ground-like contacts push
    /// vertically with a small cap. At most two corrections apply per
    /// tick to avoid oscillation between opposing contacts.
    fn depenetrate(&self, world: &CollisionWorld, transform: &mut Transform) {
        let (p1, p2) = self.capsule_segment(transform.position);
        let overlaps = world.overlap_capsule(
            p1,
            p2,
            self.config.radius,
            self.collision_mask,
            TriggerPolicy::Ignore,
        );

        let mut applied = 0u32;
        for handle in overlaps {
            if applied == MAX_DEPENETRATION_CORRECTIONS {
                break;
            }
            if world.entity_of(handle) == Some(self.entity) {
                continue;
            }
            let (p1, p2) = self.capsule_segment(transform.position);
            let Some(contact) = world.capsule_contact(handle, p1, p2, self.config.radius) else {
                continue;
            };

            let normal = contact.normal;
            if normal.y.abs() < WALL_NORMAL_MAX_Y {
                let lateral = Vec3::new(normal.x, 0.0, normal.z);
                let magnitude = lateral.magnitude();
                if magnitude > f32::EPSILON {
                    transform.position += (lateral / magnitude) * contact.penetration;
                    applied += 1;
                }
            } else {
                let push = contact.penetration.min(self.config.max_climb_per_frame);
                transform.position.y += push * normal.y.signum();
                applied += 1;
            }
        }
    }

    /// World-space capsule segment endpoints at a given center position
    fn capsule_segment(&self, center: Vec3) -> (Vec3, Vec3) {
        let half_segment = (self.config.half_height() - self.config.radius).max(0.0);
        if half_segment == 0.0 {
            warn!("character capsule height does not exceed twice its radius");
        }
        (
            center - Vec3::new(0.0, half_segment, 0.0),
            center + Vec3::new(0.0, half_segment, 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::physics::collision::shape::{CapsuleAxis, ColliderShape};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn entity(n: u32) -> EntityId {
        EntityId::new(n, 0)
    }

    fn agent() -> CharacterController {
        CharacterController::new(entity(100), CharacterConfig::default())
    }

    fn ground_plane(world: &mut CollisionWorld) {
        // Box whose top face sits at y = 0
        world.register_collider(
            entity(1),
            ColliderShape::Box { half_extents: Vec3::new(50.0, 0.5, 50.0) },
            Vec3::zeros(),
            CollisionLayers::ENVIRONMENT,
            false,
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
        );
    }

    #[test]
    fn test_steady_state_is_idempotent() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));

        controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        assert!(controller.is_grounded());
        assert_relative_eq!(transform.position, Vec3::new(0.0, 0.9, 0.0), epsilon = 1e-5);
        assert_relative_eq!(controller.vertical_velocity(), 0.0);

        // And it stays put over further ticks
        for _ in 0..30 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        }
        assert_relative_eq!(transform.position, Vec3::new(0.0, 0.9, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_drop_settles_at_half_height() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 10.0, 0.0));

        let mut grounded_tick = None;
        for tick in 0..300 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
            if controller.is_grounded() {
                grounded_tick = Some(tick);
                break;
            }
        }
        assert!(grounded_tick.is_some(), "agent never landed");
        assert_relative_eq!(controller.vertical_velocity(), 0.0);

        // The snap smoothing settles the remaining fraction
        for _ in 0..60 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        }
        assert!(controller.is_grounded());
        assert_relative_eq!(transform.position.y, 0.9, epsilon = 1e-3);
        assert_relative_eq!(controller.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_jump_impulse_suppresses_resnap() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));
        controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        assert!(controller.is_grounded());

        // A tiny impulse would be cancelled by the very next ground
        // sample if snapping were not suppressed
        controller.add_vertical_impulse(0.01);
        assert!(!controller.is_grounded());

        for _ in 0..SNAP_SUPPRESSION_TICKS {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
            assert!(!controller.is_grounded());
        }

        // Once the suppression window closes the agent settles again
        for _ in 0..30 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        }
        assert!(controller.is_grounded());
    }

    #[test]
    fn test_full_jump_arc_leaves_and_regains_ground() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));
        controller.movement(&world, &mut transform, Vec3::zeros(), DT);

        controller.add_vertical_impulse(4.0);
        let mut peak = transform.position.y;
        for _ in 0..240 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
            peak = peak.max(transform.position.y);
            if controller.is_grounded() {
                break;
            }
        }
        assert!(peak > 1.4, "jump peaked too low at {peak}");
        assert!(controller.is_grounded());

        // Smoothing settles the last fraction over the following ticks
        for _ in 0..30 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        }
        assert_relative_eq!(transform.position.y, 0.9, epsilon = 1e-2);
    }

    #[test]
    fn test_oblique_wall_slide_continues_tangentially() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);
        // Wall face at x = 2
        world.register_collider(
            entity(2),
            ColliderShape::Box { half_extents: Vec3::new(0.5, 5.0, 50.0) },
            Vec3::zeros(),
            CollisionLayers::ENVIRONMENT,
            false,
            Transform::from_position(Vec3::new(2.5, 0.0, 0.0)),
        );

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));
        let motion = Vec3::new(2.0, 0.0, 1.0); // Oblique into the wall

        for _ in 0..120 {
            controller.movement(&world, &mut transform, motion, DT);
        }

        // The capsule surface never crosses the wall face
        assert!(transform.position.x <= 2.0 - controller.config().radius + 1e-3);
        // But tangential motion carried on
        assert!(transform.position.z > 1.5, "slide stalled at z = {}", transform.position.z);
    }

    #[test]
    fn test_step_up_onto_low_platform() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);
        // Platform top at y = 0.3, front face at x = 1
        world.register_collider(
            entity(2),
            ColliderShape::Box { half_extents: Vec3::new(5.0, 0.15, 5.0) },
            Vec3::zeros(),
            CollisionLayers::ENVIRONMENT,
            false,
            Transform::from_position(Vec3::new(6.0, 0.15, 0.0)),
        );

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));

        for _ in 0..150 {
            controller.movement(&world, &mut transform, Vec3::new(1.5, 0.0, 0.0), DT);
        }
        assert!(transform.position.x > 1.5, "agent never climbed the step");

        // Let the vertical smoothing settle on the platform top
        for _ in 0..30 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
        }
        assert!(controller.is_grounded());
        assert_relative_eq!(transform.position.y, 1.2, epsilon = 0.05);
    }

    #[test]
    fn test_tall_wall_blocks_forward_motion() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);
        world.register_collider(
            entity(2),
            ColliderShape::Box { half_extents: Vec3::new(0.5, 5.0, 50.0) },
            Vec3::zeros(),
            CollisionLayers::ENVIRONMENT,
            false,
            Transform::from_position(Vec3::new(2.5, 0.0, 0.0)),
        );

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));
        for _ in 0..120 {
            controller.movement(&world, &mut transform, Vec3::new(2.0, 0.0, 0.0), DT);
        }
        // Head-on approach stops at the wall instead of climbing it
        assert!(transform.position.x <= 2.0 - controller.config().radius + 1e-3);
        assert!(transform.position.y < 1.0);
    }

    #[test]
    fn test_steep_surface_never_counts_as_ground() {
        let mut world = CollisionWorld::new();
        // A 60-degree slope, steeper than the default walkable limit
        let rotation = UnitQuaternion::from_axis_angle(
            &Vec3::z_axis(),
            60.0f32.to_radians(),
        );
        world.register_collider(
            entity(1),
            ColliderShape::Box { half_extents: Vec3::new(10.0, 0.5, 10.0) },
            Vec3::zeros(),
            CollisionLayers::ENVIRONMENT,
            false,
            Transform {
                position: Vec3::new(0.0, 0.0, 0.0),
                rotation,
                scale: Vec3::new(1.0, 1.0, 1.0),
            },
        );

        // Surface under the agent sits at y = 1.0; start clear above it
        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 2.5, 0.0));
        for _ in 0..5 {
            controller.movement(&world, &mut transform, Vec3::zeros(), DT);
            assert!(!controller.is_grounded());
        }
    }

    #[test]
    fn test_airborne_depenetration_pushes_out_of_sphere() {
        let mut world = CollisionWorld::new();
        // No ground anywhere; a sphere overlaps the falling agent
        world.register_collider(
            entity(2),
            ColliderShape::Sphere { radius: 0.5 },
            Vec3::zeros(),
            CollisionLayers::DEBRIS,
            false,
            Transform::from_position(Vec3::new(0.5, 5.0, 0.0)),
        );

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 5.0, 0.0));
        controller.movement(&world, &mut transform, Vec3::zeros(), DT);

        assert!(!controller.is_grounded());
        // Pushed out along the horizontal contact normal
        assert!(transform.position.x < -0.3, "x = {}", transform.position.x);
    }

    #[test]
    fn test_capsule_obstacle_touch_nudge_escapes() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);
        // Upright capsule obstacle directly ahead
        world.register_collider(
            entity(2),
            ColliderShape::Capsule { height: 2.0, radius: 0.35, axis: CapsuleAxis::Y },
            Vec3::zeros(),
            CollisionLayers::ENVIRONMENT,
            false,
            Transform::from_position(Vec3::new(1.0, 1.0, 0.0)),
        );

        let mut controller = agent();
        let mut transform = Transform::from_position(Vec3::new(0.0, 0.9, 0.0));
        // Slightly off-axis approach; the agent should end up past the
        // obstacle's flank rather than frozen against it
        for _ in 0..240 {
            controller.movement(&world, &mut transform, Vec3::new(1.5, 0.0, 0.05), DT);
        }
        assert!(
            transform.position.z.abs() > 0.2 || transform.position.x > 1.0,
            "agent stuck at {:?}",
            transform.position
        );
    }

    #[test]
    fn test_yaw_follows_intended_motion_direction() {
        let mut world = CollisionWorld::new();
        ground_plane(&mut world);

        let mut controller = agent();
        let mut transform = Transform {
            position: Vec3::new(0.0, 0.9, 0.0),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };
        // Move along +X for a while; facing should converge to +X
        for _ in 0..120 {
            controller.movement(&world, &mut transform, Vec3::new(1.0, 0.0, 0.0), DT);
        }
        let forward = transform.rotation * Vec3::new(0.0, 0.0, 1.0);
        assert!(forward.x > 0.95, "forward = {forward:?}");
    }
}
