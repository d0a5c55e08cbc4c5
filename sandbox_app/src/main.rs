//! Character movement sandbox
//!
//! Drops a capsule agent onto a floor, walks it into a wall at an
//! oblique angle, and jumps it over a low step, logging the resolved
//! positions along the way.

use log::info;
use stride_physics::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let mut world = CollisionWorld::new();

    // Floor with its top face at y = 0
    world.register_collider(
        EntityId::new(0, 0),
        ColliderShape::Box { half_extents: Vec3::new(50.0, 0.5, 50.0) },
        Vec3::zeros(),
        CollisionLayers::ENVIRONMENT,
        false,
        Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
    );

    // A wall ahead and a low step to the side
    world.register_collider(
        EntityId::new(1, 0),
        ColliderShape::Box { half_extents: Vec3::new(0.5, 3.0, 20.0) },
        Vec3::zeros(),
        CollisionLayers::ENVIRONMENT,
        false,
        Transform::from_position(Vec3::new(6.5, 0.0, 0.0)),
    );
    world.register_collider(
        EntityId::new(2, 0),
        ColliderShape::Box { half_extents: Vec3::new(2.0, 0.15, 2.0) },
        Vec3::zeros(),
        CollisionLayers::ENVIRONMENT,
        false,
        Transform::from_position(Vec3::new(0.0, 0.15, 6.0)),
    );

    let mut agent = CharacterController::new(EntityId::new(10, 0), CharacterConfig::default());
    let mut transform = Transform::from_position(Vec3::new(0.0, 8.0, 0.0));

    // Phase 1: free fall until grounded
    let mut ticks = 0;
    while !agent.is_grounded() && ticks < 600 {
        agent.movement(&world, &mut transform, Vec3::zeros(), DT);
        ticks += 1;
    }
    info!(
        "landed after {ticks} ticks at y = {:.3} (grounded: {})",
        transform.position.y,
        agent.is_grounded()
    );

    // Phase 2: walk obliquely into the wall and slide along it
    for _ in 0..240 {
        agent.movement(&world, &mut transform, Vec3::new(3.0, 0.0, 1.0), DT);
    }
    info!(
        "after wall slide: x = {:.3}, z = {:.3}",
        transform.position.x, transform.position.z
    );

    // Phase 3: jump while steering toward the step
    agent.add_vertical_impulse(4.5);
    for _ in 0..240 {
        agent.movement(&world, &mut transform, Vec3::new(-1.5, 0.0, 1.5), DT);
    }
    info!(
        "final position: ({:.3}, {:.3}, {:.3}), grounded: {}",
        transform.position.x,
        transform.position.y,
        transform.position.z,
        agent.is_grounded()
    );

    // Closest-hit reduction over the unsorted raycast results
    if let Some(ray) = Ray::new(transform.position, Vec3::new(0.0, -1.0, 0.0)) {
        let hits = world.raycast_all(&ray, 10.0, CollisionLayers::ALL, TriggerPolicy::Ignore);
        if let Some(closest) = hits.iter().min_by(|a, b| a.distance.total_cmp(&b.distance)) {
            info!(
                "standing {:.3} above entity {:?}",
                closest.distance,
                closest.entity
            );
        }
    }
}
