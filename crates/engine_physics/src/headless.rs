//! Headless physics backend.
//!
//! A small, deterministic [`PhysicsWorld`] for running the engine without a
//! native physics library: the demo binary and integration tests use it.
//!
//! Geometry is deliberately simple:
//!
//! - Bodies are axis-aligned boxes. Rotation is tracked and reported but not
//!   used for collision.
//! - Characters sweep as an upright capsule along world Y. Box tops are the
//!   only supporting surfaces, so the ground normal is always +Y. A box
//!   wholly above the head caps a jump rather than acting as a wall.
//! - Dynamic bodies fall under gravity and are pushed out of other boxes along
//!   the axis of least penetration.

use std::collections::BTreeMap;

use glam::{Quat, Vec2, Vec3};
use tracing::debug;

use crate::error::PhysicsError;
use crate::settings::{CharacterFilters, CharacterSettings, ExtendedUpdateSettings};
use crate::types::{Activation, BodyId, BodySettings, CharacterId, GroundState, MotionType, ObjectLayer, RayHit};
use crate::world::{CharacterVirtual, PhysicsWorld};

#[derive(Debug, Clone)]
struct Body {
    settings: BodySettings,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    in_world: bool,
    active: bool,
}

impl Body {
    fn min(&self) -> Vec3 {
        self.position - self.settings.shape.half_extent
    }

    fn max(&self) -> Vec3 {
        self.position + self.settings.shape.half_extent
    }
}

/// A character simulated by [`HeadlessPhysics`].
#[derive(Debug, Clone)]
pub struct HeadlessCharacter {
    settings: CharacterSettings,
    cos_max_slope_angle: f32,
    position: Vec3,
    rotation: Quat,
    up: Vec3,
    velocity: Vec3,
    ground_state: GroundState,
    ground_normal: Vec3,
    ground_velocity: Vec3,
    ground_body: Option<BodyId>,
}

impl HeadlessCharacter {
    /// The body the character stood on after its last sweep.
    #[must_use]
    pub fn ground_body(&self) -> Option<BodyId> {
        self.ground_body
    }
}

impl CharacterVirtual for HeadlessCharacter {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn up(&self) -> Vec3 {
        self.up
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn ground_velocity(&self) -> Vec3 {
        self.ground_velocity
    }

    fn ground_state(&self) -> GroundState {
        self.ground_state
    }

    fn ground_normal(&self) -> Vec3 {
        self.ground_normal
    }

    fn is_slope_too_steep(&self, normal: Vec3) -> bool {
        self.cos_max_slope_angle > 0.0 && normal.dot(self.up) < self.cos_max_slope_angle
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn set_up(&mut self, up: Vec3) {
        self.up = up.try_normalize().unwrap_or(Vec3::Y);
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }
}

/// Deterministic box-world physics.
#[derive(Debug, Clone)]
pub struct HeadlessPhysics {
    gravity: Vec3,
    next_id: u32,
    bodies: BTreeMap<BodyId, Body>,
    characters: BTreeMap<CharacterId, HeadlessCharacter>,
}

impl HeadlessPhysics {
    /// An empty world with the given gravity.
    #[must_use]
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            next_id: 1,
            bodies: BTreeMap::new(),
            characters: BTreeMap::new(),
        }
    }

    /// Number of live characters.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Number of live bodies, added or not.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the body is currently part of the simulation.
    #[must_use]
    pub fn is_body_added(&self, id: BodyId) -> bool {
        self.bodies.get(&id).is_some_and(|body| body.in_world)
    }

    /// Concrete access to a character, for inspection in tests and tools.
    #[must_use]
    pub fn headless_character(&self, id: CharacterId) -> Option<&HeadlessCharacter> {
        self.characters.get(&id)
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn body(&self, id: BodyId) -> Result<&Body, PhysicsError> {
        self.bodies.get(&id).ok_or(PhysicsError::UnknownBody(id))
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, PhysicsError> {
        self.bodies.get_mut(&id).ok_or(PhysicsError::UnknownBody(id))
    }

    /// Advance every awake, non-static body by one sub-step.
    fn integrate(&mut self, dt: f32) {
        let obstacles: Vec<(BodyId, Vec3, Vec3, ObjectLayer)> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.in_world)
            .map(|(&id, body)| (id, body.min(), body.max(), body.settings.layer))
            .collect();
        let gravity = self.gravity;

        for (&id, body) in self.bodies.iter_mut() {
            if !body.in_world || !body.active || body.settings.motion_type == MotionType::Static {
                continue;
            }
            if body.settings.motion_type == MotionType::Dynamic {
                body.velocity += gravity * dt;
            }
            body.position += body.velocity * dt;
            if body.settings.motion_type != MotionType::Dynamic {
                continue;
            }

            for &(other, min, max, layer) in &obstacles {
                if other == id || !body.settings.layer.collides_with(layer) {
                    continue;
                }
                let (own_min, own_max) = (body.min(), body.max());
                let overlap = own_max.min(max) - own_min.max(min);
                if overlap.min_element() <= 0.0 {
                    continue;
                }

                // Push out along the axis of least penetration.
                let centre = 0.5 * (min + max);
                let axis = if overlap.x <= overlap.y && overlap.x <= overlap.z {
                    Vec3::X
                } else if overlap.y <= overlap.z {
                    Vec3::Y
                } else {
                    Vec3::Z
                };
                let depth = overlap.dot(axis);
                let sign = if (body.position - centre).dot(axis) >= 0.0 { 1.0 } else { -1.0 };
                let normal = axis * sign;
                body.position += normal * depth;

                let into = body.velocity.dot(normal);
                if into < 0.0 {
                    body.velocity -= normal * into;
                }

                // Resting contact: Coulomb friction on the tangential motion.
                if normal == Vec3::Y {
                    let tangential = Vec2::new(body.velocity.x, body.velocity.z);
                    let speed = tangential.length();
                    if speed > 0.0 {
                        let slowed = (speed - body.settings.friction * gravity.length() * dt).max(0.0);
                        let scaled = tangential * (slowed / speed);
                        body.velocity.x = scaled.x;
                        body.velocity.z = scaled.y;
                    }
                }
            }
        }
    }
}

/// Horizontal distance from `position` to the box footprint `[min, max]`.
fn footprint_distance(position: Vec3, min: Vec3, max: Vec3) -> f32 {
    let axis = Vec2::new(position.x, position.z);
    axis.distance(axis.clamp(Vec2::new(min.x, min.z), Vec2::new(max.x, max.z)))
}

/// Entry fraction of the segment `origin..origin + direction` into the box
/// `[min, max]`, by the slab method.
fn segment_box(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let (mut enter, mut exit) = (0.0f32, 1.0f32);
    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let (a, b) = ((min[axis] - o) / d, (max[axis] - o) / d);
        enter = enter.max(a.min(b));
        exit = exit.min(a.max(b));
        if enter > exit {
            return None;
        }
    }
    Some(enter)
}

impl Default for HeadlessPhysics {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -25.0, 0.0))
    }
}

impl PhysicsWorld for HeadlessPhysics {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn create_character(
        &mut self,
        settings: &CharacterSettings,
        position: Vec3,
        rotation: Quat,
    ) -> Result<CharacterId, PhysicsError> {
        let shape = settings.shape;
        if shape.radius <= 0.0 || shape.half_height < 0.0 {
            return Err(PhysicsError::ResourceInit {
                resource: "character",
                reason: format!(
                    "capsule needs a positive radius and non-negative half height, got r={} h={}",
                    shape.radius, shape.half_height
                ),
            });
        }
        if !position.is_finite() {
            return Err(PhysicsError::ResourceInit {
                resource: "character",
                reason: format!("non-finite start position {position}"),
            });
        }

        let id = CharacterId(self.allocate_id());
        let rotation = rotation.normalize();
        let up = rotation * Vec3::Y;
        self.characters.insert(
            id,
            HeadlessCharacter {
                settings: settings.clone(),
                cos_max_slope_angle: settings.max_slope_angle.cos(),
                position,
                rotation,
                up,
                velocity: Vec3::ZERO,
                ground_state: GroundState::InAir,
                ground_normal: up,
                ground_velocity: Vec3::ZERO,
                ground_body: None,
            },
        );
        debug!(%id, ?position, "created character");
        Ok(id)
    }

    fn destroy_character(&mut self, id: CharacterId) -> Result<(), PhysicsError> {
        self.characters
            .remove(&id)
            .map(drop)
            .ok_or(PhysicsError::UnknownCharacter(id))
    }

    fn character(&self, id: CharacterId) -> Result<&dyn CharacterVirtual, PhysicsError> {
        self.characters
            .get(&id)
            .map(|ch| ch as &dyn CharacterVirtual)
            .ok_or(PhysicsError::UnknownCharacter(id))
    }

    fn character_mut(&mut self, id: CharacterId) -> Result<&mut dyn CharacterVirtual, PhysicsError> {
        self.characters
            .get_mut(&id)
            .map(|ch| ch as &mut dyn CharacterVirtual)
            .ok_or(PhysicsError::UnknownCharacter(id))
    }

    fn update_ground_velocity(&mut self, id: CharacterId) -> Result<(), PhysicsError> {
        let ch = self
            .characters
            .get_mut(&id)
            .ok_or(PhysicsError::UnknownCharacter(id))?;
        ch.ground_velocity = ch
            .ground_body
            .and_then(|body| self.bodies.get(&body))
            .map_or(Vec3::ZERO, |body| body.velocity);
        Ok(())
    }

    fn extended_update(
        &mut self,
        id: CharacterId,
        dt: f32,
        up: Vec3,
        settings: &ExtendedUpdateSettings,
        filters: &CharacterFilters,
    ) -> Result<(), PhysicsError> {
        let ch = self
            .characters
            .get_mut(&id)
            .ok_or(PhysicsError::UnknownCharacter(id))?;
        ch.set_up(up);

        let shape = ch.settings.shape;
        let radius = shape.radius;
        let padding = ch.settings.character_padding;
        let recovery = ch.settings.penetration_recovery_speed.clamp(0.0, 1.0);
        let height = shape.total_height();
        let step_up = settings.walk_stairs_step_up.y.max(0.0);
        let step_down = (-settings.stick_to_floor_step_down.y).max(0.0);
        let was_grounded = ch.ground_state == GroundState::OnGround;

        let start = ch.position;
        let mut velocity = ch.velocity;
        let mut position = start + velocity * dt;

        let colliders: Vec<(BodyId, &Body)> = self
            .bodies
            .iter()
            .filter(|(id, body)| body.in_world && filters.accepts(**id, body.settings.layer))
            .map(|(&id, body)| (id, body))
            .collect();

        // Ceilings: boxes entirely above the head when the sweep began stop
        // the rise instead of pushing the character sideways.
        let head = start.y + height;
        for &(_, body) in &colliders {
            let (min, max) = (body.min(), body.max());
            if min.y + padding < head || footprint_distance(position, min, max) >= radius {
                continue;
            }
            let limit = (min.y - height).max(start.y);
            if position.y > limit {
                position.y = limit;
                velocity.y = velocity.y.min(0.0);
            }
        }

        // Walls: anything the capsule overlaps vertically and cannot step onto.
        let climb = if was_grounded { step_up } else { 0.0 };
        for &(_, body) in &colliders {
            let (min, max) = (body.min(), body.max());
            // A box already below the feet before this sweep is floor, not wall.
            let feet = position.y.max(start.y);
            if max.y - feet <= climb + padding || min.y >= position.y + height || min.y + padding >= head {
                continue;
            }

            let axis = Vec2::new(position.x, position.z);
            let closest = axis.clamp(Vec2::new(min.x, min.z), Vec2::new(max.x, max.z));
            let offset = axis - closest;
            let distance = offset.length();
            let reach = radius + padding;
            if distance >= reach {
                continue;
            }

            let push = if distance > 1e-6 {
                offset / distance * (reach - distance)
            } else {
                // Axis inside the box footprint: leave through the nearest side.
                [
                    (axis.x - min.x + reach, Vec2::NEG_X),
                    (max.x - axis.x + reach, Vec2::X),
                    (axis.y - min.z + reach, Vec2::NEG_Y),
                    (max.z - axis.y + reach, Vec2::Y),
                ]
                .into_iter()
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map_or(Vec2::ZERO, |(depth, dir)| dir * depth)
            } * recovery;

            position.x += push.x;
            position.z += push.y;

            let normal = Vec3::new(push.x, 0.0, push.y).normalize_or_zero();
            let into = velocity.dot(normal);
            if into < 0.0 {
                velocity -= normal * into;
            }
        }

        // Ground: the highest reachable box top under the capsule.
        let reach_top = position.y.max(start.y) + climb + padding;
        let mut support: Option<(BodyId, f32, Vec3)> = None;
        for &(body_id, body) in &colliders {
            let (min, max) = (body.min(), body.max());
            let inside = position.x >= min.x - radius
                && position.x <= max.x + radius
                && position.z >= min.z - radius
                && position.z <= max.z + radius;
            if !inside || max.y > reach_top {
                continue;
            }
            if support.is_none_or(|(_, top, _)| max.y > top) {
                support = Some((body_id, max.y, body.velocity));
            }
        }

        let mut grounded = None;
        if let Some((body_id, top, body_velocity)) = support {
            let gap = position.y - top;
            let touching = gap <= padding;
            let sticking = was_grounded && velocity.y <= body_velocity.y && gap <= step_down;
            if touching || sticking {
                position.y = top;
                if velocity.y < body_velocity.y {
                    velocity.y = body_velocity.y;
                }
                grounded = Some(body_id);
            }
        }

        ch.position = position;
        ch.velocity = velocity;
        match grounded {
            Some(body_id) => {
                ch.ground_body = Some(body_id);
                ch.ground_normal = Vec3::Y;
                ch.ground_state = if ch.is_slope_too_steep(Vec3::Y) {
                    GroundState::OnTooSteepSlope
                } else {
                    GroundState::OnGround
                };
            }
            None => {
                ch.ground_body = None;
                ch.ground_normal = ch.up;
                ch.ground_state = GroundState::InAir;
            }
        }
        Ok(())
    }

    fn create_body(&mut self, settings: &BodySettings) -> Result<BodyId, PhysicsError> {
        if settings.shape.half_extent.min_element() <= 0.0 {
            return Err(PhysicsError::ResourceInit {
                resource: "body",
                reason: format!("box half extent must be positive, got {}", settings.shape.half_extent),
            });
        }
        let id = BodyId(self.allocate_id());
        self.bodies.insert(
            id,
            Body {
                settings: settings.clone(),
                position: settings.position,
                rotation: settings.rotation,
                velocity: Vec3::ZERO,
                in_world: false,
                active: false,
            },
        );
        Ok(id)
    }

    fn add_body(&mut self, id: BodyId, activation: Activation) -> Result<(), PhysicsError> {
        let body = self.body_mut(id)?;
        body.in_world = true;
        body.active = activation == Activation::Activate;
        Ok(())
    }

    fn remove_body(&mut self, id: BodyId) -> Result<(), PhysicsError> {
        self.body_mut(id)?.in_world = false;
        Ok(())
    }

    fn destroy_body(&mut self, id: BodyId) -> Result<(), PhysicsError> {
        self.bodies
            .remove(&id)
            .map(drop)
            .ok_or(PhysicsError::UnknownBody(id))
    }

    fn body_position(&self, id: BodyId) -> Result<Vec3, PhysicsError> {
        Ok(self.body(id)?.position)
    }

    fn body_rotation(&self, id: BodyId) -> Result<Quat, PhysicsError> {
        Ok(self.body(id)?.rotation)
    }

    fn set_body_linear_velocity(&mut self, id: BodyId, velocity: Vec3) -> Result<(), PhysicsError> {
        let body = self.body_mut(id)?;
        body.velocity = velocity;
        body.active = true;
        Ok(())
    }

    fn add_impulse(&mut self, id: BodyId, impulse: Vec3) -> Result<(), PhysicsError> {
        let body = self.body_mut(id)?;
        if body.settings.motion_type == MotionType::Dynamic {
            body.velocity += impulse / body.settings.mass.max(f32::EPSILON);
            body.active = true;
        }
        Ok(())
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, layer: ObjectLayer) -> Option<RayHit> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.in_world && layer.collides_with(body.settings.layer))
            .filter_map(|(&id, body)| {
                segment_box(origin, direction, body.min(), body.max()).map(|fraction| RayHit {
                    body: id,
                    fraction,
                    point: origin + direction * fraction,
                })
            })
            .min_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }

    fn step(&mut self, dt: f32, collision_steps: u32) {
        let steps = collision_steps.max(1);
        let sub_dt = dt / steps as f32;
        for _ in 0..steps {
            self.integrate(sub_dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tug;

    const DT: f32 = 1.0 / 60.0;

    fn floor(physics: &mut HeadlessPhysics) -> BodyId {
        let id = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, -0.5, 0.0),
                Quat::IDENTITY,
                Vec3::new(50.0, 0.5, 50.0),
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap();
        physics.add_body(id, Activation::DontActivate).unwrap();
        id
    }

    fn dynamic_cube(physics: &mut HeadlessPhysics, position: Vec3) -> BodyId {
        let id = physics
            .create_body(&BodySettings::cuboid(
                position,
                Quat::IDENTITY,
                Vec3::splat(0.5),
                MotionType::Dynamic,
                ObjectLayer::MOVING,
            ))
            .unwrap();
        physics.add_body(id, Activation::Activate).unwrap();
        id
    }

    fn character(physics: &mut HeadlessPhysics, position: Vec3) -> CharacterId {
        physics
            .create_character(&CharacterSettings::capsule(3.0, 1.0), position, Quat::IDENTITY)
            .unwrap()
    }

    fn sweep(physics: &mut HeadlessPhysics, id: CharacterId, velocity: Vec3) {
        physics.character_mut(id).unwrap().set_linear_velocity(velocity);
        physics
            .extended_update(
                id,
                DT,
                Vec3::Y,
                &ExtendedUpdateSettings::default(),
                &CharacterFilters::for_layer(ObjectLayer::MOVING),
            )
            .unwrap();
    }

    #[test]
    fn test_character_falls_then_lands() {
        let mut physics = HeadlessPhysics::default();
        let ground = floor(&mut physics);
        let id = character(&mut physics, Vec3::new(0.0, 2.0, 0.0));

        let mut velocity = Vec3::ZERO;
        for _ in 0..120 {
            velocity = physics.character(id).unwrap().linear_velocity() + physics.gravity() * DT;
            sweep(&mut physics, id, velocity);
        }

        let ch = physics.character(id).unwrap();
        assert_eq!(ch.ground_state(), GroundState::OnGround);
        assert_eq!(ch.position().y, 0.0);
        assert!(ch.linear_velocity().y >= 0.0, "landing cancels downward velocity, was {velocity}");
        assert_eq!(physics.headless_character(id).unwrap().ground_body(), Some(ground));
    }

    #[test]
    fn test_character_in_air_without_support() {
        let mut physics = HeadlessPhysics::default();
        let id = character(&mut physics, Vec3::new(0.0, 10.0, 0.0));
        sweep(&mut physics, id, Vec3::new(0.0, -1.0, 0.0));
        let ch = physics.character(id).unwrap();
        assert_eq!(ch.ground_state(), GroundState::InAir);
        assert_eq!(ch.ground_normal(), Vec3::Y);
    }

    #[test]
    fn test_wall_blocks_horizontal_motion() {
        let mut physics = HeadlessPhysics::default();
        floor(&mut physics);
        let wall = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(3.0, 2.0, 0.0),
                Quat::IDENTITY,
                Vec3::new(0.5, 2.0, 5.0),
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap();
        physics.add_body(wall, Activation::DontActivate).unwrap();
        let id = character(&mut physics, Vec3::ZERO);

        for _ in 0..120 {
            sweep(&mut physics, id, Vec3::new(6.0, 0.0, 0.0));
        }

        let x = physics.character(id).unwrap().position().x;
        // Wall face at 2.5, capsule radius 1 plus padding.
        assert!(x <= 2.5 - 1.0 + 1e-3, "character passed into the wall: x = {x}");
    }

    #[test]
    fn test_ceiling_stops_jump_without_sideways_push() {
        let mut physics = HeadlessPhysics::default();
        floor(&mut physics);
        let slab = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, 5.75, 0.0),
                Quat::IDENTITY,
                Vec3::new(3.0, 0.25, 3.0),
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap();
        physics.add_body(slab, Activation::DontActivate).unwrap();
        let id = character(&mut physics, Vec3::ZERO);
        sweep(&mut physics, id, Vec3::ZERO);
        assert_eq!(physics.character(id).unwrap().ground_state(), GroundState::OnGround);

        let mut velocity = Vec3::new(0.0, 11.0, 0.0);
        let mut peak = 0.0f32;
        for frame in 0..60 {
            sweep(&mut physics, id, velocity);
            let ch = physics.character(id).unwrap();
            let position = ch.position();
            assert_eq!((position.x, position.z), (0.0, 0.0), "frame {frame}: moved to {position}");
            peak = peak.max(position.y);
            velocity = ch.linear_velocity() + physics.gravity() * DT;
        }

        // Slab underside at 5.5, capsule 5 tall.
        assert!((peak - 0.5).abs() < 1e-4, "peak = {peak}");
        let ch = physics.character(id).unwrap();
        assert_eq!(ch.ground_state(), GroundState::OnGround);
        assert_eq!(ch.position().y, 0.0);
    }

    #[test]
    fn test_walks_up_low_step_but_not_high_ledge() {
        let mut physics = HeadlessPhysics::default();
        floor(&mut physics);
        let step = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(4.0, 0.15, 0.0),
                Quat::IDENTITY,
                Vec3::new(2.0, 0.15, 2.0),
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap();
        physics.add_body(step, Activation::DontActivate).unwrap();
        let id = character(&mut physics, Vec3::ZERO);

        // Settle on the floor first so stair walking is enabled.
        sweep(&mut physics, id, Vec3::ZERO);
        for _ in 0..60 {
            sweep(&mut physics, id, Vec3::new(4.0, 0.0, 0.0));
        }
        let ch = physics.character(id).unwrap();
        assert_eq!(ch.position().y, 0.3);
        assert_eq!(ch.ground_state(), GroundState::OnGround);
    }

    #[test]
    fn test_sticks_to_floor_when_stepping_down() {
        let mut physics = HeadlessPhysics::default();
        floor(&mut physics);
        let ledge = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, 0.15, 0.0),
                Quat::IDENTITY,
                Vec3::new(1.0, 0.15, 1.0),
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap();
        physics.add_body(ledge, Activation::DontActivate).unwrap();
        let id = character(&mut physics, Vec3::new(0.0, 0.3, 0.0));
        sweep(&mut physics, id, Vec3::ZERO);
        assert_eq!(physics.character(id).unwrap().ground_state(), GroundState::OnGround);

        for _ in 0..60 {
            sweep(&mut physics, id, Vec3::new(3.0, 0.0, 0.0));
        }
        let ch = physics.character(id).unwrap();
        assert_eq!(ch.position().y, 0.0);
        assert_eq!(ch.ground_state(), GroundState::OnGround);
    }

    #[test]
    fn test_ground_velocity_follows_supporting_body() {
        let mut physics = HeadlessPhysics::default();
        let platform = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, -0.5, 0.0),
                Quat::IDENTITY,
                Vec3::new(5.0, 0.5, 5.0),
                MotionType::Kinematic,
                ObjectLayer::MOVING,
            ))
            .unwrap();
        physics.add_body(platform, Activation::Activate).unwrap();
        physics
            .set_body_linear_velocity(platform, Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        let id = character(&mut physics, Vec3::ZERO);
        sweep(&mut physics, id, Vec3::ZERO);

        physics.update_ground_velocity(id).unwrap();
        assert_eq!(physics.character(id).unwrap().ground_velocity(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_slope_limit() {
        let mut physics = HeadlessPhysics::default();
        let id = character(&mut physics, Vec3::ZERO);
        let ch = physics.character(id).unwrap();
        assert!(!ch.is_slope_too_steep(Vec3::Y));
        let thirty = Quat::from_rotation_z(30f32.to_radians()) * Vec3::Y;
        let sixty = Quat::from_rotation_z(60f32.to_radians()) * Vec3::Y;
        assert!(!ch.is_slope_too_steep(thirty));
        assert!(ch.is_slope_too_steep(sixty));
    }

    #[test]
    fn test_dynamic_box_comes_to_rest_on_floor() {
        let mut physics = HeadlessPhysics::default();
        floor(&mut physics);
        let cube = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, 3.0, 0.0),
                Quat::IDENTITY,
                Vec3::splat(0.5),
                MotionType::Dynamic,
                ObjectLayer::MOVING,
            ))
            .unwrap();
        physics.add_body(cube, Activation::Activate).unwrap();

        for _ in 0..180 {
            physics.step(DT, 1);
        }
        let y = physics.body_position(cube).unwrap().y;
        assert!((y - 0.5).abs() < 1e-3, "cube should rest on the floor, y = {y}");
    }

    #[test]
    fn test_removed_body_is_not_simulated() {
        let mut physics = HeadlessPhysics::default();
        let cube = physics
            .create_body(&BodySettings::cuboid(
                Vec3::new(0.0, 3.0, 0.0),
                Quat::IDENTITY,
                Vec3::splat(0.5),
                MotionType::Dynamic,
                ObjectLayer::MOVING,
            ))
            .unwrap();
        physics.step(DT, 1);
        assert_eq!(physics.body_position(cube).unwrap().y, 3.0);
        physics.add_body(cube, Activation::Activate).unwrap();
        physics.remove_body(cube).unwrap();
        assert!(!physics.is_body_added(cube));
        physics.step(DT, 1);
        assert_eq!(physics.body_position(cube).unwrap().y, 3.0);
    }

    #[test]
    fn test_invalid_resources_are_rejected() {
        let mut physics = HeadlessPhysics::default();
        let err = physics
            .create_character(&CharacterSettings::capsule(3.0, 0.0), Vec3::ZERO, Quat::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, PhysicsError::ResourceInit { resource: "character", .. }));

        let err = physics
            .create_body(&BodySettings::cuboid(
                Vec3::ZERO,
                Quat::IDENTITY,
                Vec3::ZERO,
                MotionType::Static,
                ObjectLayer::NON_MOVING,
            ))
            .unwrap_err();
        assert!(matches!(err, PhysicsError::ResourceInit { resource: "body", .. }));
    }

    #[test]
    fn test_ray_hits_nearest_added_body_in_layer() {
        let mut physics = HeadlessPhysics::default();
        let ground = floor(&mut physics);
        let near = dynamic_cube(&mut physics, Vec3::new(0.0, 0.5, -3.0));
        dynamic_cube(&mut physics, Vec3::new(0.0, 0.5, -6.0));

        let origin = Vec3::new(0.0, 0.5, 0.0);
        let hit = physics.cast_ray(origin, Vec3::new(0.0, 0.0, -10.0), ObjectLayer::MOVING).unwrap();
        assert_eq!(hit.body, near);
        assert!((hit.fraction - 0.25).abs() < 1e-6);
        assert!(hit.point.abs_diff_eq(Vec3::new(0.0, 0.5, -2.5), 1e-5));

        // Too short to reach anything.
        assert_eq!(physics.cast_ray(origin, Vec3::new(0.0, 0.0, -1.0), ObjectLayer::MOVING), None);

        // Static geometry does not answer static queries.
        let down = Vec3::new(0.0, -5.0, 0.0);
        let above = Vec3::new(10.0, 2.0, 10.0);
        assert_eq!(physics.cast_ray(above, down, ObjectLayer::MOVING).map(|h| h.body), Some(ground));
        assert_eq!(physics.cast_ray(above, down, ObjectLayer::NON_MOVING), None);
    }

    #[test]
    fn test_tug_pulls_hit_body_towards_origin() {
        let mut physics = HeadlessPhysics::default();
        let cube = dynamic_cube(&mut physics, Vec3::new(0.0, 0.5, -3.0));
        let floor_id = floor(&mut physics);

        let hit = tug(&mut physics, Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 0.0, -10.0), 10.0)
            .unwrap()
            .unwrap();
        assert_eq!(hit.body, cube);
        assert_eq!(physics.bodies[&cube].velocity, Vec3::new(0.0, 0.0, 10.0));

        // Static bodies take the impulse without moving.
        physics.add_impulse(floor_id, Vec3::X).unwrap();
        assert_eq!(physics.bodies[&floor_id].velocity, Vec3::ZERO);
        assert_eq!(physics.add_impulse(BodyId(99), Vec3::X), Err(PhysicsError::UnknownBody(BodyId(99))));
    }

    #[test]
    fn test_destroy_character_twice_fails() {
        let mut physics = HeadlessPhysics::default();
        let id = character(&mut physics, Vec3::ZERO);
        assert_eq!(physics.character_count(), 1);
        physics.destroy_character(id).unwrap();
        assert_eq!(physics.destroy_character(id), Err(PhysicsError::UnknownCharacter(id)));
        assert_eq!(physics.character_count(), 0);
    }
}
