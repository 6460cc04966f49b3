// The collision resolver.
//
// Classifies the floor contacts collected by the physics step and applies
// the entity transitions:
// - floor × any squid body → the entire parent composite is destroyed and
//   a splash is requested at the contact point;
// - floor × burst particle → only that single body is destroyed.
//
// The resolver runs synchronously inside the tick, after integration, and
// returns a structured effect list instead of mutating roster state — the
// sim spawns the requested splashes and the reconciler turns the physical
// absences into roster removals.
//
// A contact whose body is already gone (destroyed earlier in the same
// batch, evicted, decayed) is a no-op, not an error. That also dedups the
// composite case for free: once the first squid-body contact removes the
// whole composite, the remaining contacts of that squid find no body.

use crate::types::{AvatarId, BodyOwner, Vec2};
use crate::world::{Contact, World};

/// The side effects of resolving one tick's floor contacts.
#[derive(Debug, Default)]
pub struct ResolvedCollisions {
    /// Squids that landed: composite destroyed, splash due at the point.
    pub grounded: Vec<GroundedSquid>,
    /// Count of single burst particles destroyed on the floor.
    pub particles_removed: usize,
}

/// One squid that hit the floor this tick.
#[derive(Clone, Copy, Debug)]
pub struct GroundedSquid {
    pub id: AvatarId,
    /// Contact position — where the splash spawns.
    pub point: Vec2,
}

/// Resolve all floor contacts from one physics step.
pub fn resolve(world: &mut World, contacts: &[Contact]) -> ResolvedCollisions {
    let mut resolved = ResolvedCollisions::default();
    for contact in contacts {
        // Already removed → no-op.
        let Some(body) = world.body(contact.body) else {
            continue;
        };
        match body.owner {
            BodyOwner::Avatar(id) => {
                world.remove_owned(BodyOwner::Avatar(id));
                resolved.grounded.push(GroundedSquid {
                    id,
                    point: contact.point,
                });
            }
            BodyOwner::Splash(_) | BodyOwner::Firework(_) => {
                world.remove_body(contact.body);
                resolved.particles_removed += 1;
            }
        }
    }
    resolved
}
