//! Circle-circle collision detection and elastic response
//!
//! Every unordered pair is checked once per pass in ascending index order
//! (`i < j`). A colliding pair is re-seated so both circles just touch at the
//! midpoint of their centres, then exchanges momentum with the standard
//! two-body elastic formula. Both new velocities are computed from the pair's
//! pre-resolution state before either is written back.

use std::collections::HashSet;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::arena::ArenaBounds;
use super::body::{Body, BodyId};

/// Overlap below this is treated as touching during relaxation passes
pub const OVERLAP_TOLERANCE: f64 = 1e-9;

/// Minimum extra passes after the first to clear overlap created by earlier
/// fixes. Larger populations get one pass per body.
pub const MAX_RELAXATION_PASSES: usize = 32;

/// Separation axis used when two centres coincide exactly
pub const FALLBACK_AXIS: DVec2 = DVec2::X;

/// Two bodies touched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub a: BodyId,
    pub b: BodyId,
}

impl CollisionEvent {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        Self { a, b }
    }

    pub fn pair(&self) -> (BodyId, BodyId) {
        (self.a, self.b)
    }
}

/// `r_a + r_b - distance`; non-negative means the circles touch or overlap
#[inline]
pub fn overlap_depth(a: &Body, b: &Body) -> f64 {
    a.radius + b.radius - a.position.distance(b.position)
}

#[inline]
pub fn circles_touch(a: &Body, b: &Body) -> bool {
    overlap_depth(a, b) >= 0.0
}

#[inline]
pub fn midpoint(a: DVec2, b: DVec2) -> DVec2 {
    (a + b) * 0.5
}

/// New velocity of body A after an elastic collision with B.
///
/// `offset` is `p_A - p_B`:
///
/// v_A' = v_A - (2 m_B / (m_A + m_B)) * ((v_A - v_B)·offset / |offset|²) * offset
///
/// B's velocity is the same call with the roles swapped and `-offset`.
/// A zero offset leaves the velocity unchanged.
pub fn elastic_bounce(va: DVec2, vb: DVec2, ma: f64, mb: f64, offset: DVec2) -> DVec2 {
    let dist_sq = offset.length_squared();
    if dist_sq == 0.0 {
        return va;
    }
    let mass = 2.0 * mb / (ma + mb);
    let quot = (va - vb).dot(offset) / dist_sq;
    va - (mass * quot) * offset
}

/// Positions that put each circle `radius` from the midpoint along the
/// centre line, so the pair just touches. Coincident centres use
/// [`FALLBACK_AXIS`] with A on the positive side.
pub fn reseat(pa: DVec2, ra: f64, pb: DVec2, rb: f64) -> (DVec2, DVec2) {
    let axis = separation_axis(pa, pb);
    let mid = midpoint(pa, pb);
    (mid + axis * ra, mid - axis * rb)
}

/// Unit vector from B to A
fn separation_axis(pa: DVec2, pb: DVec2) -> DVec2 {
    let offset = pa - pb;
    let length = offset.length();
    if length > 0.0 {
        offset / length
    } else {
        log::debug!("Degenerate contact at ({}, {}), using fallback axis", pa.x, pa.y);
        FALLBACK_AXIS
    }
}

/// Pairwise resolver settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    pub max_relaxation_passes: usize,
    pub overlap_tolerance: f64,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            max_relaxation_passes: MAX_RELAXATION_PASSES,
            overlap_tolerance: OVERLAP_TOLERANCE,
        }
    }
}

impl CollisionResolver {
    /// Detect and resolve every touching pair, returning one event per pair.
    ///
    /// The first pass counts exact touching as a collision. Later passes only
    /// pick up pairs still overlapping by more than `overlap_tolerance`, which
    /// happens when fixing one pair pushes a body into a third. A pair gets its
    /// event the first time it is seen this call; later passes only move it.
    /// With `arena` set, each re-seated pair is shifted back inside the
    /// containment band without changing its separation.
    ///
    /// Events and impulses are decoupled. Every touching pair is reported, but
    /// only a pair whose centres are approaching exchanges momentum. A pair
    /// that touches while already moving apart is re-seated and reported with
    /// its velocities untouched.
    ///
    /// A jammed crowd can exhaust the pass budget with overlap left over; see
    /// [`CollisionResolver::settle`].
    pub fn resolve(&self, bodies: &mut [Body], arena: Option<&ArenaBounds>) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        let mut resolved: HashSet<(usize, usize)> = HashSet::new();
        let n = bodies.len();

        let passes = self.pass_budget(n);
        for pass in 0..=passes {
            let mut found = false;
            for i in 0..n {
                for j in (i + 1)..n {
                    let depth = overlap_depth(&bodies[i], &bodies[j]);
                    let hit = if pass == 0 {
                        depth >= 0.0
                    } else {
                        depth > self.overlap_tolerance
                    };
                    if !hit {
                        continue;
                    }
                    found = true;

                    let first_contact = resolved.insert((i, j));
                    resolve_pair(bodies, i, j, arena, first_contact);
                    if first_contact {
                        log::debug!(
                            "Collision {} <-> {} (depth {:.4}, pass {})",
                            bodies[i].id,
                            bodies[j].id,
                            depth,
                            pass
                        );
                        events.push(CollisionEvent::new(bodies[i].id, bodies[j].id));
                    }
                }
            }
            if !found {
                return events;
            }
        }

        log::debug!("Relaxation stopped after {} passes with overlap remaining", passes);
        events
    }

    /// Relaxation passes allowed for `n` bodies
    pub fn pass_budget(&self, n: usize) -> usize {
        self.max_relaxation_passes.max(n)
    }

    /// Put bodies that still overlap back at `previous`, returning how many moved.
    ///
    /// `previous` holds the positions from the end of the last tick, which
    /// satisfied the overlap bound. Both bodies of an offending pair are held
    /// there; holding one can uncover another overlap, so the sweep repeats
    /// until nothing changes. At most every body is held, which restores the
    /// previous layout. Velocities are left as `resolve` wrote them.
    pub fn settle(&self, bodies: &mut [Body], previous: &[DVec2]) -> usize {
        let n = bodies.len().min(previous.len());
        let mut held = vec![false; n];
        let mut count = 0;

        loop {
            let mut changed = false;
            for i in 0..n {
                for j in (i + 1)..n {
                    if held[i] && held[j] {
                        continue;
                    }
                    if overlap_depth(&bodies[i], &bodies[j]) <= self.overlap_tolerance {
                        continue;
                    }
                    for k in [i, j] {
                        if !held[k] {
                            held[k] = true;
                            bodies[k].position = previous[k];
                            count += 1;
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }

        if count > 0 {
            log::debug!("Held {} jammed bodies at their previous positions", count);
        }
        count
    }
}

/// [`CollisionResolver::resolve`] with default settings
pub fn resolve_collisions(bodies: &mut [Body], arena: Option<&ArenaBounds>) -> Vec<CollisionEvent> {
    CollisionResolver::default().resolve(bodies, arena)
}

/// Re-seat bodies `i` and `j` and, on first contact, exchange momentum.
///
/// The impulse is skipped for pairs already moving apart so a pair left
/// touching by the previous tick does not get pulled back together. Such a
/// pair is still reported by the caller.
fn resolve_pair(bodies: &mut [Body], i: usize, j: usize, arena: Option<&ArenaBounds>, apply_impulse: bool) {
    let (a, b) = (&bodies[i], &bodies[j]);
    let (pa, pb) = (a.position, b.position);
    let (va, vb) = (a.velocity, b.velocity);
    let (ma, mb) = (a.mass, b.mass);
    let (ra, rb) = (a.radius, b.radius);

    let (mut new_pa, mut new_pb) = reseat(pa, ra, pb, rb);
    if let Some(arena) = arena {
        let shift = arena.pair_shift(new_pa, ra, new_pb, rb);
        new_pa += shift;
        new_pb += shift;
    }

    let (mut new_va, mut new_vb) = (va, vb);
    if apply_impulse {
        let offset = if pa == pb { FALLBACK_AXIS } else { pa - pb };
        if (va - vb).dot(offset) < 0.0 {
            new_va = elastic_bounce(va, vb, ma, mb, offset);
            new_vb = elastic_bounce(vb, va, mb, ma, -offset);
        }
    }

    bodies[i].position = new_pa;
    bodies[i].velocity = new_va;
    bodies[j].position = new_pb;
    bodies[j].velocity = new_vb;
}
