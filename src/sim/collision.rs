//! Collision resolution against static stage geometry
//!
//! Vertical motion is resolved one pixel at a time so a fast fall can never
//! tunnel through a thin platform or end deep inside one: the first step that
//! overlaps geometry is undone by snapping to the surface. Horizontal motion
//! is a single bulk move followed by one overlap pass and an edge snap.

use super::body::{Body, Rect};
use super::level::Platform;

/// Which geometry blocks a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solids {
    /// Every platform (the player)
    All,
    /// Ground segments only (walking enemies)
    GroundOnly,
}

impl Solids {
    #[inline]
    fn admits(self, platform: &Platform) -> bool {
        match self {
            Solids::All => true,
            Solids::GroundOnly => platform.is_ground(),
        }
    }
}

/// Result of a vertical move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalContact {
    /// Platform index landed on (or standing on, after a probe)
    pub landed: Option<usize>,
    /// Platform index hit from below
    pub bumped: Option<usize>,
}

impl VerticalContact {
    #[inline]
    pub fn grounded(&self) -> bool {
        self.landed.is_some()
    }
}

/// Index of the first platform overlapping `rect`
pub fn first_overlap(rect: &Rect, platforms: &[Platform], solids: Solids) -> Option<usize> {
    platforms
        .iter()
        .position(|p| solids.admits(p) && rect.intersects(&p.rect))
}

/// Whether `rect` is free of blocking geometry
pub fn fits(rect: &Rect, platforms: &[Platform], solids: Solids) -> bool {
    first_overlap(rect, platforms, solids).is_none()
}

/// Move `body` vertically by `vel.y * dt`, one pixel at a time
///
/// On contact the body's edge is snapped to the platform surface and its
/// vertical velocity zeroed. With no vertical motion a one pixel probe below
/// the feet decides whether the body is still standing.
pub fn move_vertical(body: &mut Body, dt: f32, platforms: &[Platform], solids: Solids) -> VerticalContact {
    let mut contact = VerticalContact::default();
    let dy = body.vel.y * dt;

    if dy == 0.0 {
        let mut probe = body.rect;
        probe.y += 1.0;
        contact.landed = first_overlap(&probe, platforms, solids);
        body.grounded = contact.grounded();
        return contact;
    }

    let dir = if dy > 0.0 { 1.0 } else { -1.0 };
    let mut remaining = dy.abs();
    while remaining > 0.0 {
        let step = remaining.min(1.0);
        body.rect.y += dir * step;
        remaining -= step;

        if let Some(index) = first_overlap(&body.rect, platforms, solids) {
            let surface = platforms[index].rect;
            if dir > 0.0 {
                body.rect.y = surface.top() - body.rect.h;
                contact.landed = Some(index);
            } else {
                body.rect.y = surface.bottom();
                contact.bumped = Some(index);
            }
            body.vel.y = 0.0;
            break;
        }
    }

    body.grounded = contact.grounded();
    contact
}

/// Move `body` horizontally by `dx` in one step, then push it out of anything it entered
///
/// Returns true when the move was blocked.
pub fn move_horizontal(body: &mut Body, dx: f32, platforms: &[Platform], solids: Solids) -> bool {
    if dx == 0.0 {
        return false;
    }
    body.rect.x += dx;

    let mut blocked = false;
    for platform in platforms.iter().filter(|p| solids.admits(p)) {
        if body.rect.intersects(&platform.rect) {
            if dx > 0.0 {
                body.rect.x = platform.rect.left() - body.rect.w;
            } else {
                body.rect.x = platform.rect.right();
            }
            blocked = true;
        }
    }
    blocked
}
