//! Perception-limited target selection with consumption side effects.

use crate::agent::Agent;
use vivarium_core::Vec2;

/// Consume-or-track scan over a point collection.
///
/// Iterates in reverse index order so removal is shift-safe. A candidate
/// within the capture radius (the agent's `max_speed`) is removed and `diet`
/// applied to the agent's health when `can_consume` is set; a captured
/// candidate never competes for nearest. Otherwise candidates within
/// `perception` compete for nearest under strict `<`, so the first-encountered
/// target at an exactly equal distance wins — given the reverse order, that is
/// the highest-index one.
///
/// Returns a `seek` steer toward the nearest perceived target, or zero when
/// none qualifies.
pub fn scan(
    agent: &mut Agent,
    targets: &mut Vec<Vec2>,
    diet: f64,
    perception: f64,
    can_consume: bool,
) -> Vec2 {
    let capture = agent.species.max_speed;
    let mut best = f64::INFINITY;
    let mut nearest = None;

    for i in (0..targets.len()).rev() {
        let d = agent.position.distance(targets[i]);

        if can_consume && d < capture {
            targets.remove(i);
            agent.calc_health(diet);
        } else if d < best && d <= perception {
            best = d;
            nearest = Some(targets[i]);
        }
    }

    match nearest {
        Some(target) => agent.seek(target),
        None => Vec2::ZERO,
    }
}

/// Predator variant over live rivals.
///
/// The nearest rival is the arg-min over all rival positions (lowest index
/// wins ties), gated on at least one rival being inside `perception`. Within
/// the capture radius — `max_speed` plus the truncated half-size — the rival
/// takes `damage` through its own health state and the predator gains `diet`;
/// the rival is never removed here, its own health reaching zero governs
/// removal. The predator still seeks the captured position that tick.
pub fn hunt(
    predator: &mut Agent,
    prey: &mut [Agent],
    diet: f64,
    perception: f64,
    damage: f64,
) -> Vec2 {
    if prey.is_empty() {
        return Vec2::ZERO;
    }

    let mut best = f64::INFINITY;
    let mut best_idx = 0;
    let mut any_within = false;

    for (i, rival) in prey.iter().enumerate() {
        let d = predator.position.distance(rival.position);
        if d < best {
            best = d;
            best_idx = i;
        }
        if d <= perception {
            any_within = true;
        }
    }

    if !any_within {
        return Vec2::ZERO;
    }

    let target = prey[best_idx].position;
    let capture = predator.species.max_speed + (predator.species.size / 2.0).trunc();
    if best < capture {
        prey[best_idx].calc_health(-damage);
        predator.calc_health(diet);
    }

    predator.seek(target)
}
