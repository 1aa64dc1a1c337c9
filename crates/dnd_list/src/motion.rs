use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
struct Motion {
    start: Instant,
    from: f32,
    to: f32,
}

impl Motion {
    /// Eased value at `now`, and whether the motion has settled.
    fn value_at(&self, now: Instant, duration: Duration) -> (f32, bool) {
        if self.from == self.to || duration.is_zero() {
            return (self.to, true);
        }

        let elapsed = now.saturating_duration_since(self.start);
        let mut t = elapsed.as_secs_f32() / duration.as_secs_f32();
        if t >= 1.0 {
            return (self.to, true);
        }

        t = t.clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        (self.from + (self.to - self.from) * eased, false)
    }
}

/// Eases each row's vertical shift towards the shift the tracker reports.
///
/// Only the painted position moves gradually. Crossing detection always works
/// from the target shifts.
pub(crate) struct RowMotions<K> {
    duration: Duration,
    rows: HashMap<K, Motion>,
}

impl<K: Clone + Eq + Hash> RowMotions<K> {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            duration,
            rows: HashMap::new(),
        }
    }

    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Shift to paint `id` at. Retargets from the current painted value when
    /// `target` changed. The flag is true while the row is still moving.
    pub(crate) fn shift(&mut self, id: &K, target: f32, now: Instant) -> (f32, bool) {
        let motion = self.rows.entry(id.clone()).or_insert(Motion {
            start: now,
            from: 0.,
            to: 0.,
        });
        if (motion.to - target).abs() > f32::EPSILON {
            let (current, _) = motion.value_at(now, self.duration);
            *motion = Motion {
                start: now,
                from: current,
                to: target,
            };
        }
        let (value, settled) = motion.value_at(now, self.duration);
        (value, !settled)
    }

    /// Forget all motion; rows paint at their layout position.
    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }
}
