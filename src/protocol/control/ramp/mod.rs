//! Charger power ramp.
//!
//! The power request moves by a fixed step per fast tick toward the requested
//! power, never past it, and drops straight to zero when the ramp is disabled.

/// One ramp step.
///
/// Returns 0 when `enabled` is false. Otherwise moves `current` toward
/// `min(target, ceiling)` by at most `step`. The result never exceeds `ceiling`.
pub fn ramp_step(current: u16, target: u16, enabled: bool, step: u16, ceiling: u16) -> u16 {
    if !enabled {
        return 0;
    }
    let goal = target.min(ceiling);
    let next = if current < goal {
        current.saturating_add(step).min(goal)
    } else {
        current.saturating_sub(step).max(goal)
    };
    next.min(ceiling)
}

#[derive(Debug, Clone)]
/// Ramp state: current request plus the configured step and ceiling.
pub struct PowerRamp {
    current: u16,
    step: u16,
    ceiling: u16,
}

impl PowerRamp {
    pub const fn new(step: u16, ceiling: u16) -> Self {
        Self {
            current: 0,
            step,
            ceiling,
        }
    }

    /// Advance one tick and return the new request in watts.
    pub fn update(&mut self, target: u16, enabled: bool) -> u16 {
        self.current = ramp_step(self.current, target, enabled, self.step, self.ceiling);
        self.current
    }

    pub fn current(&self) -> u16 {
        self.current
    }
}
