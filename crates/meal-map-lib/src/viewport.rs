//! ViewportController - the single current map region
//!
//! `region()` is always the region the map should settle on. While an animation
//! runs, `region_at(now)` gives the interpolated frame to draw. A new request
//! replaces the running animation, starting from wherever the camera is.

use std::time::Duration;

use tokio::time::Instant;

use crate::Region;

/// Default duration of a recentering animation
pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(500);

/// A running transition between two regions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub from: Region,
    pub to: Region,
    pub started_at: Instant,
    pub duration: Duration,
}

impl Animation {
    /// Linear progress in [0, 1]
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Eased frame at `now`
    pub fn sample(&self, now: Instant) -> Region {
        let t = self.progress(now);
        // smoothstep
        let eased = t * t * (3.0 - 2.0 * t);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, eased)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// What the map view has to do after a viewport request
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportChange {
    /// Jump without animation
    Set(Region),
    /// Animate towards `target`
    Animate { target: Region, duration: Duration },
}

impl ViewportChange {
    pub fn target(&self) -> Region {
        match self {
            Self::Set(region) => *region,
            Self::Animate { target, .. } => *target,
        }
    }
}

/// Owner of the map viewport
#[derive(Clone, Debug)]
pub struct ViewportController {
    region: Region,
    animation: Option<Animation>,
    /// Number of accepted requests since construction
    changes: u64,
}

impl ViewportController {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            animation: None,
            changes: 0,
        }
    }

    /// Replace the viewport immediately, dropping any running animation
    pub fn set_region(&mut self, region: Region) -> ViewportChange {
        self.region = region;
        self.animation = None;
        self.changes += 1;
        ViewportChange::Set(region)
    }

    /// Start a smooth transition to `region`; supersedes a running one
    pub fn animate_to(&mut self, region: Region, duration: Duration) -> ViewportChange {
        self.animate_to_at(region, duration, Instant::now())
    }

    pub(crate) fn animate_to_at(
        &mut self,
        region: Region,
        duration: Duration,
        now: Instant,
    ) -> ViewportChange {
        let from = self.region_at(now);
        if self.animation.is_some_and(|a| !a.is_finished(now)) {
            tracing::trace!("Superseding running viewport animation");
        }
        self.animation = Some(Animation {
            from,
            to: region,
            started_at: now,
            duration,
        });
        self.region = region;
        self.changes += 1;
        ViewportChange::Animate {
            target: region,
            duration,
        }
    }

    /// The region the viewport is at or heading to
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// The frame to draw at `now`
    pub fn region_at(&self, now: Instant) -> Region {
        match &self.animation {
            Some(animation) => animation.sample(now),
            None => self.region,
        }
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animation.is_some_and(|a| !a.is_finished(now))
    }

    #[inline]
    pub fn changes(&self) -> u64 {
        self.changes
    }
}
