//! Animation timing.
//!
//! The controller never interpolates positions itself. It commits target
//! values together with an `AnimationSpec`, and the host's animation engine
//! runs the transition. The spec's duration doubles as the completion
//! fallback deadline when the host never reports the animation finished.

/// Easing curve applied by the host when animating toward a committed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Evaluate the curve at `t` in `0.0..=1.0`.
    pub fn eval(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Curve plus duration for one committed transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub easing: Easing,
    pub duration_ms: u32,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            easing: Easing::EaseOut,
            duration_ms: 300,
        }
    }
}

impl AnimationSpec {
    pub fn new(easing: Easing, duration_ms: u32) -> Self {
        Self {
            easing,
            duration_ms,
        }
    }

    /// Default scrim fade.
    pub fn background_fade() -> Self {
        Self {
            easing: Easing::Linear,
            duration_ms: 200,
        }
    }

    /// Eased progress for a transition started `elapsed_ms` ago, saturating
    /// at `1.0`.
    pub fn progress(&self, elapsed_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        self.easing
            .eval(elapsed_ms as f32 / self.duration_ms as f32)
    }

    pub fn is_complete(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= u64::from(self.duration_ms)
    }
}
