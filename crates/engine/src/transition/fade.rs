pub const DEFAULT_FADE_SECONDS: f32 = 0.25;
pub const OPAQUE: f32 = 1.0;
pub const CLEAR: f32 = 0.0;

/// Receives screen fade requests and reports when the current one has finished.
pub trait FadeSink {
    fn start_fade(&mut self, target_opacity: f32, duration_seconds: f32);
    fn advance(&mut self, dt_seconds: f32);
    fn is_complete(&self) -> bool;
    fn opacity(&self) -> f32;
}

/// Linear opacity tween for a full-screen black overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenFade {
    opacity: f32,
    from: f32,
    target: f32,
    duration: f32,
    elapsed: f32,
}

impl ScreenFade {
    pub fn with_opacity(opacity: f32) -> Self {
        let opacity = opacity.clamp(CLEAR, OPAQUE);
        Self {
            opacity,
            from: opacity,
            target: opacity,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

impl Default for ScreenFade {
    /// Starts black so the first level fades in.
    fn default() -> Self {
        Self::with_opacity(OPAQUE)
    }
}

impl FadeSink for ScreenFade {
    fn start_fade(&mut self, target_opacity: f32, duration_seconds: f32) {
        self.from = self.opacity;
        self.target = target_opacity.clamp(CLEAR, OPAQUE);
        self.duration = duration_seconds.max(0.0);
        self.elapsed = 0.0;
        if self.duration == 0.0 {
            self.opacity = self.target;
        }
    }

    fn advance(&mut self, dt_seconds: f32) {
        if self.is_complete() {
            return;
        }
        self.elapsed = (self.elapsed + dt_seconds).min(self.duration);
        let t = self.elapsed / self.duration;
        self.opacity = self.from + (self.target - self.from) * t;
        if self.is_complete() {
            self.opacity = self.target;
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}
