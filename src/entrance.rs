//! Spring-driven pop-in of the output surface.
//!
//! When the canvas first appears it fades in, grows from half size, and
//! untwists from -15°, all following one damped spring.

/// Damped spring parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 300.0,
            damping: 20.0,
            mass: 1.0,
        }
    }
}

/// Transform applied to the painted frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntranceTransform {
    /// 0.0 (invisible) to 1.0
    pub opacity: f64,
    /// Uniform scale around the surface center
    pub scale: f64,
    /// Rotation around the surface center, in degrees
    pub rotation_deg: f64,
}

impl EntranceTransform {
    pub const START: EntranceTransform = EntranceTransform {
        opacity: 0.0,
        scale: 0.5,
        rotation_deg: -15.0,
    };

    pub const IDENTITY: EntranceTransform = EntranceTransform {
        opacity: 1.0,
        scale: 1.0,
        rotation_deg: 0.0,
    };

    /// Interpolate from `START` to `IDENTITY`. `t` may overshoot 1.0.
    pub fn at(t: f64) -> Self {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Self {
            opacity: lerp(Self::START.opacity, Self::IDENTITY.opacity).clamp(0.0, 1.0),
            scale: lerp(Self::START.scale, Self::IDENTITY.scale),
            rotation_deg: lerp(Self::START.rotation_deg, Self::IDENTITY.rotation_deg),
        }
    }
}

// Integration substep and the largest frame gap we integrate over.
const MAX_SUBSTEP: f64 = 1.0 / 240.0;
const MAX_FRAME_DT: f64 = 0.1;
const REST_DELTA: f64 = 0.001;
const REST_SPEED: f64 = 0.01;

/// Entrance animation state.
#[derive(Clone, Debug)]
pub struct Entrance {
    spring: SpringConfig,
    position: f64,
    velocity: f64,
    finished: bool,
}

impl Default for Entrance {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl Entrance {
    pub fn new(spring: SpringConfig) -> Self {
        Self {
            spring,
            position: 0.0,
            velocity: 0.0,
            finished: false,
        }
    }

    /// Rewind so the entrance plays again.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.velocity = 0.0;
        self.finished = false;
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn transform(&self) -> EntranceTransform {
        if self.finished {
            EntranceTransform::IDENTITY
        } else {
            EntranceTransform::at(self.position)
        }
    }

    /// Advance by `dt` seconds and return the new transform.
    pub fn step(&mut self, dt: f64) -> EntranceTransform {
        if self.finished {
            return EntranceTransform::IDENTITY;
        }

        let mut remaining = dt.clamp(0.0, MAX_FRAME_DT);
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP);
            let force = -self.spring.stiffness * (self.position - 1.0) - self.spring.damping * self.velocity;
            self.velocity += force / self.spring.mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if (1.0 - self.position).abs() < REST_DELTA && self.velocity.abs() < REST_SPEED {
            self.position = 1.0;
            self.velocity = 0.0;
            self.finished = true;
        }
        self.transform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden_and_small() {
        let entrance = Entrance::default();
        assert_eq!(entrance.transform(), EntranceTransform::START);
    }

    #[test]
    fn settles_on_identity() {
        let mut entrance = Entrance::default();
        let mut frames = 0;
        while !entrance.is_finished() {
            entrance.step(1.0 / 60.0);
            frames += 1;
            assert!(frames < 120, "entrance did not settle within two seconds");
        }
        assert_eq!(entrance.transform(), EntranceTransform::IDENTITY);
    }

    #[test]
    fn underdamped_spring_overshoots_scale_not_opacity() {
        let mut entrance = Entrance::default();
        let mut max_scale: f64 = 0.0;
        for _ in 0..60 {
            let t = entrance.step(1.0 / 60.0);
            max_scale = max_scale.max(t.scale);
            assert!(t.opacity <= 1.0);
        }
        assert!(max_scale > 1.0);
    }

    #[test]
    fn reset_replays() {
        let mut entrance = Entrance::default();
        for _ in 0..200 {
            entrance.step(1.0 / 60.0);
        }
        assert!(entrance.is_finished());
        entrance.reset();
        assert_eq!(entrance.transform(), EntranceTransform::START);
    }

    #[test]
    fn long_gaps_are_capped() {
        let mut entrance = Entrance::default();
        entrance.step(5.0);
        assert!(!entrance.is_finished());
    }
}
