use crate::{
    animation::ease::Ease,
    foundation::error::{ClipweaveError, ClipweaveResult},
    foundation::math::lerp,
};

/// Animatable element property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    /// Horizontal offset in pixels.
    X,
    /// Vertical offset in pixels.
    Y,
    /// Uniform scale; writes both axes.
    Scale,
    /// Horizontal scale factor.
    ScaleX,
    /// Vertical scale factor.
    ScaleY,
    /// 2D rotation in degrees.
    Rotation,
    /// Rotation about the X axis in degrees (foreshortens vertically).
    RotateX,
    /// Rotation about the Y axis in degrees (foreshortens horizontally).
    RotateY,
    /// Rotation about the Z axis in degrees, added to `rotation`.
    RotateZ,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Depth offset in pixels; positive values move towards the viewer.
    TranslateZ,
}

/// What an animation contributes outside its active window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Nothing outside the window.
    None,
    /// Hold the final value after the window.
    Forwards,
    /// Hold the initial value before the window.
    Backwards,
    /// Hold on both sides.
    #[default]
    Both,
}

impl FillMode {
    fn holds_before(self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }

    fn holds_after(self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }
}

/// Playback direction per iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Every iteration runs `0 -> 1`.
    #[default]
    Normal,
    /// Every iteration runs `1 -> 0`.
    Reverse,
    /// Even iterations forward, odd iterations backward.
    Alternate,
    /// Even iterations backward, odd iterations forward.
    AlternateReverse,
}

/// Iteration count.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum Repeat {
    /// Finite, possibly fractional, iteration count (`> 0`).
    Count(f64),
    /// Never ends.
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Count(1.0)
    }
}

impl<'de> serde::Deserialize<'de> for Repeat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(f64),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(n) => Ok(Self::Count(n)),
            Repr::Word(w) if w.eq_ignore_ascii_case("infinite") => Ok(Self::Infinite),
            Repr::Word(w) => Err(serde::de::Error::custom(format!(
                "repeat must be a number or \"infinite\", got \"{w}\""
            ))),
        }
    }
}

/// Scheduling shared by tweens and keyframe animations.
///
/// Times are element-local seconds.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Offset from the element start.
    #[serde(default, alias = "start", alias = "delay")]
    pub start_time: f64,
    /// Length of one iteration; `None` means "the owning element's duration".
    #[serde(default)]
    pub duration: Option<f64>,
    /// Iteration count.
    #[serde(default)]
    pub repeat: Repeat,
    /// Direction per iteration.
    #[serde(default)]
    pub direction: Direction,
    /// Behavior outside the active window.
    #[serde(default, alias = "fillMode")]
    pub fill: FillMode,
}

impl Timing {
    /// One forward iteration of `duration` seconds starting at `start_time`.
    pub fn new(start_time: f64, duration: f64) -> Self {
        Self {
            start_time,
            duration: Some(duration),
            ..Self::default()
        }
    }

    fn iteration_duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// End of the active window, `None` for infinite repeats.
    pub fn end_time(&self) -> Option<f64> {
        match self.repeat {
            Repeat::Count(n) => Some(self.start_time + self.iteration_duration() * n),
            Repeat::Infinite => None,
        }
    }

    fn validate(&self) -> ClipweaveResult<()> {
        if !self.start_time.is_finite() {
            return Err(ClipweaveError::animation("startTime must be finite"));
        }
        if let Some(d) = self.duration
            && (!d.is_finite() || d < 0.0)
        {
            return Err(ClipweaveError::animation(format!(
                "duration must be finite and >= 0, got {d}"
            )));
        }
        if let Repeat::Count(n) = self.repeat
            && (!n.is_finite() || n <= 0.0)
        {
            return Err(ClipweaveError::animation(format!(
                "repeat count must be finite and > 0, got {n}"
            )));
        }
        Ok(())
    }

    /// Directed iteration progress in `[0, 1]` at element-local time `t`, or `None` when the
    /// fill mode says the animation contributes nothing.
    pub fn progress(&self, t: f64) -> Option<f64> {
        let d = self.iteration_duration();
        if t < self.start_time {
            return self.fill.holds_before().then(|| self.directed(0, 0.0));
        }

        if let Some(end) = self.end_time() {
            if t > end {
                return self.fill.holds_after().then(|| self.final_progress());
            }
            if t == end {
                return Some(self.final_progress());
            }
        }

        if d <= 0.0 {
            return Some(self.final_progress());
        }

        let local = (t - self.start_time) / d;
        let iteration = local.floor();
        let p = (local - iteration).clamp(0.0, 1.0);
        Some(self.directed(iteration as u64, p))
    }

    fn final_progress(&self) -> f64 {
        match self.repeat {
            Repeat::Count(n) => {
                let whole = n.floor();
                let frac = n - whole;
                if frac > 0.0 {
                    self.directed(whole as u64, frac)
                } else {
                    self.directed((whole as u64).saturating_sub(1), 1.0)
                }
            }
            Repeat::Infinite => self.directed(0, 1.0),
        }
    }

    fn directed(&self, iteration: u64, p: f64) -> f64 {
        let odd = iteration % 2 == 1;
        match self.direction {
            Direction::Normal => p,
            Direction::Reverse => 1.0 - p,
            Direction::Alternate => {
                if odd {
                    1.0 - p
                } else {
                    p
                }
            }
            Direction::AlternateReverse => {
                if odd {
                    p
                } else {
                    1.0 - p
                }
            }
        }
    }
}

/// Two-stop animation: `lerp(from, to, ease(progress))`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tween {
    /// Target property.
    pub property: Property,
    /// Value at progress 0.
    pub from: f64,
    /// Value at progress 1.
    pub to: f64,
    /// Easing applied to progress.
    #[serde(default, alias = "ease")]
    pub easing: Ease,
    /// Scheduling.
    #[serde(flatten)]
    pub timing: Timing,
}

impl Tween {
    /// Sample at element-local time `t`.
    pub fn sample(&self, t: f64) -> Option<f64> {
        let p = self.timing.progress(t)?;
        Some(lerp(self.from, self.to, self.easing.apply(p)))
    }
}

/// One stop of a [`KeyframeAnimation`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Position within the iteration, in `[0, 1]`.
    #[serde(alias = "t")]
    pub time: f64,
    /// Value at `time`.
    pub value: f64,
    /// Easing used on the segment arriving at this keyframe.
    #[serde(default, alias = "ease")]
    pub easing: Option<Ease>,
}

/// Multi-stop animation. Keyframes are sorted by `time` on construction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "KeyframeAnimationDef", rename_all = "camelCase")]
pub struct KeyframeAnimation {
    property: Property,
    keyframes: Vec<Keyframe>,
    #[serde(flatten)]
    timing: Timing,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyframeAnimationDef {
    property: Property,
    keyframes: Vec<Keyframe>,
    #[serde(flatten)]
    timing: Timing,
}

impl TryFrom<KeyframeAnimationDef> for KeyframeAnimation {
    type Error = ClipweaveError;

    fn try_from(def: KeyframeAnimationDef) -> Result<Self, Self::Error> {
        Self::new(def.property, def.keyframes, def.timing)
    }
}

impl KeyframeAnimation {
    /// Validate and sort keyframes (stable, so equal times keep their order).
    pub fn new(
        property: Property,
        mut keyframes: Vec<Keyframe>,
        timing: Timing,
    ) -> ClipweaveResult<Self> {
        if keyframes.is_empty() {
            return Err(ClipweaveError::animation(
                "keyframe animation needs at least one keyframe",
            ));
        }
        for k in &keyframes {
            if !(0.0..=1.0).contains(&k.time) {
                return Err(ClipweaveError::animation(format!(
                    "keyframe time must be within [0, 1], got {}",
                    k.time
                )));
            }
            if !k.value.is_finite() {
                return Err(ClipweaveError::animation("keyframe value must be finite"));
            }
        }
        timing.validate()?;
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self {
            property,
            keyframes,
            timing,
        })
    }

    /// Target property.
    pub fn property(&self) -> Property {
        self.property
    }

    /// Sorted keyframes.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Scheduling.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Sample at element-local time `t`.
    pub fn sample(&self, t: f64) -> Option<f64> {
        let p = self.timing.progress(t)?;
        Some(self.value_at_progress(p))
    }

    fn value_at_progress(&self, p: f64) -> f64 {
        let keys = &self.keyframes;
        let idx = keys.partition_point(|k| k.time <= p);
        if idx == 0 {
            return keys[0].value;
        }
        if idx >= keys.len() {
            return keys[keys.len() - 1].value;
        }

        let a = &keys[idx - 1];
        let b = &keys[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        let local = ((p - a.time) / span).clamp(0.0, 1.0);
        let ease = b.easing.or(a.easing).unwrap_or(Ease::Linear);
        lerp(a.value, b.value, ease.apply(local))
    }
}

/// Any property animation attached to an element.
///
/// In JSON an object with a `keyframes` key is a [`KeyframeAnimation`], anything else a
/// [`Tween`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Animation {
    /// Multi-stop animation.
    Keyframes(KeyframeAnimation),
    /// Two-stop animation.
    Tween(Tween),
}

impl<'de> serde::Deserialize<'de> for Animation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
        let parsed = if value.get("keyframes").is_some() {
            serde_json::from_value(value).map(Self::Keyframes)
        } else {
            serde_json::from_value(value).map(Self::Tween)
        };
        parsed.map_err(D::Error::custom)
    }
}

impl Animation {
    /// Target property.
    pub fn property(&self) -> Property {
        match self {
            Self::Keyframes(k) => k.property,
            Self::Tween(t) => t.property,
        }
    }

    /// Sample at element-local time `t`; `None` when outside every fill window.
    pub fn sample(&self, t: f64) -> Option<f64> {
        match self {
            Self::Keyframes(k) => k.sample(t),
            Self::Tween(tw) => tw.sample(t),
        }
    }

    /// Validate static invariants.
    pub fn validate(&self) -> ClipweaveResult<()> {
        match self {
            Self::Keyframes(k) => k.timing.validate(),
            Self::Tween(tw) => {
                if !tw.from.is_finite() || !tw.to.is_finite() {
                    return Err(ClipweaveError::animation("tween from/to must be finite"));
                }
                tw.timing.validate()
            }
        }
    }

    /// Fill in a missing iteration duration, typically with the owning element's duration.
    pub fn with_default_duration(mut self, duration: f64) -> Self {
        let timing = match &mut self {
            Self::Keyframes(k) => &mut k.timing,
            Self::Tween(tw) => &mut tw.timing,
        };
        if timing.duration.is_none() {
            timing.duration = Some(duration);
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
