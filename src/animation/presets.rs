use std::collections::BTreeMap;

use crate::{
    animation::anim::{Animation, Direction, FillMode, Property, Repeat, Timing, Tween},
    animation::ease::Ease,
    foundation::error::{ClipweaveError, ClipweaveResult},
};

/// Where a preset track is pinned inside its element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Anchor {
    /// Starts with the element.
    Start,
    /// Ends with the element.
    End,
}

/// One property animation inside a [`Preset`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PresetTrack {
    /// Target property.
    pub property: Property,
    /// Start value.
    pub from: f64,
    /// End value.
    pub to: f64,
    /// Iteration length in seconds; `None` spans the whole element.
    pub duration: Option<f64>,
    /// Pinning.
    pub anchor: Anchor,
    /// Easing.
    pub easing: Ease,
    /// Iteration count.
    pub repeat: Repeat,
    /// Direction.
    pub direction: Direction,
}

/// Length of the built-in fade and zoom transitions, in seconds.
const TRANSITION_SECS: f64 = 0.5;
/// Half period of the built-in looping presets, in seconds.
const BEAT_SECS: f64 = 0.5;

impl PresetTrack {
    fn new(property: Property, from: f64, to: f64, duration: Option<f64>, easing: Ease) -> Self {
        Self {
            property,
            from,
            to,
            duration,
            anchor: Anchor::Start,
            easing,
            repeat: Repeat::default(),
            direction: Direction::Normal,
        }
    }

    /// Spans the whole element.
    fn whole(property: Property, from: f64, to: f64, easing: Ease) -> Self {
        Self::new(property, from, to, None, easing)
    }

    fn timed(property: Property, from: f64, to: f64, secs: f64, easing: Ease) -> Self {
        Self::new(property, from, to, Some(secs), easing)
    }

    fn intro(property: Property, from: f64, to: f64) -> Self {
        Self::timed(property, from, to, TRANSITION_SECS, Ease::EaseOut)
    }

    fn outro(property: Property, from: f64, to: f64) -> Self {
        Self {
            anchor: Anchor::End,
            ..Self::intro(property, from, to)
        }
    }

    fn looping(property: Property, from: f64, to: f64, easing: Ease) -> Self {
        Self {
            repeat: Repeat::Infinite,
            direction: Direction::Alternate,
            ..Self::new(property, from, to, Some(BEAT_SECS), easing)
        }
    }

    fn instantiate(&self, element_duration: f64) -> Animation {
        let duration = self
            .duration
            .unwrap_or(element_duration)
            .min(element_duration);
        let start_time = match self.anchor {
            Anchor::Start => 0.0,
            Anchor::End => (element_duration - duration).max(0.0),
        };
        Animation::Tween(Tween {
            property: self.property,
            from: self.from,
            to: self.to,
            easing: self.easing,
            timing: Timing {
                start_time,
                duration: Some(duration),
                repeat: self.repeat,
                direction: self.direction,
                fill: match self.anchor {
                    // An outro must not affect the element before it starts.
                    Anchor::End => FillMode::Forwards,
                    Anchor::Start => FillMode::Both,
                },
            },
        })
    }
}

/// A named bundle of animations.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Preset {
    /// Registration name.
    pub name: String,
    /// Property animations.
    pub tracks: Vec<PresetTrack>,
}

impl Preset {
    /// Concrete animations for an element lasting `element_duration` seconds.
    pub fn instantiate(&self, element_duration: f64) -> Vec<Animation> {
        self.tracks
            .iter()
            .map(|t| t.instantiate(element_duration))
            .collect()
    }
}

/// Immutable name -> preset table, built once and shared by reference.
#[derive(Clone, Debug, Default)]
pub struct PresetTable {
    presets: BTreeMap<String, Preset>,
}

/// Builder for [`PresetTable`]; rejects duplicate names.
#[derive(Debug, Default)]
pub struct PresetTableBuilder {
    presets: BTreeMap<String, Preset>,
}

impl PresetTableBuilder {
    /// Add a preset. Registering a name twice is an error.
    pub fn register(mut self, preset: Preset) -> ClipweaveResult<Self> {
        if self.presets.contains_key(&preset.name) {
            return Err(ClipweaveError::validation(format!(
                "animation preset '{}' is registered twice",
                preset.name
            )));
        }
        self.presets.insert(preset.name.clone(), preset);
        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> PresetTable {
        PresetTable {
            presets: self.presets,
        }
    }
}

impl PresetTable {
    /// Start an empty table.
    pub fn builder() -> PresetTableBuilder {
        PresetTableBuilder::default()
    }

    /// The built-in presets.
    pub fn builtin() -> ClipweaveResult<Self> {
        use Property::{Opacity, RotateY, Rotation, Scale};

        let presets = [
            ("fadeIn", vec![PresetTrack::intro(Opacity, 0.0, 1.0)]),
            ("fadeOut", vec![PresetTrack::outro(Opacity, 1.0, 0.0)]),
            (
                "zoomIn",
                vec![
                    PresetTrack::intro(Scale, 0.5, 1.0),
                    PresetTrack::intro(Opacity, 0.0, 1.0),
                ],
            ),
            (
                "zoomOut",
                vec![
                    PresetTrack::outro(Scale, 1.0, 0.5),
                    PresetTrack::outro(Opacity, 1.0, 0.0),
                ],
            ),
            (
                "kenBurns",
                vec![PresetTrack::whole(Scale, 1.0, 1.2, Ease::Linear)],
            ),
            (
                "spin",
                vec![PresetTrack::whole(Rotation, 0.0, 360.0, Ease::EaseInOut)],
            ),
            ("flipIn", vec![PresetTrack::intro(RotateY, 90.0, 0.0)]),
            (
                "bounceIn",
                vec![PresetTrack::timed(Scale, 0.0, 1.0, 1.0, Ease::Bounce)],
            ),
            (
                "popIn",
                vec![PresetTrack::timed(Scale, 0.0, 1.0, 1.0, Ease::Elastic)],
            ),
            (
                "pulse",
                vec![PresetTrack::looping(Scale, 1.0, 1.1, Ease::EaseInOut)],
            ),
            (
                "blink",
                vec![PresetTrack::looping(Opacity, 1.0, 0.0, Ease::Linear)],
            ),
        ];

        presets
            .into_iter()
            .try_fold(Self::builder(), |b, (name, tracks)| {
                b.register(Preset {
                    name: name.to_string(),
                    tracks,
                })
            })
            .map(PresetTableBuilder::build)
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Instantiate a preset, failing on unknown names.
    pub fn instantiate(
        &self,
        name: &str,
        element_duration: f64,
    ) -> ClipweaveResult<Vec<Animation>> {
        self.get(name)
            .map(|p| p.instantiate(element_duration))
            .ok_or_else(|| ClipweaveError::validation(format!("unknown animation preset '{name}'")))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/presets.rs"]
mod tests;
