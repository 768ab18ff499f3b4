use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{Rgba8, TimeWindow};
use crate::model::track::Track;

/// Value that can be stored in a flat `f64` attribute buffer.
pub trait AttributeValue: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Number of `f64` components per vertex.
    const SIZE: usize;

    /// Append the components of `self`.
    fn write(self, out: &mut Vec<f64>);

    /// Rebuild a value from exactly [`Self::SIZE`] components.
    fn read(values: &[f64]) -> Self;

    /// Bit-exact representation used in update-trigger keys.
    fn trigger_bits(self, out: &mut Vec<i64>);
}

impl AttributeValue for f64 {
    const SIZE: usize = 1;

    fn write(self, out: &mut Vec<f64>) {
        out.push(self);
    }

    fn read(values: &[f64]) -> Self {
        values.first().copied().unwrap_or(f64::NAN)
    }

    fn trigger_bits(self, out: &mut Vec<i64>) {
        out.push(self.to_bits() as i64);
    }
}

impl AttributeValue for Rgba8 {
    const SIZE: usize = 4;

    fn write(self, out: &mut Vec<f64>) {
        out.extend(self.to_array().map(f64::from));
    }

    fn read(values: &[f64]) -> Self {
        let c = |i: usize| -> u8 {
            let v = values.get(i).copied().unwrap_or(0.0);
            if v.is_finite() {
                v.round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        };
        Rgba8::new(c(0), c(1), c(2), c(3))
    }

    fn trigger_bits(self, out: &mut Vec<i64>) {
        out.extend(self.to_array().map(i64::from));
    }
}

/// Change key for an accessor. Attributes fed by an accessor are recomputed only when its key
/// changes between updates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TriggerKey(pub Vec<i64>);

impl From<Vec<i64>> for TriggerKey {
    fn from(v: Vec<i64>) -> Self {
        Self(v)
    }
}

impl From<i64> for TriggerKey {
    fn from(v: i64) -> Self {
        Self(vec![v])
    }
}

/// Per-waypoint value function.
pub type VertexFn<T> = Arc<dyn Fn(&Track) -> Vec<T> + Send + Sync>;

/// Picks one value per waypoint for a path attribute (color, width).
#[derive(Clone)]
pub enum Accessor<T> {
    /// Same value for every waypoint.
    Constant(T),
    /// Caller-supplied function; recomputed when `trigger` changes.
    PerVertex {
        /// Value function, one value per waypoint.
        f: VertexFn<T>,
        /// Caller-chosen change key.
        trigger: TriggerKey,
    },
    /// Two values selected by each waypoint's timestamp against a highlight window.
    Highlight(HighlightAccessor<T>),
}

/// Selects `inside` for timestamps within `window` (inclusive) and `outside` otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightAccessor<T> {
    /// Highlight window.
    pub window: TimeWindow,
    /// Value for highlighted times.
    pub inside: T,
    /// Value for every other time.
    pub outside: T,
}

impl<T: AttributeValue> HighlightAccessor<T> {
    /// Build a highlight accessor.
    pub fn new(window: TimeWindow, inside: T, outside: T) -> Self {
        Self {
            window,
            inside,
            outside,
        }
    }

    /// Value at a (possibly interpolated) time.
    pub fn value_at(&self, t: f64) -> T {
        if self.window.contains(t) {
            self.inside
        } else {
            self.outside
        }
    }
}

impl<T: AttributeValue> Accessor<T> {
    /// Wrap a per-waypoint function with an empty trigger key.
    pub fn per_vertex(f: impl Fn(&Track) -> Vec<T> + Send + Sync + 'static) -> Self {
        Self::PerVertex {
            f: Arc::new(f),
            trigger: TriggerKey::default(),
        }
    }

    /// Highlight accessor shorthand.
    pub fn highlight(window: TimeWindow, inside: T, outside: T) -> Self {
        Self::Highlight(HighlightAccessor::new(window, inside, outside))
    }

    /// Replace the trigger key of a [`Accessor::PerVertex`]; other variants derive their own.
    pub fn with_trigger(self, key: impl Into<TriggerKey>) -> Self {
        match self {
            Self::PerVertex { f, .. } => Self::PerVertex {
                f,
                trigger: key.into(),
            },
            other => other,
        }
    }

    /// Current change key.
    ///
    /// A highlight accessor is keyed on its two window bounds followed by its two values.
    pub fn trigger_key(&self) -> TriggerKey {
        let mut bits = Vec::new();
        match self {
            Self::Constant(v) => {
                bits.push(0);
                v.trigger_bits(&mut bits);
            }
            Self::PerVertex { trigger, .. } => {
                bits.push(1);
                bits.extend_from_slice(&trigger.0);
            }
            Self::Highlight(h) => {
                bits.push(2);
                bits.push(h.window.start);
                bits.push(h.window.end);
                h.inside.trigger_bits(&mut bits);
                h.outside.trigger_bits(&mut bits);
            }
        }
        TriggerKey(bits)
    }

    /// The highlight accessor, if this is one.
    pub fn as_highlight(&self) -> Option<&HighlightAccessor<T>> {
        match self {
            Self::Highlight(h) => Some(h),
            _ => None,
        }
    }

    /// Append one value per waypoint of `track`.
    pub fn evaluate(&self, track: &Track, out: &mut Vec<f64>) {
        match self {
            Self::Constant(v) => {
                for _ in &track.waypoints {
                    v.write(out);
                }
            }
            Self::PerVertex { f, .. } => {
                for v in f(track) {
                    v.write(out);
                }
            }
            Self::Highlight(h) => {
                for w in &track.waypoints {
                    h.value_at(w.timestamp as f64).write(out);
                }
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::PerVertex { trigger, .. } => f
                .debug_struct("PerVertex")
                .field("trigger", trigger)
                .finish_non_exhaustive(),
            Self::Highlight(h) => f.debug_tuple("Highlight").field(h).finish(),
        }
    }
}

/// Reads one timestamp per waypoint; defaults to the waypoint timestamps.
#[derive(Clone)]
pub struct TimestampAccessor {
    f: Arc<dyn Fn(&Track) -> Vec<i64> + Send + Sync>,
    trigger: TriggerKey,
}

impl TimestampAccessor {
    /// Custom timestamp function with a change key.
    pub fn new(
        f: impl Fn(&Track) -> Vec<i64> + Send + Sync + 'static,
        trigger: impl Into<TriggerKey>,
    ) -> Self {
        Self {
            f: Arc::new(f),
            trigger: trigger.into(),
        }
    }

    /// Timestamps for `track`.
    pub fn evaluate(&self, track: &Track) -> Vec<i64> {
        (self.f)(track)
    }

    /// Current change key.
    pub fn trigger_key(&self) -> TriggerKey {
        self.trigger.clone()
    }
}

impl Default for TimestampAccessor {
    fn default() -> Self {
        Self::new(Track::timestamps, TriggerKey::default())
    }
}

impl fmt::Debug for TimestampAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampAccessor")
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/accessor.rs"]
mod tests;
