//! Keyframe animation engine.
//!
//! Each animated node has one [`Timeline`] of keyframes kept sorted by time.
//! The engine owns a looping playhead; on every step it evaluates each
//! timeline at the playhead and pushes the result to a [`NodeUpdateSink`].
//! Those writes never enter undo history.
//!
//! Evaluation is stateless: the interpolation fraction is re-derived from the
//! absolute playhead position on every frame, so accumulated frame deltas
//! cannot drift the animation.
//!
//! The host drives the engine through a [`FrameScheduler`]: starting
//! playback requests frame callbacks, and each callback calls
//! [`AnimationEngine::tick`] with the host's clock.

use crate::config::AnimationConfig;
use compo_core::{Color, KeyframeId, NodeChanges, NodeId, Position, Size, TimelineId};
use serde::{Deserialize, Serialize};

// ─── Data ────────────────────────────────────────────────────────────────

/// Properties a keyframe may set. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyframeProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl KeyframeProps {
    /// The props as a node patch, unchanged.
    pub fn to_changes(&self) -> NodeChanges {
        NodeChanges {
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            opacity: self.opacity,
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: KeyframeId,
    /// Milliseconds from the start of the loop.
    pub time: f64,
    pub properties: KeyframeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub id: TimelineId,
    pub object_id: NodeId,
    /// Sorted by `time`. Equal times keep insertion order.
    pub keyframes: Vec<Keyframe>,
    pub duration: f64,
}

impl Timeline {
    /// Insert after every keyframe with `time <= keyframe.time`, so the most
    /// recently added of several equal-time keyframes is the one a segment
    /// starts from.
    fn insert_sorted(&mut self, keyframe: Keyframe) {
        let at = self.keyframes.partition_point(|k| k.time <= keyframe.time);
        self.keyframes.insert(at, keyframe);
    }

    fn position_of(&self, id: KeyframeId) -> Option<usize> {
        self.keyframes.iter().position(|k| k.id == id)
    }

    /// The patch this timeline contributes at playhead `t`, if any.
    pub fn evaluate(&self, t: f64, hold_last: bool) -> Option<NodeChanges> {
        let end = self.keyframes.partition_point(|k| k.time <= t);
        if end == self.keyframes.len() {
            // playhead at or past the last keyframe
            return hold_last
                .then(|| self.keyframes.last())
                .flatten()
                .map(|k| k.properties.to_changes());
        }
        if end == 0 {
            return None;
        }
        let (a, b) = (&self.keyframes[end - 1], &self.keyframes[end]);
        let fraction = (t - a.time) / (b.time - a.time);
        Some(interpolate(&a.properties, &b.properties, fraction))
    }
}

/// Linear interpolation of numeric properties present on both ends; colors
/// are taken from `a` as they are.
pub fn interpolate(a: &KeyframeProps, b: &KeyframeProps, fraction: f64) -> NodeChanges {
    let lerp = |x: f64, y: f64| x + (y - x) * fraction;
    let both = |x: Option<f64>, y: Option<f64>| Some(lerp(x?, y?));

    NodeChanges {
        position: a
            .position
            .zip(b.position)
            .map(|(p, q)| Position::new(lerp(p.x, q.x), lerp(p.y, q.y))),
        size: a
            .size
            .zip(b.size)
            .map(|(p, q)| Size::new(lerp(p.width, q.width), lerp(p.height, q.height))),
        rotation: both(a.rotation, b.rotation),
        opacity: both(a.opacity, b.opacity),
        stroke_width: both(a.stroke_width, b.stroke_width),
        fill: a.fill,
        stroke: a.stroke,
        ..Default::default()
    }
}

// ─── Host seams ──────────────────────────────────────────────────────────

/// Receives interpolated patches. Implementations must not record them as
/// undoable edits.
pub trait NodeUpdateSink {
    fn update_node(&mut self, id: NodeId, changes: NodeChanges);
}

/// Collects patches for a caller that applies them in one go.
impl NodeUpdateSink for Vec<(NodeId, NodeChanges)> {
    fn update_node(&mut self, id: NodeId, changes: NodeChanges) {
        self.push((id, changes));
    }
}

/// Handle for a registered frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Host frame loop (e.g. `requestAnimationFrame`). While a token is live the
/// host calls [`AnimationEngine::tick`] once per frame.
pub trait FrameScheduler {
    fn request_frames(&mut self) -> FrameToken;
    fn cancel(&mut self, token: FrameToken);
}

/// Immutable view for the UI, refreshed at most once per
/// `snapshot_interval_ms` of playhead travel while playing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationSnapshot {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub timelines: Vec<Timeline>,
}

// ─── Engine ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AnimationEngine {
    config: AnimationConfig,
    is_playing: bool,
    current_time: f64,
    timelines: Vec<Timeline>,
    frame: Option<FrameToken>,
    last_tick: Option<f64>,
    since_snapshot: f64,
    snapshot: AnimationSnapshot,
}

impl AnimationEngine {
    /// A non-positive or non-finite loop length falls back to the default.
    pub fn new(mut config: AnimationConfig) -> Self {
        if !(config.duration_ms > 0.0 && config.duration_ms.is_finite()) {
            let fallback = AnimationConfig::default().duration_ms;
            log::warn!(
                "animation: duration {}ms is not positive, using {fallback}ms",
                config.duration_ms
            );
            config.duration_ms = fallback;
        }
        let mut engine = Self {
            config,
            is_playing: false,
            current_time: 0.0,
            timelines: Vec::new(),
            frame: None,
            last_tick: None,
            since_snapshot: 0.0,
            snapshot: AnimationSnapshot::default(),
        };
        engine.refresh_snapshot();
        engine
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.config.duration_ms
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn timeline_for(&self, object: NodeId) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.object_id == object)
    }

    /// Latest throttled view.
    pub fn snapshot(&self) -> &AnimationSnapshot {
        &self.snapshot
    }

    /// Change the loop length. Non-positive values are ignored.
    pub fn set_duration(&mut self, duration_ms: f64) {
        if !(duration_ms > 0.0 && duration_ms.is_finite()) {
            return;
        }
        self.config.duration_ms = duration_ms;
        self.current_time = self.current_time.rem_euclid(duration_ms);
        for timeline in &mut self.timelines {
            timeline.duration = duration_ms;
        }
        self.refresh_snapshot();
    }

    // ─── Keyframes ───────────────────────────────────────────────────────

    /// Add a keyframe for `object`, creating its timeline on first use.
    pub fn add_keyframe(&mut self, object: NodeId, time: f64, properties: KeyframeProps) -> KeyframeId {
        let duration = self.config.duration_ms;
        let index = match self.timelines.iter().position(|t| t.object_id == object) {
            Some(index) => index,
            None => {
                self.timelines.push(Timeline {
                    id: TimelineId::with_prefix("timeline"),
                    object_id: object,
                    keyframes: Vec::new(),
                    duration,
                });
                self.timelines.len() - 1
            }
        };

        let id = KeyframeId::with_prefix("kf");
        self.timelines[index].insert_sorted(Keyframe {
            id,
            time: time.max(0.0),
            properties,
        });
        log::debug!("animation: keyframe {id} at {time}ms for {object}");
        self.refresh_snapshot();
        id
    }

    /// Replace a keyframe's properties, and move it when `time` is given.
    pub fn update_keyframe(
        &mut self,
        timeline: TimelineId,
        keyframe: KeyframeId,
        properties: KeyframeProps,
        time: Option<f64>,
    ) -> bool {
        let Some(line) = self.timelines.iter_mut().find(|t| t.id == timeline) else {
            return false;
        };
        let Some(pos) = line.position_of(keyframe) else {
            return false;
        };
        match time {
            Some(time) => {
                let mut moved = line.keyframes.remove(pos);
                moved.time = time.max(0.0);
                moved.properties = properties;
                line.insert_sorted(moved);
            }
            None => line.keyframes[pos].properties = properties,
        }
        self.refresh_snapshot();
        true
    }

    pub fn delete_keyframe(&mut self, timeline: TimelineId, keyframe: KeyframeId) -> bool {
        let Some(line) = self.timelines.iter_mut().find(|t| t.id == timeline) else {
            return false;
        };
        let Some(pos) = line.position_of(keyframe) else {
            return false;
        };
        line.keyframes.remove(pos);
        self.refresh_snapshot();
        true
    }

    /// Drop the timelines of deleted nodes. Returns how many were removed.
    pub fn remove_timelines_for(&mut self, objects: &[NodeId]) -> usize {
        self.take_timelines_for(objects).len()
    }

    /// Detach the timelines of `objects` and hand them back, so a caller can
    /// reattach them with [`restore_timelines`](Self::restore_timelines).
    pub fn take_timelines_for(&mut self, objects: &[NodeId]) -> Vec<Timeline> {
        let (taken, kept): (Vec<Timeline>, Vec<Timeline>) = std::mem::take(&mut self.timelines)
            .into_iter()
            .partition(|t| objects.contains(&t.object_id));
        self.timelines = kept;
        if !taken.is_empty() {
            self.refresh_snapshot();
        }
        taken
    }

    /// Reattach detached timelines. Keyframes keep their times; the loop
    /// length follows the current duration.
    pub fn restore_timelines(&mut self, timelines: Vec<Timeline>) {
        if timelines.is_empty() {
            return;
        }
        let duration = self.config.duration_ms;
        for mut timeline in timelines {
            if self.timelines.iter().any(|t| t.object_id == timeline.object_id) {
                log::warn!("animation: {} already has a timeline", timeline.object_id);
                continue;
            }
            timeline.duration = duration;
            self.timelines.push(timeline);
        }
        self.refresh_snapshot();
    }

    // ─── Playback ────────────────────────────────────────────────────────

    /// Start or pause playback.
    pub fn toggle_playback(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.is_playing {
            self.pause(scheduler);
        } else {
            self.play(scheduler);
        }
    }

    pub fn play(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.is_playing {
            return;
        }
        self.is_playing = true;
        self.last_tick = None;
        self.frame = Some(scheduler.request_frames());
        log::debug!("animation: play from {}ms", self.current_time);
        self.refresh_snapshot();
    }

    pub fn pause(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel_frames(scheduler);
        if self.is_playing {
            self.is_playing = false;
            log::debug!("animation: paused at {}ms", self.current_time);
        }
        self.refresh_snapshot();
    }

    /// Pause and rewind to zero. Nothing is written to the nodes.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.pause(scheduler);
        self.current_time = 0.0;
        self.refresh_snapshot();
    }

    /// Release the frame callback when the owner goes away.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel_frames(scheduler);
        self.is_playing = false;
    }

    /// Host frame callback. Ticks arriving after cancellation write nothing.
    pub fn tick(&mut self, now_ms: f64, sink: &mut dyn NodeUpdateSink) {
        if self.frame.is_none() {
            return;
        }
        let elapsed = self.last_tick.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_tick = Some(now_ms);
        self.advance(elapsed, sink);
    }

    /// Move the playhead by `elapsed_ms` (looping) and write the evaluated
    /// values. No-op while paused.
    pub fn advance(&mut self, elapsed_ms: f64, sink: &mut dyn NodeUpdateSink) {
        if !self.is_playing {
            return;
        }
        self.current_time = (self.current_time + elapsed_ms).rem_euclid(self.config.duration_ms);
        self.evaluate(sink);

        self.since_snapshot += elapsed_ms;
        if self.since_snapshot >= self.config.snapshot_interval_ms {
            self.refresh_snapshot();
        }
    }

    /// Scrub: jump to `time_ms` and apply it right away, playing or not.
    pub fn set_current_time(&mut self, time_ms: f64, sink: &mut dyn NodeUpdateSink) {
        self.current_time = time_ms.rem_euclid(self.config.duration_ms);
        self.evaluate(sink);
        self.refresh_snapshot();
    }

    /// Write every timeline's value at the current playhead.
    pub fn evaluate(&self, sink: &mut dyn NodeUpdateSink) {
        for timeline in &self.timelines {
            if let Some(changes) = timeline.evaluate(self.current_time, self.config.hold_last_keyframe)
                && !changes.is_empty()
            {
                sink.update_node(timeline.object_id, changes);
            }
        }
    }

    fn cancel_frames(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(token) = self.frame.take() {
            scheduler.cancel(token);
        }
        self.last_tick = None;
    }

    fn refresh_snapshot(&mut self) {
        self.since_snapshot = 0.0;
        self.snapshot = AnimationSnapshot {
            is_playing: self.is_playing,
            current_time: self.current_time,
            duration: self.config.duration_ms,
            timelines: self.timelines.clone(),
        };
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}
