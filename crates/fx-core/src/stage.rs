//! Frame driver for every mounted effect.
//!
//! The stage owns each simulator exclusively. Environment changes queued on
//! the [`CapabilityDetector`] are applied at the start of a tick, before any
//! simulator moves. An effect is advanced only while its render mode is
//! [`RenderMode::Full`] and its visibility gate is open; a failing effect is
//! logged and skipped without disturbing the others.

use fnv::FnvHashMap;
use smallvec::SmallVec;

use crate::capability::{CapabilityDetector, CapabilitySignal};
use crate::content::TimelineItem;
use crate::error::{FxError, FxResult};
use crate::fallback::{select_mode, EffectKind, RenderMode};
use crate::highlight::HoverListener;
use crate::orbit::OrbitEngine;
use crate::particles::ParticleField;
use crate::theme::Theme;
use crate::timeline::TimelineNodes;
use crate::visibility::{ObserverOptions, VisibilityGate};

pub type EffectId = u32;

/// What to mount. The simulator itself is built lazily.
#[derive(Clone, Debug)]
pub enum EffectSpec {
    Particles {
        theme: Theme,
        seed: u64,
    },
    Orbit {
        labels: Vec<String>,
        radius: f32,
        theme: Theme,
    },
    Timeline {
        items: Vec<TimelineItem>,
        theme: Theme,
    },
}

impl EffectSpec {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectSpec::Particles { .. } => EffectKind::ParticleField,
            EffectSpec::Orbit { .. } => EffectKind::Orbit,
            EffectSpec::Timeline { .. } => EffectKind::Timeline,
        }
    }
}

pub enum Effect {
    Particles(ParticleField),
    Orbit(OrbitEngine),
    Timeline(TimelineNodes),
}

impl Effect {
    fn advance(&mut self, t: f32) -> FxResult<()> {
        match self {
            Effect::Particles(field) => field.advance(t),
            Effect::Orbit(orbit) => orbit.advance(t),
            Effect::Timeline(timeline) => timeline.advance(t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub id: EffectId,
    pub from: RenderMode,
    pub to: RenderMode,
}

/// What happened during one [`Stage::tick`].
#[derive(Debug, Default)]
pub struct FrameReport {
    pub advanced: usize,
    pub skipped: usize,
    pub failed: SmallVec<[EffectId; 4]>,
    pub mode_changes: SmallVec<[ModeChange; 4]>,
    /// Orbits torn down while the pointer was over a node. Their hover has
    /// ended and listeners should be told so.
    pub hover_ended: SmallVec<[EffectId; 4]>,
    /// Set when the capability signal changed at the start of this frame.
    pub signal: Option<CapabilitySignal>,
}

struct Entry {
    spec: EffectSpec,
    effect: Option<Effect>,
    gate: VisibilityGate,
    mounted_at: f64,
    mode: RenderMode,
    highlighted: Option<String>,
}

pub struct Stage {
    entries: FnvHashMap<EffectId, Entry>,
    next_id: EffectId,
    options: ObserverOptions,
    built: u32,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(ObserverOptions::default())
    }
}

impl Stage {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            entries: FnvHashMap::default(),
            next_id: 1,
            options,
            built: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of simulators constructed since the stage was created.
    pub fn simulators_built(&self) -> u32 {
        self.built
    }

    /// Mount an effect. `now` is the host clock in seconds.
    pub fn mount(&mut self, spec: EffectSpec, now: f64, signal: &CapabilitySignal) -> EffectId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let mode = select_mode(spec.kind(), signal);
        let mut entry = Entry {
            spec,
            effect: None,
            gate: VisibilityGate::new(self.options),
            mounted_at: now,
            mode,
            highlighted: None,
        };
        if mode == RenderMode::Full {
            entry.effect = Some(build_effect(&entry, signal));
            self.built += 1;
        }
        log::info!("[stage] mounted #{} {:?} as {:?}", id, entry.spec.kind(), mode);
        self.entries.insert(id, entry);
        id
    }

    /// Drop the simulator and close its gate.
    pub fn unmount(&mut self, id: EffectId) -> FxResult<()> {
        let mut entry = self.entries.remove(&id).ok_or(FxError::UnknownEffect(id))?;
        entry.gate.disconnect();
        entry.effect = None;
        log::info!("[stage] unmounted #{}", id);
        Ok(())
    }

    pub fn clear(&mut self) {
        for (_, mut entry) in self.entries.drain() {
            entry.gate.disconnect();
        }
    }

    pub fn mode(&self, id: EffectId) -> Option<RenderMode> {
        self.entries.get(&id).map(|e| e.mode)
    }

    pub fn kind(&self, id: EffectId) -> Option<EffectKind> {
        self.entries.get(&id).map(|e| e.spec.kind())
    }

    pub fn spec(&self, id: EffectId) -> Option<&EffectSpec> {
        self.entries.get(&id).map(|e| &e.spec)
    }

    pub fn gate(&self, id: EffectId) -> Option<&VisibilityGate> {
        self.entries.get(&id).map(|e| &e.gate)
    }

    pub fn gate_mut(&mut self, id: EffectId) -> FxResult<&mut VisibilityGate> {
        self.entries
            .get_mut(&id)
            .map(|e| &mut e.gate)
            .ok_or(FxError::UnknownEffect(id))
    }

    /// Feed an intersection sample to the effect's gate.
    pub fn record_visibility(&mut self, id: EffectId, intersecting: bool) -> FxResult<()> {
        self.gate_mut(id)?.record(intersecting);
        Ok(())
    }

    /// The running simulator, if the effect is in full mode.
    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.entries.get(&id).and_then(|e| e.effect.as_ref())
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.entries.get_mut(&id).and_then(|e| e.effect.as_mut())
    }

    /// Externally designated label for an orbit. Kept across rebuilds.
    pub fn set_highlighted(&mut self, id: EffectId, label: Option<&str>) -> FxResult<()> {
        let entry = self.entries.get_mut(&id).ok_or(FxError::UnknownEffect(id))?;
        entry.highlighted = label.map(str::to_string);
        if let Some(Effect::Orbit(orbit)) = entry.effect.as_mut() {
            orbit.set_highlighted(label);
        }
        Ok(())
    }

    /// Forward a pointer hover to a running orbit.
    pub fn hover_orbit(
        &mut self,
        id: EffectId,
        target: Option<usize>,
        listener: &mut dyn HoverListener,
    ) -> FxResult<()> {
        let entry = self.entries.get_mut(&id).ok_or(FxError::UnknownEffect(id))?;
        if let Some(Effect::Orbit(orbit)) = entry.effect.as_mut() {
            orbit.hover(target, listener);
        }
        Ok(())
    }

    /// Whether any effect would advance on the next tick.
    pub fn has_active(&self) -> bool {
        self.entries
            .values()
            .any(|e| e.mode == RenderMode::Full && e.gate.is_visible())
    }

    /// Run one frame at host time `now` (seconds).
    pub fn tick(&mut self, now: f64, detector: &mut CapabilityDetector) -> FrameReport {
        let mut report = FrameReport::default();
        if let Some(signal) = detector.begin_frame() {
            self.apply_signal(&signal, &mut report);
            report.signal = Some(signal);
        }

        for (&id, entry) in self.entries.iter_mut() {
            if entry.mode != RenderMode::Full || !entry.gate.is_visible() {
                report.skipped += 1;
                continue;
            }
            let Some(effect) = entry.effect.as_mut() else {
                report.skipped += 1;
                continue;
            };
            let t = (now - entry.mounted_at).max(0.0) as f32;
            match effect.advance(t) {
                Ok(()) => report.advanced += 1,
                Err(e) => {
                    log::warn!("[stage] #{} frame failed: {}", id, e);
                    report.failed.push(id);
                }
            }
        }
        report
    }

    fn apply_signal(&mut self, signal: &CapabilitySignal, report: &mut FrameReport) {
        let ids: SmallVec<[EffectId; 8]> = self.entries.keys().copied().collect();
        for id in ids {
            let Some(entry) = self.entries.get(&id) else {
                continue;
            };
            let to = select_mode(entry.spec.kind(), signal);
            let from = entry.mode;
            let stale_count = matches!(
                &entry.effect,
                Some(Effect::Particles(field)) if field.len() != signal.particle_count()
            );
            let rebuilt = if to == RenderMode::Full && (entry.effect.is_none() || stale_count) {
                Some(build_effect(entry, signal))
            } else {
                None
            };
            if rebuilt.is_some() {
                self.built += 1;
            }

            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            if to != RenderMode::Full {
                if let Some(Effect::Orbit(orbit)) = &entry.effect {
                    if let Some(node) = orbit.hovered().and_then(|i| orbit.nodes().get(i)) {
                        log::debug!("[stage] #{} hover on '{}' ends with teardown", id, node.label);
                        // the pointer no longer designates this label
                        if entry.highlighted.as_deref() == Some(node.label.as_str()) {
                            entry.highlighted = None;
                        }
                        report.hover_ended.push(id);
                    }
                }
                entry.effect = None;
            } else if let Some(effect) = rebuilt {
                entry.effect = Some(effect);
            }
            if from != to {
                log::info!("[stage] #{} {:?} -> {:?}", id, from, to);
                entry.mode = to;
                report.mode_changes.push(ModeChange { id, from, to });
            }
        }
    }
}

fn build_effect(entry: &Entry, signal: &CapabilitySignal) -> Effect {
    match &entry.spec {
        EffectSpec::Particles { theme, seed } => {
            Effect::Particles(ParticleField::new(signal.particle_count(), *theme, *seed))
        }
        EffectSpec::Orbit {
            labels,
            radius,
            theme,
        } => {
            let mut orbit = OrbitEngine::new(labels.iter().cloned(), *radius, *theme);
            orbit.set_highlighted(entry.highlighted.as_deref());
            Effect::Orbit(orbit)
        }
        EffectSpec::Timeline { items, theme } => {
            Effect::Timeline(TimelineNodes::new(items.clone(), *theme))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FixedEnvironment;

    fn detector(env: FixedEnvironment) -> CapabilityDetector {
        CapabilityDetector::new(Box::new(env))
    }

    fn particles() -> EffectSpec {
        EffectSpec::Particles {
            theme: Theme::Light,
            seed: 1,
        }
    }

    #[test]
    fn closed_gate_skips_update() {
        let mut det = detector(FixedEnvironment::accelerated());
        let mut stage = Stage::default();
        let id = stage.mount(particles(), 0.0, &det.signal());
        let report = stage.tick(0.016, &mut det);
        assert_eq!(report.advanced, 0);
        assert_eq!(report.skipped, 1);
        assert!(!stage.has_active());

        stage.record_visibility(id, true).unwrap();
        assert!(stage.has_active());
        assert_eq!(stage.tick(0.032, &mut det).advanced, 1);
    }

    #[test]
    fn static_mode_never_builds() {
        let det = detector(FixedEnvironment::fallback());
        let mut stage = Stage::default();
        let id = stage.mount(particles(), 0.0, &det.signal());
        assert_eq!(stage.mode(id), Some(RenderMode::Static));
        assert!(stage.effect(id).is_none());
        assert_eq!(stage.simulators_built(), 0);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut stage = Stage::default();
        assert!(matches!(stage.unmount(9), Err(FxError::UnknownEffect(9))));
        assert!(stage.record_visibility(9, true).is_err());
        assert!(matches!(
            stage.set_highlighted(9, Some("Rust")),
            Err(FxError::UnknownEffect(9))
        ));
    }

    #[test]
    fn highlight_survives_rebuild() {
        let det = detector(FixedEnvironment::accelerated());
        let mut stage = Stage::default();
        let id = stage.mount(
            EffectSpec::Orbit {
                labels: vec!["Rust".into(), "Go".into()],
                radius: 3.0,
                theme: Theme::Dark,
            },
            0.0,
            &det.signal(),
        );
        stage.set_highlighted(id, Some("Go")).unwrap();
        let Some(Effect::Orbit(orbit)) = stage.effect(id) else {
            panic!("orbit not built");
        };
        assert!(orbit.nodes()[1].highlighted);
    }
}
