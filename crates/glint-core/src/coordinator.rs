//! Glue between inputs (keys, mutations, timers, messages) and the particle system.
//!
//! Platform callbacks never touch simulation state directly: they push an
//! [`EffectInput`] into the coordinator's inbox and wake it, and the
//! coordinator drains the inbox on its own stack. Aim completions raised
//! in the middle of a frame travel the same way and are drained right after
//! the frame.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;
use glint_platform::{MutationRecord, OverlayBackend, PageHost, StyleProperty, TimerHost, TimerId};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::chord::{ChordEffect, ChordOutcome, Intent, KeyChordRecognizer};
use crate::config::GlintConfig;
use crate::fuse::{self, FuseStep};
use crate::message::ExtensionMessage;
use crate::shake::{self, StyleCx, StyleRestore, StyleWrite, TransientStyles};
use crate::system::{FrameOutcome, ParticleSystem};
use crate::trigger::MutationTrigger;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectInput<E> {
    Key(String),
    Mutations(Vec<MutationRecord<E>>),
    Command(Intent),
    EffectsEnabled(bool),
    Timer(TimerTask<E>),
    AimLanded { row: E, target: Vec2 },
}

impl<E> From<ExtensionMessage> for EffectInput<E> {
    fn from(message: ExtensionMessage) -> Self {
        match message {
            ExtensionMessage::SetEffectsEnabled { enabled } => EffectInput::EffectsEnabled(enabled),
            ExtensionMessage::MarkAsRead => EffectInput::Command(Intent::MarkAsRead),
            ExtensionMessage::Archive => EffectInput::Command(Intent::Archive),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerTask<E> {
    ResetChordHistory,
    RestoreStyle(StyleRestore<E>),
    Fuse { row: E, step: FuseStep },
}

/// The coordinator's input queue.
pub struct Inbox<E> {
    sender: Sender<EffectInput<E>>,
    receiver: Receiver<EffectInput<E>>,
}

impl<E> Inbox<E> {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> Sender<EffectInput<E>> {
        self.sender.clone()
    }
}

impl<E> Default for Inbox<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EffectStats {
    pub aims_fired: usize,
    pub aims_landed: usize,
    pub archive_bursts: usize,
    pub fuse_bursts: usize,
    pub mutation_batches: usize,
}

pub struct EffectCoordinator<H: PageHost, T> {
    config: GlintConfig,
    host: H,
    timers: T,
    particles: ParticleSystem,
    chord: KeyChordRecognizer,
    trigger: MutationTrigger,
    styles: TransientStyles<H::Element>,
    rng: fastrand::Rng,
    effects_enabled: bool,
    chord_reset: Option<TimerId>,
    inbox: Inbox<H::Element>,
    stats: EffectStats,
}

impl<H, T> EffectCoordinator<H, T>
where
    H: PageHost,
    H::Element: 'static,
    T: TimerHost<TimerTask<H::Element>>,
{
    pub fn with_parts(
        config: &GlintConfig,
        host: H,
        timers: T,
        backend: Box<dyn OverlayBackend>,
        inbox: Inbox<H::Element>,
        mut rng: fastrand::Rng,
    ) -> Self {
        let particle_rng = fastrand::Rng::with_seed(rng.u64(..));
        let mut particles = ParticleSystem::with_rng(config.particles.clone(), backend, particle_rng);
        particles.set_enabled(config.storage.effects_default);
        Self {
            particles,
            chord: KeyChordRecognizer::new(config.chord.clone()),
            trigger: MutationTrigger::new(config.page.selection_attribute.clone()),
            styles: TransientStyles::default(),
            effects_enabled: config.storage.effects_default,
            chord_reset: None,
            config: config.clone(),
            host,
            timers,
            rng,
            inbox,
            stats: EffectStats::default(),
        }
    }

    pub fn sender(&self) -> Sender<EffectInput<H::Element>> {
        self.inbox.sender()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn intent(&self) -> Intent {
        self.chord.intent()
    }

    pub fn effects_enabled(&self) -> bool {
        self.effects_enabled && self.particles.is_enabled()
    }

    pub fn stats(&self) -> EffectStats {
        self.stats
    }

    /// Handles one input immediately, then drains anything it queued.
    pub fn dispatch(&mut self, input: EffectInput<H::Element>) {
        self.handle(input);
        self.pump();
    }

    /// Drains the inbox.
    pub fn pump(&mut self) {
        while let Ok(input) = self.inbox.receiver.try_recv() {
            self.handle(input);
        }
    }

    /// Runs one animation frame and drains completions it raised.
    pub fn frame(&mut self) -> FrameOutcome {
        let outcome = self.particles.tick();
        self.pump();
        outcome
    }

    fn handle(&mut self, input: EffectInput<H::Element>) {
        match input {
            EffectInput::Key(key) => {
                if let Some(outcome) = self.chord.press(&key) {
                    self.rearm_chord_reset();
                    self.apply_chord(outcome);
                }
            }
            EffectInput::Command(intent) => {
                let outcome = self.chord.command(intent);
                self.apply_chord(outcome);
            }
            EffectInput::Mutations(batch) => {
                self.stats.mutation_batches += 1;
                let intent = self.chord.intent();
                if let Some(row) = self.trigger.selected_row(&self.host, &batch, intent) {
                    self.fire_aim(row);
                }
            }
            EffectInput::EffectsEnabled(enabled) => {
                info!(enabled, "effects toggled");
                self.effects_enabled = enabled;
                self.particles.set_enabled(enabled);
            }
            EffectInput::Timer(task) => self.run_timer(task),
            EffectInput::AimLanded { row, target } => self.land_aim(row, target),
        }
    }

    fn apply_chord(&mut self, outcome: ChordOutcome) {
        match outcome.effect {
            Some(ChordEffect::ArchiveBurst) => self.archive_burst(),
            Some(ChordEffect::Fuse) => self.start_fuse(),
            None => {}
        }
    }

    fn rearm_chord_reset(&mut self) {
        if let Some(id) = self.chord_reset.take() {
            self.timers.clear_timeout(id);
        }
        let delay = self.config.chord.history_reset();
        self.chord_reset = Some(self.timers.set_timeout(delay, TimerTask::ResetChordHistory));
    }

    fn run_timer(&mut self, task: TimerTask<H::Element>) {
        match task {
            TimerTask::ResetChordHistory => {
                self.chord_reset = None;
                self.chord.reset_history();
            }
            TimerTask::RestoreStyle(restore) => self.styles.restore(&mut self.host, restore),
            TimerTask::Fuse { row, step } => self.fuse_step(row, step),
        }
    }

    fn archive_burst(&mut self) {
        if !self.effects_enabled {
            return;
        }
        let viewport = self.host.viewport();
        let root = self.host.root();
        self.shake(&root, self.config.shake.body_offset);
        let bursts = self.config.archive.bursts.sample(&mut self.rng);
        debug!(bursts, "archive burst");
        for _ in 0..bursts {
            let point = Vec2::new(
                self.rng.f32() * viewport.width,
                self.rng.f32() * viewport.height,
            );
            self.particles.spawn_explosion(point);
        }
        self.stats.archive_bursts += 1;
    }

    fn start_fuse(&mut self) {
        if !self.effects_enabled {
            return;
        }
        let rows = self.host.selected_rows();
        debug!(rows = rows.len(), "fuse");
        for (index, row) in rows.into_iter().enumerate() {
            let delay = fuse::row_delay(&self.config.fuse, index);
            self.timers.set_timeout(
                delay,
                TimerTask::Fuse {
                    row,
                    step: FuseStep::START,
                },
            );
        }
    }

    fn fuse_step(&mut self, row: H::Element, step: FuseStep) {
        if !self.effects_enabled {
            return;
        }
        let Some(rect) = self.host.bounding_rect(&row) else {
            trace!("fuse row left the page");
            return;
        };
        let Some(point) = step.burst_point(&rect) else {
            return;
        };
        if self.particles.spawn_explosion(point) {
            self.stats.fuse_bursts += 1;
        }
        let next = step.next(&self.config.fuse);
        self.timers.set_timeout(
            fuse::step_interval(&self.config.fuse),
            TimerTask::Fuse { row, step: next },
        );
    }

    fn fire_aim(&mut self, row: H::Element) {
        if !self.effects_enabled {
            return;
        }
        let Some(rect) = self.host.bounding_rect(&row) else {
            return;
        };
        let target = Vec2::new(rect.x + self.config.highlight.aim_offset_x, rect.center_y());
        let sender = self.inbox.sender();
        let spawned = self.particles.spawn_aim(target, move || {
            let _ = sender.send(EffectInput::AimLanded { row, target });
        });
        if spawned {
            self.stats.aims_fired += 1;
        }
    }

    fn land_aim(&mut self, row: H::Element, target: Vec2) {
        self.stats.aims_landed += 1;
        if !self.effects_enabled {
            return;
        }
        let mut cx = StyleCx {
            host: &mut self.host,
            timers: &mut self.timers,
        };
        let highlight = StyleWrite {
            element: &row,
            property: StyleProperty::BoxShadow,
            value: &self.config.highlight.box_shadow,
            duration: self.config.highlight.duration(),
        };
        self.styles.apply(&mut cx, highlight, TimerTask::RestoreStyle);
        self.shake(&row, self.config.shake.row_offset);
        let root = self.host.root();
        self.shake(&root, self.config.shake.body_offset);
        self.particles.spawn_trail(target);
    }

    fn shake(&mut self, element: &H::Element, max_offset: f32) {
        let mut cx = StyleCx {
            host: &mut self.host,
            timers: &mut self.timers,
        };
        shake::shake(
            &mut self.styles,
            &mut cx,
            &mut self.rng,
            &self.config.shake,
            element,
            max_offset,
            TimerTask::RestoreStyle,
        );
    }
}

impl<H> EffectCoordinator<H, crate::headless::ManualTimers<TimerTask<H::Element>>>
where
    H: PageHost,
    H::Element: 'static,
{
    /// Advances the manual clock and runs every task that came due.
    pub fn advance_time(&mut self, by: Duration) -> usize {
        let due = self.timers.advance(by);
        let fired = due.len();
        for task in due {
            self.handle(EffectInput::Timer(task));
        }
        self.pump();
        fired
    }
}
