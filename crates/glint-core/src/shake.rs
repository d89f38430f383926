//! Transient inline-style writes on host elements (shake, highlight).
//!
//! Every write is paired with a timer that restores the value that was in
//! place before the first pending write. A second write to the same element
//! and property replaces the pending timer (last write wins).

use std::fmt;
use std::time::Duration;

use glint_platform::{PageHost, StyleProperty, TimerHost, TimerId};
use tracing::trace;

use crate::config::ShakeConfig;

/// Timer payload restoring one style property.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRestore<E> {
    pub element: E,
    pub property: StyleProperty,
    pub value: String,
}

/// Host page and timer wheel borrowed for one round of style writes.
pub struct StyleCx<'a, H, T> {
    pub host: &'a mut H,
    pub timers: &'a mut T,
}

/// One inline style held for `duration`.
#[derive(Debug, Clone, Copy)]
pub struct StyleWrite<'a, E> {
    pub element: &'a E,
    pub property: StyleProperty,
    pub value: &'a str,
    pub duration: Duration,
}

struct PendingStyle<E> {
    element: E,
    property: StyleProperty,
    original: String,
    timer: TimerId,
}

pub struct TransientStyles<E> {
    pending: Vec<PendingStyle<E>>,
}

impl<E> Default for TransientStyles<E> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<E: Clone + PartialEq + fmt::Debug> TransientStyles<E> {
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Writes the value now and schedules its restore. `wrap` turns the
    /// restore payload into the timer's task type.
    pub fn apply<H, T, X>(
        &mut self,
        cx: &mut StyleCx<'_, H, T>,
        write: StyleWrite<'_, E>,
        wrap: impl FnOnce(StyleRestore<E>) -> X,
    ) -> bool
    where
        H: PageHost<Element = E>,
        T: TimerHost<X>,
    {
        let StyleWrite {
            element,
            property,
            value,
            duration,
        } = write;
        let previous = self
            .pending
            .iter()
            .position(|p| p.element == *element && p.property == property)
            .map(|index| self.pending.swap_remove(index));
        let original = match previous {
            Some(pending) => {
                cx.timers.clear_timeout(pending.timer);
                pending.original
            }
            None => cx.host.style(element, property).unwrap_or_default(),
        };
        if !cx.host.set_style(element, property, value) {
            return false;
        }
        let timer = cx.timers.set_timeout(
            duration,
            wrap(StyleRestore {
                element: element.clone(),
                property,
                value: original.clone(),
            }),
        );
        self.pending.push(PendingStyle {
            element: element.clone(),
            property,
            original,
            timer,
        });
        true
    }

    /// Handles a fired restore timer. No-op if the element has left the page.
    pub fn restore<H: PageHost<Element = E>>(&mut self, host: &mut H, restore: StyleRestore<E>) {
        self.pending
            .retain(|p| !(p.element == restore.element && p.property == restore.property));
        if !host.set_style(&restore.element, restore.property, &restore.value) {
            trace!(element = ?restore.element, "restore skipped; element detached");
        }
    }
}

/// Randomized transform for one shake: integer translate in `[-max, max]`
/// plus, for non-root elements, a small rotation.
pub fn shake_transform(
    rng: &mut fastrand::Rng,
    max_offset: f32,
    max_rotation_deg: f32,
    is_root: bool,
) -> String {
    let mut offset = || ((rng.f32() - 0.5) * 2.0 * max_offset).floor();
    let (dx, dy) = (offset(), offset());
    if is_root {
        format!("translate({dx}px, {dy}px)")
    } else {
        let angle = (rng.f32() - 0.5) * 2.0 * max_rotation_deg;
        format!("translate({dx}px, {dy}px) rotate({angle:.2}deg)")
    }
}

/// Shakes `element`. The transform is restored after the shake duration,
/// the transition a little later so the reset still eases.
pub fn shake<H, T, X>(
    styles: &mut TransientStyles<H::Element>,
    cx: &mut StyleCx<'_, H, T>,
    rng: &mut fastrand::Rng,
    config: &ShakeConfig,
    element: &H::Element,
    max_offset: f32,
    wrap: impl Fn(StyleRestore<H::Element>) -> X,
) -> bool
where
    H: PageHost,
    T: TimerHost<X>,
{
    let is_root = *element == cx.host.root();
    let transform = shake_transform(rng, max_offset, config.max_rotation_deg, is_root);
    let transition = StyleWrite {
        element,
        property: StyleProperty::Transition,
        value: &config.transition,
        duration: config.transition_hold(),
    };
    if !styles.apply(cx, transition, &wrap) {
        return false;
    }
    let write = StyleWrite {
        element,
        property: StyleProperty::Transform,
        value: &transform,
        duration: config.duration(),
    };
    styles.apply(cx, write, &wrap)
}
