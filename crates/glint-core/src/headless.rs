//! In-memory implementations of the platform traits.
//!
//! Used by the replay binary and by tests: a software raster surface, a
//! backend that records frame requests, a scripted mail-list page and a
//! manually advanced timer wheel.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use glint_platform::{
    ElementRect, MutationKind, MutationRecord, OverlayBackend, PageHost, Rgba, StyleProperty,
    Surface, TimerHost, TimerId, Viewport,
};

#[derive(Debug, Default)]
struct ProbeState {
    surfaces_created: Cell<usize>,
    surfaces_removed: Cell<usize>,
    frame_requests: Cell<usize>,
    frame_pending: Cell<bool>,
    fills_since_clear: Cell<usize>,
    detached: Cell<bool>,
    lit_pixels: Cell<usize>,
}

/// Observer handle shared with a [`HeadlessBackend`] and its surfaces.
#[derive(Debug, Clone, Default)]
pub struct BackendProbe(Rc<ProbeState>);

impl BackendProbe {
    pub fn surfaces_created(&self) -> usize {
        self.0.surfaces_created.get()
    }

    pub fn surfaces_removed(&self) -> usize {
        self.0.surfaces_removed.get()
    }

    pub fn frame_requests(&self) -> usize {
        self.0.frame_requests.get()
    }

    /// Consumes the pending frame request, if any.
    pub fn take_frame_request(&self) -> bool {
        self.0.frame_pending.replace(false)
    }

    pub fn fills_last_frame(&self) -> usize {
        self.0.fills_since_clear.get()
    }

    /// Simulates the host page removing the overlay element.
    pub fn detach_surface(&self) {
        self.0.detached.set(true);
    }

    /// Non-transparent pixels of the frame that was on screen before the
    /// latest clear or removal.
    pub fn lit_pixels(&self) -> usize {
        self.0.lit_pixels.get()
    }
}

pub struct HeadlessBackend {
    width: usize,
    height: usize,
    pixel_ratio: f32,
    has_context: bool,
    probe: BackendProbe,
}

impl HeadlessBackend {
    pub fn new(width: usize, height: usize) -> (Self, BackendProbe) {
        let probe = BackendProbe::default();
        let backend = Self {
            width,
            height,
            pixel_ratio: 1.0,
            has_context: true,
            probe: probe.clone(),
        };
        (backend, probe)
    }

    pub fn for_viewport(viewport: Viewport) -> (Self, BackendProbe) {
        let (mut backend, probe) = Self::new(viewport.width as usize, viewport.height as usize);
        backend.pixel_ratio = viewport.pixel_ratio;
        (backend, probe)
    }

    /// A backend whose surfaces never get a drawing context.
    pub fn without_context() -> (Self, BackendProbe) {
        let (mut backend, probe) = Self::new(0, 0);
        backend.has_context = false;
        (backend, probe)
    }
}

impl OverlayBackend for HeadlessBackend {
    fn create_surface(&mut self) -> Option<Box<dyn Surface>> {
        if !self.has_context {
            return None;
        }
        let state = &self.probe.0;
        state.surfaces_created.set(state.surfaces_created.get() + 1);
        state.detached.set(false);
        Some(Box::new(RasterSurface::new(
            self.width,
            self.height,
            self.pixel_ratio,
            Some(self.probe.clone()),
        )))
    }

    fn request_frame(&mut self) {
        let state = &self.probe.0;
        state.frame_requests.set(state.frame_requests.get() + 1);
        state.frame_pending.set(true);
    }
}

/// Software RGBA surface with source-over blending.
pub struct RasterSurface {
    width: usize,
    height: usize,
    pixel_ratio: f32,
    pixels: Vec<[u8; 4]>,
    probe: Option<BackendProbe>,
}

impl RasterSurface {
    pub fn new(width: usize, height: usize, pixel_ratio: f32, probe: Option<BackendProbe>) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
            pixels: vec![[0; 4]; width * height],
            probe,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = (color.alpha * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[y as usize * self.width + x as usize];
        let src = [color.rgb.r, color.rgb.g, color.rgb.b];
        for (channel, value) in dst.iter_mut().take(3).zip(src) {
            *channel = (value as f32 * a + *channel as f32 * (1.0 - a)).round() as u8;
        }
        dst[3] = ((a + dst[3] as f32 / 255.0 * (1.0 - a)) * 255.0).round() as u8;
    }

    fn note_fill(&self) {
        if let Some(probe) = &self.probe {
            let state = &probe.0;
            state.fills_since_clear.set(state.fills_since_clear.get() + 1);
        }
    }

    fn count_lit(&self) {
        if let Some(probe) = &self.probe {
            let lit = self.as_bytes().chunks_exact(4).filter(|px| px[3] > 0).count();
            probe.0.lit_pixels.set(lit);
        }
    }
}

impl Surface for RasterSurface {
    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn clear(&mut self) {
        self.count_lit();
        self.pixels.fill([0; 4]);
        if let Some(probe) = &self.probe {
            probe.0.fills_since_clear.set(0);
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.note_fill();
        let r = radius.max(0.5);
        let (x0, x1) = ((x - r).floor() as i64, (x + r).ceil() as i64);
        let (y0, y1) = ((y - r).floor() as i64, (y + r).ceil() as i64);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let coverage = (r + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                self.blend(px, py, color, coverage);
            }
        }
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, line_width: f32, color: Rgba) {
        let steps = ((radius * std::f32::consts::TAU) as usize).max(8);
        for i in 0..steps {
            let angle = i as f32 / steps as f32 * std::f32::consts::TAU;
            let px = x + radius * angle.cos();
            let py = y + radius * angle.sin();
            self.blend(px.round() as i64, py.round() as i64, color, line_width.min(1.0));
        }
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), line_width: f32, color: Rgba) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let px = from.0 + dx * t;
            let py = from.1 + dy * t;
            self.blend(px.round() as i64, py.round() as i64, color, line_width.min(1.0));
        }
    }

    fn is_connected(&self) -> bool {
        self.probe.as_ref().map_or(true, |p| !p.0.detached.get())
    }

    fn remove(self: Box<Self>) {
        self.count_lit();
        if let Some(probe) = &self.probe {
            let state = &probe.0;
            state.surfaces_removed.set(state.surfaces_removed.get() + 1);
        }
    }
}

/// Nodes of a [`ScriptedPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageNode {
    Body,
    Row(usize),
    /// The checkbox inside a row's select cell.
    Checkbox(usize),
    /// A node outside any row.
    Detached,
}

#[derive(Debug, Clone)]
struct ScriptedRow {
    rect: ElementRect,
    selected: bool,
    list_row: bool,
    attached: bool,
    styles: HashMap<StyleProperty, String>,
}

/// Mail-list page held in memory: rows with a rect and a selection flag.
#[derive(Debug, Clone)]
pub struct ScriptedPage {
    viewport: Viewport,
    rows: Vec<ScriptedRow>,
    body_styles: HashMap<StyleProperty, String>,
    selection_attribute: String,
    style_writes: usize,
}

impl ScriptedPage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rows: Vec::new(),
            body_styles: HashMap::new(),
            selection_attribute: "aria-checked".into(),
            style_writes: 0,
        }
    }

    pub fn with_selection_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.selection_attribute = attribute.into();
        self
    }

    pub fn add_row(&mut self, rect: ElementRect) -> usize {
        self.rows.push(ScriptedRow {
            rect,
            selected: false,
            list_row: true,
            attached: true,
            styles: HashMap::new(),
        });
        self.rows.len() - 1
    }

    /// A row outside the message list (no select cell).
    pub fn add_foreign_row(&mut self, rect: ElementRect) -> usize {
        let index = self.add_row(rect);
        self.rows[index].list_row = false;
        index
    }

    /// Flips a row's checkbox and returns the mutation the host would report.
    pub fn set_selected(&mut self, row: usize, selected: bool) -> MutationRecord<PageNode> {
        if let Some(r) = self.rows.get_mut(row) {
            r.selected = selected;
        }
        MutationRecord {
            target: PageNode::Checkbox(row),
            kind: MutationKind::Attributes,
            attribute: Some(self.selection_attribute.clone()),
        }
    }

    pub fn detach(&mut self, row: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            r.attached = false;
        }
    }

    pub fn style_of(&self, node: PageNode, property: StyleProperty) -> Option<&str> {
        let value = match node {
            PageNode::Body => self.body_styles.get(&property),
            PageNode::Row(i) | PageNode::Checkbox(i) => self.rows.get(i)?.styles.get(&property),
            PageNode::Detached => None,
        };
        value.map(String::as_str)
    }

    pub fn style_writes(&self) -> usize {
        self.style_writes
    }

    fn row(&self, node: &PageNode) -> Option<&ScriptedRow> {
        match node {
            PageNode::Row(i) | PageNode::Checkbox(i) => self.rows.get(*i).filter(|r| r.attached),
            _ => None,
        }
    }
}

impl PageHost for ScriptedPage {
    type Element = PageNode;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn root(&self) -> PageNode {
        PageNode::Body
    }

    fn enclosing_row(&self, node: &PageNode) -> Option<PageNode> {
        match node {
            PageNode::Row(i) | PageNode::Checkbox(i) => self.row(node).map(|_| PageNode::Row(*i)),
            _ => None,
        }
    }

    fn is_list_row(&self, row: &PageNode) -> bool {
        self.row(row).is_some_and(|r| r.list_row)
    }

    fn is_row_selected(&self, row: &PageNode) -> bool {
        self.row(row).is_some_and(|r| r.selected)
    }

    fn selected_rows(&self) -> Vec<PageNode> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.attached && r.list_row && r.selected)
            .map(|(i, _)| PageNode::Row(i))
            .collect()
    }

    fn bounding_rect(&self, element: &PageNode) -> Option<ElementRect> {
        match element {
            PageNode::Body => Some(ElementRect {
                x: 0.0,
                y: 0.0,
                width: self.viewport.width,
                height: self.viewport.height,
            }),
            _ => self.row(element).map(|r| r.rect),
        }
    }

    fn style(&self, element: &PageNode, property: StyleProperty) -> Option<String> {
        self.style_of(*element, property).map(str::to_owned)
    }

    fn set_style(&mut self, element: &PageNode, property: StyleProperty, value: &str) -> bool {
        let styles = match element {
            PageNode::Body => &mut self.body_styles,
            PageNode::Row(i) | PageNode::Checkbox(i) => match self.rows.get_mut(*i) {
                Some(row) if row.attached => &mut row.styles,
                _ => return false,
            },
            PageNode::Detached => return false,
        };
        styles.insert(property, value.to_owned());
        self.style_writes += 1;
        true
    }
}

/// Timer wheel advanced explicitly by the caller.
#[derive(Debug)]
pub struct ManualTimers<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerId, T)>,
}

impl<T> Default for ManualTimers<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> ManualTimers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Time until the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|(due, _, _)| due.saturating_sub(self.now))
            .min()
    }

    /// Moves the clock forward and returns due tasks in firing order.
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<(Duration, TimerId, T)> = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].0 <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|(at, id, _)| (*at, *id));
        due.into_iter().map(|(_, _, task)| task).collect()
    }
}

impl<T> TimerHost<T> for ManualTimers<T> {
    fn set_timeout(&mut self, delay: Duration, task: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push((self.now + delay, id, task));
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.pending.retain(|(_, pending, _)| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_platform::Rgb;

    #[test]
    fn raster_fill_blends_into_buffer() {
        let mut surface = RasterSurface::new(16, 16, 1.0, None);
        surface.fill_circle(8.0, 8.0, 3.0, Rgb::new(255, 0, 0).with_alpha(1.0));
        assert_eq!(surface.pixel(8, 8), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.as_bytes().len(), 16 * 16 * 4);
        surface.clear();
        assert_eq!(surface.pixel(8, 8), Some([0, 0, 0, 0]));
    }

    #[test]
    fn cleared_frame_lit_pixels_are_counted() {
        let (mut backend, probe) = HeadlessBackend::new(32, 32);
        let mut surface = backend.create_surface().unwrap();
        surface.fill_circle(16.0, 16.0, 4.0, Rgb::new(255, 255, 255).with_alpha(1.0));
        surface.clear();
        let lit = probe.lit_pixels();
        assert!(lit > 30 && lit < 100, "{lit}");
        surface.clear();
        assert_eq!(probe.lit_pixels(), 0);
        surface.remove();
        assert_eq!(probe.surfaces_removed(), 1);
    }

    #[test]
    fn drawing_off_canvas_is_ignored() {
        let mut surface = RasterSurface::new(4, 4, 1.0, None);
        surface.fill_circle(-50.0, -50.0, 2.0, Rgb::new(1, 2, 3).with_alpha(1.0));
        surface.stroke_line((-10.0, 2.0), (20.0, 2.0), 1.0, Rgb::new(9, 9, 9).with_alpha(1.0));
        assert_eq!(surface.pixel(1, 2), Some([9, 9, 9, 255]));
    }

    #[test]
    fn timers_fire_in_due_order_and_cancel() {
        let mut timers = ManualTimers::new();
        let late = timers.set_timeout(Duration::from_millis(50), "late");
        timers.set_timeout(Duration::from_millis(10), "early");
        let cancelled = timers.set_timeout(Duration::from_millis(20), "cancelled");
        timers.clear_timeout(cancelled);
        assert_eq!(timers.next_due(), Some(Duration::from_millis(10)));
        assert_eq!(timers.advance(Duration::from_millis(30)), vec!["early"]);
        assert_eq!(timers.advance(Duration::from_millis(30)), vec!["late"]);
        assert_eq!(timers.pending_len(), 0);
        timers.clear_timeout(late);
    }

    #[test]
    fn scripted_page_reports_selection() {
        let mut page = ScriptedPage::new(Viewport::default());
        let rect = ElementRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let a = page.add_row(rect);
        let b = page.add_foreign_row(rect);
        let record = page.set_selected(a, true);
        page.set_selected(b, true);
        assert_eq!(record.target, PageNode::Checkbox(a));
        assert_eq!(page.enclosing_row(&record.target), Some(PageNode::Row(a)));
        assert_eq!(page.selected_rows(), vec![PageNode::Row(a)]);
        page.detach(a);
        assert!(page.bounding_rect(&PageNode::Row(a)).is_none());
        assert!(!page.set_style(&PageNode::Row(a), StyleProperty::BoxShadow, "x"));
    }
}
