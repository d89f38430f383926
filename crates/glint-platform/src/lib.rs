//! Platform abstraction traits so `glint-core` stays browser-agnostic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Visible area of the host page in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f32,
}

fn default_pixel_ratio() -> f32 {
    1.0
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            pixel_ratio: 1.0,
        }
    }
}

/// Client-space bounding box of a host element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Opaque 8-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Clamps float channels into 0..=255.
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        let channel = |v: f32| v.clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            rgb: self,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Color plus opacity in 0.0..=1.0; displays as a CSS `rgba()` string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {:.3})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

/// Inline style properties the effects are allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleProperty {
    Transform,
    Transition,
    BoxShadow,
    BackgroundColor,
}

impl StyleProperty {
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Transition => "transition",
            Self::BoxShadow => "box-shadow",
            Self::BackgroundColor => "background-color",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Attributes,
    ChildList,
    CharacterData,
}

impl MutationKind {
    /// Maps a DOM `MutationRecord.type` string.
    pub fn from_dom(kind: &str) -> Option<Self> {
        match kind {
            "attributes" => Some(Self::Attributes),
            "childList" => Some(Self::ChildList),
            "characterData" => Some(Self::CharacterData),
            _ => None,
        }
    }
}

/// One observed change, already resolved to the nearest element.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord<E> {
    pub target: E,
    pub kind: MutationKind,
    pub attribute: Option<String>,
}

/// Drawing surface owned by the particle system; one per mounted overlay.
pub trait Surface {
    fn pixel_ratio(&self) -> f32 {
        1.0
    }
    fn clear(&mut self);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, line_width: f32, color: Rgba);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), line_width: f32, color: Rgba);
    /// False once the host page has removed the overlay behind our back.
    fn is_connected(&self) -> bool {
        true
    }
    /// Unmounts the overlay.
    fn remove(self: Box<Self>);
}

/// Creates overlay surfaces and schedules redraws.
pub trait OverlayBackend {
    /// Returns `None` when no 2D context can be obtained.
    fn create_surface(&mut self) -> Option<Box<dyn Surface>>;
    /// Asks for exactly one frame callback before the next paint.
    fn request_frame(&mut self);
}

/// Read/write access to the host page the effects decorate.
pub trait PageHost {
    type Element: Clone + PartialEq + fmt::Debug;

    fn viewport(&self) -> Viewport;
    /// The document body (or root element when there is no body).
    fn root(&self) -> Self::Element;
    fn enclosing_row(&self, node: &Self::Element) -> Option<Self::Element>;
    /// True when the row belongs to the message list (carries a select cell).
    fn is_list_row(&self, row: &Self::Element) -> bool;
    fn is_row_selected(&self, row: &Self::Element) -> bool;
    fn selected_rows(&self) -> Vec<Self::Element>;
    /// `None` once the element has left the document.
    fn bounding_rect(&self, element: &Self::Element) -> Option<ElementRect>;
    fn style(&self, element: &Self::Element, property: StyleProperty) -> Option<String>;
    /// Returns false when the write could not land (detached element).
    fn set_style(&mut self, element: &Self::Element, property: StyleProperty, value: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// One-shot timers that hand their task back to the coordinator when due.
pub trait TimerHost<T> {
    fn set_timeout(&mut self, delay: Duration, task: T) -> TimerId;
    fn clear_timeout(&mut self, id: TimerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_formats_as_css() {
        let color = Rgb::new(255, 128, 0).with_alpha(0.5);
        assert_eq!(color.to_string(), "rgba(255, 128, 0, 0.500)");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }

    #[test]
    fn channels_and_alpha_are_clamped() {
        let color = Rgb::from_f32(300.0, -4.0, 99.9);
        assert_eq!(color, Rgb::new(255, 0, 99));
        assert_eq!(color.with_alpha(4.0).alpha, 1.0);
    }

    #[test]
    fn mutation_kind_parses_dom_names() {
        assert_eq!(MutationKind::from_dom("attributes"), Some(MutationKind::Attributes));
        assert_eq!(MutationKind::from_dom("childList"), Some(MutationKind::ChildList));
        assert_eq!(MutationKind::from_dom("bogus"), None);
    }

    #[test]
    fn rect_helpers() {
        let rect = ElementRect { x: 10.0, y: 20.0, width: 100.0, height: 40.0 };
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.center_y(), 40.0);
    }
}
