//! Fullscreen image viewer.
//!
//! The viewer is either closed or open. While open it keeps a continuous
//! transform (zoom and pan) that pointer gestures mutate: wheel and pinch zoom
//! anchored at a point, drag to pan with inertial release, double tap to toggle
//! zoom, and an overlay with reset/close buttons that hides after a short idle
//! period. Opening always starts from the identity transform.
//!
//! The server never drives a [`ViewSession`] itself. It is the reference model
//! for the browser binding in `assets/viewer.js`, which repeats the same
//! gesture maths on pointer events. The same [`ViewerSettings`] are rendered
//! into the detail page and override the script's built-in defaults, which
//! must stay equal to [`ViewerSettings::default`].

mod session;

use std::time::Instant;

use serde::{Deserialize, Serialize};

pub use session::{PointerId, ViewSession};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom factor per wheel unit: `exp(-delta_y * wheel_sensitivity)`.
    pub wheel_sensitivity: f64,
    /// Velocity multiplier applied every inertia frame.
    pub friction: f64,
    /// Inertia stops once both velocity components drop below this.
    pub stop_speed: f64,
    /// Release speed above which a drag turns into a fling.
    pub fling_speed: f64,
    pub double_tap_zoom: f64,
    /// Double tap zooms out when the current zoom is above this.
    pub double_tap_reset_above: f64,
    pub overlay_idle_ms: u64,
    /// Frame length used to express velocity in pixels per frame.
    pub frame_ms: f64,
    /// Share of the viewport the image may fill at zoom 1.
    pub fit_ratio: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 5.0,
            wheel_sensitivity: 0.0015,
            friction: 0.92,
            stop_speed: 0.05,
            fling_speed: 0.5,
            double_tap_zoom: 2.5,
            double_tap_reset_above: 1.4,
            overlay_idle_ms: 2000,
            frame_ms: 16.0,
            fit_ratio: 0.9,
        }
    }
}

impl ViewerSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(format!(
                "zoom range must satisfy 0 < min_zoom <= max_zoom (got {}..{})",
                self.min_zoom, self.max_zoom
            ));
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(format!("friction must be in (0, 1), got {}", self.friction));
        }
        if !(self.fit_ratio > 0.0 && self.fit_ratio <= 1.0) {
            return Err(format!("fit_ratio must be in (0, 1], got {}", self.fit_ratio));
        }
        if self.frame_ms <= 0.0 || self.stop_speed <= 0.0 {
            return Err("frame_ms and stop_speed must be positive".to_string());
        }
        Ok(())
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Screen area the viewer occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
    pub zoom: f64,
    pub pan: Point,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        zoom: 1.0,
        pan: Point::ORIGIN,
    };
}

/// Open/closed wrapper around a [`ViewSession`].
#[derive(Debug)]
pub struct ImageViewer {
    settings: ViewerSettings,
    session: Option<ViewSession>,
}

impl ImageViewer {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// Opens the viewer on an image, discarding any previous transform.
    pub fn open(&mut self, viewport: Viewport, image: Size, now: Instant) -> &mut ViewSession {
        self.session
            .insert(ViewSession::new(self.settings.clone(), viewport, image, now))
    }

    pub fn close(&mut self) {
        self.session = None;
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ViewSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ViewSession> {
        self.session.as_mut()
    }
}
