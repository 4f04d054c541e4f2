use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{Point, Size, Transform, ViewerSettings, Viewport};

pub type PointerId = u32;

#[derive(Clone, Copy, Debug)]
struct Drag {
    last: Point,
    at: Instant,
}

/// Transform and gesture state of an open viewer.
///
/// Pan is the offset of the image center from the viewport center, in screen
/// pixels. All zooming goes through [`ViewSession::zoom_at`], which clamps to the
/// configured range and keeps the image point under the anchor fixed.
#[derive(Debug)]
pub struct ViewSession {
    settings: ViewerSettings,
    viewport: Viewport,
    image: Size,
    zoom: f64,
    pan: Point,
    pointers: BTreeMap<PointerId, Point>,
    drag: Option<Drag>,
    pinch_distance: Option<f64>,
    velocity: Point,
    inertia: bool,
    overlay_until: Instant,
}

impl ViewSession {
    pub(super) fn new(settings: ViewerSettings, viewport: Viewport, image: Size, now: Instant) -> Self {
        let overlay_until = now + Duration::from_millis(settings.overlay_idle_ms);
        let zoom = settings.clamp_zoom(1.0);
        Self {
            settings,
            viewport,
            image,
            zoom,
            pan: Point::ORIGIN,
            pointers: BTreeMap::new(),
            drag: None,
            pinch_distance: None,
            velocity: Point::ORIGIN,
            inertia: false,
            overlay_until,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            zoom: self.zoom,
            pan: self.pan,
        }
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn is_coasting(&self) -> bool {
        self.inertia
    }

    pub fn overlay_visible(&self, now: Instant) -> bool {
        now < self.overlay_until
    }

    /// Image size at zoom 1: contain-fit into the viewport, never upscaled.
    pub fn fitted_size(&self) -> Size {
        if self.image.width <= 0.0 || self.image.height <= 0.0 {
            return Size::default();
        }
        let ratio = self.settings.fit_ratio;
        let scale = (ratio * self.viewport.width / self.image.width)
            .min(ratio * self.viewport.height / self.image.height)
            .min(1.0);
        Size::new(self.image.width * scale, self.image.height * scale)
    }

    /// Largest pan offset per axis that keeps the zoomed image covering the
    /// viewport (or centered when it is smaller).
    pub fn pan_bounds(&self) -> Point {
        let fitted = self.fitted_size();
        Point::new(
            ((fitted.width * self.zoom - self.viewport.width) / 2.0).max(0.0),
            ((fitted.height * self.zoom - self.viewport.height) / 2.0).max(0.0),
        )
    }

    pub fn snap_to_bounds(&mut self) {
        let bounds = self.pan_bounds();
        self.pan.x = self.pan.x.clamp(-bounds.x, bounds.x);
        self.pan.y = self.pan.y.clamp(-bounds.y, bounds.y);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.snap_to_bounds();
    }

    /// Sets the zoom (clamped) while keeping the image point under `anchor` in place.
    pub fn zoom_at(&mut self, zoom: f64, anchor: Point) {
        if zoom.is_nan() {
            return;
        }
        let zoom = self.settings.clamp_zoom(zoom);
        let center = self.viewport.center();
        let content_x = (anchor.x - center.x - self.pan.x) / self.zoom;
        let content_y = (anchor.y - center.y - self.pan.y) / self.zoom;

        self.zoom = zoom;
        self.pan.x = anchor.x - center.x - content_x * zoom;
        self.pan.y = anchor.y - center.y - content_y * zoom;
    }

    pub fn wheel(&mut self, delta_y: f64, at: Point, now: Instant) {
        self.cancel_inertia();
        self.touch(now);

        let factor = (-delta_y * self.settings.wheel_sensitivity).exp();
        self.zoom_at(self.zoom * factor, at);
        self.snap_to_bounds();
    }

    pub fn pointer_down(&mut self, id: PointerId, at: Point, now: Instant) {
        self.touch(now);
        self.pointers.insert(id, at);
        self.cancel_inertia();

        match self.pointers.len() {
            1 => self.drag = Some(Drag { last: at, at: now }),
            2 => {
                self.drag = None;
                self.pinch_distance = self.pinch_points().map(|(a, b)| a.distance(b));
            }
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, id: PointerId, at: Point, now: Instant) {
        match self.pointers.get_mut(&id) {
            Some(position) => *position = at,
            None => return,
        }

        if let Some((a, b)) = self.pinch_points() {
            self.touch(now);
            let distance = a.distance(b);
            let previous = self.pinch_distance.unwrap_or(distance);
            if previous > 0.0 {
                self.zoom_at(self.zoom * (distance / previous), a.midpoint(b));
            }
            self.pinch_distance = Some(distance);
            self.snap_to_bounds();
            return;
        }

        let Some(drag) = self.drag else {
            return;
        };

        let dx = at.x - drag.last.x;
        let dy = at.y - drag.last.y;
        self.pan.x += dx;
        self.pan.y += dy;

        let elapsed_ms = now.saturating_duration_since(drag.at).as_secs_f64() * 1000.0;
        let dt = elapsed_ms.max(1.0);
        self.velocity = Point::new(
            dx / dt * self.settings.frame_ms,
            dy / dt * self.settings.frame_ms,
        );

        self.drag = Some(Drag { last: at, at: now });
        self.touch(now);
    }

    pub fn pointer_up(&mut self, id: PointerId, now: Instant) {
        self.pointers.remove(&id);
        self.drag = None;
        self.pinch_distance = None;
        self.touch(now);

        let fling = self.settings.fling_speed;
        if self.velocity.x.abs() > fling || self.velocity.y.abs() > fling {
            self.inertia = true;
        } else {
            self.cancel_inertia();
            self.snap_to_bounds();
        }
    }

    /// Advances inertia by one frame. Returns whether the image is still moving.
    pub fn step_inertia(&mut self) -> bool {
        if !self.inertia {
            return false;
        }

        self.velocity.x *= self.settings.friction;
        self.velocity.y *= self.settings.friction;
        self.pan.x += self.velocity.x;
        self.pan.y += self.velocity.y;

        let stop = self.settings.stop_speed;
        if self.velocity.x.abs() < stop && self.velocity.y.abs() < stop {
            self.cancel_inertia();
            self.snap_to_bounds();
            return false;
        }
        true
    }

    pub fn double_click(&mut self, at: Point, now: Instant) {
        self.cancel_inertia();
        self.touch(now);

        let target = if self.zoom > self.settings.double_tap_reset_above {
            self.settings.min_zoom
        } else {
            self.settings.double_tap_zoom
        };
        self.zoom_at(target, at);
        self.snap_to_bounds();
    }

    pub fn reset(&mut self, now: Instant) {
        self.cancel_inertia();
        self.zoom = self.settings.clamp_zoom(1.0);
        self.pan = Point::ORIGIN;
        self.touch(now);
    }

    /// Any pointer activity shows the overlay again.
    pub fn touch(&mut self, now: Instant) {
        self.overlay_until = now + Duration::from_millis(self.settings.overlay_idle_ms);
    }

    fn cancel_inertia(&mut self) {
        self.inertia = false;
        self.velocity = Point::ORIGIN;
    }

    fn pinch_points(&self) -> Option<(Point, Point)> {
        if self.pointers.len() != 2 {
            return None;
        }
        let mut points = self.pointers.values().copied();
        Some((points.next()?, points.next()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(now: Instant) -> ViewSession {
        ViewSession::new(
            ViewerSettings::default(),
            Viewport::new(0.0, 0.0, 1000.0, 800.0),
            Size::new(2000.0, 1000.0),
            now,
        )
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn zoom_stays_in_range_for_any_request() {
        let now = Instant::now();
        let mut view = session(now);
        let at = Point::new(400.0, 300.0);

        for delta in [-1e9, -5000.0, -3.0, 0.0, 7.0, 4200.0, 1e12, f64::INFINITY] {
            view.wheel(delta, at, now);
            let zoom = view.transform().zoom;
            assert!((1.0..=5.0).contains(&zoom), "zoom {zoom} after delta {delta}");
        }

        view.zoom_at(f64::NAN, at);
        assert!((1.0..=5.0).contains(&view.transform().zoom));
        view.zoom_at(-10.0, at);
        assert_eq!(view.transform().zoom, 1.0);
        view.zoom_at(1e300, at);
        assert_eq!(view.transform().zoom, 5.0);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let now = Instant::now();
        let mut view = session(now);
        let anchor = Point::new(700.0, 250.0);
        let center = Point::new(500.0, 400.0);

        let before = view.transform();
        let content_x = (anchor.x - center.x - before.pan.x) / before.zoom;
        view.zoom_at(3.0, anchor);
        let after = view.transform();

        assert_eq!(after.zoom, 3.0);
        assert!(close(center.x + after.pan.x + content_x * after.zoom, anchor.x));
    }

    #[test]
    fn wheel_up_zooms_in_and_down_zooms_out() {
        let now = Instant::now();
        let mut view = session(now);
        let center = Point::new(500.0, 400.0);

        view.wheel(-200.0, center, now);
        let zoomed = view.transform().zoom;
        assert!(close(zoomed, (0.3f64).exp()));

        view.wheel(200.0, center, now);
        assert!(close(view.transform().zoom, 1.0));
    }

    #[test]
    fn pan_snaps_into_bounds() {
        let now = Instant::now();
        let mut view = session(now);

        // fitted size is 900x450; at zoom 1 nothing overflows the viewport
        let fitted = view.fitted_size();
        assert!(close(fitted.width, 900.0) && close(fitted.height, 450.0));
        assert_eq!(view.pan_bounds(), Point::ORIGIN);

        view.zoom_at(4.0, Point::new(500.0, 400.0));
        let bounds = view.pan_bounds();
        assert!((bounds.x - 1300.0).abs() < 1e-3);
        assert!((bounds.y - 500.0).abs() < 1e-3);

        view.pointer_down(1, Point::new(0.0, 0.0), now);
        view.pointer_move(1, Point::new(5000.0, -5000.0), ms(now, 500));
        // hold still before releasing so there is no fling
        view.pointer_move(1, Point::new(5000.0, -5000.0), ms(now, 1500));
        view.pointer_up(1, ms(now, 2000));
        assert!(!view.is_coasting());
        assert_eq!(view.transform().pan, Point::new(bounds.x, -bounds.y));
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let now = Instant::now();
        let view = ViewSession::new(
            ViewerSettings::default(),
            Viewport::new(0.0, 0.0, 1000.0, 800.0),
            Size::new(200.0, 100.0),
            now,
        );
        assert_eq!(view.fitted_size(), Size::new(200.0, 100.0));
    }

    #[test]
    fn drag_tracks_velocity_per_frame() {
        let now = Instant::now();
        let mut view = session(now);

        view.pointer_down(7, Point::new(100.0, 100.0), now);
        view.pointer_move(7, Point::new(132.0, 100.0), ms(now, 8));
        assert_eq!(view.transform().pan, Point::new(32.0, 0.0));
        // 32px in 8ms -> 64px per 16ms frame
        assert!(close(view.velocity().x, 64.0));
        assert!(close(view.velocity().y, 0.0));

        // moves from unknown pointers are ignored
        view.pointer_move(9, Point::new(0.0, 0.0), ms(now, 9));
        assert_eq!(view.transform().pan, Point::new(32.0, 0.0));
    }

    #[test]
    fn fast_release_coasts_then_snaps() {
        let now = Instant::now();
        let mut view = session(now);
        view.zoom_at(2.0, Point::new(500.0, 400.0));

        view.pointer_down(1, Point::new(500.0, 400.0), now);
        view.pointer_move(1, Point::new(520.0, 400.0), ms(now, 16));
        view.pointer_up(1, ms(now, 17));
        assert!(view.is_coasting());

        let mut frames = 0;
        let mut last_speed = view.velocity().x.abs();
        while view.step_inertia() {
            let speed = view.velocity().x.abs();
            assert!(speed < last_speed);
            last_speed = speed;
            frames += 1;
            assert!(frames < 1000, "inertia never settled");
        }

        assert!(!view.is_coasting());
        assert_eq!(view.velocity(), Point::ORIGIN);
        let bounds = view.pan_bounds();
        assert!(view.transform().pan.x.abs() <= bounds.x);
        assert!(view.transform().pan.y.abs() <= bounds.y);
    }

    #[test]
    fn pinch_zooms_by_distance_ratio() {
        let now = Instant::now();
        let mut view = session(now);

        view.pointer_down(1, Point::new(400.0, 400.0), now);
        view.pointer_down(2, Point::new(600.0, 400.0), now);
        view.pointer_move(2, Point::new(800.0, 400.0), ms(now, 10));
        assert!(close(view.transform().zoom, 2.0));

        view.pointer_move(1, Point::new(0.0, 400.0), ms(now, 20));
        assert!(close(view.transform().zoom, 4.0));

        // spreading further saturates at the maximum
        view.pointer_move(2, Point::new(5000.0, 400.0), ms(now, 30));
        assert_eq!(view.transform().zoom, 5.0);

        view.pointer_up(2, ms(now, 40));
        view.pointer_up(1, ms(now, 40));
        assert!(!view.is_coasting());
    }

    #[test]
    fn double_click_toggles_zoom() {
        let now = Instant::now();
        let mut view = session(now);
        let at = Point::new(500.0, 400.0);

        view.double_click(at, now);
        assert_eq!(view.transform().zoom, 2.5);

        view.double_click(at, now);
        assert_eq!(view.transform().zoom, 1.0);
        assert_eq!(view.transform().pan, Point::ORIGIN);
    }

    #[test]
    fn overlay_hides_after_idle_and_returns_on_activity() {
        let start = Instant::now();
        let mut view = session(start);
        assert!(view.overlay_visible(ms(start, 1999)));
        assert!(!view.overlay_visible(ms(start, 2000)));

        view.pointer_down(1, Point::new(10.0, 10.0), ms(start, 3000));
        assert!(view.overlay_visible(ms(start, 4500)));
        assert!(!view.overlay_visible(ms(start, 5001)));
    }

    #[test]
    fn reset_restores_identity() {
        let now = Instant::now();
        let mut view = session(now);
        view.zoom_at(3.3, Point::new(10.0, 20.0));
        view.reset(now);
        assert_eq!(view.transform(), Transform::IDENTITY);
    }
}
