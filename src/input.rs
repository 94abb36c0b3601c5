//! Pointer input for the simulation.
//!
//! The integrator only needs to know where the pointer is in canvas space, or
//! that there is none. [`PointerTracker`] derives that from raw window events
//! and also remembers the latest canvas size so the driver can rebuild on
//! resize.
//!
//! # Usage
//!
//! ```ignore
//! // In your winit ApplicationHandler::window_event:
//! tracker.handle_event(&event);
//! if let Some((w, h)) = tracker.take_resize() {
//!     sim.resize(w as f32, h as f32)?;
//! }
//! sim.step(&mut audio, tracker.pointer());
//! ```

use glam::Vec2;
use winit::event::WindowEvent;

/// Pointer position in canvas pixels, or no pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pointer {
    /// Outside the canvas or no pointing device.
    #[default]
    Absent,
    /// Over the canvas at this position.
    At(Vec2),
}

impl Pointer {
    /// Pointer at `(x, y)`. Non-finite coordinates count as absent.
    pub fn at(x: f32, y: f32) -> Self {
        let p = Vec2::new(x, y);
        if p.is_finite() {
            Pointer::At(p)
        } else {
            Pointer::Absent
        }
    }

    /// Position, if present.
    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Pointer::At(p) => Some(*p),
            Pointer::Absent => None,
        }
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Pointer::At(_))
    }
}

impl From<Option<Vec2>> for Pointer {
    fn from(p: Option<Vec2>) -> Self {
        match p {
            Some(p) => Pointer::at(p.x, p.y),
            None => Pointer::Absent,
        }
    }
}

/// Tracks pointer and canvas size from window events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    position: Option<Vec2>,
    canvas_size: (u32, u32),
    pending_resize: Option<(u32, u32)>,
}

impl PointerTracker {
    /// Create a tracker for a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: None,
            canvas_size: (width, height),
            pending_resize: None,
        }
    }

    /// Current pointer. Positions outside the canvas count as absent.
    pub fn pointer(&self) -> Pointer {
        let (w, h) = self.canvas_size;
        match self.position {
            Some(p) if p.x >= 0.0 && p.y >= 0.0 && p.x < w as f32 && p.y < h as f32 => {
                Pointer::At(p)
            }
            _ => Pointer::Absent,
        }
    }

    /// Latest known canvas size.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    /// Size from a resize since the last call, if any.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    pub(crate) fn move_to(&mut self, x: f64, y: f64) {
        self.position = Some(Vec2::new(x as f32, y as f32));
    }

    pub(crate) fn leave(&mut self) {
        self.position = None;
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != self.canvas_size {
            self.canvas_size = (width, height);
            self.pending_resize = Some((width, height));
        }
    }

    /// Process a winit window event. Unrelated events are ignored.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.move_to(position.x, position.y),
            WindowEvent::CursorLeft { .. } => self.leave(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_at() {
        assert_eq!(Pointer::at(1.0, 2.0).position(), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(Pointer::at(f32::NAN, 2.0), Pointer::Absent);
        assert!(!Pointer::default().is_present());
        assert_eq!(Pointer::from(None), Pointer::Absent);
    }

    #[test]
    fn test_tracker_enter_and_leave() {
        let mut tracker = PointerTracker::new(800, 600);
        assert_eq!(tracker.pointer(), Pointer::Absent);

        tracker.move_to(400.0, 300.0);
        assert_eq!(tracker.pointer(), Pointer::At(Vec2::new(400.0, 300.0)));

        tracker.leave();
        assert_eq!(tracker.pointer(), Pointer::Absent);
    }

    #[test]
    fn test_tracker_out_of_range_is_absent() {
        let mut tracker = PointerTracker::new(800, 600);
        tracker.move_to(-5.0, 10.0);
        assert_eq!(tracker.pointer(), Pointer::Absent);
        tracker.move_to(800.0, 10.0);
        assert_eq!(tracker.pointer(), Pointer::Absent);
    }

    #[test]
    fn test_resize_is_reported_once() {
        let mut tracker = PointerTracker::new(800, 600);
        tracker.resize(800, 600);
        assert_eq!(tracker.take_resize(), None);

        tracker.resize(1024, 768);
        assert_eq!(tracker.canvas_size(), (1024, 768));
        assert_eq!(tracker.take_resize(), Some((1024, 768)));
        assert_eq!(tracker.take_resize(), None);
    }

    #[test]
    fn test_handle_resized_event() {
        let mut tracker = PointerTracker::new(10, 10);
        tracker.handle_event(&WindowEvent::Resized(winit::dpi::PhysicalSize::new(20, 30)));
        assert_eq!(tracker.take_resize(), Some((20, 30)));
    }
}
