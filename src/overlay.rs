use crate::display::DisplayState;
use crate::error::TrackerError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Size and vertical offset of the overlay. The window is right-aligned to
/// the primary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    pub width: i32,
    pub height: i32,
    pub top: i32,
}

impl OverlayGeometry {
    pub fn left_for_screen(&self, screen_width: i32) -> i32 {
        (screen_width - self.width).max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed as `0x00bbggrr`, the layout GDI expects.
    pub fn to_colorref(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let raw = value.trim().trim_start_matches('#');
    if raw.len() != 6 || !raw.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&raw[0..2], 16).ok()?;
    let g = u8::from_str_radix(&raw[2..4], 16).ok()?;
    let b = u8::from_str_radix(&raw[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStyle {
    pub opacity: u8,
    pub text_color: Rgb,
    pub background_color: Rgb,
    pub label: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            opacity: 220,
            text_color: Rgb::WHITE,
            background_color: Rgb::BLACK,
            label: String::new(),
        }
    }
}

/// A small topmost, non-activating, click-through window showing one number.
///
/// The window belongs to the thread that created it. [`request_repaint`]
/// only hands the value over; the owning thread's message loop applies it.
///
/// [`request_repaint`]: OverlayWindow::request_repaint
pub trait OverlayWindow {
    fn create(&mut self, geometry: &OverlayGeometry, style: &OverlayStyle)
        -> Result<(), TrackerError>;
    fn request_repaint(&self, value: u64);
    /// Release the window. Calling it again is a no-op.
    fn destroy(&mut self);
    fn is_created(&self) -> bool;
}

/// Overlay that keeps its [`DisplayState`] in memory.
#[derive(Clone)]
pub struct MockOverlay {
    state: Arc<MockOverlayState>,
}

#[derive(Default)]
struct MockOverlayState {
    fail_create: AtomicBool,
    created: AtomicBool,
    create_count: AtomicUsize,
    destroy_count: AtomicUsize,
    repaint_requests: AtomicUsize,
    redraws: AtomicUsize,
    display: Mutex<DisplayState>,
    history: Mutex<Vec<String>>,
}

impl MockOverlay {
    pub fn new() -> (Self, MockOverlayHandle) {
        let state = Arc::new(MockOverlayState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockOverlayHandle { state },
        )
    }

    /// An overlay whose window creation always fails.
    pub fn failing() -> (Self, MockOverlayHandle) {
        let (overlay, handle) = Self::new();
        overlay.state.fail_create.store(true, Ordering::SeqCst);
        (overlay, handle)
    }
}

impl OverlayWindow for MockOverlay {
    fn create(
        &mut self,
        _geometry: &OverlayGeometry,
        style: &OverlayStyle,
    ) -> Result<(), TrackerError> {
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(TrackerError::window_setup("class registration failed"));
        }
        if let Ok(mut display) = self.state.display.lock() {
            *display = DisplayState::new(style.label.clone());
        }
        self.state.create_count.fetch_add(1, Ordering::SeqCst);
        self.state.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn request_repaint(&self, value: u64) {
        if !self.state.created.load(Ordering::SeqCst) {
            return;
        }
        self.state.repaint_requests.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut display) = self.state.display.lock() {
            if display.apply(value) {
                self.state.redraws.fetch_add(1, Ordering::SeqCst);
                if let Ok(mut history) = self.state.history.lock() {
                    history.push(display.text().to_string());
                }
            }
        }
    }

    fn destroy(&mut self) {
        if self.state.created.swap(false, Ordering::SeqCst) {
            self.state.destroy_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_created(&self) -> bool {
        self.state.created.load(Ordering::SeqCst)
    }
}

pub struct MockOverlayHandle {
    state: Arc<MockOverlayState>,
}

impl MockOverlayHandle {
    pub fn create_count(&self) -> usize {
        self.state.create_count.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.state.destroy_count.load(Ordering::SeqCst)
    }

    pub fn repaint_requests(&self) -> usize {
        self.state.repaint_requests.load(Ordering::SeqCst)
    }

    pub fn redraws(&self) -> usize {
        self.state.redraws.load(Ordering::SeqCst)
    }

    pub fn display_text(&self) -> String {
        self.state
            .display
            .lock()
            .map(|d| d.text().to_string())
            .unwrap_or_default()
    }

    /// Every distinct text that was drawn, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state
            .history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(parse_hex_color("#ff6600"), Some(Rgb::new(0xff, 0x66, 0x00)));
        assert_eq!(parse_hex_color("00Aa10"), Some(Rgb::new(0x00, 0xaa, 0x10)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn colorref_is_bgr() {
        assert_eq!(Rgb::new(0x11, 0x22, 0x33).to_colorref(), 0x0033_2211);
        assert_eq!(Rgb::new(0x11, 0x22, 0x33).to_string(), "#112233");
    }

    #[test]
    fn window_is_right_aligned() {
        let geometry = OverlayGeometry {
            width: 130,
            height: 35,
            top: 70,
        };
        assert_eq!(geometry.left_for_screen(1920), 1790);
        assert_eq!(geometry.left_for_screen(100), 0);
    }

    #[test]
    fn repaint_before_create_is_ignored() {
        let (overlay, handle) = MockOverlay::new();
        overlay.request_repaint(3);
        assert_eq!(handle.repaint_requests(), 0);
        assert_eq!(handle.display_text(), "");
    }

    #[test]
    fn destroy_counts_once() {
        let (mut overlay, handle) = MockOverlay::new();
        overlay
            .create(
                &OverlayGeometry {
                    width: 10,
                    height: 10,
                    top: 0,
                },
                &OverlayStyle::default(),
            )
            .unwrap();
        overlay.destroy();
        overlay.destroy();
        assert_eq!(handle.create_count(), 1);
        assert_eq!(handle.destroy_count(), 1);
        assert!(!overlay.is_created());
    }
}
