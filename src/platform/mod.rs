//! Host platform bindings: global input hooks, the overlay window and the
//! main-thread message pump.

#[cfg(windows)]
pub mod win32;

#[cfg(windows)]
pub use win32::{HookInputSource as DefaultInputSource, LayeredOverlay as DefaultOverlay};
#[cfg(windows)]
pub use win32::Win32Pump as DefaultPump;

#[cfg(not(windows))]
pub use unsupported::{
    UnsupportedInput as DefaultInputSource, UnsupportedOverlay as DefaultOverlay,
    UnsupportedPump as DefaultPump,
};

#[cfg(not(windows))]
mod unsupported {
    use crate::error::TrackerError;
    use crate::input::{InputSink, InputSource};
    use crate::overlay::{OverlayGeometry, OverlayStyle, OverlayWindow};
    use crate::scheduler::{MessagePump, Retrieved};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub struct UnsupportedInput;

    impl UnsupportedInput {
        pub fn new(_ignore_injected: bool) -> Self {
            Self
        }
    }

    impl InputSource for UnsupportedInput {
        fn subscribe(&mut self, _sink: Arc<dyn InputSink>) -> Result<(), TrackerError> {
            Err(TrackerError::subscription(
                "global input hooks are not supported on this platform",
            ))
        }

        fn unsubscribe(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        fn is_subscribed(&self) -> bool {
            false
        }
    }

    #[derive(Debug, Default)]
    pub struct UnsupportedOverlay;

    impl UnsupportedOverlay {
        pub fn new() -> Self {
            Self
        }
    }

    impl OverlayWindow for UnsupportedOverlay {
        fn create(
            &mut self,
            _geometry: &OverlayGeometry,
            _style: &OverlayStyle,
        ) -> Result<(), TrackerError> {
            Err(TrackerError::window_setup(
                "overlay windows are not supported on this platform",
            ))
        }

        fn request_repaint(&self, _value: u64) {}

        fn destroy(&mut self) {}

        fn is_created(&self) -> bool {
            false
        }
    }

    #[derive(Debug)]
    pub struct UnsupportedPump;

    impl UnsupportedPump {
        pub fn new(_tick: Duration) -> Result<Self, TrackerError> {
            Err(TrackerError::window_setup(
                "message loop is not supported on this platform",
            ))
        }
    }

    impl MessagePump for UnsupportedPump {
        type Message = ();

        fn wait(&mut self) -> Retrieved<()> {
            Retrieved::Quit
        }

        fn dispatch(&mut self, _message: ()) {}
    }
}
