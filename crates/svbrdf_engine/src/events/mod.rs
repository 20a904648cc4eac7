//! Input events delivered by the host window
//!
//! The viewer does not own a window. Whatever event loop hosts it translates
//! its native events into [`AppEvent`] values, in arrival order, and hands
//! them to the renderer.

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button; drags orbit the camera
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Quit
    Escape,
    /// Any other key
    Other,
}

/// One window event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Pointer moved to window pixel `(x, y)`, origin top-left
    CursorMoved {
        /// Horizontal position
        x: f32,
        /// Vertical position
        y: f32,
    },
    /// Button pressed or released
    MouseInput {
        /// Which button
        button: MouseButton,
        /// `true` on press
        pressed: bool,
    },
    /// Wheel turned; positive is away from the user
    MouseWheel {
        /// Vertical notches
        delta: f32,
    },
    /// Drawable area changed size
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// Key pressed
    KeyPressed(KeyCode),
    /// The window asked to close
    CloseRequested,
    /// The window needs repainting
    RedrawRequested,
}

/// What the host should do after an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// Nothing changed
    Ignored,
    /// Camera or viewport changed; schedule a redraw
    Redraw,
    /// Leave the event loop
    Quit,
}
