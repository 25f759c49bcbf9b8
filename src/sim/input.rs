//! Raw input events mapped to game intents
//!
//! Keyboard and touch both collapse to the same four intents; the engine's
//! debounce rules decide whether an intent takes effect. A controller is
//! constructed for one run and dropped with it, so no listener outlives
//! the run it was wired to.

/// Keys the game reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    Enter,
    Other,
}

/// Raw events as delivered by the platform layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Touch start with the vertical contact point as a 0..1 fraction of
    /// the play area (0 is the top edge)
    TouchStart { y_fraction: f64 },
    TouchEnd,
}

/// Player intents the engine understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Jump,
    Duck,
    StopDucking,
    /// Start a new run when idle
    Confirm,
}

/// Stateless event-to-intent mapping, gated on whether a run is active
#[derive(Clone, Copy, Debug, Default)]
pub struct InputController;

impl InputController {
    pub fn new() -> Self {
        Self
    }

    /// Translate one raw event. Returns None for events the current game
    /// state ignores.
    pub fn map(&self, event: RawEvent, playing: bool) -> Option<Intent> {
        match event {
            RawEvent::KeyDown(Key::Space) | RawEvent::KeyDown(Key::ArrowUp) if playing => {
                Some(Intent::Jump)
            }
            RawEvent::KeyDown(Key::ArrowDown) if playing => Some(Intent::Duck),
            RawEvent::KeyDown(Key::Enter) if !playing => Some(Intent::Confirm),
            RawEvent::KeyUp(Key::ArrowDown) => Some(Intent::StopDucking),
            // Top half of the screen jumps, bottom half ducks.
            RawEvent::TouchStart { y_fraction } if playing => {
                if y_fraction < 0.5 {
                    Some(Intent::Jump)
                } else {
                    Some(Intent::Duck)
                }
            }
            RawEvent::TouchEnd => Some(Intent::StopDucking),
            _ => None,
        }
    }
}
