//! Push-button edge detection
//!
//! Buttons are polled once per frame, typically from a scene's update hook.

use embedded_hal::digital::InputPin;

/// Active-high push button
///
/// Reports a press once per low-to-high edge, no matter how many polls the
/// button stays held for. No debouncing is done; poll at frame rate.
pub struct Button<P> {
    pin: P,
    pressed: bool,
}

impl<P: InputPin> Button<P> {
    /// Wrap an input pin. The button starts released.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pressed: false,
        }
    }

    /// Whether the button went down since the last poll
    ///
    /// Returns `true` only on the first poll that reads high after a low.
    /// Reading low re-arms the button.
    pub fn just_pressed(&mut self) -> Result<bool, P::Error> {
        if self.pin.is_high()? {
            let edge = !self.pressed;
            if edge {
                trace!("Button pressed");
            }
            self.pressed = true;
            Ok(edge)
        } else {
            if self.pressed {
                trace!("Button released");
            }
            self.pressed = false;
            Ok(false)
        }
    }

    /// Whether the button was held at the last poll
    pub fn is_held(&self) -> bool {
        self.pressed
    }

    /// Give back the pin
    pub fn release(self) -> P {
        self.pin
    }
}
