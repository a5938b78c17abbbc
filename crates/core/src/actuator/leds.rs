use super::{Actuators, Endpoint};

/// Sysfs names of the button LEDs. They are swapped on the board:
/// `a-button-led` is the red LED under B, `b-button-led` the green one under A.
pub const A_BUTTON_LED: &str = "a-button-led";
pub const B_BUTTON_LED: &str = "b-button-led";

/// RGB LED under one D-pad direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpadLed {
    Up,
    Down,
    Left,
    Right,
}

impl DpadLed {
    pub const ALL: [DpadLed; 4] = [DpadLed::Up, DpadLed::Down, DpadLed::Left, DpadLed::Right];

    pub fn name(self) -> &'static str {
        match self {
            DpadLed::Up => "up",
            DpadLed::Down => "down",
            DpadLed::Left => "left",
            DpadLed::Right => "right",
        }
    }

    fn channel(self, color: &str) -> Endpoint {
        Endpoint::Led(format!("{}-led-{color}", self.name()))
    }
}

/// Sets a named LED. Returns `false` if the LED does not exist.
pub fn set_led(actuators: &dyn Actuators, name: &str, brightness: u8) -> bool {
    actuators.set_numeric(&Endpoint::Led(name.to_owned()), i64::from(brightness))
}

/// Sets the three channels of a D-pad LED.
pub fn dpad_rgb(actuators: &dyn Actuators, led: DpadLed, r: u8, g: u8, b: u8) -> bool {
    let red = actuators.set_numeric(&led.channel("red"), i64::from(r));
    let green = actuators.set_numeric(&led.channel("green"), i64::from(g));
    let blue = actuators.set_numeric(&led.channel("blue"), i64::from(b));
    red && green && blue
}

/// Sets a D-pad LED from a `0xRRGGBB` colour.
pub fn dpad_color(actuators: &dyn Actuators, led: DpadLed, rgb: u32) -> bool {
    let [_, r, g, b] = rgb.to_be_bytes();
    dpad_rgb(actuators, led, r, g, b)
}

/// Turns off both button LEDs and all four D-pad LEDs.
pub fn all_off(actuators: &dyn Actuators) {
    set_led(actuators, A_BUTTON_LED, 0);
    set_led(actuators, B_BUTTON_LED, 0);
    for led in DpadLed::ALL {
        dpad_rgb(actuators, led, 0, 0, 0);
    }
}
