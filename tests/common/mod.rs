#![allow(dead_code)]

use luv_light_engine::{PwmChannel, PwmOutput};

/// Recording PWM sink: remembers the last duty written to each channel.
#[derive(Debug, Default, Clone)]
pub struct MockPwm {
    duties: [u16; 5],
}

impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duty(&self, channel: PwmChannel) -> u16 {
        self.duties[index(channel)]
    }

    pub fn color_duties(&self) -> (u16, u16, u16) {
        (
            self.duty(PwmChannel::Red),
            self.duty(PwmChannel::Green),
            self.duty(PwmChannel::Blue),
        )
    }
}

impl PwmOutput for MockPwm {
    fn write(&mut self, channel: PwmChannel, duty: u16) {
        self.duties[index(channel)] = duty;
    }
}

fn index(channel: PwmChannel) -> usize {
    match channel {
        PwmChannel::Red => 0,
        PwmChannel::Green => 1,
        PwmChannel::Blue => 2,
        PwmChannel::WarmWhite => 3,
        PwmChannel::ColdWhite => 4,
    }
}
