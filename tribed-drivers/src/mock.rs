//! Mock pins for driver tests

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal_async::digital::Wait;

/// Output pin recording its level and write count
pub struct MockOutput {
    high: bool,
    writes: u32,
}

impl MockOutput {
    pub fn low() -> Self {
        Self {
            high: false,
            writes: 0,
        }
    }

    pub fn high() -> Self {
        Self {
            high: true,
            writes: 0,
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ErrorType for MockOutput {
    type Error = Infallible;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}

impl StatefulOutputPin for MockOutput {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

/// Input pin at a fixed level whose waits complete immediately
pub struct MockInput {
    high: bool,
    waits: u32,
}

impl MockInput {
    pub fn new(high: bool) -> Self {
        Self { high, waits: 0 }
    }

    pub fn waits(&self) -> u32 {
        self.waits
    }
}

impl ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

impl Wait for MockInput {
    async fn wait_for_high(&mut self) -> Result<(), Infallible> {
        self.waits += 1;
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Infallible> {
        self.waits += 1;
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
        self.waits += 1;
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
        self.waits += 1;
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
        self.waits += 1;
        Ok(())
    }
}
