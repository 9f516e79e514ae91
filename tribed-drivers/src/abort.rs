//! Out-of-band abort input

use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::infallible;

/// Emergency stop input
pub struct AbortInput<I> {
    pin: I,
    active_low: bool,
}

impl<I: InputPin<Error = Infallible>> AbortInput<I> {
    pub fn new(pin: I, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    pub fn is_asserted(&mut self) -> bool {
        infallible(self.pin.is_high()) != self.active_low
    }
}

impl<I: InputPin<Error = Infallible> + Wait> AbortInput<I> {
    /// Wait until the input is asserted
    pub async fn wait_for_assert(&mut self) {
        let result = if self.active_low {
            self.pin.wait_for_low().await
        } else {
            self.pin.wait_for_high().await
        };
        infallible(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInput;

    #[test]
    fn test_polarity() {
        let mut abort = AbortInput::new(MockInput::new(false), true);
        assert!(abort.is_asserted());

        let mut abort = AbortInput::new(MockInput::new(false), false);
        assert!(!abort.is_asserted());
    }

    #[test]
    fn test_wait_for_assert_returns() {
        let mut abort = AbortInput::new(MockInput::new(false), true);
        embassy_futures::block_on(abort.wait_for_assert());
        assert_eq!(abort.pin.waits(), 1);
    }
}
