//! Homing procedure phases

/// Step of a homing or calibration procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    /// No procedure running
    #[default]
    Idle,
    /// Lowering the bed before the first seek
    PreSeek,
    /// Fast upward search for the sensors
    CoarseSeek,
    /// Backing off the sensors after a seek
    Retract,
    /// Slow upward search for an accurate contact point
    FineSeek,
    /// Lowering until every sensor reads clear
    Detach,
    /// Procedure completed
    Done,
    /// Procedure failed, the hard fault is raised
    Faulted,
}

impl HomingPhase {
    /// Check whether a procedure may move from `self` to `next`
    pub const fn allows(self, next: HomingPhase) -> bool {
        use HomingPhase::*;

        if let Faulted = next {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, PreSeek)
                | (Idle, CoarseSeek)
                | (PreSeek, CoarseSeek)
                | (CoarseSeek, Retract)
                | (CoarseSeek, Detach)
                | (Retract, FineSeek)
                | (FineSeek, Detach)
                | (Detach, Retract)
                | (Detach, Done)
        )
    }

    /// `Done` and `Faulted` end a procedure
    pub const fn is_terminal(self) -> bool {
        matches!(self, HomingPhase::Done | HomingPhase::Faulted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homing_path_is_allowed() {
        let path = [
            HomingPhase::Idle,
            HomingPhase::PreSeek,
            HomingPhase::CoarseSeek,
            HomingPhase::Retract,
            HomingPhase::FineSeek,
            HomingPhase::Detach,
            HomingPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].allows(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_calibration_path_is_allowed() {
        let path = [
            HomingPhase::Idle,
            HomingPhase::CoarseSeek,
            HomingPhase::Detach,
            HomingPhase::Retract,
            HomingPhase::FineSeek,
            HomingPhase::Detach,
            HomingPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].allows(pair[1]));
        }
    }

    #[test]
    fn test_terminal_phases() {
        assert!(HomingPhase::FineSeek.allows(HomingPhase::Faulted));
        assert!(!HomingPhase::Faulted.allows(HomingPhase::Idle));
        assert!(!HomingPhase::Faulted.allows(HomingPhase::Faulted));
        assert!(!HomingPhase::Done.allows(HomingPhase::Faulted));
        assert!(!HomingPhase::Idle.allows(HomingPhase::Done));
        assert!(!HomingPhase::Retract.allows(HomingPhase::CoarseSeek));
    }
}
