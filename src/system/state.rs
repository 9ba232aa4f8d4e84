//! Motion State
//!
//! Phase of the motion controller. Between calls the controller is always
//! `Idle`; a move passes through `Moving` while it waits for its tick target
//! and `Stopped` while it zeroes the encoders and settles.

/// Motion controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// No move in progress, motors stopped, encoders zeroed
    #[default]
    Idle,
    /// Motors commanded, waiting for the tick target
    Moving,
    /// Motors stopped, encoders being zeroed and momentum settling
    Stopped,
}

impl MotionPhase {
    pub(crate) fn set(&mut self, next: MotionPhase) {
        trace!("motion phase {:?} -> {:?}", *self, next);
        *self = next;
    }
}
