//! Booth capture state machine.
//!
//! The session owns the four photo slots and every capture-in-flight flag.
//! It never touches a clock: the timed countdown advances only through
//! [`CaptureSession::tick`], and a capture is a two-step exchange where a
//! [`CaptureTicket`] is issued synchronously and later redeemed with the
//! composed photo. Tickets carry the session generation, so results arriving
//! after a reset or mode switch are discarded.

use crate::{EncodedImage, ReadyState};

use std::fmt;

use tracing::{debug, info, instrument, warn};

/// Number of photos in a finished session.
pub const PHOTO_COUNT: usize = 4;

/// Default seconds between timed captures.
pub const DEFAULT_INTERVAL_SECS: u32 = 3;

/// Which trigger owns the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// One explicit trigger per photo.
    Manual,
    /// A repeating countdown fills the remaining slots.
    Timed,
}

/// Why a capture was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// User trigger in manual mode.
    Manual,
    /// Countdown reached zero.
    Timed,
    /// Replacement of the selected slot.
    Retake,
}

/// Proof that a capture was admitted; redeem it with
/// [`CaptureSession::complete`] or release it with [`CaptureSession::abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTicket {
    kind: CaptureKind,
    slot: usize,
    generation: u64,
}

impl CaptureTicket {
    /// Trigger that issued the ticket.
    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    /// Slot the photo will land in.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// A capture request that was turned into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRejected {
    /// All slots are already filled.
    Full,
    /// Retake needs a full session.
    NotFull,
    /// The video source has no current frame.
    SourceNotReady,
    /// Another capture has not finished yet.
    InFlight,
    /// The request belongs to the other capture mode.
    WrongMode,
    /// The countdown is already running.
    CountdownActive,
    /// Retake requested without a selected slot.
    NoSelection,
    /// Slot index outside `0..PHOTO_COUNT`.
    InvalidSlot,
    /// The ticket was issued before a reset or mode switch.
    Stale,
}

impl fmt::Display for CaptureRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Full => "all photos taken",
            Self::NotFull => "session is not full yet",
            Self::SourceNotReady => "camera is not ready",
            Self::InFlight => "a capture is already in progress",
            Self::WrongMode => "not available in the current capture mode",
            Self::CountdownActive => "countdown already running",
            Self::NoSelection => "no photo selected",
            Self::InvalidSlot => "no such photo slot",
            Self::Stale => "capture was superseded",
        };
        f.write_str(text)
    }
}

/// Running countdown of the timed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Seconds until the next capture.
    pub remaining_secs: u32,
    /// Timed captures still to take.
    pub quota: usize,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No countdown is running.
    Idle,
    /// Still counting down (or waiting for the previous capture).
    Counting {
        /// Seconds left on the display.
        remaining_secs: u32,
    },
    /// Countdown hit zero: grab a frame for this ticket.
    Capture(CaptureTicket),
    /// The countdown ended without a capture because the session is full.
    Finished,
}

/// Booth state: slots, mode, countdown, retake selection.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    slots: [Option<EncodedImage>; PHOTO_COUNT],
    mode: CaptureMode,
    interval_secs: u32,
    countdown: Option<Countdown>,
    in_flight: Option<CaptureTicket>,
    selected: Option<usize>,
    generation: u64,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_SECS)
    }
}

impl CaptureSession {
    /// Creates an empty manual-mode session whose timed captures fire every
    /// `interval_secs` seconds (at least one).
    pub fn new(interval_secs: u32) -> Self {
        Self {
            slots: Default::default(),
            mode: CaptureMode::Manual,
            interval_secs: interval_secs.max(1),
            countdown: None,
            in_flight: None,
            selected: None,
            generation: 0,
        }
    }

    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// All slots filled.
    pub fn is_full(&self) -> bool {
        self.filled() == PHOTO_COUNT
    }

    /// Full, with no retake selected and nothing in flight.
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.selected.is_none() && self.in_flight.is_none()
    }

    /// Photo in `index`, if captured.
    pub fn slot(&self, index: usize) -> Option<&EncodedImage> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Current capture mode.
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Seconds between timed captures.
    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// Running countdown, if any.
    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    /// Slot selected for retake.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// True while a grab is pending.
    pub fn is_capturing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The four photos in slot order once the session is complete.
    pub fn photos(&self) -> Option<Vec<EncodedImage>> {
        if !self.is_complete() {
            return None;
        }
        self.slots.iter().cloned().collect()
    }

    /// Switches capture mode. Any countdown and pending capture are
    /// cancelled; their tickets become stale.
    #[instrument(skip(self))]
    pub fn set_mode(&mut self, mode: CaptureMode) {
        if self.mode == mode {
            return;
        }
        self.invalidate();
        self.mode = mode;
        info!(?mode, "Capture mode switched");
    }

    /// Admits one manual capture. The in-flight flag is set before this
    /// returns, so a second trigger is rejected until the ticket is settled.
    pub fn request_manual(&mut self, ready: ReadyState) -> Result<CaptureTicket, CaptureRejected> {
        if self.mode != CaptureMode::Manual {
            return Err(CaptureRejected::WrongMode);
        }
        let slot = self.next_empty().ok_or(CaptureRejected::Full)?;
        self.admit(CaptureKind::Manual, slot, ready)
    }

    /// Starts the countdown for the remaining slots.
    pub fn start_countdown(&mut self) -> Result<Countdown, CaptureRejected> {
        if self.mode != CaptureMode::Timed {
            return Err(CaptureRejected::WrongMode);
        }
        if self.countdown.is_some() {
            return Err(CaptureRejected::CountdownActive);
        }
        if self.in_flight.is_some() {
            return Err(CaptureRejected::InFlight);
        }
        let quota = PHOTO_COUNT - self.filled();
        if quota == 0 {
            return Err(CaptureRejected::Full);
        }
        let countdown = Countdown {
            remaining_secs: self.interval_secs,
            quota,
        };
        self.countdown = Some(countdown);
        info!(interval_secs = self.interval_secs, quota, "Countdown started");
        Ok(countdown)
    }

    /// Stops the countdown. A timed capture already in flight is discarded.
    pub fn cancel_countdown(&mut self) -> bool {
        if self.countdown.take().is_none() {
            return false;
        }
        if matches!(self.in_flight, Some(t) if t.kind == CaptureKind::Timed) {
            self.in_flight = None;
            self.generation += 1;
        }
        debug!("Countdown cancelled");
        true
    }

    /// Advances the countdown by one second.
    ///
    /// Ticks arriving after the session filled up stop the countdown and
    /// never produce a capture.
    pub fn tick(&mut self, ready: ReadyState) -> TickOutcome {
        let Some(mut countdown) = self.countdown else {
            return TickOutcome::Idle;
        };
        if self.is_full() || countdown.quota == 0 {
            self.countdown = None;
            return TickOutcome::Finished;
        }
        if self.in_flight.is_some() {
            return TickOutcome::Counting {
                remaining_secs: countdown.remaining_secs,
            };
        }

        countdown.remaining_secs = countdown.remaining_secs.saturating_sub(1);
        self.countdown = Some(countdown);
        if countdown.remaining_secs > 0 {
            return TickOutcome::Counting {
                remaining_secs: countdown.remaining_secs,
            };
        }

        let Some(slot) = self.next_empty() else {
            self.countdown = None;
            return TickOutcome::Finished;
        };
        match self.admit(CaptureKind::Timed, slot, ready) {
            Ok(ticket) => TickOutcome::Capture(ticket),
            Err(reason) => {
                // Stay at zero and try again on the next tick.
                debug!(%reason, "Timed capture deferred");
                TickOutcome::Counting { remaining_secs: 0 }
            }
        }
    }

    /// Selects the slot to retake. Only valid once full.
    pub fn select(&mut self, index: usize) -> Result<(), CaptureRejected> {
        if index >= PHOTO_COUNT {
            return Err(CaptureRejected::InvalidSlot);
        }
        if !self.is_full() {
            return Err(CaptureRejected::NotFull);
        }
        if self.in_flight.is_some() {
            return Err(CaptureRejected::InFlight);
        }
        self.selected = Some(index);
        debug!(slot = index, "Slot selected for retake");
        Ok(())
    }

    /// Drops the retake selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Admits a retake of the selected slot.
    pub fn request_retake(&mut self, ready: ReadyState) -> Result<CaptureTicket, CaptureRejected> {
        if !self.is_full() {
            return Err(CaptureRejected::NotFull);
        }
        if self.countdown.is_some() {
            return Err(CaptureRejected::CountdownActive);
        }
        let slot = self.selected.ok_or(CaptureRejected::NoSelection)?;
        self.admit(CaptureKind::Retake, slot, ready)
    }

    /// Stores the photo for `ticket`. Returns the slot written.
    ///
    /// Timed completions consume quota and rearm the countdown until the
    /// session is full. Retakes overwrite their slot in place and clear the
    /// selection.
    #[instrument(skip(self, photo), fields(bytes = photo.len()))]
    pub fn complete(
        &mut self,
        ticket: CaptureTicket,
        photo: EncodedImage,
    ) -> Result<usize, CaptureRejected> {
        self.settle(ticket)?;

        match ticket.kind {
            CaptureKind::Retake => {
                self.slots[ticket.slot] = Some(photo);
                self.selected = None;
                info!(slot = ticket.slot, "Photo retaken");
            }
            CaptureKind::Manual | CaptureKind::Timed => {
                if self.slots[ticket.slot].is_some() {
                    warn!(slot = ticket.slot, "Slot already filled, photo dropped");
                    return Err(CaptureRejected::Full);
                }
                self.slots[ticket.slot] = Some(photo);
                info!(slot = ticket.slot, filled = self.filled(), "Photo captured");
            }
        }

        if ticket.kind == CaptureKind::Timed
            && let Some(mut countdown) = self.countdown
        {
            countdown.quota = countdown.quota.saturating_sub(1);
            if countdown.quota == 0 || self.is_full() {
                self.countdown = None;
                info!("Countdown finished");
            } else {
                countdown.remaining_secs = self.interval_secs;
                self.countdown = Some(countdown);
            }
        }

        Ok(ticket.slot)
    }

    /// Releases `ticket` without a photo (the frame could not be grabbed).
    /// A timed capture rearms its countdown.
    pub fn abort(&mut self, ticket: CaptureTicket) -> Result<(), CaptureRejected> {
        self.settle(ticket)?;
        if ticket.kind == CaptureKind::Timed
            && let Some(countdown) = self.countdown.as_mut()
        {
            countdown.remaining_secs = self.interval_secs;
        }
        debug!(slot = ticket.slot, kind = ?ticket.kind, "Capture aborted");
        Ok(())
    }

    /// Clears every slot and cancels all pending work.
    pub fn reset(&mut self) {
        self.invalidate();
        self.slots = Default::default();
        info!("Capture session reset");
    }

    fn admit(
        &mut self,
        kind: CaptureKind,
        slot: usize,
        ready: ReadyState,
    ) -> Result<CaptureTicket, CaptureRejected> {
        if self.in_flight.is_some() {
            return Err(CaptureRejected::InFlight);
        }
        if !ready.has_current_frame() {
            return Err(CaptureRejected::SourceNotReady);
        }
        let ticket = CaptureTicket {
            kind,
            slot,
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    fn settle(&mut self, ticket: CaptureTicket) -> Result<(), CaptureRejected> {
        if ticket.generation != self.generation || self.in_flight != Some(ticket) {
            debug!(slot = ticket.slot, kind = ?ticket.kind, "Stale capture ignored");
            return Err(CaptureRejected::Stale);
        }
        self.in_flight = None;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.countdown = None;
        self.in_flight = None;
        self.selected = None;
        self.generation += 1;
    }

    fn next_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }
}
