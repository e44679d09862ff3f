//! Toggle state for the sticker filter.
//!
//! Every run is identified by a [`RunTicket`]. Toggling off, or loading a new
//! crop, advances the generation so that a late result from an earlier run is
//! recognized as stale and dropped instead of overwriting the current state.

use super::{FilterError, FilterStage, StickerImage};
use log::debug;

/// Where the filter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    NoFilter,
    Extracting,
    Compositing,
    Filtered,
}

impl FilterState {
    /// True while a run is in flight.
    pub fn is_loading(self) -> bool {
        matches!(self, FilterState::Extracting | FilterState::Compositing)
    }
}

impl From<FilterStage> for FilterState {
    fn from(stage: FilterStage) -> Self {
        match stage {
            FilterStage::Extracting => FilterState::Extracting,
            FilterStage::Compositing => FilterState::Compositing,
        }
    }
}

/// Identifies one filter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket(u64);

impl RunTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Outcome of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterToggle {
    /// A new run must be started under this ticket.
    Started(RunTicket),
    /// The original crop is shown again.
    Reverted,
}

#[derive(Debug, Default)]
pub struct StickerFilter {
    state: FilterState,
    generation: u64,
}

impl StickerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_filtered(&self) -> bool {
        self.state == FilterState::Filtered
    }

    /// Flip the filter on or off.
    ///
    /// Turning on from `NoFilter` begins a run. Any other state reverts to
    /// `NoFilter`; a run in flight is abandoned.
    pub fn toggle(&mut self) -> FilterToggle {
        match self.state {
            FilterState::NoFilter => {
                self.generation += 1;
                self.state = FilterState::Extracting;
                FilterToggle::Started(RunTicket(self.generation))
            }
            FilterState::Extracting | FilterState::Compositing => {
                debug!("Abandoning filter run {}", self.generation);
                self.generation += 1;
                self.state = FilterState::NoFilter;
                FilterToggle::Reverted
            }
            FilterState::Filtered => {
                self.state = FilterState::NoFilter;
                FilterToggle::Reverted
            }
        }
    }

    /// Drop any sticker or pending run. Used when a new crop arrives.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = FilterState::NoFilter;
    }

    /// Whether `ticket` belongs to the run currently in flight.
    pub fn is_current(&self, ticket: RunTicket) -> bool {
        ticket.0 == self.generation && self.state.is_loading()
    }

    /// Record a stage transition. Returns false for stale tickets.
    pub fn enter_stage(&mut self, ticket: RunTicket, stage: FilterStage) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = stage.into();
        true
    }

    /// Record the outcome of a run.
    ///
    /// Returns `None` if the ticket is stale; the result must then be
    /// discarded. Success moves to `Filtered`, failure back to `NoFilter`.
    pub fn finish(
        &mut self,
        ticket: RunTicket,
        result: Result<StickerImage, FilterError>,
    ) -> Option<Result<StickerImage, FilterError>> {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale filter result (run {}, current {})",
                ticket.0, self.generation
            );
            return None;
        }
        self.state = match result {
            Ok(_) => FilterState::Filtered,
            Err(_) => FilterState::NoFilter,
        };
        Some(result)
    }
}
