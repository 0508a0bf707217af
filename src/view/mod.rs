//! Page-scoped view state that composes into request parameters
//!
//! Each page owns its state exclusively. The riders and reservations
//! filters are persisted across reloads; modals never are.

pub mod debounce;
pub mod drivers;
pub mod feedback;
pub mod filters;
pub mod modal;
pub mod reservations;
pub mod riders;

pub use debounce::SearchDebouncer;
pub use drivers::{DriversPageState, DRIVERS_PAGE_SIZE};
pub use feedback::FeedbackUiState;
pub use filters::{FilterState, SortOrder};
pub use modal::{EntityModalKind, ModalState, ReservationModalKind};
pub use reservations::{DateFilter, ReassignModal, ReservationsPageState};
pub use riders::RidersPageState;
