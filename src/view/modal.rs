//! Entity modal state machine
//!
//! `Closed` is both the initial and the terminal state. Any open modal goes
//! back to `Closed` through [`ModalState::close`], and no entity is held
//! while closed.

/// Modal kinds on the riders and drivers pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityModalKind {
    View,
    Edit,
    Create,
}

/// Modal kinds on the reservations page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationModalKind {
    View,
    Edit,
    Create,
    /// Pick a driver for the reservation
    Assign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState<K, E> {
    Closed,
    Open { kind: K, entity: Option<E> },
}

impl<K, E> Default for ModalState<K, E> {
    fn default() -> Self {
        ModalState::Closed
    }
}

impl<K: Copy, E> ModalState<K, E> {
    /// Open as `kind`, replacing whatever was open before
    pub fn open(&mut self, kind: K, entity: Option<E>) {
        *self = ModalState::Open { kind, entity };
    }

    pub fn close(&mut self) {
        *self = ModalState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open { .. })
    }

    pub fn kind(&self) -> Option<K> {
        match self {
            ModalState::Open { kind, .. } => Some(*kind),
            ModalState::Closed => None,
        }
    }

    pub fn entity(&self) -> Option<&E> {
        match self {
            ModalState::Open { entity, .. } => entity.as_ref(),
            ModalState::Closed => None,
        }
    }

    /// Replace the selected entity without changing the kind; no-op when closed
    pub fn select(&mut self, selected: Option<E>) {
        if let ModalState::Open { entity, .. } = self {
            *entity = selected;
        }
    }
}
