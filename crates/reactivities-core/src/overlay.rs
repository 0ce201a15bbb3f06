//! Modal slot and toast notifications shared by all screens.

use std::sync::{Mutex, PoisonError};

/// Content that can occupy the single modal slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    LoginForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A non-blocking toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Overlay {
    modal: Mutex<Option<Modal>>,
    notices: Mutex<Vec<Notice>>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `modal`, replacing whatever was open.
    pub fn open_modal(&self, modal: Modal) {
        *self.modal.lock().unwrap_or_else(PoisonError::into_inner) = Some(modal);
    }

    pub fn close_modal(&self) {
        *self.modal.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn modal(&self) -> Option<Modal> {
        *self.modal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }

    /// Take every pending notice, oldest first.
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_slot_holds_one_modal() {
        let overlay = Overlay::new();
        assert_eq!(overlay.modal(), None);
        overlay.open_modal(Modal::LoginForm);
        assert_eq!(overlay.modal(), Some(Modal::LoginForm));
        overlay.close_modal();
        assert_eq!(overlay.modal(), None);
    }

    #[test]
    fn notices_drain_in_order() {
        let overlay = Overlay::new();
        overlay.notify(Notice::success("first"));
        overlay.notify(Notice::error("second"));
        let drained = overlay.drain_notices();
        assert_eq!(drained, vec![Notice::success("first"), Notice::error("second")]);
        assert!(overlay.drain_notices().is_empty());
    }
}
