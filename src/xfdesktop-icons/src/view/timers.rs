//! One-shot timers requested from the host
//!
//! The view never sleeps. It asks the host for a timer with
//! [`ViewEvent::ScheduleTimer`] and is told about expiry through
//! [`IconView::timer_fired`]. Ids of cancelled timers are never reused,
//! so a late expiry of a cancelled timer is recognised and ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{IconView, ViewEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    ContextMenu,
    TypeAheadReset,
}

#[derive(Debug, Default)]
pub(crate) struct Timers {
    next: u64,
    context_menu: Option<TimerId>,
    typeahead: Option<TimerId>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::ContextMenu => &mut self.context_menu,
            TimerKind::TypeAheadReset => &mut self.typeahead,
        }
    }

    pub fn pending(&self, kind: TimerKind) -> Option<TimerId> {
        match kind {
            TimerKind::ContextMenu => self.context_menu,
            TimerKind::TypeAheadReset => self.typeahead,
        }
    }

    /// Claim `id` if it is the live timer of some kind
    fn claim(&mut self, id: TimerId) -> Option<TimerKind> {
        if self.context_menu == Some(id) {
            self.context_menu = None;
            Some(TimerKind::ContextMenu)
        } else if self.typeahead == Some(id) {
            self.typeahead = None;
            Some(TimerKind::TypeAheadReset)
        } else {
            None
        }
    }
}

impl IconView {
    /// (Re)start a timer. Any pending timer of the same kind is cancelled.
    pub(crate) fn schedule_timer(&mut self, kind: TimerKind, delay: Duration) {
        self.cancel_timer(kind);
        self.timers.next += 1;
        let id = TimerId(self.timers.next);
        *self.timers.slot(kind) = Some(id);
        self.emit(ViewEvent::ScheduleTimer { id, delay });
    }

    pub(crate) fn cancel_timer(&mut self, kind: TimerKind) {
        if let Some(id) = self.timers.slot(kind).take() {
            self.emit(ViewEvent::CancelTimer(id));
        }
    }

    pub(crate) fn timer_pending(&self, kind: TimerKind) -> bool {
        self.timers.pending(kind).is_some()
    }

    /// Expiry of a timer the view asked for
    pub fn timer_fired(&mut self, id: TimerId) {
        match self.timers.claim(id) {
            Some(TimerKind::ContextMenu) => self.context_menu_timeout(),
            Some(TimerKind::TypeAheadReset) => {
                debug!("Type-ahead buffer reset");
                self.typeahead.clear();
            }
            None => debug!("Ignoring stale timer {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::view_with_grid;

    #[test]
    fn test_reschedule_cancels_previous() {
        let mut view = view_with_grid(1, 1);
        view.schedule_timer(TimerKind::TypeAheadReset, Duration::from_millis(10));
        view.schedule_timer(TimerKind::TypeAheadReset, Duration::from_millis(10));
        assert_eq!(
            view.take_events(),
            vec![
                ViewEvent::ScheduleTimer {
                    id: TimerId(1),
                    delay: Duration::from_millis(10)
                },
                ViewEvent::CancelTimer(TimerId(1)),
                ViewEvent::ScheduleTimer {
                    id: TimerId(2),
                    delay: Duration::from_millis(10)
                },
            ]
        );
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut view = view_with_grid(1, 1);
        view.typeahead.push('a');
        view.schedule_timer(TimerKind::TypeAheadReset, Duration::from_millis(10));
        view.schedule_timer(TimerKind::TypeAheadReset, Duration::from_millis(10));

        view.timer_fired(TimerId(1));
        assert_eq!(view.typeahead_buffer(), "a");

        view.timer_fired(TimerId(2));
        assert_eq!(view.typeahead_buffer(), "");
        assert!(!view.timer_pending(TimerKind::TypeAheadReset));
    }
}
