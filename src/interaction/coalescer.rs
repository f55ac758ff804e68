use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::YearRange;

/// When brush updates are turned into published selection changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CoalescePolicy {
    /// Publish every change; suppress ranges equal to the current selection.
    #[default]
    DropIdentical,
    /// Like `DropIdentical`, but publish at most once per interval. Updates
    /// inside the interval are held and flushed on settle.
    MinInterval { seconds: f64 },
    /// Hold every update until the gesture settles.
    PublishOnSettle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalesceDecision {
    Publish(Option<YearRange>),
    /// Held for a later settle.
    Hold,
    /// Already the shared selection; publishing it would change nothing.
    Drop,
}

/// Sits between brush input and the selection publish call.
///
/// Redundancy is judged against the dashboard's current selection, which the
/// caller passes in, so a range moved by another source is never mistaken
/// for one this brush already sent. Timestamps are supplied by the host in
/// seconds, so the component stays deterministic and free of timers.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushCoalescer {
    policy: CoalescePolicy,
    last_publish_at: Option<f64>,
    pending: Option<Option<YearRange>>,
}

impl BrushCoalescer {
    #[must_use]
    pub fn new(policy: CoalescePolicy) -> Self {
        Self {
            policy,
            last_publish_at: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn policy(&self) -> CoalescePolicy {
        self.policy
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Offers one brush update taken at `now_seconds` while the shared
    /// selection is `current`.
    pub fn offer(
        &mut self,
        years: Option<YearRange>,
        current: Option<YearRange>,
        now_seconds: f64,
    ) -> CoalesceDecision {
        if years == current {
            self.pending = None;
            trace!(?years, "brush range matches the selection, dropped");
            return CoalesceDecision::Drop;
        }

        match self.policy {
            CoalescePolicy::DropIdentical => self.publish(years, now_seconds),
            CoalescePolicy::MinInterval { seconds } => {
                let due = self
                    .last_publish_at
                    .is_none_or(|at| now_seconds - at >= seconds);
                if due {
                    self.publish(years, now_seconds)
                } else {
                    self.pending = Some(years);
                    CoalesceDecision::Hold
                }
            }
            CoalescePolicy::PublishOnSettle => {
                self.pending = Some(years);
                CoalesceDecision::Hold
            }
        }
    }

    /// Flushes the held update when the gesture ends.
    pub fn settle(&mut self, current: Option<YearRange>, now_seconds: f64) -> CoalesceDecision {
        match self.pending.take() {
            Some(years) if years != current => self.publish(years, now_seconds),
            _ => CoalesceDecision::Drop,
        }
    }

    /// Discards a held update, e.g. after another source moved the selection.
    pub fn discard_pending(&mut self) {
        self.pending = None;
    }

    /// Forgets history, e.g. after the underlying data changed.
    pub fn reset(&mut self) {
        self.last_publish_at = None;
        self.pending = None;
    }

    fn publish(&mut self, years: Option<YearRange>, now_seconds: f64) -> CoalesceDecision {
        self.pending = None;
        self.last_publish_at = Some(now_seconds);
        CoalesceDecision::Publish(years)
    }
}
