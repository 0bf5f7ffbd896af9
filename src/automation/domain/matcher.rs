//! Rule matching: which automations fire for a domain event.

use super::Automation;
use crate::event::DomainEvent;

/// Pure matcher selecting the automations that fire for an event.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMatcher;

impl RuleMatcher {
    /// Returns the active automations of the event's project whose trigger
    /// matches the event, in creation order.
    #[must_use]
    pub fn matching<'a>(event: &DomainEvent, candidates: &'a [Automation]) -> Vec<&'a Automation> {
        if event.trigger_kind().is_none() {
            return Vec::new();
        }
        let mut matched: Vec<&Automation> = candidates
            .iter()
            .filter(|automation| automation.matches(event))
            .collect();
        matched.sort_by_key(|automation| automation.created_at());
        matched
    }
}
