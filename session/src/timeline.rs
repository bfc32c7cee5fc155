use std::collections::HashMap;

use chrono::NaiveDate;

use agrideal_common::message::{ChatMessage, MessageKind};
use agrideal_common::proposal::{Proposal, ProposalId};

/// One renderable timeline entry.
#[derive(Debug, PartialEq)]
pub enum TimelineEntry<'a> {
    /// Calendar-day boundary, shown before the first entry of each day.
    DaySeparator(NaiveDate),
    /// A text or system message.
    Message(&'a ChatMessage),
    /// A system marker rendered as its bound proposal card.
    ProposalCard {
        message: &'a ChatMessage,
        proposal: &'a Proposal,
    },
}

/// Assemble entries from messages already ordered by `created_at`.
///
/// A marker whose proposal has not been merged yet degrades to a plain
/// message until the proposal arrives.
pub(crate) fn build<'a>(
    ordered: &[&'a ChatMessage],
    proposals: &'a HashMap<ProposalId, Proposal>,
) -> Vec<TimelineEntry<'a>> {
    let mut entries = Vec::with_capacity(ordered.len());
    let mut current_day: Option<NaiveDate> = None;

    for message in ordered {
        let day = message.created_at.date_naive();
        if current_day != Some(day) {
            entries.push(TimelineEntry::DaySeparator(day));
            current_day = Some(day);
        }

        let bound = message
            .bound_proposal_id
            .as_ref()
            .and_then(|id| proposals.get(id));
        match bound {
            Some(proposal) if message.kind == MessageKind::System => {
                entries.push(TimelineEntry::ProposalCard { message, proposal });
            }
            _ => entries.push(TimelineEntry::Message(message)),
        }
    }

    entries
}

/// Human label for a day separator.
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%-d %B %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_labels() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(), today),
            "Yesterday"
        );
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), today),
            "1 February 2026"
        );
    }
}
