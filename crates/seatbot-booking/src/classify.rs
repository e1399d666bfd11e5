//! Lexical classification of the portal's business-rule refusals.
//!
//! The portal reports refusals as free-text Chinese messages with no
//! machine-readable code beyond "non-zero". Classification is therefore
//! substring matching against known phrasings — brittle by nature, kept
//! in one ordered rule table so a new phrasing is a one-line addition.

use seatbot_core::types::TimeRange;

/// Refusal classes the booking engine reacts to. Anything the table does
/// not match is terminal for the current selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The seat/time-range is already reserved by someone else.
    Occupied,
    /// Submitted before the portal's daily opening instant.
    NotYetOpen,
}

/// Known refusal phrasings, first match wins. The "not yet open" refusal
/// is matched separately against the configured opening-time literal,
/// since that string is site policy rather than fixed wording.
const REJECTION_RULES: &[(&str, Rejection)] = &[
    ("该座位已被预约", Rejection::Occupied),
    ("已有人预约该座位", Rejection::Occupied),
    ("座位已被占用", Rejection::Occupied),
];

/// Display text the portal uses for a seat with no existing reservation.
const NO_RESERVATION: &str = "无预约";

/// Classify a refusal message. `opening_marker` is the portal's opening
/// time literal (e.g. `"07:00"`), embedded verbatim in its "not yet open"
/// refusals.
pub fn classify(msg: &str, opening_marker: &str) -> Option<Rejection> {
    for (phrase, rejection) in REJECTION_RULES {
        if msg.contains(phrase) {
            return Some(*rejection);
        }
    }
    if !opening_marker.is_empty() && msg.contains(opening_marker) {
        return Some(Rejection::NotYetOpen);
    }
    None
}

/// Does an existing-reservation display string conflict with the
/// requested range?
///
/// The display is either empty, the no-reservation sentinel, or an
/// `"HH:MM-HH:MM"` span. Both intervals are treated as half-open, so
/// touching boundaries do not conflict. An unparseable display counts as
/// a conflict — better to skip a seat than to book a colliding one.
pub fn has_conflict(existing: &str, range: TimeRange) -> bool {
    let text = existing.trim();
    if text.is_empty() || text.contains(NO_RESERVATION) {
        return false;
    }
    match parse_span(text) {
        Some((start, end)) => !(range.end_min <= start || range.start_min >= end),
        None => true,
    }
}

fn parse_span(text: &str) -> Option<(u16, u16)> {
    let (start, end) = text.split_once('-')?;
    Some((parse_hhmm(start.trim())?, parse_hhmm(end.trim())?))
}

fn parse_hhmm(text: &str) -> Option<u16> {
    let (hours, minutes) = text.split_once(':')?;
    let hours: u16 = hours.trim().parse().ok()?;
    let minutes: u16 = minutes.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "07:00";

    #[test]
    fn occupied_phrases_classify_as_occupied() {
        for msg in [
            "该座位已被预约，请选择其他座位",
            "操作失败：已有人预约该座位",
            "座位已被占用",
        ] {
            assert_eq!(classify(msg, MARKER), Some(Rejection::Occupied), "{msg}");
        }
    }

    #[test]
    fn opening_marker_classifies_as_not_yet_open() {
        assert_eq!(
            classify("预约尚未开放，开放时间为07:00", MARKER),
            Some(Rejection::NotYetOpen)
        );
    }

    #[test]
    fn occupied_rule_wins_over_marker() {
        // A message containing both phrasings is an occupancy refusal.
        assert_eq!(
            classify("该座位已被预约 (07:00)", MARKER),
            Some(Rejection::Occupied)
        );
    }

    #[test]
    fn unknown_messages_classify_as_none() {
        assert_eq!(classify("座位号格式错误", MARKER), None);
        assert_eq!(classify("", MARKER), None);
    }

    #[test]
    fn no_conflict_for_empty_or_sentinel_display() {
        let range = TimeRange::new(540, 600);
        assert!(!has_conflict("", range));
        assert!(!has_conflict("   ", range));
        assert!(!has_conflict("无预约", range));
    }

    #[test]
    fn overlapping_span_conflicts() {
        // requested 9:00-10:00 vs existing 9:30-10:30
        assert!(has_conflict("09:30-10:30", TimeRange::new(540, 600)));
    }

    #[test]
    fn touching_boundary_does_not_conflict() {
        // requested 9:00-10:00 vs existing 10:00-11:00
        assert!(!has_conflict("10:00-11:00", TimeRange::new(540, 600)));
        // requested 10:00-11:00 vs existing 9:00-10:00
        assert!(!has_conflict("09:00-10:00", TimeRange::new(600, 660)));
    }

    #[test]
    fn containment_conflicts() {
        // existing span fully inside the requested range
        assert!(has_conflict("09:15-09:45", TimeRange::new(540, 600)));
        // requested range fully inside the existing span
        assert!(has_conflict("08:00-12:00", TimeRange::new(540, 600)));
    }

    #[test]
    fn unparseable_display_is_a_conflict() {
        let range = TimeRange::new(540, 600);
        assert!(has_conflict("9点到10点", range));
        assert!(has_conflict("09:00", range));
        assert!(has_conflict("25:00-26:00", range));
    }
}
