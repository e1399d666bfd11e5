use tracing::debug;

use seatbot_core::config::RegionRule;

/// Infer the portal region for a seat code from the ordered prefix rule
/// table, first match wins. Codes no rule matches fall back to the
/// default region — the recommendation endpoint always wants *some*
/// region, and a wrong one just yields a less useful candidate list.
pub fn region_for(seat_code: &str, rules: &[RegionRule], default_region: &str) -> String {
    for rule in rules {
        if seat_code.starts_with(&rule.prefix) {
            return rule.region.clone();
        }
    }
    debug!(seat = %seat_code, "no region rule matched, using default");
    default_region.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<RegionRule> {
        pairs
            .iter()
            .map(|(prefix, region)| RegionRule {
                prefix: (*prefix).into(),
                region: (*region).into(),
            })
            .collect()
    }

    #[test]
    fn first_matching_prefix_wins() {
        let rules = rules(&[("Z1", "1"), ("Z", "9")]);
        assert_eq!(region_for("Z101", &rules, "0"), "1");
        assert_eq!(region_for("Z205", &rules, "0"), "9");
    }

    #[test]
    fn unmatched_code_uses_default() {
        let rules = rules(&[("Z1", "1")]);
        assert_eq!(region_for("A300", &rules, "0"), "0");
        assert_eq!(region_for("", &rules, "0"), "0");
    }
}
