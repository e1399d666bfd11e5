use chrono::{DateTime, Duration, Local};
use rand::thread_rng;
use rand_distr::{Distribution, Normal};
use tracing::warn;

/// Apply the desynchronisation jitter to a nominal fire instant.
///
/// Many automated clients target the opening instant exactly; firing in
/// perfect unison looks robotic and loses the race anyway. The jitter
/// draws from `Normal(mean_secs, std_secs)` — centred a few seconds
/// *after* the nominal instant, since submitting early only buys
/// "not yet open" refusals.
pub fn jittered_instant(
    fire_at: DateTime<Local>,
    mean_secs: f64,
    std_secs: f64,
) -> DateTime<Local> {
    // Normal::new only rejects a NaN sigma; a negative one it silently
    // mirrors, which is not a sane jitter configuration.
    if std_secs < 0.0 {
        warn!(mean_secs, std_secs, "negative jitter sigma, firing at nominal instant");
        return fire_at;
    }
    let normal = match Normal::new(mean_secs, std_secs) {
        Ok(n) => n,
        Err(e) => {
            warn!(mean_secs, std_secs, err = %e, "bad jitter parameters, firing at nominal instant");
            return fire_at;
        }
    };
    let offset_ms = (normal.sample(&mut thread_rng()) * 1000.0) as i64;
    fire_at + Duration::milliseconds(offset_ms)
}

/// Delay until `fire_at`, clamped to zero — an instant already in the
/// past fires immediately.
pub fn delay_until(fire_at: DateTime<Local>, now: DateTime<Local>) -> std::time::Duration {
    (fire_at - now).to_std().unwrap_or(std::time::Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_instant_clamps_to_zero_delay() {
        let now = Local::now();
        assert_eq!(
            delay_until(now - Duration::hours(1), now),
            std::time::Duration::ZERO
        );
    }

    #[test]
    fn future_instant_keeps_its_delay() {
        let now = Local::now();
        let delay = delay_until(now + Duration::seconds(90), now);
        assert!(delay >= std::time::Duration::from_secs(89));
        assert!(delay <= std::time::Duration::from_secs(91));
    }

    #[test]
    fn zero_sigma_jitter_is_exactly_the_mean() {
        let nominal = Local::now();
        let jittered = jittered_instant(nominal, 3.0, 0.0);
        assert_eq!(jittered - nominal, Duration::seconds(3));
    }

    #[test]
    fn jitter_stays_near_the_mean() {
        let nominal = Local::now();
        for _ in 0..100 {
            let offset = jittered_instant(nominal, 3.0, 1.0) - nominal;
            // 8 sigma; a failure here means the distribution is wrong,
            // not that we got unlucky
            assert!(offset > Duration::seconds(-5) && offset < Duration::seconds(11));
        }
    }

    #[test]
    fn invalid_sigma_falls_back_to_nominal() {
        let nominal = Local::now();
        assert_eq!(jittered_instant(nominal, 3.0, -1.0), nominal);
        assert_eq!(jittered_instant(nominal, 3.0, f64::NAN), nominal);
    }
}
