// Tests du limiteur de débit

#[cfg(test)]
mod tests {
    use super::super::rate_limit::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_ten_commands_then_limited() {
        let limiter = RateLimiter::new(10, 5);
        let start = Instant::now();
        let mut window = RateWindow::new(start);

        for i in 0..10 {
            let now = start + Duration::from_millis(i * 100);
            assert_eq!(limiter.check(&mut window, now), RateDecision::Allowed);
        }
        assert_eq!(window.count, 10);

        let decision = limiter.check(&mut window, start + Duration::from_secs(1));
        assert_eq!(decision, RateDecision::Limited { wait_secs: 4 });
        // Rejections do not consume the window
        assert_eq!(window.count, 10);
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let limiter = RateLimiter::new(10, 5);
        let start = Instant::now();
        let mut window = RateWindow::new(start);

        for _ in 0..10 {
            limiter.check(&mut window, start);
        }
        assert!(matches!(
            limiter.check(&mut window, start + Duration::from_secs(4)),
            RateDecision::Limited { .. }
        ));

        let later = start + Duration::from_secs(5);
        assert_eq!(limiter.check(&mut window, later), RateDecision::Allowed);
        assert_eq!(window.count, 1);
        assert_eq!(window.start, later);
    }

    #[test]
    fn test_wait_is_at_least_one_second() {
        let limiter = RateLimiter::new(1, 5);
        let start = Instant::now();
        let mut window = RateWindow::new(start);

        limiter.check(&mut window, start);
        let decision = limiter.check(&mut window, start + Duration::from_millis(4900));
        assert_eq!(decision, RateDecision::Limited { wait_secs: 1 });
    }

    #[test]
    fn test_limit_message() {
        let limiter = RateLimiter::new(10, 5);
        assert_eq!(
            limiter.limit_message(3),
            "Rate limit exceeded: max 10 commands / 5 seconds.\nPlease wait ~3 seconds...\n"
        );
    }
}
