//! HTTP-date parsing and composition (RFC 7231 §7.1.1.1).
//!
//! Three wire formats are accepted on input — IMF-fixdate (`Sun, 06 Nov
//! 1994 08:49:37 GMT`), obsolete RFC 850 (`Sunday, 06-Nov-94
//! 08:49:37 GMT`), and `asctime` (`Sun Nov  6 08:49:37 1994`) — but
//! [`compose`] only ever emits IMF-fixdate, the only form a recipient is
//! required to generate.

use std::time::SystemTime;

use crate::error::ParseError;

/// Parse any of the three RFC 7231 date formats into a [`SystemTime`].
pub fn parse(s: &str) -> Result<SystemTime, ParseError> {
    httpdate::parse_http_date(s.trim()).map_err(|_| ParseError::InvalidDate)
}

/// Format `time` as IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn compose(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_imf_fixdate() {
        let t = parse("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(compose(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn parses_rfc850() {
        let t = parse("Sunday, 06-Nov-94 08:49:37 GMT").unwrap();
        assert_eq!(compose(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn parses_asctime() {
        let t = parse("Sun Nov  6 08:49:37 1994").unwrap();
        assert_eq!(compose(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("not a date").is_err());
    }

    #[test]
    fn compose_round_trips_through_parse() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let composed = compose(t);
        let reparsed = parse(&composed).unwrap();
        assert_eq!(composed, compose(reparsed));
    }
}
