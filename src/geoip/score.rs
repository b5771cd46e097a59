//! IPv4 scoring.
//!
//! The geo index orders IP ranges by a 32-bit score. Import and lookup must use
//! the same function, so it lives here and nowhere else.

use crate::error_handling::ParseError;

/// Ordering key of an IPv4 address.
pub type IpScore = u32;

/// Converts a dotted-quad IPv4 address into its score.
///
/// Accumulates `score = score * 256 + octet` over the four octets, left to right.
/// Anything other than four decimal octets in `0..=255` is rejected.
///
/// # Examples
///
/// ```
/// use loggeo::geoip::ip_to_score;
///
/// assert_eq!(ip_to_score("1.0.0.0").unwrap(), 16_777_216);
/// assert!(ip_to_score("1.0.0").is_err());
/// ```
pub fn ip_to_score(ip: &str) -> Result<IpScore, ParseError> {
    let invalid = || ParseError::InvalidIp(ip.to_string());

    let mut score: IpScore = 0;
    let mut octets = 0;
    for part in ip.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let octet: u8 = part.parse().map_err(|_| invalid())?;
        octets += 1;
        if octets > 4 {
            return Err(invalid());
        }
        score = score * 256 + IpScore::from(octet);
    }

    if octets != 4 {
        return Err(invalid());
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_matches_positional_formula() {
        for (a, b, c, d) in [
            (0u32, 0u32, 0u32, 0u32),
            (1, 0, 0, 200),
            (1, 0, 1, 5),
            (10, 20, 30, 40),
            (192, 168, 1, 1),
            (255, 255, 255, 255),
        ] {
            let ip = format!("{a}.{b}.{c}.{d}");
            let expected = ((a * 256 + b) * 256 + c) * 256 + d;
            assert_eq!(ip_to_score(&ip).unwrap(), expected, "score of {ip}");
        }
    }

    #[test]
    fn test_concrete_scores() {
        assert_eq!(ip_to_score("1.0.0.200").unwrap(), 16_777_416);
        assert_eq!(ip_to_score("1.0.1.0").unwrap(), 16_777_472);
        assert_eq!(ip_to_score("1.0.1.5").unwrap(), 16_777_477);
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for bad in [
            "",
            "1.2.3",
            "1.2.3.4.5",
            "1..3.4",
            "1.2.3.256",
            "a.b.c.d",
            "1.2.3.-4",
            "1.2.3.+4",
            " 1.2.3.4",
            "1.2.3.4 ",
            "::1",
            "1.2.3.0004",
        ] {
            assert_eq!(
                ip_to_score(bad),
                Err(ParseError::InvalidIp(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_leading_zeros_accepted() {
        assert_eq!(ip_to_score("001.000.000.010").unwrap(), 16_777_226);
    }
}
