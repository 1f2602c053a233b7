//! Opt-in expiry enforcement.
//!
//! Signature verification never looks at `expire`; the field is issuer data
//! handed to the consumer. Applications that want expiry enforced call
//! [`check_expiry`] on the recovered terms.
//!
//! Accepted forms:
//! - RFC 3339 timestamps (`2030-01-01T12:00:00Z`), expiring at that instant
//! - Plain dates (`2030-01-01`), valid through the end of that UTC day

use crate::clock::Clock;
use crate::protocol::models::LicenseTerms;
use crate::LicenseSealError;
use chrono::{DateTime, Days, NaiveDate, Utc};

/// Parse an `expire` value into the instant the license stops being valid.
pub fn parse_expiry(expire: &str) -> Result<DateTime<Utc>, LicenseSealError> {
    let expire = expire.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(expire) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(expire, "%Y-%m-%d")
        .map_err(|_| LicenseSealError::InvalidExpiry(expire.to_string()))?;

    date.checked_add_days(Days::new(1))
        .and_then(|next_day| next_day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| LicenseSealError::InvalidExpiry(expire.to_string()))
}

/// Check that the terms have not expired.
///
/// # Returns
/// * `Ok(expires_at)` - Still valid; the instant it will expire
/// * `Err(Expired)` - `now` is at or past the expiry instant
/// * `Err(InvalidExpiry)` - `expire` is not a recognized date
pub fn check_expiry(
    terms: &LicenseTerms,
    clock: &dyn Clock,
) -> Result<DateTime<Utc>, LicenseSealError> {
    let expires_at = parse_expiry(&terms.expire)?;

    if clock.now_utc() >= expires_at {
        return Err(LicenseSealError::Expired {
            expired_at: expires_at,
        });
    }

    Ok(expires_at)
}
