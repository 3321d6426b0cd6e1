use chrono::{DateTime, TimeZone, Utc};

/// Seconds since the unix epoch, truncated to the 32 bits an object id stores.
#[inline]
pub fn current_time_secs() -> u32 {
    Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32
}

/// Converts the 32-bit seconds value stored in an object id back to a UTC date-time.
#[inline]
pub fn secs_to_date_time(secs: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(secs as i64, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
