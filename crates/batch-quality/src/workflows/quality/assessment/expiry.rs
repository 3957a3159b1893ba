use super::super::domain::{BatchRecord, ExpiryBucket};
use chrono::NaiveDate;

pub fn classify_days(days_until_expiry: i64) -> ExpiryBucket {
    match days_until_expiry {
        days if days < 0 => ExpiryBucket::Expired,
        0..=7 => ExpiryBucket::Urgent,
        8..=30 => ExpiryBucket::Warning,
        _ => ExpiryBucket::Safe,
    }
}

pub fn expiry_bucket(record: &BatchRecord, today: NaiveDate) -> ExpiryBucket {
    classify_days(record.days_until_expiry(today))
}
