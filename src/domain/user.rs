use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Minimum age, in whole years, required to hold a wallet.
pub const ELIGIBLE_AGE_YEARS: u32 = 18;

/// An account holder. Every user owns at most one wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        full_name: String,
        email: String,
        phone_number: String,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
            phone_number,
            date_of_birth,
            created_at: Utc::now(),
        }
    }

    /// Whether the user is old enough to hold a wallet on the given date.
    /// A date of birth in the future is never eligible.
    pub fn is_eligible(&self, on: NaiveDate) -> bool {
        on.years_since(self.date_of_birth)
            .is_some_and(|years| years >= ELIGIBLE_AGE_YEARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(date_of_birth: NaiveDate) -> User {
        User::new(
            "Sara Ahmadi".to_string(),
            "sara@example.com".to_string(),
            "09120000000".to_string(),
            date_of_birth,
        )
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_new_user_assigns_distinct_ids() {
        let a = sample_user(date(1990, 4, 2));
        let b = sample_user(date(1990, 4, 2));
        assert_ne!(a.id, b.id);
        assert_eq!(a.full_name, "Sara Ahmadi");
    }

    #[test]
    fn test_eligible_at_exactly_eighteen() {
        let user = sample_user(date(2000, 5, 10));
        assert!(user.is_eligible(date(2018, 5, 10)));
    }

    #[test]
    fn test_not_eligible_the_day_before_turning_eighteen() {
        let user = sample_user(date(2000, 5, 10));
        assert!(!user.is_eligible(date(2018, 5, 9)));
    }

    #[test]
    fn test_not_eligible_when_underage() {
        let user = sample_user(date(2015, 1, 1));
        assert!(!user.is_eligible(date(2026, 1, 1)));
    }

    #[test]
    fn test_not_eligible_before_birth() {
        let user = sample_user(date(2030, 1, 1));
        assert!(!user.is_eligible(date(2026, 1, 1)));
    }

    #[test]
    fn test_eligible_well_past_eighteen() {
        let user = sample_user(date(1985, 12, 31));
        assert!(user.is_eligible(date(2026, 8, 22)));
    }
}
