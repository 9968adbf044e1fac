use timber_core::models::CreditRating;

pub fn credit_rating(score: i32) -> CreditRating {
    match score {
        s if s >= 750 => CreditRating::Excellent,
        s if s >= 700 => CreditRating::Good,
        s if s >= 650 => CreditRating::Fair,
        _ => CreditRating::Poor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_rating_thresholds() {
        assert_eq!(credit_rating(850), CreditRating::Excellent);
        assert_eq!(credit_rating(750), CreditRating::Excellent);
        assert_eq!(credit_rating(749), CreditRating::Good);
        assert_eq!(credit_rating(700), CreditRating::Good);
        assert_eq!(credit_rating(650), CreditRating::Fair);
        assert_eq!(credit_rating(649), CreditRating::Poor);
        assert_eq!(credit_rating(300), CreditRating::Poor);
    }
}
