use std::collections::HashSet;

use super::{Cents, FULL_PERCENTAGE, NewShare, SplitError, SplitMethod, format_cents, format_percentage};

/// Check a proposed split for internal consistency before any amount is computed.
pub fn validate(amount: Cents, method: SplitMethod, shares: &[NewShare]) -> Result<(), SplitError> {
    if amount <= 0 {
        return Err(SplitError::InvalidExpense(
            "amount must be positive".to_string(),
        ));
    }
    if shares.is_empty() {
        return Err(SplitError::InvalidExpense(
            "at least one participant is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        if !seen.insert(share.participant_id) {
            return Err(SplitError::InvalidSplit(format!(
                "participant {} appears more than once",
                share.participant_id
            )));
        }
    }

    match method {
        SplitMethod::Equal => validate_equal(shares),
        SplitMethod::Percentage => validate_percentage(shares),
        SplitMethod::Exact => validate_exact(amount, shares),
    }
}

fn validate_equal(shares: &[NewShare]) -> Result<(), SplitError> {
    for share in shares {
        if share.percentage.is_some() || share.exact_amount.is_some() {
            return Err(SplitError::InvalidSplit(format!(
                "participant {} supplies an amount or percentage, which an equal split does not take",
                share.participant_id
            )));
        }
    }
    Ok(())
}

fn validate_percentage(shares: &[NewShare]) -> Result<(), SplitError> {
    let mut total = 0;
    for share in shares {
        if share.exact_amount.is_some() {
            return Err(SplitError::InvalidSplit(format!(
                "participant {} supplies an exact amount in a percentage split",
                share.participant_id
            )));
        }
        let percentage = share.percentage.ok_or_else(|| {
            SplitError::InvalidSplit(format!(
                "participant {} has no percentage",
                share.participant_id
            ))
        })?;
        if !(0..=FULL_PERCENTAGE).contains(&percentage) {
            return Err(SplitError::InvalidSplit(format!(
                "percentage {}% for participant {} is outside 0-100",
                format_percentage(percentage),
                share.participant_id
            )));
        }
        total += percentage;
    }

    if total != FULL_PERCENTAGE {
        return Err(SplitError::InvalidSplit(format!(
            "percentages must add up to 100%, got {}%",
            format_percentage(total)
        )));
    }
    Ok(())
}

fn validate_exact(amount: Cents, shares: &[NewShare]) -> Result<(), SplitError> {
    let mut total: Cents = 0;
    for share in shares {
        if share.percentage.is_some() {
            return Err(SplitError::InvalidSplit(format!(
                "participant {} supplies a percentage in an exact split",
                share.participant_id
            )));
        }
        let exact = share.exact_amount.ok_or_else(|| {
            SplitError::InvalidSplit(format!(
                "participant {} has no exact amount",
                share.participant_id
            ))
        })?;
        if exact <= 0 {
            return Err(SplitError::InvalidSplit(format!(
                "exact amount for participant {} must be positive",
                share.participant_id
            )));
        }
        total = total
            .checked_add(exact)
            .ok_or_else(|| SplitError::InvalidSplit("exact amounts overflow".to_string()))?;
    }

    // Amounts are whole cents, so staying under one minor unit of drift means equality.
    if total != amount {
        return Err(SplitError::InvalidSplit(format!(
            "exact amounts add up to {}, expected {}",
            format_cents(total),
            format_cents(amount)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn percentage_shares(percentages: &[i64]) -> Vec<NewShare> {
        percentages
            .iter()
            .map(|p| NewShare::new(Uuid::new_v4()).with_percentage(*p))
            .collect()
    }

    fn exact_shares(amounts: &[i64]) -> Vec<NewShare> {
        amounts
            .iter()
            .map(|a| NewShare::new(Uuid::new_v4()).with_exact_amount(*a))
            .collect()
    }

    #[test]
    fn test_equal_split_accepts_bare_participants() {
        let shares = vec![NewShare::new(Uuid::new_v4()), NewShare::new(Uuid::new_v4())];
        assert!(validate(10000, SplitMethod::Equal, &shares).is_ok());
    }

    #[test]
    fn test_equal_split_rejects_numeric_fields() {
        let shares = vec![NewShare::new(Uuid::new_v4()).with_percentage(5000)];
        assert!(matches!(
            validate(10000, SplitMethod::Equal, &shares),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_percentages_must_sum_to_exactly_100() {
        assert!(validate(10000, SplitMethod::Percentage, &percentage_shares(&[5000, 5000])).is_ok());
        assert!(matches!(
            validate(10000, SplitMethod::Percentage, &percentage_shares(&[5000, 4900])),
            Err(SplitError::InvalidSplit(_))
        ));
        assert!(matches!(
            validate(10000, SplitMethod::Percentage, &percentage_shares(&[5000, 5100])),
            Err(SplitError::InvalidSplit(_))
        ));
        // No tolerance: 99.99% is still wrong
        assert!(matches!(
            validate(10000, SplitMethod::Percentage, &percentage_shares(&[3333, 3333, 3333])),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_percentage_required_and_in_range() {
        let mut shares = percentage_shares(&[10000]);
        shares.push(NewShare::new(Uuid::new_v4()));
        assert!(matches!(
            validate(10000, SplitMethod::Percentage, &shares),
            Err(SplitError::InvalidSplit(_))
        ));

        assert!(matches!(
            validate(10000, SplitMethod::Percentage, &percentage_shares(&[12000, -2000])),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_percentage_allows_zero_share() {
        assert!(validate(10000, SplitMethod::Percentage, &percentage_shares(&[10000, 0])).is_ok());
    }

    #[test]
    fn test_exact_amounts_must_match_total() {
        assert!(validate(10000, SplitMethod::Exact, &exact_shares(&[7000, 3000])).is_ok());
        assert!(matches!(
            validate(10000, SplitMethod::Exact, &exact_shares(&[7000, 2000])),
            Err(SplitError::InvalidSplit(_))
        ));
        assert!(matches!(
            validate(10000, SplitMethod::Exact, &exact_shares(&[7000, 3001])),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_exact_amounts_must_be_positive() {
        assert!(matches!(
            validate(10000, SplitMethod::Exact, &exact_shares(&[10000, 0])),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_exact_amount_required() {
        let shares = vec![NewShare::new(Uuid::new_v4())];
        assert!(matches!(
            validate(10000, SplitMethod::Exact, &shares),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_duplicate_participants_rejected() {
        let id = Uuid::new_v4();
        let shares = vec![NewShare::new(id), NewShare::new(id)];
        assert!(matches!(
            validate(10000, SplitMethod::Equal, &shares),
            Err(SplitError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_invalid_expense() {
        assert!(matches!(
            validate(0, SplitMethod::Equal, &[NewShare::new(Uuid::new_v4())]),
            Err(SplitError::InvalidExpense(_))
        ));
        assert!(matches!(
            validate(10000, SplitMethod::Equal, &[]),
            Err(SplitError::InvalidExpense(_))
        ));
    }
}
