use super::{Cents, FULL_PERCENTAGE, NewShare, ParticipantShare, SplitError, SplitMethod};

/// Compute the owed amount for every participant of a validated split.
///
/// The returned shares keep the input order, and their `amount_owed` values
/// always add up to `amount` exactly:
/// - `Equal`: the remainder of the integer division goes to the first participant.
/// - `Percentage`: each share is rounded half-up to the cent. Any rounding
///   difference is settled one cent at a time on the participants with a
///   non-zero percentage, starting from the last one, so a 0% participant
///   always owes nothing.
/// - `Exact`: the supplied amounts are owed as-is.
///
/// Run [`validate`](super::validate) first; only the expense-level checks are
/// repeated here.
pub fn compute(
    amount: Cents,
    method: SplitMethod,
    shares: &[NewShare],
) -> Result<Vec<ParticipantShare>, SplitError> {
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

    let computed = match method {
        SplitMethod::Equal => split_equal(amount, shares),
        SplitMethod::Percentage => split_percentage(amount, shares)?,
        SplitMethod::Exact => split_exact(shares)?,
    };

    let total = checked_total(&computed)?;
    if total != amount {
        // Only reachable for an exact split that skipped validation
        return Err(SplitError::InvalidSplit(format!(
            "owed amounts add up to {} cents, expected {}",
            total, amount
        )));
    }

    Ok(computed)
}

fn split_equal(amount: Cents, shares: &[NewShare]) -> Vec<ParticipantShare> {
    let count = shares.len() as Cents;
    let base = amount / count;
    let remainder = amount % count;

    shares
        .iter()
        .enumerate()
        .map(|(i, share)| ParticipantShare {
            participant_id: share.participant_id,
            percentage: None,
            exact_amount: None,
            amount_owed: if i == 0 { base + remainder } else { base },
        })
        .collect()
}

fn split_percentage(amount: Cents, shares: &[NewShare]) -> Result<Vec<ParticipantShare>, SplitError> {
    let mut computed = Vec::with_capacity(shares.len());
    for share in shares {
        let percentage = share.percentage.ok_or_else(|| {
            SplitError::InvalidSplit(format!(
                "participant {} has no percentage",
                share.participant_id
            ))
        })?;
        let half = FULL_PERCENTAGE as i128 / 2;
        let owed = (amount as i128 * percentage as i128 + half) / FULL_PERCENTAGE as i128;
        let owed = Cents::try_from(owed).map_err(|_| {
            SplitError::InvalidSplit(format!(
                "share of participant {} is out of range",
                share.participant_id
            ))
        })?;
        computed.push(ParticipantShare {
            participant_id: share.participant_id,
            percentage: Some(percentage),
            exact_amount: None,
            amount_owed: owed,
        });
    }

    let mut difference = amount
        .checked_sub(checked_total(&computed)?)
        .ok_or_else(out_of_range)?;
    // Half-up rounding is off by at most half a cent per share
    if difference.unsigned_abs() > computed.len() as u64 {
        return Err(SplitError::InvalidSplit(
            "percentages do not add up to 100%".to_string(),
        ));
    }

    let step = difference.signum();
    while difference != 0 {
        let mut settled = false;
        for share in computed
            .iter_mut()
            .rev()
            .filter(|s| s.percentage.unwrap_or(0) > 0)
        {
            if difference == 0 {
                break;
            }
            if share.amount_owed + step >= 0 {
                share.amount_owed += step;
                difference -= step;
                settled = true;
            }
        }
        if !settled {
            return Err(SplitError::InvalidSplit(
                "no participant can absorb the rounding difference".to_string(),
            ));
        }
    }
    Ok(computed)
}

fn checked_total(shares: &[ParticipantShare]) -> Result<Cents, SplitError> {
    shares
        .iter()
        .try_fold(0 as Cents, |acc, s| acc.checked_add(s.amount_owed))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> SplitError {
    SplitError::InvalidSplit("owed amounts are out of range".to_string())
}

fn split_exact(shares: &[NewShare]) -> Result<Vec<ParticipantShare>, SplitError> {
    shares
        .iter()
        .map(|share| {
            let exact = share.exact_amount.ok_or_else(|| {
                SplitError::InvalidSplit(format!(
                    "participant {} has no exact amount",
                    share.participant_id
                ))
            })?;
            Ok(ParticipantShare {
                participant_id: share.participant_id,
                percentage: None,
                exact_amount: Some(exact),
                amount_owed: exact,
            })
        })
        .collect()
}
