//! Write-time validation rules for loans and payments

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::interest::full_debt;
use crate::models::{InterestType, Loan, LoanWriteRequest, Payment};

/// Domain rule violations raised by the ledger validators.
///
/// Each kind maps to its own error code and HTTP status in the API layer;
/// none of them are retried or swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("value must be greater than zero")]
    InvalidValue,

    #[error("compound interest requires an end date after the request date")]
    RequiresEndDate,

    #[error("nominal value cannot be less than the total already paid: {total_paid}")]
    BelowPaidAmount { total_paid: Decimal },

    #[error("account does not own this loan")]
    Forbidden,

    #[error("total paid would exceed the full debt: {prospective} > {full_debt}")]
    DebtExceeded {
        prospective: Decimal,
        full_debt: Decimal,
    },

    #[error("payment date precedes the loan's request date")]
    DateTooEarly,

    #[error("payment date is after the loan's end date")]
    DateTooLate,
}

/// Validate a loan create or update.
///
/// `request_date` is the date the loan was (or is being) requested; on update
/// it is the stored, immutable one. `existing_total_paid` is the paid
/// aggregate of the stored loan when updating, `None` on create.
pub fn validate_loan_write(
    input: &LoanWriteRequest,
    request_date: NaiveDate,
    existing_total_paid: Option<Decimal>,
) -> Result<(), RuleError> {
    if input.nominal_value <= Decimal::ZERO {
        return Err(RuleError::InvalidValue);
    }

    if input.interest_type == InterestType::Compound {
        // Without a horizon strictly after the request date there is no
        // elapsed-month basis to compound over.
        match input.end_date {
            Some(end) if end > request_date => {}
            _ => return Err(RuleError::RequiresEndDate),
        }
    }

    if let Some(total_paid) = existing_total_paid {
        if input.nominal_value < total_paid {
            return Err(RuleError::BelowPaidAmount { total_paid });
        }
    }

    Ok(())
}

/// Validate a payment create or update against its target loan.
///
/// `current_total_paid` is the loan's paid aggregate as currently stored.
/// When updating, `existing` is the stored payment; its value is replaced in
/// the prospective total only if it already references this loan (a payment
/// being moved from another loan contributes its full new value).
pub fn validate_payment(
    loan: &Loan,
    date: NaiveDate,
    value: Decimal,
    actor: Uuid,
    existing: Option<&Payment>,
    current_total_paid: Decimal,
) -> Result<(), RuleError> {
    if actor != loan.account_id {
        return Err(RuleError::Forbidden);
    }

    if value <= Decimal::ZERO {
        return Err(RuleError::InvalidValue);
    }

    let replaced = match existing {
        Some(payment) if payment.loan_id == loan.id => payment.value,
        _ => Decimal::ZERO,
    };
    let prospective = current_total_paid - replaced + value;
    let debt = full_debt(loan);
    if prospective > debt {
        return Err(RuleError::DebtExceeded {
            prospective,
            full_debt: debt,
        });
    }

    if date < loan.request_date {
        return Err(RuleError::DateTooEarly);
    }

    if let Some(end) = loan.end_date {
        if date > end {
            return Err(RuleError::DateTooLate);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan_request(nominal: Decimal) -> LoanWriteRequest {
        LoanWriteRequest {
            nominal_value: nominal,
            interest_rate: dec!(5.5),
            interest_type: InterestType::Simple,
            end_date: None,
            bank: "Test Bank".to_string(),
            client: "Test Client".to_string(),
        }
    }

    fn simple_loan(owner: Uuid, nominal: Decimal, rate: Decimal) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            account_id: owner,
            nominal_value: nominal,
            interest_rate: rate,
            interest_type: InterestType::Simple,
            request_date: date(2021, 1, 1),
            end_date: Some(date(2022, 1, 1)),
            ip_address: None,
            bank: "Test Bank".to_string(),
            client: "Test Client".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment_on(loan: &Loan, value: Decimal) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            date: date(2021, 2, 1),
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // ------------------------------------------------------------------
    // Loan write rules
    // ------------------------------------------------------------------

    #[test]
    fn test_loan_smallest_positive_nominal_accepted() {
        let input = loan_request(dec!(0.01));
        assert!(validate_loan_write(&input, date(2021, 1, 1), None).is_ok());
    }

    #[test]
    fn test_loan_zero_and_negative_nominal_rejected() {
        for nominal in [dec!(0), dec!(-1), dec!(-0.01)] {
            let input = loan_request(nominal);
            assert_eq!(
                validate_loan_write(&input, date(2021, 1, 1), None),
                Err(RuleError::InvalidValue)
            );
        }
    }

    #[test]
    fn test_compound_without_end_date_rejected() {
        let mut input = loan_request(dec!(1000));
        input.interest_type = InterestType::Compound;
        assert_eq!(
            validate_loan_write(&input, date(2021, 1, 1), None),
            Err(RuleError::RequiresEndDate)
        );
    }

    #[test]
    fn test_compound_with_end_date_not_after_request_rejected() {
        let mut input = loan_request(dec!(1000));
        input.interest_type = InterestType::Compound;
        input.end_date = Some(date(2021, 1, 1));
        assert_eq!(
            validate_loan_write(&input, date(2021, 1, 1), None),
            Err(RuleError::RequiresEndDate)
        );
    }

    #[test]
    fn test_compound_with_valid_end_date_accepted() {
        let mut input = loan_request(dec!(1000));
        input.interest_type = InterestType::Compound;
        input.end_date = Some(date(2022, 1, 1));
        assert!(validate_loan_write(&input, date(2021, 1, 1), None).is_ok());
    }

    #[test]
    fn test_nominal_reduced_below_paid_rejected() {
        // total paid 2500, new nominal 2000
        let input = loan_request(dec!(2000));
        assert_eq!(
            validate_loan_write(&input, date(2021, 1, 1), Some(dec!(2500))),
            Err(RuleError::BelowPaidAmount {
                total_paid: dec!(2500)
            })
        );
    }

    #[test]
    fn test_nominal_equal_to_paid_accepted() {
        let input = loan_request(dec!(2500));
        assert!(validate_loan_write(&input, date(2021, 1, 1), Some(dec!(2500))).is_ok());
    }

    // ------------------------------------------------------------------
    // Payment rules
    // ------------------------------------------------------------------

    #[test]
    fn test_payment_by_non_owner_rejected() {
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));

        assert_eq!(
            validate_payment(
                &loan,
                date(2021, 2, 1),
                dec!(100),
                intruder,
                None,
                Decimal::ZERO
            ),
            Err(RuleError::Forbidden)
        );
    }

    #[test]
    fn test_payment_non_positive_value_rejected() {
        let owner = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));

        for value in [dec!(0), dec!(-50)] {
            assert_eq!(
                validate_payment(&loan, date(2021, 2, 1), value, owner, None, Decimal::ZERO),
                Err(RuleError::InvalidValue)
            );
        }
    }

    #[test]
    fn test_payment_exceeding_full_debt_rejected() {
        // full debt 21100.00, single payment of 30000
        let owner = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));

        assert_eq!(
            validate_payment(
                &loan,
                date(2021, 2, 1),
                dec!(30000),
                owner,
                None,
                Decimal::ZERO
            ),
            Err(RuleError::DebtExceeded {
                prospective: dec!(30000),
                full_debt: dec!(21100.00)
            })
        );
    }

    #[test]
    fn test_payment_settling_exact_full_debt_accepted() {
        let owner = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));

        assert!(validate_payment(
            &loan,
            date(2021, 2, 1),
            dec!(21100.00),
            owner,
            None,
            Decimal::ZERO
        )
        .is_ok());
    }

    #[test]
    fn test_payment_update_replaces_own_prior_value() {
        let owner = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));
        let existing = payment_on(&loan, dec!(20000));

        // 20000 already paid via this payment; raising it to 21100 stays at
        // the ceiling, raising it past that does not.
        assert!(validate_payment(
            &loan,
            date(2021, 2, 1),
            dec!(21100.00),
            owner,
            Some(&existing),
            dec!(20000)
        )
        .is_ok());

        assert!(matches!(
            validate_payment(
                &loan,
                date(2021, 2, 1),
                dec!(21100.01),
                owner,
                Some(&existing),
                dec!(20000)
            ),
            Err(RuleError::DebtExceeded { .. })
        ));
    }

    #[test]
    fn test_payment_moved_from_another_loan_counts_in_full() {
        let owner = Uuid::new_v4();
        let target = simple_loan(owner, dec!(20000), dec!(5.5));
        let other = simple_loan(owner, dec!(5000), dec!(5.5));
        let moved = payment_on(&other, dec!(2000));

        // The moved payment's prior value belongs to the other loan, so it is
        // not subtracted: the target's prospective total is 19500 + 2000.
        assert!(validate_payment(
            &target,
            date(2021, 2, 1),
            dec!(2000),
            owner,
            Some(&moved),
            dec!(19500)
        )
        .is_ok());

        assert!(matches!(
            validate_payment(
                &target,
                date(2021, 2, 1),
                dec!(2000),
                owner,
                Some(&moved),
                dec!(19500.01)
            ),
            Err(RuleError::DebtExceeded { .. })
        ));
    }

    #[test]
    fn test_payment_date_outside_window_rejected() {
        let owner = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));

        assert_eq!(
            validate_payment(
                &loan,
                date(2020, 12, 31),
                dec!(100),
                owner,
                None,
                Decimal::ZERO
            ),
            Err(RuleError::DateTooEarly)
        );
        assert_eq!(
            validate_payment(
                &loan,
                date(2022, 1, 2),
                dec!(100),
                owner,
                None,
                Decimal::ZERO
            ),
            Err(RuleError::DateTooLate)
        );
        // Both bounds are inclusive
        assert!(validate_payment(
            &loan,
            date(2021, 1, 1),
            dec!(100),
            owner,
            None,
            Decimal::ZERO
        )
        .is_ok());
        assert!(validate_payment(
            &loan,
            date(2022, 1, 1),
            dec!(100),
            owner,
            None,
            Decimal::ZERO
        )
        .is_ok());
    }

    #[test]
    fn test_payment_without_end_date_has_no_upper_bound() {
        let owner = Uuid::new_v4();
        let mut loan = simple_loan(owner, dec!(20000), dec!(5.5));
        loan.end_date = None;

        assert!(validate_payment(
            &loan,
            date(2030, 1, 1),
            dec!(100),
            owner,
            None,
            Decimal::ZERO
        )
        .is_ok());
    }

    #[test]
    fn test_ownership_checked_before_value() {
        // A non-owner submitting a bad value still gets Forbidden
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let loan = simple_loan(owner, dec!(20000), dec!(5.5));

        assert_eq!(
            validate_payment(
                &loan,
                date(2021, 2, 1),
                dec!(-1),
                intruder,
                None,
                Decimal::ZERO
            ),
            Err(RuleError::Forbidden)
        );
    }
}
