//! Ledger scenario tests
//!
//! End-to-end checks of the interest, balance, and validation rules through
//! the public API, with golden values for the documented scenarios.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use loanledger_server::ledger::{
    full_debt, interest_value, loan_view, outstanding_balance, total_paid, validate_loan_write,
    validate_payment, RuleError,
};
use loanledger_server::models::{InterestType, Loan, LoanWriteRequest, Payment};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn loan(
    owner: Uuid,
    nominal: Decimal,
    rate: Decimal,
    interest_type: InterestType,
    request_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Loan {
    Loan {
        id: Uuid::new_v4(),
        account_id: owner,
        nominal_value: nominal,
        interest_rate: rate,
        interest_type,
        request_date,
        end_date,
        ip_address: None,
        bank: "Acme Bank".to_string(),
        client: "Jane Doe".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn payment(loan: &Loan, date: NaiveDate, value: Decimal) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        loan_id: loan.id,
        date,
        value,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ============================================================================
// Golden scenarios
// ============================================================================

#[test]
fn scenario_simple_interest() {
    // 20000 at 5.5% simple
    let loan = loan(
        Uuid::new_v4(),
        dec!(20000),
        dec!(5.5),
        InterestType::Simple,
        date(2021, 1, 1),
        None,
    );

    assert_eq!(interest_value(&loan), dec!(1100.00));
    assert_eq!(full_debt(&loan), dec!(21100.00));
}

#[test]
fn scenario_compound_interest_one_year() {
    // 15000 at 6.5% compounded monthly for 12 months
    let loan = loan(
        Uuid::new_v4(),
        dec!(15000),
        dec!(6.5),
        InterestType::Compound,
        date(2020, 3, 29),
        Some(date(2021, 3, 29)),
    );

    assert_eq!(interest_value(&loan), dec!(16936.44));
    assert_eq!(full_debt(&loan), dec!(31936.44));
}

#[test]
fn scenario_payment_exceeding_debt_is_rejected() {
    let owner = Uuid::new_v4();
    let loan = loan(
        owner,
        dec!(20000),
        dec!(5.5),
        InterestType::Simple,
        date(2021, 1, 1),
        None,
    );

    let result = validate_payment(
        &loan,
        date(2021, 2, 1),
        dec!(30000),
        owner,
        None,
        Decimal::ZERO,
    );
    assert!(matches!(result, Err(RuleError::DebtExceeded { .. })));
}

#[test]
fn scenario_payment_by_other_account_is_forbidden() {
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let loan = loan(
        owner,
        dec!(20000),
        dec!(5.5),
        InterestType::Simple,
        date(2021, 1, 1),
        None,
    );

    let result = validate_payment(
        &loan,
        date(2021, 2, 1),
        dec!(100),
        other,
        None,
        Decimal::ZERO,
    );
    assert_eq!(result, Err(RuleError::Forbidden));
}

#[test]
fn scenario_nominal_value_below_total_paid_is_rejected() {
    let input = LoanWriteRequest {
        nominal_value: dec!(2000),
        interest_rate: dec!(5.5),
        interest_type: InterestType::Simple,
        end_date: None,
        bank: "Acme Bank".to_string(),
        client: "Jane Doe".to_string(),
    };

    let result = validate_loan_write(&input, date(2021, 1, 1), Some(dec!(2500)));
    assert_eq!(
        result,
        Err(RuleError::BelowPaidAmount {
            total_paid: dec!(2500)
        })
    );
}

// ============================================================================
// Balance aggregation
// ============================================================================

#[test]
fn outstanding_balance_tracks_payments() {
    let owner = Uuid::new_v4();
    let loan = loan(
        owner,
        dec!(20000),
        dec!(5.5),
        InterestType::Simple,
        date(2021, 1, 1),
        Some(date(2022, 1, 1)),
    );

    let payments = vec![
        payment(&loan, date(2021, 2, 1), dec!(5000)),
        payment(&loan, date(2021, 3, 1), dec!(1100.50)),
    ];

    let paid = total_paid(&payments);
    assert_eq!(paid, dec!(6100.50));
    assert_eq!(outstanding_balance(&loan, paid), dec!(14999.50));

    let view = loan_view(&loan, &payments);
    assert_eq!(view.full_debt, dec!(21100.00));
    assert_eq!(view.total_paid, dec!(6100.50));
    assert_eq!(view.outstanding_balance, dec!(14999.50));
}

#[test]
fn a_loan_can_be_paid_down_to_exactly_zero() {
    let owner = Uuid::new_v4();
    let loan = loan(
        owner,
        dec!(20000),
        dec!(5.5),
        InterestType::Simple,
        date(2021, 1, 1),
        Some(date(2022, 1, 1)),
    );

    // Pay in two installments that together settle the full debt
    let first = payment(&loan, date(2021, 2, 1), dec!(20000));
    assert!(validate_payment(
        &loan,
        first.date,
        first.value,
        owner,
        None,
        Decimal::ZERO
    )
    .is_ok());

    assert!(validate_payment(
        &loan,
        date(2021, 3, 1),
        dec!(1100.00),
        owner,
        None,
        total_paid(&[first.clone()])
    )
    .is_ok());

    let settled = vec![first, payment(&loan, date(2021, 3, 1), dec!(1100.00))];
    assert_eq!(outstanding_balance(&loan, total_paid(&settled)), dec!(0.00));
}

#[test]
fn compound_loans_require_a_future_end_date() {
    let input = LoanWriteRequest {
        nominal_value: dec!(1000),
        interest_rate: dec!(6.5),
        interest_type: InterestType::Compound,
        end_date: None,
        bank: "Acme Bank".to_string(),
        client: "Jane Doe".to_string(),
    };

    assert_eq!(
        validate_loan_write(&input, date(2021, 1, 1), None),
        Err(RuleError::RequiresEndDate)
    );
}
