//! Interest accrual and derived loan figures

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::models::{InterestType, Loan, LoanView, Payment};

/// Round a monetary amount to 2 decimal places, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole calendar months between two dates.
///
/// Day-of-month is ignored: a loan from Jan 31 to Feb 1 counts as one month
/// elapsed. Negative when `end` precedes `start`'s month.
pub fn months_elapsed(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32)
}

/// Accrued interest for a loan, rounded half-up to 2 decimal places.
///
/// Simple interest ignores the loan's horizon entirely; compound interest
/// compounds once per elapsed whole month between request and end dates.
/// Rounding is applied once, to the final figure.
pub fn interest_value(loan: &Loan) -> Decimal {
    let rate = loan.interest_rate / dec!(100);
    let raw = match loan.interest_type {
        InterestType::Simple => loan.nominal_value * rate,
        InterestType::Compound => {
            let months = loan
                .end_date
                .map(|end| months_elapsed(loan.request_date, end))
                .unwrap_or(0);
            loan.nominal_value * compound_factor(rate, months) - loan.nominal_value
        }
    };
    round_money(raw)
}

/// (1 + rate)^months by iterated multiplication.
fn compound_factor(rate: Decimal, months: i32) -> Decimal {
    let base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..months.max(0) {
        factor *= base;
    }
    factor
}

/// Principal plus accrued interest.
pub fn full_debt(loan: &Loan) -> Decimal {
    loan.nominal_value + interest_value(loan)
}

/// Sum of payment values; zero when there are none.
pub fn total_paid(payments: &[Payment]) -> Decimal {
    payments.iter().map(|p| p.value).sum()
}

/// Full debt minus the amount already paid, rounded half-up to 2dp.
pub fn outstanding_balance(loan: &Loan, total_paid: Decimal) -> Decimal {
    round_money(full_debt(loan) - total_paid)
}

/// Assemble the read model for a loan from its stored fields and payments.
pub fn loan_view(loan: &Loan, payments: &[Payment]) -> LoanView {
    let interest = interest_value(loan);
    let debt = loan.nominal_value + interest;
    let paid = total_paid(payments);

    LoanView {
        id: loan.id,
        account_id: loan.account_id,
        nominal_value: loan.nominal_value,
        interest_rate: loan.interest_rate,
        interest_type: loan.interest_type,
        request_date: loan.request_date,
        end_date: loan.end_date,
        ip_address: loan.ip_address.clone(),
        bank: loan.bank.clone(),
        client: loan.client.clone(),
        interest_value: interest,
        full_debt: debt,
        total_paid: paid,
        outstanding_balance: round_money(debt - paid),
    }
}
