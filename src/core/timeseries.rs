//! Field names understood by the fundamentals-timeseries endpoint.
//!
//! Each requested type is a frequency prefix followed by a field name, e.g.
//! `quarterlyTotalRevenue`.

use crate::core::YfError;
use crate::core::models::{Frequency, Statement};

const INCOME_STATEMENT: &[&str] = &[
    "TotalRevenue",
    "OperatingRevenue",
    "CostOfRevenue",
    "GrossProfit",
    "OperatingExpense",
    "SellingGeneralAndAdministration",
    "ResearchAndDevelopment",
    "OperatingIncome",
    "NetInterestIncome",
    "InterestExpense",
    "InterestIncome",
    "OtherIncomeExpense",
    "PretaxIncome",
    "TaxProvision",
    "NetIncome",
    "NetIncomeCommonStockholders",
    "DilutedEPS",
    "BasicEPS",
    "DilutedAverageShares",
    "BasicAverageShares",
    "TotalExpenses",
    "EBIT",
    "EBITDA",
    "NormalizedEBITDA",
    "ReconciledDepreciation",
];

const BALANCE_SHEET: &[&str] = &[
    "TotalAssets",
    "CurrentAssets",
    "CashAndCashEquivalents",
    "CashCashEquivalentsAndShortTermInvestments",
    "Receivables",
    "Inventory",
    "TotalNonCurrentAssets",
    "NetPPE",
    "Goodwill",
    "TotalLiabilitiesNetMinorityInterest",
    "CurrentLiabilities",
    "AccountsPayable",
    "CurrentDebt",
    "LongTermDebt",
    "TotalDebt",
    "NetDebt",
    "StockholdersEquity",
    "CommonStockEquity",
    "RetainedEarnings",
    "WorkingCapital",
    "TangibleBookValue",
    "InvestedCapital",
    "OrdinarySharesNumber",
    "ShareIssued",
];

const CASH_FLOW: &[&str] = &[
    "OperatingCashFlow",
    "InvestingCashFlow",
    "FinancingCashFlow",
    "FreeCashFlow",
    "CapitalExpenditure",
    "BeginningCashPosition",
    "EndCashPosition",
    "ChangesInCash",
    "IssuanceOfDebt",
    "RepaymentOfDebt",
    "RepurchaseOfCapitalStock",
    "CashDividendsPaid",
    "StockBasedCompensation",
    "DepreciationAndAmortization",
    "ChangeInWorkingCapital",
    "NetIncomeFromContinuingOperations",
];

/// Field names (without frequency prefix) that make up `statement`.
#[must_use]
pub const fn fields(statement: Statement) -> &'static [&'static str] {
    match statement {
        Statement::IncomeStatement => INCOME_STATEMENT,
        Statement::BalanceSheet => BALANCE_SHEET,
        Statement::CashFlow => CASH_FLOW,
    }
}

/// Comma-joined, frequency-prefixed types for a whole statement.
///
/// # Errors
///
/// Balance sheets have no trailing figures; asking for one is
/// [`YfError::InvalidParams`].
pub fn statement_types(frequency: Frequency, statement: Statement) -> Result<String, YfError> {
    if statement == Statement::BalanceSheet && frequency == Frequency::Trailing {
        return Err(YfError::InvalidParams(
            "frequency \"trailing\" is not available for the balance sheet".into(),
        ));
    }
    Ok(fields(statement)
        .iter()
        .map(|f| format!("{}{f}", frequency.as_str()))
        .collect::<Vec<_>>()
        .join(","))
}

/// Validate a comma-separated list of prefixed types, returning it trimmed
/// and without repeats.
///
/// # Errors
///
/// Returns [`YfError::InvalidParams`] for an empty list or any unknown type.
pub fn normalize_types(csv: &str) -> Result<String, YfError> {
    let mut out: Vec<&str> = Vec::new();
    for item in csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !is_known(item) {
            return Err(YfError::InvalidParams(format!("invalid timeseries type {item:?}")));
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    if out.is_empty() {
        return Err(YfError::InvalidParams("no timeseries types given".into()));
    }
    Ok(out.join(","))
}

fn is_known(item: &str) -> bool {
    Frequency::ALL.iter().any(|freq| {
        item.strip_prefix(freq.as_str()).is_some_and(|field| {
            Statement::ALL
                .iter()
                .filter(|s| !(**s == Statement::BalanceSheet && *freq == Frequency::Trailing))
                .any(|s| fields(*s).contains(&field))
        })
    })
}
