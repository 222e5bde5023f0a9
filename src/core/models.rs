//! Enumerated request parameters.
//!
//! Yahoo accepts these as plain strings; parsing them here means a typo fails
//! with [`YfError::InvalidParams`] before anything is sent.

use std::fmt;
use std::str::FromStr;

use crate::core::YfError;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every accepted value, in wire order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            /// The value as Yahoo expects it on the wire.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = YfError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        let valid: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        YfError::InvalidParams(format!(
                            "invalid {} {s:?}; valid values: {}",
                            $what,
                            valid.join(", ")
                        ))
                    })
            }
        }
    };
}

wire_enum! {
    /// Bar size for the chart endpoint.
    Interval, "interval" {
        I1m => "1m",
        I2m => "2m",
        I5m => "5m",
        I15m => "15m",
        I30m => "30m",
        I60m => "60m",
        I90m => "90m",
        I1h => "1h",
        D1 => "1d",
        D5 => "5d",
        W1 => "1wk",
        M1 => "1mo",
        M3 => "3mo",
    }
}

wire_enum! {
    /// Relative lookback for the chart endpoint (`range=`).
    Range, "range" {
        D1 => "1d",
        D5 => "5d",
        M1 => "1mo",
        M3 => "3mo",
        M6 => "6mo",
        Y1 => "1y",
        Y2 => "2y",
        Y5 => "5y",
        Y10 => "10y",
        Ytd => "ytd",
        Max => "max",
    }
}

wire_enum! {
    /// Corporate events the chart endpoint can attach to bars.
    ChartEvent, "event" {
        Dividends => "div",
        Splits => "split",
        Earnings => "earn",
        CapitalGains => "capitalGain",
    }
}

wire_enum! {
    /// A `quoteSummary` module.
    QuoteSummaryModule, "quoteSummary module" {
        AssetProfile => "assetProfile",
        SummaryProfile => "summaryProfile",
        SummaryDetail => "summaryDetail",
        Price => "price",
        DefaultKeyStatistics => "defaultKeyStatistics",
        FinancialData => "financialData",
        CalendarEvents => "calendarEvents",
        SecFilings => "secFilings",
        UpgradeDowngradeHistory => "upgradeDowngradeHistory",
        InstitutionOwnership => "institutionOwnership",
        FundOwnership => "fundOwnership",
        MajorDirectHolders => "majorDirectHolders",
        MajorHoldersBreakdown => "majorHoldersBreakdown",
        InsiderTransactions => "insiderTransactions",
        InsiderHolders => "insiderHolders",
        NetSharePurchaseActivity => "netSharePurchaseActivity",
        Earnings => "earnings",
        EarningsHistory => "earningsHistory",
        EarningsTrend => "earningsTrend",
        IndustryTrend => "industryTrend",
        IndexTrend => "indexTrend",
        SectorTrend => "sectorTrend",
        RecommendationTrend => "recommendationTrend",
        PageViews => "pageViews",
    }
}

wire_enum! {
    /// A module of the calendar-events screener.
    CalendarModule, "calendar module" {
        Earnings => "earnings",
        EconomicEvents => "economicEvents",
        IpoEvents => "ipoEvents",
        SecReports => "secReports",
    }
}

wire_enum! {
    /// Reporting frequency for fundamentals timeseries.
    Frequency, "frequency" {
        Annual => "annual",
        Quarterly => "quarterly",
        Trailing => "trailing",
    }
}

wire_enum! {
    /// A financial statement backed by the fundamentals timeseries endpoint.
    Statement, "statement" {
        IncomeStatement => "income_statement",
        BalanceSheet => "balance_sheet",
        CashFlow => "cash_flow",
    }
}

/// Split a comma-separated list, trim each item, parse it and drop repeats
/// while keeping first-seen order.
///
/// # Errors
///
/// Returns [`YfError::InvalidParams`] for the first item that does not parse,
/// or if the list is empty.
pub fn parse_list<T>(csv: &str) -> Result<Vec<T>, YfError>
where
    T: FromStr<Err = YfError> + PartialEq,
{
    let mut out: Vec<T> = Vec::new();
    for item in csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parsed: T = item.parse()?;
        if !out.contains(&parsed) {
            out.push(parsed);
        }
    }
    if out.is_empty() {
        return Err(YfError::InvalidParams(format!("empty list: {csv:?}")));
    }
    Ok(out)
}

/// Join wire values with commas, dropping repeats.
pub(crate) fn join_unique<T>(items: &[T], as_str: fn(T) -> &'static str) -> String
where
    T: Copy + PartialEq,
{
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    for &i in items {
        if !seen.contains(&i) {
            seen.push(i);
        }
    }
    seen.into_iter().map(as_str).collect::<Vec<_>>().join(",")
}
