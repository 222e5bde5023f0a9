//! Unwrapping Yahoo's response envelopes, shared by the async and blocking facades.

use serde_json::Value;

use crate::core::{QuoteSummaryModule, YfError};

pub(crate) const CHART: &str = "/chart/result/0";
pub(crate) const QUOTE: &str = "/quoteResponse/result/0";
pub(crate) const QUOTES: &str = "/quoteResponse/result";
pub(crate) const QUOTE_TYPE: &str = "/quoteType/result/0";
pub(crate) const QUOTE_TYPES: &str = "/quoteType/result";
pub(crate) const QUOTE_SUMMARY: &str = "/quoteSummary/result/0";
pub(crate) const TIMESERIES: &str = "/timeseries/result";
pub(crate) const OPTIONS: &str = "/optionChain/result/0";
pub(crate) const FINANCE: &str = "/finance/result/0";

/// Move the value at `pointer` out of `body`.
///
/// A missing or `null` value is [`YfError::MissingData`], carrying Yahoo's
/// own error description when the envelope has one.
pub(crate) fn take(mut body: Value, pointer: &str) -> Result<Value, YfError> {
    match body.pointer_mut(pointer).map(Value::take) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(YfError::MissingData(match yahoo_error(&body) {
            Some(desc) => format!("{pointer}: {desc}"),
            None => format!("{pointer} not found in response"),
        })),
    }
}

/// Like [`take`], for envelopes whose payload is a list.
pub(crate) fn take_list(body: Value, pointer: &str) -> Result<Vec<Value>, YfError> {
    match take(body, pointer)? {
        Value::Array(items) => Ok(items),
        _ => Err(YfError::MissingData(format!("{pointer} is not a list"))),
    }
}

/// One module out of a `quoteSummary` result. Modules that only wrap a list
/// yield the list itself.
pub(crate) fn summary_module(body: Value, module: QuoteSummaryModule) -> Result<Value, YfError> {
    let mut pointer = format!("{QUOTE_SUMMARY}/{}", module.as_str());
    if let Some(key) = list_key(module) {
        pointer.push('/');
        pointer.push_str(key);
    }
    take(body, &pointer)
}

const fn list_key(module: QuoteSummaryModule) -> Option<&'static str> {
    use QuoteSummaryModule as M;
    match module {
        M::UpgradeDowngradeHistory | M::EarningsHistory => Some("history"),
        M::InstitutionOwnership | M::FundOwnership => Some("ownershipList"),
        M::InsiderTransactions => Some("transactions"),
        M::InsiderHolders => Some("holders"),
        M::EarningsTrend | M::RecommendationTrend => Some("trend"),
        _ => None,
    }
}

fn yahoo_error(body: &Value) -> Option<&str> {
    body.as_object()?
        .values()
        .find_map(|v| v.pointer("/error/description"))
        .and_then(Value::as_str)
}

/// Invokes `$callback!` with every named `quoteSummary` accessor.
macro_rules! summary_accessors {
    ($callback:ident) => {
        $callback! {
            asset_profile => AssetProfile,
            summary_profile => SummaryProfile,
            summary_detail => SummaryDetail,
            price => Price,
            default_key_statistics => DefaultKeyStatistics,
            financial_data => FinancialData,
            calendar_events => CalendarEvents,
            sec_filings => SecFilings,
            upgrade_downgrade_history => UpgradeDowngradeHistory,
            institution_ownership => InstitutionOwnership,
            fund_ownership => FundOwnership,
            major_direct_holders => MajorDirectHolders,
            major_holders_breakdown => MajorHoldersBreakdown,
            insider_transactions => InsiderTransactions,
            insider_holders => InsiderHolders,
            net_share_purchase_activity => NetSharePurchaseActivity,
            earnings => Earnings,
            earnings_history => EarningsHistory,
            earnings_trend => EarningsTrend,
            industry_trend => IndustryTrend,
            index_trend => IndexTrend,
            sector_trend => SectorTrend,
            recommendation_trend => RecommendationTrend,
            page_views => PageViews,
        }
    };
}
pub(crate) use summary_accessors;
