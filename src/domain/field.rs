//! Screenable field identifiers.
//!
//! `FieldId` names every metric the screener can filter on. The canonical
//! snake_case names double as CSV column headers and as identifiers in the
//! canonical filter expression form. Which fields are actually available in
//! a given market is declared by that market's schema, not here.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    MarketCap,
    Price,
    PeRatio,
    PegRatio,
    PriceToBook,
    DividendYield,
    RevenueGrowth,
    EpsGrowth,
    ProfitMargin,
    GrossMargin,
    ReturnOnEquity,
    Revenue,
    NetIncome,
    Ebitda,
    Volume,
    Beta,
    Sector,
}

/// How a field's values are expressed.
///
/// `Percentage` values are whole-number percent (a 10% yield is stored and
/// compared as `10.0`, never `0.1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Monetary,
    Ratio,
    Percentage,
    Count,
    Categorical,
}

impl FieldId {
    pub const ALL: [FieldId; 17] = [
        FieldId::MarketCap,
        FieldId::Price,
        FieldId::PeRatio,
        FieldId::PegRatio,
        FieldId::PriceToBook,
        FieldId::DividendYield,
        FieldId::RevenueGrowth,
        FieldId::EpsGrowth,
        FieldId::ProfitMargin,
        FieldId::GrossMargin,
        FieldId::ReturnOnEquity,
        FieldId::Revenue,
        FieldId::NetIncome,
        FieldId::Ebitda,
        FieldId::Volume,
        FieldId::Beta,
        FieldId::Sector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldId::MarketCap => "market_cap",
            FieldId::Price => "price",
            FieldId::PeRatio => "pe_ratio",
            FieldId::PegRatio => "peg_ratio",
            FieldId::PriceToBook => "price_to_book",
            FieldId::DividendYield => "dividend_yield",
            FieldId::RevenueGrowth => "revenue_growth",
            FieldId::EpsGrowth => "eps_growth",
            FieldId::ProfitMargin => "profit_margin",
            FieldId::GrossMargin => "gross_margin",
            FieldId::ReturnOnEquity => "return_on_equity",
            FieldId::Revenue => "revenue",
            FieldId::NetIncome => "net_income",
            FieldId::Ebitda => "ebitda",
            FieldId::Volume => "volume",
            FieldId::Beta => "beta",
            FieldId::Sector => "sector",
        }
    }

    pub fn from_name(name: &str) -> Option<FieldId> {
        FieldId::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn kind(self) -> ValueKind {
        match self {
            FieldId::MarketCap
            | FieldId::Price
            | FieldId::Revenue
            | FieldId::NetIncome
            | FieldId::Ebitda => ValueKind::Monetary,
            FieldId::PeRatio
            | FieldId::PegRatio
            | FieldId::PriceToBook
            | FieldId::Beta => ValueKind::Ratio,
            FieldId::DividendYield
            | FieldId::RevenueGrowth
            | FieldId::EpsGrowth
            | FieldId::ProfitMargin
            | FieldId::GrossMargin
            | FieldId::ReturnOnEquity => ValueKind::Percentage,
            FieldId::Volume => ValueKind::Count,
            FieldId::Sector => ValueKind::Categorical,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Monetary => "monetary",
            ValueKind::Ratio => "ratio",
            ValueKind::Percentage => "percentage",
            ValueKind::Count => "count",
            ValueKind::Categorical => "categorical",
        };
        f.write_str(s)
    }
}
