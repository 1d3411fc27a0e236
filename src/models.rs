use clap::ValueEnum;
use serde::Serialize;

/// One fund tile from the listing page, in the standard column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundRecord {
    #[serde(rename = "Provider")]
    pub provider_name: String,
    #[serde(rename = "Fund Name")]
    pub fund_name: String,
    #[serde(rename = "Fund Link")]
    pub fund_link: String,
    #[serde(rename = "Fund Category")]
    pub fund_category: String,
    #[serde(rename = "Fee %")]
    pub fee_percent: f64,
    #[serde(rename = "Return % (last 5 years)")]
    pub return_percent_5y: f64,
}

/// Row shape of the combined layout: display name first, then the raw parts.
#[derive(Debug, Serialize)]
pub struct CombinedFundRow<'a> {
    #[serde(rename = "Provider and Fund")]
    pub provider_and_fund: String,
    #[serde(rename = "Return % (last 5 years)")]
    pub return_percent_5y: f64,
    #[serde(rename = "Fund Link")]
    pub fund_link: &'a str,
    #[serde(rename = "Fund Category")]
    pub fund_category: &'a str,
    #[serde(rename = "Fee %")]
    pub fee_percent: f64,
    #[serde(rename = "Provider")]
    pub provider_name: &'a str,
    #[serde(rename = "Fund")]
    pub fund_name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputLayout {
    /// Provider, Fund Name, Fund Link, Fund Category, Fee %, Return %
    #[default]
    Standard,
    /// "Provider Fund" display column first, return ahead of fee
    Combined,
}

pub const STANDARD_HEADERS: [&str; 6] = [
    "Provider",
    "Fund Name",
    "Fund Link",
    "Fund Category",
    "Fee %",
    "Return % (last 5 years)",
];

pub const COMBINED_HEADERS: [&str; 7] = [
    "Provider and Fund",
    "Return % (last 5 years)",
    "Fund Link",
    "Fund Category",
    "Fee %",
    "Provider",
    "Fund",
];

/// A single spreadsheet cell. Percentages stay numeric.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl OutputLayout {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            OutputLayout::Standard => &STANDARD_HEADERS,
            OutputLayout::Combined => &COMBINED_HEADERS,
        }
    }
}

impl FundRecord {
    /// Dedup key: funds are unique by provider and fund name.
    pub fn key(&self) -> (&str, &str) {
        (&self.provider_name, &self.fund_name)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.provider_name, self.fund_name)
    }

    pub fn combined_row(&self) -> CombinedFundRow<'_> {
        CombinedFundRow {
            provider_and_fund: self.display_name(),
            return_percent_5y: self.return_percent_5y,
            fund_link: &self.fund_link,
            fund_category: &self.fund_category,
            fee_percent: self.fee_percent,
            provider_name: &self.provider_name,
            fund_name: &self.fund_name,
        }
    }

    /// Cells in the column order of `layout`, matching `layout.headers()`.
    pub fn cells(&self, layout: OutputLayout) -> Vec<CellValue> {
        let text = |s: &str| CellValue::Text(s.to_string());
        match layout {
            OutputLayout::Standard => vec![
                text(&self.provider_name),
                text(&self.fund_name),
                text(&self.fund_link),
                text(&self.fund_category),
                CellValue::Number(self.fee_percent),
                CellValue::Number(self.return_percent_5y),
            ],
            OutputLayout::Combined => vec![
                CellValue::Text(self.display_name()),
                CellValue::Number(self.return_percent_5y),
                text(&self.fund_link),
                text(&self.fund_category),
                CellValue::Number(self.fee_percent),
                text(&self.provider_name),
                text(&self.fund_name),
            ],
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_fund(provider: &str, name: &str) -> FundRecord {
    FundRecord {
        provider_name: provider.to_string(),
        fund_name: name.to_string(),
        fund_link: format!("/funds/{}", name.to_lowercase().replace(' ', "-")),
        fund_category: "Growth".to_string(),
        fee_percent: 0.35,
        return_percent_5y: 7.5,
    }
}
