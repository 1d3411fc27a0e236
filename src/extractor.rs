//! Fund tile extraction from the rendered Smart Investor listing.
//!
//! Tiles without a five-year return are skipped and a missing category tag
//! falls back to `"N/A"`. Any other structural or numeric fault aborts the
//! whole extraction.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use crate::error::ExtractError;
use crate::models::FundRecord;

/// Return-field text on funds too young to have a five-year figure.
pub const NO_FIVE_YEAR_DATA: &str = "No five-year data available";

/// Category used when a tile carries fewer than two tags.
pub const MISSING_CATEGORY: &str = "N/A";

const TILE: &str = "div.FundTile";
const DOUGHNUT_VALUE: &str = "div.DoughnutChartWrapper__main-val";
const PROVIDER: &str = "p.FundTile__category";
const FUND_NAME: &str = "h3.FundTile__title";
const LINK: &str = "a[href]";
const TAG: &str = "span.Tag.FundTile__tag";

pub struct FundExtractor {
    tile: Selector,
    doughnut_value: Selector,
    provider: Selector,
    fund_name: Selector,
    link: Selector,
    tag: Selector,
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css,
        message: e.to_string(),
    })
}

impl FundExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            tile: selector(TILE)?,
            doughnut_value: selector(DOUGHNUT_VALUE)?,
            provider: selector(PROVIDER)?,
            fund_name: selector(FUND_NAME)?,
            link: selector(LINK)?,
            tag: selector(TAG)?,
        })
    }

    /// Extracts unique funds in first-seen document order.
    pub fn extract(&self, document: &Html) -> Result<Vec<FundRecord>, ExtractError> {
        let mut funds = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for (index, tile) in document.select(&self.tile).enumerate() {
            let Some(fund) = self.extract_tile(index, tile)? else {
                debug!("Skipping tile {}: no five-year data", index);
                continue;
            };

            let (provider, name) = fund.key();
            if !seen.insert((provider.to_string(), name.to_string())) {
                debug!("Skipping tile {}: duplicate of {}", index, fund.display_name());
                continue;
            }
            funds.push(fund);
        }

        Ok(funds)
    }

    fn extract_tile(&self, index: usize, tile: ElementRef) -> Result<Option<FundRecord>, ExtractError> {
        let missing = |field: &'static str| ExtractError::MissingField { tile: index, field };

        let mut values = tile.select(&self.doughnut_value);
        let fee_el = values.next().ok_or_else(|| missing("fee value"))?;
        let return_el = values.next().ok_or_else(|| missing("five-year return value"))?;

        let return_text = element_text(return_el);
        let return_text = numeric_text(&return_text);
        if return_text == NO_FIVE_YEAR_DATA {
            return Ok(None);
        }

        let return_percent_5y = parse_percent(index, "five-year return", return_text)?;
        let fee_percent = parse_percent(index, "fee", numeric_text(&element_text(fee_el)))?;

        let provider_name = self
            .first_text(tile, &self.provider)
            .ok_or_else(|| missing("provider name"))?;
        let fund_name = self
            .first_text(tile, &self.fund_name)
            .ok_or_else(|| missing("fund name"))?;
        let fund_link = tile
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| missing("fund link"))?
            .to_string();

        let fund_category = tile
            .select(&self.tag)
            .nth(1)
            .map(|tag| last_line(&element_text(tag)).to_string())
            .unwrap_or_else(|| MISSING_CATEGORY.to_string());

        Ok(Some(FundRecord {
            provider_name,
            fund_name,
            fund_link,
            fund_category,
            fee_percent,
            return_percent_5y,
        }))
    }

    fn first_text(&self, tile: ElementRef, selector: &Selector) -> Option<String> {
        tile.select(selector)
            .next()
            .map(|el| element_text(el).trim().to_string())
    }
}

fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

/// First line of a doughnut value, trimmed, without trailing `%` signs.
fn numeric_text(raw: &str) -> &str {
    let first = raw.trim().split('\n').next().unwrap_or_default();
    first.trim().trim_end_matches('%').trim()
}

fn last_line(raw: &str) -> &str {
    raw.trim().rsplit('\n').next().unwrap_or_default().trim()
}

fn parse_percent(tile: usize, field: &'static str, text: &str) -> Result<f64, ExtractError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ExtractError::Parse {
            tile,
            field,
            value: text.to_string(),
        }),
    }
}

/// Parses markup and extracts funds in one call.
pub fn extract_funds(html: &str) -> Result<Vec<FundRecord>, ExtractError> {
    let document = Html::parse_document(html);
    FundExtractor::new()?.extract(&document)
}
