use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ExtractError;

/// How the first row of a detected table is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Guess from the shape of the first two rows.
    #[default]
    AutoDetect,
    HasHeader,
    NoHeader,
}

/// What happens to tables whose layout confidence is low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMode {
    #[default]
    BestEffort,
    Strict,
    SkipAmbiguous,
}

/// 1-based page ranges, written like `1-3,5`.
///
/// Ranges are kept as written and never expanded into single pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection(Vec<RangeInclusive<u32>>);

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.0.iter().any(|range| range.contains(&page))
    }
}

fn page_number(raw: &str, token: &str) -> Result<u32, ExtractError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ExtractError::InvalidPageSelection(format!(
            "'{token}': pages are 1-based"
        ))),
        Ok(page) => Ok(page),
        Err(_) => Err(ExtractError::InvalidPageSelection(format!(
            "'{token}' is not a page number or range"
        ))),
    }
}

fn page_range(token: &str) -> Result<RangeInclusive<u32>, ExtractError> {
    let Some((start, end)) = token.split_once('-') else {
        let page = page_number(token, token)?;
        return Ok(page..=page);
    };

    let (start, end) = (page_number(start, token)?, page_number(end, token)?);
    if end < start {
        return Err(ExtractError::InvalidPageSelection(format!(
            "'{token}' ends before it starts"
        )));
    }
    Ok(start..=end)
}

impl FromStr for PageSelection {
    type Err = ExtractError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let ranges = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(page_range)
            .collect::<Result<Vec<_>, _>>()?;

        if ranges.is_empty() {
            return Err(ExtractError::InvalidPageSelection(
                "no pages given".to_string(),
            ));
        }
        Ok(Self(ranges))
    }
}

/// Which pages an extractor scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelector {
    #[default]
    All,
    Pages(PageSelection),
}

impl PageSelector {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        match self {
            Self::All => true,
            Self::Pages(selection) => selection.contains(page),
        }
    }
}

impl FromStr for PageSelector {
    type Err = ExtractError;

    /// Accepts `all` (any case) or a [`PageSelection`].
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            raw.parse().map(Self::Pages)
        }
    }
}

/// Tuning knobs of the text-layout table detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub header_mode: HeaderMode,
    pub quality_mode: QualityMode,
    /// Cells a line needs before it can be part of a table. At least 2.
    pub min_cols: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::AutoDetect,
            quality_mode: QualityMode::BestEffort,
            min_cols: 2,
        }
    }
}
