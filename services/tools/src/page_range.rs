//! Page selections such as `1-3,7`

use std::{fmt, str::FromStr};

use common::error::AppError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageRangeError {
    #[error("No page ranges given")]
    Empty,

    #[error("Invalid page range: {0:?}")]
    Invalid(String),

    #[error("Pages are numbered from 1")]
    Zero,

    #[error("Range {start}-{end} is reversed")]
    Reversed { start: u32, end: u32 },

    #[error("Page {page} is out of range, document has {count} pages")]
    OutOfRange { page: u32, count: u32 },
}

impl From<PageRangeError> for AppError {
    fn from(err: PageRangeError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Inclusive, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Non-empty list of ranges in the order given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRanges(Vec<PageRange>);

impl PageRanges {
    pub fn ranges(&self) -> &[PageRange] {
        &self.0
    }

    /// Number of pages the selection produces
    pub fn selected_pages(&self) -> u32 {
        self.0.iter().map(PageRange::len).sum()
    }

    pub fn validate(&self, page_count: u32) -> Result<(), PageRangeError> {
        match self.0.iter().find(|range| range.end > page_count) {
            Some(range) => Err(PageRangeError::OutOfRange {
                page: range.end,
                count: page_count,
            }),
            None => Ok(()),
        }
    }

    /// Selection argument for `qpdf --pages`
    pub fn to_qpdf(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn parse_page(raw: &str, item: &str) -> Result<u32, PageRangeError> {
    let page: u32 = raw
        .trim()
        .parse()
        .map_err(|_| PageRangeError::Invalid(item.to_string()))?;
    if page == 0 {
        return Err(PageRangeError::Zero);
    }
    Ok(page)
}

impl FromStr for PageRanges {
    type Err = PageRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let range = match item.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page(start, item)?;
                    let end = parse_page(end, item)?;
                    if start > end {
                        return Err(PageRangeError::Reversed { start, end });
                    }
                    PageRange { start, end }
                }
                None => {
                    let page = parse_page(item, item)?;
                    PageRange {
                        start: page,
                        end: page,
                    }
                }
            };
            ranges.push(range);
        }

        if ranges.is_empty() {
            return Err(PageRangeError::Empty);
        }
        Ok(PageRanges(ranges))
    }
}
