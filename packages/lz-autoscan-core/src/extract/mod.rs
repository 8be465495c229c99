//! Scraping of delivery arguments out of unstructured explorer pages.

use regex::Regex;
use std::collections::HashSet;
use crate::{types::ExtractedPayload, Error};

/// `0x` + 64 hex chars.
const SENDER32_LEN: usize = 66;
const HEX_PATTERN: &str = r"0x[0-9a-fA-F]{64,}";

/// Strategy that turns a detail page into delivery arguments.
pub trait PayloadExtractor: Send + Sync {
    fn extract(&self, text: &str) -> ExtractedPayload;
}

/// Picks the first 32-byte hex value as the sender and the first longer
/// whole-byte hex value as the payload.
#[derive(Debug, Clone)]
pub struct HexExtractor {
    pattern: Regex,
}

impl HexExtractor {
    pub fn new() -> Result<Self, Error> {
        let pattern = Regex::new(HEX_PATTERN)
            .map_err(|e| Error::Extraction(format!("Invalid hex pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Unique candidates in first-seen order.
    fn candidates<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|candidate| seen.insert(*candidate))
            .collect()
    }
}

impl PayloadExtractor for HexExtractor {
    fn extract(&self, text: &str) -> ExtractedPayload {
        let candidates = self.candidates(text);

        let sender32 = candidates
            .iter()
            .find(|h| h.len() == SENDER32_LEN)
            .map(|h| h.to_string());
        let payload = candidates
            .iter()
            .find(|h| h.len() > SENDER32_LEN && h.len() % 2 == 0)
            .map(|h| h.to_string());

        ExtractedPayload { sender32, payload }
    }
}
