use crate::domain::quote::TickerQuote;
use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the analysis prompt knows about the discovered stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub quote: TickerQuote,
    pub news: Vec<String>,
}

impl StockSnapshot {
    pub fn try_new(symbol: &str, quote: TickerQuote, news: Vec<String>) -> anyhow::Result<Self> {
        let symbol = symbol.trim();
        ensure!(!symbol.is_empty(), "snapshot symbol must be non-empty");
        Ok(Self {
            symbol: symbol.to_string(),
            quote,
            news,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub discovery_text: String,
    pub analysis_text: String,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    /// The single string handed to the page.
    pub fn render_text(&self) -> String {
        format!(
            "AI Stock Discovery:\n{}\n\nDetailed Analysis:\n{}",
            self.discovery_text, self.analysis_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_trims_and_rejects_blank_symbol() {
        let s = StockSnapshot::try_new(" GRPH ", TickerQuote::unavailable(), vec![]).unwrap();
        assert_eq!(s.symbol, "GRPH");
        assert!(StockSnapshot::try_new("  ", TickerQuote::unavailable(), vec![]).is_err());
    }

    #[test]
    fn render_text_uses_labeled_sections() {
        let rec = Recommendation {
            symbol: "GRPH".to_string(),
            discovery_text: "pick GRPH".to_string(),
            analysis_text: "looks good".to_string(),
            generated_at: Utc::now(),
        };
        assert_eq!(
            rec.render_text(),
            "AI Stock Discovery:\npick GRPH\n\nDetailed Analysis:\nlooks good"
        );
    }
}
