use serde::{Deserialize, Serialize};

/// Last price and daily move for one ticker. Both fields are `None` when the provider could not
/// be reached or did not know the symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerQuote {
    pub price: Option<f64>,
    pub change_percent: Option<f64>,
}

impl TickerQuote {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_prices(price: Option<f64>, previous_close: Option<f64>) -> Self {
        Self {
            price,
            change_percent: change_percent(price, previous_close),
        }
    }
}

/// `(price - previous) / previous * 100`, rounded to 2 decimals. `None` when either side is
/// missing or the previous close is zero.
pub fn change_percent(price: Option<f64>, previous_close: Option<f64>) -> Option<f64> {
    let (price, previous) = (price?, previous_close?);
    if previous == 0.0 {
        return None;
    }
    let pct = (price - previous) / previous * 100.0;
    pct.is_finite().then(|| round2(pct))
}

/// Exact halves go to the even neighbour, so 0.125 becomes 0.12.
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}
