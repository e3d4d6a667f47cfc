use crate::domain::recommendation::StockSnapshot;
use crate::llm::{ChatMessage, ChatRequest};

pub const DISCOVERY_MAX_TOKENS: u32 = 1000;
pub const ANALYSIS_MAX_TOKENS: u32 = 500;

const DISCOVERY_SYSTEM: &str = "You are a top stock analyst specializing in small-cap stocks. \
Your job is to identify the single most promising small-cap stock \
(market cap under $2B) that shows the highest potential for significant growth.";

const DISCOVERY_USER: &str = "Based on current market conditions, identify the ONE most promising small-cap stock \
that you believe has the highest potential for growth in the near term. \
Provide: 1) Stock symbol, 2) Company name, 3) Detailed reasoning why this is \
your top pick. Focus on stocks with strong fundamentals, recent positive \
developments, or emerging trends. Be specific and thorough in your analysis.";

const ANALYSIS_SYSTEM: &str = "You are a helpful stock analyst.";

const NO_NEWS: &str = "No recent news";
const NOT_AVAILABLE: &str = "N/A";

pub fn discovery_request() -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(DISCOVERY_SYSTEM),
            ChatMessage::user(DISCOVERY_USER),
        ],
        max_tokens: DISCOVERY_MAX_TOKENS,
    }
}

pub fn analysis_request(prompt: String) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::system(ANALYSIS_SYSTEM), ChatMessage::user(prompt)],
        max_tokens: ANALYSIS_MAX_TOKENS,
    }
}

pub fn build_analysis_prompt(snapshot: &StockSnapshot) -> String {
    // A zero price reads as "no price", same as a missing one.
    let price = snapshot
        .quote
        .price
        .filter(|p| *p != 0.0)
        .map(|p| format!("${}", format_decimal(p)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let change = snapshot
        .quote
        .change_percent
        .map(|c| format!("{}%", format_decimal(c)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let news = if snapshot.news.is_empty() {
        NO_NEWS.to_string()
    } else {
        snapshot.news.join("; ")
    };

    format!(
        "You are a top stock analyst. Based on the following discovered small-cap stock with its \
current price, daily change, and recent news headlines, provide a detailed analysis \
of this stock's potential for significant growth:\n\n\
Stock: {symbol}\n\
Current Price: {price}\n\
Daily Change: {change}\n\
Recent News: {news}\n\n\
Provide a comprehensive analysis including:\n\
1. Why this stock shows promise\n\
2. Key factors driving its potential\n\
3. Risk considerations\n\
4. Your overall recommendation",
        symbol = snapshot.symbol,
    )
}

/// Whole numbers keep one decimal (`25.0`); everything else uses the shortest exact form
/// (`12.5`, `11.11`).
///
/// Matches Python float `repr` for magnitudes between 1e-4 and 1e16, which covers prices and
/// daily moves. Outside that range Python switches to exponent notation (`1e-05`, `1e+16`) and
/// this prints plain digits instead.
pub fn format_decimal(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
