use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    Long,
    Short,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Long => "Long",
            TradeType::Short => "Short",
        }
    }

    pub fn parse(value: &str) -> Option<TradeType> {
        match value {
            "Long" => Some(TradeType::Long),
            "Short" => Some(TradeType::Short),
            _ => None,
        }
    }
}

/// A single journaled trade. `pnl` is the only field the statistics engine
/// consumes; the optional numerics keep "not entered" distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    /// Calendar date, zero-padded `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub symbol: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    #[serde(default)]
    pub entry: Option<f64>,
    #[serde(default)]
    pub exit: Option<f64>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    pub pnl: f64,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub entry_reason: Option<String>,
    #[serde(default)]
    pub emotions: Option<String>,
    /// Base64 chart image, opaque to the engine.
    #[serde(default)]
    pub screenshot: Option<String>,
    /// Cached AI commentary, opaque to the engine.
    #[serde(default)]
    pub ai_analysis: Option<String>,
}

/// Payload for creating or editing a trade. An edit replaces every stored
/// field except `id` and `ai_analysis` (the latter only changes through
/// explicit attachment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInput {
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub symbol: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    #[serde(default)]
    pub entry: Option<f64>,
    #[serde(default)]
    pub exit: Option<f64>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    pub pnl: f64,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub entry_reason: Option<String>,
    #[serde(default)]
    pub emotions: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

/// Live filter over the trade store. An empty string means "no constraint"
/// for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeFilter {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}
