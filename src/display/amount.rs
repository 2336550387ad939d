use dayroll_config::Config;

/// Currency symbol plus fixed decimal places. Rounding happens only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormat {
    pub symbol: String,
    pub precision: usize,
}

impl AmountFormat {
    pub fn new(symbol: impl Into<String>, precision: u8) -> Self {
        Self {
            symbol: symbol.into(),
            precision: usize::from(precision),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.currency_symbol.clone(), config.precision)
    }

    /// Renders `amount` with the sign ahead of the symbol, e.g. `-₹30.00`.
    pub fn format(&self, amount: f64) -> String {
        let rendered = format!("{:.*}", self.precision, amount.abs());
        let is_zero = rendered.chars().all(|c| matches!(c, '0' | '.'));
        if amount.is_sign_negative() && !is_zero {
            format!("-{}{}", self.symbol, rendered)
        } else {
            format!("{}{}", self.symbol, rendered)
        }
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
