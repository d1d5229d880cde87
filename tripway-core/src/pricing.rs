use serde::{Deserialize, Serialize};

pub const DEFAULT_TAX_RATE: f64 = 0.18;
pub const DEFAULT_CHILD_PRICE_FACTOR: f64 = 0.7;

/// Rates applied when turning a per-person price into a booking total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricingRules {
    pub tax_rate: f64,
    pub child_price_factor: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            child_price_factor: DEFAULT_CHILD_PRICE_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PriceQuote {
    pub unit_price: f64,
    pub adults: u32,
    pub children: u32,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl PricingRules {
    /// `adults * price + children * price * child_factor`, plus tax on that subtotal.
    pub fn quote(&self, adults: u32, children: u32, unit_price: f64) -> PriceQuote {
        let subtotal = adults as f64 * unit_price
            + children as f64 * unit_price * self.child_price_factor;
        let tax = subtotal * self.tax_rate;
        PriceQuote {
            unit_price,
            adults,
            children,
            subtotal: round_cents(subtotal),
            tax: round_cents(tax),
            total: round_cents(subtotal + tax),
        }
    }
}

impl PriceQuote {
    /// True when a client-computed total agrees with this quote to the cent.
    pub fn agrees_with(&self, client_total: f64) -> bool {
        (self.total - client_total).abs() < 0.01 + f64::EPSILON
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_quote() {
        let quote = PricingRules::default().quote(2, 1, 1000.0);
        assert_eq!(quote.subtotal, 2700.0);
        assert_eq!(quote.tax, 486.0);
        assert_eq!(quote.total, 3186.0);
    }

    #[test]
    fn test_adults_only() {
        let quote = PricingRules::default().quote(1, 0, 499.99);
        assert_eq!(quote.subtotal, 499.99);
        assert_eq!(quote.total, 589.99);
    }

    #[test]
    fn test_custom_rules() {
        let rules = PricingRules {
            tax_rate: 0.0,
            child_price_factor: 0.5,
        };
        let quote = rules.quote(2, 2, 100.0);
        assert_eq!(quote.total, 300.0);
    }

    #[test]
    fn test_agreement_tolerates_float_noise() {
        let quote = PricingRules::default().quote(2, 1, 1000.0);
        assert!(quote.agrees_with(3186.0));
        assert!(quote.agrees_with(3186.004));
        assert!(!quote.agrees_with(3000.0));
    }
}
