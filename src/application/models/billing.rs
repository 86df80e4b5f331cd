use serde::{Deserialize, Serialize};

use crate::utils::deserialize::lenient_count;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plan {
    pub tier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub monthly_price: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub daily_limit: Option<u64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub current_plan: bool,
}

impl Plan {
    pub fn is_free(&self) -> bool {
        self.monthly_price == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlansResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl PlansResponse {
    pub fn find(&self, tier: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.tier == tier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CheckoutRequest<'a> {
    pub(crate) plan_tier: &'a str,
}

/// Hosted checkout page to send the user to.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CheckoutResponse {
    pub fn checkout_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|_| self.success)
    }
}

#[cfg(test)]
mod tests_billing_models {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plans() {
        let plans: PlansResponse = serde_json::from_value(json!({
            "success": true,
            "plans": [
                {"tier": "free", "name": "Free", "monthly_price": 0, "daily_limit": 20},
                {"tier": "premium", "name": "Premium", "monthly_price": 9.99,
                 "daily_limit": "∞", "features": ["PDF analysis"], "current_plan": true}
            ]
        }))
        .unwrap();

        assert!(plans.find("free").unwrap().is_free());
        let premium = plans.find("premium").unwrap();
        assert_eq!(premium.daily_limit, None);
        assert!(premium.current_plan);
        assert_eq!(plans.find("enterprise"), None);
    }

    #[test]
    fn test_checkout_url_requires_success() {
        let ok: CheckoutResponse =
            serde_json::from_value(json!({"success": true, "url": "https://pay.example.com/s/1"}))
                .unwrap();
        assert_eq!(ok.checkout_url(), Some("https://pay.example.com/s/1"));

        let failed: CheckoutResponse =
            serde_json::from_value(json!({"success": false, "url": "https://pay.example.com/s/1"}))
                .unwrap();
        assert_eq!(failed.checkout_url(), None);
    }
}
