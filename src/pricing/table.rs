//! Static pricing table

use std::collections::HashSet;
use crate::config::{PricingConfig, PromotionConfig};
use crate::models::{PaymentMethod, PlanDuration, ProductType};
use crate::utils::errors::{PricingError, PricingResult};
use crate::utils::helpers::batches_of_hundred;

/// One sellable plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingEntry {
    pub product: ProductType,
    pub duration: PlanDuration,
    pub stars_price: u32,
    pub cash_price: u32,
    /// Informational only; never used as an expected amount
    pub usd_price: Option<u32>,
    /// Number of 100-Star gift sends needed to cover `stars_price`
    pub required_operation_count: u32,
}

impl PricingEntry {
    pub fn new(product: ProductType, duration: PlanDuration, stars_price: u32, cash_price: u32, usd_price: Option<u32>) -> Self {
        Self {
            product,
            duration,
            stars_price,
            cash_price,
            usd_price,
            required_operation_count: batches_of_hundred(stars_price),
        }
    }

    pub fn amount_for(&self, method: PaymentMethod) -> u32 {
        match method {
            PaymentMethod::Stars => self.stars_price,
            PaymentMethod::MobileCash => self.cash_price,
        }
    }
}

/// Discounted prices for one group tier while a promotion runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionalPrice {
    pub months: u32,
    pub stars_price: u32,
    pub cash_price: u32,
}

impl PromotionalPrice {
    pub fn amount_for(&self, method: PaymentMethod) -> u32 {
        match method {
            PaymentMethod::Stars => self.stars_price,
            PaymentMethod::MobileCash => self.cash_price,
        }
    }
}

/// Resolved price for a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub amount: u32,
    pub required_operation_count: u32,
}

/// Immutable price list, loaded once at startup
#[derive(Debug, Clone)]
pub struct PricingTable {
    entries: Vec<PricingEntry>,
    promotion: Option<PromotionalPrice>,
}

impl PricingTable {
    /// Build and validate a table
    pub fn new(entries: Vec<PricingEntry>, promotion: Option<PromotionalPrice>) -> PricingResult<Self> {
        let table = Self { entries, promotion };
        table.validate()?;
        Ok(table)
    }

    /// Built-in prices, overridden by `[[pricing.plans]]` when any are configured
    pub fn from_config(pricing: &PricingConfig, promotion: &PromotionConfig) -> PricingResult<Self> {
        let entries = if pricing.plans.is_empty() {
            default_entries()
        } else {
            pricing.plans.iter()
                .map(|plan| {
                    let product = plan.product.parse::<ProductType>()
                        .map_err(PricingError::InvalidTable)?;
                    let duration = match (product, plan.months) {
                        (ProductType::Group, Some(months)) if months > 0 => PlanDuration::Months(months),
                        (ProductType::Live, None) => PlanDuration::SingleLive,
                        (product, months) => {
                            return Err(PricingError::InvalidTable(format!(
                                "{} plan cannot have months = {:?}", product, months
                            )));
                        }
                    };
                    Ok(PricingEntry::new(product, duration, plan.stars, plan.cash, plan.usd))
                })
                .collect::<PricingResult<Vec<_>>>()?
        };

        let promotional = promotion.enabled.then(|| PromotionalPrice {
            months: promotion.months,
            stars_price: promotion.stars_price,
            cash_price: promotion.cash_price,
        });

        Self::new(entries, promotional)
    }

    /// Every entry must be priced and unique; Live needs exactly one entry
    pub fn validate(&self) -> PricingResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert((entry.product, entry.duration)) {
                return Err(PricingError::InvalidTable(format!(
                    "duplicate entry for {} / {}", entry.product, entry.duration
                )));
            }
            if entry.stars_price == 0 || entry.cash_price == 0 {
                return Err(PricingError::InvalidTable(format!(
                    "{} / {} must have positive prices", entry.product, entry.duration
                )));
            }
            let consistent = matches!(
                (entry.product, entry.duration),
                (ProductType::Group, PlanDuration::Months(_)) | (ProductType::Live, PlanDuration::SingleLive)
            );
            if !consistent {
                return Err(PricingError::InvalidTable(format!(
                    "{} cannot be sold as {}", entry.product, entry.duration
                )));
            }
        }

        if self.group_durations().is_empty() {
            return Err(PricingError::InvalidTable("no group plans".to_string()));
        }
        if self.entry(ProductType::Live, PlanDuration::SingleLive).is_none() {
            return Err(PricingError::InvalidTable("no live plan".to_string()));
        }
        if let Some(promo) = &self.promotion {
            if promo.months == 0 || promo.stars_price == 0 || promo.cash_price == 0 {
                return Err(PricingError::InvalidTable("promotional price must be positive".to_string()));
            }
        }

        Ok(())
    }

    pub fn entry(&self, product: ProductType, duration: PlanDuration) -> Option<&PricingEntry> {
        self.entries.iter().find(|e| e.product == product && e.duration == duration)
    }

    /// Group plan lengths in ascending order
    pub fn group_durations(&self) -> Vec<PlanDuration> {
        let mut durations: Vec<_> = self.entries.iter()
            .filter(|e| e.product == ProductType::Group)
            .map(|e| e.duration)
            .collect();
        durations.sort();
        durations
    }

    pub fn promotion(&self) -> Option<&PromotionalPrice> {
        self.promotion.as_ref()
    }

    /// Price and Stars batch count for a selection.
    ///
    /// With `promotional` set the discounted price applies to the promoted group tier;
    /// every other combination falls back to the regular entry.
    pub fn quote(&self, product: ProductType, duration: PlanDuration, method: PaymentMethod, promotional: bool) -> PricingResult<Quote> {
        if promotional && product == ProductType::Group {
            if let Some(promo) = self.promotion.filter(|p| duration == PlanDuration::Months(p.months)) {
                let amount = promo.amount_for(method);
                return Ok(Quote {
                    amount,
                    required_operation_count: batches_of_hundred(amount),
                });
            }
        }

        let entry = self.entry(product, duration).ok_or_else(|| PricingError::UnknownPlan {
            product: product.to_string(),
            duration: duration.to_string(),
        })?;
        let amount = entry.amount_for(method);
        let required_operation_count = match method {
            PaymentMethod::Stars => entry.required_operation_count,
            PaymentMethod::MobileCash => batches_of_hundred(amount),
        };

        Ok(Quote { amount, required_operation_count })
    }

    /// Expected amount for a selection
    pub fn price(&self, product: ProductType, duration: PlanDuration, method: PaymentMethod, promotional: bool) -> PricingResult<u32> {
        self.quote(product, duration, method, promotional).map(|q| q.amount)
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            entries: default_entries(),
            promotion: None,
        }
    }
}

fn default_entries() -> Vec<PricingEntry> {
    vec![
        PricingEntry::new(ProductType::Group, PlanDuration::Months(1), 200, 70, None),
        PricingEntry::new(ProductType::Group, PlanDuration::Months(6), 900, 350, None),
        PricingEntry::new(ProductType::Group, PlanDuration::Months(12), 1500, 600, None),
        PricingEntry::new(ProductType::Live, PlanDuration::SingleLive, 2000, 700, Some(20)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanPriceConfig;
    use proptest::prelude::*;

    fn promo_table() -> PricingTable {
        PricingTable::new(default_entries(), Some(PromotionalPrice { months: 1, stars_price: 100, cash_price: 50 })).unwrap()
    }

    #[test]
    fn test_default_prices() {
        let table = PricingTable::default();
        assert!(table.validate().is_ok());

        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(1), PaymentMethod::Stars, false), Ok(200));
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(6), PaymentMethod::MobileCash, false), Ok(350));
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(12), PaymentMethod::Stars, false), Ok(1500));
        assert_eq!(table.price(ProductType::Live, PlanDuration::SingleLive, PaymentMethod::MobileCash, false), Ok(700));
    }

    #[test]
    fn test_operation_counts() {
        let table = PricingTable::default();
        let live = table.entry(ProductType::Live, PlanDuration::SingleLive).unwrap();
        assert_eq!(live.required_operation_count, 20);
        assert_eq!(live.usd_price, Some(20));

        let quote = table.quote(ProductType::Group, PlanDuration::Months(6), PaymentMethod::Stars, false).unwrap();
        assert_eq!(quote.required_operation_count, 9);
    }

    #[test]
    fn test_unknown_plan() {
        let table = PricingTable::default();
        let err = table.price(ProductType::Group, PlanDuration::Months(3), PaymentMethod::Stars, false).unwrap_err();
        assert!(matches!(err, PricingError::UnknownPlan { .. }));
    }

    #[test]
    fn test_promotional_price_only_for_promoted_tier() {
        let table = promo_table();
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(1), PaymentMethod::Stars, true), Ok(100));
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(1), PaymentMethod::MobileCash, true), Ok(50));
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(1), PaymentMethod::Stars, false), Ok(200));
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(6), PaymentMethod::Stars, true), Ok(900));
        assert_eq!(table.price(ProductType::Live, PlanDuration::SingleLive, PaymentMethod::Stars, true), Ok(2000));
    }

    #[test]
    fn test_durations_sorted() {
        let table = PricingTable::default();
        assert_eq!(
            table.group_durations(),
            vec![PlanDuration::Months(1), PlanDuration::Months(6), PlanDuration::Months(12)]
        );
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut entries = default_entries();
        entries.push(PricingEntry::new(ProductType::Group, PlanDuration::Months(1), 10, 10, None));
        assert!(matches!(PricingTable::new(entries, None), Err(PricingError::InvalidTable(_))));
    }

    #[test]
    fn test_missing_live_rejected() {
        let entries = default_entries().into_iter()
            .filter(|e| e.product == ProductType::Group)
            .collect();
        assert!(PricingTable::new(entries, None).is_err());
    }

    #[test]
    fn test_from_config_overrides() {
        let pricing = PricingConfig {
            plans: vec![
                PlanPriceConfig { product: "group".to_string(), months: Some(3), stars: 400, cash: 150, usd: None },
                PlanPriceConfig { product: "live".to_string(), months: None, stars: 1000, cash: 300, usd: Some(10) },
            ],
        };
        let table = PricingTable::from_config(&pricing, &PromotionConfig::default()).unwrap();
        assert_eq!(table.group_durations(), vec![PlanDuration::Months(3)]);
        assert_eq!(table.price(ProductType::Group, PlanDuration::Months(3), PaymentMethod::Stars, false), Ok(400));
        assert!(table.promotion().is_none());
    }

    #[test]
    fn test_from_config_rejects_live_with_months() {
        let pricing = PricingConfig {
            plans: vec![
                PlanPriceConfig { product: "live".to_string(), months: Some(1), stars: 1000, cash: 300, usd: None },
            ],
        };
        assert!(PricingTable::from_config(&pricing, &PromotionConfig::default()).is_err());
    }

    proptest! {
        #[test]
        fn prop_stars_batches_cover_price(stars in 1u32..100_000, cash in 1u32..100_000) {
            let entry = PricingEntry::new(ProductType::Group, PlanDuration::Months(1), stars, cash, None);
            prop_assert!(entry.required_operation_count * 100 >= stars);
            prop_assert!((entry.required_operation_count - 1) * 100 < stars);
        }

        #[test]
        fn prop_price_is_total_for_listed_plans(idx in 0usize..3, stars in any::<bool>(), promo in any::<bool>()) {
            let table = promo_table();
            let duration = table.group_durations()[idx];
            let method = if stars { PaymentMethod::Stars } else { PaymentMethod::MobileCash };
            let amount = table.price(ProductType::Group, duration, method, promo);
            prop_assert!(matches!(amount, Ok(a) if a > 0));
        }
    }
}
