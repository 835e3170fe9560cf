//! Test data helpers
//!
//! Payment settings, pricing tables and photo references shared by the flow tests.

use SubscriptionBot::config::{I18nConfig, PaymentConfig};
use SubscriptionBot::flow::PhotoRef;
use SubscriptionBot::models::{PlanDuration, ProductType};
use SubscriptionBot::pricing::{PricingEntry, PricingTable, PromotionalPrice};

pub const TEST_USER_ID: i64 = 700_001;
pub const OTHER_USER_ID: i64 = 700_002;

pub const CASH_NUMBER: &str = "01012345678";
pub const STARS_HANDLE: &str = "@test_gifts";
pub const DELIVERY_LINK: &str = "https://t.me/+test_subscribers";

pub fn test_payment_config() -> PaymentConfig {
    PaymentConfig {
        cash_number: CASH_NUMBER.to_string(),
        stars_handle: STARS_HANDLE.to_string(),
        support_link: "https://t.me/test_support".to_string(),
        delivery_link: DELIVERY_LINK.to_string(),
    }
}

/// Shipped translation files, independent of the test's working directory
pub fn test_i18n_config() -> I18nConfig {
    I18nConfig {
        default_language: "ar".to_string(),
        supported_languages: vec!["ar".to_string(), "en".to_string()],
        translations_dir: format!("{}/translations", env!("CARGO_MANIFEST_DIR")),
    }
}

/// Table where six months of group access costs 400 Stars
pub fn custom_pricing() -> PricingTable {
    PricingTable::new(
        vec![
            PricingEntry::new(ProductType::Group, PlanDuration::Months(1), 200, 70, None),
            PricingEntry::new(ProductType::Group, PlanDuration::Months(6), 400, 160, None),
            PricingEntry::new(ProductType::Group, PlanDuration::Months(12), 1500, 600, None),
            PricingEntry::new(ProductType::Live, PlanDuration::SingleLive, 2000, 700, Some(20)),
        ],
        None,
    )
    .expect("custom pricing table should be valid")
}

/// Default prices plus a one-month offer at 100 Stars / 50 EGP
pub fn promotional_pricing() -> PricingTable {
    PricingTable::new(
        vec![
            PricingEntry::new(ProductType::Group, PlanDuration::Months(1), 200, 70, None),
            PricingEntry::new(ProductType::Group, PlanDuration::Months(6), 900, 350, None),
            PricingEntry::new(ProductType::Group, PlanDuration::Months(12), 1500, 600, None),
            PricingEntry::new(ProductType::Live, PlanDuration::SingleLive, 2000, 700, Some(20)),
        ],
        Some(PromotionalPrice {
            months: 1,
            stars_price: 100,
            cash_price: 50,
        }),
    )
    .expect("promotional pricing table should be valid")
}

pub fn test_photo(file_id: &str) -> PhotoRef {
    PhotoRef {
        file_id: file_id.to_string(),
        width: 1080,
        height: 1920,
        file_size: 204_800,
    }
}
