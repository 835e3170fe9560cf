//! Prompt texts and inline keyboards for each step

use crate::config::PaymentConfig;
use crate::i18n::{params, I18n};
use crate::models::{PaymentMethod, PlanDuration, ProductType};
use crate::pricing::{PricingEntry, PricingTable, PromotionalPrice, Quote};
use crate::utils::errors::{PricingError, PricingResult};
use super::events::{Button, ButtonAction, Reply};

/// Builds replies from translations, prices and payment details
pub struct Menus<'a> {
    pub i18n: &'a I18n,
    pub pricing: &'a PricingTable,
    pub payment: &'a PaymentConfig,
}

impl<'a> Menus<'a> {
    fn t(&self, key: &str, lang: &str) -> String {
        self.i18n.t(key, lang, None)
    }

    /// "6 months" in the user's language
    pub fn duration_label(&self, duration: PlanDuration, lang: &str) -> String {
        match duration {
            PlanDuration::Months(months) => self.i18n.tp("months", lang, i64::from(months), None),
            PlanDuration::SingleLive => self.t("live.label", lang),
        }
    }

    pub fn start(&self, lang: &str) -> Reply {
        Reply::send(self.t("start.greeting", lang)).with_buttons(vec![
            vec![Button::action(self.t("buttons.group", lang), ButtonAction::Product(ProductType::Group))],
            vec![Button::action(self.t("buttons.live", lang), ButtonAction::Product(ProductType::Live))],
            vec![Button::action(self.t("buttons.support", lang), ButtonAction::Support)],
        ])
    }

    pub fn help(&self, lang: &str) -> Reply {
        Reply::send(self.t("help.text", lang))
    }

    pub fn support(&self, lang: &str) -> Reply {
        Reply::send(self.t("support.text", lang)).with_buttons(vec![vec![
            Button::url(self.t("buttons.open_support", lang), &self.payment.support_link),
        ]])
    }

    /// Regular durations, or only the promotional option while an offer runs
    pub fn durations(&self, lang: &str, promotion: Option<PromotionalPrice>) -> Reply {
        if let Some(promo) = promotion {
            let label = self.i18n.t("buttons.promo", lang, Some(&params([
                ("duration", self.duration_label(PlanDuration::Months(promo.months), lang)),
                ("stars", promo.stars_price.to_string()),
                ("cash", promo.cash_price.to_string()),
            ])));
            return Reply::edit(self.t("duration.promo_prompt", lang))
                .with_buttons(vec![vec![Button::action(label, ButtonAction::PromoDuration)]]);
        }

        let rows = self.pricing.group_durations().into_iter()
            .filter_map(|duration| self.pricing.entry(ProductType::Group, duration))
            .map(|entry| vec![Button::action(self.duration_button_label(entry, lang), ButtonAction::Duration(entry.duration))])
            .collect();

        Reply::edit(self.t("duration.prompt", lang)).with_buttons(rows)
    }

    fn duration_button_label(&self, entry: &PricingEntry, lang: &str) -> String {
        self.i18n.t("buttons.duration", lang, Some(&params([
            ("duration", self.duration_label(entry.duration, lang)),
            ("stars", entry.stars_price.to_string()),
            ("cash", entry.cash_price.to_string()),
        ])))
    }

    fn payment_buttons(&self, lang: &str) -> Vec<Vec<Button>> {
        vec![
            vec![Button::action(self.t("buttons.stars", lang), ButtonAction::Pay(PaymentMethod::Stars))],
            vec![Button::action(self.t("buttons.cash", lang), ButtonAction::Pay(PaymentMethod::MobileCash))],
        ]
    }

    /// Payment choice after a group duration was picked
    pub fn payment_methods(&self, duration: PlanDuration, promotional: bool, lang: &str) -> Reply {
        let key = if promotional { "payment.promo_prompt" } else { "payment.prompt" };
        let text = self.i18n.t(key, lang, Some(&params([
            ("duration", self.duration_label(duration, lang)),
        ])));
        Reply::edit(text).with_buttons(self.payment_buttons(lang))
    }

    /// Live price card with every currency, followed by the payment choice
    pub fn live_card(&self, lang: &str) -> PricingResult<Reply> {
        let entry = self.pricing.entry(ProductType::Live, PlanDuration::SingleLive)
            .ok_or_else(|| PricingError::UnknownPlan {
                product: ProductType::Live.to_string(),
                duration: PlanDuration::SingleLive.to_string(),
            })?;

        let mut values = params([
            ("stars", entry.stars_price.to_string()),
            ("cash", entry.cash_price.to_string()),
        ]);
        let key = match entry.usd_price {
            Some(usd) => {
                values.insert("usd".to_string(), usd.to_string());
                "live.card"
            }
            None => "live.card_local",
        };

        Ok(Reply::edit(self.i18n.t(key, lang, Some(&values))).with_buttons(self.payment_buttons(lang)))
    }

    /// Where and how to pay
    pub fn payment_instructions(&self, method: PaymentMethod, quote: Quote, lang: &str) -> Reply {
        let text = match method {
            PaymentMethod::Stars => self.i18n.t("payment.stars_instructions", lang, Some(&params([
                ("amount", quote.amount.to_string()),
                ("handle", self.payment.stars_handle.clone()),
                ("operations", quote.required_operation_count.to_string()),
            ]))),
            PaymentMethod::MobileCash => self.i18n.t("payment.cash_instructions", lang, Some(&params([
                ("amount", quote.amount.to_string()),
                ("number", self.payment.cash_number.clone()),
            ]))),
        };
        Reply::edit(text)
    }

    pub fn unit(&self, method: PaymentMethod, lang: &str) -> String {
        match method {
            PaymentMethod::Stars => self.t("units.stars", lang),
            PaymentMethod::MobileCash => self.t("units.cash", lang),
        }
    }

    pub fn delivery(&self, lang: &str) -> Reply {
        Reply::send(self.t("screenshot.verified", lang)).with_buttons(vec![vec![
            Button::url(self.t("buttons.open_delivery", lang), &self.payment.delivery_link),
        ]])
    }
}
