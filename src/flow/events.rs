//! Inbound events and outbound replies
//!
//! These types are transport-neutral: Telegram updates are translated into
//! [`InboundEvent`]s, and [`Reply`]s are rendered back through an [`Outbound`].

use async_trait::async_trait;
use crate::models::{PaymentMethod, PlanDuration, ProductType};
use crate::utils::errors::Result;

/// Reference to the largest size of an uploaded photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Start,
    Help,
    Support,
    /// Report the current attempt's status
    Status,
    /// Raw callback data from an inline button
    ButtonPress(String),
    Text(String),
    Photo(PhotoRef),
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Start => "start",
            InboundEvent::Help => "help",
            InboundEvent::Support => "support",
            InboundEvent::Status => "status",
            InboundEvent::ButtonPress(_) => "button",
            InboundEvent::Text(_) => "text",
            InboundEvent::Photo(_) => "photo",
        }
    }
}

/// An event together with who sent it
#[derive(Debug, Clone)]
pub struct Incoming {
    pub user_id: i64,
    /// Client language reported by Telegram, used for new sessions
    pub language_code: Option<String>,
    pub event: InboundEvent,
}

impl Incoming {
    pub fn new(user_id: i64, event: InboundEvent) -> Self {
        Self {
            user_id,
            language_code: None,
            event,
        }
    }

    pub fn with_language(mut self, language_code: Option<String>) -> Self {
        self.language_code = language_code;
        self
    }
}

/// Parsed inline button payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Product(ProductType),
    Support,
    Duration(PlanDuration),
    PromoDuration,
    Pay(PaymentMethod),
}

impl ButtonAction {
    /// Parse `action:param` callback data
    pub fn parse(data: &str) -> Option<Self> {
        let (action, param) = match data.split_once(':') {
            Some((action, param)) => (action, Some(param)),
            None => (data, None),
        };

        match (action, param) {
            ("support", None) => Some(ButtonAction::Support),
            ("product", Some(product)) => product.parse().ok().map(ButtonAction::Product),
            ("duration", Some("promo")) => Some(ButtonAction::PromoDuration),
            ("duration", Some(key)) => match PlanDuration::from_key(key)? {
                PlanDuration::Months(months) => Some(ButtonAction::Duration(PlanDuration::Months(months))),
                PlanDuration::SingleLive => None,
            },
            ("pay", Some("stars")) => Some(ButtonAction::Pay(PaymentMethod::Stars)),
            ("pay", Some("cash")) => Some(ButtonAction::Pay(PaymentMethod::MobileCash)),
            _ => None,
        }
    }

    pub fn callback_data(&self) -> String {
        match self {
            ButtonAction::Product(product) => format!("product:{}", product.as_str()),
            ButtonAction::Support => "support".to_string(),
            ButtonAction::Duration(duration) => format!("duration:{}", duration.as_key()),
            ButtonAction::PromoDuration => "duration:promo".to_string(),
            ButtonAction::Pay(PaymentMethod::Stars) => "pay:stars".to_string(),
            ButtonAction::Pay(PaymentMethod::MobileCash) => "pay:cash".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

impl Button {
    pub fn action(label: impl Into<String>, action: ButtonAction) -> Self {
        Button::Callback {
            label: label.into(),
            data: action.callback_data(),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Url {
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Post a new message
    Send,
    /// Replace the message that carried the pressed button
    EditLast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub mode: ReplyMode,
    pub text: String,
    /// Button rows
    pub buttons: Vec<Vec<Button>>,
}

impl Reply {
    pub fn send(text: impl Into<String>) -> Self {
        Self {
            mode: ReplyMode::Send,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Self {
            mode: ReplyMode::EditLast,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Vec<Button>>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Delivers replies to the user
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn deliver(&self, reply: Reply) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_buttons() {
        assert_eq!(ButtonAction::parse("product:group"), Some(ButtonAction::Product(ProductType::Group)));
        assert_eq!(ButtonAction::parse("product:live"), Some(ButtonAction::Product(ProductType::Live)));
        assert_eq!(ButtonAction::parse("support"), Some(ButtonAction::Support));
        assert_eq!(ButtonAction::parse("duration:6"), Some(ButtonAction::Duration(PlanDuration::Months(6))));
        assert_eq!(ButtonAction::parse("duration:promo"), Some(ButtonAction::PromoDuration));
        assert_eq!(ButtonAction::parse("pay:stars"), Some(ButtonAction::Pay(PaymentMethod::Stars)));
        assert_eq!(ButtonAction::parse("pay:cash"), Some(ButtonAction::Pay(PaymentMethod::MobileCash)));
    }

    #[test]
    fn test_parse_unknown_buttons() {
        assert_eq!(ButtonAction::parse("group_sub"), None);
        assert_eq!(ButtonAction::parse("product:vip"), None);
        assert_eq!(ButtonAction::parse("duration:live"), None);
        assert_eq!(ButtonAction::parse("duration:-1"), None);
        assert_eq!(ButtonAction::parse("pay:card"), None);
        assert_eq!(ButtonAction::parse("support:now"), None);
        assert_eq!(ButtonAction::parse(""), None);
    }

    #[test]
    fn test_callback_data_parses_back() {
        let actions = [
            ButtonAction::Product(ProductType::Live),
            ButtonAction::Duration(PlanDuration::Months(12)),
            ButtonAction::PromoDuration,
            ButtonAction::Pay(PaymentMethod::MobileCash),
        ];
        for action in actions {
            assert_eq!(ButtonAction::parse(&action.callback_data()), Some(action));
        }
    }
}
