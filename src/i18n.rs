//! Typed message catalog.
//!
//! Every user-facing string is reached through a [`MessageKey`] variant and
//! resolved by an exhaustive `match`, so adding a key without a translation
//! for every [`Locale`] fails to compile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Locale {
    /// Parse a language tag such as `en-US`, `zh-TW` or `zh`. Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split([',', ';'])
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if primary == "zh" || primary.starts_with("zh-") || primary.starts_with("zh_") {
            Locale::ZhTw
        } else {
            Locale::En
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhTw => "zh-TW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    BaselineMissingPrefix,
    FieldFrequency,
    FieldDuration,
    FieldDailySteps,
    QuadrantPhysical,
    QuadrantDigital,
    QuadrantSocial,
    QuadrantSpiritual,
    MalformedWord,
    MatrixNotFound,
}

pub fn text(locale: Locale, key: MessageKey) -> &'static str {
    match locale {
        Locale::En => match key {
            MessageKey::BaselineMissingPrefix => "Missing required fields: ",
            MessageKey::FieldFrequency => "frequency",
            MessageKey::FieldDuration => "duration",
            MessageKey::FieldDailySteps => "dailySteps",
            MessageKey::QuadrantPhysical => "Physical",
            MessageKey::QuadrantDigital => "Digital",
            MessageKey::QuadrantSocial => "Social",
            MessageKey::QuadrantSpiritual => "Spiritual",
            MessageKey::MalformedWord => "On-chain matrix data is malformed",
            MessageKey::MatrixNotFound => "No Twin Matrix has been minted for this wallet",
        },
        Locale::ZhTw => match key {
            MessageKey::BaselineMissingPrefix => "缺少必填欄位：",
            MessageKey::FieldFrequency => "運動頻率",
            MessageKey::FieldDuration => "運動時長",
            MessageKey::FieldDailySteps => "每日步數",
            MessageKey::QuadrantPhysical => "身體",
            MessageKey::QuadrantDigital => "數位",
            MessageKey::QuadrantSocial => "社會",
            MessageKey::QuadrantSpiritual => "精神",
            MessageKey::MalformedWord => "鏈上矩陣資料格式錯誤",
            MessageKey::MatrixNotFound => "此錢包尚未鑄造 Twin Matrix",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("zh-TW"), Locale::ZhTw);
        assert_eq!(Locale::from_tag("zh"), Locale::ZhTw);
        assert_eq!(Locale::from_tag("zh-Hant-TW,en;q=0.8"), Locale::ZhTw);
        assert_eq!(Locale::from_tag("en-US"), Locale::En);
        assert_eq!(Locale::from_tag("fr"), Locale::En);
        assert_eq!(Locale::from_tag(""), Locale::En);
    }

    #[test]
    fn test_every_locale_resolves() {
        for locale in [Locale::En, Locale::ZhTw] {
            assert!(!text(locale, MessageKey::MalformedWord).is_empty());
            assert!(!text(locale, MessageKey::QuadrantSpiritual).is_empty());
        }
        assert_eq!(text(Locale::En, MessageKey::QuadrantPhysical), "Physical");
    }

    #[test]
    fn test_locale_serde_tag() {
        assert_eq!(serde_json::to_value(Locale::ZhTw).unwrap(), "zh-TW");
        let en: Locale = serde_json::from_value(serde_json::json!("en")).unwrap();
        assert_eq!(en, Locale::En);
    }
}
