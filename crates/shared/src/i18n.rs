//! Message catalog for user-facing error text.
//!
//! The workshop staff work in Arabic or English. Only error messages are
//! translated here; UI labels live with the client.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Language of user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Arabic.
    Ar,
}

impl Locale {
    /// Returns the language tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Picks the first supported language from an `Accept-Language` header.
    ///
    /// Quality weights are honoured; unsupported languages are skipped and
    /// English is the fallback.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Self {
        let mut best: Option<(Self, u16)> = None;

        for part in header.split(',') {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next().unwrap_or_default().trim().to_ascii_lowercase();
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .map_or(1000, parse_quality);

            let locale = match tag.split('-').next() {
                Some("ar") => Self::Ar,
                Some("en") => Self::En,
                _ => continue,
            };

            if best.is_none_or(|(_, q)| quality > q) {
                best = Some((locale, quality));
            }
        }

        best.map_or(Self::En, |(locale, _)| locale)
    }
}

// q-values have at most three decimals; scale to an integer in 0..=1000.
fn parse_quality(raw: &str) -> u16 {
    let mut parts = raw.trim().splitn(2, '.');
    let whole = parts.next().unwrap_or("0");
    let frac = parts.next().unwrap_or("");

    if whole == "1" {
        return 1000;
    }
    if whole != "0" && !whole.is_empty() {
        return 0;
    }

    let digits: String = frac.chars().take(3).collect();
    let padded = format!("{digits:0<3}");
    padded.parse().unwrap_or(0)
}

/// Renders an error message for the caller's locale.
#[must_use]
pub fn localize(error: &AppError, locale: Locale) -> String {
    match locale {
        Locale::En => error.to_string(),
        Locale::Ar => arabic(error),
    }
}

fn arabic(error: &AppError) -> String {
    match error {
        AppError::Validation(detail) => format!("بيانات غير صالحة: {detail}"),
        AppError::NotFound { entity, .. } => format!("{} غير موجود", arabic_entity(entity)),
        AppError::InvalidState { entity, status, .. } => format!(
            "لا يمكن تنفيذ العملية على {} في الحالة {status}",
            arabic_entity(entity)
        ),
        AppError::NotApproved(_) => "المقايسة يجب أن تكون موافق عليها أولاً".to_string(),
        AppError::InsufficientStock {
            available,
            requested,
            ..
        } => format!("الكمية غير كافية في المخزن: المتاح {available}، المطلوب {requested}"),
        AppError::InvalidAmount(amount) => format!("المبلغ غير صالح: {amount}"),
        AppError::BackendUnavailable(_) => "الخدمة غير متاحة حالياً، حاول مرة أخرى".to_string(),
        AppError::Unauthorized(_) => "يجب تسجيل الدخول".to_string(),
        AppError::Forbidden(_) => "ليس لديك صلاحية لتنفيذ هذه العملية".to_string(),
        AppError::Conflict(_) => "السجل موجود بالفعل".to_string(),
        AppError::Internal(_) => "حدث خطأ غير متوقع".to_string(),
    }
}

fn arabic_entity(entity: &str) -> &'static str {
    match entity {
        "Quotation" => "المقايسة",
        "WorkOrder" => "أمر الشغل",
        "Invoice" => "الفاتورة",
        "Part" => "الصنف",
        "PurchaseOrder" => "أمر الشراء",
        "Expense" => "المصروف",
        "Treasury" => "الخزينة",
        "Customer" => "العميل",
        "Vehicle" => "السيارة",
        "Supplier" => "المورد",
        _ => "السجل",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case("ar", Locale::Ar)]
    #[case("ar-EG,en;q=0.8", Locale::Ar)]
    #[case("en-US,ar;q=0.9", Locale::En)]
    #[case("fr-FR,ar;q=0.5,en;q=0.4", Locale::Ar)]
    #[case("fr-FR", Locale::En)]
    #[case("", Locale::En)]
    #[case("en;q=0.2, ar;q=0.7", Locale::Ar)]
    fn test_from_accept_language(#[case] header: &str, #[case] expected: Locale) {
        assert_eq!(Locale::from_accept_language(header), expected);
    }

    #[test]
    fn test_english_uses_display() {
        let error = AppError::not_found("Quotation", "q-1");
        assert_eq!(localize(&error, Locale::En), "Quotation not found: q-1");
    }

    #[test]
    fn test_arabic_not_found() {
        let error = AppError::not_found("Quotation", "q-1");
        assert_eq!(localize(&error, Locale::Ar), "المقايسة غير موجود");
    }

    #[test]
    fn test_arabic_not_approved() {
        let error = AppError::NotApproved(Uuid::nil());
        assert_eq!(
            localize(&error, Locale::Ar),
            "المقايسة يجب أن تكون موافق عليها أولاً"
        );
    }
}
