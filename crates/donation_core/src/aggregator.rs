//! Receipt summary built from the donation form.

use shared::domain::AggregatedFields;
use tracing::warn;

use crate::view::FormField;

pub const CURRENCY: &str = "KES";
pub const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptRow {
    pub label: String,
    pub amount: f64,
}

impl ReceiptRow {
    pub fn formatted_amount(&self) -> String {
        format_amount(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceiptSummary {
    pub rows: Vec<ReceiptRow>,
    pub total: f64,
}

impl ReceiptSummary {
    /// True when no category carried an amount.
    pub fn has_no_entries(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_row(&self) -> ReceiptRow {
        ReceiptRow {
            label: TOTAL_LABEL.to_string(),
            amount: self.total,
        }
    }

    /// Category rows followed by the total row.
    pub fn all_rows(&self) -> Vec<ReceiptRow> {
        let mut rows = self.rows.clone();
        rows.push(self.total_row());
        rows
    }

    /// Rebuilds a summary from a stored record, used when resuming on the review screen.
    pub fn from_fields(fields: &AggregatedFields) -> Self {
        let rows: Vec<ReceiptRow> = fields
            .fields
            .iter()
            .map(|(key, value)| ReceiptRow {
                label: display_label(key),
                amount: parse_amount(value),
            })
            .collect();
        let total = fields
            .total
            .unwrap_or_else(|| rows.iter().map(|row| row.amount).sum());
        Self { rows, total }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub summary: ReceiptSummary,
    pub fields: AggregatedFields,
}

pub fn aggregate(form: &[FormField]) -> Aggregation {
    let mut summary = ReceiptSummary::default();
    let mut fields = AggregatedFields::default();

    for field in form.iter().filter(|field| !field.is_blank()) {
        if field.key == AggregatedFields::TOTAL_KEY {
            warn!(key = %field.key, "ignoring donation field with reserved key");
            continue;
        }

        let amount = parse_amount(&field.value);
        summary.total += amount;
        summary.rows.push(ReceiptRow {
            label: display_label(&field.key),
            amount,
        });
        fields.fields.insert(field.key.clone(), field.value.clone());
    }

    fields.total = Some(summary.total);
    Aggregation { summary, fields }
}

/// `building_fund` -> `Building Fund`. Only the first letter of each word changes.
pub fn display_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphanumeric() {
            if at_word_start {
                label.extend(ch.to_uppercase());
            } else {
                label.push(ch);
            }
            at_word_start = false;
        } else {
            label.push(ch);
            at_word_start = true;
        }
    }
    label
}

/// Parses the longest leading decimal number, `0.0` when there is none.
pub fn parse_amount(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

pub fn format_amount(amount: f64) -> String {
    format!("{CURRENCY} {amount:.2}")
}

/// Keys of non-blank fields whose value does not start with a number.
pub fn invalid_amount_fields(form: &[FormField]) -> Vec<String> {
    form.iter()
        .filter(|field| !field.is_blank() && !starts_with_number(&field.value))
        .map(|field| field.key.clone())
        .collect()
}

fn starts_with_number(raw: &str) -> bool {
    let text = raw.trim_start();
    let text = text.strip_prefix(['+', '-']).unwrap_or(text);
    let text = text.strip_prefix('.').unwrap_or(text);
    text.starts_with(|ch: char| ch.is_ascii_digit())
}

#[cfg(test)]
#[path = "tests/aggregator_tests.rs"]
mod tests;
