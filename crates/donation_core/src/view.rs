//! View capability set the flow drives. Front ends implement this as a thin adapter.

use shared::domain::{DirectoryEntry, ScreenId};

use crate::aggregator::ReceiptSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    SearchInput,
    FormEntity,
    ReceiptEntity,
    ThankYouEntity,
}

impl TextSlot {
    /// Every display that shows the selected church's name.
    pub const ENTITY_DISPLAYS: [TextSlot; 3] = [
        TextSlot::FormEntity,
        TextSlot::ReceiptEntity,
        TextSlot::ThankYouEntity,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: String,
    pub value: String,
}

impl FormField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

pub trait FlowView: Send + Sync {
    fn activate_screen(&self, screen: ScreenId);
    fn deactivate_screen(&self, screen: ScreenId);
    fn show_results(&self, entries: &[DirectoryEntry]);
    fn hide_results(&self);
    fn set_field_text(&self, slot: TextSlot, text: &str);
    fn render_receipt(&self, summary: &ReceiptSummary);
    fn highlight_invalid_fields(&self, keys: &[String]);
    fn set_submit_loading(&self, loading: bool);
    fn set_expandable(&self, expanded: bool);
    fn alert(&self, message: &str);
    /// Current values of the donation form, in form order.
    fn read_donation_form(&self) -> Vec<FormField>;
    /// Current values of the receipt details form, in form order.
    fn read_receipt_form(&self) -> Vec<FormField>;
    fn reset_forms(&self);
}
