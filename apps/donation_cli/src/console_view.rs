//! Terminal rendition of the flow's screens.

use std::sync::{Mutex, MutexGuard, PoisonError};

use donation_core::{FlowView, FormField, ReceiptSummary, TextSlot};
use shared::{
    domain::{DirectoryEntry, ScreenId},
    protocol::ReceiptDetails,
};

pub const DONATION_FIELDS: [&str; 5] = [
    "tithe",
    "offering",
    "thanksgiving",
    "building_fund",
    "church_budget",
];

pub const RECEIPT_FIELDS: [&str; 3] = [
    ReceiptDetails::FULL_NAME,
    ReceiptDetails::CHURCH_MEMBER,
    ReceiptDetails::MPESA_NUMBER,
];

const EXPANDED_INFO: &str =
    "Donations are forwarded to your church's M-Pesa account; a receipt is sent by SMS.";

struct ConsoleState {
    donation_form: Vec<FormField>,
    receipt_form: Vec<FormField>,
    results: Vec<DirectoryEntry>,
    entity: String,
    search_input: String,
}

pub struct ConsoleView {
    state: Mutex<ConsoleState>,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_form(keys: &[&str]) -> Vec<FormField> {
    keys.iter().map(|key| FormField::new(*key, "")).collect()
}

impl ConsoleView {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                donation_form: blank_form(&DONATION_FIELDS),
                receipt_form: blank_form(&RECEIPT_FIELDS),
                results: Vec::new(),
                entity: String::new(),
                search_input: String::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ConsoleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_donation_field(&self, key: &str, value: &str) -> Result<(), String> {
        set_field(&mut self.state().donation_form, key, value)
    }

    pub fn set_receipt_field(&self, key: &str, value: &str) -> Result<(), String> {
        set_field(&mut self.state().receipt_form, key, value)
    }

    /// Entry at a 1-based position of the last result list.
    pub fn result_at(&self, index: usize) -> Option<DirectoryEntry> {
        index
            .checked_sub(1)
            .and_then(|i| self.state().results.get(i).cloned())
    }

    pub fn describe_forms(&self) -> String {
        let state = self.state();
        let render = |form: &[FormField]| {
            form.iter()
                .map(|field| format!("{}={:?}", field.key, field.value))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!(
            "search: {:?}\nchurch: {:?}\ndonations: {}\ndetails: {}",
            state.search_input,
            state.entity,
            render(&state.donation_form),
            render(&state.receipt_form)
        )
    }
}

fn set_field(form: &mut [FormField], key: &str, value: &str) -> Result<(), String> {
    let Some(position) = form.iter().position(|field| field.key == key) else {
        let known: Vec<&str> = form.iter().map(|field| field.key.as_str()).collect();
        return Err(format!(
            "unknown field '{key}', expected one of: {}",
            known.join(", ")
        ));
    };
    form[position].value = value.to_string();
    Ok(())
}

fn screen_title(screen: ScreenId) -> &'static str {
    match screen {
        ScreenId::Search => "Find your church",
        ScreenId::Form => "Enter donation amounts",
        ScreenId::Review => "Review receipt",
        ScreenId::Confirmation => "Thank you",
    }
}

impl FlowView for ConsoleView {
    fn activate_screen(&self, screen: ScreenId) {
        let state = self.state();
        println!();
        println!("== [{}] {} ==", screen.number(), screen_title(screen));
        match screen {
            ScreenId::Search => println!("type 'search <text>' to look up a church"),
            ScreenId::Form => {
                println!("church: {}", state.entity);
                println!("fields: {}", DONATION_FIELDS.join(", "));
            }
            ScreenId::Review => println!("church: {}", state.entity),
            ScreenId::Confirmation => {
                println!("Your donation to {} has been received.", state.entity)
            }
        }
    }

    fn deactivate_screen(&self, _screen: ScreenId) {}

    fn show_results(&self, entries: &[DirectoryEntry]) {
        let mut state = self.state();
        state.results = entries.to_vec();
        for (i, entry) in entries.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, entry.name, entry.code);
        }
    }

    fn hide_results(&self) {
        self.state().results.clear();
    }

    fn set_field_text(&self, slot: TextSlot, text: &str) {
        let mut state = self.state();
        match slot {
            TextSlot::SearchInput => state.search_input = text.to_string(),
            TextSlot::FormEntity | TextSlot::ReceiptEntity | TextSlot::ThankYouEntity => {
                state.entity = text.to_string()
            }
        }
    }

    fn render_receipt(&self, summary: &ReceiptSummary) {
        if summary.has_no_entries() {
            println!("  (no donations entered)");
        }
        for row in summary.all_rows() {
            println!("  {:<28}{:>16}", row.label, row.formatted_amount());
        }
        println!("fields: {}", RECEIPT_FIELDS.join(", "));
    }

    fn highlight_invalid_fields(&self, keys: &[String]) {
        if !keys.is_empty() {
            println!("! not a valid amount: {}", keys.join(", "));
        }
    }

    fn set_submit_loading(&self, loading: bool) {
        if loading {
            println!("submitting...");
        }
    }

    fn set_expandable(&self, expanded: bool) {
        if expanded {
            println!("[-] {EXPANDED_INFO}");
        } else {
            println!("[+] more info");
        }
    }

    fn alert(&self, message: &str) {
        println!("! {message}");
    }

    fn read_donation_form(&self) -> Vec<FormField> {
        self.state().donation_form.clone()
    }

    fn read_receipt_form(&self) -> Vec<FormField> {
        self.state().receipt_form.clone()
    }

    fn reset_forms(&self) {
        let mut state = self.state();
        state.donation_form = blank_form(&DONATION_FIELDS);
        state.receipt_form = blank_form(&RECEIPT_FIELDS);
    }
}

#[cfg(test)]
#[path = "tests/console_view_tests.rs"]
mod tests;
