use super::*;

#[test]
fn donation_fields_are_set_by_key() {
    let view = ConsoleView::new();

    view.set_donation_field("tithe", "100").expect("known field");

    let form = view.read_donation_form();
    assert_eq!(form.len(), DONATION_FIELDS.len());
    assert_eq!(form[0], FormField::new("tithe", "100"));
}

#[test]
fn unknown_field_lists_known_ones() {
    let view = ConsoleView::new();

    let err = view
        .set_receipt_field("email", "a@b.c")
        .expect_err("unknown field");

    assert!(err.contains("full_name"));
    assert!(err.contains("mpesa_number"));
    assert!(view.read_receipt_form().iter().all(FormField::is_blank));
}

#[test]
fn setting_a_field_twice_keeps_the_last_value() {
    let view = ConsoleView::new();

    view.set_donation_field("building_fund", "10").expect("known field");
    view.set_donation_field("building_fund", "25").expect("known field");

    let form = view.read_donation_form();
    let field = form
        .iter()
        .find(|field| field.key == "building_fund")
        .expect("building_fund field");
    assert_eq!(field.value, "25");
}

#[test]
fn results_are_addressed_from_one() {
    let view = ConsoleView::new();
    view.show_results(&[
        DirectoryEntry::new("Thika Road Chapel", "TRC008"),
        DirectoryEntry::new("Kiambu Town Church", "KTC010"),
    ]);

    assert_eq!(view.result_at(0), None);
    assert_eq!(
        view.result_at(2).map(|entry| entry.code),
        Some("KTC010".to_string())
    );

    view.hide_results();
    assert_eq!(view.result_at(1), None);
}

#[test]
fn reset_blanks_both_forms() {
    let view = ConsoleView::new();
    view.set_donation_field("offering", "20").expect("field");
    view.set_receipt_field("full_name", "Jane").expect("field");

    view.reset_forms();

    assert!(view.read_donation_form().iter().all(FormField::is_blank));
    assert!(view.read_receipt_form().iter().all(FormField::is_blank));
}
