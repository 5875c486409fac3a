use super::*;

#[test]
fn push_after_back_discards_forward_entries() {
    let history = InMemoryHistory::new();
    history.push(ScreenId::Form);
    history.push(ScreenId::Review);

    assert_eq!(history.back().as_deref(), Some("#screen2"));
    history.push(ScreenId::Confirmation);

    assert_eq!(
        history.entries(),
        vec![ScreenId::Search, ScreenId::Form, ScreenId::Confirmation]
    );
    assert!(history.forward().is_none());
}

#[test]
fn back_and_forward_stop_at_the_ends() {
    let history = InMemoryHistory::new();
    assert!(history.back().is_none());

    history.push(ScreenId::Form);
    assert_eq!(history.back().as_deref(), Some("#screen1"));
    assert!(history.back().is_none());
    assert_eq!(history.forward().as_deref(), Some("#screen2"));
    assert!(history.forward().is_none());
}

#[test]
fn replace_rewrites_current_entry_only() {
    let history = InMemoryHistory::new();
    history.push(ScreenId::Form);

    history.replace(ScreenId::Review);

    assert_eq!(history.entries(), vec![ScreenId::Search, ScreenId::Review]);
    assert_eq!(history.current(), ScreenId::Review);
}

#[test]
fn reset_leaves_single_entry() {
    let history = InMemoryHistory::new();
    history.push(ScreenId::Form);
    history.push(ScreenId::Review);

    history.reset_to(ScreenId::Search);

    assert_eq!(history.entries(), vec![ScreenId::Search]);
    assert_eq!(history.current_fragment(), "#screen1");
}
