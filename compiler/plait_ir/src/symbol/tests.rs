use super::*;

#[test]
fn test_symbol_layout() {
    let sym = Symbol::new(5, 1000, "x");
    assert_eq!(sym.shard(), 5);
    assert_eq!(sym.local(), 1000);
}

#[test]
fn test_symbol_identity_ignores_text_pointer() {
    let a = Symbol::new(0, 1, "a");
    let b = Symbol::new(0, 1, "a");
    let c = Symbol::new(0, 2, "c");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a < c);
}

#[test]
fn test_symbol_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(Symbol::new(0, 1, "a"));
    set.insert(Symbol::new(0, 1, "a"));
    set.insert(Symbol::new(3, 1, "b"));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_symbol_display_and_lead() {
    let sym = Symbol::new(1, 7, "^args");
    assert_eq!(sym.to_string(), "^args");
    assert_eq!(sym.lead(), Some('^'));
    assert_eq!(Symbol::new(0, 0, "").lead(), None);
}
