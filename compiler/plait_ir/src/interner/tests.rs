use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let hello = interner.intern("hello");
    let world = interner.intern("world");
    let hello2 = interner.intern("hello");

    assert_eq!(hello, hello2);
    assert_ne!(hello, world);
    assert_eq!(hello.as_str(), "hello");
    assert_eq!(world.as_str(), "world");
}

#[test]
fn test_empty_string_is_first() {
    let interner = StringInterner::new();
    let empty = interner.intern("");
    assert_eq!(empty.shard(), 0);
    assert_eq!(empty.local(), 0);
}

#[test]
fn test_reserved_words_pre_interned() {
    let interner = StringInterner::new();
    let before = interner.len();
    for word in StringInterner::RESERVED {
        assert!(interner.get(word).is_some(), "{word} not pre-interned");
    }
    interner.intern("#args");
    assert_eq!(interner.len(), before);
}

#[test]
fn test_get_does_not_insert() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert!(interner.get("never-seen").is_none());
    assert_eq!(interner.len(), before);
}

#[test]
fn test_shared_interner_across_threads() {
    let interner = SharedInterner::new();
    let other = interner.clone();

    let handle = std::thread::spawn(move || other.intern("shared"));
    let local = interner.intern("shared");
    let remote = match handle.join() {
        Ok(sym) => sym,
        Err(_) => panic!("interning thread panicked"),
    };

    assert_eq!(local, remote);
}
