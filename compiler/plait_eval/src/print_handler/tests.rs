use super::*;

#[test]
fn test_buffer_captures_lines() {
    let handler = buffer_handler();
    handler.println("[ 1 2 ]");
    handler.println("7");
    assert_eq!(handler.output(), "[ 1 2 ]\n7\n");
    handler.clear();
    assert!(handler.output().is_empty());
}

#[test]
fn test_silent_and_stdout_capture_nothing() {
    let silent = silent_handler();
    silent.println("dropped");
    assert_eq!(silent.output(), "");
    assert_eq!(stdout_handler().output(), "");
}

#[test]
fn test_buffer_shared_across_threads() {
    let handler = buffer_handler();
    let other = Arc::clone(&handler);
    let worker = std::thread::spawn(move || {
        for _ in 0..50 {
            other.println("a");
        }
    });
    for _ in 0..50 {
        handler.println("b");
    }
    assert!(worker.join().is_ok());
    assert_eq!(handler.output().lines().count(), 100);
}
