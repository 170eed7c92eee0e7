use edit_engine::{Action, Buffer, Region};
use pretty_assertions::assert_eq;

fn check_apply_undo(init: &str, cases: Vec<(Action, &str)>) {
    let mut buffer = Buffer::from_text(init);
    for (i, (mut action, expected)) in cases.into_iter().enumerate() {
        action.apply(&mut buffer);
        assert_eq!(buffer.to_string(), expected, "apply {i}: {action}");
        action.undo(&mut buffer);
        assert_eq!(buffer.to_string(), init, "undo {i}: {action}");
    }
}

#[test]
fn test_apply_and_undo() {
    let buffer = Buffer::from_text("hello world");
    let b = &buffer;
    check_apply_undo(
        "hello world",
        vec![
            (Action::insert(b, 0, "hello"), "hellohello world"),
            (Action::insert(b, 1, "hello"), "hhelloello world"),
            (Action::insert(b, 11, "hello"), "hello worldhello"),
            (Action::insert(b, 12, "hello"), "hello worldhello"),
            (Action::erase(Region::new(0, 0)), "hello world"),
            (Action::erase(Region::new(0, 1)), "ello world"),
            (Action::erase(Region::new(1, 0)), "ello world"),
            (Action::erase(Region::new(0, 3)), "lo world"),
            (Action::erase(Region::new(3, 0)), "lo world"),
            (Action::erase(Region::new(3, 6)), "helworld"),
            (Action::erase(Region::new(12, 12)), "hello world"),
            (Action::replace(b, Region::new(0, 0), "test"), "testhello world"),
            (Action::replace(b, Region::new(0, 1), "H"), "Hello world"),
            (Action::replace(b, Region::new(1, 0), "H"), "Hello world"),
            (Action::replace(b, Region::new(0, 3), "'"), "'lo world"),
            (Action::replace(b, Region::new(3, 0), "'"), "'lo world"),
            (Action::replace(b, Region::new(3, 6), "vetica "), "helvetica world"),
            (Action::replace(b, Region::new(0, 5), "goodbye"), "goodbye world"),
            (Action::replace(b, Region::new(12, 12), "."), "hello world."),
        ],
    );
}

#[test]
fn test_apply_and_undo_multibyte() {
    const INIT: &str = "€þıœəßðĸʒ×ŋµåäö𝄞";
    let buffer = Buffer::from_text(INIT);
    let b = &buffer;
    check_apply_undo(
        INIT,
        vec![
            (Action::insert(b, 0, "𝄞€ŋ"), "𝄞€ŋ€þıœəßðĸʒ×ŋµåäö𝄞"),
            (Action::insert(b, 1, "𝄞€ŋ"), "€𝄞€ŋþıœəßðĸʒ×ŋµåäö𝄞"),
            (Action::insert(b, 10, "𝄞€ŋ"), "€þıœəßðĸʒ×𝄞€ŋŋµåäö𝄞"),
            (Action::erase(Region::new(0, 0)), "€þıœəßðĸʒ×ŋµåäö𝄞"),
            (Action::erase(Region::new(0, 1)), "þıœəßðĸʒ×ŋµåäö𝄞"),
            (Action::erase(Region::new(0, 3)), "œəßðĸʒ×ŋµåäö𝄞"),
            (Action::erase(Region::new(6, 9)), "€þıœəß×ŋµåäö𝄞"),
            (Action::replace(b, Region::new(3, 6), "𝄞öäå"), "€þı𝄞öäåðĸʒ×ŋµåäö𝄞"),
        ],
    );
}

#[test]
fn test_insert_at_end_of_large_buffer() {
    let mut buffer = Buffer::from_text(&"abcdefghijklmnopqrstuvwxyz".repeat(40_000));
    let mut action = Action::insert(&buffer, buffer.size(), "test");
    action.apply(&mut buffer);
    let size = buffer.size();
    assert_eq!(buffer.substr(Region::new(size - 4, size)), "test");
    action.undo(&mut buffer);
    assert_eq!(buffer.size(), 26 * 40_000);
}

#[test]
fn test_erase_reapplied_after_buffer_shrinks() {
    let mut buffer = Buffer::from_text("0123456789");
    let mut action = Action::erase(Region::new(4, 8));
    action.apply(&mut buffer);
    action.undo(&mut buffer);

    // The region is clipped against whatever the buffer holds when applied again.
    buffer.erase(5, 5);
    action.apply(&mut buffer);
    assert_eq!(buffer.to_string(), "0123");
    action.undo(&mut buffer);
    assert_eq!(buffer.to_string(), "01234");
}

#[test]
fn test_nested_composites_undo_in_reverse() {
    let mut buffer = Buffer::from_text("abc");
    let inner = Action::composite(vec![
        Action::insert(&buffer, 3, "d"),
        Action::erase(Region::new(0, 1)),
    ]);
    let mut outer = Action::composite(vec![inner, Action::replace(&buffer, Region::new(0, 1), "X")]);

    outer.apply(&mut buffer);
    assert_eq!(buffer.to_string(), "Xcd");
    outer.undo(&mut buffer);
    assert_eq!(buffer.to_string(), "abc");
}
