use edit_engine::{Action, Buffer, Region, RegionSet, UndoStack};
use pretty_assertions::assert_eq;

const SAMPLE: &str = "Hello World!\nTest123123\nAbrakadabra\n";

fn points(set: &RegionSet) -> Vec<usize> {
    set.iter().map(|r| r.b).collect()
}

#[test]
fn test_backspace_at_multiple_cursors() {
    let mut buffer = Buffer::from_text(SAMPLE);
    let cursors = RegionSet::from_iter([Region::point(11), Region::point(16), Region::point(30)])
        .attach(&mut buffer);

    let mut seen = Vec::new();
    for i in 0..3 {
        let cursor = cursors.borrow().get(i).unwrap();
        buffer.erase(cursor.b - 1, 1);
        seen.push(points(&cursors.borrow()));
    }

    assert_eq!(
        seen,
        vec![vec![10, 15, 29], vec![10, 14, 28], vec![10, 14, 27]]
    );
    assert_eq!(buffer.to_string(), "Hello Worl!\nTet123123\nAbrakdabra\n");
}

#[test]
fn test_backspace_is_one_undo_step() {
    let mut buffer = Buffer::from_text(SAMPLE);
    let cursors = RegionSet::from_iter([Region::point(11), Region::point(16), Region::point(30)])
        .attach(&mut buffer);
    let mut history = UndoStack::new();

    history.set_mark();
    for i in 0..3 {
        let cursor = cursors.borrow().get(i).unwrap();
        let mut action = Action::erase(Region::new(cursor.b - 1, cursor.b));
        action.apply(&mut buffer);
        history.add(action, true);
    }
    history.glue_from_mark();
    assert_eq!(history.position(), 1);
    assert_eq!(buffer.to_string(), "Hello Worl!\nTet123123\nAbrakdabra\n");

    history.undo(&mut buffer, true);
    assert_eq!(buffer.to_string(), SAMPLE);
    assert_eq!(points(&cursors.borrow()), vec![11, 16, 30]);

    history.redo(&mut buffer, true);
    assert_eq!(points(&cursors.borrow()), vec![10, 14, 27]);
}

#[test]
fn test_selection_collapses_when_its_text_is_erased() {
    let mut buffer = Buffer::from_text(SAMPLE);
    let selections =
        RegionSet::from_iter([Region::new(6, 11), Region::new(30, 26)]).attach(&mut buffer);

    // Erase "World!\nTest" across the first selection.
    buffer.erase(6, 11);
    assert_eq!(
        selections.borrow().regions(),
        &[Region::point(6), Region::new(19, 15)]
    );
}

#[test]
fn test_erasing_to_the_end_clamps_regions() {
    let mut buffer = Buffer::from_text(SAMPLE);
    let set = RegionSet::from_iter([Region::new(20, 36), Region::point(33)]).attach(&mut buffer);
    buffer.erase(10, 100);
    assert_eq!(set.borrow().regions(), &[Region::point(10)]);
    assert_eq!(buffer.size(), 10);
}

#[test]
fn test_insertion_at_a_caret_pushes_it() {
    let mut buffer = Buffer::from_text("ab");
    let set = RegionSet::from_iter([Region::point(1), Region::new(0, 1)]).attach(&mut buffer);
    // Region (0, 1) and the caret at 1 touch, so they were merged on construction.
    assert_eq!(set.borrow().regions(), &[Region::new(0, 1)]);
    buffer.insert(1, "xyz");
    assert_eq!(set.borrow().regions(), &[Region::new(0, 4)]);
}

#[test]
fn test_several_sets_observe_one_buffer() {
    let mut buffer = Buffer::from_text(SAMPLE);
    let carets = RegionSet::from_iter([Region::point(13)]).attach(&mut buffer);
    let marks = RegionSet::from_iter([Region::new(24, 35)]).attach(&mut buffer);
    assert_eq!(buffer.subscriber_count(), 2);

    buffer.insert(0, ">> ");
    assert_eq!(carets.borrow().regions(), &[Region::point(16)]);
    assert_eq!(marks.borrow().regions(), &[Region::new(27, 38)]);

    drop(carets);
    buffer.erase(0, 3);
    assert_eq!(marks.borrow().regions(), &[Region::new(24, 35)]);
}
