//! End-to-end undo/redo behaviour of the editing session.

use noted_buffer::{Tag, TagRegion};
use noted_core::{EditMode, RichEditor};
use proptest::prelude::*;

fn type_keys(editor: &mut RichEditor, keys: &str) {
    for c in keys.chars() {
        editor.type_char(c).unwrap();
    }
}

#[test]
fn test_undo_then_redo_of_insert() {
    let mut editor = RichEditor::new();
    editor.insert(0, "hello world").unwrap();
    editor.insert(6, "big ").unwrap();

    editor.undo().unwrap();
    assert_eq!(editor.text(), "hello world");
    assert_eq!(editor.caret(), 6);

    editor.redo().unwrap();
    assert_eq!(editor.text(), "hello big world");
    assert_eq!(editor.caret(), 10);
}

#[test]
fn test_undo_of_delete_restores_tags() {
    let mut editor = RichEditor::new();
    editor.insert(0, "keep bold text").unwrap();
    editor.apply_tag_range(Tag::Bold, 5..9).unwrap();

    editor.delete(5, 9).unwrap();
    assert_eq!(editor.text(), "keep  text");
    assert!(editor.buffer().regions().is_empty());

    editor.undo().unwrap();
    assert_eq!(editor.text(), "keep bold text");
    assert_eq!(
        editor.buffer().regions(),
        vec![TagRegion::new(Tag::Bold, 5..9)]
    );

    editor.redo().unwrap();
    assert_eq!(editor.text(), "keep  text");
}

#[test]
fn test_undo_of_backspace_keeps_neighbouring_spans_apart() {
    let mut editor = RichEditor::new();
    editor.insert(0, "a b").unwrap();
    editor.apply_tag_range(Tag::Bold, 0..1).unwrap();
    editor.apply_tag_range(Tag::Bold, 2..3).unwrap();
    let before = editor.buffer().regions();

    editor.set_caret(2).unwrap();
    editor.backspace().unwrap();
    assert_eq!(editor.text(), "ab");
    assert_eq!(
        editor.buffer().regions(),
        vec![TagRegion::new(Tag::Bold, 0..2)]
    );

    editor.undo().unwrap();
    assert_eq!(editor.text(), "a b");
    assert_eq!(editor.buffer().regions(), before);
}

#[test]
fn test_undo_of_selection_delete_restores_partial_tags() {
    let mut editor = RichEditor::new();
    editor.insert(0, "ab").unwrap();
    editor.apply_tag_range(Tag::Bold, 0..1).unwrap();

    editor.select(0, 2).unwrap();
    editor.backspace().unwrap();
    assert_eq!(editor.text(), "");

    editor.undo().unwrap();
    assert_eq!(editor.text(), "ab");
    assert_eq!(
        editor.buffer().regions(),
        vec![TagRegion::new(Tag::Bold, 0..1)]
    );
}

#[test]
fn test_word_typed_key_by_key_is_one_step() {
    let mut editor = RichEditor::new();
    type_keys(&mut editor, "cat");
    assert_eq!(editor.undo_depth(), 1);

    editor.undo().unwrap();
    assert_eq!(editor.text(), "");
}

#[test]
fn test_space_after_letter_is_separate_step() {
    let mut editor = RichEditor::new();
    type_keys(&mut editor, "a ");
    assert_eq!(editor.undo_depth(), 2);

    editor.undo().unwrap();
    assert_eq!(editor.text(), "a");
}

#[test]
fn test_non_contiguous_keys_do_not_merge() {
    let mut editor = RichEditor::new();
    type_keys(&mut editor, "ac");
    editor.set_caret(1).unwrap();
    type_keys(&mut editor, "b");
    assert_eq!(editor.text(), "abc");
    assert_eq!(editor.undo_depth(), 2);
}

#[test]
fn test_justification_replaces_sibling_and_undoes_together() {
    let mut editor = RichEditor::new();
    editor.insert(0, "centered line").unwrap();
    editor.apply_justification(Tag::JustLeft).unwrap();
    editor.apply_justification(Tag::JustCenter).unwrap();

    assert!(!editor.buffer().has_tag(Tag::JustLeft, 0..1));
    assert!(editor.buffer().has_tag(Tag::JustCenter, 0..1));

    editor.undo().unwrap();
    assert!(editor.buffer().has_tag(Tag::JustLeft, 0..1));
    assert!(!editor.buffer().has_tag(Tag::JustCenter, 0..1));
}

#[test]
fn test_list_continues_and_reindents() {
    let mut editor = RichEditor::new();
    editor.set_list_mode(true).unwrap();
    assert_eq!(editor.indent_level(), 1);

    type_keys(&mut editor, "item\n");
    assert_eq!(editor.text(), "\n\t- item\n\t- ");

    type_keys(&mut editor, "\t");
    assert_eq!(editor.indent_level(), 2);
    assert_eq!(editor.text(), "\n\t- item\n\t\t- ");
    assert_eq!(editor.caret(), editor.len_chars());

    type_keys(&mut editor, "sub\n");
    assert_eq!(editor.text(), "\n\t- item\n\t\t- sub\n\t\t- ");
}

#[test]
fn test_list_marker_undone_with_line_break() {
    let mut editor = RichEditor::new();
    editor.set_list_mode(true).unwrap();
    type_keys(&mut editor, "one\n");
    let depth = editor.undo_depth();

    editor.undo().unwrap();
    assert_eq!(editor.text(), "\n\t- one");
    assert_eq!(editor.undo_depth(), depth - 1);

    editor.redo().unwrap();
    assert_eq!(editor.text(), "\n\t- one\n\t- ");
}

#[test]
fn test_replay_never_grows_stacks() {
    let mut editor = RichEditor::new();
    editor.set_list_mode(true).unwrap();
    type_keys(&mut editor, "a\n\tb\n");
    editor.apply_tag_range(Tag::Bold, 0..3).unwrap();

    let total = editor.undo_depth();
    let mut seen = 0;
    while editor.can_undo() {
        let (undo_before, redo_before) = (editor.undo_depth(), editor.redo_depth());
        assert!(editor.undo().unwrap());
        assert_eq!(editor.undo_depth(), undo_before - 1);
        assert_eq!(editor.redo_depth(), redo_before + 1);
        assert_eq!(editor.mode(), EditMode::Idle);
        seen += 1;
    }
    assert_eq!(seen, total);
    assert_eq!(editor.text(), "");

    while editor.can_redo() {
        let (undo_before, redo_before) = (editor.undo_depth(), editor.redo_depth());
        assert!(editor.redo().unwrap());
        assert_eq!(editor.undo_depth(), undo_before + 1);
        assert_eq!(editor.redo_depth(), redo_before - 1);
    }
    assert_eq!(editor.undo_depth(), total);
}

#[test]
fn test_empty_stacks_are_no_ops() {
    let mut editor = RichEditor::new();
    editor.insert(0, "untouched").unwrap();
    editor.undo().unwrap();
    editor.redo().unwrap();
    assert!(!editor.redo().unwrap());

    let before = editor.buffer().clone();
    assert_eq!(editor.redo_depth(), 0);
    assert!(!editor.redo().unwrap());
    assert_eq!(editor.buffer(), &before);
    assert_eq!(editor.undo_depth(), 1);

    let mut fresh = RichEditor::new();
    assert!(!fresh.undo().unwrap());
    assert_eq!(fresh.text(), "");
}

#[test]
fn test_serialize_load_round_trip() {
    let mut editor = RichEditor::new();
    type_keys(&mut editor, "Title\nbody text");
    editor.apply_tag_range(Tag::Title, 0..5).unwrap();
    editor.apply_tag_range(Tag::Italic, 6..10).unwrap();
    let blob = editor.serialize().unwrap();

    let mut loaded = RichEditor::new();
    loaded.load(&blob).unwrap();
    assert_eq!(loaded.text(), editor.text());
    assert_eq!(loaded.buffer().regions(), editor.buffer().regions());
}

#[test]
fn test_undo_limit_drops_oldest_steps() {
    let config = noted_core::EditorConfig {
        undo_limit: 2,
        ..Default::default()
    };
    let mut editor = RichEditor::with_config(&config);
    type_keys(&mut editor, "a b c");
    assert_eq!(editor.undo_depth(), 2);

    while editor.undo().unwrap() {}
    assert_eq!(editor.text(), "a b");
}

proptest! {
    #[test]
    fn prop_insert_undo_redo(
        base in "[a-z \n]{0,30}",
        text in "[a-zA-Z0-9 ]{2,10}",
        at in 0usize..=30,
    ) {
        let mut editor = RichEditor::new();
        editor.insert(0, &base).unwrap();
        let offset = at.min(editor.len_chars());

        editor.insert(offset, &text).unwrap();
        let after = editor.text();

        editor.undo().unwrap();
        prop_assert_eq!(editor.text(), base);

        editor.redo().unwrap();
        prop_assert_eq!(editor.text(), after);
    }

    #[test]
    fn prop_undo_delete_restores_regions(
        text in "[a-z ]{1,30}",
        spans in prop::collection::vec((0..Tag::ALL.len(), any::<usize>(), any::<usize>()), 0..6),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let mut editor = RichEditor::new();
        editor.insert(0, &text).unwrap();
        let len = editor.len_chars();
        for (tag, x, y) in spans {
            let (x, y) = (x % (len + 1), y % (len + 1));
            editor.apply_tag_range(Tag::ALL[tag], x.min(y)..x.max(y)).unwrap();
        }
        let before = editor.buffer().regions();

        let start = a % len;
        let end = start + 1 + b % (len - start);
        editor.delete(start, end).unwrap();
        editor.undo().unwrap();

        prop_assert_eq!(editor.text(), text);
        prop_assert_eq!(editor.buffer().regions(), before);
    }

    #[test]
    fn prop_undo_everything_typed(keys in "[a-c \n]{1,40}") {
        let mut editor = RichEditor::new();
        type_keys(&mut editor, &keys);
        while editor.undo().unwrap() {}
        prop_assert_eq!(editor.text(), "");
        while editor.redo().unwrap() {}
        prop_assert_eq!(editor.text(), keys);
    }
}
