//! Property-based tests for the document round-trip guarantees.
//!
//! Built documents use unique section names and keys with the comment layout the parser
//! produces, so writing them reproduces them exactly. Arbitrary text, including repeated
//! sections and keys, must read back equal after one write.

use mini_ini::{Comment, Document, Section, Setting};
use proptest::collection::{btree_map, btree_set, vec};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}"
}

fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.,:/=;-]{0,12}"
}

fn comment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,10}"
}

type SettingParts = (String, Option<String>, usize);
type SectionParts = (Option<String>, usize, Vec<(String, SettingParts)>);

fn setting() -> impl Strategy<Value = SettingParts> {
    (value(), proptest::option::of(comment()), 0usize..3)
}

fn section() -> impl Strategy<Value = SectionParts> {
    (
        proptest::option::of(comment()),
        0usize..3,
        btree_map(name(), setting(), 0..5).prop_map(|m| m.into_iter().collect::<Vec<_>>()),
    )
}

fn document() -> impl Strategy<Value = Document> {
    (
        proptest::option::of(comment()),
        btree_set(name(), 0..5),
        vec(section(), 5),
    )
        .prop_map(|(header, names, sections)| {
            let mut document = Document::new();
            if let Some(text) = header {
                document.push_comment(Comment::new(text));
            }
            for (name, (comment, blank_lines, settings)) in names.into_iter().zip(sections) {
                let mut section = Section::new(name);
                if let Some(text) = comment {
                    section.set_comment(text);
                }
                section.set_blank_lines(blank_lines);
                for (key, (value, comment, blank_lines)) in settings {
                    let mut setting = Setting::new(key, value);
                    // Comments read in front of a setting keep their line break.
                    if let Some(text) = comment {
                        setting.set_comment(format!("{}\n", text));
                    }
                    setting.set_blank_lines(blank_lines);
                    section.insert(setting);
                }
                document.insert(section);
            }
            document
        })
}

fn line() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("[S]"),
        Just("[S] ; again"),
        Just("[T] ; x"),
        Just("k=1"),
        Just("k = 2"),
        Just("j=3"),
        Just("; c"),
        Just(";"),
        Just(""),
    ]
}

fn assert_stable(text: &str) -> Result<(), TestCaseError> {
    let document: Document = text.parse().unwrap();
    let written = document.to_string();
    let reparsed: Document = written.parse().unwrap();
    prop_assert_eq!(&reparsed, &document);
    prop_assert_eq!(reparsed.to_string(), written);
    Ok(())
}

proptest! {
    #[test]
    fn prop_round_trip_is_idempotent(document in document()) {
        let first = document.to_string();
        let parsed: Document = first.parse().unwrap();
        prop_assert_eq!(&parsed, &document);

        let second = parsed.to_string();
        prop_assert_eq!(&second, &first);
        let reparsed: Document = second.parse().unwrap();
        prop_assert_eq!(reparsed, parsed);
    }

    #[test]
    fn prop_parsing_never_fails(text in "[ -~\n\t]{0,200}") {
        let document: Document = text.parse().unwrap();
        let written = document.to_string();
        let reparsed: Document = written.parse().unwrap();
        prop_assert_eq!(reparsed.sections().count(), document.sections().count());
    }

    #[test]
    fn prop_arbitrary_text_round_trips(text in "([;\\[\\]a-c= ]{0,6}\n){0,12}") {
        assert_stable(&text)?;
    }

    #[test]
    fn prop_repeated_keys_round_trip(lines in vec(line(), 0..16)) {
        assert_stable(&lines.join("\n"))?;
    }

    #[test]
    fn prop_assignment_order_matters(
        keys in btree_set(name(), 2..6),
        value in value(),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();

        let mut forward = Document::new();
        for key in &keys {
            forward.set("S", key, value.clone());
        }

        let mut backward = Document::new();
        for key in keys.iter().rev() {
            backward.set("S", key, value.clone());
        }

        prop_assert_ne!(forward, backward);
    }
}
