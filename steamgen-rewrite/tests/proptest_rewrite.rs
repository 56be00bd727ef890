//! Property-based tests for the rewrite pass.
//!
//! These tests verify key invariants:
//! - Idempotency: rewriting an already rewritten file changes nothing
//! - No local import survives, and no body reference keeps its qualifier
//! - Body lines unrelated to removed imports stay byte-identical

use camino::Utf8Path;
use proptest::prelude::*;
use steamgen_rewrite::{RewriteRules, parse_imports, rewrite};

#[derive(Debug, Clone)]
struct GeneratedFile {
    aliases: Vec<String>,
    unrelated: Vec<String>,
    source: String,
}

/// Strategy for a generated file with local imports, qualified references
/// and unrelated body lines.
fn arb_generated_file() -> impl Strategy<Value = GeneratedFile> {
    (
        prop::collection::btree_set(
            prop::string::string_regex(r"m_[a-z]{1,6}").unwrap(),
            1..5,
        ),
        prop::collection::vec(prop::string::string_regex(r"[a-z ]{0,12}").unwrap(), 0..6),
        0u8..4,
    )
        .prop_map(|(aliases, words, descriptors)| {
            let aliases: Vec<String> = aliases.into_iter().collect();
            let mut source = String::from("// Code generated by protoc-gen-go. DO NOT EDIT.\n\npackage protobufs\n\nimport (\n");
            source.push_str("\tproto \"github.com/golang/protobuf/proto\"\n");
            for alias in &aliases {
                source.push_str(&format!("\t{alias} \"Protobufs/steam/{alias}.proto\"\n"));
            }
            source.push_str(")\n\nvar _ = proto.Marshal\n");

            for (i, alias) in aliases.iter().enumerate() {
                source.push_str(&format!("var ref{i} = {alias}.Type{i}{{}}\n"));
            }
            let unrelated: Vec<String> = words
                .iter()
                .enumerate()
                .map(|(i, word)| format!("const note{i} = \"{word}\""))
                .collect();
            for line in &unrelated {
                source.push_str(line);
                source.push('\n');
            }
            for n in 0..descriptors {
                source.push_str(&format!("var fileDescriptor{n} = []byte{{}}\n"));
            }

            GeneratedFile {
                aliases,
                unrelated,
                source,
            }
        })
}

proptest! {
    /// Rewriting a rewritten file is a no-op.
    #[test]
    fn rewrite_is_idempotent(file in arb_generated_file()) {
        let target = Utf8Path::new("protocol/protobuf/steam/sample.pb.go");
        let rules = RewriteRules::default();

        let once = rewrite(&file.source, target, &rules).unwrap();
        let twice = rewrite(&once.text, target, &rules).unwrap();

        prop_assert_eq!(&once.text, &twice.text, "rewrite should be idempotent");
    }

    /// No local import or qualified reference survives.
    #[test]
    fn local_imports_are_fully_removed(file in arb_generated_file()) {
        let target = Utf8Path::new("protocol/protobuf/steam/sample.pb.go");
        let rules = RewriteRules::default();

        let out = rewrite(&file.source, target, &rules).unwrap();
        let section = parse_imports(&out.text).unwrap();

        prop_assert!(section.imports.iter().all(|i| !i.path.contains(".proto")));
        prop_assert_eq!(out.removed_imports.len(), file.aliases.len());
        for alias in &file.aliases {
            let qualified = format!("{alias}.");
            prop_assert!(!out.text.contains(&qualified), "{} survived", qualified);
        }
    }

    /// Body lines that mention no removed import are untouched.
    #[test]
    fn unrelated_lines_are_preserved(file in arb_generated_file()) {
        let target = Utf8Path::new("protocol/protobuf/steam/sample.pb.go");
        let rules = RewriteRules::default();

        let out = rewrite(&file.source, target, &rules).unwrap();

        prop_assert!(out.text.contains("var _ = proto.Marshal\n"));
        for line in &file.unrelated {
            let expected = format!("\n{line}\n");
            prop_assert!(out.text.contains(&expected), "lost line {:?}", line);
        }
    }
}
