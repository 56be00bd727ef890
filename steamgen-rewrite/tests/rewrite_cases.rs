//! Behavioural tests for the rewrite pass.

use camino::Utf8Path;
use pretty_assertions::assert_eq;
use steamgen_rewrite::{RewriteError, RewriteRules, rewrite, rewrite_file};
use tempfile::TempDir;

const TWO_LOCALS: &str = r#"// Code generated by protoc-gen-go. DO NOT EDIT.
// source: two_locals.proto

package protobufs

import (
	proto "github.com/golang/protobuf/proto"
	descriptor "google/protobuf/descriptor.proto"
	a "Protobufs/steam/a.proto"
	b "Protobufs/steam/b.proto"
)

var _ = proto.Marshal

type Holder struct {
	First  *a.First
	Second []*b.Second
	Opts   *descriptor.FieldOptions
}

func (h *Holder) Kind() a.Kind {
	return a.Kind_DEFAULT
}

var fileDescriptor0 = []byte{0x00}
"#;

fn rules() -> RewriteRules {
    RewriteRules::default()
}

#[test]
fn local_imports_and_qualifiers_are_removed() {
    let out = rewrite(TWO_LOCALS, Utf8Path::new("out/steam/base.pb.go"), &rules()).expect("rewrite");

    assert!(!out.text.contains(r#"a "Protobufs/steam/a.proto""#));
    assert!(!out.text.contains(r#"b "Protobufs/steam/b.proto""#));
    for qualified in ["a.First", "b.Second", "a.Kind"] {
        assert!(!out.text.contains(qualified), "{qualified} survived");
    }
    assert!(out.text.contains("First  *First\n"));
    assert!(out.text.contains("Second []*Second\n"));
    assert!(out.text.contains("return Kind_DEFAULT\n"));
    assert_eq!(out.removed_imports.len(), 2);
}

#[test]
fn shared_import_is_kept_once_and_repointed() {
    let out = rewrite(TWO_LOCALS, Utf8Path::new("out/steam/base.pb.go"), &rules()).expect("rewrite");

    assert_eq!(
        out.text
            .matches(r#"descriptor "google.golang.org/protobuf/types/descriptorpb""#)
            .count(),
        1
    );
    assert!(!out.text.contains("google/protobuf/descriptor.proto"));
    assert!(out.text.contains("Opts   *descriptor.FieldOptions"));
    assert_eq!(out.shared_imports, 1);
}

#[test]
fn package_follows_target_directory() {
    let out = rewrite(TWO_LOCALS, Utf8Path::new("unified/auth.gen"), &rules()).expect("rewrite");
    assert_eq!(out.package, "unified");
    assert!(out.text.contains("\npackage unified\n"));
    assert!(!out.text.contains("package protobufs"));
}

#[test]
fn file_descriptor_symbols_get_distinct_prefixes() {
    let base = rewrite(TWO_LOCALS, Utf8Path::new("out/steam/base.pb.go"), &rules()).expect("base");
    let auth = rewrite(TWO_LOCALS, Utf8Path::new("out/steam/auth.pb.go"), &rules()).expect("auth");

    assert!(base.text.contains("var base_fileDescriptor0 = "));
    assert!(auth.text.contains("var auth_fileDescriptor0 = "));
    assert!(!base.text.contains(" fileDescriptor0"));
    assert!(!auth.text.contains(" fileDescriptor0"));
    assert_eq!(base.renamed_symbols, 1);
}

#[test]
fn untouched_body_survives_verbatim() {
    let src = "package protobufs\n\nimport fmt \"fmt\"\n\n/* keep\n   me */\nfunc f() {\n\tfmt.Println(\"hi\")   // spacing kept\n}\n";
    let out = rewrite(src, Utf8Path::new("out/tf2/tf.pb.go"), &rules()).expect("rewrite");
    assert_eq!(out.text, src.replace("package protobufs", "package tf2"));
}

#[test]
fn blank_local_import_is_removed_without_touching_body() {
    let src = "package protobufs\n\nimport (\n\t_ \"Protobufs/steam/enums.proto\"\n\t\"sync\"\n)\n\nvar _ = sync.Once{}\n";
    let out = rewrite(src, Utf8Path::new("out/steam/unified/auth.pb.go"), &rules()).expect("rewrite");
    assert_eq!(
        out.text,
        "package unified\n\nimport (\n\t\"sync\"\n)\n\nvar _ = sync.Once{}\n"
    );
}

#[test]
fn rewriting_twice_changes_nothing() {
    let target = Utf8Path::new("out/steam/base.pb.go");
    let once = rewrite(TWO_LOCALS, target, &rules()).expect("once");
    let twice = rewrite(&once.text, target, &rules()).expect("twice");
    assert_eq!(twice.text, once.text);
}

/// Known limitation: qualifier stripping is textual, so an unrelated
/// `a.` inside a string literal is stripped along with real references.
#[test]
fn known_risk_qualifier_strip_reaches_string_literals() {
    let src = "package protobufs\n\nimport a \"Protobufs/steam/a.proto\"\n\nconst note = \"see a.Thing\"\nvar x a.Thing\n";
    let out = rewrite(src, Utf8Path::new("out/steam/base.pb.go"), &rules()).expect("rewrite");
    assert!(out.text.contains("var x Thing\n"));
    assert!(out.text.contains("const note = \"see Thing\"\n"));
}

#[test]
fn custom_rules_are_honoured() {
    let rules = RewriteRules {
        local_marker: ".schema".to_string(),
        symbol_prefix: "fileDesc".to_string(),
        ..RewriteRules::default()
    };
    let src = "package x\n\nimport (\n\tc \"gen/c.schema\"\n\td \"gen/d.proto\"\n)\n\nvar v c.T\nvar w d.T\nvar fileDesc3 = 1\n";
    let out = rewrite(src, Utf8Path::new("pkg/lib/mod.gen"), &rules).expect("rewrite");
    assert_eq!(
        out.text,
        "package lib\n\nimport (\n\td \"gen/d.proto\"\n)\n\nvar v T\nvar w d.T\nvar mod_fileDesc3 = 1\n"
    );
}

#[test]
fn rewrite_file_replaces_target_in_place() {
    let temp = TempDir::new().expect("temp dir");
    let dir = camino::Utf8PathBuf::from_path_buf(temp.path().join("steam")).expect("utf8");
    fs_err::create_dir_all(&dir).expect("mkdir");
    let target = dir.join("base.pb.go");
    fs_err::write(&target, TWO_LOCALS).expect("write");

    rewrite_file(&target, &rules()).expect("rewrite");

    let contents = fs_err::read_to_string(&target).expect("read");
    assert!(contents.contains("\npackage steam\n"));
    assert!(contents.contains("base_fileDescriptor0"));
}

#[test]
fn rewrite_file_reports_missing_file() {
    let temp = TempDir::new().expect("temp dir");
    let target = camino::Utf8PathBuf::from_path_buf(temp.path().join("steam/missing.pb.go"))
        .expect("utf8");
    let err = rewrite_file(&target, &rules()).expect_err("missing");
    assert!(matches!(err, RewriteError::Io { .. }));
    assert!(err.to_string().contains("missing.pb.go"));
}

#[test]
fn unparsable_import_section_names_the_file() {
    let src = "package protobufs\n\nimport (\n\ta Protobufs/steam/a.proto\n)\n";
    let err = rewrite(src, Utf8Path::new("out/steam/broken.pb.go"), &rules()).expect_err("bad");
    assert!(err.is_parse_error());
    let msg = err.to_string();
    assert!(msg.contains("out/steam/broken.pb.go"));
    assert!(msg.contains("line 4"));
}
