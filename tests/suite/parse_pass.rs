//! End-to-end parse passes: classification, note absorption, ranges, and
//! bucket keys, driven through the public core API.

use std::path::{Path, PathBuf};

use logdiag_core::{DiagnosticAssembler, PatternSet, classify, map_severity};
use logdiag_types::{DiagnosticSeverity, PatternSpec, Position, Severity};

use crate::common::{bare_pattern, colon_pattern, paren_pattern};

fn standard() -> PatternSet {
    PatternSet::compile(&[paren_pattern(), colon_pattern(), bare_pattern()])
}

#[test]
fn first_matching_pattern_wins() {
    let line = "src/utils.js:25:12: warning: unused variable";
    let both = PatternSet::compile(&[paren_pattern(), colon_pattern()]);
    let only = PatternSet::compile(&[colon_pattern()]);

    let info = classify(line, both.patterns()).unwrap();
    assert_eq!(info, classify(line, only.patterns()).unwrap());
    assert_eq!(info.file.as_deref(), Some("src/utils.js"));
    assert_eq!(info.line, Some(25));
    assert_eq!(info.column, Some(12));
    assert_eq!(info.severity.as_deref(), Some("warning"));
    assert_eq!(info.message, "unused variable");
}

#[test]
fn severity_mapping_is_total() {
    let cases = [
        ("", Severity::Error),
        ("  ", Severity::Error),
        ("fatal", Severity::Error),
        ("Fatal Error", Severity::Error),
        ("ERROR", Severity::Error),
        ("whatever", Severity::Error),
        ("w", Severity::Error),
        (" WARN ", Severity::Warning),
        ("information", Severity::Information),
        ("Hint", Severity::Hint),
    ];
    for (token, expected) in cases {
        assert_eq!(map_severity(Some(token)), expected, "token {token:?}");
    }
    assert_eq!(map_severity(None), Severity::Error);
    assert_eq!(map_severity(Some("bogus")), Severity::Error);
    assert_eq!(map_severity(Some("Warning")), Severity::Warning);
    assert_eq!(map_severity(Some("note")), Severity::Note);
}

#[test]
fn note_attaches_to_previous_diagnostic() {
    let patterns = standard();
    let log = Path::new("/logs/build.log");
    let content = "\
src/main.cpp:10:5: error: no matching function
src/main.cpp:4:6: note: candidate declared here
";
    let buckets = DiagnosticAssembler::new(&patterns).assemble_content(content, log);
    let bucket = buckets.get(Path::new("/logs/src/main.cpp")).unwrap();
    assert_eq!(bucket.len(), 1);

    let related = bucket[0].related_information();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].message, "candidate declared here");
    assert_eq!(related[0].location.path, PathBuf::from("/logs/src/main.cpp"));
    assert_eq!(related[0].location.range.start, Position::new(3, 5));
}

#[test]
fn orphan_note_is_dropped() {
    let patterns = standard();
    let buckets = DiagnosticAssembler::new(&patterns).assemble_content(
        "note: nothing to attach to\nwarning: after",
        Path::new("/logs/build.log"),
    );
    assert_eq!(buckets.total_count(), 1);
    let bucket = buckets.get(Path::new("/logs/build.log")).unwrap();
    assert!(bucket[0].related_information().is_empty());
    assert_eq!(bucket[0].severity(), DiagnosticSeverity::Warning);
}

#[test]
fn ranges_default_to_source_line() {
    let patterns = standard();
    let log = Path::new("/logs/build.log");
    let content = "\
error: General build error without location
src/main.cpp:2:10: error: error on line 2";
    let buckets = DiagnosticAssembler::new(&patterns).assemble_content(content, log);

    let own = buckets.get(log).unwrap();
    assert_eq!(own[0].range().start, Position::new(0, 0));

    let main = buckets.get(Path::new("/logs/src/main.cpp")).unwrap();
    assert_eq!(main[0].range().start, Position::new(1, 9));
}

#[test]
fn malformed_pattern_is_skipped() {
    let line = "main.cpp:10:5: error: test error";
    let broken = PatternSpec::new("[invalid(", Default::default()).unwrap();
    let with_broken = PatternSet::compile(&[broken, colon_pattern()]);
    let valid_only = PatternSet::compile(&[colon_pattern()]);

    assert_eq!(with_broken.len(), 1);
    assert_eq!(
        classify(line, with_broken.patterns()),
        classify(line, valid_only.patterns())
    );
}

#[test]
fn missing_file_group_keys_by_log_path() {
    let patterns = standard();
    let log = Path::new("/logs/build.log");
    let content = "step 1\nstep 2\nstep 3\nerror: link failed";
    let buckets = DiagnosticAssembler::new(&patterns).assemble_content(content, log);

    assert_eq!(buckets.paths().collect::<Vec<_>>(), vec![log]);
    assert_eq!(
        buckets.get(log).unwrap()[0].range().start,
        Position::new(3, 0)
    );
}

#[test]
fn paren_pattern_carries_code() {
    let patterns = standard();
    let buckets = DiagnosticAssembler::new(&patterns).assemble_content(
        r"C:\proj\main.cpp(12,3): error C2065: 'x': undeclared identifier",
        Path::new("/logs/build.log"),
    );
    let (_, diagnostics) = buckets.iter().next().unwrap();
    assert_eq!(diagnostics[0].code(), Some("C2065"));
    assert_eq!(diagnostics[0].message(), "'x': undeclared identifier");
    assert_eq!(diagnostics[0].range().start, Position::new(11, 2));
}

#[test]
fn display_includes_related_notes() {
    let patterns = standard();
    let log = Path::new("/logs/build.log");
    let buckets = DiagnosticAssembler::new(&patterns).assemble_content(
        "a.c:1:2: error: bad\na.c:3:4: note: here",
        log,
    );
    let path = Path::new("/logs/a.c");
    let rendered = buckets.get(path).unwrap()[0].display_with_path(path);
    assert!(rendered.starts_with("/logs/a.c:1:2: error: [Build Log] bad"));
    assert!(rendered.contains("\n    /logs/a.c:3:4: note: here"));
}
