//! Build tag mapping integration tests
//!
//! Drives the full pipeline: sanitize, load, extract directives and map
//! identifiers, over in-memory and on-disk packages.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use buildtags::{
    BuildContext, BuildTagError, Corpus, GoParser, MapFileSystem, OsFileSystem, SourceParser,
    SyntaxTree,
};
use pretty_assertions::assert_eq;

const BAR_GO: &str = r#"// Package bar is an example.
package bar

var WunderBar = "Cocktails"

type TrinkBar interface {
	Cheers()
}

"#;

const XTAG1_GO: &str = r#"
// +build xtag1

package bar

// First function is first.
func First() {
}

// unexported function is third.
func unexported() {
}

type A struct {}

func (a A) String() string { return "" }
"#;

const XTAG2_GO: &str = r#"
// +build xtag2 xtag3

package bar

func NewCheersWithBeer() TrinkBar { return nil }

const TestConst = true
"#;

fn bar_fs() -> MapFileSystem {
    [
        ("src/bar.go", BAR_GO),
        ("src/xtag1.go", XTAG1_GO),
        ("src/xtag2.go", XTAG2_GO),
    ]
    .into_iter()
    .collect()
}

fn xtags() -> BuildContext {
    BuildContext::new(["xtag1", "xtag2", "xtag3"])
}

fn expected(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Parser that counts how often it is invoked
struct CountingParser {
    calls: AtomicUsize,
}

impl SourceParser for CountingParser {
    fn parse(&self, path: &str, src: &[u8]) -> buildtags::Result<SyntaxTree> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        GoParser::new().parse(path, src)
    }
}

// =============================================================================
// End-to-end mapping
// =============================================================================

mod mapping_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_maps_identifiers_of_tagged_files() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus
            .parse_files("", "/src", &["bar.go", "xtag1.go", "xtag2.go"])
            .unwrap();

        let tags = corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap();

        assert_eq!(tags.get("First"), Some("xtag1"));
        assert_eq!(tags.get("unexported"), Some("xtag1"));
        assert_eq!(tags.get("A.String"), Some("xtag1"));
        assert_eq!(tags.get("NewCheersWithBeer"), Some("xtag2, xtag3"));
        assert_eq!(tags.get("TestConst"), Some("xtag2, xtag3"));

        assert_eq!(
            tags.into_inner(),
            expected(&[
                ("A", "xtag1"),
                ("A.String", "xtag1"),
                ("First", "xtag1"),
                ("NewCheersWithBeer", "xtag2, xtag3"),
                ("TestConst", "xtag2, xtag3"),
                ("unexported", "xtag1"),
            ])
        );
    }

    #[test]
    fn test_untagged_identifiers_are_absent() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus
            .parse_files("", "/src", &["bar.go", "xtag1.go", "xtag2.go"])
            .unwrap();
        let tags = corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap();

        assert_eq!(tags.get("WunderBar"), None);
        assert_eq!(tags.get("TrinkBar"), None);
    }

    #[test]
    fn test_no_directives_yields_empty_map() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus.parse_files("", "/src", &["bar.go"]).unwrap();

        let tags = corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_inactive_tags_are_ignored() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus
            .parse_files("", "/src", &["bar.go", "xtag1.go", "xtag2.go"])
            .unwrap();

        let tags = corpus
            .map_identifiers_to_tags(&files, "", "/src", &BuildContext::new(["xtag3"]))
            .unwrap();

        assert_eq!(
            tags.into_inner(),
            expected(&[("NewCheersWithBeer", "xtag3"), ("TestConst", "xtag3")])
        );
    }

    #[test]
    fn test_empty_build_context_yields_empty_map() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus
            .parse_files("", "/src", &["xtag1.go", "xtag2.go"])
            .unwrap();

        let tags = corpus
            .map_identifiers_to_tags(&files, "", "/src", &BuildContext::default())
            .unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus
            .parse_files("", "/src", &["bar.go", "xtag1.go", "xtag2.go"])
            .unwrap();

        let first = corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap();
        let second = corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap();

        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_each_tag_group_is_parsed_again() {
        let parser = Arc::new(CountingParser {
            calls: AtomicUsize::new(0),
        });
        let corpus = Corpus::with_parser(Arc::new(bar_fs()), parser.clone());
        let files = corpus
            .parse_files("", "/src", &["bar.go", "xtag1.go", "xtag2.go"])
            .unwrap();
        assert_eq!(parser.calls.load(Ordering::SeqCst), 3);

        corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap();

        // xtag1 -> xtag1.go, xtag2 -> xtag2.go, xtag3 -> xtag2.go
        assert_eq!(parser.calls.load(Ordering::SeqCst), 6);
    }
}

// =============================================================================
// Keys and tag accumulation
// =============================================================================

mod key_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(files: &[(&str, &str)], ctx: &BuildContext) -> BTreeMap<String, String> {
        let fs: MapFileSystem = files
            .iter()
            .map(|(name, src)| (format!("/pkg/{}", name), *src))
            .collect();
        let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();

        let corpus = Corpus::new(Arc::new(fs));
        let parsed = corpus.parse_files("", "/pkg", &names).unwrap();
        corpus
            .map_identifiers_to_tags(&parsed, "", "/pkg", ctx)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_method_and_function_with_same_name_are_distinct() {
        let tags = map(
            &[
                (
                    "a.go",
                    "// +build t1\n\npackage p\n\ntype A int\n\nfunc (a A) Close() {}\n",
                ),
                ("b.go", "// +build t2\n\npackage p\n\nfunc Close() {}\n"),
            ],
            &BuildContext::new(["t1", "t2"]),
        );

        assert_eq!(
            tags,
            expected(&[("A", "t1"), ("A.Close", "t1"), ("Close", "t2")])
        );
    }

    #[test]
    fn test_pointer_receiver_keeps_star() {
        let tags = map(
            &[(
                "a.go",
                "// +build t1\n\npackage p\n\ntype A int\n\nfunc (a *A) Reset() {}\n",
            )],
            &BuildContext::new(["t1"]),
        );
        assert_eq!(tags.get("*A.Reset").map(String::as_str), Some("t1"));
    }

    #[test]
    fn test_unrenderable_receiver_falls_back_to_bare_name() {
        let tags = map(
            &[(
                "a.go",
                "// +build t1\n\npackage p\n\nfunc (m map[string]int) Size() int { return len(m) }\n",
            )],
            &BuildContext::new(["t1"]),
        );
        assert_eq!(tags, expected(&[("Size", "t1")]));
    }

    #[test]
    fn test_multi_name_value_declarations() {
        let tags = map(
            &[(
                "a.go",
                "// +build t1\n\npackage p\n\nconst X, Y = 1, 2\n\nvar (\n\tu, v int\n)\n",
            )],
            &BuildContext::new(["t1"]),
        );
        assert_eq!(
            tags,
            expected(&[("X", "t1"), ("Y", "t1"), ("u", "t1"), ("v", "t1")])
        );
    }

    #[test]
    fn test_identifier_under_two_tags_via_two_files() {
        let tags = map(
            &[
                ("linux.go", "// +build tb\n\npackage p\n\nfunc Open() {}\n"),
                ("darwin.go", "// +build ta\n\npackage p\n\nfunc Open() {}\n"),
            ],
            &BuildContext::new(["tb", "ta"]),
        );
        assert_eq!(tags, expected(&[("Open", "ta, tb")]));
    }

    #[test]
    fn test_tag_recorded_once_across_files_sharing_it() {
        let tags = map(
            &[
                ("a.go", "// +build t1\n\npackage p\n\ntype T int\n\nfunc (T) M() {}\n"),
                ("b.go", "// +build t1\n\npackage p\n\nfunc (T) M() {}\n"),
                ("c.go", "// +build t1\n// +build t1\n\npackage p\n\nfunc (T) M() {}\n"),
            ],
            &BuildContext::new(["t1"]),
        );
        assert_eq!(tags, expected(&[("T", "t1"), ("T.M", "t1")]));
    }

    #[test]
    fn test_line_directives_are_not_read_as_build_directives() {
        let tags = map(
            &[(
                "gen.go",
                "// +build t1\n\npackage p\n//line gen.y:1 +build t2\nfunc Generated() {}\n",
            )],
            &BuildContext::new(["t1", "t2"]),
        );
        assert_eq!(tags, expected(&[("Generated", "t1")]));
    }

    #[test]
    fn test_tab_separated_directive_is_read_as_comma_list() {
        let tags = map(
            &[
                ("a.go", "//\t+build\tt1\n\npackage p\n\nfunc A() {}\n"),
                ("b.go", "//\t+build\tt1,t2\n\npackage p\n\nfunc B() {}\n"),
            ],
            &BuildContext::new(["t1", "t2"]),
        );
        assert_eq!(tags, expected(&[("B", "t2")]));
    }
}

// =============================================================================
// Failure propagation
// =============================================================================

mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_group_file_aborts_with_context() {
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let mut files = corpus
            .parse_files("", "/src", &["bar.go", "xtag1.go"])
            .unwrap();
        // Parsed elsewhere but absent from this filesystem
        let ghost = corpus.parse_files("", "/src", &["xtag2.go"]).unwrap();
        files.insert(
            "ghost.go".to_string(),
            ghost.into_values().next().unwrap(),
        );

        let err = corpus
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap_err();

        match &err {
            BuildTagError::TagGroup {
                tag,
                abs_path,
                files,
                ..
            } => {
                assert_eq!(tag, "xtag2");
                assert_eq!(abs_path, "/src");
                assert_eq!(files, &vec!["ghost.go".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some("/src/ghost.go"));
        assert!(err.to_string().contains(r#"with files: ["ghost.go"]"#));
    }

    #[test]
    fn test_unparseable_group_file_aborts() {
        let mut fs = bar_fs();
        let corpus_before = Corpus::new(Arc::new(fs.clone()));
        let files = corpus_before
            .parse_files("", "/src", &["bar.go", "xtag1.go"])
            .unwrap();

        fs.insert("src/xtag1.go", "// +build xtag1\n\npackage bar\n\nfunc {\n");
        let corpus_after = Corpus::new(Arc::new(fs));

        let err = corpus_after
            .map_identifiers_to_tags(&files, "", "/src", &xtags())
            .unwrap_err();
        assert!(matches!(err, BuildTagError::TagGroup { .. }));
        assert!(!err.is_not_found());
        assert_eq!(err.path(), Some("/src/xtag1.go"));
    }
}

// =============================================================================
// On-disk packages
// =============================================================================

mod os_fs_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_maps_package_on_disk_with_relative_keys() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("src/bar");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("bar.go"), BAR_GO).unwrap();
        std::fs::write(pkg.join("xtag1.go"), XTAG1_GO).unwrap();
        std::fs::write(pkg.join("xtag2.go"), XTAG2_GO).unwrap();

        let corpus = Corpus::new(Arc::new(OsFileSystem::new(dir.path())));
        let files = corpus
            .parse_files("bar", "/src/bar", &["bar.go", "xtag1.go", "xtag2.go"])
            .unwrap();
        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(keys, ["bar/bar.go", "bar/xtag1.go", "bar/xtag2.go"]);

        let tags = corpus
            .map_identifiers_to_tags(&files, "bar", "/src/bar", &xtags())
            .unwrap();
        assert_eq!(tags.get("A.String"), Some("xtag1"));
        assert_eq!(tags.get("TestConst"), Some("xtag2, xtag3"));
    }

    #[test]
    fn test_build_context_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.json");
        std::fs::write(&path, r#"{ "build_tags": ["xtag2"] }"#).unwrap();

        let ctx = BuildContext::load(&path).unwrap();
        let corpus = Corpus::new(Arc::new(bar_fs()));
        let files = corpus
            .parse_files("", "/src", &["xtag1.go", "xtag2.go"])
            .unwrap();

        let tags = corpus
            .map_identifiers_to_tags(&files, "", "/src", &ctx)
            .unwrap();
        assert_eq!(
            tags.into_inner(),
            expected(&[("NewCheersWithBeer", "xtag2"), ("TestConst", "xtag2")])
        );
    }
}
