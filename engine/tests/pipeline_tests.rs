use engine::index::{leading_term, PostingLine};
use engine::offset::{read_postings_at, OffsetTable};
use engine::persist::IndexPaths;
use engine::pipeline::{build_index, BuildOptions, BuildReport};
use engine::{DocId, DocumentCatalog, Posting, QueryEngine};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write_record(dir: &Path, name: &str, url: &str, html: &str) {
    fs::create_dir_all(dir).unwrap();
    let json = serde_json::json!({ "url": url, "content": html });
    fs::write(dir.join(name), json.to_string()).unwrap();
}

fn build(corpus: &Path, output: &Path, batch_size: usize) -> BuildReport {
    let opts = BuildOptions { input: corpus.to_path_buf(), output: output.to_path_buf(), batch_size, clean: false };
    build_index(&opts).unwrap()
}

fn read_lines(path: &Path) -> Vec<PostingLine> {
    fs::read_to_string(path).unwrap().lines().map(|l| PostingLine::parse(l).unwrap()).collect()
}

/// Three pages: A has "ant" in its title, B has it three times in the body, C has neither.
fn ant_corpus() -> (TempDir, IndexPaths) {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    write_record(&corpus.join("site_a"), "a.json", "https://a.example/", "<html><head><title>Ant</title></head><body><p>colony</p></body></html>");
    write_record(&corpus.join("site_b"), "b.json", "https://b.example/", "<html><body><p>ant ant ant colony</p></body></html>");
    write_record(&corpus.join("site_c"), "c.json", "https://c.example/", "<html><body><p>bee hive</p></body></html>");
    let paths = IndexPaths::new(dir.path().join("out"));
    build(&corpus, &paths.root, 10);
    (dir, paths)
}

#[test]
fn title_page_ranks_above_body_page() {
    let (_dir, paths) = ant_corpus();
    let engine = QueryEngine::open(&paths).unwrap();
    let hits = engine.search("ant", 10).unwrap();
    let urls: Vec<&str> = hits.iter().map(|h| engine.catalog().url(h.doc_id).unwrap()).collect();
    assert_eq!(urls, vec!["https://a.example/", "https://b.example/"]);
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn unindexed_query_returns_no_results() {
    let (_dir, paths) = ant_corpus();
    let engine = QueryEngine::open(&paths).unwrap();
    assert!(engine.search("zebra", 5).unwrap().is_empty());
    assert!(engine.search("", 5).unwrap().is_empty());
    assert!(engine.search("!!! ???", 5).unwrap().is_empty());
}

#[test]
fn catalog_lists_docids_in_walk_order() {
    let (_dir, paths) = ant_corpus();
    let text = fs::read_to_string(paths.catalog()).unwrap();
    let urls: Vec<&str> = text.lines().map(|l| l.splitn(3, ' ').nth(2).unwrap()).collect();
    assert_eq!(urls, vec!["https://a.example/", "https://b.example/", "https://c.example/"]);
    assert!(text.starts_with("1 "));
}

#[test]
fn duplicate_urls_receive_one_docid() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    write_record(&corpus, "1.json", "https://a.example/page#intro", "<p>ant</p>");
    write_record(&corpus, "2.json", "https://a.example/page#outro", "<p>zebra</p>");
    write_record(&corpus, "3.json", "https://b.example/", "<p>bee</p>");
    let paths = IndexPaths::new(dir.path().join("out"));
    let report = build(&corpus, &paths.root, 10);
    assert_eq!(report.documents, 2);
    assert_eq!(report.duplicates, 1);

    let catalog = DocumentCatalog::load(&paths.catalog()).unwrap();
    assert_eq!(catalog.url(1), Some("https://a.example/page"));
    assert_eq!(catalog.url(2), Some("https://b.example/"));
    let terms: Vec<String> = read_lines(&paths.index()).into_iter().map(|l| l.term).collect();
    assert!(!terms.contains(&"zebra".to_string()));
}

#[test]
fn urls_are_deduplicated_by_exact_string() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    write_record(&corpus, "1.json", "https://a.example", "<p>ant</p>");
    write_record(&corpus, "2.json", "https://a.example/", "<p>ant</p>");
    write_record(&corpus, "3.json", "/relative/page.html", "<p>bee</p>");
    let paths = IndexPaths::new(dir.path().join("out"));
    let report = build(&corpus, &paths.root, 10);
    assert_eq!(report.documents, 3);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.malformed, 0);

    let catalog = DocumentCatalog::load(&paths.catalog()).unwrap();
    assert_eq!(catalog.url(1), Some("https://a.example"));
    assert_eq!(catalog.url(2), Some("https://a.example/"));
    assert_eq!(catalog.url(3), Some("/relative/page.html"));
}

#[test]
fn url_with_newline_cannot_forge_catalog_lines() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    write_record(&corpus, "1.json", "https://a.example/\n99 1 https://forged.example/", "<p>ant</p>");
    write_record(&corpus, "2.json", "https://b.example/", "<p>bee</p>");
    let paths = IndexPaths::new(dir.path().join("out"));
    let report = build(&corpus, &paths.root, 10);
    assert_eq!(report.documents, 1);
    assert_eq!(report.malformed, 1);

    let catalog = DocumentCatalog::load(&paths.catalog()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.url(1), Some("https://b.example/"));
    assert_eq!(catalog.url(99), None);
}

#[test]
fn malformed_records_do_not_abort_the_build() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    write_record(&corpus, "1.json", "https://a.example/", "<p>ant</p>");
    fs::write(corpus.join("2.json"), "<html>not json</html>").unwrap();
    fs::write(corpus.join("3.json"), r#"{"content": "<p>no url</p>"}"#).unwrap();
    let report = build(&corpus, &dir.path().join("out"), 10);
    assert_eq!(report.documents, 1);
    assert_eq!(report.malformed, 2);
}

fn mixed_corpus(dir: &Path) -> std::path::PathBuf {
    let corpus = dir.join("DEV");
    let pages = [
        "<title>Rust systems</title><p>memory safety without garbage collection</p>",
        "<h1>Garbage collection</h1><p>tracing collectors and memory</p>",
        "<p>systems programming in <b>rust</b> and c</p>",
        "<h2>Memory</h2><h3>safety</h3><p>rust borrow checker</p>",
        "<p>collection types: vec, map, set</p>",
        "<strong>programming</strong> languages <p>rust python c</p>",
        "<p>memory memory memory</p>",
    ];
    for (i, page) in pages.iter().enumerate() {
        write_record(&corpus, &format!("{i:03}.json"), &format!("https://p{i}.example/"), page);
    }
    corpus
}

#[test]
fn rebuilding_is_byte_identical() {
    let dir = tempdir().unwrap();
    let corpus = mixed_corpus(dir.path());
    let first = IndexPaths::new(dir.path().join("first"));
    let second = IndexPaths::new(dir.path().join("second"));
    build(&corpus, &first.root, 2);
    build(&corpus, &second.root, 2);
    for (a, b) in [(first.index(), second.index()), (first.offsets(), second.offsets()), (first.catalog(), second.catalog())] {
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap(), "{} differs", a.display());
    }
    // a rebuild into the same directory discards stale chunks
    build(&corpus, &first.root, 3);
    assert_eq!(fs::read(first.index()).unwrap(), fs::read(second.index()).unwrap());
    assert_eq!(fs::read_dir(first.chunks_dir()).unwrap().count(), 3);
}

#[test]
fn chunks_hold_disjoint_increasing_docid_ranges() {
    let dir = tempdir().unwrap();
    let corpus = mixed_corpus(dir.path());
    let paths = IndexPaths::new(dir.path().join("out"));
    let report = build(&corpus, &paths.root, 2);
    assert_eq!(report.chunks, 4);

    let mut previous_max: DocId = 0;
    for seq in 1..=report.chunks {
        let lines = read_lines(&paths.chunk(seq));
        let ids: Vec<DocId> = lines.iter().flat_map(|l| l.postings.iter().map(|p| p.doc_id)).collect();
        let min = *ids.iter().min().unwrap();
        let max = *ids.iter().max().unwrap();
        assert!(min > previous_max);
        previous_max = max;
        let terms: Vec<&str> = lines.iter().map(|l| l.term.as_str()).collect();
        assert!(terms.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn compacted_index_is_the_union_of_chunk_postings() {
    let dir = tempdir().unwrap();
    let corpus = mixed_corpus(dir.path());
    let paths = IndexPaths::new(dir.path().join("out"));
    let report = build(&corpus, &paths.root, 1);

    let mut expected: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
    for seq in 1..=report.chunks {
        for line in read_lines(&paths.chunk(seq)) {
            expected.entry(line.term).or_default().extend(line.postings);
        }
    }
    for postings in expected.values_mut() {
        postings.sort_by_key(|p| p.doc_id);
    }

    let index = read_lines(&paths.index());
    assert_eq!(index.len() as u64, report.terms);
    let actual: BTreeMap<String, Vec<Posting>> = index.into_iter().map(|l| (l.term, l.postings)).collect();
    assert_eq!(actual, expected);
}

#[test]
fn every_offset_points_at_its_term() {
    let dir = tempdir().unwrap();
    let corpus = mixed_corpus(dir.path());
    let paths = IndexPaths::new(dir.path().join("out"));
    build(&corpus, &paths.root, 3);

    let table = OffsetTable::load(&paths.offsets()).unwrap();
    let index_text = fs::read_to_string(paths.index()).unwrap();
    assert_eq!(table.len(), index_text.lines().count());
    for line in index_text.lines() {
        let term = leading_term(line).unwrap();
        let offset = table.get(term).unwrap();
        let postings = read_postings_at(File::open(paths.index()).unwrap(), offset, term).unwrap();
        assert_eq!(postings, PostingLine::parse(line).unwrap().postings);
    }
}

#[test]
fn top_one_of_five_matches() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    for i in 0..5 {
        let html = if i == 2 { "<title>ant</title><p>nest</p>".to_string() } else { format!("<p>ant nest{i}</p>") };
        write_record(&corpus, &format!("{i}.json"), &format!("https://n{i}.example/"), &html);
    }
    write_record(&corpus, "9.json", "https://other.example/", "<p>bee</p>");
    let paths = IndexPaths::new(dir.path().join("out"));
    build(&corpus, &paths.root, 10);

    let engine = QueryEngine::open(&paths).unwrap();
    assert_eq!(engine.search("ant", 10).unwrap().len(), 5);
    let top = engine.search("ant", 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].doc_id, 3);
}

#[test]
fn term_in_every_document_ties_break_by_docid() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("DEV");
    for i in 0..5 {
        write_record(&corpus, &format!("{i}.json"), &format!("https://t{i}.example/"), "<p>ant</p>");
    }
    let paths = IndexPaths::new(dir.path().join("out"));
    build(&corpus, &paths.root, 10);

    let engine = QueryEngine::open(&paths).unwrap();
    let hits = engine.search("ant", 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, 1);
    // idf is zero, leaving only the plain-text tier boost
    assert!((hits[0].score - 1.0 / 6.0).abs() < 1e-12);
}

#[test]
fn clean_removes_intermediate_files() {
    let dir = tempdir().unwrap();
    let corpus = mixed_corpus(dir.path());
    let paths = IndexPaths::new(dir.path().join("out"));
    let opts = BuildOptions { input: corpus, output: paths.root.clone(), batch_size: 2, clean: true };
    build_index(&opts).unwrap();
    assert!(!paths.merged().exists());
    assert!(!paths.chunks_dir().exists());
    assert!(paths.index().exists() && paths.offsets().exists() && paths.catalog().exists());
}

#[test]
fn missing_corpus_is_an_error() {
    let dir = tempdir().unwrap();
    let opts = BuildOptions { input: dir.path().join("nope"), output: dir.path().join("out"), batch_size: 2, clean: false };
    assert!(build_index(&opts).is_err());
}

#[test]
fn missing_artifacts_fail_to_open() {
    let dir = tempdir().unwrap();
    assert!(QueryEngine::open(&IndexPaths::new(dir.path())).is_err());
}
