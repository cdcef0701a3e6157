use std::fs;
use std::path::Path;

use blogfolio::content::{ContentError, Post};
use blogfolio::filter::{self, FilterCriteria};
use blogfolio::Blog;

const DATA_FILE: &str = r#"
- id: "1"
  title: Building Scalable REST APIs
  excerpt: Design patterns for APIs that grow
  content: |
    # Building Scalable REST APIs

    Use **pagination** everywhere.
  category: API
  tags: [x, REST]
  date: "2024-01-15"
  readTime: 8 min read
- id: "2"
  title: Index Tuning
  excerpt: Make queries fast
  content: "Some text"
  category: Database
  tags: [y]
  date: "2024-01-10"
  readTime: 5 min read
"#;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("_config.yml"), "title: Test Blog\n");
    write(&dir.path().join("source/_data/posts.yml"), DATA_FILE);
    write(
        &dir.path().join("source/_posts/graphql.md"),
        "---\nid: '3'\ntitle: GraphQL Gateways\ndate: 2024-02-01\ncategory: API\ntags: [y, x]\n---\n\nFederation in practice.\n\n## Setup\n\n1. install\n2. run\n",
    );
    write(
        &dir.path().join("source/_posts/draft.md"),
        "---\ntitle: Unfinished\npublished: false\n---\n\nNot yet.\n",
    );
    write(&dir.path().join("source/images/logo.png"), "png");
    dir
}

fn ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn loads_data_file_and_markdown_newest_first() {
    let dir = site();
    let blog = Blog::new(dir.path()).unwrap();
    let posts = blog.load_posts().unwrap();

    assert_eq!(ids(&posts), vec!["3", "1", "2"]);

    let graphql = &posts[0];
    assert_eq!(graphql.excerpt, "Federation in practice.");
    assert_eq!(graphql.date, "Feb 1, 2024");
    assert_eq!(graphql.tags, vec!["y", "x"]);
    assert!(graphql.read_time.ends_with("min read"));
    assert_eq!(graphql.source, "_posts/graphql.md");

    assert_eq!(posts[1].read_time, "8 min read");
    assert_eq!(posts[1].source, "_data/posts.yml");
}

#[test]
fn duplicate_ids_are_rejected() {
    let dir = site();
    write(
        &dir.path().join("source/_posts/dup.md"),
        "---\nid: '1'\ntitle: Clash\n---\n\nBody\n",
    );

    let blog = Blog::new(dir.path()).unwrap();
    let err = blog.load_posts().unwrap_err();
    match err.downcast_ref::<ContentError>() {
        Some(ContentError::DuplicateId { id, .. }) => assert_eq!(id, "1"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn malformed_data_file_is_reported() {
    let dir = site();
    write(&dir.path().join("source/_data/posts.yml"), "- id: [oops\n");

    let blog = Blog::new(dir.path()).unwrap();
    let err = blog.load_posts().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ContentError>(),
        Some(ContentError::InvalidDataFile { .. })
    ));
}

#[test]
fn filters_loaded_collection() {
    let dir = site();
    let posts = Blog::new(dir.path()).unwrap().load_posts().unwrap();

    let api_x = FilterCriteria::new().with_category("API").with_tag("x");
    assert_eq!(ids(&filter::filter_owned(&posts, &api_x)), vec!["3", "1"]);

    let search = FilterCriteria::new().with_query("scalable");
    assert_eq!(ids(&filter::filter_owned(&posts, &search)), vec!["1"]);

    assert_eq!(filter::distinct_categories(&posts), vec!["API", "Database"]);
    assert_eq!(filter::distinct_tags(&posts), vec!["y", "x", "REST"]);
}

#[test]
fn generates_static_site() {
    let dir = site();
    let blog = Blog::new(dir.path()).unwrap();
    blog.generate().unwrap();

    let public = dir.path().join("public");
    for page in [
        "index.html",
        "about/index.html",
        "404.html",
        "assets/style.css",
        "posts.json",
        "posts/1/index.html",
        "posts/3/index.html",
        "filter/api/all/index.html",
        "filter/all/x/index.html",
        "filter/database/y/index.html",
        "images/logo.png",
    ] {
        assert!(public.join(page).is_file(), "missing {}", page);
    }
    assert!(!public.join("_posts").exists());
    assert!(!public.join("_data").exists());

    let post = fs::read_to_string(public.join("posts/1/index.html")).unwrap();
    assert!(post.contains("<h1>Building Scalable REST APIs</h1>"));
    assert!(post.contains("<strong>pagination</strong>"));

    let graphql = fs::read_to_string(public.join("posts/3/index.html")).unwrap();
    assert!(graphql.contains("<ol>\n<li>install</li>\n<li>run</li>\n</ol>"));

    let api = fs::read_to_string(public.join("filter/api/all/index.html")).unwrap();
    assert!(api.contains("2 articles found"));
    assert!(!api.contains("Index Tuning"));

    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(public.join("posts.json")).unwrap()).unwrap();
    assert_eq!(index.as_array().unwrap().len(), 3);
    assert_eq!(index[1]["readTime"], "8 min read");
    assert_eq!(index[1]["permalink"], "http://example.com/posts/1/");

    blog.clean().unwrap();
    assert!(!public.exists());
}
