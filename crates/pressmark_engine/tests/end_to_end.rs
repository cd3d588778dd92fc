use std::path::Path;
use std::sync::Arc;

use pressmark_core::{ExportConfig, Settings};
use pressmark_engine::{
    build_records, read_export, write_run_report, FetchSettings, Materializer, MarkdownTranslator,
    ReqwestFetcher, RunSummary, TranslateOptions,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/export.xml");

async fn asset_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "wordpress-export-to-markdown"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"asset".to_vec()))
        .mount(&server)
        .await;
    server
}

async fn run(server: &MockServer, work: &Path, config: ExportConfig) -> RunSummary {
    pressmark_logging::initialize_for_tests();
    let input = work.join("export.xml");
    std::fs::write(&input, FIXTURE.replace("https://example.com", &server.uri())).unwrap();
    let config = ExportConfig { input, ..config };
    let settings = Settings {
        markdown_file_write_delay_ms: 0,
        image_file_request_delay_ms: 0,
        ..Settings::default()
    };

    let doc = read_export(&config.input).unwrap();
    let translator = MarkdownTranslator::new(TranslateOptions::from_config(&config));
    let records = build_records(&doc, &config, &settings, &translator).unwrap();
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::from_settings(&settings)));
    Materializer::new(config, settings, fetcher)
        .write_all(&records)
        .await
        .unwrap()
}

fn header_block(path: &Path) -> String {
    let contents = std::fs::read_to_string(path).unwrap();
    let end = contents.rfind("---").unwrap() + 3;
    contents[..end].to_string()
}

#[tokio::test]
async fn exports_site_with_other_types() {
    let server = asset_server().await;
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("content");
    let config = ExportConfig {
        output: out.clone(),
        post_folders: false,
        include_other_types: true,
        ..ExportConfig::default()
    };

    let summary = run(&server, work.path(), config).await;

    assert_eq!(summary.failed(), 0, "{summary:?}");
    assert_eq!(summary.records, 6);
    assert_eq!(summary.markdown.succeeded, 6);
    assert_eq!(summary.assets.succeeded, 4);

    assert_eq!(
        header_block(&out.join("blog/nicomachean-ethics-by-aristotle.md")),
        "---\ntitle: \"Nicomachean Ethics by Aristotle\"\ncreated: 2022-12-07\n\
         categories: \n  - developer\n  - digital-nomad\n\
         tags: \n  - climate-change\n  - data\n\
         authors: \n  - rufus6922c5bca9\n\
         image: /assets/images/70eac-img_5-min.png\n---"
    );
    assert_eq!(
        header_block(&out.join("page/sample-page.md")),
        "---\ntitle: \"Home\"\ncreated: 2022-12-07\nauthors: \n  - rufus6922c5bca9\n---"
    );
    assert!(out.join("recipe/lentil-soup.md").exists());
    assert!(out.join("assets/hexagonal.pdf").exists());
    assert!(out.join("assets/images/70eac-img_5-min.png").exists());
    assert!(out.join("assets/images/inline.jpg").exists());
    assert!(out.join("assets/images/map.png").exists());
    assert!(!out.join("assets/images/bundle.zip").exists());
}

#[tokio::test]
async fn author_files_are_named_by_their_id() {
    let server = asset_server().await;
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("content");
    let config = ExportConfig {
        output: out.clone(),
        post_folders: false,
        include_other_types: true,
        save_attached_images: false,
        save_scraped_images: false,
        ..ExportConfig::default()
    };

    run(&server, work.path(), config).await;

    let mut stems = Vec::new();
    for entry in std::fs::read_dir(out.join("authors")).unwrap() {
        let path = entry.unwrap().path();
        let stem = path.file_stem().unwrap().to_string_lossy().to_string();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(&format!("\nid: {stem}\n")), "{contents}");
        let name = contents
            .lines()
            .find_map(|l| l.strip_prefix("name: "))
            .unwrap_or_default();
        assert!(!name.trim().is_empty(), "{contents}");
        stems.push(stem);
    }
    stems.sort();
    assert_eq!(stems, vec!["janedoe", "rufus6922c5bca9"]);
    assert_eq!(
        std::fs::read_to_string(out.join("authors/janedoe.md")).unwrap(),
        "---\nid: janedoe\nname: Jane Doe\n---\n"
    );
}

#[tokio::test]
async fn folder_mode_and_rerun_are_idempotent() {
    let server = asset_server().await;
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("content");
    let config = ExportConfig {
        output: out.clone(),
        ..ExportConfig::default()
    };

    let first = run(&server, work.path(), config.clone()).await;
    assert_eq!(first.markdown.succeeded, 2);
    assert!(out
        .join("nicomachean-ethics-by-aristotle/index.md")
        .exists());

    let requests_after_first = server.received_requests().await.unwrap().len();
    let second = run(&server, work.path(), config).await;
    assert_eq!(second.markdown.succeeded, 0);
    assert_eq!(second.markdown.skipped, 2);
    assert_eq!(second.assets.skipped, first.assets.succeeded);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_first
    );

    let report = work.path().join("report.json");
    write_run_report(&second, &report).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["markdown"]["skipped"], 2);
}

#[tokio::test]
async fn unpublished_drafts_land_in_the_drafts_folder() {
    let server = asset_server().await;
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("content");
    let config = ExportConfig {
        output: out.clone(),
        post_folders: false,
        year_folders: true,
        include_draft_posts: true,
        ..ExportConfig::default()
    };

    let summary = run(&server, work.path(), config).await;

    assert_eq!(summary.failed(), 0, "{summary:?}");
    assert_eq!(summary.markdown.succeeded, 4);
    assert!(out.join("drafts/2022/half-formed-thoughts.md").exists());
    assert_eq!(
        std::fs::read_to_string(out.join("drafts/16.md")).unwrap(),
        "---\ntitle: \"Someday\"\nauthors: \n  - janedoe\n---\n\nSomeday.\n"
    );
}
