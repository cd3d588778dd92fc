use pressmark_core::{keys, link_assets, Asset, Header, LinkStats, Record, RecordKind, Status};
use pretty_assertions::assert_eq;

fn record(id: &str, cover: Option<&str>) -> Record {
    Record {
        id: id.into(),
        slug: format!("post-{id}"),
        kind: RecordKind::Post,
        status: Status::Publish,
        created_at: None,
        header: Header::new(),
        cover_asset_id: cover.map(str::to_string),
        asset_urls: Vec::new(),
        body: Some(String::new()),
    }
}

fn attached(id: &str, parent: &str, url: &str) -> Asset {
    Asset {
        source_id: Some(id.into()),
        owning_record_id: Some(parent.into()),
        url: url.into(),
    }
}

fn scraped(parent: &str, url: &str) -> Asset {
    Asset {
        source_id: None,
        owning_record_id: Some(parent.into()),
        url: url.into(),
    }
}

#[test]
fn cover_asset_sets_image_and_url() {
    let mut records = vec![record("1", Some("50"))];
    let assets = vec![attached("50", "0", "https://ex.com/up/cover.png")];

    let stats = link_assets(&assets, &mut records, "assets");

    assert_eq!(stats, LinkStats { attached: 1, covers: 1 });
    assert_eq!(records[0].header.text(keys::IMAGE), Some("/assets/images/cover.png"));
    assert_eq!(records[0].asset_urls, vec!["https://ex.com/up/cover.png".to_string()]);
}

#[test]
fn attached_and_scraped_urls_are_deduplicated_in_discovery_order() {
    let mut records = vec![record("1", None), record("2", None)];
    let assets = vec![
        attached("50", "1", "https://ex.com/a.png"),
        scraped("1", "https://ex.com/b.jpg"),
        scraped("1", "https://ex.com/a.png"),
        scraped("2", "https://ex.com/c.gif"),
    ];

    let stats = link_assets(&assets, &mut records, "assets");

    assert_eq!(stats.attached, 3);
    assert_eq!(
        records[0].asset_urls,
        vec!["https://ex.com/a.png".to_string(), "https://ex.com/b.jpg".to_string()]
    );
    assert_eq!(records[1].asset_urls, vec!["https://ex.com/c.gif".to_string()]);
    assert!(records[0].header.text(keys::IMAGE).is_none());
}

#[test]
fn scraped_assets_never_match_cover_ids() {
    let mut records = vec![record("1", Some("1"))];
    let assets = vec![scraped("9", "https://ex.com/x.png")];

    let stats = link_assets(&assets, &mut records, "assets");

    assert_eq!(stats, LinkStats::default());
    assert!(records[0].asset_urls.is_empty());
}

#[test]
fn shared_cover_attaches_to_every_record_using_it() {
    let mut records = vec![record("1", Some("7")), record("2", Some("7"))];
    let assets = vec![attached("7", "1", "https://ex.com/shared.webp")];

    link_assets(&assets, &mut records, "media");

    for r in &records {
        assert_eq!(r.header.text(keys::IMAGE), Some("/media/images/shared.webp"));
        assert_eq!(r.asset_urls, vec!["https://ex.com/shared.webp".to_string()]);
    }
}
