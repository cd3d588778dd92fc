use std::collections::{BTreeSet, HashMap};

use crate::path::cover_image_path;
use crate::record::keys;
use crate::{Asset, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// URLs newly appended to some record.
    pub attached: usize,
    pub covers: usize,
}

/// Merges discovered assets into the records that use them.
///
/// An asset attaches to every record whose id equals its owning record id and
/// to every record whose cover id equals its source id; the latter also sets
/// the record's `image` header. Assets are visited in discovery order and
/// records in slice order, through index maps instead of a full cross scan.
pub fn link_assets(assets: &[Asset], records: &mut [Record], assets_folder: &str) -> LinkStats {
    // Copied out so `records` stays mutable while the maps are alive.
    let keys_owned: Vec<(String, Option<String>)> = records
        .iter()
        .map(|r| (r.id.clone(), r.cover_asset_id.clone()))
        .collect();
    let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut by_cover: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, (id, cover)) in keys_owned.iter().enumerate() {
        by_id.entry(id.as_str()).or_default().push(idx);
        if let Some(cover) = cover {
            by_cover.entry(cover.as_str()).or_default().push(idx);
        }
    }

    let mut stats = LinkStats::default();
    for asset in assets {
        let mut targets = BTreeSet::new();
        let mut cover_targets = BTreeSet::new();
        if let Some(owner) = asset.owning_record_id.as_deref() {
            targets.extend(by_id.get(owner).into_iter().flatten().copied());
        }
        if let Some(source) = asset.source_id.as_deref() {
            cover_targets.extend(by_cover.get(source).into_iter().flatten().copied());
        }
        targets.extend(cover_targets.iter().copied());

        for idx in targets {
            let record = &mut records[idx];
            if cover_targets.contains(&idx) {
                record
                    .header
                    .set_text(keys::IMAGE, cover_image_path(&asset.url, assets_folder));
                stats.covers += 1;
            }
            if record.add_asset_url(&asset.url) {
                stats.attached += 1;
            }
        }
    }
    stats
}
