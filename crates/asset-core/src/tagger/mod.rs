//! AI-assisted keyword tagging of stored game assets.
//!
//! Each asset without tags moves through
//! `Untagged → TagsRequested → TagsClassified → Committed | FailedRolledBack`.
//! All writes for one asset share a transaction; a failing keyword rolls the
//! whole asset back and the run moves on to the next one.

pub mod keywords;
pub mod store;

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::TaggerError;
use crate::ids::new_id;

pub use keywords::{KeywordSource, OpenAiConfig, OpenAiKeywords};
pub use store::{AssetStore, AssetTransaction};

/// A `GameAsset` row as the tagger sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub name: String,
    /// Public image URL shown to the model.
    pub image: String,
}

/// A `ContentTag` row. Names are unique and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Untagged,
    TagsRequested,
    TagsClassified,
    Committed,
    FailedRolledBack,
}

/// Work done for one committed asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSummary {
    /// New `ContentTag` rows.
    pub created_tags: usize,
    /// New `GameAssetTag` rows.
    pub linked_tags: usize,
    /// Keywords already on the asset, or repeated in the reply.
    pub skipped: usize,
}

#[derive(Debug)]
pub struct AssetOutcome {
    pub asset_id: String,
    pub result: Result<TagSummary, TaggerError>,
}

impl AssetOutcome {
    pub fn state(&self) -> AssetState {
        match self.result {
            Ok(_) => AssetState::Committed,
            Err(_) => AssetState::FailedRolledBack,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<AssetOutcome>,
}

impl RunReport {
    pub fn committed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.committed()
    }

    pub fn totals(&self) -> TagSummary {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .fold(TagSummary::default(), |acc, s| TagSummary {
                created_tags: acc.created_tags + s.created_tags,
                linked_tags: acc.linked_tags + s.linked_tags,
                skipped: acc.skipped + s.skipped,
            })
    }
}

pub struct Tagger<'a> {
    store: &'a mut AssetStore,
    source: &'a dyn KeywordSource,
    /// Committed tag names → ids.
    tags: HashMap<String, String>,
}

impl<'a> Tagger<'a> {
    /// Loads the global tag table once; it is kept current as assets commit.
    pub fn new(store: &'a mut AssetStore, source: &'a dyn KeywordSource) -> Result<Self, TaggerError> {
        let tags = store.all_tags()?;
        info!(tags = tags.len(), "loaded existing tags");
        Ok(Self { store, source, tags })
    }

    /// Tag every untagged asset. `on_outcome` sees each outcome as it lands.
    ///
    /// Store failures are recorded per asset. Inference and reply-shape
    /// failures end the run.
    pub fn run(&mut self, mut on_outcome: impl FnMut(&Asset, &AssetOutcome)) -> Result<RunReport, TaggerError> {
        let assets = self.store.untagged_assets()?;
        info!(assets = assets.len(), "untagged assets");

        let mut report = RunReport::default();
        for asset in &assets {
            debug!(asset = %asset.id, name = %asset.name, state = ?AssetState::Untagged);
            let outcome = self.tag_asset(asset)?;
            on_outcome(asset, &outcome);
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    /// Request keywords for `asset` and store the missing ones.
    pub fn tag_asset(&mut self, asset: &Asset) -> Result<AssetOutcome, TaggerError> {
        debug!(asset = %asset.id, state = ?AssetState::TagsRequested);
        let keywords = self.source.suggest(asset)?;
        let result = self.commit_keywords(asset, &keywords);
        let outcome = AssetOutcome {
            asset_id: asset.id.clone(),
            result,
        };
        debug!(asset = %asset.id, state = ?outcome.state());
        Ok(outcome)
    }

    fn commit_keywords(&mut self, asset: &Asset, keywords: &[String]) -> Result<TagSummary, TaggerError> {
        let mut on_asset = self.store.asset_tag_names(&asset.id)?;
        debug!(asset = %asset.id, state = ?AssetState::TagsClassified, existing = on_asset.len());

        let mut summary = TagSummary::default();
        let mut created: HashMap<String, String> = HashMap::new();
        let tx = self.store.begin()?;

        for keyword in keywords {
            if on_asset.contains(keyword) {
                summary.skipped += 1;
                continue;
            }
            match link_keyword(&tx, &self.tags, &mut created, &asset.id, keyword) {
                Ok(new_tag) => {
                    summary.created_tags += usize::from(new_tag);
                    summary.linked_tags += 1;
                    on_asset.insert(keyword.clone());
                }
                Err(source) => {
                    warn!(asset = %asset.id, %keyword, error = %source, "keyword failed, rolling back asset");
                    if let Err(e) = tx.rollback() {
                        warn!(asset = %asset.id, error = %e, "rollback failed");
                    }
                    return Err(TaggerError::Keyword {
                        asset_id: asset.id.clone(),
                        keyword: keyword.clone(),
                        source,
                    });
                }
            }
        }

        tx.commit()?;
        self.tags.extend(created);
        Ok(summary)
    }

    pub fn known_tags(&self) -> &HashMap<String, String> {
        &self.tags
    }
}

/// Reuse or create the tag for `keyword` and link it. Returns whether a tag
/// row was created.
fn link_keyword(
    tx: &AssetTransaction<'_>,
    committed: &HashMap<String, String>,
    created: &mut HashMap<String, String>,
    asset_id: &str,
    keyword: &str,
) -> rusqlite::Result<bool> {
    let (tag_id, new_tag) = match committed.get(keyword).or_else(|| created.get(keyword)) {
        Some(id) => (id.clone(), false),
        None => {
            let id = new_id();
            tx.insert_tag(&id, keyword)?;
            created.insert(keyword.to_owned(), id.clone());
            (id, true)
        }
    };
    tx.link_tag(&new_id(), asset_id, &tag_id)?;
    Ok(new_tag)
}
