//! SQLite access to the asset, tag and asset-tag tables.
//!
//! Every statement binds its values as parameters.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rusqlite::{params, Connection, Transaction};

use super::{Asset, Tag};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS GameAsset (
    id             TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    type           TEXT NOT NULL DEFAULT 'STATIC',
    image          TEXT NOT NULL,
    frames         INTEGER NOT NULL DEFAULT 1,
    speed          INTEGER NOT NULL DEFAULT 50,
    licenseDetails TEXT NOT NULL DEFAULT '',
    hidden         INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS ContentTag (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS GameAssetTag (
    id      TEXT PRIMARY KEY,
    assetId TEXT NOT NULL,
    tagId   TEXT NOT NULL,
    UNIQUE (assetId, tagId)
);
";

pub struct AssetStore {
    conn: Connection,
}

impl AssetStore {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Raw connection, for seeding and inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the three tables if they do not exist yet.
    pub fn ensure_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(SCHEMA)
    }

    /// Assets without a single tag association, ordered by id.
    pub fn untagged_assets(&self) -> rusqlite::Result<Vec<Asset>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name, a.image FROM GameAsset a \
             LEFT JOIN GameAssetTag b ON a.id = b.assetId \
             WHERE b.id IS NULL ORDER BY a.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Asset {
                id: row.get(0)?,
                name: row.get(1)?,
                image: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    /// Every tag, name → id.
    pub fn all_tags(&self) -> rusqlite::Result<HashMap<String, String>> {
        Ok(self.tags()?.into_iter().map(|t| (t.name, t.id)).collect())
    }

    /// Every tag, ordered by name.
    pub fn tags(&self) -> rusqlite::Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM ContentTag ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Tag {
                id: row.get::<_, String>(0)?,
                name: row.get::<_, String>(1)?,
            })
        })?;
        rows.collect()
    }

    /// Names of the tags already linked to `asset_id`.
    pub fn asset_tag_names(&self, asset_id: &str) -> rusqlite::Result<HashSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.name FROM GameAssetTag a \
             JOIN ContentTag b ON a.tagId = b.id \
             WHERE a.assetId = ?1",
        )?;
        let rows = stmt.query_map(params![asset_id], |row| row.get::<_, String>(0))?;
        rows.collect()
    }

    pub fn begin(&mut self) -> rusqlite::Result<AssetTransaction<'_>> {
        Ok(AssetTransaction {
            tx: self.conn.transaction()?,
        })
    }
}

/// All writes for one asset. Dropping without `commit` rolls back.
pub struct AssetTransaction<'c> {
    tx: Transaction<'c>,
}

impl AssetTransaction<'_> {
    pub fn insert_tag(&self, id: &str, name: &str) -> rusqlite::Result<()> {
        self.tx.execute(
            "INSERT INTO ContentTag (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    pub fn link_tag(&self, id: &str, asset_id: &str, tag_id: &str) -> rusqlite::Result<()> {
        self.tx.execute(
            "INSERT INTO GameAssetTag (id, assetId, tagId) VALUES (?1, ?2, ?3)",
            params![id, asset_id, tag_id],
        )?;
        Ok(())
    }

    pub fn commit(self) -> rusqlite::Result<()> {
        self.tx.commit()
    }

    pub fn rollback(self) -> rusqlite::Result<()> {
        self.tx.rollback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> AssetStore {
        let store = AssetStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
            .connection()
            .execute_batch(
                "INSERT INTO GameAsset (id, name, image) VALUES ('a1', 'Fire', 'https://x/fire.png');
                 INSERT INTO GameAsset (id, name, image) VALUES ('a2', 'Smoke', 'https://x/smoke.png');
                 INSERT INTO ContentTag (id, name) VALUES ('t1', 'flame');
                 INSERT INTO GameAssetTag (id, assetId, tagId) VALUES ('l1', 'a1', 't1');",
            )
            .unwrap();
        store
    }

    #[test]
    fn untagged_excludes_linked_assets() {
        let store = seeded();
        let assets = store.untagged_assets().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "a2");
        assert_eq!(assets[0].image, "https://x/smoke.png");
    }

    #[test]
    fn tag_lookups() {
        let store = seeded();
        assert_eq!(store.all_tags().unwrap().get("flame").map(String::as_str), Some("t1"));
        assert!(store.asset_tag_names("a1").unwrap().contains("flame"));
        assert!(store.asset_tag_names("a2").unwrap().is_empty());
    }

    #[test]
    fn tags_are_listed_by_name() {
        let mut store = seeded();
        let tx = store.begin().unwrap();
        tx.insert_tag("t2", "ash").unwrap();
        tx.insert_tag("t3", "Ember").unwrap();
        tx.commit().unwrap();

        let names: Vec<_> = store.tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Ember", "ash", "flame"]);
        assert_eq!(store.tags().unwrap()[1], Tag { id: "t2".into(), name: "ash".into() });
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut store = seeded();
        {
            let tx = store.begin().unwrap();
            tx.insert_tag("t2", "smoke").unwrap();
            tx.link_tag("l2", "a2", "t2").unwrap();
        }
        assert!(!store.all_tags().unwrap().contains_key("smoke"));

        let tx = store.begin().unwrap();
        tx.insert_tag("t2", "smoke").unwrap();
        tx.commit().unwrap();
        assert!(store.all_tags().unwrap().contains_key("smoke"));
    }

    #[test]
    fn quotes_in_names_are_bound_not_spliced() {
        let mut store = seeded();
        let tx = store.begin().unwrap();
        tx.insert_tag("t3", "it's").unwrap();
        tx.commit().unwrap();
        assert_eq!(store.all_tags().unwrap().get("it's").map(String::as_str), Some("t3"));
    }
}
