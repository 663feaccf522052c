// SPDX-License-Identifier: Apache-2.0
// Copyright 2024, 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A persistent, temporally-sliced key-value store of CDR/RSA records,
//! backed by SQLite. `save` is the overlap-preserving upsert; everything
//! else is a read path or an administrative pragma.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::aup::hibernate;
use crate::aup::model::{availability_merge, AupCdr, AupRecord, AupRsa};
use crate::error::Error;
use crate::time::{TimeInstant, TimeInterval};
use crate::uuid::Uuid;

const MIGRATIONS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS aup (
    uuid0 INTEGER NOT NULL,
    uuid1 INTEGER NOT NULL,
    uuid2 INTEGER NOT NULL,
    uuid3 INTEGER NOT NULL,
    type  INTEGER NOT NULL,
    start INTEGER NOT NULL,
    end   INTEGER NOT NULL,
    data  BLOB NOT NULL,
    UNIQUE(uuid0, uuid1, uuid2, uuid3, start, end) ON CONFLICT REPLACE
);
CREATE INDEX IF NOT EXISTS aup_uuid ON aup(uuid0, uuid1, uuid2, uuid3, start, end);
"#;

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(MIGRATIONS_SQL)])
}

/// The pragmas §6 names, applied once at `open`. Defaults match SQLite's
/// own (`DELETE` journal, `NORMAL` locking, synchronous on).
#[derive(Copy, Clone, Debug, Default)]
pub struct AupStoreConfig {
    pub wal: bool,
    pub exclusive_locking: bool,
    pub synchronous_off: bool,
}

/// File-backed CDR/RSA record store keyed by `(uuid, start, end)`.
pub struct AupStore {
    conn: Connection,
}

impl AupStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_with_config(path, AupStoreConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: AupStoreConfig) -> Result<Self, Error> {
        let mut conn = Connection::open(path)?;
        migrations().to_latest(&mut conn)?;
        log::debug!("AUP store opened and migrated to latest schema");
        let store = Self { conn };
        store.apply_config(config)?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let mut conn = Connection::open_in_memory()?;
        migrations().to_latest(&mut conn)?;
        Ok(Self { conn })
    }

    fn apply_config(&self, config: AupStoreConfig) -> Result<(), Error> {
        self.set_journal_mode(config.wal)?;
        self.set_locking_mode(config.exclusive_locking)?;
        if config.synchronous_off {
            self.set_synchronous_off()?;
        }
        Ok(())
    }

    /// `wal = true` selects WAL journaling; `false` selects rollback-journal
    /// (`DELETE`) mode.
    pub fn set_journal_mode(&self, wal: bool) -> Result<(), Error> {
        let mode = if wal { "WAL" } else { "DELETE" };
        self.conn.pragma_update(None, "journal_mode", mode)?;
        Ok(())
    }

    pub fn set_locking_mode(&self, exclusive: bool) -> Result<(), Error> {
        let mode = if exclusive { "EXCLUSIVE" } else { "NORMAL" };
        self.conn.pragma_update(None, "locking_mode", mode)?;
        Ok(())
    }

    pub fn set_synchronous_off(&self) -> Result<(), Error> {
        self.conn.pragma_update(None, "synchronous", "OFF")?;
        Ok(())
    }

    pub fn analyze(&self) -> Result<(), Error> {
        self.conn.execute_batch("ANALYZE")?;
        Ok(())
    }

    pub fn vacuum(&self) -> Result<(), Error> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    /// The overlap-preserving upsert. See the module-level contract: a CDR
    /// record re-partitions the union of boundary times of `rec` and every
    /// overlapping stored record, merging availabilities per sub-interval;
    /// any other kind truncates overlapping originals to their
    /// non-overlapping fragments and then stores `rec` unmodified.
    pub fn save(&mut self, rec: AupRecord) -> Result<(), Error> {
        if !rec.is_valid() {
            return Err(Error::InvariantViolated("AUP record has a zero-width interval"));
        }
        let tx = self.conn.transaction()?;
        match &rec {
            AupRecord::Cdr(cdr) => save_cdr(&tx, cdr)?,
            AupRecord::Rsa(rsa) => save_rsa(&tx, rsa)?,
        }
        tx.commit()?;
        Ok(())
    }

    pub fn find(&self, obj: Uuid, t0: TimeInstant, t1: TimeInstant) -> Result<Vec<AupRecord>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT type, start, end, data FROM aup \
             WHERE uuid0=?1 AND uuid1=?2 AND uuid2=?3 AND uuid3=?4 AND end>?5 AND start<?6 \
             ORDER BY start, end",
        )?;
        let rows = stmt.query_map(
            params![obj.word(0), obj.word(1), obj.word(2), obj.word(3), t0 as i64, t1 as i64],
            row_to_record(obj),
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
    }

    pub fn find_range(&self, t0: TimeInstant, t1: TimeInstant) -> Result<Vec<AupRecord>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid0, uuid1, uuid2, uuid3, type, start, end, data FROM aup \
             WHERE end>?1 AND start<?2 ORDER BY uuid0, uuid1, uuid2, uuid3, start, end",
        )?;
        let rows = stmt.query_map(params![t0 as i64, t1 as i64], |row| {
            let obj = Uuid::from_words(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?);
            let kind: i32 = row.get(4)?;
            let start: i64 = row.get(5)?;
            let end: i64 = row.get(6)?;
            let data: Vec<u8> = row.get(7)?;
            Ok((obj, kind, start as u64, end as u64, data))
        })?;
        rows.map(|r| {
            let (obj, kind, start, end, data) = r?;
            hibernate::decode(kind, obj, TimeInterval::new(start, end), &data)
        })
        .collect()
    }

    pub fn find_point(&self, obj: Uuid, t: TimeInstant) -> Result<Option<AupRecord>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT type, start, end, data FROM aup \
             WHERE uuid0=?1 AND uuid1=?2 AND uuid2=?3 AND uuid3=?4 AND start<=?5 AND end>?5",
        )?;
        stmt.query_row(
            params![obj.word(0), obj.word(1), obj.word(2), obj.word(3), t as i64],
            row_to_record(obj),
        )
        .optional()
        .map_err(Error::from)
    }

    /// Deletes every stored record for `obj` whose interval intersects
    /// `[tmin, tmax)`.
    pub fn erase(&mut self, obj: Uuid, tmin: TimeInstant, tmax: TimeInstant) -> Result<(), Error> {
        self.conn.execute(
            "DELETE FROM aup WHERE uuid0=?1 AND uuid1=?2 AND uuid2=?3 AND uuid3=?4 AND end>?5 AND start<?6",
            params![obj.word(0), obj.word(1), obj.word(2), obj.word(3), tmin as i64, tmax as i64],
        )?;
        Ok(())
    }
}

fn row_to_record(obj: Uuid) -> impl Fn(&rusqlite::Row) -> rusqlite::Result<AupRecord> {
    move |row| {
        let kind: i32 = row.get(0)?;
        let start: i64 = row.get(1)?;
        let end: i64 = row.get(2)?;
        let data: Vec<u8> = row.get(3)?;
        hibernate::decode(kind, obj, TimeInterval::new(start as u64, end as u64), &data)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }
}

fn insert(tx: &rusqlite::Transaction, rec: &AupRecord) -> Result<(), Error> {
    let obj = rec.obj();
    let interval = rec.interval();
    let blob = hibernate::encode(rec);
    tx.execute(
        "INSERT INTO aup (uuid0,uuid1,uuid2,uuid3,type,start,end,data) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            obj.word(0),
            obj.word(1),
            obj.word(2),
            obj.word(3),
            hibernate::record_kind(rec),
            interval.start as i64,
            interval.end as i64,
            blob,
        ],
    )?;
    Ok(())
}

fn delete_exact(tx: &rusqlite::Transaction, obj: Uuid, interval: TimeInterval) -> Result<(), Error> {
    tx.execute(
        "DELETE FROM aup WHERE uuid0=?1 AND uuid1=?2 AND uuid2=?3 AND uuid3=?4 AND start=?5 AND end=?6",
        params![obj.word(0), obj.word(1), obj.word(2), obj.word(3), interval.start as i64, interval.end as i64],
    )?;
    Ok(())
}

fn overlapping_cdr(tx: &rusqlite::Transaction, obj: Uuid, interval: TimeInterval) -> Result<Vec<AupCdr>, Error> {
    let mut stmt = tx.prepare(
        "SELECT start, end, data FROM aup WHERE uuid0=?1 AND uuid1=?2 AND uuid2=?3 AND uuid3=?4 \
         AND type=0 AND end>?5 AND start<?6",
    )?;
    let rows = stmt.query_map(
        params![obj.word(0), obj.word(1), obj.word(2), obj.word(3), interval.start as i64, interval.end as i64],
        |row| {
            let start: i64 = row.get(0)?;
            let end: i64 = row.get(1)?;
            let data: Vec<u8> = row.get(2)?;
            Ok((start as u64, end as u64, data))
        },
    )?;
    rows.map(|r| {
        let (start, end, data) = r?;
        match hibernate::decode(0, obj, TimeInterval::new(start, end), &data)? {
            AupRecord::Cdr(c) => Ok(c),
            AupRecord::Rsa(_) => unreachable!("type=0 filter guarantees a CDR row"),
        }
    })
    .collect()
}

fn overlapping_rsa(tx: &rusqlite::Transaction, obj: Uuid, interval: TimeInterval) -> Result<Vec<AupRsa>, Error> {
    let mut stmt = tx.prepare(
        "SELECT start, end, data FROM aup WHERE uuid0=?1 AND uuid1=?2 AND uuid2=?3 AND uuid3=?4 \
         AND type=1 AND end>?5 AND start<?6",
    )?;
    let rows = stmt.query_map(
        params![obj.word(0), obj.word(1), obj.word(2), obj.word(3), interval.start as i64, interval.end as i64],
        |row| {
            let start: i64 = row.get(0)?;
            let end: i64 = row.get(1)?;
            let data: Vec<u8> = row.get(2)?;
            Ok((start as u64, end as u64, data))
        },
    )?;
    rows.map(|r| {
        let (start, end, data) = r?;
        match hibernate::decode(1, obj, TimeInterval::new(start, end), &data)? {
            AupRecord::Rsa(r) => Ok(r),
            AupRecord::Cdr(_) => unreachable!("type=1 filter guarantees an RSA row"),
        }
    })
    .collect()
}

fn save_cdr(tx: &rusqlite::Transaction, rec: &AupCdr) -> Result<(), Error> {
    let found = overlapping_cdr(tx, rec.obj.uuid(), rec.interval)?;

    let mut boundary: BTreeSet<TimeInstant> = BTreeSet::new();
    boundary.insert(rec.interval.start);
    boundary.insert(rec.interval.end);
    for f in &found {
        boundary.insert(f.interval.start);
        boundary.insert(f.interval.end);
    }

    for f in &found {
        delete_exact(tx, f.obj.uuid(), f.interval)?;
    }

    let boundary: Vec<TimeInstant> = boundary.into_iter().collect();
    for pair in boundary.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        let sub = TimeInterval::new(t0, t1);
        let mut availability = Vec::new();
        if rec.interval.is_overlap(&sub) {
            availability_merge(&mut availability, &rec.availability);
        }
        for f in &found {
            if f.interval.is_overlap(&sub) {
                availability_merge(&mut availability, &f.availability);
            }
        }
        if !availability.is_empty() {
            insert(
                tx,
                &AupRecord::Cdr(AupCdr {
                    obj: rec.obj.clone(),
                    interval: sub,
                    availability,
                }),
            )?;
        }
    }
    Ok(())
}

fn save_rsa(tx: &rusqlite::Transaction, rec: &AupRsa) -> Result<(), Error> {
    let found = overlapping_rsa(tx, rec.obj.uuid(), rec.interval)?;
    for f in &found {
        delete_exact(tx, f.obj.uuid(), f.interval)?;
        if f.interval.start < rec.interval.start {
            let frag = AupRsa {
                interval: TimeInterval::new(f.interval.start, rec.interval.start),
                ..f.clone()
            };
            insert(tx, &AupRecord::Rsa(frag))?;
        }
        if f.interval.end > rec.interval.end {
            let frag = AupRsa {
                interval: TimeInterval::new(rec.interval.end, f.interval.end),
                ..f.clone()
            };
            insert(tx, &AupRecord::Rsa(frag))?;
        }
    }
    insert(tx, &AupRecord::Rsa(rec.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altitude::{AltMode, AltRange};
    use crate::aup::model::{Activation, ActivationStatus, Availability, Direction};
    use crate::uuid::Link;

    fn cdr(obj: Uuid, start: TimeInstant, end: TimeInstant, lo: i32, hi: i32) -> AupRecord {
        AupRecord::Cdr(AupCdr {
            obj: Link::new(obj),
            interval: TimeInterval::new(start, end),
            availability: vec![Availability::new(
                AltRange::new(lo, AltMode::Floor, hi, AltMode::Ceiling),
                vec![Link::new(Uuid::new_v4())],
                1,
                Direction::Forward,
            )],
        })
    }

    #[test]
    fn cdr_upsert_overlap_splits_into_three_records() {
        let mut store = AupStore::open_in_memory().unwrap();
        let x = Uuid::new_v4();
        store.save(cdr(x, 100, 200, 10000, 20000)).unwrap();
        store.save(cdr(x, 150, 250, 20000, 30000)).unwrap();

        let at120 = store.find_point(x, 120).unwrap().unwrap();
        let AupRecord::Cdr(c) = &at120 else { panic!("expected CDR") };
        assert_eq!(c.availability.len(), 1);
        assert_eq!(c.availability[0].altrange.lower_alt, 10000);

        let at175 = store.find_point(x, 175).unwrap().unwrap();
        let AupRecord::Cdr(c) = &at175 else { panic!("expected CDR") };
        assert_eq!(c.availability.len(), 2);

        let at225 = store.find_point(x, 225).unwrap().unwrap();
        let AupRecord::Cdr(c) = &at225 else { panic!("expected CDR") };
        assert_eq!(c.availability.len(), 1);
        assert_eq!(c.availability[0].altrange.lower_alt, 20000);
    }

    #[test]
    fn rsa_upsert_preserves_non_overlapping_fragments() {
        let mut store = AupStore::open_in_memory().unwrap();
        let x = Uuid::new_v4();
        let base = AupRsa {
            obj: Link::new(x),
            interval: TimeInterval::new(0, 1000),
            activation: Activation {
                altrange: AltRange::unrestricted(),
                host_airspaces: vec![],
                status: ActivationStatus::Active,
            },
            airspace_type: "TSA".into(),
            icao: false,
            level_flags: 0,
        };
        store.save(AupRecord::Rsa(base.clone())).unwrap();

        let replacement = AupRsa {
            interval: TimeInterval::new(400, 600),
            ..base.clone()
        };
        store.save(AupRecord::Rsa(replacement)).unwrap();

        assert!(store.find_point(x, 100).unwrap().is_some());
        assert!(store.find_point(x, 500).unwrap().is_some());
        assert!(store.find_point(x, 800).unwrap().is_some());
        assert_eq!(store.find(x, 0, 1000).unwrap().len(), 3);
    }

    #[test]
    fn save_rejects_zero_width_interval() {
        let mut store = AupStore::open_in_memory().unwrap();
        let rec = cdr(Uuid::new_v4(), 100, 100, 0, 1000);
        assert!(store.save(rec).is_err());
    }
}
