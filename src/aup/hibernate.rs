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

//! A small binary framing for AUP record payloads: the blob column of the
//! persistence schema. Not a stable wire format — only required to
//! round-trip within the same build, so it favours simplicity over
//! versioning.

use crate::altitude::{AltMode, AltRange};
use crate::aup::model::{Activation, ActivationStatus, Availability, AupCdr, AupRecord, AupRsa, Direction};
use crate::error::Error;
use crate::object::Object;
use crate::time::TimeInterval;
use crate::uuid::{Link, Uuid};

pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// ULEB128-encoded length prefix, matching the source's `ioleb`.
    pub fn write_leb(&mut self, mut v: u32) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.buf.push(byte);
                break;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_leb(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub fn write_uuid(&mut self, uuid: Uuid) {
        for i in 0..4 {
            self.write_u32(uuid.word(i));
        }
    }
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.pos + n > self.buf.len() {
            return Err(Error::ParseError("hibernation buffer truncated".into()));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_leb(&mut self) -> Result<u32, Error> {
        let mut result: u32 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7f) as u32) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(result)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_leb()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_str(&mut self) -> Result<String, Error> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| Error::ParseError(e.to_string()))
    }

    pub fn read_uuid(&mut self) -> Result<Uuid, Error> {
        let words: Vec<u32> = (0..4).map(|_| self.read_u32()).collect::<Result<_, _>>()?;
        Ok(Uuid::from_words(words[0], words[1], words[2], words[3]))
    }
}

fn altmode_to_u8(m: AltMode) -> u8 {
    match m {
        AltMode::Qnh => 0,
        AltMode::Std => 1,
        AltMode::Height => 2,
        AltMode::Floor => 3,
        AltMode::Ceiling => 4,
        AltMode::Unlimited => 5,
        AltMode::Ignore => 6,
    }
}

fn altmode_from_u8(v: u8) -> Result<AltMode, Error> {
    Ok(match v {
        0 => AltMode::Qnh,
        1 => AltMode::Std,
        2 => AltMode::Height,
        3 => AltMode::Floor,
        4 => AltMode::Ceiling,
        5 => AltMode::Unlimited,
        6 => AltMode::Ignore,
        _ => return Err(Error::InvariantViolated("altmode out of range")),
    })
}

fn write_altrange(w: &mut Writer, ar: &AltRange) {
    w.write_i32(ar.lower_alt);
    w.write_u8(altmode_to_u8(ar.lower_mode));
    w.write_i32(ar.upper_alt);
    w.write_u8(altmode_to_u8(ar.upper_mode));
}

fn read_altrange(r: &mut Reader) -> Result<AltRange, Error> {
    let lower_alt = r.read_i32()?;
    let lower_mode = altmode_from_u8(r.read_u8()?)?;
    let upper_alt = r.read_i32()?;
    let upper_mode = altmode_from_u8(r.read_u8()?)?;
    Ok(AltRange::new(lower_alt, lower_mode, upper_alt, upper_mode))
}

fn write_link_vec(w: &mut Writer, links: &[Link<Object>]) {
    w.write_leb(links.len() as u32);
    for l in links {
        w.write_uuid(l.uuid());
    }
}

fn read_link_vec(r: &mut Reader) -> Result<Vec<Link<Object>>, Error> {
    let n = r.read_leb()?;
    (0..n).map(|_| r.read_uuid().map(Link::new)).collect()
}

fn write_availability(w: &mut Writer, a: &Availability) {
    write_altrange(w, &a.altrange);
    write_link_vec(w, &a.host_airspaces);
    w.write_u8(a.cdr_num);
    w.write_u8(match a.direction {
        Direction::Forward => 0,
        Direction::Backward => 1,
    });
}

fn read_availability(r: &mut Reader) -> Result<Availability, Error> {
    let altrange = read_altrange(r)?;
    let host_airspaces = read_link_vec(r)?;
    let cdr_num = r.read_u8()?;
    if !(1..=3).contains(&cdr_num) {
        return Err(Error::InvariantViolated("cdr_num out of {1,2,3}"));
    }
    let direction = match r.read_u8()? {
        0 => Direction::Forward,
        1 => Direction::Backward,
        _ => return Err(Error::InvariantViolated("direction out of range")),
    };
    Ok(Availability::new(altrange, host_airspaces, cdr_num, direction))
}

/// `0` = CDR, `1` = RSA, matching the `type` column of the persistence
/// schema.
pub fn record_kind(rec: &AupRecord) -> i32 {
    match rec {
        AupRecord::Cdr(_) => 0,
        AupRecord::Rsa(_) => 1,
    }
}

pub fn encode(rec: &AupRecord) -> Vec<u8> {
    let mut w = Writer::new();
    match rec {
        AupRecord::Cdr(cdr) => {
            w.write_leb(cdr.availability.len() as u32);
            for a in &cdr.availability {
                write_availability(&mut w, a);
            }
        }
        AupRecord::Rsa(rsa) => {
            write_altrange(&mut w, &rsa.activation.altrange);
            write_link_vec(&mut w, &rsa.activation.host_airspaces);
            w.write_u8(match rsa.activation.status {
                ActivationStatus::Active => 0,
                ActivationStatus::Invalid => 1,
            });
            w.write_str(&rsa.airspace_type);
            w.write_u8(rsa.icao as u8);
            w.write_u32(rsa.level_flags);
        }
    }
    w.into_bytes()
}

pub fn decode(kind: i32, obj: Uuid, interval: TimeInterval, blob: &[u8]) -> Result<AupRecord, Error> {
    let mut r = Reader::new(blob);
    match kind {
        0 => {
            let n = r.read_leb()?;
            let availability = (0..n).map(|_| read_availability(&mut r)).collect::<Result<_, _>>()?;
            Ok(AupRecord::Cdr(AupCdr { obj: Link::new(obj), interval, availability }))
        }
        1 => {
            let altrange = read_altrange(&mut r)?;
            let host_airspaces = read_link_vec(&mut r)?;
            let status = match r.read_u8()? {
                0 => ActivationStatus::Active,
                1 => ActivationStatus::Invalid,
                _ => return Err(Error::InvariantViolated("activation status out of range")),
            };
            let airspace_type = r.read_str()?;
            let icao = r.read_u8()? != 0;
            let level_flags = r.read_u32()?;
            Ok(AupRecord::Rsa(AupRsa {
                obj: Link::new(obj),
                interval,
                activation: Activation {
                    altrange,
                    host_airspaces,
                    status,
                },
                airspace_type,
                icao,
                level_flags,
            }))
        }
        _ => Err(Error::InvariantViolated("AUP record kind out of range")),
    }
}
