// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.


//! Reference-identity tables used by cache-by-reference picklers.
//!
//! Identities are `(TypeId, address)` pairs. Every table keeps the source
//! value alive for the whole session, so an address can never be reused by a
//! different value while the session is running.

use crate::buffer::Writer;
use crate::error::Error;
use crate::types::RefFlag;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};

pub type RefKey = (TypeId, usize);

/// Reference writer for tracking shared values during serialization.
///
/// Maps value identities to reference ids, so a value met a second time is
/// written as a back reference instead of a second payload.
#[derive(Default)]
pub struct RefWriter {
    refs: HashMap<RefKey, u32>,
    keep_alive: Vec<Box<dyn Any>>,
    next_ref_id: u32,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the reference flag for `key`.
    ///
    /// Returns `true` if a back reference was written (the payload must be
    /// skipped), `false` if this is the first occurrence and the payload must
    /// follow.
    pub fn try_write_ref<F>(&mut self, writer: &mut Writer, key: RefKey, keep: F) -> bool
    where
        F: FnOnce() -> Box<dyn Any>,
    {
        if let Some(&ref_id) = self.refs.get(&key) {
            writer.write_i8(RefFlag::Ref as i8);
            writer.write_u32(ref_id);
            true
        } else {
            let ref_id = self.next_ref_id;
            self.next_ref_id += 1;
            self.refs.insert(key, ref_id);
            self.keep_alive.push(keep());
            writer.write_i8(RefFlag::RefValue as i8);
            false
        }
    }

    pub fn clear(&mut self) {
        self.refs.clear();
        self.keep_alive.clear();
        self.next_ref_id = 0;
    }
}

/// Reference reader resolving back references during deserialization.
///
/// Ids are reserved before a payload is read so they line up with the ids
/// assigned by [`RefWriter`]; a slot is filled once its value is complete.
#[derive(Default)]
pub struct RefReader {
    refs: Vec<Option<Box<dyn Any>>>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve_ref_id(&mut self) -> u32 {
        let ref_id = self.refs.len() as u32;
        self.refs.push(None);
        ref_id
    }

    pub fn store_ref(&mut self, ref_id: u32, value: Box<dyn Any>) {
        if let Some(slot) = self.refs.get_mut(ref_id as usize) {
            *slot = Some(value);
        }
    }

    pub fn get_ref<T: 'static>(&self, ref_id: u32) -> Result<&T, Error> {
        match self.refs.get(ref_id as usize) {
            Some(Some(value)) => value.downcast_ref::<T>().ok_or_else(|| {
                Error::invalid_ref(format!(
                    "ref id {} does not refer to a {}",
                    ref_id,
                    type_name::<T>()
                ))
            }),
            Some(None) => Err(Error::invalid_ref(format!(
                "ref id {} refers to a {} that is still being read",
                ref_id,
                type_name::<T>()
            ))),
            None => Err(Error::invalid_ref(format!("unknown ref id {}", ref_id))),
        }
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }
}

struct CloneSlot {
    _source: Box<dyn Any>,
    clone: Option<Box<dyn Any>>,
}

/// Identity map of one clone session: source identity to finished clone.
#[derive(Default)]
pub struct CloneRefs {
    slots: HashMap<RefKey, CloneSlot>,
}

impl CloneRefs {
    /// Returns the clone already produced for `key`, if any.
    pub fn get<T: 'static>(&self, key: RefKey) -> Result<Option<&T>, Error> {
        match self.slots.get(&key) {
            None => Ok(None),
            Some(CloneSlot { clone: None, .. }) => Err(Error::invalid_ref(format!(
                "cyclic {} cannot be cloned before its own clone completes",
                type_name::<T>()
            ))),
            Some(CloneSlot {
                clone: Some(clone), ..
            }) => clone.downcast_ref::<T>().map(Some).ok_or_else(|| {
                Error::invalid_ref(format!(
                    "cloned value registered for {} has another type",
                    type_name::<T>()
                ))
            }),
        }
    }

    pub fn reserve(&mut self, key: RefKey, source: Box<dyn Any>) {
        self.slots.insert(
            key,
            CloneSlot {
                _source: source,
                clone: None,
            },
        );
    }

    pub fn fill(&mut self, key: RefKey, clone: Box<dyn Any>) {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.clone = Some(clone);
        }
    }

    /// Drops a reservation whose clone failed.
    pub fn abandon(&mut self, key: RefKey) {
        self.slots.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Identities already visited in one visitation pass.
#[derive(Default)]
pub struct VisitedRefs {
    seen: HashSet<RefKey>,
    keep_alive: Vec<Box<dyn Any>>,
}

impl VisitedRefs {
    /// Marks `key` as visited; returns `false` if it already was.
    pub fn mark<F>(&mut self, key: RefKey, keep: F) -> bool
    where
        F: FnOnce() -> Box<dyn Any>,
    {
        if self.seen.insert(key) {
            self.keep_alive.push(keep());
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.keep_alive.clear();
    }
}
