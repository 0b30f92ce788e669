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


//! Opaque object references, dispatched on their runtime type.
//!
//! A concrete type becomes usable behind an [`ObjectRef`] once it is
//! registered under a stable name. The wire carries that name followed by the
//! payload written by the concrete type's own pickler.

use crate::error::Error;
use crate::pickler::core::{Harness, Pickler};
use crate::resolver::context::{CloneState, ReadState, VisitState, WriteState};
use crate::types::PicklerKind;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

pub type ObjectRef = Arc<dyn Any + Send + Sync>;

type ErasedWrite = Box<dyn Fn(&mut WriteState, &str, &ObjectRef) -> Result<(), Error> + Send + Sync>;
type ErasedRead = Box<dyn Fn(&mut ReadState<'_>, &str) -> Result<ObjectRef, Error> + Send + Sync>;
type ErasedClone = Box<dyn Fn(&mut CloneState, &ObjectRef) -> Result<ObjectRef, Error> + Send + Sync>;
type ErasedAccept = Box<dyn Fn(&mut VisitState<'_>, &ObjectRef) -> Result<(), Error> + Send + Sync>;

pub struct ObjectEntry {
    name: String,
    type_name: &'static str,
    write: ErasedWrite,
    read: ErasedRead,
    clone: ErasedClone,
    accept: ErasedAccept,
}

impl ObjectEntry {
    fn new<C: Send + Sync + 'static>(name: &str, pickler: Pickler<C>) -> ObjectEntry {
        let type_name = pickler.type_name();
        let (read_pickler, clone_pickler, accept_pickler) =
            (pickler.clone(), pickler.clone(), pickler.clone());
        ObjectEntry {
            name: name.to_string(),
            type_name,
            write: Box::new(move |state: &mut WriteState, tag: &str, value: &ObjectRef| {
                pickler.write(state, tag, downcast::<C>(value, type_name)?)
            }),
            read: Box::new(move |state: &mut ReadState<'_>, tag: &str| {
                Ok(Arc::new(read_pickler.read(state, tag)?) as ObjectRef)
            }),
            clone: Box::new(move |state: &mut CloneState, value: &ObjectRef| {
                let clone = clone_pickler.clone_value(state, downcast::<C>(value, type_name)?)?;
                Ok(Arc::new(clone) as ObjectRef)
            }),
            accept: Box::new(move |state: &mut VisitState<'_>, value: &ObjectRef| {
                accept_pickler.accept(state, downcast::<C>(value, type_name)?)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

fn downcast<'a, C: 'static>(value: &'a ObjectRef, type_name: &'static str) -> Result<&'a C, Error> {
    (**value)
        .downcast_ref::<C>()
        .ok_or_else(|| Error::type_error(format!("object reference does not hold a {}", type_name)))
}

/// Registered object types, keyed both ways.
#[derive(Default)]
pub struct ObjectTypeTable {
    by_type: HashMap<TypeId, Arc<ObjectEntry>>,
    by_name: HashMap<String, Arc<ObjectEntry>>,
}

impl ObjectTypeTable {
    pub fn insert<C: Send + Sync + 'static>(
        &mut self,
        name: &str,
        pickler: Pickler<C>,
    ) -> Result<(), Error> {
        let type_id = TypeId::of::<C>();
        if let Some(existing) = self.by_type.get(&type_id) {
            return Err(Error::not_allowed(format!(
                "{} is already registered as object type `{}`",
                existing.type_name, existing.name
            )));
        }
        if self.by_name.contains_key(name) {
            return Err(Error::not_allowed(format!(
                "object type name `{}` is already taken",
                name
            )));
        }
        let entry = Arc::new(ObjectEntry::new(name, pickler));
        self.by_type.insert(type_id, Arc::clone(&entry));
        self.by_name.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn get_by_value(&self, value: &ObjectRef) -> Option<Arc<ObjectEntry>> {
        self.by_type.get(&(**value).type_id()).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<ObjectEntry>> {
        self.by_name.get(name).cloned()
    }

    pub fn contains<C: 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<C>())
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

fn entry_for(table: &RwLock<ObjectTypeTable>, value: &ObjectRef) -> Result<Arc<ObjectEntry>, Error> {
    table.read().get_by_value(value).ok_or_else(|| {
        Error::pickler_generation(
            "ObjectRef",
            format!(
                "runtime type {:?} is not registered as an object type",
                (**value).type_id()
            ),
        )
    })
}

pub fn create_object_pickler(table: Arc<RwLock<ObjectTypeTable>>) -> Harness<ObjectRef> {
    let (read_table, clone_table, accept_table) =
        (Arc::clone(&table), Arc::clone(&table), Arc::clone(&table));
    Harness::new(
        PicklerKind::Object,
        move |state, tag, value: &ObjectRef| {
            let entry = entry_for(&table, value)?;
            state.writer.write_string(&entry.name);
            (entry.write)(state, tag, value)
        },
        move |state, tag| {
            let name = state.reader.read_string()?;
            let entry = read_table.read().get_by_name(&name).ok_or_else(|| {
                Error::pickler_generation(name.clone(), "no object type is registered under this name")
            })?;
            (entry.read)(state, tag)
        },
        move |state, value: &ObjectRef| {
            let entry = entry_for(&clone_table, value)?;
            (entry.clone)(state, value)
        },
        move |state, value: &ObjectRef| {
            let entry = entry_for(&accept_table, value)?;
            (entry.accept)(state, value)
        },
    )
    .cache_by_ref(|value| Arc::as_ptr(value) as *const () as usize)
    .use_with_subtypes(true)
}
