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


//! The pickler contract: one shared handle bundling write, read, clone and
//! accept for a single type.

use crate::error::Error;
use crate::resolver::context::{CloneState, ReadState, VisitNode, VisitState, WriteState};
use crate::resolver::ref_resolver::RefKey;
use crate::types::{PicklerKind, RefFlag};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock};

pub type WriteFn<T> = Box<dyn Fn(&mut WriteState, &str, &T) -> Result<(), Error> + Send + Sync>;
pub type ReadFn<T> = Box<dyn Fn(&mut ReadState<'_>, &str) -> Result<T, Error> + Send + Sync>;
pub type CloneFn<T> = Box<dyn Fn(&mut CloneState, &T) -> Result<T, Error> + Send + Sync>;
pub type AcceptFn<T> = Box<dyn Fn(&mut VisitState<'_>, &T) -> Result<(), Error> + Send + Sync>;

struct Identity<T> {
    address: fn(&T) -> usize,
    duplicate: fn(&T) -> T,
}

impl<T: 'static> Identity<T> {
    #[inline(always)]
    fn key(&self, value: &T) -> RefKey {
        (TypeId::of::<T>(), (self.address)(value))
    }

    #[inline(always)]
    fn keep(&self, value: &T) -> Box<dyn Any> {
        Box::new((self.duplicate)(value))
    }
}

/// The finished operations of a pickler, plus its classification metadata.
///
/// A harness is produced by a factory and bound exactly once into a
/// [`Pickler`].
pub struct Harness<T: 'static> {
    kind: PicklerKind,
    use_with_subtypes: bool,
    reports_nodes: bool,
    identity: Option<Identity<T>>,
    write_fn: WriteFn<T>,
    read_fn: ReadFn<T>,
    clone_fn: CloneFn<T>,
    accept_fn: AcceptFn<T>,
}

impl<T: 'static> Harness<T> {
    pub fn new<W, R, C, A>(kind: PicklerKind, write: W, read: R, clone: C, accept: A) -> Self
    where
        W: Fn(&mut WriteState, &str, &T) -> Result<(), Error> + Send + Sync + 'static,
        R: Fn(&mut ReadState<'_>, &str) -> Result<T, Error> + Send + Sync + 'static,
        C: Fn(&mut CloneState, &T) -> Result<T, Error> + Send + Sync + 'static,
        A: Fn(&mut VisitState<'_>, &T) -> Result<(), Error> + Send + Sync + 'static,
    {
        Harness {
            kind,
            use_with_subtypes: false,
            reports_nodes: true,
            identity: None,
            write_fn: Box::new(write),
            read_fn: Box::new(read),
            clone_fn: Box::new(clone),
            accept_fn: Box::new(accept),
        }
    }

    /// Tracks values by reference identity. `address` must return the same
    /// number for two handles that alias the same underlying value.
    ///
    /// Aliased values are then written once and restored as aliases, cloned
    /// once per clone session and visited once per visitation pass.
    pub fn cache_by_ref(mut self, address: fn(&T) -> usize) -> Self
    where
        T: Clone,
    {
        self.identity = Some(Identity {
            address,
            duplicate: T::clone,
        });
        self
    }

    pub fn use_with_subtypes(mut self, use_with_subtypes: bool) -> Self {
        self.use_with_subtypes = use_with_subtypes;
        self
    }

    /// Whether `accept` hands a node for each value to the visitor. When
    /// off, the accept function runs without the visitor seeing the value.
    pub fn reports_nodes(mut self, reports_nodes: bool) -> Self {
        self.reports_nodes = reports_nodes;
        self
    }

    pub fn kind(&self) -> PicklerKind {
        self.kind
    }

    pub fn is_cache_by_ref(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_use_with_subtypes(&self) -> bool {
        self.use_with_subtypes
    }
}

struct PicklerCell<T: 'static> {
    type_name: &'static str,
    harness: OnceLock<Harness<T>>,
}

/// Shared handle to the pickler of `T`.
///
/// Cloning the handle is cheap and every clone observes the same harness. A
/// handle created as a placeholder during recursive resolution becomes
/// functional as soon as the resolver binds the finished harness.
pub struct Pickler<T: 'static> {
    inner: Arc<PicklerCell<T>>,
}

impl<T: 'static> Clone for Pickler<T> {
    fn clone(&self) -> Self {
        Pickler {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for Pickler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Pickler");
        s.field("type_name", &self.inner.type_name);
        match self.inner.harness.get() {
            Some(h) => s
                .field("kind", &h.kind)
                .field("cache_by_ref", &h.is_cache_by_ref())
                .field("use_with_subtypes", &h.use_with_subtypes)
                .finish(),
            None => s.field("initialized", &false).finish(),
        }
    }
}

impl<T: 'static> Pickler<T> {
    /// Wraps an already finished harness.
    pub fn new(harness: Harness<T>) -> Self {
        Pickler {
            inner: Arc::new(PicklerCell {
                type_name: type_name::<T>(),
                harness: OnceLock::from(harness),
            }),
        }
    }

    pub(crate) fn placeholder() -> Self {
        Pickler {
            inner: Arc::new(PicklerCell {
                type_name: type_name::<T>(),
                harness: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn bind(&self, harness: Harness<T>) -> Result<(), Error> {
        self.inner
            .harness
            .set(harness)
            .map_err(|_| Error::pickler_generation(self.inner.type_name, "pickler is already bound"))
    }

    #[inline(always)]
    fn harness(&self) -> Result<&Harness<T>, Error> {
        self.inner.harness.get().ok_or_else(|| {
            Error::pickler_generation(
                self.inner.type_name,
                "pickler used before its construction completed",
            )
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.harness.get().is_some()
    }

    pub fn kind(&self) -> Result<PicklerKind, Error> {
        Ok(self.harness()?.kind)
    }

    pub fn cache_by_ref(&self) -> Result<bool, Error> {
        Ok(self.harness()?.is_cache_by_ref())
    }

    pub fn use_with_subtypes(&self) -> Result<bool, Error> {
        Ok(self.harness()?.use_with_subtypes)
    }

    /// Whether both handles share one pickler instance.
    pub fn ptr_eq(&self, other: &Pickler<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn write(&self, state: &mut WriteState, tag: &str, value: &T) -> Result<(), Error> {
        let harness = self.harness()?;
        state.depth.enter(self.inner.type_name)?;
        let result = Self::write_tracked(harness, state, tag, value);
        state.depth.leave();
        result
    }

    fn write_tracked(
        harness: &Harness<T>,
        state: &mut WriteState,
        tag: &str,
        value: &T,
    ) -> Result<(), Error> {
        if let Some(identity) = &harness.identity {
            if state.is_track_ref() {
                let key = identity.key(value);
                let is_back_ref =
                    state
                        .ref_writer
                        .try_write_ref(&mut state.writer, key, || identity.keep(value));
                if is_back_ref {
                    return Ok(());
                }
            }
        }
        (harness.write_fn)(state, tag, value)
    }

    pub fn read(&self, state: &mut ReadState<'_>, tag: &str) -> Result<T, Error> {
        let harness = self.harness()?;
        state.depth.enter(self.inner.type_name)?;
        let result = Self::read_tracked(harness, state, tag);
        state.depth.leave();
        result
    }

    fn read_tracked(harness: &Harness<T>, state: &mut ReadState<'_>, tag: &str) -> Result<T, Error> {
        let identity = match &harness.identity {
            Some(identity) if state.is_track_ref() => identity,
            _ => return (harness.read_fn)(state, tag),
        };
        let raw = state.reader.read_i8()?;
        match RefFlag::try_from(raw) {
            Ok(RefFlag::Ref) => {
                let ref_id = state.reader.read_u32()?;
                let cached = state.ref_reader.get_ref::<T>(ref_id)?;
                Ok((identity.duplicate)(cached))
            }
            Ok(RefFlag::RefValue) => {
                let ref_id = state.ref_reader.reserve_ref_id();
                let value = (harness.read_fn)(state, tag)?;
                state.ref_reader.store_ref(ref_id, identity.keep(&value));
                Ok(value)
            }
            Err(_) => Err(Error::invalid_data(format!(
                "unknown ref flag {} before {}",
                raw,
                type_name::<T>()
            ))),
        }
    }

    /// Produces an independent structural copy of `value`.
    pub fn clone_value(&self, state: &mut CloneState, value: &T) -> Result<T, Error> {
        let harness = self.harness()?;
        state.depth.enter(self.inner.type_name)?;
        let result = Self::clone_tracked(harness, state, value);
        state.depth.leave();
        result
    }

    fn clone_tracked(harness: &Harness<T>, state: &mut CloneState, value: &T) -> Result<T, Error> {
        let identity = match &harness.identity {
            Some(identity) => identity,
            None => return (harness.clone_fn)(state, value),
        };
        let key = identity.key(value);
        if let Some(done) = state.refs.get::<T>(key)? {
            return Ok((identity.duplicate)(done));
        }
        state.refs.reserve(key, identity.keep(value));
        match (harness.clone_fn)(state, value) {
            Ok(clone) => {
                state.refs.fill(key, identity.keep(&clone));
                Ok(clone)
            }
            Err(e) => {
                state.refs.abandon(key);
                Err(e)
            }
        }
    }

    /// Reports `value` to the visitor, then walks the same constituents
    /// `write` would serialize unless the visitor declines.
    pub fn accept(&self, state: &mut VisitState<'_>, value: &T) -> Result<(), Error> {
        let harness = self.harness()?;
        if let Some(identity) = &harness.identity {
            if !state
                .visited
                .mark(identity.key(value), || identity.keep(value))
            {
                return Ok(());
            }
        }
        state.depth.enter(self.inner.type_name)?;
        if !harness.reports_nodes {
            let result = (harness.accept_fn)(state, value);
            state.depth.leave();
            return result;
        }
        let node = VisitNode {
            type_name: self.inner.type_name,
            kind: harness.kind,
            value: value as &dyn Any,
        };
        let result = if state.visitor.visit(&node) {
            (harness.accept_fn)(state, value)
        } else {
            Ok(())
        };
        state.depth.leave();
        result
    }
}
