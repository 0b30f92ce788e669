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


use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::resolver::ref_resolver::{CloneRefs, RefReader, RefWriter, VisitedRefs};
use crate::types::PicklerKind;
use std::any::Any;

/// Nesting guard shared by all four operation states.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth {
    current: u32,
    max: u32,
}

impl Depth {
    pub(crate) fn new(max: Option<u32>) -> Self {
        Depth {
            current: 0,
            max: max.unwrap_or(u32::MAX),
        }
    }

    #[inline(always)]
    pub(crate) fn enter(&mut self, type_name: &'static str) -> Result<(), Error> {
        if self.current >= self.max {
            return Err(Error::depth_exceed(format!(
                "maximum nesting depth {} exceeded at {}",
                self.max, type_name
            )));
        }
        self.current += 1;
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn leave(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub(crate) fn current(&self) -> u32 {
        self.current
    }
}

/// State of one write operation.
pub struct WriteState {
    pub writer: Writer,
    pub(crate) ref_writer: RefWriter,
    track_ref: bool,
    pub(crate) depth: Depth,
}

impl WriteState {
    pub fn new(config: &Config) -> WriteState {
        WriteState {
            writer: Writer::default(),
            ref_writer: RefWriter::new(),
            track_ref: config.is_track_ref(),
            depth: Depth::new(config.max_depth()),
        }
    }

    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.track_ref
    }

    pub fn depth(&self) -> u32 {
        self.depth.current()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    pub fn reset(&mut self) {
        self.writer.reset();
        self.ref_writer.clear();
        self.depth = Depth::new(Some(self.depth.max));
    }
}

/// State of one read operation over a borrowed byte slice.
pub struct ReadState<'a> {
    pub reader: Reader<'a>,
    pub(crate) ref_reader: RefReader,
    track_ref: bool,
    pub(crate) depth: Depth,
}

impl<'a> ReadState<'a> {
    pub fn new(bytes: &'a [u8], config: &Config) -> ReadState<'a> {
        ReadState {
            reader: Reader::new(bytes),
            ref_reader: RefReader::new(),
            track_ref: config.is_track_ref(),
            depth: Depth::new(config.max_depth()),
        }
    }

    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.track_ref
    }

    pub fn depth(&self) -> u32 {
        self.depth.current()
    }
}

/// State of one clone session.
///
/// Cloning the same cache-by-reference source twice within a session yields
/// the same clone, so aliasing in the source graph is preserved in the copy.
pub struct CloneState {
    pub(crate) refs: CloneRefs,
    pub(crate) depth: Depth,
}

impl CloneState {
    pub fn new(config: &Config) -> CloneState {
        CloneState {
            refs: CloneRefs::default(),
            depth: Depth::new(config.max_depth()),
        }
    }

    /// Number of distinct reference identities cloned so far.
    pub fn tracked_refs(&self) -> usize {
        self.refs.len()
    }
}

/// One node reported to a [`PicklerVisitor`].
pub struct VisitNode<'a> {
    pub type_name: &'static str,
    pub kind: PicklerKind,
    pub value: &'a dyn Any,
}

impl<'a> VisitNode<'a> {
    pub fn downcast_ref<T: 'static>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

/// Caller-supplied accumulator driven by `accept`.
///
/// Returning `false` skips the children of the reported node.
pub trait PicklerVisitor {
    fn visit(&mut self, node: &VisitNode<'_>) -> bool;
}

impl<F> PicklerVisitor for F
where
    F: FnMut(&VisitNode<'_>) -> bool,
{
    fn visit(&mut self, node: &VisitNode<'_>) -> bool {
        self(node)
    }
}

/// State of one visitation pass.
pub struct VisitState<'v> {
    pub(crate) visitor: &'v mut dyn PicklerVisitor,
    pub(crate) visited: VisitedRefs,
    pub(crate) depth: Depth,
}

impl<'v> VisitState<'v> {
    pub fn new(visitor: &'v mut dyn PicklerVisitor, config: &Config) -> VisitState<'v> {
        VisitState {
            visitor,
            visited: VisitedRefs::default(),
            depth: Depth::new(config.max_depth()),
        }
    }

    pub fn visitor(&mut self) -> &mut dyn PicklerVisitor {
        &mut *self.visitor
    }
}
