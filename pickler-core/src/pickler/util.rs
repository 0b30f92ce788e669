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


//! Null-slot helpers: the outer layer that decides whether a pickler is
//! invoked at all for a possibly absent value.

use crate::error::Error;
use crate::pickler::core::Pickler;
use crate::resolver::context::{ReadState, WriteState};

/// A slot type with a distinguished null value.
pub trait Nullable: Sized {
    fn null() -> Self;

    fn is_null(&self) -> bool;
}

impl<T> Nullable for Option<T> {
    #[inline(always)]
    fn null() -> Self {
        None
    }

    #[inline(always)]
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

/// Writes a presence flag, then `value` through `pickler` if it is not null.
pub fn write_nullable_slot<T: Nullable + 'static>(
    pickler: &Pickler<T>,
    state: &mut WriteState,
    tag: &str,
    value: &T,
) -> Result<(), Error> {
    if value.is_null() {
        state.writer.write_bool(false);
        return Ok(());
    }
    state.writer.write_bool(true);
    pickler.write(state, tag, value)
}

/// Mirror of [`write_nullable_slot`].
pub fn read_nullable_slot<T: Nullable + 'static>(
    pickler: &Pickler<T>,
    state: &mut ReadState<'_>,
    tag: &str,
) -> Result<T, Error> {
    if state.reader.read_bool()? {
        pickler.read(state, tag)
    } else {
        Ok(T::null())
    }
}
