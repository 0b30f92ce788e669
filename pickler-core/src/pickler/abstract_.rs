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


use crate::error::Error;
use crate::pickler::core::Harness;
use crate::pickler::util::Nullable;
use crate::types::PicklerKind;
use std::any::type_name;

/// Placeholder pickler of an abstract type that can only appear as a null
/// slot or behind a concrete subtype's own pickler.
///
/// Every operation on a concrete value fails. Visiting a null slot is the
/// one operation that succeeds, and it reports nothing to the visitor.
pub fn create_abstract_pickler<T: Nullable + 'static>() -> Harness<T> {
    Harness::new(
        PicklerKind::Abstract,
        |_state, _tag, _value: &T| Err(Error::abstract_type_misuse(type_name::<T>(), "write")),
        |_state, _tag| Err(Error::abstract_type_misuse(type_name::<T>(), "read")),
        |_state, _value: &T| Err(Error::abstract_type_misuse(type_name::<T>(), "clone")),
        |_state, value: &T| {
            if value.is_null() {
                Ok(())
            } else {
                Err(Error::abstract_type_misuse(type_name::<T>(), "accept"))
            }
        },
    )
    .reports_nodes(false)
}
