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
use crate::resolver::pickler_resolver::PicklerResolver;
use crate::types::PicklerKind;
use std::any::type_name;

/// Pickler for the present payload of an `Option<V>`.
///
/// Absence is handled one layer up by the null-slot helpers in
/// [`crate::pickler::util`]; a `None` reaching `write` is rejected.
pub fn create_nullable_pickler<V: 'static>(
    resolver: &mut PicklerResolver,
) -> Result<Harness<Option<V>>, Error> {
    let inner = resolver.resolve::<V>()?;
    let (read_inner, clone_inner, accept_inner) = (inner.clone(), inner.clone(), inner.clone());
    Ok(Harness::new(
        PicklerKind::Nullable,
        move |state, tag, value: &Option<V>| match value {
            Some(v) => inner.write(state, tag, v),
            None => Err(Error::invalid_data(format!(
                "absent {} reached the nullable pickler; write a null slot instead",
                type_name::<Option<V>>()
            ))),
        },
        move |state, tag| Ok(Some(read_inner.read(state, tag)?)),
        move |state, value: &Option<V>| match value {
            Some(v) => Ok(Some(clone_inner.clone_value(state, v)?)),
            None => Ok(None),
        },
        move |state, value: &Option<V>| match value {
            Some(v) => accept_inner.accept(state, v),
            None => Ok(()),
        },
    ))
}
