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


use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Marker written before the payload of a cache-by-reference value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    // Ref points back to a value already written in this session; its
    // reference id follows as a u32.
    Ref = -2,
    // RefValue introduces a value seen for the first time; its payload follows.
    RefValue = 0,
}

/// Classification tag of a pickler: which construct it serializes.
///
/// The resolver selects one shape per type when the type's factory is
/// registered and never re-decides it per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PicklerKind {
    /// Built-in scalar or string.
    Primitive,
    /// Ordinary field-based record.
    Record,
    /// Enumeration over an integral representation.
    Enum,
    /// Present-payload codec of an optional value.
    Nullable,
    /// Single or multicast function reference.
    Delegate,
    /// Opaque object reference dispatched on its runtime type.
    Object,
    /// Method descriptor.
    Method,
    /// Permanently failing stand-in for an abstract type.
    Abstract,
    /// User supplied pickler.
    Custom,
}

impl PicklerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PicklerKind::Primitive => "primitive",
            PicklerKind::Record => "record",
            PicklerKind::Enum => "enum",
            PicklerKind::Nullable => "nullable",
            PicklerKind::Delegate => "delegate",
            PicklerKind::Object => "object",
            PicklerKind::Method => "method",
            PicklerKind::Abstract => "abstract",
            PicklerKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for PicklerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
