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


//! # Pickler Core
//!
//! Type-directed pickler composition. For a runtime type `T` the resolver
//! produces one [`Pickler<T>`] bundling four operations that walk the value
//! the same way:
//!
//! - **write** serializes to bytes,
//! - **read** deserializes from bytes,
//! - **clone** builds an independent structural copy,
//! - **accept** reports the value and its constituents to a visitor.
//!
//! Picklers are assembled from combinators that call back into the resolver
//! for their constituent types:
//!
//! - enumerations over an integral representation ([`PickleEnum`]),
//! - optional values ([`pickler::nullable`]),
//! - multicast function references ([`Delegate`]) bound to registered
//!   [`MethodInfo`] descriptors and opaque [`ObjectRef`] targets,
//! - placeholders for abstract slot types ([`pickler::abstract_`]).
//!
//! Types that refer to themselves, directly or through other types, resolve
//! to a fixed point: while `T` is being built, requests for `T` receive a
//! placeholder that becomes the finished pickler once construction completes.
//!
//! ## Example
//!
//! ```rust
//! use pickler_core::{pickle_enum, Pickling};
//!
//! pickle_enum! {
//!     pub struct Color(i32) {
//!         RED = 0,
//!         GREEN = 1,
//!     }
//! }
//!
//! let mut pickling = Pickling::default();
//! pickling.resolver_mut().register_enum::<Color>();
//! let bytes = pickling.serialize(&Color(99)).unwrap();
//! assert_eq!(pickling.deserialize::<Color>(&bytes).unwrap(), Color(99));
//! ```
//!
//! ## Debugging
//!
//! Build with `PICKLER_PANIC_ON_ERROR=1` to panic where an error is created,
//! and enable `tracing` at `debug` level to follow resolution.

pub mod buffer;
pub mod config;
pub mod error;
pub mod pickler;
pub mod pickling;
pub mod resolver;
pub mod types;

pub use config::Config;
pub use error::Error;
pub use pickler::{
    Delegate, DelegateType, Harness, MethodInfo, Nullable, ObjectRef, PickleEnum, Pickler,
};
pub use pickling::Pickling;
pub use resolver::context::{
    CloneState, PicklerVisitor, ReadState, VisitNode, VisitState, WriteState,
};
pub use resolver::pickler_resolver::PicklerResolver;
pub use types::PicklerKind;
