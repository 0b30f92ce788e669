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


pub mod abstract_;
pub mod core;
pub mod delegate;
pub mod enum_;
pub mod method;
pub mod nullable;
pub mod object;
pub mod primitive;
pub mod util;

pub use self::abstract_::create_abstract_pickler;
pub use self::core::{AcceptFn, CloneFn, Harness, Pickler, ReadFn, WriteFn};
pub use self::delegate::{create_delegate_pickler, Delegate, DelegateType, Invocation};
pub use self::enum_::{create_enum_pickler, PickleEnum};
pub use self::method::{create_method_pickler, BoundFn, MethodInfo, MethodTable};
pub use self::nullable::create_nullable_pickler;
pub use self::object::{create_object_pickler, ObjectRef, ObjectTypeTable};
pub use self::primitive::{create_primitive_pickler, Primitive};
pub use self::util::{read_nullable_slot, write_nullable_slot, Nullable};
