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


//! Method descriptors: the callable binder that turns a `(target, method)`
//! pair back into an invocable function.

use crate::error::Error;
use crate::pickler::core::Harness;
use crate::pickler::object::ObjectRef;
use crate::types::PicklerKind;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A function bound to its target, if any, ready to be invoked.
pub type BoundFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

type InstanceBinder = Arc<dyn Fn(&ObjectRef) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

enum MethodBody {
    // holds a BoundFn<A, R>
    Static(Box<dyn Any + Send + Sync>),
    Instance {
        target_type: TypeId,
        target_type_name: &'static str,
        binder: InstanceBinder,
    },
}

/// Describes one method that delegates can be bound to.
///
/// Descriptors are immutable and shared: a clone of a delegate refers to the
/// same descriptor as the original.
pub struct MethodInfo {
    declaring_type: String,
    name: String,
    signature: &'static str,
    signature_id: TypeId,
    body: MethodBody,
}

impl MethodInfo {
    pub fn new_static<A, R, F>(declaring_type: &str, name: &str, f: F) -> MethodInfo
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let bound: BoundFn<A, R> = Arc::new(f);
        MethodInfo {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            signature: type_name::<fn(A) -> R>(),
            signature_id: TypeId::of::<fn(A) -> R>(),
            body: MethodBody::Static(Box::new(bound)),
        }
    }

    /// Describes a method taking a receiver of type `C`. Binding it requires
    /// an object reference holding a `C`.
    pub fn new_instance<C, A, R, F>(declaring_type: &str, name: &str, f: F) -> MethodInfo
    where
        C: Send + Sync + 'static,
        A: 'static,
        R: 'static,
        F: Fn(&C, A) -> R + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let binder: InstanceBinder = Arc::new(move |target: &ObjectRef| {
            let receiver = Arc::clone(target).downcast::<C>().ok()?;
            let f = Arc::clone(&f);
            let bound: BoundFn<A, R> = Arc::new(move |args: A| f(&receiver, args));
            Some(Box::new(bound) as Box<dyn Any + Send + Sync>)
        });
        MethodInfo {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            signature: type_name::<fn(A) -> R>(),
            signature_id: TypeId::of::<fn(A) -> R>(),
            body: MethodBody::Instance {
                target_type: TypeId::of::<C>(),
                target_type_name: type_name::<C>(),
                binder,
            },
        }
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    pub fn full_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.name)
    }

    /// Binds this method into a callable of signature `Fn(A) -> R`.
    ///
    /// Static methods take no target and instance methods require one whose
    /// runtime type is the declared receiver type.
    pub fn bind<A: 'static, R: 'static>(
        &self,
        target: Option<&ObjectRef>,
    ) -> Result<BoundFn<A, R>, Error> {
        if TypeId::of::<fn(A) -> R>() != self.signature_id {
            return Err(Error::delegate_binding(format!(
                "method {} has signature `{}`, cannot bind it as `{}`",
                self.full_name(),
                self.signature,
                type_name::<fn(A) -> R>()
            )));
        }
        let erased = match (&self.body, target) {
            (MethodBody::Static(_), Some(_)) => {
                return Err(Error::delegate_binding(format!(
                    "static method {} cannot be bound to a target",
                    self.full_name()
                )))
            }
            (MethodBody::Static(bound), None) => {
                return bound
                    .downcast_ref::<BoundFn<A, R>>()
                    .cloned()
                    .ok_or_else(|| self.signature_mismatch::<A, R>());
            }
            (MethodBody::Instance { .. }, None) => {
                return Err(Error::delegate_binding(format!(
                    "instance method {} needs a target",
                    self.full_name()
                )))
            }
            (
                MethodBody::Instance {
                    target_type,
                    target_type_name,
                    binder,
                },
                Some(target),
            ) => {
                if (**target).type_id() != *target_type {
                    return Err(Error::delegate_binding(format!(
                        "method {} expects a target of type {}",
                        self.full_name(),
                        target_type_name
                    )));
                }
                binder(target).ok_or_else(|| {
                    Error::delegate_binding(format!(
                        "target of {} could not be bound",
                        self.full_name()
                    ))
                })?
            }
        };
        erased
            .downcast::<BoundFn<A, R>>()
            .map(|bound| *bound)
            .map_err(|_| self.signature_mismatch::<A, R>())
    }

    #[cold]
    fn signature_mismatch<A: 'static, R: 'static>(&self) -> Error {
        Error::delegate_binding(format!(
            "method {} cannot be bound as `{}`",
            self.full_name(),
            type_name::<fn(A) -> R>()
        ))
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("declaring_type", &self.declaring_type)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("is_static", &self.is_static())
            .finish()
    }
}

/// Registered method descriptors, keyed by full name.
#[derive(Default)]
pub struct MethodTable {
    methods: HashMap<String, Arc<MethodInfo>>,
}

impl MethodTable {
    pub fn insert(&mut self, method: MethodInfo) -> Result<Arc<MethodInfo>, Error> {
        let full_name = method.full_name();
        if self.methods.contains_key(&full_name) {
            return Err(Error::not_allowed(format!(
                "method {} is already registered",
                full_name
            )));
        }
        let method = Arc::new(method);
        self.methods.insert(full_name, Arc::clone(&method));
        Ok(method)
    }

    pub fn get(&self, declaring_type: &str, name: &str) -> Option<Arc<MethodInfo>> {
        self.methods
            .get(&format!("{}::{}", declaring_type, name))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Writes a method descriptor as its declaring type and name; reading looks
/// the pair up in the method table.
pub fn create_method_pickler(table: Arc<RwLock<MethodTable>>) -> Harness<Arc<MethodInfo>> {
    Harness::new(
        PicklerKind::Method,
        |state, _tag, method: &Arc<MethodInfo>| {
            state.writer.write_string(&method.declaring_type);
            state.writer.write_string(&method.name);
            Ok(())
        },
        move |state, _tag| {
            let declaring_type = state.reader.read_string()?;
            let name = state.reader.read_string()?;
            table.read().get(&declaring_type, &name).ok_or_else(|| {
                Error::delegate_binding(format!(
                    "unknown method {}::{}",
                    declaring_type, name
                ))
            })
        },
        |_state, method: &Arc<MethodInfo>| Ok(Arc::clone(method)),
        |_state, _method: &Arc<MethodInfo>| Ok(()),
    )
    .cache_by_ref(|method| Arc::as_ptr(method) as usize)
}
