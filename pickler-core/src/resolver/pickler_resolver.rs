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


//! Type-keyed registry of pickler factories and cache of resolved picklers.
//!
//! Resolution is a two-phase fix point. Before a factory runs, a placeholder
//! pickler is cached under the type's key; a factory that asks for its own
//! type (directly or through another type) receives that placeholder. Once the
//! factory returns, its harness is bound into the placeholder, which is the
//! instance every later request gets.

use crate::error::Error;
use crate::pickler::abstract_::create_abstract_pickler;
use crate::pickler::core::{Harness, Pickler};
use crate::pickler::delegate::{create_delegate_pickler, DelegateType};
use crate::pickler::enum_::{create_enum_pickler, PickleEnum};
use crate::pickler::method::{create_method_pickler, MethodInfo, MethodTable};
use crate::pickler::nullable::create_nullable_pickler;
use crate::pickler::object::{create_object_pickler, ObjectRef, ObjectTypeTable};
use crate::pickler::primitive::{create_primitive_pickler, Primitive};
use crate::pickler::util::Nullable;
use crate::types::PicklerKind;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, trace, warn};

type ErasedFactory =
    Arc<dyn Fn(&mut PicklerResolver) -> Result<Box<dyn Any + Send + Sync>, Error> + Send + Sync>;

#[derive(Clone)]
struct FactoryEntry {
    type_name: &'static str,
    kind: PicklerKind,
    create: ErasedFactory,
}

static GLOBAL_RESOLVER: OnceLock<Mutex<PicklerResolver>> = OnceLock::new();

fn global_mutex() -> &'static Mutex<PicklerResolver> {
    GLOBAL_RESOLVER.get_or_init(|| Mutex::new(PicklerResolver::default()))
}

const RESET_GLOBAL_TIMEOUT: Duration = Duration::from_millis(500);

pub struct PicklerResolver {
    factories: HashMap<TypeId, FactoryEntry>,
    // values are `Pickler<T>` for the keyed `T`
    cache: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    // types cached since the outermost pending resolution started
    in_flight: Vec<TypeId>,
    objects: Arc<RwLock<ObjectTypeTable>>,
    methods: Arc<RwLock<MethodTable>>,
}

impl Default for PicklerResolver {
    fn default() -> Self {
        let mut resolver = PicklerResolver {
            factories: HashMap::new(),
            cache: HashMap::new(),
            in_flight: Vec::new(),
            objects: Arc::new(RwLock::new(ObjectTypeTable::default())),
            methods: Arc::new(RwLock::new(MethodTable::default())),
        };
        resolver.register_primitive::<bool>();
        resolver.register_primitive::<i8>();
        resolver.register_primitive::<i16>();
        resolver.register_primitive::<i32>();
        resolver.register_primitive::<i64>();
        resolver.register_primitive::<u8>();
        resolver.register_primitive::<u16>();
        resolver.register_primitive::<u32>();
        resolver.register_primitive::<u64>();
        resolver.register_primitive::<f32>();
        resolver.register_primitive::<f64>();
        resolver.register_primitive::<String>();

        let objects = Arc::clone(&resolver.objects);
        resolver.register_factory::<ObjectRef, _>(
            PicklerKind::Object,
            move |_resolver: &mut PicklerResolver| Ok(create_object_pickler(Arc::clone(&objects))),
        );
        let methods = Arc::clone(&resolver.methods);
        resolver.register_factory::<Arc<MethodInfo>, _>(
            PicklerKind::Method,
            move |_resolver: &mut PicklerResolver| Ok(create_method_pickler(Arc::clone(&methods))),
        );
        resolver
    }
}

impl PicklerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the process-wide resolver.
    ///
    /// The guard serializes cache misses across threads. Picklers obtained
    /// through it stay usable after the guard is dropped.
    pub fn global() -> MutexGuard<'static, PicklerResolver> {
        global_mutex().lock()
    }

    /// Replaces the process-wide resolver with a fresh one. Picklers handed
    /// out earlier keep working; new requests build new instances.
    ///
    /// Fails with [`Error::NotAllowed`] when the global guard stays held
    /// for longer than a short grace period, including by the caller.
    pub fn reset_global() -> Result<(), Error> {
        let mut global = global_mutex().try_lock_for(RESET_GLOBAL_TIMEOUT).ok_or_else(|| {
            Error::not_allowed("cannot reset the global pickler resolver while its guard is held")
        })?;
        *global = PicklerResolver::default();
        debug!("global pickler resolver reset");
        Ok(())
    }

    /// Returns the pickler of `T`, building it on first request.
    pub fn resolve<T: 'static>(&mut self) -> Result<Pickler<T>, Error> {
        let key = TypeId::of::<T>();
        if let Some(cached) = self.cache.get(&key) {
            return cached.downcast_ref::<Pickler<T>>().cloned().ok_or_else(|| {
                Error::type_error(format!("cached pickler for {} has another type", type_name::<T>()))
            });
        }
        let factory = match self.factories.get(&key) {
            Some(entry) => Arc::clone(&entry.create),
            None => {
                debug!(type_name = type_name::<T>(), "no pickler factory registered");
                return Err(Error::pickler_generation(
                    type_name::<T>(),
                    "no pickler factory is registered for this type",
                ));
            }
        };

        let placeholder = Pickler::<T>::placeholder();
        self.cache.insert(key, Box::new(placeholder.clone()));
        let mark = self.in_flight.len();
        self.in_flight.push(key);
        trace!(type_name = type_name::<T>(), depth = mark, "installed placeholder pickler");

        let built = factory(self).and_then(|erased| {
            erased.downcast::<Harness<T>>().map_err(|_| {
                Error::pickler_generation(type_name::<T>(), "factory produced a harness for another type")
            })
        });
        match built.and_then(|harness| placeholder.bind(*harness)) {
            Ok(()) => {
                if mark == 0 {
                    self.in_flight.clear();
                }
                if let Ok(kind) = placeholder.kind() {
                    debug!(type_name = type_name::<T>(), kind = %kind, "resolved pickler");
                }
                Ok(placeholder)
            }
            Err(err) => {
                // dependents cached after the placeholder may hold it
                for evicted in self.in_flight.drain(mark..) {
                    self.cache.remove(&evicted);
                }
                debug!(type_name = type_name::<T>(), error = %err, "pickler resolution failed");
                Err(err)
            }
        }
    }

    /// Registers the factory building the pickler of `T`, replacing any
    /// earlier one. A pickler already resolved for `T` is dropped from the
    /// cache; handles given out before keep the old harness.
    pub fn register_factory<T, F>(&mut self, kind: PicklerKind, factory: F)
    where
        T: 'static,
        F: Fn(&mut PicklerResolver) -> Result<Harness<T>, Error> + Send + Sync + 'static,
    {
        let key = TypeId::of::<T>();
        let create: ErasedFactory = Arc::new(move |resolver: &mut PicklerResolver| {
            factory(resolver).map(|harness| Box::new(harness) as Box<dyn Any + Send + Sync>)
        });
        let entry = FactoryEntry {
            type_name: type_name::<T>(),
            kind,
            create,
        };
        if let Some(previous) = self.factories.insert(key, entry) {
            warn!(
                type_name = previous.type_name,
                previous_kind = %previous.kind,
                kind = %kind,
                "replacing pickler factory"
            );
        }
        self.cache.remove(&key);
    }

    pub fn register_primitive<P: Primitive>(&mut self) {
        self.register_factory::<P, _>(PicklerKind::Primitive, |_resolver: &mut PicklerResolver| {
            Ok(create_primitive_pickler::<P>())
        });
    }

    pub fn register_enum<E: PickleEnum>(&mut self) {
        self.register_factory::<E, _>(PicklerKind::Enum, create_enum_pickler::<E>);
    }

    /// Registers the present-payload pickler of `Option<V>`.
    pub fn register_nullable<V: 'static>(&mut self) {
        self.register_factory::<Option<V>, _>(PicklerKind::Nullable, create_nullable_pickler::<V>);
    }

    pub fn register_delegate<D: DelegateType>(&mut self) {
        self.register_factory::<D, _>(PicklerKind::Delegate, create_delegate_pickler::<D>);
    }

    /// Registers the placeholder pickler of an abstract slot type.
    pub fn register_abstract<T: Nullable + 'static>(&mut self) {
        self.register_factory::<T, _>(PicklerKind::Abstract, |_resolver: &mut PicklerResolver| {
            Ok(create_abstract_pickler::<T>())
        });
    }

    /// Makes `C` usable behind an [`ObjectRef`] under `name`.
    ///
    /// The pickler of `C` is resolved now, so its factory must already be
    /// registered.
    pub fn register_object_type<C: Send + Sync + 'static>(&mut self, name: &str) -> Result<(), Error> {
        let pickler = self.resolve::<C>()?;
        self.objects.write().insert(name, pickler)?;
        debug!(name, type_name = type_name::<C>(), "registered object type");
        Ok(())
    }

    pub fn register_method(&mut self, method: MethodInfo) -> Result<Arc<MethodInfo>, Error> {
        let method = self.methods.write().insert(method)?;
        debug!(method = %method.full_name(), "registered method");
        Ok(method)
    }

    pub fn method(&self, declaring_type: &str, name: &str) -> Option<Arc<MethodInfo>> {
        self.methods.read().get(declaring_type, name)
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    pub fn is_resolved<T: 'static>(&self) -> bool {
        self.cache.contains_key(&TypeId::of::<T>())
    }

    pub fn registered_kind<T: 'static>(&self) -> Option<PicklerKind> {
        self.factories.get(&TypeId::of::<T>()).map(|entry| entry.kind)
    }

    /// Drops every resolved pickler. Registrations are kept.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.in_flight.clear();
    }
}
