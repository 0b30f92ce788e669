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


use crate::config::Config;
use crate::error::Error;
use crate::pickler::core::Pickler;
use crate::resolver::context::{CloneState, PicklerVisitor, ReadState, VisitState, WriteState};
use crate::resolver::pickler_resolver::PicklerResolver;

/// Entry point owning a resolver and the session configuration.
///
/// # Examples
///
/// ```rust
/// use pickler_core::Pickling;
///
/// let mut pickling = Pickling::default().max_depth(64);
/// let bytes = pickling.serialize(&42i32).unwrap();
/// assert_eq!(pickling.deserialize::<i32>(&bytes).unwrap(), 42);
/// ```
///
/// Registration happens on the resolver:
///
/// ```rust
/// use pickler_core::{pickle_enum, Pickling};
///
/// pickle_enum! {
///     pub struct Level(u8) {
///         LOW = 0,
///         HIGH = 1,
///     }
/// }
///
/// let mut pickling = Pickling::default();
/// pickling.resolver_mut().register_enum::<Level>();
/// let copy = pickling.clone_graph(&Level::HIGH).unwrap();
/// assert_eq!(copy, Level::HIGH);
/// ```
#[derive(Default)]
pub struct Pickling {
    resolver: PicklerResolver,
    config: Config,
}

impl Pickling {
    pub fn new(config: Config) -> Self {
        Pickling {
            resolver: PicklerResolver::default(),
            config,
        }
    }

    /// Limits the nesting depth of one operation. Unlimited by default.
    ///
    /// Returns `self` for method chaining.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = Some(max_depth);
        self
    }

    /// Enables or disables reference flags for cache-by-reference picklers.
    /// Writer and reader must agree on this setting.
    ///
    /// Returns `self` for method chaining.
    pub fn track_ref(mut self, track_ref: bool) -> Self {
        self.config.track_ref = track_ref;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &PicklerResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut PicklerResolver {
        &mut self.resolver
    }

    pub fn pickler<T: 'static>(&mut self) -> Result<Pickler<T>, Error> {
        self.resolver.resolve::<T>()
    }

    pub fn serialize<T: 'static>(&mut self, value: &T) -> Result<Vec<u8>, Error> {
        let pickler = self.resolver.resolve::<T>()?;
        let mut state = WriteState::new(&self.config);
        pickler.write(&mut state, "value", value)?;
        Ok(state.into_bytes())
    }

    /// Reads one `T` that must span all of `bytes`.
    pub fn deserialize<T: 'static>(&mut self, bytes: &[u8]) -> Result<T, Error> {
        let pickler = self.resolver.resolve::<T>()?;
        let mut state = ReadState::new(bytes, &self.config);
        let value = pickler.read(&mut state, "value")?;
        let trailing = state.reader.remaining();
        if trailing != 0 {
            return Err(Error::invalid_data(format!(
                "{} trailing bytes after {}",
                trailing,
                pickler.type_name()
            )));
        }
        Ok(value)
    }

    pub fn clone_graph<T: 'static>(&mut self, value: &T) -> Result<T, Error> {
        let pickler = self.resolver.resolve::<T>()?;
        let mut state = CloneState::new(&self.config);
        pickler.clone_value(&mut state, value)
    }

    pub fn visit<T: 'static>(
        &mut self,
        value: &T,
        visitor: &mut dyn PicklerVisitor,
    ) -> Result<(), Error> {
        let pickler = self.resolver.resolve::<T>()?;
        let mut state = VisitState::new(visitor, &self.config);
        pickler.accept(&mut state, value)
    }
}
