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


use crate::ensure;
use crate::error::Error;
use crate::pickler::core::{Harness, Pickler};
use crate::pickler::method::{BoundFn, MethodInfo};
use crate::pickler::object::ObjectRef;
use crate::resolver::context::{CloneState, ReadState, VisitState, WriteState};
use crate::resolver::pickler_resolver::PicklerResolver;
use crate::types::PicklerKind;
use std::fmt;
use std::sync::Arc;

/// One `(target, method)` binding of a delegate.
pub struct Invocation<A, R> {
    method: Arc<MethodInfo>,
    target: Option<ObjectRef>,
    call: BoundFn<A, R>,
}

impl<A, R> Clone for Invocation<A, R> {
    fn clone(&self) -> Self {
        Invocation {
            method: Arc::clone(&self.method),
            target: self.target.clone(),
            call: Arc::clone(&self.call),
        }
    }
}

impl<A, R> Invocation<A, R> {
    pub fn method(&self) -> &Arc<MethodInfo> {
        &self.method
    }

    pub fn target(&self) -> Option<&ObjectRef> {
        self.target.as_ref()
    }
}

/// A multicast function reference: an ordered, non-empty list of bound
/// invocations sharing the signature `Fn(A) -> R`.
pub struct Delegate<A, R> {
    invocations: Arc<[Invocation<A, R>]>,
}

impl<A, R> Clone for Delegate<A, R> {
    fn clone(&self) -> Self {
        Delegate {
            invocations: Arc::clone(&self.invocations),
        }
    }
}

impl<A, R> fmt::Debug for Delegate<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.invocations.iter().map(|i| i.method.full_name()))
            .finish()
    }
}

impl<A: 'static, R: 'static> Delegate<A, R> {
    pub fn bind(target: Option<ObjectRef>, method: Arc<MethodInfo>) -> Result<Self, Error> {
        let call = method.bind::<A, R>(target.as_ref())?;
        Ok(Delegate {
            invocations: Arc::from(vec![Invocation {
                method,
                target,
                call,
            }]),
        })
    }

    pub fn from_static(method: Arc<MethodInfo>) -> Result<Self, Error> {
        Self::bind(None, method)
    }

    pub fn from_instance(target: ObjectRef, method: Arc<MethodInfo>) -> Result<Self, Error> {
        Self::bind(Some(target), method)
    }

    /// Concatenates the invocation lists of `delegates`, in order.
    pub fn combine<I>(delegates: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Delegate<A, R>>,
    {
        let invocations: Vec<Invocation<A, R>> = delegates
            .into_iter()
            .flat_map(|d| d.invocations.iter().cloned().collect::<Vec<_>>())
            .collect();
        ensure!(
            !invocations.is_empty(),
            Error::delegate_binding("cannot combine an empty invocation list")
        );
        Ok(Delegate {
            invocations: Arc::from(invocations),
        })
    }
}

impl<A, R> Delegate<A, R> {
    pub fn invocations(&self) -> &[Invocation<A, R>] {
        &self.invocations
    }

    /// Splits into single-binding delegates, one per invocation.
    pub fn invocation_list(&self) -> Vec<Delegate<A, R>> {
        self.invocations
            .iter()
            .map(|i| Delegate {
                invocations: Arc::from(vec![i.clone()]),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    // never true for a delegate built through `bind` or `combine`
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Method of the last binding.
    pub fn method(&self) -> Option<&Arc<MethodInfo>> {
        self.invocations.last().map(|i| &i.method)
    }

    /// Target of the last binding.
    pub fn target(&self) -> Option<&ObjectRef> {
        self.invocations.last().and_then(|i| i.target.as_ref())
    }

    /// Whether both delegates share one invocation list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.invocations, &other.invocations)
    }

    /// Calls every binding in order and returns the last result.
    pub fn invoke(&self, args: A) -> R
    where
        A: Clone,
    {
        let Some((last, init)) = self.invocations.split_last() else {
            unreachable!("delegates always hold at least one invocation")
        };
        for invocation in init {
            (invocation.call)(args.clone());
        }
        (last.call)(args)
    }
}

/// The capabilities the delegate combinator needs from a delegate type.
pub trait DelegateType: Clone + Send + Sync + 'static {
    fn invocation_list(&self) -> Vec<Self>;

    /// The sole binding, or `None` for a multicast delegate.
    fn single_binding(&self) -> Option<(&Arc<MethodInfo>, Option<&ObjectRef>)>;

    fn bind(target: Option<ObjectRef>, method: Arc<MethodInfo>) -> Result<Self, Error>;

    fn combine(delegates: Vec<Self>) -> Result<Self, Error>;

    /// Address identifying the shared invocation list.
    fn identity(&self) -> usize;
}

impl<A: 'static, R: 'static> DelegateType for Delegate<A, R> {
    fn invocation_list(&self) -> Vec<Self> {
        Delegate::invocation_list(self)
    }

    fn single_binding(&self) -> Option<(&Arc<MethodInfo>, Option<&ObjectRef>)> {
        match &*self.invocations {
            [only] => Some((&only.method, only.target.as_ref())),
            _ => None,
        }
    }

    fn bind(target: Option<ObjectRef>, method: Arc<MethodInfo>) -> Result<Self, Error> {
        Delegate::bind(target, method)
    }

    fn combine(delegates: Vec<Self>) -> Result<Self, Error> {
        Delegate::combine(delegates)
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.invocations) as *const () as usize
    }
}

struct DelegateCodec<D: 'static> {
    targets: Pickler<ObjectRef>,
    methods: Pickler<Arc<MethodInfo>>,
    linked: Pickler<D>,
}

impl<D: DelegateType> DelegateCodec<D> {
    fn write(&self, state: &mut WriteState, value: &D) -> Result<(), Error> {
        if let Some((method, target)) = value.single_binding() {
            state.writer.write_bool(false);
            self.methods.write(state, "method", method)?;
            if !method.is_static() {
                let target = target.ok_or_else(|| {
                    Error::delegate_binding(format!(
                        "instance method {} has no target",
                        method.full_name()
                    ))
                })?;
                self.targets.write(state, "target", target)?;
            }
            return Ok(());
        }
        let linked = value.invocation_list();
        ensure!(
            !linked.is_empty(),
            Error::delegate_binding("cannot write an empty invocation list")
        );
        let count = invocation_count(linked.len())?;
        state.writer.write_bool(true);
        state.writer.write_i32(count);
        for delegate in &linked {
            self.linked.write(state, "linked", delegate)?;
        }
        Ok(())
    }

    fn read(&self, state: &mut ReadState<'_>) -> Result<D, Error> {
        let is_multicast = state.reader.read_bool()?;
        if !is_multicast {
            let method = self.methods.read(state, "method")?;
            let target = if method.is_static() {
                None
            } else {
                Some(self.targets.read(state, "target")?)
            };
            return D::bind(target, method);
        }
        let count = state.reader.read_i32()?;
        ensure!(
            count > 0,
            Error::invalid_data(format!("invalid invocation count {}", count))
        );
        let mut linked = Vec::with_capacity((count as usize).min(state.reader.remaining()));
        for _ in 0..count {
            linked.push(self.linked.read(state, "linked")?);
        }
        D::combine(linked)
    }

    fn clone_value(&self, state: &mut CloneState, value: &D) -> Result<D, Error> {
        if let Some((method, target)) = value.single_binding() {
            let target = match target {
                Some(target) => Some(self.targets.clone_value(state, target)?),
                None => None,
            };
            return D::bind(target, Arc::clone(method));
        }
        let linked = value
            .invocation_list()
            .iter()
            .map(|delegate| self.linked.clone_value(state, delegate))
            .collect::<Result<Vec<_>, Error>>()?;
        D::combine(linked)
    }

    fn accept(&self, state: &mut VisitState<'_>, value: &D) -> Result<(), Error> {
        if let Some((method, target)) = value.single_binding() {
            self.methods.accept(state, method)?;
            if let (false, Some(target)) = (method.is_static(), target) {
                self.targets.accept(state, target)?;
            }
            return Ok(());
        }
        for delegate in &value.invocation_list() {
            self.linked.accept(state, delegate)?;
        }
        Ok(())
    }
}

pub fn create_delegate_pickler<D: DelegateType>(
    resolver: &mut PicklerResolver,
) -> Result<Harness<D>, Error> {
    let codec = Arc::new(DelegateCodec {
        targets: resolver.resolve::<ObjectRef>()?,
        methods: resolver.resolve::<Arc<MethodInfo>>()?,
        linked: resolver.resolve::<D>()?,
    });
    let (read_codec, clone_codec, accept_codec) =
        (Arc::clone(&codec), Arc::clone(&codec), Arc::clone(&codec));
    Ok(Harness::new(
        PicklerKind::Delegate,
        move |state, _tag, value: &D| codec.write(state, value),
        move |state, _tag| read_codec.read(state),
        move |state, value: &D| clone_codec.clone_value(state, value),
        move |state, value: &D| accept_codec.accept(state, value),
    )
    .cache_by_ref(D::identity))
}

fn invocation_count(len: usize) -> Result<i32, Error> {
    i32::try_from(len)
        .map_err(|_| Error::invalid_data(format!("invocation list of {} entries is too long", len)))
}
