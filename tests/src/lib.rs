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


//! Shared fixtures for the integration tests.

use pickler_core::pickler::{read_nullable_slot, write_nullable_slot};
use pickler_core::{
    pickle_enum, Delegate, Error, Harness, MethodInfo, PicklerKind, PicklerResolver, Pickling,
};
use std::cell::RefCell;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pickle_enum! {
    pub struct Color(i32) {
        RED = 0,
        GREEN = 1,
        BLUE = 2,
    }
}

/// Static callable with signature `i64 -> i64`.
pub type Step = Delegate<i64, i64>;
/// Journal entry callable with signature `String -> usize`.
pub type Logger = Delegate<String, usize>;

pub const STEPS: &str = "tests.Steps";
pub const COUNTER: &str = "tests.Counter";
pub const JOURNAL: &str = "tests.Journal";

thread_local! {
    static CALLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record_call(name: &'static str) {
    CALLS.with(|calls| calls.borrow_mut().push(name));
}

/// Drains the static step calls made on the current thread.
pub fn take_calls() -> Vec<&'static str> {
    CALLS.with(|calls| calls.borrow_mut().drain(..).collect())
}

pub fn add_one(x: i64) -> i64 {
    record_call("add_one");
    x + 1
}

pub fn double(x: i64) -> i64 {
    record_call("double");
    x * 2
}

pub fn negate(x: i64) -> i64 {
    record_call("negate");
    -x
}

#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn new(count: i64) -> Counter {
        Counter {
            count: AtomicI64::new(count),
        }
    }

    pub fn get(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn add(&self, n: i64) -> i64 {
        self.count.fetch_add(n, Ordering::SeqCst) + n
    }
}

#[derive(Debug, Default)]
pub struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    pub fn with_entries(entries: Vec<String>) -> Journal {
        Journal {
            entries: Mutex::new(entries),
        }
    }

    pub fn record(&self, entry: String) -> usize {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry);
        entries.len()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

/// Singly linked list resolved through `Chain -> Option<Box<Chain>> -> Box<Chain> -> Chain`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub value: i32,
    pub next: Option<Box<Chain>>,
}

impl Chain {
    pub fn with_len(len: usize) -> Chain {
        let mut chain = Chain {
            value: 0,
            next: None,
        };
        for value in 1..len as i32 {
            chain = Chain {
                value,
                next: Some(Box::new(chain)),
            };
        }
        chain
    }

    pub fn len(&self) -> usize {
        let mut len = 1;
        let mut node = self;
        while let Some(next) = &node.next {
            len += 1;
            node = next;
        }
        len
    }
}

// Drop iteratively so long chains do not overflow the stack.
impl Drop for Chain {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

pub fn register_counter(resolver: &mut PicklerResolver) {
    resolver.register_factory::<Counter, _>(PicklerKind::Record, |resolver: &mut PicklerResolver| {
        let count = resolver.resolve::<i64>()?;
        let (read_count, clone_count, accept_count) = (count.clone(), count.clone(), count.clone());
        Ok(Harness::new(
            PicklerKind::Record,
            move |state, _tag, counter: &Counter| count.write(state, "count", &counter.get()),
            move |state, _tag| Ok(Counter::new(read_count.read(state, "count")?)),
            move |state, counter: &Counter| {
                Ok(Counter::new(clone_count.clone_value(state, &counter.get())?))
            },
            move |state, counter: &Counter| accept_count.accept(state, &counter.get()),
        ))
    });
}

pub fn register_journal(resolver: &mut PicklerResolver) {
    resolver.register_factory::<Journal, _>(PicklerKind::Record, |resolver: &mut PicklerResolver| {
        let entry = resolver.resolve::<String>()?;
        let (read_entry, clone_entry, accept_entry) = (entry.clone(), entry.clone(), entry.clone());
        Ok(Harness::new(
            PicklerKind::Record,
            move |state, _tag, journal: &Journal| {
                let entries = journal.entries();
                state.writer.write_varuint32(entries.len() as u32);
                for e in &entries {
                    entry.write(state, "entry", e)?;
                }
                Ok(())
            },
            move |state, _tag| {
                let len = state.reader.read_varuint32()?;
                let mut entries = Vec::new();
                for _ in 0..len {
                    entries.push(read_entry.read(state, "entry")?);
                }
                Ok(Journal::with_entries(entries))
            },
            move |state, journal: &Journal| {
                let entries = journal
                    .entries()
                    .iter()
                    .map(|e| clone_entry.clone_value(state, e))
                    .collect::<Result<Vec<_>, Error>>()?;
                Ok(Journal::with_entries(entries))
            },
            move |state, journal: &Journal| {
                for e in &journal.entries() {
                    accept_entry.accept(state, e)?;
                }
                Ok(())
            },
        ))
    });
}

pub fn register_chain(resolver: &mut PicklerResolver) {
    resolver.register_factory::<Chain, _>(PicklerKind::Record, |resolver: &mut PicklerResolver| {
        let value = resolver.resolve::<i32>()?;
        let next = resolver.resolve::<Option<Box<Chain>>>()?;
        let (read_value, read_next) = (value.clone(), next.clone());
        let (clone_value, clone_next) = (value.clone(), next.clone());
        let (accept_value, accept_next) = (value.clone(), next.clone());
        Ok(Harness::new(
            PicklerKind::Record,
            move |state, _tag, chain: &Chain| {
                value.write(state, "value", &chain.value)?;
                write_nullable_slot(&next, state, "next", &chain.next)
            },
            move |state, _tag| {
                let value = read_value.read(state, "value")?;
                let next = read_nullable_slot(&read_next, state, "next")?;
                Ok(Chain { value, next })
            },
            move |state, chain: &Chain| {
                Ok(Chain {
                    value: clone_value.clone_value(state, &chain.value)?,
                    next: clone_next.clone_value(state, &chain.next)?,
                })
            },
            move |state, chain: &Chain| {
                accept_value.accept(state, &chain.value)?;
                accept_next.accept(state, &chain.next)
            },
        ))
    });
    resolver.register_nullable::<Box<Chain>>();
    resolver.register_factory::<Box<Chain>, _>(PicklerKind::Custom, |resolver: &mut PicklerResolver| {
        let chain = resolver.resolve::<Chain>()?;
        let (read_chain, clone_chain, accept_chain) = (chain.clone(), chain.clone(), chain.clone());
        Ok(Harness::new(
            PicklerKind::Custom,
            move |state, tag, boxed: &Box<Chain>| chain.write(state, tag, boxed),
            move |state, tag| Ok(Box::new(read_chain.read(state, tag)?)),
            move |state, boxed: &Box<Chain>| Ok(Box::new(clone_chain.clone_value(state, boxed)?)),
            move |state, boxed: &Box<Chain>| accept_chain.accept(state, boxed),
        ))
    });
}

pub fn register_methods(resolver: &mut PicklerResolver) -> Result<(), Error> {
    resolver.register_method(MethodInfo::new_static(STEPS, "add_one", add_one))?;
    resolver.register_method(MethodInfo::new_static(STEPS, "double", double))?;
    resolver.register_method(MethodInfo::new_static(STEPS, "negate", negate))?;
    resolver.register_method(MethodInfo::new_instance::<Counter, i64, i64, _>(
        COUNTER,
        "add",
        Counter::add,
    ))?;
    resolver.register_method(MethodInfo::new_instance::<Journal, String, usize, _>(
        JOURNAL,
        "first",
        |journal: &Journal, entry: String| journal.record(format!("first:{}", entry)),
    ))?;
    resolver.register_method(MethodInfo::new_instance::<Journal, String, usize, _>(
        JOURNAL,
        "second",
        |journal: &Journal, entry: String| journal.record(format!("second:{}", entry)),
    ))?;
    resolver.register_method(MethodInfo::new_instance::<Journal, String, usize, _>(
        JOURNAL,
        "third",
        |journal: &Journal, entry: String| journal.record(format!("third:{}", entry)),
    ))?;
    Ok(())
}

pub fn register_fixtures(resolver: &mut PicklerResolver) -> Result<(), Error> {
    resolver.register_enum::<Color>();
    resolver.register_nullable::<i32>();
    resolver.register_nullable::<Color>();
    register_counter(resolver);
    register_journal(resolver);
    register_chain(resolver);
    resolver.register_object_type::<Counter>(COUNTER)?;
    resolver.register_object_type::<Journal>(JOURNAL)?;
    resolver.register_delegate::<Step>();
    resolver.register_delegate::<Logger>();
    register_methods(resolver)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A `Pickling` with every fixture registered.
pub fn new_pickling() -> Pickling {
    init_tracing();
    let mut pickling = Pickling::default();
    register_fixtures(pickling.resolver_mut()).unwrap();
    pickling
}
