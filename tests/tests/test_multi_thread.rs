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


use pickler_core::{Config, PicklerResolver, ReadState, WriteState};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tests::{new_pickling, take_calls, Color, Step, STEPS};

#[test]
fn test_shared_pickler_across_threads() {
    let mut pickling = new_pickling();
    let pickler = pickling.pickler::<Color>().unwrap();
    let config = Arc::new(pickling.config().clone());
    let src: HashSet<i32> = [0, 1, 2, 41, 42, 99].into_iter().collect();

    let mut handles = vec![];
    for value in &src {
        let pickler = pickler.clone();
        let config = Arc::clone(&config);
        let value = *value;
        handles.push(thread::spawn(move || {
            let mut state = WriteState::new(&config);
            pickler.write(&mut state, "color", &Color(value)).unwrap();
            let bytes = state.into_bytes();
            let mut state = ReadState::new(&bytes, &config);
            pickler.read(&mut state, "color").unwrap()
        }));
    }
    let dest: HashSet<i32> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().0)
        .collect();
    assert_eq!(dest, src);
}

#[test]
fn test_delegate_pickler_across_threads() {
    let mut pickling = new_pickling();
    let method = pickling.resolver().method(STEPS, "add_one").unwrap();
    let step = Step::from_static(method).unwrap();
    let bytes = Arc::new(pickling.serialize(&step).unwrap());
    let pickler = pickling.pickler::<Step>().unwrap();
    let config = Arc::new(pickling.config().clone());

    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let (pickler, config, bytes) = (pickler.clone(), Arc::clone(&config), Arc::clone(&bytes));
            thread::spawn(move || {
                let mut state = ReadState::new(&bytes, &config);
                let restored = pickler.read(&mut state, "value").unwrap();
                let result = restored.invoke(i);
                assert_eq!(take_calls(), vec!["add_one"]);
                result
            })
        })
        .collect();
    let results: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, (1..9).collect::<Vec<_>>());
}

#[test]
fn test_global_resolver_from_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| PicklerResolver::global().resolve::<u32>().unwrap()))
        .collect();
    let picklers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for pickler in &picklers[1..] {
        assert!(pickler.ptr_eq(&picklers[0]));
    }

    let config = Config::default();
    let mut state = WriteState::new(&config);
    picklers[3].write(&mut state, "n", &7).unwrap();
    assert_eq!(state.into_bytes(), vec![7, 0, 0, 0]);
}
