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


use pickler_core::pickler::{read_nullable_slot, write_nullable_slot};
use pickler_core::{Config, Error, PicklerKind, ReadState, WriteState};
use tests::{new_pickling, Color};

#[test]
fn present_roundtrip() {
    let mut pickling = new_pickling();
    let bytes = pickling.serialize(&Some(42i32)).unwrap();
    // only the payload, absence is decided one layer up
    assert_eq!(bytes, 42i32.to_le_bytes().to_vec());
    assert_eq!(pickling.deserialize::<Option<i32>>(&bytes).unwrap(), Some(42));
}

#[test]
fn present_enum_roundtrip() {
    let mut pickling = new_pickling();
    let bytes = pickling.serialize(&Some(Color(99))).unwrap();
    assert_eq!(
        pickling.deserialize::<Option<Color>>(&bytes).unwrap(),
        Some(Color(99))
    );
}

#[test]
fn absent_value_is_rejected_by_write() {
    let mut pickling = new_pickling();
    let err = pickling.serialize(&None::<i32>).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn clone_handles_both_states() {
    let mut pickling = new_pickling();
    assert_eq!(pickling.clone_graph(&Some(7i32)).unwrap(), Some(7));
    assert_eq!(pickling.clone_graph(&None::<i32>).unwrap(), None);
}

#[test]
fn visit_present_and_absent() {
    let mut pickling = new_pickling();
    let mut kinds = Vec::new();
    let mut record = |node: &pickler_core::VisitNode<'_>| {
        kinds.push(node.kind);
        true
    };
    pickling.visit(&Some(Color::RED), &mut record).unwrap();
    pickling.visit(&None::<Color>, &mut record).unwrap();
    assert_eq!(
        kinds,
        vec![
            PicklerKind::Nullable,
            PicklerKind::Enum,
            PicklerKind::Nullable
        ]
    );
}

#[test]
fn null_slot_helpers() {
    let mut pickling = new_pickling();
    let pickler = pickling.pickler::<Option<i32>>().unwrap();
    let config = Config::default();

    let mut state = WriteState::new(&config);
    write_nullable_slot(&pickler, &mut state, "first", &Some(5)).unwrap();
    write_nullable_slot(&pickler, &mut state, "second", &None).unwrap();
    let bytes = state.into_bytes();
    assert_eq!(bytes, vec![1, 5, 0, 0, 0, 0]);

    let mut state = ReadState::new(&bytes, &config);
    assert_eq!(read_nullable_slot(&pickler, &mut state, "first").unwrap(), Some(5));
    assert_eq!(read_nullable_slot(&pickler, &mut state, "second").unwrap(), None);
    assert_eq!(state.reader.remaining(), 0);
}
