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


use pickler_core::{Error, PicklerKind, PicklerResolver, Pickling};
use tests::{register_fixtures, Color};

// Kept alone in this binary: resetting the global resolver would race with
// other tests using it.
#[test]
fn test_global_lifecycle() {
    let first = {
        let mut global = PicklerResolver::global();
        global.register_enum::<Color>();
        global.resolve::<Color>().unwrap()
    };
    let again = PicklerResolver::global().resolve::<Color>().unwrap();
    assert!(first.ptr_eq(&again));

    {
        let _held = PicklerResolver::global();
        let err = PicklerResolver::reset_global().unwrap_err();
        assert!(matches!(err, Error::NotAllowed(_)), "{}", err);
    }
    assert!(PicklerResolver::global().is_registered::<Color>());

    PicklerResolver::reset_global().unwrap();
    assert!(!PicklerResolver::global().is_registered::<Color>());
    assert!(PicklerResolver::global().resolve::<Color>().is_err());

    {
        let mut global = PicklerResolver::global();
        register_fixtures(&mut global).unwrap();
    }
    let fresh = PicklerResolver::global().resolve::<Color>().unwrap();
    assert!(!fresh.ptr_eq(&first));
    assert_eq!(first.kind().unwrap(), PicklerKind::Enum);

    // handles from the old resolver keep working
    let mut pickling = Pickling::default();
    pickling.resolver_mut().register_enum::<Color>();
    let bytes = pickling.serialize(&Color::BLUE).unwrap();
    let config = pickling.config().clone();
    let mut state = pickler_core::ReadState::new(&bytes, &config);
    assert_eq!(first.read(&mut state, "color").unwrap(), Color::BLUE);
}
