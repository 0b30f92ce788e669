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


use crate::error::Error;
use crate::pickler::core::Harness;
use crate::resolver::pickler_resolver::PicklerResolver;
use crate::types::PicklerKind;

/// An enumeration carried on the wire as its underlying integral value.
///
/// The conversion is total in both directions: values outside the named set
/// must survive a round trip unchanged. Use [`pickle_enum!`](crate::pickle_enum)
/// to declare such a type.
pub trait PickleEnum: Copy + Send + Sync + 'static {
    type Repr: Copy + Send + Sync + 'static;

    fn to_repr(self) -> Self::Repr;

    fn from_repr(repr: Self::Repr) -> Self;
}

pub fn create_enum_pickler<E: PickleEnum>(
    resolver: &mut PicklerResolver,
) -> Result<Harness<E>, Error> {
    let repr = resolver.resolve::<E::Repr>()?;
    let read_repr = repr.clone();
    Ok(Harness::new(
        PicklerKind::Enum,
        move |state, tag, value: &E| repr.write(state, tag, &value.to_repr()),
        // no range check, unnamed values are legal
        move |state, tag| Ok(E::from_repr(read_repr.read(state, tag)?)),
        |_state, value: &E| Ok(*value),
        |_state, _value: &E| Ok(()),
    ))
}

/// Declares an open enumeration: a transparent newtype over an integral type
/// with one associated constant per named value.
///
/// ```
/// use pickler_core::pickle_enum;
///
/// pickle_enum! {
///     pub struct Color(i32) {
///         RED = 0,
///         GREEN = 1,
///         BLUE = 2,
///     }
/// }
///
/// assert_eq!(Color::GREEN.name(), Some("GREEN"));
/// assert!(!Color(99).is_defined());
/// ```
#[macro_export]
macro_rules! pickle_enum {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($repr:ty) {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $vis struct $name(pub $repr);

        impl $name {
            $(
                $(#[$vmeta])*
                pub const $variant: $name = $name($value);
            )*

            /// Name of the constant holding this value, if any.
            #[allow(clippy::needless_return)]
            pub fn name(&self) -> Option<&'static str> {
                $(
                    if self.0 == $value {
                        return Some(stringify!($variant));
                    }
                )*
                None
            }

            pub fn is_defined(&self) -> bool {
                self.name().is_some()
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.name() {
                    Some(variant) => write!(f, "{}::{}", stringify!($name), variant),
                    None => write!(f, "{}({:?})", stringify!($name), self.0),
                }
            }
        }

        impl $crate::pickler::PickleEnum for $name {
            type Repr = $repr;

            #[inline(always)]
            fn to_repr(self) -> $repr {
                self.0
            }

            #[inline(always)]
            fn from_repr(repr: $repr) -> Self {
                $name(repr)
            }
        }
    };
}
