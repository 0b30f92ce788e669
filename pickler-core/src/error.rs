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

//! Error type shared by every pickler operation.
//!
//! Error constructors sit on the cold path of every buffer access and every
//! pickler call, so they are marked `#[cold]` and `#[track_caller]` to keep
//! the successful paths lean.

use std::borrow::Cow;

use thiserror::Error;

/// Set `PICKLER_PANIC_ON_ERROR` at compile time to make every error
/// constructor panic at the creation site.
pub const PANIC_ON_ERROR: bool = option_env!("PICKLER_PANIC_ON_ERROR").is_some();

/// Error type for pickler resolution and for the four pickler operations.
///
/// # Always use the static constructors
///
/// Do **not** build variants with the enum syntax; call the constructor
/// functions instead. They accept anything convertible into
/// `Cow<'static, str>` and honor `PICKLER_PANIC_ON_ERROR`.
///
/// ```rust
/// use pickler_core::error::Error;
///
/// let err = Error::pickler_generation("my_crate::Shape", "no accessible constructor");
/// let err = Error::invalid_data(format!("Invalid value: {}", 42));
/// let err = Error::delegate_binding("signature mismatch");
/// ```
///
/// ## Debug mode
///
/// ```bash
/// RUST_BACKTRACE=1 PICKLER_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// With the variable set at compile time, any error created through a
/// constructor panics immediately, which pinpoints where it originated.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A pickler could not be generated for a type.
    ///
    /// Do not construct this variant directly; use [`Error::pickler_generation`] instead.
    #[error("cannot generate pickler for type `{type_name}`: {reason}")]
    PicklerGeneration {
        type_name: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    /// A method descriptor could not be rebound into a delegate.
    ///
    /// Do not construct this variant directly; use [`Error::delegate_binding`] instead.
    #[error("delegate binding failed: {0}")]
    DelegateBinding(Cow<'static, str>),

    /// A concrete value reached the placeholder pickler of an abstract type.
    ///
    /// Do not construct this variant directly; use [`Error::abstract_type_misuse`] instead.
    #[error(
        "{operation} reached the placeholder pickler of abstract type `{type_name}`; \
         concrete values must be dispatched to their subtype pickler"
    )]
    AbstractTypeMisuse {
        type_name: Cow<'static, str>,
        operation: &'static str,
    },

    /// Buffer boundary violation during a read.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Invalid or corrupted data encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// Invalid reference id encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_ref`] instead.
    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    /// General type-related error.
    ///
    /// Do not construct this variant directly; use [`Error::type_error`] instead.
    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// Error in text encoding.
    ///
    /// Do not construct this variant directly; use [`Error::encoding_error`] instead.
    #[error("{0}")]
    EncodingError(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Operation not allowed in the current state.
    ///
    /// Do not construct this variant directly; use [`Error::not_allowed`] instead.
    #[error("{0}")]
    NotAllowed(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::PicklerGeneration`] naming the type and the reason.
    ///
    /// ```
    /// use pickler_core::error::Error;
    ///
    /// let err = Error::pickler_generation("app::Node", "no pickler factory is registered");
    /// assert!(err.to_string().contains("app::Node"));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn pickler_generation<N, R>(type_name: N, reason: R) -> Self
    where
        N: Into<Cow<'static, str>>,
        R: Into<Cow<'static, str>>,
    {
        let err = Error::PicklerGeneration {
            type_name: type_name.into(),
            reason: reason.into(),
        };
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DelegateBinding`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn delegate_binding<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DelegateBinding(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::AbstractTypeMisuse`] for `operation`
    /// (`"write"`, `"read"`, `"clone"` or `"accept"`).
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn abstract_type_misuse<N: Into<Cow<'static, str>>>(
        type_name: N,
        operation: &'static str,
    ) -> Self {
        let err = Error::AbstractTypeMisuse {
            type_name: type_name.into(),
            operation,
        };
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    ///
    /// ```
    /// use pickler_core::error::Error;
    ///
    /// let err = Error::buffer_out_of_bound(10, 20, 25);
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidData`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidData(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidRef`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_ref<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidRef(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeError`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::TypeError(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::EncodingError`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encoding_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::EncodingError(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::NotAllowed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_allowed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::NotAllowed(s.into());
        if PANIC_ON_ERROR {
            panic!("PICKLER_PANIC_ON_ERROR: {}", err);
        }
        err
    }
}

/// Ensures a condition is true; otherwise returns the given [`enum@Error`].
///
/// # Examples
/// ```
/// use pickler_core::ensure;
/// use pickler_core::error::Error;
///
/// fn check_value(n: i32) -> Result<(), Error> {
///     ensure!(n < 10, Error::invalid_data(format!("value {} too large", n)));
///     Ok(())
/// }
/// assert!(check_value(3).is_ok());
/// assert!(check_value(12).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
