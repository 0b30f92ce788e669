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


/// Configuration for a pickling session.
///
/// Shared between [`crate::Pickling`] and the per-operation states so that
/// writer and reader agree on the framing of reference-tracked values.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum nesting depth of pickler calls within one operation.
    /// `None` leaves recursion bounded only by the depth of the data.
    pub max_depth: Option<u32>,
    /// Whether cache-by-reference picklers write reference flags, so that
    /// aliased values are written once and shared again after reading.
    pub track_ref: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: None,
            track_ref: true,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get maximum nesting depth.
    #[inline(always)]
    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    /// Check if reference tracking is enabled.
    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.track_ref
    }
}
