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


use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::pickler::core::Harness;
use crate::types::PicklerKind;

/// Scalar written directly by the formatter.
pub trait Primitive: Clone + Send + Sync + 'static {
    fn write_primitive(&self, writer: &mut Writer);

    fn read_primitive(reader: &mut Reader) -> Result<Self, Error>;
}

macro_rules! impl_primitive {
    ($ty:ty, $writer:expr, $reader:expr) => {
        impl Primitive for $ty {
            #[inline(always)]
            fn write_primitive(&self, writer: &mut Writer) {
                $writer(writer, *self);
            }

            #[inline(always)]
            fn read_primitive(reader: &mut Reader) -> Result<Self, Error> {
                $reader(reader)
            }
        }
    };
}

impl_primitive!(bool, Writer::write_bool, Reader::read_bool);
impl_primitive!(i8, Writer::write_i8, Reader::read_i8);
impl_primitive!(i16, Writer::write_i16, Reader::read_i16);
impl_primitive!(i32, Writer::write_i32, Reader::read_i32);
impl_primitive!(i64, Writer::write_i64, Reader::read_i64);
impl_primitive!(u8, Writer::write_u8, Reader::read_u8);
impl_primitive!(u16, Writer::write_u16, Reader::read_u16);
impl_primitive!(u32, Writer::write_u32, Reader::read_u32);
impl_primitive!(u64, Writer::write_u64, Reader::read_u64);
impl_primitive!(f32, Writer::write_f32, Reader::read_f32);
impl_primitive!(f64, Writer::write_f64, Reader::read_f64);

impl Primitive for String {
    #[inline(always)]
    fn write_primitive(&self, writer: &mut Writer) {
        writer.write_string(self);
    }

    #[inline(always)]
    fn read_primitive(reader: &mut Reader) -> Result<Self, Error> {
        reader.read_string()
    }
}

pub fn create_primitive_pickler<P: Primitive>() -> Harness<P> {
    Harness::new(
        PicklerKind::Primitive,
        |state, _tag, value: &P| {
            value.write_primitive(&mut state.writer);
            Ok(())
        },
        |state, _tag| P::read_primitive(&mut state.reader),
        |_state, value: &P| Ok(value.clone()),
        |_state, _value: &P| Ok(()),
    )
}
