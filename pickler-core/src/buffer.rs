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


//! Sequential binary formatter used by the picklers.
//!
//! Fields are framed purely by order: there is no random access by tag and no
//! length prefix beyond what a pickler writes itself. All fixed-width values
//! are little-endian.

use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian};

macro_rules! write_fixed {
    ($name:ident, $ty:ty, $size:expr, $encode:path) => {
        #[inline(always)]
        pub fn $name(&mut self, value: $ty) {
            let mut bytes = [0u8; $size];
            $encode(&mut bytes, value);
            self.bf.extend_from_slice(&bytes);
        }
    };
}

macro_rules! read_fixed {
    ($name:ident, $ty:ty, $size:expr, $decode:path) => {
        #[inline(always)]
        pub fn $name(&mut self) -> Result<$ty, Error> {
            Ok($decode(self.take($size)?))
        }
    };
}

#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    write_fixed!(write_u16, u16, 2, LittleEndian::write_u16);
    write_fixed!(write_i16, i16, 2, LittleEndian::write_i16);
    write_fixed!(write_u32, u32, 4, LittleEndian::write_u32);
    write_fixed!(write_i32, i32, 4, LittleEndian::write_i32);
    write_fixed!(write_u64, u64, 8, LittleEndian::write_u64);
    write_fixed!(write_i64, i64, 8, LittleEndian::write_i64);
    write_fixed!(write_f32, f32, 4, LittleEndian::write_f32);
    write_fixed!(write_f64, f64, 8, LittleEndian::write_f64);

    pub fn write_varuint32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.bf.push((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.bf.push(value as u8);
    }

    /// Writes a varuint32 byte length followed by the UTF-8 bytes.
    pub fn write_string(&mut self, s: &str) {
        self.write_varuint32(s.len() as u32);
        self.bf.extend_from_slice(s.as_bytes());
    }
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self.cursor.saturating_add(len);
        if end > self.bf.len() {
            return Err(Error::buffer_out_of_bound(self.cursor, len, self.bf.len()));
        }
        let bytes = &self.bf[self.cursor..end];
        self.cursor = end;
        Ok(bytes)
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid_data(format!(
                "invalid bool byte {} at offset {}",
                other,
                self.cursor - 1
            ))),
        }
    }

    read_fixed!(read_u16, u16, 2, LittleEndian::read_u16);
    read_fixed!(read_i16, i16, 2, LittleEndian::read_i16);
    read_fixed!(read_u32, u32, 4, LittleEndian::read_u32);
    read_fixed!(read_i32, i32, 4, LittleEndian::read_i32);
    read_fixed!(read_u64, u64, 8, LittleEndian::read_u64);
    read_fixed!(read_i64, i64, 8, LittleEndian::read_i64);
    read_fixed!(read_f32, f32, 4, LittleEndian::read_f32);
    read_fixed!(read_f64, f64, 8, LittleEndian::read_f64);

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let mut result = 0u32;
        for shift in (0..35).step_by(7) {
            let b = self.read_u8()? as u32;
            result |= (b & 0x7F) << shift;
            if b < 0x80 {
                return Ok(result);
            }
        }
        Err(Error::invalid_data("varuint32 longer than 5 bytes"))
    }

    pub fn read_string(&mut self) -> Result<String, Error> {
        let len = self.read_varuint32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::encoding_error(format!("invalid utf-8 string: {}", e)))
    }
}
