// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - Wavefront OBJ import and export

mod obj;

pub use obj::{parse_obj, read_obj, to_obj_string, write_obj, ObjData};
