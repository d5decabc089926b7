// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/ordering.rs
//!
//! Backend display order
//!
//! The four well-known backends always appear in the same order; anything
//! else (including a backend without a name) shares the lowest priority and
//! keeps its discovery order. The sort runs once when backends are loaded.

use std::rc::Rc;

use crate::core::types::{Backend, Place};

/// Name of the password keyring backend
pub const KEYRING_NAME: &str = "gnome-keyring";
/// Name of the OpenPGP backend
pub const PGP_NAME: &str = "openpgp";
/// Name of the PKCS#11 token backend
pub const PKCS11_NAME: &str = "pkcs11";
/// Name of the SSH key backend
pub const SSH_NAME: &str = "openssh";

/// Rank shared by every backend outside the priority table
pub const UNRANKED: u8 = 10;

/// Returns the sort rank for a backend name (lower sorts first)
pub fn backend_rank(name: Option<&str>) -> u8 {
    match name {
        Some(KEYRING_NAME) => 0,
        Some(PGP_NAME) => 1,
        Some(PKCS11_NAME) => 2,
        Some(SSH_NAME) => 3,
        _ => UNRANKED,
    }
}

/// Stable sort by rank; equal ranks keep their relative order
pub fn sort_backends(backends: &mut [Rc<Backend>]) {
    backends.sort_by_key(|backend| backend_rank(backend.name()));
}

/// Every place of every backend, in sidebar row order
///
/// Backends without places contribute nothing, exactly as they contribute
/// no rows.
pub fn places_in_order(backends: &[Rc<Backend>]) -> Vec<Rc<Place>> {
    backends.iter().flat_map(|backend| backend.places()).collect()
}
