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

//! Backend ordering tests

use std::rc::Rc;

use crate::core::ordering::*;
use crate::core::tests::fixtures::place;
use crate::core::Backend;

#[test]
fn test_backend_rank_known_names() {
    assert_eq!(backend_rank(Some(KEYRING_NAME)), 0);
    assert_eq!(backend_rank(Some(PGP_NAME)), 1);
    assert_eq!(backend_rank(Some(PKCS11_NAME)), 2);
    assert_eq!(backend_rank(Some(SSH_NAME)), 3);
}

#[test]
fn test_backend_rank_unknown_and_unnamed() {
    assert_eq!(backend_rank(Some("x509-files")), UNRANKED);
    assert_eq!(backend_rank(None), UNRANKED);
}

#[test]
fn test_sort_backends_is_stable_for_unranked() {
    let extra_a = Backend::new(Some("extra-a"), "A", "");
    let ssh = Backend::new(Some(SSH_NAME), "SSH", "");
    let unnamed = Backend::new(None, "Unnamed", "");
    let keyring = Backend::new(Some(KEYRING_NAME), "Keyring", "");
    let extra_b = Backend::new(Some("extra-b"), "B", "");

    let mut backends = vec![
        extra_a.clone(),
        ssh.clone(),
        unnamed.clone(),
        keyring.clone(),
        extra_b.clone(),
    ];
    sort_backends(&mut backends);

    assert_eq!(backends, vec![keyring, ssh, extra_a, unnamed, extra_b]);
}

#[test]
fn test_places_in_order_follows_backends() {
    let first = Backend::new(Some(KEYRING_NAME), "Keyring", "");
    let empty = Backend::new(Some(PGP_NAME), "PGP", "");
    let last = Backend::new(Some(SSH_NAME), "SSH", "");

    let a = place("a://");
    let b = place("b://");
    let c = place("c://");
    first.add_place(a.clone());
    first.add_place(b.clone());
    last.add_place(c.clone());

    let backends: Vec<Rc<Backend>> = vec![first, empty, last];
    assert_eq!(places_in_order(&backends), vec![a, b, c]);
}
