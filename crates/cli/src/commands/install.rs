// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af install` - asset installation is out of scope for this kernel;
//! the subcommand stays a stub so the command surface is preserved
//! without faking behavior that was never built.

pub fn install() {
    println!("af install: asset installation is not implemented in this release.");
}
