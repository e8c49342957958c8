// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries. All use Diesel DSL.

pub mod audit;
pub mod decisions;
pub mod entities;

pub use entities::EntityFilter;
