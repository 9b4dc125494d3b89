//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! The Message/Builder contract.
//!
//! Every struct, union and exception, generated or loaded at runtime, is
//! seen by the rest of the system through two traits:
//!
//! - **[`Message`]**: immutable, keyed read access (`has`, `get`, `num`) and
//!   `mutate` to get a pre-populated builder
//! - **[`MessageBuilder`]**: mutable staging (`set`, `clear`, `is_valid`)
//!   with a single validating `build`
//!
//! Field values travel as [`Value`]s. [`GenericMessage`] and
//! [`GenericBuilder`] implement the contract for any descriptor.
//!
//! # Lifecycle
//!
//! ```text
//! descriptor.new_builder() ──set()──▶ builder ──build()──▶ Arc<dyn Message>
//!                                        ▲                       │
//!                                        └─────── mutate() ──────┘
//! ```
//!
//! `build()` is the only way to obtain a message, and it fails with a
//! [`ValidationError`] if a required field is missing or a union does not
//! have exactly one field set.

mod error;
mod generic;
mod traits;
mod value;

pub use error::ValidationError;
pub use generic::{GenericBuilder, GenericMessage};
pub use traits::{Message, MessageBuilder, validate_presence};
pub use value::Value;
