// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The chunking engine.
//!
//! Every venue caps the number of points one request may return. The planner
//! derives a list of time- or cursor-windowed [`ChunkPlan`]s from the request
//! and the endpoint's [`ChunkPolicy`]; the executor fetches them in order,
//! deduplicates overlapping tails and aggregates the result while tracking
//! the venue's weight budget.

pub mod definitions;
pub mod executor;
pub mod planner;

pub use definitions::{ChunkHint, ChunkPlan, ChunkPolicy, ChunkResult, WeightPolicy};
pub use executor::ChunkExecutor;
pub use planner::ChunkPlanner;
