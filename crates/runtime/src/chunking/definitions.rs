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

//! Chunking metadata definitions: policies, hints, plans and results.

use chrono::{DateTime, Utc};

use crate::payload::DataPayload;

/// Chunking policy for an endpoint.
///
/// Describes how an endpoint is split when users request more data than the
/// venue's per-request point limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkPolicy {
    /// Maximum number of data points per request (e.g. 1000 bars).
    pub max_points: u32,
    /// Default maximum number of chunks (`None` = unbounded).
    pub max_chunks: Option<u32>,
    /// Whether chunking this endpoint requires a start time.
    pub requires_start_time: bool,
    /// Whether the endpoint supports automatic chunking at all.
    pub supports_auto_chunking: bool,
    /// Rate-limit weight per chunk, for telemetry.
    pub weight_per_request: u32,
}

impl ChunkPolicy {
    /// Creates a policy with the given per-request point cap.
    #[must_use]
    pub const fn new(max_points: u32) -> Self {
        Self {
            max_points,
            max_chunks: None,
            requires_start_time: false,
            supports_auto_chunking: true,
            weight_per_request: 1,
        }
    }

    /// Sets the default chunk cap.
    #[must_use]
    pub const fn with_max_chunks(mut self, max_chunks: u32) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }

    /// Marks the endpoint as requiring a start time for chunking.
    #[must_use]
    pub const fn requiring_start_time(mut self) -> Self {
        self.requires_start_time = true;
        self
    }

    /// Sets the per-chunk rate-limit weight.
    #[must_use]
    pub const fn with_weight(mut self, weight_per_request: u32) -> Self {
        self.weight_per_request = weight_per_request;
        self
    }
}

/// Pagination hints for the executor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkHint {
    /// Response field carrying the next-page cursor; `None` for time-based
    /// pagination. Cursor continuation also requires the endpoint spec to
    /// provide a cursor extractor.
    pub cursor_field: Option<&'static str>,
    /// Name of the timestamp used for deduplication, for telemetry.
    pub timestamp_key: &'static str,
}

impl Default for ChunkHint {
    fn default() -> Self {
        Self {
            cursor_field: None,
            timestamp_key: "timestamp",
        }
    }
}

impl ChunkHint {
    /// Hint for time-based pagination with the default timestamp key.
    #[must_use]
    pub const fn time_based() -> Self {
        Self {
            cursor_field: None,
            timestamp_key: "timestamp",
        }
    }

    /// Hint for cursor-based pagination.
    #[must_use]
    pub const fn cursor(cursor_field: &'static str) -> Self {
        Self {
            cursor_field: Some(cursor_field),
            timestamp_key: "timestamp",
        }
    }
}

/// Rate-limit weight accounting for an endpoint.
#[derive(Copy, Clone, Debug)]
pub enum WeightPolicy {
    /// Fixed weight per request.
    Static(u32),
    /// Weight derived from the per-chunk limit (e.g. Binance kline tiers).
    PerLimit(fn(u32) -> u32),
}

impl WeightPolicy {
    /// Weight consumed by a request with the given limit.
    #[must_use]
    pub fn calculate(&self, limit: u32) -> u32 {
        match self {
            Self::Static(weight) => *weight,
            Self::PerLimit(f) => f(limit),
        }
    }
}

/// Plan for a single chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkPlan {
    /// Window start (`None` for cursor- or limit-based chunks).
    pub start_time: Option<DateTime<Utc>>,
    /// Window end (`None` for cursor- or limit-based chunks).
    pub end_time: Option<DateTime<Utc>>,
    /// Points requested by this chunk.
    pub limit: u32,
    /// Cursor for cursor-windowed chunks.
    pub cursor: Option<serde_json::Value>,
    /// Zero-based index within the overall plan.
    pub chunk_index: u32,
}

/// Result of chunked execution.
#[derive(Debug)]
pub struct ChunkResult {
    /// Aggregated payload across all chunks.
    pub data: DataPayload,
    /// Number of chunks fetched.
    pub chunks_used: u32,
    /// Total rate-limit weight consumed.
    pub weight_consumed: u32,
    /// Whether a throttle window was applied during execution.
    pub throttle_applied: bool,
    /// Total points aggregated.
    pub total_points: usize,
    /// Timestamp of the first aggregated point.
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Timestamp of the last aggregated point.
    pub end_timestamp: Option<DateTime<Utc>>,
}
