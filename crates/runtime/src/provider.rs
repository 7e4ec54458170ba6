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

//! The provider contract implemented by every venue.

use async_trait::async_trait;
use futures::stream::BoxStream;
use polyfeed_model::{Exchange, MarketDataError};

use crate::{
    capability::CapabilityStatus,
    payload::{DataPayload, StreamItem},
    request::DataRequest,
};

/// A unified per-venue data provider.
///
/// Providers compose one REST connector and one WebSocket connector, dispatch
/// requests to their endpoint registries, pre-validate feature availability
/// for the requested market, and own their transports unless injected.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// The venue this provider serves.
    fn exchange(&self) -> Exchange;

    /// Dynamic capability override; `None` defers to the static registry.
    fn describe_capability(&self, request: &DataRequest) -> Option<CapabilityStatus> {
        let _ = request;
        None
    }

    /// Executes a historical (REST) request.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy; validation
    /// failures surface before any I/O.
    async fn fetch(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError>;

    /// Opens a live (WebSocket) stream.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy; validation
    /// failures surface before any socket is opened.
    async fn stream(
        &self,
        request: &DataRequest,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError>;

    /// Releases owned transports; idempotent.
    async fn close(&self);
}
