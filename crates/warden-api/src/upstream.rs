// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bounded reads of authority responses.

use thiserror::Error;

/// Failure reading an authority response body.
#[derive(Debug, Error)]
pub(crate) enum BodyError {
    /// The connection failed mid-body.
    #[error("network: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body grew past the limit.
    #[error("response exceeds {limit} byte limit")]
    TooLarge {
        /// The limit that was hit.
        limit: usize,
    },
}

/// Reads `response` into memory, stopping as soon as it passes `limit` bytes.
///
/// A declared `Content-Length` over the limit is refused before any body is read.
pub(crate) async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(BodyError::TooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
