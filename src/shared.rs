// courier-lib, a Rust library for message storage and mail routing.
// Copyright (C) 2022  soywod <clement.douin@posteo.net>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Shared module.
//!
//! The message store and the server graph are single-writer services:
//! every mutation is a read-modify-persist sequence over the whole
//! aggregate. This module exposes a cloneable handle that serializes
//! those sequences behind one coarse lock per service, so concurrent
//! callers cannot lose each other's updates.

use log::trace;
use std::{
    result,
    sync::{Arc, Mutex},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get shared service lock: {0}")]
    LockError(String),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents a thread safe handle over a service.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    pub fn new(service: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Runs the given closure with exclusive access to the service.
    /// The lock is held for the whole closure, persistence included.
    pub fn with<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        trace!("acquiring shared service lock");
        let mut service = self
            .inner
            .lock()
            .map_err(|err| Error::LockError(err.to_string()))?;
        Ok(f(&mut service))
    }
}

impl<T> From<T> for Shared<T> {
    fn from(service: T) -> Self {
        Self::new(service)
    }
}
