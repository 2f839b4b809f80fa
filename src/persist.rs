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

//! Persist module.
//!
//! This module contains the whole-file JSON snapshot handling shared
//! by the message store and the server graph. Snapshots are written
//! to a temporary file next to the target, then renamed over it, so
//! readers never see a half-written file. Folder trees nest without
//! bound, so snapshots are parsed without a recursion limit.

use log::{debug, trace};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    result,
};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open snapshot file {1}")]
    OpenFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse snapshot file {1}")]
    ParseFileError(#[source] serde_json::Error, PathBuf),
    #[error("cannot create snapshot directory {1}")]
    CreateDirError(#[source] io::Error, PathBuf),
    #[error("cannot create temporary snapshot file in {1}")]
    CreateTempFileError(#[source] io::Error, PathBuf),
    #[error("cannot serialize snapshot for {1}")]
    SerializeError(#[source] serde_json::Error, PathBuf),
    #[error("cannot copy permissions of snapshot file {1}")]
    CopyPermissionsError(#[source] io::Error, PathBuf),
    #[error("cannot write snapshot file {1}")]
    WriteFileError(#[source] io::Error, PathBuf),
    #[error("cannot replace snapshot file {1}")]
    PersistFileError(#[source] tempfile::PersistError, PathBuf),
}

pub type Result<T> = result::Result<T, Error>;

/// Reads the snapshot at the given path. Returns `None` if the file
/// does not exist.
pub fn load<T, P>(path: P) -> Result<Option<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("snapshot file {:?} not found", path);
            return Ok(None);
        }
        Err(err) => return Err(Error::OpenFileError(err, path.to_owned())),
    };

    let mut de = serde_json::Deserializer::from_reader(BufReader::new(file));
    de.disable_recursion_limit();
    let snapshot = T::deserialize(serde_stacker::Deserializer::new(&mut de))
        .and_then(|snapshot| de.end().map(|()| snapshot))
        .map_err(|err| Error::ParseFileError(err, path.to_owned()))?;
    debug!("snapshot file {:?} loaded", path);

    Ok(Some(snapshot))
}

/// Overwrites the file at the given path with the given snapshot,
/// as pretty-printed JSON. An existing file keeps its permissions.
pub fn save<T, P>(path: P, snapshot: &T) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&dir).map_err(|err| Error::CreateDirError(err, dir.to_owned()))?;

    let tmp = NamedTempFile::new_in(&dir).map_err(|err| Error::CreateTempFileError(err, dir))?;
    trace!("temporary snapshot file: {:?}", tmp.path());

    match fs::metadata(path) {
        Ok(metadata) => tmp
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|err| Error::CopyPermissionsError(err, path.to_owned()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => (),
        Err(err) => return Err(Error::CopyPermissionsError(err, path.to_owned())),
    }

    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, snapshot)
            .map_err(|err| Error::SerializeError(err, path.to_owned()))?;
        writer
            .flush()
            .map_err(|err| Error::WriteFileError(err, path.to_owned()))?;
    }

    tmp.persist(path)
        .map_err(|err| Error::PersistFileError(err, path.to_owned()))?;
    debug!("snapshot file {:?} saved", path);

    Ok(())
}
