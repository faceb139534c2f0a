
mod pack;

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use mem_fs::{ByteSink, ByteSource, Error};

pub use self::pack::{child_path, pack_dir, tree_lines, unpack_dir};

/// 宿主机上的文件，作为导入的字节源或导出的字节汇
#[derive(Debug)]
pub struct HostFile {
    path: PathBuf,
}

impl HostFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for HostFile {
    fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let mut data = Vec::new();
        File::open(&self.path)
            .and_then(|mut fd| fd.read_to_end(&mut data))
            .map_err(|err| {
                log::warn!("reading {:?}: {err}", self.path);
                Error::Io
            })?;
        Ok(data)
    }
}

impl ByteSink for HostFile {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .and_then(|mut fd| fd.write_all(bytes))
            .map_err(|err| {
                log::warn!("writing {:?}: {err}", self.path);
                Error::Io
            })
    }
}

#[inline]
pub fn into_io(err: Error) -> io::Error {
    io::Error::other(err)
}
