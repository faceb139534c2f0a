//! 宿主目录与 mem-fs 之间的整树搬运

use std::fs;
use std::io;
use std::path::Path;

use mem_fs::{DirEntryType, Error, MemFileSystem, OpenFlag};

use crate::{HostFile, into_io};

/// 拼接 mem-fs 内的路径
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// 把宿主目录 `host_dir` 的内容递归放入 mem-fs 目录 `dir`，返回放入的文件数。
/// 放不下或名字不合法的项会被跳过。
pub fn pack_dir(mfs: &mut MemFileSystem, host_dir: &Path, dir: &str) -> io::Result<usize> {
    let mut entries = fs::read_dir(host_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut packed = 0;
    for entry in entries {
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("skipping non UTF-8 name {:?}", entry.path());
            continue;
        };
        let path = child_path(dir, &name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            match mfs.mkdir(&path) {
                Ok(()) => packed += pack_dir(mfs, &entry.path(), &path)?,
                Err(err) => log::warn!("skipping directory {path}: {err}"),
            }
        } else if file_type.is_file() {
            let mut source = HostFile::new(entry.path());
            match mfs.import_with(&path, &mut source, OpenFlag::CREATE | OpenFlag::TRUNC) {
                Ok(size) => {
                    log::info!("packed {path} ({size} bytes)");
                    packed += 1;
                }
                Err(Error::Io) => {
                    return Err(io::Error::other(format!("reading {:?}", source.path())));
                }
                Err(err) => log::warn!("skipping file {path}: {err}"),
            }
        }
    }

    Ok(packed)
}

/// 把 mem-fs 目录 `dir` 的内容递归导出到宿主目录 `host_dir`，返回导出的文件数
pub fn unpack_dir(mfs: &MemFileSystem, dir: &str, host_dir: &Path) -> io::Result<usize> {
    fs::create_dir_all(host_dir)?;

    let mut unpacked = 0;
    for dirent in mfs.list(dir).map_err(into_io)? {
        let path = child_path(dir, &dirent.name);
        let host_path = host_dir.join(&dirent.name);

        match dirent.ty {
            DirEntryType::Directory => unpacked += unpack_dir(mfs, &path, &host_path)?,
            DirEntryType::Regular => {
                mfs.export(&path, &mut HostFile::new(host_path)).map_err(into_io)?;
                unpacked += 1;
            }
        }
    }

    Ok(unpacked)
}

/// 以缩进表示层次的目录树，每行形如 `DIR name` 或 `FIL name`
pub fn tree_lines(mfs: &MemFileSystem, dir: &str) -> Result<Vec<String>, Error> {
    let mut lines = Vec::new();
    collect_tree(mfs, dir, 0, &mut lines)?;
    Ok(lines)
}

fn collect_tree(
    mfs: &MemFileSystem,
    dir: &str,
    depth: usize,
    lines: &mut Vec<String>,
) -> Result<(), Error> {
    for dirent in mfs.list(dir)? {
        lines.push(format!(
            "{:indent$}{} {}",
            "",
            dirent.ty.tag(),
            dirent.name,
            indent = depth * 2
        ));
        if dirent.ty == DirEntryType::Directory {
            collect_tree(mfs, &child_path(dir, &dirent.name), depth + 1, lines)?;
        }
    }
    Ok(())
}
