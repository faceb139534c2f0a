//! # 路径解析层
//!
//! 路径一律为以 `/` 开头的绝对路径，`/` 本身指根目录。
//! 连续的分隔符会产生空段，这样的路径整体视为非法参数。

use vfs::Error;

use crate::layout::InodeId;
use crate::{MemFileSystem, NAME_MAX_LEN, ROOT_INODE, Result};

pub const SEPARATOR: char = '/';

/// 将路径拆成父目录路径与最后一段名字
pub fn split(path: &str) -> Result<(&str, &str)> {
    if !path.starts_with(SEPARATOR) {
        return Err(Error::InvalidArgument);
    }

    let (parent, name) = path.rsplit_once(SEPARATOR).ok_or(Error::InvalidArgument)?;
    validate_name(name)?;

    let parent = if parent.is_empty() { "/" } else { parent };
    Ok((parent, name))
}

/// 名字非空、不超过 [`NAME_MAX_LEN`] 字节，不含分隔符与 NUL，
/// 也不能是 `.` 或 `..`
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > NAME_MAX_LEN || name.contains([SEPARATOR, '\0']) {
        return Err(Error::InvalidArgument);
    }
    if matches!(name, "." | "..") {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

impl MemFileSystem {
    /// 从根目录出发逐段查找，得到路径所指的 inode
    pub(crate) fn resolve(&self, path: &str) -> Result<InodeId> {
        let rest = path.strip_prefix(SEPARATOR).ok_or(Error::InvalidArgument)?;
        if rest.is_empty() {
            return Ok(ROOT_INODE);
        }
        if rest.split(SEPARATOR).any(str::is_empty) {
            return Err(Error::InvalidArgument);
        }

        let mut current = ROOT_INODE;
        for segment in rest.split(SEPARATOR) {
            // 中间段必须是目录
            if !self.inode(current).is_dir() {
                log::debug!("{path:?}: middle segment isn't directory");
                return Err(Error::NotFound);
            }
            current = self.find_child(current, segment).ok_or(Error::NotFound)?;
        }

        Ok(current)
    }

    /// 在目录中按名字查找子项
    pub(crate) fn find_child(&self, dir: InodeId, name: &str) -> Option<InodeId> {
        self.inode(dir)
            .children()
            .find(|&child| self.inode(child).name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_paths() {
        assert_eq!(split("/a"), Ok(("/", "a")));
        assert_eq!(split("/a/b/c.txt"), Ok(("/a/b", "c.txt")));
        assert_eq!(split("/"), Err(Error::InvalidArgument));
        assert_eq!(split("/a/"), Err(Error::InvalidArgument));
        assert_eq!(split("a/b"), Err(Error::InvalidArgument));
        assert_eq!(split(""), Err(Error::InvalidArgument));
    }

    #[test]
    fn names_are_bounded() {
        let longest = "n".repeat(NAME_MAX_LEN);
        let too_long = "n".repeat(NAME_MAX_LEN + 1);

        assert_eq!(validate_name(&longest), Ok(()));
        assert_eq!(validate_name(&too_long), Err(Error::InvalidArgument));
        assert_eq!(validate_name("a\0b"), Err(Error::InvalidArgument));
    }

    #[test]
    fn dot_names_are_reserved() {
        assert_eq!(validate_name("."), Err(Error::InvalidArgument));
        assert_eq!(validate_name(".."), Err(Error::InvalidArgument));
        assert_eq!(split("/a/.."), Err(Error::InvalidArgument));
        // 只有整段恰为点号时才保留
        assert_eq!(validate_name(".hidden"), Ok(()));
        assert_eq!(validate_name("..."), Ok(()));
    }

    #[test]
    fn resolve_walks_from_root() {
        let mut mfs = MemFileSystem::with_blocks(8).unwrap();
        mfs.mkdir("/a").unwrap();
        mfs.mkdir("/a/b").unwrap();
        mfs.mkfile("/a/b/f").unwrap();

        assert_eq!(mfs.resolve("/"), Ok(ROOT_INODE));
        assert_eq!(mfs.resolve("/a"), Ok(InodeId::new(1)));
        assert_eq!(mfs.resolve("/a/b/f"), Ok(InodeId::new(3)));
        assert_eq!(mfs.resolve("/a/x"), Err(Error::NotFound));
        assert_eq!(mfs.resolve("/a/b/f/g"), Err(Error::NotFound));
        assert_eq!(mfs.resolve("a"), Err(Error::InvalidArgument));
    }

    #[test]
    fn empty_segments_are_rejected() {
        let mut mfs = MemFileSystem::with_blocks(8).unwrap();
        mfs.mkdir("/a").unwrap();
        mfs.mkdir("/a/b").unwrap();

        assert_eq!(mfs.resolve("/a//b"), Err(Error::InvalidArgument));
        assert_eq!(mfs.resolve("//a"), Err(Error::InvalidArgument));
        assert_eq!(mfs.resolve("/a/"), Err(Error::InvalidArgument));
        // 即使前面的段不存在，空段仍然优先报告
        assert_eq!(mfs.resolve("/missing//b"), Err(Error::InvalidArgument));
    }
}
