//! # 操作层
//!
//! 以绝对路径为参数的对外操作：先解析路径，再交给树操作层或字节流层。
//! 每个操作要么成功，要么返回唯一一种错误，且不会让文件系统处于半完成状态。

use alloc::string::String;
use alloc::vec::Vec;

use enumflags2::{BitFlags, bitflags};
use vfs::{DirEntry, Error, Stat};

use crate::byte_dev::{ByteSink, ByteSource};
use crate::layout::{InodeId, InodeKind};
use crate::{BLOCK_SIZE, DIRECT_COUNT, MemFileSystem, ROOT_INODE, Result, path};

/// 导入时对目标文件的处理方式
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlag {
    /// 文件不存在时创建
    CREATE = 0b01,
    /// 先清空文件，再写入；否则追加在末尾
    TRUNC  = 0b10,
}

impl MemFileSystem {
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        self.make_entry(path, InodeKind::Directory).map(drop)
    }

    pub fn mkfile(&mut self, path: &str) -> Result<()> {
        self.make_entry(path, InodeKind::File).map(drop)
    }

    /// 删除文件，或递归删除目录；根目录不可删除
    pub fn rm(&mut self, path: &str) -> Result<()> {
        let id = self.resolve(path)?;
        if id == ROOT_INODE {
            return Err(Error::Protected);
        }
        self.remove_subtree(id);
        Ok(())
    }

    /// 递归复制，`dst_path` 的最后一段是副本的名字。
    /// 不能把目录复制进它自己的子树。
    pub fn cp(&mut self, src_path: &str, dst_path: &str) -> Result<()> {
        let src = self.resolve(src_path)?;
        let (parent_path, name) = path::split(dst_path)?;
        let parent = self.resolve(parent_path)?;

        self.check_insertable(parent, name)?;
        if self.is_ancestor(src, parent) {
            log::debug!("cp {src_path:?} -> {dst_path:?}: destination inside source");
            return Err(Error::InvalidArgument);
        }

        self.copy_subtree(src, parent, name).map(drop)
    }

    /// 追加写入已存在的文件，返回写入的字节数。
    /// 空间不足时一个字节也不写。
    pub fn writef(&mut self, path: &str, bytes: &[u8]) -> Result<usize> {
        let file = self.resolve_file(path)?;
        self.append(file, bytes)
    }

    /// 读出整个文件，同时给出其大小
    pub fn readf(&self, path: &str) -> Result<(Vec<u8>, usize)> {
        let file = self.resolve_file(path)?;
        let data = self.read_all(file);
        let size = data.len();
        Ok((data, size))
    }

    /// 按槽位顺序列出目录的直接子项
    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        let dir = self.resolve_dir(path)?;
        Ok(self
            .inode(dir)
            .children()
            .map(|child| {
                let inode = self.inode(child);
                DirEntry {
                    inode: child.into(),
                    ty: inode.dirent_type(),
                    name: String::from(inode.name()),
                }
            })
            .collect())
    }

    /// 清空文件内容
    pub fn truncate(&mut self, path: &str) -> Result<()> {
        let file = self.resolve_file(path)?;
        self.clear(file);
        Ok(())
    }

    pub fn stat(&self, path: &str) -> Result<Stat> {
        let id = self.resolve(path)?;
        let inode = self.inode(id);
        let (blocks, size) = if inode.is_file() {
            (inode.entry_count() as u64, inode.size as u64)
        } else {
            (0, 0)
        };

        Ok(Stat {
            inode: id.into(),
            mode: inode.dirent_type(),
            block_size: BLOCK_SIZE as u64,
            blocks,
            size,
        })
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// 用外部字节源的全部内容替换已存在文件的内容
    pub fn import<S>(&mut self, path: &str, source: &mut S) -> Result<usize>
    where
        S: ByteSource + ?Sized,
    {
        self.import_with(path, source, OpenFlag::TRUNC.into())
    }

    /// 把外部字节源的全部内容写入文件。
    /// 写入前确认空间足够，失败时文件系统保持原样。
    pub fn import_with<S>(
        &mut self,
        path: &str,
        source: &mut S,
        flags: BitFlags<OpenFlag>,
    ) -> Result<usize>
    where
        S: ByteSource + ?Sized,
    {
        let data = source.read_bytes()?;
        let blocks = data.len().div_ceil(BLOCK_SIZE);

        let file = match self.resolve_file(path) {
            Ok(file) => file,
            Err(Error::NotFound) if flags.contains(OpenFlag::CREATE) => {
                if blocks > DIRECT_COUNT.min(self.free_blocks()) {
                    return Err(Error::ResourceExhausted);
                }
                self.make_entry(path, InodeKind::File)?
            }
            Err(err) => return Err(err),
        };

        if flags.contains(OpenFlag::TRUNC) {
            // 原有的块会先被释放，可以算作空闲
            let reusable = self.inode(file).entry_count();
            if blocks > DIRECT_COUNT || blocks > self.free_blocks() + reusable {
                log::debug!("import into {path:?}: {} bytes don't fit", data.len());
                return Err(Error::ResourceExhausted);
            }
            self.clear(file);
        }

        self.append(file, &data)
    }

    /// 把文件的全部内容交给外部字节汇，返回字节数
    pub fn export<S>(&self, path: &str, sink: &mut S) -> Result<usize>
    where
        S: ByteSink + ?Sized,
    {
        let file = self.resolve_file(path)?;
        let data = self.read_all(file);
        sink.write_bytes(&data)?;
        Ok(data.len())
    }
}

impl MemFileSystem {
    fn resolve_file(&self, path: &str) -> Result<InodeId> {
        let id = self.resolve(path)?;
        if !self.inode(id).is_file() {
            return Err(Error::NotAFile);
        }
        Ok(id)
    }

    fn resolve_dir(&self, path: &str) -> Result<InodeId> {
        let id = self.resolve(path)?;
        if !self.inode(id).is_dir() {
            return Err(Error::NotADirectory);
        }
        Ok(id)
    }
}
