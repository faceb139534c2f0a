//! inode 记录
//!
//! 目录与文件共用同一组表项：
//! - 目录的表项存放子 inode 编号，表项数即最大子项数；
//! - 文件的表项存放数据块编号，依次相连即文件内容。

use vfs::DirEntryType;

use super::{BlockId, InodeId};
use crate::{DIRECT_COUNT, NAME_MAX_LEN};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    #[default]
    Free,
    Directory,
    File,
}

#[derive(Debug, Clone)]
pub struct Inode {
    pub kind: InodeKind,
    // 最后一字节留给 \0
    name: [u8; NAME_MAX_LEN + 1],
    /// 文件的字节数，等于所有数据块已用长度之和
    pub size: u32,
    /// 根目录没有父目录
    pub parent: Option<InodeId>,
    entries: [Option<u32>; DIRECT_COUNT],
}

impl Inode {
    /// 空闲槽位的规范状态
    pub const EMPTY: Self = Self {
        kind: InodeKind::Free,
        name: [0; NAME_MAX_LEN + 1],
        size: 0,
        parent: None,
        entries: [None; DIRECT_COUNT],
    };

    /// 调用方保证 `name` 已经过校验
    pub fn init(&mut self, kind: InodeKind, name: &str) {
        let bytes = name.as_bytes();
        let len = bytes.len().min(NAME_MAX_LEN);

        *self = Self { kind, ..Self::EMPTY };
        self.name[..len].copy_from_slice(&bytes[..len]);
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    pub fn name(&self) -> &str {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_MAX_LEN);
        core::str::from_utf8(&self.name[..len]).unwrap_or_default()
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == InodeKind::File
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.kind == InodeKind::Free
    }

    pub fn dirent_type(&self) -> DirEntryType {
        if self.is_dir() {
            DirEntryType::Directory
        } else {
            DirEntryType::Regular
        }
    }

    /// 表项的副本，便于在遍历时修改文件系统
    #[inline]
    pub fn entries(&self) -> [Option<u32>; DIRECT_COUNT] {
        self.entries
    }

    /// 目录的子项，按槽位顺序
    pub fn children(&self) -> impl Iterator<Item = InodeId> + '_ {
        debug_assert!(self.is_dir());
        self.entries.iter().flatten().map(|&id| InodeId::new(id))
    }

    /// 文件的数据块，按文件内顺序
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        debug_assert!(self.is_file());
        self.entries.iter().flatten().map(|&id| BlockId::new(id))
    }

    /// 文件的最后一块，可能尚未写满
    pub fn last_block(&self) -> Option<BlockId> {
        self.blocks().last()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    #[inline]
    pub fn has_free_slot(&self) -> bool {
        self.entries.contains(&None)
    }

    /// 占用第一个空表项，返回其槽位；表项已满则返回空
    pub fn push_entry(&mut self, raw: u32) -> Option<usize> {
        let slot = self.entries.iter().position(Option::is_none)?;
        self.entries[slot] = Some(raw);
        Some(slot)
    }

    #[inline]
    pub fn set_entry(&mut self, slot: usize, raw: Option<u32>) {
        self.entries[slot] = raw;
    }

    /// 清除指向 `raw` 的表项，不存在时什么也不做
    pub fn remove_entry(&mut self, raw: u32) {
        if let Some(slot) = self.entries.iter().position(|&e| e == Some(raw)) {
            self.entries[slot] = None;
        }
    }

    pub fn clear_entries(&mut self) {
        self.entries = [None; DIRECT_COUNT];
    }
}
