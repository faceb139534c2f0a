//! # 文件系统层
//!
//! 持有超级块、两张位图、inode 表与数据块池，
//! 并负责 inode 与数据块的分配和释放。

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;
use vfs::Error;

use crate::layout::*;
use crate::{BLOCK_SIZE, ROOT_INODE, Result};

/// 需要跨线程使用时，由一把锁保护整个文件系统
pub type SharedFileSystem = Arc<Mutex<MemFileSystem>>;

#[derive(Debug)]
pub struct MemFileSystem {
    super_block: SuperBlock,
    inode_bitmap: Bitmap,
    data_bitmap: Bitmap,
    inodes: Vec<Inode>,
    blocks: Vec<DataBlock>,
}

/// 文件系统的容量与剩余量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    pub block_size: usize,
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub total_inodes: usize,
    pub free_inodes: usize,
}

impl MemFileSystem {
    /// 建立一个只有根目录的文件系统。
    /// `inode_count` 至少为1，用于容纳根目录。
    pub fn new(inode_count: usize, block_count: usize) -> Result<Self> {
        let (Ok(total_inodes), Ok(total_blocks)) =
            (u32::try_from(inode_count), u32::try_from(block_count))
        else {
            return Err(Error::InvalidArgument);
        };
        if inode_count == 0 {
            return Err(Error::InvalidArgument);
        }

        let mut mfs = Self {
            super_block: SuperBlock::new(total_inodes, total_blocks),
            inode_bitmap: Bitmap::new(inode_count),
            data_bitmap: Bitmap::new(block_count),
            inodes: vec![Inode::EMPTY; inode_count],
            blocks: vec![DataBlock::new(); block_count],
        };

        let root = mfs.alloc_inode()?;
        debug_assert_eq!(root, ROOT_INODE);
        mfs.inode_mut(root).init(InodeKind::Directory, "");

        log::debug!("mem-fs created: {inode_count} inodes, {block_count} blocks");
        Ok(mfs)
    }

    /// inode 数与数据块数相同的文件系统
    #[inline]
    pub fn with_blocks(count: usize) -> Result<Self> {
        Self::new(count, count)
    }

    #[inline]
    pub fn into_shared(self) -> SharedFileSystem {
        Arc::new(Mutex::new(self))
    }

    pub fn statfs(&self) -> FsStat {
        FsStat {
            block_size: BLOCK_SIZE,
            total_blocks: self.super_block.total_blocks as usize,
            free_blocks: self.super_block.free_blocks as usize,
            total_inodes: self.super_block.total_inodes as usize,
            free_inodes: self.super_block.free_inodes as usize,
        }
    }

    /// 核对计数器、位图与文件树是否一致：
    /// - 超级块的空闲数等于位图中的空闲位数；
    /// - 位图占用的 inode 恰好是非空闲 inode；
    /// - 除根目录外，每个 inode 恰好出现在其父目录的一个表项中；
    /// - 每个已分配的数据块恰好属于一个文件。
    pub fn is_consistent(&self) -> bool {
        if self.data_bitmap.capacity() != self.blocks.len()
            || self.inode_bitmap.capacity() != self.inodes.len()
            || self.super_block.free_blocks as usize != self.data_bitmap.count_free()
            || self.super_block.free_inodes as usize != self.inode_bitmap.count_free()
        {
            return false;
        }

        let mut block_owners = vec![0usize; self.blocks.len()];
        for (index, inode) in self.inodes.iter().enumerate() {
            if self.inode_bitmap.is_allocated(index) == inode.is_free() {
                return false;
            }
            if inode.is_free() {
                continue;
            }

            let id = InodeId::new(index as u32);
            match inode.parent {
                None if id == ROOT_INODE => {}
                None => return false,
                Some(parent) => {
                    let parent = &self.inodes[usize::from(parent)];
                    let slots = parent
                        .entries()
                        .iter()
                        .filter(|&&e| e == Some(id.into()))
                        .count();
                    if !parent.is_dir() || slots != 1 {
                        return false;
                    }
                }
            }

            if inode.is_file() {
                let mut size = 0;
                for block in inode.blocks() {
                    let index = usize::from(block);
                    if !self.data_bitmap.is_allocated(index) {
                        return false;
                    }
                    block_owners[index] += 1;
                    size += self.blocks[index].len();
                }
                if size != inode.size as usize {
                    return false;
                }
            }
        }

        block_owners
            .iter()
            .enumerate()
            .all(|(index, &owners)| owners == usize::from(self.data_bitmap.is_allocated(index)))
    }
}

impl MemFileSystem {
    /// 分配编号最小的空闲 inode，并置为规范的空状态
    pub(crate) fn alloc_inode(&mut self) -> Result<InodeId> {
        let Some(slot) = self.inode_bitmap.alloc() else {
            log::debug!("inode table exhausted");
            return Err(Error::ResourceExhausted);
        };
        self.super_block.free_inodes -= 1;

        let id = InodeId::new(slot as u32);
        self.inode_mut(id).reset();
        log::trace!("alloc inode {id}");
        Ok(id)
    }

    /// 调用方须事先将其从父目录摘下，并释放其拥有的块与子项
    pub(crate) fn dealloc_inode(&mut self, id: InodeId) -> Result<()> {
        self.inode_bitmap.dealloc(id.into())?;
        self.super_block.free_inodes += 1;
        self.inode_mut(id).reset();
        log::trace!("dealloc inode {id}");
        Ok(())
    }

    /// 分配编号最小的空闲数据块，已用长度归零
    pub(crate) fn alloc_data(&mut self) -> Result<BlockId> {
        let Some(slot) = self.data_bitmap.alloc() else {
            log::debug!("data blocks exhausted");
            return Err(Error::ResourceExhausted);
        };
        self.super_block.free_blocks -= 1;

        let id = BlockId::new(slot as u32);
        self.block_mut(id).reset();
        log::trace!("alloc block {id}");
        Ok(id)
    }

    pub(crate) fn dealloc_data(&mut self, id: BlockId) -> Result<()> {
        self.data_bitmap.dealloc(id.into())?;
        self.super_block.free_blocks += 1;
        self.block_mut(id).clear();
        log::trace!("dealloc block {id}");
        Ok(())
    }

    #[inline]
    pub(crate) fn free_blocks(&self) -> usize {
        self.super_block.free_blocks as usize
    }

    #[inline]
    pub(crate) fn inode(&self, id: InodeId) -> &Inode {
        &self.inodes[usize::from(id)]
    }

    #[inline]
    pub(crate) fn inode_mut(&mut self, id: InodeId) -> &mut Inode {
        &mut self.inodes[usize::from(id)]
    }

    #[inline]
    pub(crate) fn block(&self, id: BlockId) -> &DataBlock {
        &self.blocks[usize::from(id)]
    }

    #[inline]
    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut DataBlock {
        &mut self.blocks[usize::from(id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_occupies_first_inode() {
        let mfs = MemFileSystem::with_blocks(5).unwrap();
        let root = mfs.inode(ROOT_INODE);

        assert!(root.is_dir());
        assert_eq!(root.parent, None);
        assert_eq!(
            mfs.statfs(),
            FsStat {
                block_size: BLOCK_SIZE,
                total_blocks: 5,
                free_blocks: 5,
                total_inodes: 5,
                free_inodes: 4,
            }
        );
        assert!(mfs.is_consistent());
    }

    #[test]
    fn zero_inodes_rejected() {
        assert_eq!(MemFileSystem::new(0, 8).unwrap_err(), Error::InvalidArgument);
        assert!(MemFileSystem::new(1, 0).is_ok());
    }

    #[test]
    fn data_allocation_keeps_counter() {
        let mut mfs = MemFileSystem::with_blocks(4).unwrap();

        let first = mfs.alloc_data().unwrap();
        let second = mfs.alloc_data().unwrap();
        assert_eq!((first, second), (BlockId::new(0), BlockId::new(1)));
        assert_eq!(mfs.free_blocks(), 2);

        mfs.block_mut(first).append(b"abc");
        mfs.dealloc_data(first).unwrap();
        assert_eq!(mfs.free_blocks(), 3);
        assert_eq!(mfs.block(first).len(), 0);
        assert_eq!(mfs.dealloc_data(first), Err(Error::DoubleFree));
        assert_eq!(mfs.free_blocks(), 3);

        // 释放后的块最先被重新分配
        assert_eq!(mfs.alloc_data().unwrap(), first);
    }

    #[test]
    fn inode_exhaustion() {
        let mut mfs = MemFileSystem::with_blocks(2).unwrap();
        assert_eq!(mfs.alloc_inode().unwrap(), InodeId::new(1));
        assert_eq!(mfs.alloc_inode(), Err(Error::ResourceExhausted));
        assert_eq!(mfs.statfs().free_inodes, 0);
    }
}
