//! # 字节流层
//!
//! 文件内容是其表项依次指向的数据块的已用部分拼接而成。
//! 追加写要么全部写入，要么什么也不写：写入前先确认块够用。

use alloc::vec::Vec;

use vfs::Error;

use crate::layout::InodeId;
use crate::{BLOCK_SIZE, DIRECT_COUNT, MemFileSystem, Result};

impl MemFileSystem {
    /// 追加 `len` 字节还需要多少个新块
    fn blocks_needed(&self, file: InodeId, len: usize) -> usize {
        let spare = self
            .inode(file)
            .last_block()
            .map_or(0, |block| self.block(block).spare());
        len.saturating_sub(spare).div_ceil(BLOCK_SIZE)
    }

    /// 确认能向文件追加 `len` 字节：表项与空闲块都要足够
    pub(crate) fn check_appendable(&self, file: InodeId, len: usize) -> Result<()> {
        let needed = self.blocks_needed(file, len);
        let used = self.inode(file).entry_count();

        if used + needed > DIRECT_COUNT || needed > self.free_blocks() {
            log::debug!(
                "appending {len} bytes to inode {file} needs {needed} blocks, {} free",
                self.free_blocks()
            );
            return Err(Error::ResourceExhausted);
        }
        Ok(())
    }

    /// 先填满最后一块，再按表项顺序分配新块，返回写入的字节数
    pub(crate) fn append(&mut self, file: InodeId, bytes: &[u8]) -> Result<usize> {
        debug_assert!(self.inode(file).is_file());
        self.check_appendable(file, bytes.len())?;

        let mut written = 0;
        if let Some(last) = self.inode(file).last_block() {
            written += self.block_mut(last).append(bytes);
        }

        while written < bytes.len() {
            let block = self.alloc_data()?;
            let slot = self.inode_mut(file).push_entry(block.into());
            debug_assert!(slot.is_some());
            written += self.block_mut(block).append(&bytes[written..]);
        }

        self.inode_mut(file).size += written as u32;
        Ok(written)
    }

    /// 读出文件全部内容，空文件得到空的缓冲区
    pub(crate) fn read_all(&self, file: InodeId) -> Vec<u8> {
        let inode = self.inode(file);
        let size = inode.size as usize;
        let mut buf = Vec::with_capacity(size);

        for block in inode.blocks() {
            let data = self.block(block).as_slice();
            let take = data.len().min(size - buf.len());
            buf.extend_from_slice(&data[..take]);
            if buf.len() == size {
                break;
            }
        }

        buf
    }

    /// 释放文件的全部数据块，长度归零
    pub(crate) fn clear(&mut self, file: InodeId) {
        let blocks: Vec<_> = self.inode(file).blocks().collect();
        for block in blocks {
            if let Err(err) = self.dealloc_data(block) {
                log::error!("releasing block {block} of inode {file}: {err}");
            }
        }

        let inode = self.inode_mut(file);
        inode.clear_entries();
        inode.size = 0;
    }
}
