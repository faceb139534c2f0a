//! # 表结构层
//!
//! mem-fs 的内存布局：
//! 超级块 | inode 位图 | inode 表 | 数据块位图 | 数据块池
//!
//! 表之间只以编号互相引用，不持有指针。

mod super_block;
pub use super_block::SuperBlock;

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{Inode, InodeKind};

mod data_block;
pub use data_block::DataBlock;

use derive_more::{Display, From, Into};

/// inode 表中的槽位编号
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct InodeId(u32);

/// 数据块池中的块编号
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct BlockId(u32);

impl InodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl BlockId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<InodeId> for usize {
    fn from(id: InodeId) -> Self {
        id.0 as usize
    }
}

impl From<BlockId> for usize {
    fn from(id: BlockId) -> Self {
        id.0 as usize
    }
}

impl From<InodeId> for u64 {
    fn from(id: InodeId) -> Self {
        id.0 as u64
    }
}
