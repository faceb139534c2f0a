#![no_std]

extern crate alloc;

/* mem-fs 的整体架构，自上而下 */

// 操作层：以绝对路径为参数的对外操作
mod ops;

// 树操作层：挂接、递归删除、递归复制
mod tree;

// 字节流层：文件的追加写与整体读
mod stream;

// 路径解析层
mod path;

// 文件系统层：持有全部表，负责 inode 与数据块的分配
mod mfs;

// 表结构层：inode、数据块、位图与超级块
mod layout;

// 外部字节源/汇接口层
mod byte_dev;

pub use self::{
    byte_dev::{ByteSink, ByteSource},
    layout::{BlockId, InodeId},
    mfs::{FsStat, MemFileSystem, SharedFileSystem},
    ops::OpenFlag,
};
pub use vfs::{DirEntry, DirEntryType, Error, Stat};

pub const BLOCK_SIZE: usize = 1024;
/// 每个 inode 的表项数：目录的最大子项数，也是文件的最大块数
pub const DIRECT_COUNT: usize = 16;
pub const NAME_MAX_LEN: usize = 59;
/// 单个文件的最大字节数
pub const FILE_MAX_SIZE: usize = DIRECT_COUNT * BLOCK_SIZE;

pub const ROOT_INODE: InodeId = InodeId::new(0);

pub type Result<T> = core::result::Result<T, Error>;
