use core::fmt;

use crate::BLOCK_SIZE;

/// 数据块：固定容量的缓冲区加上已用长度，已用部分之后的字节没有意义
#[derive(Clone)]
pub struct DataBlock {
    size: usize,
    data: [u8; BLOCK_SIZE],
}

impl DataBlock {
    pub const fn new() -> Self {
        Self {
            size: 0,
            data: [0; BLOCK_SIZE],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// 块内尚可写入的字节数
    #[inline]
    pub fn spare(&self) -> usize {
        BLOCK_SIZE - self.size
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// 接在已用部分之后写入，返回实际写入的字节数
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.spare());
        self.data[self.size..self.size + n].copy_from_slice(&bytes[..n]);
        self.size += n;
        n
    }

    /// 只清零已用长度
    #[inline]
    pub fn reset(&mut self) {
        self.size = 0;
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
        self.size = 0;
    }
}

impl Default for DataBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBlock").field("size", &self.size).finish()
    }
}
