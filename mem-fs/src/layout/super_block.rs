/// 超级块：记录两张表的容量与剩余量。
///
/// `free_blocks` 必须始终等于数据块位图中的空闲位数。
#[derive(Debug, Clone)]
pub struct SuperBlock {
    pub total_inodes: u32,
    pub total_blocks: u32,
    pub free_inodes: u32,
    pub free_blocks: u32,
}

impl SuperBlock {
    #[inline]
    pub fn new(total_inodes: u32, total_blocks: u32) -> Self {
        Self {
            total_inodes,
            total_blocks,
            free_inodes: total_inodes,
            free_blocks: total_blocks,
        }
    }
}
