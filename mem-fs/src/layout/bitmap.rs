use alloc::vec;
use alloc::vec::Vec;

use vfs::Error;

/// 位图中的一组位
type BitGroup = u64;

const GROUP_BITS: usize = BitGroup::BITS as usize;

/// 位图，记录其指示区域内槽位的分配情况：置位表示已占用
#[derive(Debug, Clone)]
pub struct Bitmap {
    groups: Vec<BitGroup>,
    /// 位图所指示区域的槽位数
    capacity: usize,
}

/// 槽位编号
struct SlotId(usize);

impl Bitmap {
    pub fn new(capacity: usize) -> Self {
        let mut groups = vec![0; capacity.div_ceil(GROUP_BITS)];

        // 末组中超出容量的位预先置位，使其永远不会被分配出去
        let tail = capacity % GROUP_BITS;
        if tail != 0 {
            if let Some(last) = groups.last_mut() {
                *last = BitGroup::MAX << tail;
            }
        }

        Self { groups, capacity }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 分配编号最小的空闲槽位。
    /// 若位图的空间用尽，则返回空。
    pub fn alloc(&mut self) -> Option<usize> {
        // 寻找还有剩余空间的组(即还有0)
        let (group_index, ingroup_index) =
            self.groups
                .iter()
                .enumerate()
                .find_map(|(group_index, &bits)| {
                    (bits != BitGroup::MAX).then_some((group_index, bits.trailing_ones()))
                })?;

        self.groups[group_index] |= 1 << ingroup_index;
        Some(SlotId::encode(group_index, ingroup_index as usize).0)
    }

    /// 释放槽位；释放空闲槽位属于调用方的错误
    pub fn dealloc(&mut self, slot: usize) -> Result<(), Error> {
        if slot >= self.capacity {
            return Err(Error::InvalidArgument);
        }

        let (group_index, ingroup_index) = SlotId(slot).decode();
        if self.groups[group_index] & (1 << ingroup_index) == 0 {
            return Err(Error::DoubleFree);
        }

        self.groups[group_index] &= !(1 << ingroup_index);
        Ok(())
    }

    pub fn is_allocated(&self, slot: usize) -> bool {
        if slot >= self.capacity {
            return false;
        }
        let (group_index, ingroup_index) = SlotId(slot).decode();
        self.groups[group_index] & (1 << ingroup_index) != 0
    }

    /// 空闲槽位数，末组的填充位不计在内
    pub fn count_free(&self) -> usize {
        self.groups
            .iter()
            .map(|bits| bits.count_zeros() as usize)
            .sum()
    }
}

impl SlotId {
    #[inline]
    fn encode(group_index: usize, ingroup_index: usize) -> Self {
        Self(group_index * GROUP_BITS + ingroup_index)
    }

    #[inline]
    fn decode(self) -> (usize, usize) {
        (self.0 / GROUP_BITS, self.0 % GROUP_BITS)
    }
}
