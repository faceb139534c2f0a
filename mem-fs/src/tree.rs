//! # 树操作层
//!
//! 父子关系只记录为编号：父目录的表项存子 inode 编号，
//! 子 inode 的 `parent` 存父目录编号，两者必须同步修改。

use alloc::string::String;
use alloc::vec::Vec;

use vfs::Error;

use crate::layout::{BlockId, InodeId, InodeKind};
use crate::{MemFileSystem, Result, path};

/// 复制过程中分配出的资源，按分配顺序记录
#[derive(Debug, Clone, Copy)]
enum Undo {
    Inode(InodeId),
    Block(BlockId),
}

impl MemFileSystem {
    /// 把 `child` 挂在 `parent` 的第一个空表项上
    pub(crate) fn link_child(&mut self, parent: InodeId, child: InodeId) -> Result<()> {
        if self.inode_mut(parent).push_entry(child.into()).is_none() {
            log::debug!("directory {parent} has no free slot for {child}");
            return Err(Error::ResourceExhausted);
        }
        self.inode_mut(child).parent = Some(parent);
        Ok(())
    }

    pub(crate) fn unlink_child(&mut self, parent: InodeId, child: InodeId) {
        self.inode_mut(parent).remove_entry(child.into());
        if self.inode(child).parent == Some(parent) {
            self.inode_mut(child).parent = None;
        }
    }

    /// 按路径创建空目录或空文件
    pub(crate) fn make_entry(&mut self, path: &str, kind: InodeKind) -> Result<InodeId> {
        let (parent_path, name) = path::split(path)?;
        let parent = self.resolve(parent_path)?;
        self.create_child(parent, name, kind)
    }

    fn create_child(&mut self, parent: InodeId, name: &str, kind: InodeKind) -> Result<InodeId> {
        self.check_insertable(parent, name)?;

        let id = self.alloc_inode()?;
        self.inode_mut(id).init(kind, name);
        if let Err(err) = self.link_child(parent, id) {
            self.release_inode(id);
            return Err(err);
        }

        Ok(id)
    }

    /// 确认能在 `parent` 下放入名为 `name` 的新项
    pub(crate) fn check_insertable(&self, parent: InodeId, name: &str) -> Result<()> {
        let dir = self.inode(parent);
        if !dir.is_dir() {
            return Err(Error::NotADirectory);
        }
        if self.find_child(parent, name).is_some() {
            return Err(Error::AlreadyExists);
        }
        if !dir.has_free_slot() {
            log::debug!("directory {parent} is full");
            return Err(Error::ResourceExhausted);
        }
        Ok(())
    }

    /// `ancestor` 是否为 `id` 本身或其祖先
    pub(crate) fn is_ancestor(&self, ancestor: InodeId, id: InodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.inode(node).parent;
        }
        false
    }

    /// 后序删除整棵子树，释放其拥有的全部块与 inode。
    /// 不能用于根目录，由调用方负责检查。
    pub(crate) fn remove_subtree(&mut self, id: InodeId) {
        let inode = self.inode(id);
        let kind = inode.kind;
        let entries = inode.entries();

        match kind {
            InodeKind::Directory => {
                for child in entries.into_iter().flatten() {
                    self.remove_subtree(InodeId::new(child));
                }
            }
            InodeKind::File => {
                for block in entries.into_iter().flatten() {
                    self.release_block(BlockId::new(block));
                }
            }
            InodeKind::Free => {}
        }

        if let Some(parent) = self.inode(id).parent {
            self.unlink_child(parent, id);
        }
        self.release_inode(id);
    }

    /// 把 `src` 整棵子树复制到 `dst_parent` 下，子树的根改名为 `new_name`。
    /// 中途任何一次分配失败，都会按相反顺序撤销此前的全部分配。
    pub(crate) fn copy_subtree(
        &mut self,
        src: InodeId,
        dst_parent: InodeId,
        new_name: &str,
    ) -> Result<InodeId> {
        let mut undo = Vec::new();
        match self.clone_into(src, dst_parent, new_name, &mut undo) {
            Ok(id) => Ok(id),
            Err(err) => {
                log::debug!(
                    "copy of inode {src} failed ({err}), undoing {} allocations",
                    undo.len()
                );
                self.rollback(&undo);
                Err(err)
            }
        }
    }

    fn clone_into(
        &mut self,
        src: InodeId,
        parent: InodeId,
        name: &str,
        undo: &mut Vec<Undo>,
    ) -> Result<InodeId> {
        let (kind, size, entries) = {
            let inode = self.inode(src);
            (inode.kind, inode.size, inode.entries())
        };

        let id = self.alloc_inode()?;
        undo.push(Undo::Inode(id));
        self.inode_mut(id).init(kind, name);
        self.link_child(parent, id)?;

        match kind {
            InodeKind::File => {
                // 保持块在表项中的位置不变
                for (slot, block) in entries.into_iter().enumerate() {
                    let Some(block) = block.map(BlockId::new) else {
                        continue;
                    };
                    let copy = self.alloc_data()?;
                    undo.push(Undo::Block(copy));

                    let data = self.block(block).clone();
                    *self.block_mut(copy) = data;
                    self.inode_mut(id).set_entry(slot, Some(copy.into()));
                }
                self.inode_mut(id).size = size;
            }
            InodeKind::Directory => {
                for child in entries.into_iter().flatten().map(InodeId::new) {
                    let child_name = String::from(self.inode(child).name());
                    self.clone_into(child, id, &child_name, undo)?;
                }
            }
            InodeKind::Free => {}
        }

        Ok(id)
    }

    fn rollback(&mut self, undo: &[Undo]) {
        for &item in undo.iter().rev() {
            match item {
                Undo::Block(block) => self.release_block(block),
                Undo::Inode(id) => {
                    if let Some(parent) = self.inode(id).parent {
                        self.unlink_child(parent, id);
                    }
                    self.release_inode(id);
                }
            }
        }
    }

    fn release_block(&mut self, block: BlockId) {
        if let Err(err) = self.dealloc_data(block) {
            log::error!("releasing block {block}: {err}");
        }
    }

    fn release_inode(&mut self, id: InodeId) {
        if let Err(err) = self.dealloc_inode(id) {
            log::error!("releasing inode {id}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BLOCK_SIZE, ROOT_INODE};

    #[test]
    fn make_entry_links_under_parent() {
        let mut mfs = MemFileSystem::with_blocks(5).unwrap();
        let dir = mfs.make_entry("/testDirectory", InodeKind::Directory).unwrap();

        assert_eq!(dir, InodeId::new(1));
        assert_eq!(mfs.inode(dir).name(), "testDirectory");
        assert_eq!(mfs.inode(dir).parent, Some(ROOT_INODE));
        assert_eq!(mfs.inode(ROOT_INODE).entries()[0], Some(1));
    }

    #[test]
    fn make_entry_errors() {
        let mut mfs = MemFileSystem::with_blocks(5).unwrap();
        mfs.make_entry("/f", InodeKind::File).unwrap();

        assert_eq!(
            mfs.make_entry("/f", InodeKind::Directory),
            Err(Error::AlreadyExists)
        );
        assert_eq!(
            mfs.make_entry("/f/g", InodeKind::File),
            Err(Error::NotADirectory)
        );
        assert_eq!(
            mfs.make_entry("/nope/g", InodeKind::File),
            Err(Error::NotFound)
        );
        assert!(mfs.is_consistent());
    }

    #[test]
    fn nested_copy_keeps_slot_layout() {
        let mut mfs = MemFileSystem::with_blocks(5).unwrap();
        let dir = mfs.make_entry("/testDirectory", InodeKind::Directory).unwrap();
        mfs.make_entry("/testDirectory/tt", InodeKind::Directory).unwrap();

        let copy = mfs.copy_subtree(dir, ROOT_INODE, "testLocation").unwrap();
        assert_eq!(copy, InodeId::new(3));
        assert_eq!(mfs.inode(ROOT_INODE).entries()[1], Some(3));
        assert_eq!(mfs.inode(copy).name(), "testLocation");

        let inner = InodeId::new(4);
        assert_eq!(mfs.inode(copy).entries()[0], Some(4));
        assert_eq!(mfs.inode(inner).name(), "tt");
        assert_eq!(mfs.inode(inner).parent, Some(copy));
        assert!(mfs.is_consistent());
    }

    #[test]
    fn failed_copy_rolls_back_everything() {
        // 3 个数据块：源文件占 2 块，复制需要再 2 块
        let mut mfs = MemFileSystem::new(8, 3).unwrap();
        let dir = mfs.make_entry("/d", InodeKind::Directory).unwrap();
        mfs.make_entry("/d/empty", InodeKind::File).unwrap();
        let file = mfs.make_entry("/d/big", InodeKind::File).unwrap();
        mfs.append(file, &[1; BLOCK_SIZE + 1]).unwrap();

        let before = mfs.statfs();
        assert_eq!(
            mfs.copy_subtree(dir, ROOT_INODE, "e"),
            Err(Error::ResourceExhausted)
        );
        assert_eq!(mfs.statfs(), before);
        assert_eq!(mfs.find_child(ROOT_INODE, "e"), None);
        assert_eq!(mfs.inode(ROOT_INODE).entry_count(), 1);
        assert!(mfs.is_consistent());
    }

    #[test]
    fn remove_releases_all_resources() {
        let mut mfs = MemFileSystem::with_blocks(8).unwrap();
        let baseline = mfs.statfs();

        let dir = mfs.make_entry("/d", InodeKind::Directory).unwrap();
        mfs.make_entry("/d/sub", InodeKind::Directory).unwrap();
        let file = mfs.make_entry("/d/sub/f", InodeKind::File).unwrap();
        mfs.append(file, &[9; 2 * BLOCK_SIZE]).unwrap();
        assert_eq!(mfs.free_blocks(), 6);

        mfs.remove_subtree(dir);
        assert_eq!(mfs.statfs(), baseline);
        assert_eq!(mfs.inode(ROOT_INODE).entry_count(), 0);
        assert!(mfs.inode(file).is_free());
        assert!(mfs.is_consistent());
    }

    #[test]
    fn ancestry() {
        let mut mfs = MemFileSystem::with_blocks(8).unwrap();
        let a = mfs.make_entry("/a", InodeKind::Directory).unwrap();
        let b = mfs.make_entry("/a/b", InodeKind::Directory).unwrap();
        let c = mfs.make_entry("/c", InodeKind::Directory).unwrap();

        assert!(mfs.is_ancestor(a, b));
        assert!(mfs.is_ancestor(b, b));
        assert!(mfs.is_ancestor(ROOT_INODE, c));
        assert!(!mfs.is_ancestor(b, a));
        assert!(!mfs.is_ancestor(a, c));
    }
}
