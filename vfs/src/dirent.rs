use alloc::string::String;

/// 目录列举时交换的目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Inode number
    pub inode: u64,
    pub ty: DirEntryType,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryType {
    Directory,
    #[default]
    Regular,
}

impl DirEntryType {
    /// 列举时使用的三字母前缀
    pub fn tag(self) -> &'static str {
        match self {
            Self::Directory => "DIR",
            Self::Regular => "FIL",
        }
    }
}
