use derive_more::Display;

/// 文件系统操作的失败原因，每个操作至多返回其中一种
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 路径为空、不是绝对路径、含空段或名字过长
    #[display(fmt = "invalid argument")]
    InvalidArgument,
    #[display(fmt = "no such file or directory")]
    NotFound,
    #[display(fmt = "not a directory")]
    NotADirectory,
    #[display(fmt = "not a regular file")]
    NotAFile,
    #[display(fmt = "file exists")]
    AlreadyExists,
    /// 根目录不可删除
    #[display(fmt = "operation not permitted on root")]
    Protected,
    /// 没有空闲的 inode、数据块，或目录/文件的表项已满
    #[display(fmt = "no space left")]
    ResourceExhausted,
    /// 外部字节源或字节汇读写失败
    #[display(fmt = "external I/O failure")]
    Io,
    /// 释放了本就空闲的槽位
    #[display(fmt = "slot is already free")]
    DoubleFree,
}

impl core::error::Error for Error {}
