//! # 外部字节源/汇接口层
//!
//! 导入导出时与外部世界交换字节的抽象。
//! 字节从何而来、写到何处（宿主文件、网络、内存缓冲区）与文件系统无关，
//! 实现了这两个特质的类型即可作为 `import` / `export` 的另一端。
//!
//! 任何打开、读、写失败都应报告为 [`Error::Io`]。

use alloc::vec::Vec;

use vfs::Error;

/// 以只读方式打开后，一次交出全部字节
pub trait ByteSource {
    fn read_bytes(&mut self) -> Result<Vec<u8>, Error>;
}

/// 以写方式打开后，一次接收整个缓冲区
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

impl ByteSource for &[u8] {
    fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.to_vec())
    }
}

impl ByteSource for Vec<u8> {
    fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.clone())
    }
}

/// 写入会替换原有内容
impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.clear();
        self.extend_from_slice(bytes);
        Ok(())
    }
}
