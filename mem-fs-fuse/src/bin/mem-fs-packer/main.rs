mod cli;

use std::io;

use clap::Parser;
use cli::Cli;
use mem_fs::MemFileSystem;
use mem_fs_fuse::{into_io, pack_dir, tree_lines, unpack_dir};
use typed_bytesize::ByteSizeIec;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("source={:?}\nout_dir={:?}", cli.source, cli.out_dir);

    let mut mfs = MemFileSystem::new(cli.inodes, cli.blocks).map_err(into_io)?;

    let packed = pack_dir(&mut mfs, &cli.source, "/")?;
    log::info!("packed {packed} files");

    for line in tree_lines(&mfs, "/").map_err(into_io)? {
        println!("{line}");
    }

    let stat = mfs.statfs();
    let used_blocks = stat.total_blocks - stat.free_blocks;
    println!(
        "blocks: {} of {} used, inodes: {} of {} used",
        ByteSizeIec((used_blocks * stat.block_size) as u64),
        ByteSizeIec((stat.total_blocks * stat.block_size) as u64),
        stat.total_inodes - stat.free_inodes,
        stat.total_inodes,
    );
    if !mfs.is_consistent() {
        log::error!("free-space accounting diverged from the file tree");
    }

    let unpacked = unpack_dir(&mfs, "/", &cli.out_dir)?;
    log::info!("exported {unpacked} files to {:?}", cli.out_dir);

    Ok(())
}
