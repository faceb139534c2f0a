use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Host directory to pack
    #[arg(long, short)]
    pub source: PathBuf,

    /// Output directory receiving the exported tree
    #[arg(long, short = 'O')]
    pub out_dir: PathBuf,

    /// Number of data blocks in the store
    #[arg(long, short, default_value_t = 4096)]
    pub blocks: usize,

    /// Number of inodes in the store
    #[arg(long, short, default_value_t = 1024)]
    pub inodes: usize,
}
